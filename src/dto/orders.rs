use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{OrderStatus, OrderWithItems};

#[derive(Debug, Deserialize, ToSchema, Clone, Default)]
pub struct OrderLineRequest {
    /// Product id.
    pub product: Option<String>,
    pub quantity: Option<i64>,
    /// Unit price charged; defaults to the product's catalogue price.
    pub price: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub products: Option<Vec<OrderLineRequest>>,
    /// User id.
    pub user: Option<String>,
    #[serde(alias = "cash_given")]
    pub cash_given: Option<i64>,
    /// Informational; change is always recomputed server-side.
    #[serde(alias = "change_to_give")]
    pub change_to_give: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    #[schema(value_type = Option<OrderStatus>)]
    pub status: Option<String>,
    pub products: Option<Vec<OrderLineRequest>>,
    #[serde(alias = "cash_given")]
    pub cash_given: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct OrderList {
    #[schema(value_type = Vec<OrderWithItems>)]
    pub items: Vec<OrderWithItems>,
}
