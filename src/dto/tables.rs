use serde::Serialize;
use utoipa::ToSchema;

use crate::models::DiningTable;

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct TableList {
    #[schema(value_type = Vec<DiningTable>)]
    pub items: Vec<DiningTable>,
}
