use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use uuid::Uuid;

use crate::{
    dto::orders::{CreateOrderRequest, OrderLineRequest, OrderList, UpdateOrderRequest},
    entity::{
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::{Column as ProdCol, Entity as Products},
        users::{Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    models::{Order, OrderItem, OrderLine, OrderStatus, OrderWithItems, Product, User},
    response::{ApiResponse, Meta},
    routes::params::{Pagination, parse_id},
    state::AppState,
};

/// A validated order line whose price may still come from the catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineInput {
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedLine {
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: i64,
}

pub fn parse_lines(lines: &[OrderLineRequest]) -> AppResult<Vec<LineInput>> {
    if lines.is_empty() {
        return Err(AppError::bad_request("Order must contain at least one product"));
    }

    lines
        .iter()
        .map(|line| {
            let product = line
                .product
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty());
            let quantity = line.quantity.filter(|q| *q > 0);
            let (Some(product), Some(quantity)) = (product, quantity) else {
                return Err(AppError::bad_request("Invalid product or quantity"));
            };
            let quantity = i32::try_from(quantity)
                .map_err(|_| AppError::bad_request("Quantity is too large"))?;
            let product_id = parse_id(product, "product")?;
            if line.price.is_some_and(|p| p < 0) {
                return Err(AppError::bad_request("Price cannot be negative"));
            }
            Ok(LineInput {
                product_id,
                quantity,
                price: line.price,
            })
        })
        .collect()
}

/// Sum of `price * quantity` over every line.
pub fn order_total(lines: &[PricedLine]) -> AppResult<i64> {
    lines.iter().try_fold(0_i64, |total, line| {
        line.price
            .checked_mul(i64::from(line.quantity))
            .and_then(|subtotal| total.checked_add(subtotal))
            .ok_or_else(|| AppError::bad_request("Order total is out of range"))
    })
}

/// Change owed to the customer; the cash must cover the total.
pub fn change_due(total: i64, cash_given: i64) -> AppResult<i64> {
    if cash_given < total {
        return Err(AppError::bad_request(format!(
            "Cash given ({cash_given}) does not cover the total ({total})"
        )));
    }
    Ok(cash_given - total)
}

fn validate_cash(cash_given: i64) -> AppResult<i64> {
    if cash_given < 0 {
        return Err(AppError::bad_request("Cash given cannot be negative"));
    }
    Ok(cash_given)
}

/// Resolve each line's product, falling back to the catalogue price.
async fn price_lines<C: ConnectionTrait>(conn: &C, inputs: &[LineInput]) -> AppResult<Vec<PricedLine>> {
    let ids: Vec<Uuid> = inputs.iter().map(|l| l.product_id).collect();
    let catalogue: HashMap<Uuid, i64> = Products::find()
        .filter(ProdCol::Id.is_in(ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|p| (p.id, p.price))
        .collect();

    inputs
        .iter()
        .map(|line| {
            let listed = catalogue.get(&line.product_id).ok_or_else(|| {
                AppError::NotFound(format!("Product not found for id {}", line.product_id))
            })?;
            Ok(PricedLine {
                product_id: line.product_id,
                quantity: line.quantity,
                price: line.price.unwrap_or(*listed),
            })
        })
        .collect()
}

async fn insert_lines<C: ConnectionTrait>(conn: &C, order_id: Uuid, lines: &[PricedLine]) -> AppResult<()> {
    for line in lines {
        OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            product_id: Set(line.product_id),
            quantity: Set(line.quantity),
            price: Set(line.price),
            created_at: NotSet,
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

pub async fn create_order(
    state: &AppState,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let CreateOrderRequest {
        products,
        user,
        cash_given,
        change_to_give,
    } = payload;
    let (Some(user), Some(products)) = (
        user.filter(|u| !u.trim().is_empty()),
        products.filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::bad_request("Missing or invalid data in request"));
    };

    let inputs = parse_lines(&products)?;
    let user_id = parse_id(&user, "user")?;
    let cash_given = cash_given
        .ok_or_else(|| AppError::bad_request("cashGiven is required"))
        .and_then(validate_cash)?;

    let txn = state.orm.begin().await?;

    if Users::find_by_id(user_id).count(&txn).await? == 0 {
        return Err(AppError::bad_request("The specified user does not exist"));
    }

    let lines = price_lines(&txn, &inputs).await?;
    let total_price = order_total(&lines)?;
    let change = change_due(total_price, cash_given)?;
    if let Some(claimed) = change_to_give.filter(|c| *c != change) {
        tracing::debug!(claimed, computed = change, "ignoring client-side change amount");
    }

    let status = OrderStatus::Paid;
    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        total_price: Set(total_price),
        cash_given: Set(cash_given),
        change_to_give: Set(change),
        status: Set(status.as_str().to_string()),
        is_paid: Set(status.is_paid()),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    insert_lines(&txn, order.id, &lines).await?;
    txn.commit().await?;

    tracing::info!(order_id = %order.id, total_price, change, "order created");
    let order = load_order(state, order.id).await?;
    Ok(ApiResponse::success("Order created", order, Some(Meta::empty())))
}

pub async fn list_orders(state: &AppState, query: Pagination) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.normalize();
    let finder = Orders::find().order_by_desc(OrderCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;
    let items = with_details(&state.orm, orders).await?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Orders", OrderList { items }, Some(meta)))
}

pub async fn get_order(state: &AppState, id: Uuid) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = load_order(state, id).await?;
    Ok(ApiResponse::success("Order", order, Some(Meta::empty())))
}

pub async fn update_order(
    state: &AppState,
    id: Uuid,
    payload: UpdateOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let status = payload
        .status
        .as_deref()
        .map(|s| {
            s.parse::<OrderStatus>()
                .map_err(|_| AppError::bad_request("Invalid status"))
        })
        .transpose()?;
    let inputs = payload
        .products
        .as_deref()
        .map(|lines| {
            if lines.is_empty() {
                return Err(AppError::bad_request("Invalid product list"));
            }
            parse_lines(lines)
        })
        .transpose()?;
    let cash_given = payload.cash_given.map(validate_cash).transpose()?;

    let txn = state.orm.begin().await?;

    let existing = Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;

    let mut total_price = existing.total_price;
    let mut cash = existing.cash_given;
    let reprice = inputs.is_some() || cash_given.is_some();

    let mut active: OrderActive = existing.into();

    if let Some(inputs) = &inputs {
        let lines = price_lines(&txn, inputs).await?;
        total_price = order_total(&lines)?;

        OrderItems::delete_many()
            .filter(OrderItemCol::OrderId.eq(id))
            .exec(&txn)
            .await?;
        insert_lines(&txn, id, &lines).await?;
        active.total_price = Set(total_price);
    }
    if let Some(cash_given) = cash_given {
        cash = cash_given;
        active.cash_given = Set(cash);
    }
    if reprice {
        active.change_to_give = Set(change_due(total_price, cash)?);
    }
    if let Some(status) = status {
        active.status = Set(status.as_str().to_string());
        active.is_paid = Set(status.is_paid());
    }
    active.updated_at = Set(Utc::now().into());
    active.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(order_id = %id, "order updated");
    let order = load_order(state, id).await?;
    Ok(ApiResponse::success("Order updated", order, Some(Meta::empty())))
}

pub async fn delete_order(state: &AppState, id: Uuid) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = load_order(state, id).await?;

    // order_items rows go with it through ON DELETE CASCADE
    Orders::delete_by_id(id).exec(&state.orm).await?;

    tracing::info!(order_id = %id, "order deleted");
    Ok(ApiResponse::success("Order deleted", order, Some(Meta::empty())))
}

async fn load_order(state: &AppState, id: Uuid) -> AppResult<OrderWithItems> {
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;
    let mut details = with_details(&state.orm, vec![order]).await?;
    details
        .pop()
        .ok_or_else(|| AppError::not_found("Order"))
}

/// Attach each order's user and lines (with products), batching the lookups.
async fn with_details<C: ConnectionTrait>(
    conn: &C,
    orders: Vec<OrderModel>,
) -> AppResult<Vec<OrderWithItems>> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }

    let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let user_ids: Vec<Uuid> = orders.iter().map(|o| o.user_id).collect();

    let users: HashMap<Uuid, User> = Users::find()
        .filter(UserCol::Id.is_in(user_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|u| (u.id, User::from(u)))
        .collect();

    let mut lines: HashMap<Uuid, Vec<OrderLine>> = HashMap::new();
    let rows = OrderItems::find()
        .filter(OrderItemCol::OrderId.is_in(order_ids))
        .order_by_asc(OrderItemCol::CreatedAt)
        .find_also_related(Products)
        .all(conn)
        .await?;
    for (item, product) in rows {
        lines.entry(item.order_id).or_default().push(OrderLine {
            item: OrderItem::from(item),
            product: product.map(Product::from),
        });
    }

    Ok(orders
        .into_iter()
        .map(|order| OrderWithItems {
            user: users.get(&order.user_id).cloned(),
            items: lines.remove(&order.id).unwrap_or_default(),
            order: Order::from(order),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product: Option<&str>, quantity: Option<i64>, price: Option<i64>) -> OrderLineRequest {
        OrderLineRequest {
            product: product.map(str::to_owned),
            quantity,
            price,
        }
    }

    #[test]
    fn total_is_sum_of_price_times_quantity() {
        let lines = [
            PricedLine {
                product_id: Uuid::new_v4(),
                quantity: 2,
                price: 1500,
            },
            PricedLine {
                product_id: Uuid::new_v4(),
                quantity: 3,
                price: 700,
            },
        ];
        assert_eq!(order_total(&lines).unwrap(), 2 * 1500 + 3 * 700);
        assert_eq!(order_total(&[]).unwrap(), 0);
    }

    #[test]
    fn total_overflow_is_rejected() {
        let lines = [PricedLine {
            product_id: Uuid::new_v4(),
            quantity: i32::MAX,
            price: i64::MAX / 2,
        }];
        assert!(order_total(&lines).is_err());
    }

    #[test]
    fn change_is_cash_minus_total() {
        assert_eq!(change_due(5100, 10000).unwrap(), 4900);
        assert_eq!(change_due(5100, 5100).unwrap(), 0);
        assert!(matches!(change_due(5100, 5000), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn lines_need_product_and_positive_quantity() {
        let id = Uuid::new_v4().to_string();
        assert!(parse_lines(&[]).is_err());
        assert!(parse_lines(&[line(None, Some(1), None)]).is_err());
        assert!(parse_lines(&[line(Some(&id), Some(0), None)]).is_err());
        assert!(parse_lines(&[line(Some(&id), None, None)]).is_err());
        assert!(parse_lines(&[line(Some("not-an-id"), Some(1), None)]).is_err());
        assert!(parse_lines(&[line(Some(&id), Some(1), Some(-1))]).is_err());

        let parsed = parse_lines(&[line(Some(&id), Some(4), Some(250))]).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].quantity, 4);
        assert_eq!(parsed[0].price, Some(250));
    }
}
