use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use axum::body::Bytes;
use axum_pos_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    dto::{
        named::NameRequest,
        orders::{CreateOrderRequest, OrderLineRequest, UpdateOrderRequest},
        products::ProductForm,
        users::{CreateUserRequest, LoginRequest, UpdateUserRequest},
    },
    error::AppError,
    middleware::auth::AuthUser,
    models::OrderStatus,
    routes::params::Pagination,
    services::{
        auth_service, category_service, order_service, product_service, role_service,
        table_service, user_service,
    },
    state::AppState,
    storage::{ImageStore, ImageUpload, StorageError},
};
use sea_orm::{ConnectionTrait, Statement};
use uuid::Uuid;

/// Keeps uploaded object names in memory so the flow can assert cleanup.
#[derive(Default)]
struct MemoryStore {
    objects: Mutex<HashSet<String>>,
}

impl MemoryStore {
    fn contains(&self, url: &str) -> bool {
        self.objects.lock().unwrap().contains(url)
    }

    fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait]
impl ImageStore for MemoryStore {
    async fn upload(&self, name: &str, _image: &ImageUpload) -> Result<String, StorageError> {
        let url = format!("mem://{name}");
        self.objects.lock().unwrap().insert(url.clone());
        Ok(url)
    }

    async fn remove(&self, url: &str) -> Result<(), StorageError> {
        self.objects.lock().unwrap().remove(url);
        Ok(())
    }
}

// One test drives every flow so the shared tables are truncated only once.
#[tokio::test]
async fn point_of_sale_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests.");
            return Ok(());
        }
    };

    let store = Arc::new(MemoryStore::default());
    let state = setup_state(&database_url, store.clone()).await?;

    named_resources(&state).await?;
    let (cashier_id, role_id) = users_and_login(&state).await?;
    let (burger, soda) = products(&state, &store).await?;
    orders(&state, cashier_id, burger, soda).await?;

    // a role still referenced by a user cannot be removed
    let err = role_service::delete_role(&state, role_id).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    Ok(())
}

async fn named_resources(state: &AppState) -> anyhow::Result<()> {
    let created = category_service::create_category(state, NameRequest::new(" Drinks "))
        .await?
        .data
        .unwrap();
    assert_eq!(created.name, "Drinks");

    let dup = category_service::create_category(state, NameRequest::new("Drinks")).await;
    assert!(matches!(dup, Err(AppError::BadRequest(_))));

    // renaming to its own name is not a duplicate
    category_service::update_category(state, created.id, NameRequest::new("Drinks")).await?;

    let missing = category_service::update_category(state, Uuid::new_v4(), NameRequest::new("X")).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    let table = table_service::create_table(state, NameRequest::new("Terrace 1"))
        .await?
        .data
        .unwrap();
    let renamed = table_service::update_table(state, table.id, NameRequest::new("Terrace 2"))
        .await?
        .data
        .unwrap();
    assert_eq!(renamed.name, "Terrace 2");
    assert!(renamed.updated_at >= table.updated_at);

    let list = table_service::list_tables(state, Pagination::default()).await?;
    assert_eq!(list.meta.unwrap().total, Some(1));

    let deleted = table_service::delete_table(state, table.id).await?.data.unwrap();
    assert_eq!(deleted.id, table.id);
    let again = table_service::delete_table(state, table.id).await;
    assert!(matches!(again, Err(AppError::NotFound(_))));

    Ok(())
}

async fn users_and_login(state: &AppState) -> anyhow::Result<(Uuid, Uuid)> {
    let role = role_service::create_role(state, NameRequest::new("cashier"))
        .await?
        .data
        .unwrap();

    let unknown_role = user_service::create_user(state, new_user("x@pos.test", Uuid::new_v4())).await;
    assert!(matches!(unknown_role, Err(AppError::BadRequest(_))));

    let mut short = new_user("short@pos.test", role.id);
    short.password = Some("abc".into());
    assert!(matches!(
        user_service::create_user(state, short).await,
        Err(AppError::BadRequest(_))
    ));

    let user = user_service::create_user(state, new_user("cashier@pos.test", role.id))
        .await?
        .data
        .unwrap();
    assert_eq!(user.role_id, role.id);

    let taken = user_service::create_user(state, new_user("cashier@pos.test", role.id)).await;
    assert!(matches!(taken, Err(AppError::BadRequest(_))));

    let wrong = auth_service::login_user(state, login("cashier@pos.test", "nope-nope")).await;
    assert!(matches!(wrong, Err(AppError::Unauthorized(_))));
    let unknown = auth_service::login_user(state, login("ghost@pos.test", "secret1")).await;
    assert!(matches!(unknown, Err(AppError::BadRequest(_))));

    let session = auth_service::login_user(state, login("cashier@pos.test", "secret1"))
        .await?
        .data
        .unwrap();
    let token = session.token.strip_prefix("Bearer ").expect("bearer prefix");
    let claims = auth_service::decode_token(token, &state.config.jwt_secret)?;
    assert_eq!(claims.sub, user.id.to_string());

    let me = user_service::current_user(
        state,
        &AuthUser {
            user_id: user.id,
            role_id: role.id,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(me.role.map(|r| r.name), Some("cashier".to_string()));

    user_service::update_user(
        state,
        user.id,
        UpdateUserRequest {
            password: Some("changed1".into()),
            ..Default::default()
        },
    )
    .await?;
    auth_service::login_user(state, login("cashier@pos.test", "changed1")).await?;

    let listed = user_service::list_users(state, Pagination::default()).await?.data.unwrap();
    assert_eq!(listed.items.len(), 1);

    Ok((user.id, role.id))
}

async fn products(state: &AppState, store: &MemoryStore) -> anyhow::Result<(Uuid, Uuid)> {
    let category = category_service::create_category(state, NameRequest::new("Mains"))
        .await?
        .data
        .unwrap();

    let no_category = product_service::create_product(
        state,
        product_form("Ghost", &Uuid::new_v4().to_string(), "100"),
    )
    .await;
    assert!(matches!(no_category, Err(AppError::BadRequest(_))));
    assert_eq!(store.len(), 0);

    let burger = product_service::create_product(
        state,
        product_form("Burger", &category.id.to_string(), "1200"),
    )
    .await?
    .data
    .unwrap();
    assert!(store.contains(&burger.image_url));

    let dup = product_service::create_product(
        state,
        product_form("Burger", &category.id.to_string(), "900"),
    )
    .await;
    assert!(matches!(dup, Err(AppError::BadRequest(_))));
    assert_eq!(store.len(), 1);

    let soda = product_service::create_product(
        state,
        product_form("Soda", &category.id.to_string(), "300"),
    )
    .await?
    .data
    .unwrap();

    // replacing the image drops the previous object
    let updated = product_service::update_product(
        state,
        soda.id,
        ProductForm {
            price: Some("350".into()),
            image: Some(png("soda-v2.png")),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(updated.price, 350);
    assert!(!store.contains(&soda.image_url));
    assert!(store.contains(&updated.image_url));

    let listed = product_service::list_products(state, Pagination::default()).await?.data.unwrap();
    assert!(listed
        .items
        .iter()
        .all(|p| p.category.as_ref().map(|c| c.id) == Some(category.id)));

    let temp = product_service::create_product(
        state,
        product_form("Special", &category.id.to_string(), "500"),
    )
    .await?
    .data
    .unwrap();
    product_service::delete_product(state, temp.id).await?;
    assert!(!store.contains(&temp.image_url));

    Ok((burger.id, soda.id))
}

async fn orders(state: &AppState, cashier: Uuid, burger: Uuid, soda: Uuid) -> anyhow::Result<()> {
    let short = order_service::create_order(
        state,
        order_request(cashier, vec![line(burger, 2, None)], 1000),
    )
    .await;
    assert!(matches!(short, Err(AppError::BadRequest(_))));

    let unknown = order_service::create_order(
        state,
        order_request(cashier, vec![line(Uuid::new_v4(), 1, None)], 5000),
    )
    .await;
    assert!(matches!(unknown, Err(AppError::NotFound(_))));

    // 2 x 1200 from the catalogue + 1 x 400 charged explicitly
    let order = order_service::create_order(
        state,
        order_request(
            cashier,
            vec![line(burger, 2, None), line(soda, 1, Some(400))],
            5000,
        ),
    )
    .await?
    .data
    .unwrap();
    assert_eq!(order.order.total_price, 2800);
    assert_eq!(order.order.change_to_give, 2200);
    assert_eq!(order.order.status, OrderStatus::Paid);
    assert!(order.order.is_paid);
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.user.as_ref().map(|u| u.id), Some(cashier));

    let fetched = order_service::get_order(state, order.order.id).await?.data.unwrap();
    assert_eq!(fetched.order, order.order);

    let updated = order_service::update_order(
        state,
        order.order.id,
        UpdateOrderRequest {
            status: Some("en_cours".into()),
            products: Some(vec![line(soda, 3, None)]),
            cash_given: Some(2000),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(updated.order.total_price, 1050);
    assert_eq!(updated.order.change_to_give, 950);
    assert_eq!(updated.order.status, OrderStatus::InProgress);
    assert!(!updated.order.is_paid);
    assert_eq!(updated.items.len(), 1);

    let listed = order_service::list_orders(state, Pagination::default()).await?;
    assert_eq!(listed.meta.unwrap().total, Some(1));

    // products referenced by an order line stay put
    let err = product_service::delete_product(state, soda).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let deleted = order_service::delete_order(state, order.order.id).await?.data.unwrap();
    assert_eq!(deleted.order.id, order.order.id);
    let gone = order_service::get_order(state, order.order.id).await;
    assert!(matches!(gone, Err(AppError::NotFound(_))));

    Ok(())
}

fn new_user(email: &str, role: Uuid) -> CreateUserRequest {
    CreateUserRequest {
        first_name: Some("Awa".into()),
        email: Some(email.into()),
        password: Some("secret1".into()),
        phone: Some("770000000".into()),
        role: Some(role.to_string()),
    }
}

fn login(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: Some(email.into()),
        password: Some(password.into()),
    }
}

fn png(file_name: &str) -> ImageUpload {
    ImageUpload {
        file_name: file_name.into(),
        content_type: "image/png".into(),
        bytes: Bytes::from_static(b"\x89PNG"),
    }
}

fn product_form(name: &str, category: &str, price: &str) -> ProductForm {
    ProductForm {
        name: Some(name.into()),
        category: Some(category.into()),
        price: Some(price.into()),
        description: Some("house special".into()),
        image: Some(png(&format!("{name}.png"))),
    }
}

fn line(product: Uuid, quantity: i64, price: Option<i64>) -> OrderLineRequest {
    OrderLineRequest {
        product: Some(product.to_string()),
        quantity: Some(quantity),
        price,
    }
}

fn order_request(user: Uuid, products: Vec<OrderLineRequest>, cash: i64) -> CreateOrderRequest {
    CreateOrderRequest {
        products: Some(products),
        user: Some(user.to_string()),
        cash_given: Some(cash),
        change_to_give: None,
    }
}

async fn setup_state(database_url: &str, images: Arc<MemoryStore>) -> anyhow::Result<AppState> {
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE order_items, orders, products, users, roles, categories, dining_tables CASCADE",
    ))
    .await?;

    let config = AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "flow-secret".into(),
        jwt_ttl_minutes: 5,
        upload_dir: "unused".into(),
        max_upload_bytes: 1024 * 1024,
        supabase: None,
    };

    Ok(AppState {
        orm,
        images,
        config: Arc::new(config),
    })
}
