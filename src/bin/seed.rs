use axum_pos_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::{categories, dining_tables, roles, users},
    services::auth_service::hash_password,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&orm).await?;

    let admin_role = ensure_role(&orm, "admin").await?;
    ensure_role(&orm, "cashier").await?;

    let email = std::env::var("SEED_ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".into());
    let password = std::env::var("SEED_ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".into());
    let admin_id = ensure_user(&orm, &email, &password, admin_role).await?;

    seed_categories(&orm).await?;
    seed_tables(&orm).await?;

    println!("Seed completed. Admin ID: {admin_id}");
    Ok(())
}

async fn ensure_role(orm: &DatabaseConnection, name: &str) -> anyhow::Result<Uuid> {
    if let Some(existing) = roles::Entity::find()
        .filter(roles::Column::Name.eq(name))
        .one(orm)
        .await?
    {
        return Ok(existing.id);
    }

    let role = roles::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(orm)
    .await?;

    println!("Ensured role {name}");
    Ok(role.id)
}

async fn ensure_user(
    orm: &DatabaseConnection,
    email: &str,
    password: &str,
    role_id: Uuid,
) -> anyhow::Result<Uuid> {
    if let Some(existing) = users::Entity::find()
        .filter(users::Column::Email.eq(email))
        .one(orm)
        .await?
    {
        return Ok(existing.id);
    }

    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        first_name: Set("Admin".into()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash),
        phone: Set("0000000000".into()),
        role_id: Set(role_id),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(orm)
    .await?;

    println!("Ensured user {email} (role=admin)");
    Ok(user.id)
}

async fn seed_categories(orm: &DatabaseConnection) -> anyhow::Result<()> {
    for name in ["Burgers", "Drinks", "Desserts"] {
        let exists = categories::Entity::find()
            .filter(categories::Column::Name.eq(name))
            .one(orm)
            .await?
            .is_some();
        if exists {
            continue;
        }
        categories::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(orm)
        .await?;
    }

    println!("Seeded categories");
    Ok(())
}

async fn seed_tables(orm: &DatabaseConnection) -> anyhow::Result<()> {
    for n in 1..=6 {
        let name = format!("Table {n}");
        let exists = dining_tables::Entity::find()
            .filter(dining_tables::Column::Name.eq(name.as_str()))
            .one(orm)
            .await?
            .is_some();
        if exists {
            continue;
        }
        dining_tables::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(orm)
        .await?;
    }

    println!("Seeded tables");
    Ok(())
}
