use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    dto::users::{CreateUserRequest, UpdateUserRequest, UserList},
    entity::{
        roles::Entity as Roles,
        users::{ActiveModel, Column, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Role, User, UserWithRole},
    response::{ApiResponse, Meta},
    routes::params::{Pagination, parse_id},
    services::auth_service::{hash_password, validate_password},
    state::AppState,
};

pub async fn list_users(state: &AppState, query: Pagination) -> AppResult<ApiResponse<UserList>> {
    let (page, limit, offset) = query.normalize();

    let total = Users::find().count(&state.orm).await? as i64;
    let items = Users::find()
        .order_by_asc(Column::CreatedAt)
        .find_also_related(Roles)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(user, role)| UserWithRole {
            user: User::from(user),
            role: role.map(Role::from),
        })
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Users", UserList { items }, Some(meta)))
}

pub async fn create_user(
    state: &AppState,
    payload: CreateUserRequest,
) -> AppResult<ApiResponse<User>> {
    let CreateUserRequest {
        first_name,
        email,
        password,
        phone,
        role,
    } = payload;
    let (Some(first_name), Some(email), Some(password), Some(phone), Some(role)) = (
        non_blank(first_name),
        non_blank(email),
        password.filter(|p| !p.is_empty()),
        non_blank(phone),
        non_blank(role),
    ) else {
        return Err(AppError::bad_request("All fields are required"));
    };

    let role_id = ensure_role_exists(state, &role).await?;
    validate_password(&password)?;
    ensure_email_free(state, &email, None).await?;

    let password_hash = hash_password(&password)?;
    let user = ActiveModel {
        id: Set(Uuid::new_v4()),
        first_name: Set(first_name),
        email: Set(email),
        password_hash: Set(password_hash),
        phone: Set(phone),
        role_id: Set(role_id),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(user_id = %user.id, "user created");
    Ok(ApiResponse::success(
        "User created",
        User::from(user),
        Some(Meta::empty()),
    ))
}

pub async fn update_user(
    state: &AppState,
    id: Uuid,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<User>> {
    let existing = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    let mut active: ActiveModel = existing.into();

    if let Some(first_name) = payload.first_name {
        active.first_name = Set(required_field(first_name, "First name")?);
    }
    if let Some(email) = payload.email {
        let email = required_field(email, "Email")?;
        ensure_email_free(state, &email, Some(id)).await?;
        active.email = Set(email);
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(required_field(phone, "Phone")?);
    }
    if let Some(role) = payload.role {
        active.role_id = Set(ensure_role_exists(state, &role).await?);
    }
    if let Some(password) = payload.password {
        validate_password(&password)?;
        active.password_hash = Set(hash_password(&password)?);
    }
    active.updated_at = Set(Utc::now().into());

    let user = active.update(&state.orm).await?;

    tracing::info!(user_id = %user.id, "user updated");
    Ok(ApiResponse::success(
        "User updated",
        User::from(user),
        Some(Meta::empty()),
    ))
}

pub async fn delete_user(state: &AppState, id: Uuid) -> AppResult<ApiResponse<User>> {
    let existing = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    Users::delete_by_id(id).exec(&state.orm).await?;

    tracing::info!(user_id = %id, "user deleted");
    Ok(ApiResponse::success(
        "User deleted",
        User::from(existing),
        Some(Meta::empty()),
    ))
}

pub async fn current_user(
    state: &AppState,
    auth: &AuthUser,
) -> AppResult<ApiResponse<UserWithRole>> {
    let (user, role) = Users::find_by_id(auth.user_id)
        .find_also_related(Roles)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    Ok(ApiResponse::success(
        "Current user",
        UserWithRole {
            user: User::from(user),
            role: role.map(Role::from),
        },
        Some(Meta::empty()),
    ))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required_field(value: String, field: &str) -> AppResult<String> {
    non_blank(Some(value)).ok_or_else(|| AppError::bad_request(format!("{field} cannot be empty")))
}

async fn ensure_role_exists(state: &AppState, raw_id: &str) -> AppResult<Uuid> {
    let role_id = parse_id(raw_id, "role")?;
    let found = Roles::find_by_id(role_id).count(&state.orm).await?;
    if found == 0 {
        return Err(AppError::bad_request("The specified role does not exist"));
    }
    Ok(role_id)
}

async fn ensure_email_free(state: &AppState, email: &str, except: Option<Uuid>) -> AppResult<()> {
    let mut condition = Condition::all().add(Column::Email.eq(email));
    if let Some(id) = except {
        condition = condition.add(Column::Id.ne(id));
    }
    let taken = Users::find().filter(condition).count(&state.orm).await?;
    if taken > 0 {
        return Err(AppError::bad_request("Email is already taken"));
    }
    Ok(())
}
