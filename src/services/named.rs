//! CRUD shared by the resources that are nothing more than a unique name:
//! categories, dining tables and roles.

/// Expands to `list`, `create`, `update` and `delete` service functions for a
/// named entity. Arguments: entity module, API model, list DTO module and
/// type, label used in messages, plural label, then the four function names.
macro_rules! named_service {
    (
        $entity:ident, $record:ident, $dto:ident :: $list:ident, $label:tt, $plural:tt,
        [$list_fn:ident, $create_fn:ident, $update_fn:ident, $delete_fn:ident]
    ) => {
        use chrono::Utc;
        use sea_orm::{
            ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
            QueryOrder, QuerySelect, Set,
        };
        use sea_orm::ActiveValue::NotSet;
        use uuid::Uuid;

        use $crate::{
            dto::{$dto::$list, named::NameRequest},
            entity::$entity::{ActiveModel, Column, Entity},
            error::{AppError, AppResult},
            models::$record,
            response::{ApiResponse, Meta},
            routes::params::Pagination,
            state::AppState,
        };

        pub async fn $list_fn(state: &AppState, query: Pagination) -> AppResult<ApiResponse<$list>> {
            let (page, limit, offset) = query.normalize();
            let finder = Entity::find().order_by_asc(Column::Name);

            let total = finder.clone().count(&state.orm).await? as i64;
            let items = finder
                .limit(limit as u64)
                .offset(offset as u64)
                .all(&state.orm)
                .await?
                .into_iter()
                .map($record::from)
                .collect();

            let meta = Meta::new(page, limit, total);
            Ok(ApiResponse::success($plural, $list { items }, Some(meta)))
        }

        pub async fn $create_fn(
            state: &AppState,
            payload: NameRequest,
        ) -> AppResult<ApiResponse<$record>> {
            let name = payload.required_name($label)?;
            ensure_name_free(state, &name, None).await?;

            let record = ActiveModel {
                id: Set(Uuid::new_v4()),
                name: Set(name),
                created_at: NotSet,
                updated_at: NotSet,
            }
            .insert(&state.orm)
            .await?;

            tracing::info!(resource = $label, id = %record.id, "record created");
            Ok(ApiResponse::success(
                concat!($label, " created"),
                $record::from(record),
                Some(Meta::empty()),
            ))
        }

        pub async fn $update_fn(
            state: &AppState,
            id: Uuid,
            payload: NameRequest,
        ) -> AppResult<ApiResponse<$record>> {
            let name = payload.required_name($label)?;
            let existing = Entity::find_by_id(id)
                .one(&state.orm)
                .await?
                .ok_or_else(|| AppError::not_found($label))?;
            ensure_name_free(state, &name, Some(id)).await?;

            let mut active: ActiveModel = existing.into();
            active.name = Set(name);
            active.updated_at = Set(Utc::now().into());
            let record = active.update(&state.orm).await?;

            tracing::info!(resource = $label, id = %record.id, "record updated");
            Ok(ApiResponse::success(
                concat!($label, " updated"),
                $record::from(record),
                Some(Meta::empty()),
            ))
        }

        pub async fn $delete_fn(state: &AppState, id: Uuid) -> AppResult<ApiResponse<$record>> {
            let existing = Entity::find_by_id(id)
                .one(&state.orm)
                .await?
                .ok_or_else(|| AppError::not_found($label))?;

            Entity::delete_by_id(id).exec(&state.orm).await?;

            tracing::info!(resource = $label, id = %id, "record deleted");
            Ok(ApiResponse::success(
                concat!($label, " deleted"),
                $record::from(existing),
                Some(Meta::empty()),
            ))
        }

        async fn ensure_name_free(state: &AppState, name: &str, except: Option<Uuid>) -> AppResult<()> {
            let mut condition = Condition::all().add(Column::Name.eq(name));
            if let Some(id) = except {
                condition = condition.add(Column::Id.ne(id));
            }
            let taken = Entity::find().filter(condition).count(&state.orm).await?;
            if taken > 0 {
                return Err(AppError::bad_request(concat!($label, " already exists")));
            }
            Ok(())
        }
    };
}

pub(crate) use named_service;
