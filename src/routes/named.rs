/// Expands to the router and the four documented handlers of a named
/// resource. Arguments: service module, API model, list DTO module and type,
/// id label for parse errors, OpenAPI tag, the create, list, update and
/// delete paths, then the four handler names in the same order.
macro_rules! named_routes {
    (
        $service:ident, $record:ident, $dto:ident :: $list:ident, $what:tt, $tag:tt,
        [$create_path:tt, $list_path:tt, $update_path:tt, $delete_path:tt],
        [$create_fn:ident, $list_fn:ident, $update_fn:ident, $delete_fn:ident]
    ) => {
        use axum::{
            Json, Router,
            extract::{Path, Query, State},
            routing::{delete, get, post, put},
        };
        use uuid::Uuid;

        use $crate::{
            dto::{$dto::$list, named::NameRequest},
            error::AppResult,
            middleware::json::AppJson,
            models::$record,
            response::{ApiResponse, Created, created},
            routes::params::{Pagination, parse_id},
            services::$service,
            state::AppState,
        };

        pub fn router() -> Router<AppState> {
            Router::new()
                .route("/create", post($create_fn))
                .route("/", get($list_fn))
                .route("/update/{id}", put($update_fn))
                .route("/delete/{id}", delete($delete_fn))
        }

        #[utoipa::path(
            post,
            path = $create_path,
            request_body = NameRequest,
            responses(
                (status = 201, description = "Created", body = ApiResponse<$record>),
                (status = 400, description = "Missing name, duplicate name or malformed body"),
            ),
            tag = $tag
        )]
        pub async fn $create_fn(
            State(state): State<AppState>,
            AppJson(payload): AppJson<NameRequest>,
        ) -> AppResult<Created<$record>> {
            let resp = $service::$create_fn(&state, payload).await?;
            Ok(created(resp))
        }

        #[utoipa::path(
            get,
            path = $list_path,
            params(Pagination),
            responses(
                (status = 200, description = "Paginated list, ordered by name", body = ApiResponse<$list>)
            ),
            tag = $tag
        )]
        pub async fn $list_fn(
            State(state): State<AppState>,
            Query(query): Query<Pagination>,
        ) -> AppResult<Json<ApiResponse<$list>>> {
            let resp = $service::$list_fn(&state, query).await?;
            Ok(Json(resp))
        }

        #[utoipa::path(
            put,
            path = $update_path,
            params(("id" = Uuid, Path, description = "Record ID")),
            request_body = NameRequest,
            responses(
                (status = 200, description = "Updated", body = ApiResponse<$record>),
                (status = 400, description = "Invalid id, missing name or duplicate"),
                (status = 404, description = "Not found"),
            ),
            tag = $tag
        )]
        pub async fn $update_fn(
            State(state): State<AppState>,
            Path(id): Path<String>,
            AppJson(payload): AppJson<NameRequest>,
        ) -> AppResult<Json<ApiResponse<$record>>> {
            let id = parse_id(&id, $what)?;
            let resp = $service::$update_fn(&state, id, payload).await?;
            Ok(Json(resp))
        }

        #[utoipa::path(
            delete,
            path = $delete_path,
            params(("id" = Uuid, Path, description = "Record ID")),
            responses(
                (status = 200, description = "Deleted record", body = ApiResponse<$record>),
                (status = 400, description = "Invalid id or record still referenced"),
                (status = 404, description = "Not found"),
            ),
            tag = $tag
        )]
        pub async fn $delete_fn(
            State(state): State<AppState>,
            Path(id): Path<String>,
        ) -> AppResult<Json<ApiResponse<$record>>> {
            let id = parse_id(&id, $what)?;
            let resp = $service::$delete_fn(&state, id).await?;
            Ok(Json(resp))
        }
    };
}

pub(crate) use named_routes;
