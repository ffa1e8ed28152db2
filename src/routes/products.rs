use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State, multipart::MultipartError},
    routing::{delete, get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::products::{ProductForm, ProductFormSchema, ProductList},
    error::{AppError, AppResult},
    models::Product,
    response::{ApiResponse, Created, created},
    routes::params::{Pagination, parse_id},
    services::product_service,
    state::AppState,
    storage::ImageUpload,
};

// Room for the text fields and multipart framing around the image.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/create", post(create_product))
        .route("/", get(list_products))
        .route("/update/{id}", put(update_product))
        .route("/delete/{id}", delete(delete_product))
        .layer(DefaultBodyLimit::max(max_upload_bytes + FORM_OVERHEAD_BYTES))
}

fn multipart_error(err: MultipartError) -> AppError {
    AppError::bad_request(format!("Invalid multipart body: {}", err.body_text()))
}

/// Collect the known product fields from a multipart body.
pub async fn read_product_form(mut multipart: Multipart) -> AppResult<ProductForm> {
    let mut form = ProductForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "image" => {
                let file_name = field.file_name().map(str::to_owned);
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                // an untouched file input posts an unnamed, empty part
                if file_name.is_none() && bytes.is_empty() {
                    continue;
                }
                form.image = Some(ImageUpload {
                    file_name: file_name.unwrap_or_else(|| "image".to_string()),
                    content_type,
                    bytes,
                });
            }
            "name" => form.name = Some(field.text().await.map_err(multipart_error)?),
            "category" | "categorie" => {
                form.category = Some(field.text().await.map_err(multipart_error)?)
            }
            "price" | "prix" => form.price = Some(field.text().await.map_err(multipart_error)?),
            "description" => {
                form.description = Some(field.text().await.map_err(multipart_error)?)
            }
            other => tracing::debug!(field = %other, "ignoring unknown product form field"),
        }
    }

    Ok(form)
}

#[utoipa::path(
    post,
    path = "/api/product/create",
    request_body(content = ProductFormSchema, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Product created", body = ApiResponse<Product>),
        (status = 400, description = "Missing field, invalid category or price, bad image, duplicate name"),
        (status = 500, description = "Image upload failed"),
    ),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Created<Product>> {
    let form = read_product_form(multipart).await?;
    let resp = product_service::create_product(&state, form).await?;
    Ok(created(resp))
}

#[utoipa::path(
    get,
    path = "/api/product",
    params(Pagination),
    responses(
        (status = 200, description = "List products with their category", body = ApiResponse<ProductList>)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<Pagination>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::list_products(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/product/update/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body(content = ProductFormSchema, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<Product>),
        (status = 400, description = "Invalid id or field"),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<Product>>> {
    let id = parse_id(&id, "product")?;
    let form = read_product_form(multipart).await?;
    let resp = product_service::update_product(&state, id, form).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/product/delete/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product deleted", body = ApiResponse<Product>),
        (status = 400, description = "Invalid id"),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let id = parse_id(&id, "product")?;
    let resp = product_service::delete_product(&state, id).await?;
    Ok(Json(resp))
}
