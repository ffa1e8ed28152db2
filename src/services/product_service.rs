use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    dto::products::{ProductForm, ProductList},
    entity::{
        categories::Entity as Categories,
        products::{ActiveModel, Column, Entity as Products},
    },
    error::{AppError, AppResult},
    models::{Category, Product, ProductWithCategory},
    response::{ApiResponse, Meta},
    routes::params::{Pagination, parse_id},
    storage::ImageUpload,
    state::AppState,
};

pub async fn list_products(
    state: &AppState,
    query: Pagination,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.normalize();

    let total = Products::find().count(&state.orm).await? as i64;
    let items = Products::find()
        .order_by_asc(Column::Name)
        .find_also_related(Categories)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(product, category)| ProductWithCategory {
            product: Product::from(product),
            category: category.map(Category::from),
        })
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

pub async fn create_product(
    state: &AppState,
    form: ProductForm,
) -> AppResult<ApiResponse<Product>> {
    let ProductForm {
        name,
        category,
        price,
        description,
        image,
    } = form;
    let (Some(name), Some(category), Some(price), Some(image)) = (
        name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
        category.filter(|c| !c.trim().is_empty()),
        price.filter(|p| !p.trim().is_empty()),
        image,
    ) else {
        return Err(AppError::bad_request("All fields are required"));
    };

    let category_id = parse_id(&category, "category")?;
    let price = parse_price(&price)?;
    image.validate(state.config.max_upload_bytes)?;
    ensure_category_exists(state, category_id).await?;
    ensure_name_free(state, &name, None).await?;

    let image_url = upload_image(state, &image).await?;

    let inserted = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        category_id: Set(Some(category_id)),
        price: Set(price),
        description: Set(description.filter(|d| !d.trim().is_empty())),
        image_url: Set(image_url.clone()),
        is_active: Set(true),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await;

    let product = match inserted {
        Ok(product) => product,
        Err(err) => {
            discard_image(state, &image_url).await;
            return Err(err.into());
        }
    };

    tracing::info!(product_id = %product.id, "product created");
    Ok(ApiResponse::success(
        "Product created",
        Product::from(product),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    id: Uuid,
    form: ProductForm,
) -> AppResult<ApiResponse<Product>> {
    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Product"))?;
    let previous_image = existing.image_url.clone();

    let mut active: ActiveModel = existing.into();

    if let Some(name) = form.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::bad_request("Product name cannot be empty"));
        }
        ensure_name_free(state, &name, Some(id)).await?;
        active.name = Set(name);
    }
    if let Some(category) = form.category {
        let category_id = parse_id(&category, "category")?;
        ensure_category_exists(state, category_id).await?;
        active.category_id = Set(Some(category_id));
    }
    if let Some(price) = form.price {
        active.price = Set(parse_price(&price)?);
    }
    if let Some(description) = form.description {
        active.description = Set(Some(description).filter(|d| !d.trim().is_empty()));
    }

    let mut new_image = None;
    if let Some(image) = form.image {
        image.validate(state.config.max_upload_bytes)?;
        let url = upload_image(state, &image).await?;
        active.image_url = Set(url.clone());
        new_image = Some(url);
    }
    active.updated_at = Set(Utc::now().into());

    let product = match active.update(&state.orm).await {
        Ok(product) => product,
        Err(err) => {
            if let Some(url) = &new_image {
                discard_image(state, url).await;
            }
            return Err(err.into());
        }
    };

    if new_image.is_some() {
        discard_image(state, &previous_image).await;
    }

    tracing::info!(product_id = %product.id, "product updated");
    Ok(ApiResponse::success(
        "Product updated",
        Product::from(product),
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Product"))?;

    Products::delete_by_id(id).exec(&state.orm).await?;
    discard_image(state, &existing.image_url).await;

    tracing::info!(product_id = %id, "product deleted");
    Ok(ApiResponse::success(
        "Product deleted",
        Product::from(existing),
        Some(Meta::empty()),
    ))
}

/// Prices are whole amounts of the smallest currency unit and must be positive.
pub fn parse_price(raw: &str) -> AppResult<i64> {
    match raw.trim().parse::<i64>() {
        Ok(price) if price > 0 => Ok(price),
        _ => Err(AppError::bad_request("Price must be a number greater than 0")),
    }
}

async fn upload_image(state: &AppState, image: &ImageUpload) -> AppResult<String> {
    let object_name = image.object_name();
    let url = state.images.upload(&object_name, image).await?;
    tracing::debug!(object = %object_name, "product image stored");
    Ok(url)
}

/// Removal failures never fail the request; the object is only orphaned.
async fn discard_image(state: &AppState, url: &str) {
    if let Err(err) = state.images.remove(url).await {
        tracing::warn!(error = %err, url = %url, "failed to remove product image");
    }
}

async fn ensure_category_exists(state: &AppState, id: Uuid) -> AppResult<()> {
    let found = Categories::find_by_id(id).count(&state.orm).await?;
    if found == 0 {
        return Err(AppError::bad_request("The specified category does not exist"));
    }
    Ok(())
}

async fn ensure_name_free(state: &AppState, name: &str, except: Option<Uuid>) -> AppResult<()> {
    let mut condition = Condition::all().add(Column::Name.eq(name));
    if let Some(id) = except {
        condition = condition.add(Column::Id.ne(id));
    }
    let taken = Products::find().filter(condition).count(&state.orm).await?;
    if taken > 0 {
        return Err(AppError::bad_request("Product already exists"));
    }
    Ok(())
}
