use serde::Serialize;
use utoipa::ToSchema;

use crate::{models::ProductWithCategory, storage::ImageUpload};

/// Fields collected from a product multipart form. Every field is optional
/// here; create and update decide which ones are required.
#[derive(Debug, Default)]
pub struct ProductForm {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<String>,
    pub description: Option<String>,
    pub image: Option<ImageUpload>,
}

/// OpenAPI description of the multipart body accepted by product create/update.
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct ProductFormSchema {
    pub name: String,
    /// Category id.
    pub category: String,
    pub price: i64,
    pub description: Option<String>,
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<ProductWithCategory>)]
    pub items: Vec<ProductWithCategory>,
}
