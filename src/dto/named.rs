use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// Body for creating or renaming a category, table or role.
#[derive(Debug, Deserialize, ToSchema, Default)]
pub struct NameRequest {
    pub name: Option<String>,
}

impl NameRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }

    /// Trimmed name, or a 400 mentioning `what` when absent or blank.
    pub fn required_name(&self, what: &str) -> AppResult<String> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_owned)
            .ok_or_else(|| AppError::bad_request(format!("{what} name is required")))
    }
}
