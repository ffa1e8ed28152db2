use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{config::AppConfig, storage::ImageStore};

#[derive(Clone)]
pub struct AppState {
    pub orm: DatabaseConnection,
    pub images: Arc<dyn ImageStore>,
    pub config: Arc<AppConfig>,
}
