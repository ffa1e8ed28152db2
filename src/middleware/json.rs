use axum::extract::FromRequest;

use crate::error::AppError;

/// `axum::Json` whose rejections answer 400 in the usual response envelope
/// instead of axum's plain-text 415/422.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
