use axum::extract::FromRequest;

use crate::error::AppError;

/// `Json` whose rejections render as 400 `VALIDATION_ERROR` instead of
/// axum's plain-text 4xx.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
