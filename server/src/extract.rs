use axum::extract::FromRequest;

use crate::error::AppError;

/// `Json` whose rejections use the API error shape instead of axum's plain text.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
