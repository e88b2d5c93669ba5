use axum::extract::FromRequest;

use crate::error::AppError;

/// `Json` whose rejections come back in the same `{"error": ...}` shape as
/// every other failure.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
