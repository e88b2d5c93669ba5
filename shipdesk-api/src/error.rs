use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use shipdesk_order::{OrderError, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    ValidationError(String),
    #[error("{0}")]
    NotFoundError(String),
    #[error("{0}")]
    ConflictError(String),
    #[error("{0}")]
    ServiceUnavailable(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::ServiceUnavailable(msg) => {
                tracing::error!("Order store unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, "Order store unavailable, please retry".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        let msg = err.to_string();
        match err {
            OrderError::NotFound(_) => AppError::NotFoundError(msg),
            OrderError::Validation(_) => AppError::ValidationError(msg),
            OrderError::AlreadyDispatched(_) => AppError::ConflictError(msg),
            OrderError::Store(StoreError::VersionConflict { .. }) => AppError::ConflictError(msg),
            OrderError::Store(StoreError::NotFound(_)) => AppError::NotFoundError(msg),
            OrderError::Store(StoreError::Unavailable(_)) => AppError::ServiceUnavailable(msg),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<shipdesk_core::CoreError> for AppError {
    fn from(err: shipdesk_core::CoreError) -> Self {
        AppError::ValidationError(err.to_string())
    }
}
