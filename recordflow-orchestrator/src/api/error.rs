//! API Error Handling
//!
//! Unified error types and conversion for API responses. Every error is
//! rendered as `{"error": message}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use recordflow_core::dto::run::ErrorBody;

use crate::service::DispatchError;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    /// A run could not be handed to the dispatcher
    QueueRejected(DispatchError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::QueueRejected(err) => {
                tracing::error!("Failed to queue workflow: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to queue workflow".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        ApiError::QueueRejected(err)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
