use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use service::errors::ServiceError;

/// Error surface of the HTTP handlers.
///
/// A missing record maps to 404 with a fixed detail message; storage failures
/// map to an opaque 500 while the cause stays in the server log.
#[derive(Debug)]
pub enum ApiError {
    NotFound,
    Internal(String),
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::NotFound(_) => Self::NotFound,
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound => (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({"detail": "Code block not found"})),
            )
                .into_response(),
            Self::Internal(cause) => {
                error!(error = %cause, "storage failure while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({"error": "internal server error"})),
                )
                    .into_response()
            }
        }
    }
}
