use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use chirp_types::api::{ErrorBody, FieldError};

/// Everything a handler can fail with, mapped onto one HTTP status and a
/// `{success: false, message}` body.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or out-of-range input, reported before any persistence.
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// Duplicate username.
    #[error("{0}")]
    Conflict(&'static str),

    /// Missing credentials or token.
    #[error("{0}")]
    Unauthorized(&'static str),

    /// A token was presented but rejected.
    #[error("{0}")]
    Forbidden(&'static str),

    /// Unexpected persistence failure. Logged server-side, masked as a
    /// generic message on the wire.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "Validation failed".to_string(),
                Some(errors),
            ),
            ApiError::Conflict(msg) => (StatusCode::BAD_REQUEST, msg.to_string(), None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.to_string(), None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.to_string(), None),
            ApiError::Storage(err) => {
                error!("Storage failure: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server error".to_string(),
                    None,
                )
            }
        };

        let body = ErrorBody {
            success: false,
            message,
            errors,
        };

        (status, Json(body)).into_response()
    }
}
