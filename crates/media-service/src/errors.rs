//! Media control plane error types.
//!
//! All errors map to appropriate HTTP status codes via the `IntoResponse`
//! impl. Internal errors are logged server-side and return a generic
//! message to the caller.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Media control plane error type.
///
/// Maps to appropriate HTTP status codes:
/// - NotFound: 404 Not Found
/// - InvalidInput: 400 Bad Request
/// - IncompatibleCapabilities: 400 Bad Request (distinct error code)
/// - Internal: 500 Internal Server Error
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Incompatible capabilities: {0}")]
    IncompatibleCapabilities(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MediaError {
    /// Returns the HTTP status code for this error (for metrics recording).
    pub fn status_code(&self) -> u16 {
        match self {
            MediaError::NotFound(_) => 404,
            MediaError::InvalidInput(_) | MediaError::IncompatibleCapabilities(_) => 400,
            MediaError::Internal(_) => 500,
        }
    }

    /// Returns a bounded label string for the error variant (for metrics).
    pub fn error_type_label(&self) -> &'static str {
        match self {
            MediaError::NotFound(_) => "not_found",
            MediaError::InvalidInput(_) => "invalid_input",
            MediaError::IncompatibleCapabilities(_) => "incompatible_capabilities",
            MediaError::Internal(_) => "internal",
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for MediaError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            MediaError::NotFound(resource) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", resource.clone())
            }
            MediaError::InvalidInput(reason) => {
                (StatusCode::BAD_REQUEST, "INVALID_INPUT", reason.clone())
            }
            MediaError::IncompatibleCapabilities(reason) => (
                StatusCode::BAD_REQUEST,
                "INCOMPATIBLE_CAPABILITIES",
                reason.clone(),
            ),
            MediaError::Internal(err) => {
                // Log actual error server-side, return generic message to client
                tracing::error!(target: "media.errors", error = %err, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(error_response)).into_response()
    }
}
