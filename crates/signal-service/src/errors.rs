//! Signaling error taxonomy.
//!
//! Every failable client request is answered through its acknowledgment:
//! `{ok: false, error, code}`. Internal and upstream details are logged
//! server-side and replaced with generic client messages.

use crate::media::MediaApiError;
use thiserror::Error;

/// Signaling error type.
///
/// Maps to ack error codes:
/// - `NotFound`: NOT_FOUND
/// - `InvalidInput`: INVALID_INPUT
/// - `IncompatibleCapabilities`: INCOMPATIBLE_CAPABILITIES
/// - `Upstream`: UPSTREAM_UNAVAILABLE
/// - `Internal`: INTERNAL_ERROR
#[derive(Debug, Error)]
pub enum SignalError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Incompatible capabilities: {0}")]
    IncompatibleCapabilities(String),

    #[error("Media engine unavailable: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SignalError {
    /// Returns the ack error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            SignalError::NotFound(_) => "NOT_FOUND",
            SignalError::InvalidInput(_) => "INVALID_INPUT",
            SignalError::IncompatibleCapabilities(_) => "INCOMPATIBLE_CAPABILITIES",
            SignalError::Upstream(_) => "UPSTREAM_UNAVAILABLE",
            SignalError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns a bounded label string for the error variant (for metrics).
    pub fn error_type_label(&self) -> &'static str {
        match self {
            SignalError::NotFound(_) => "not_found",
            SignalError::InvalidInput(_) => "invalid_input",
            SignalError::IncompatibleCapabilities(_) => "incompatible_capabilities",
            SignalError::Upstream(_) => "upstream_unavailable",
            SignalError::Internal(_) => "internal",
        }
    }

    /// Returns a client-safe error message (no internal details).
    pub fn client_message(&self) -> String {
        match self {
            SignalError::NotFound(msg)
            | SignalError::InvalidInput(msg)
            | SignalError::IncompatibleCapabilities(msg) => msg.clone(),
            SignalError::Upstream(detail) => {
                tracing::warn!(target: "signal.errors", detail = %detail, "Media engine unavailable");
                "Media engine is unavailable, please retry".to_string()
            }
            SignalError::Internal(detail) => {
                tracing::error!(target: "signal.errors", detail = %detail, "Internal error");
                "An internal error occurred".to_string()
            }
        }
    }
}

impl From<MediaApiError> for SignalError {
    fn from(err: MediaApiError) -> Self {
        match err {
            MediaApiError::NotFound(msg) => SignalError::NotFound(msg),
            MediaApiError::Rejected(msg) => SignalError::InvalidInput(msg),
            MediaApiError::Incompatible(msg) => SignalError::IncompatibleCapabilities(msg),
            MediaApiError::Unavailable(msg) => SignalError::Upstream(msg),
        }
    }
}
