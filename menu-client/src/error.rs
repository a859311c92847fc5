//! Client error types

use shared::error::ErrorCode;
use shared::reorder::ReorderError;
use std::time::Duration;
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with an error envelope
    #[error("API error {code} (HTTP {status}): {message}")]
    Api {
        status: u16,
        code: u16,
        message: String,
    },

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Authentication required
    #[error("Authentication required")]
    Unauthorized,

    /// Permission denied
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Drop could not be planned
    #[error("Reorder error: {0}")]
    Reorder(#[from] ReorderError),

    /// Save did not finish in time
    #[error("Save timed out after {0:?}")]
    Timeout(Duration),

    /// A save is still outstanding
    #[error("A save is still in flight")]
    Busy,

    /// Operation not valid in the current drag state
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl ClientError {
    /// Server error code, when the failure came from an API envelope
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            Self::Api { code, .. } => ErrorCode::try_from(*code).ok(),
            _ => None,
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
