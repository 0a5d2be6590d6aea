//! Error types used throughout the authentication stack

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for TabAuth
///
/// Only `CallbackValidation` signals a possibly forged redirect; callers must
/// never downgrade it to a warning. `MalformedStorageData` is recovered inside
/// the token store and does not normally reach callers.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum AuthError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("{operation} failed ({status})")]
    HttpStatus { status: u16, operation: String },

    #[error("Invalid auth callback: {0}")]
    CallbackValidation(String),

    #[error("Malformed storage data: {0}")]
    MalformedStorageData(String),

    #[error("Authorization server error: {}", format_provider_error(.error, .description.as_deref()))]
    Provider { error: String, description: Option<String> },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Navigation error: {0}")]
    Navigation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Build an HTTP status error for the named operation
    pub fn http_status(status: u16, operation: impl Into<String>) -> Self {
        Self::HttpStatus { status, operation: operation.into() }
    }

    /// HTTP status code carried by the error, if any
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the error indicates a possibly forged or replayed callback
    #[must_use]
    pub fn is_callback_validation(&self) -> bool {
        matches!(self, Self::CallbackValidation(_))
    }
}

fn format_provider_error(error: &str, description: Option<&str>) -> String {
    match description {
        Some(desc) => format!("{error}: {desc}"),
        None => error.to_string(),
    }
}

/// Result type alias for TabAuth operations
pub type Result<T> = std::result::Result<T, AuthError>;
