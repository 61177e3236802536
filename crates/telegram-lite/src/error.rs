//! Error types for the Telegram client.

use thiserror::Error;

/// Errors that can occur when talking to the Bot API.
#[derive(Error, Debug)]
pub enum TelegramError {
    /// The API answered with `ok: false`.
    #[error("Telegram API error {code}: {description}")]
    Api {
        /// The `error_code` field, or the HTTP status when absent.
        code: u16,
        /// The `description` field from the API.
        description: String,
    },

    /// An HTTP request error (connect, timeout, TLS).
    #[error("Connection error: {0}")]
    Http(#[from] reqwest::Error),

    /// A JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The response was invalid or malformed.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl TelegramError {
    /// Create a new API error.
    pub fn api(code: u16, description: impl Into<String>) -> Self {
        Self::Api {
            code,
            description: description.into(),
        }
    }

    /// Get the API error code, if this is an API error.
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Api { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Check if this is an authentication rejection (bad token).
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { code: 401, .. })
    }

    /// Check if another poller holds the update stream (HTTP 409).
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Api { code: 409, .. })
    }
}

/// Result type alias for Telegram operations.
pub type Result<T> = std::result::Result<T, TelegramError>;
