//! Flashgen Error Types
//!
//! Centralized error handling for the host-side collaborators. The text
//! extraction and response parsing cores never fail and do not use these.

use thiserror::Error;

/// Central error type for Flashgen
#[derive(Error, Debug)]
pub enum FlashError {
    #[error("API key not set. Please set it in the extension options.")]
    MissingApiKey,

    #[error("Please select some text first.")]
    EmptySelection,

    #[error("API request failed ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed API response: {0}")]
    Envelope(String),

    #[error("Unknown mode '{0}' (expected flashcard, explain or language)")]
    InvalidMode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IPC error: {0}")]
    Ipc(String),

    #[error("Lock poisoned: {0}")]
    Lock(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for Flashgen operations
pub type FlashResult<T> = Result<T, FlashError>;

/// Helper to convert Mutex poison errors
impl<T> From<std::sync::PoisonError<T>> for FlashError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        FlashError::Lock(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_message() {
        let err = FlashError::Api {
            status: 401,
            message: "invalid x-api-key".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "API request failed (401): invalid x-api-key"
        );
    }

    #[test]
    fn test_missing_key_message_is_user_facing() {
        assert!(FlashError::MissingApiKey
            .to_string()
            .starts_with("API key not set"));
    }
}
