//! Error types for backend operations.

use thiserror::Error;

/// Errors from backend calls. Transport failures and non-2xx responses
/// are both normalized here; 4xx and 5xx are not distinguished.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum BackendError {
    /// Network request failed before a response arrived.
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered with a non-success status.
    #[error("backend error ({status}): {message}")]
    Backend {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body, or a generic fallback.
        message: String,
    },

    /// The backend answered 2xx but the body was not parseable JSON.
    #[error("JSON parse error: {0}")]
    JsonParse(String),
}

impl BackendError {
    /// Message suitable for a user-facing notification.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::Network(_) => "Could not reach the backend service.",
            Self::Backend { message, .. } => message,
            Self::JsonParse(_) => "The backend returned an unexpected response.",
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

/// Result type alias for backend operations.
pub type Result<T> = std::result::Result<T, BackendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_messages() {
        let err = BackendError::Network("connection refused".to_string());
        assert!(err.user_message().contains("backend service"));

        let err = BackendError::Backend {
            status: 409,
            message: "database already exists".to_string(),
        };
        assert_eq!(err.user_message(), "database already exists");
    }
}
