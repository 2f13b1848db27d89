//! Error types for myaii-core.

use thiserror::Error;

/// Result type alias using myaii-core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for myaii operations
#[derive(Error, Debug)]
pub enum Error {
    // Setup errors (raised before any I/O)
    #[error("Configuration error: {0}")]
    Configuration(String),

    // Streaming provider errors
    #[error("{message}")]
    Provider {
        operation: &'static str,
        status: Option<u16>,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    // Session facade errors
    #[error("Avatar session is busy: {0}")]
    SessionBusy(String),

    #[error("No active avatar session")]
    NotConnected,

    #[error("Avatar session start was cancelled")]
    Cancelled,

    // Local data errors
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

impl Error {
    /// Create a provider error for a streaming operation
    pub fn provider(
        operation: &'static str,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self::Provider {
            operation,
            status,
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Provider { status, .. } => *status,
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether a fresh attempt of the same operation may succeed.
    ///
    /// Transport failures, provider 5xx and 429 are transient; everything
    /// else (bad credentials, malformed bodies, local state) is not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Provider {
                status: Some(status),
                ..
            } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Check if this is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_display_is_message() {
        let err = Error::provider("create_token", Some(401), "Unauthorized");
        assert_eq!(err.to_string(), "Unauthorized");
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn test_retryable_classification() {
        assert!(Error::provider("streaming.new", Some(503), "busy").is_retryable());
        assert!(Error::provider("streaming.new", Some(429), "slow down").is_retryable());
        assert!(!Error::provider("streaming.new", Some(400), "bad").is_retryable());
        assert!(!Error::provider("streaming.new", None, "no token").is_retryable());
        assert!(!Error::configuration("missing key").is_retryable());
        assert!(!Error::NotConnected.is_retryable());
    }

    #[test]
    fn test_configuration_check() {
        assert!(Error::configuration("missing").is_configuration());
        assert!(!Error::Cancelled.is_configuration());
    }
}
