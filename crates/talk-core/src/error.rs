//! Error types for talk-core.

use thiserror::Error;

/// Result type alias using talk-core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Message surfaced when a failed response carries no `detail`
pub const GENERIC_FAILURE: &str = "Request failed";

/// Core error types for AI Talk client operations
#[derive(Error, Debug)]
pub enum Error {
    // Interceptor outcomes
    #[error("Unauthorized - credentials cleared, please log in again")]
    Unauthorized,

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    // Transport errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP error! status: {0}")]
    Status(u16),

    #[error("Payload of {actual} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: usize, actual: usize },

    // Streaming errors
    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Timed out waiting for stream data")]
    Timeout,

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Credential storage errors
    #[error("Credential storage error: {0}")]
    Storage(String),

    #[error("Credential store lock poisoned")]
    LockPoisoned,

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// HTTP status carried by this error, if the server produced one
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Unauthorized => Some(401),
            Error::Api { status, .. } => Some(*status),
            Error::Status(status) => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether this error stems from an expired or missing login
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_extraction() {
        assert_eq!(Error::Unauthorized.status(), Some(401));
        assert_eq!(
            Error::Api {
                status: 404,
                message: "Not found".into()
            }
            .status(),
            Some(404)
        );
        assert_eq!(Error::Status(500).status(), Some(500));
        assert_eq!(Error::Timeout.status(), None);
    }

    #[test]
    fn test_is_unauthorized() {
        assert!(Error::Unauthorized.is_unauthorized());
        assert!(Error::Status(401).is_unauthorized());
        assert!(!Error::Status(403).is_unauthorized());
    }

    #[test]
    fn test_display() {
        let err = Error::Api {
            status: 400,
            message: "用户名已存在".into(),
        };
        assert_eq!(err.to_string(), "API error 400: 用户名已存在");
        assert_eq!(Error::Status(502).to_string(), "HTTP error! status: 502");
    }
}
