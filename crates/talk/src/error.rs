//! Error types for talk.

use thiserror::Error;

/// Main error type for talk operations.
#[derive(Error, Debug)]
pub enum TalkError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Api(#[from] talk_core::Error),

    #[error("Not logged in. Run `talk auth login` first.")]
    NotLoggedIn,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl TalkError {
    /// Whether the client already surfaced this failure to the user
    /// (a login hint after 401, or a notification for other API errors).
    pub fn already_reported(&self) -> bool {
        match self {
            TalkError::Api(e) => notified(e),
            _ => false,
        }
    }
}

impl From<toml::de::Error> for TalkError {
    fn from(e: toml::de::Error) -> Self {
        TalkError::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for TalkError {
    fn from(e: toml::ser::Error) -> Self {
        TalkError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for TalkError {
    fn from(e: serde_json::Error) -> Self {
        TalkError::Serialization(e.to_string())
    }
}

/// Whether a command failure was already shown to the user by the client hooks
pub fn already_reported(err: &anyhow::Error) -> bool {
    if let Some(e) = err.downcast_ref::<TalkError>() {
        return e.already_reported();
    }
    err.downcast_ref::<talk_core::Error>().is_some_and(notified)
}

/// Errors the client hooks surface themselves: the 401 login hint, and a
/// notification for API failures, transport failures and oversized replies
fn notified(err: &talk_core::Error) -> bool {
    matches!(
        err,
        talk_core::Error::Unauthorized
            | talk_core::Error::Api { .. }
            | talk_core::Error::Http(_)
            | talk_core::Error::PayloadTooLarge { .. }
    )
}

/// Result type alias for talk operations.
pub type TalkResult<T> = Result<T, TalkError>;
