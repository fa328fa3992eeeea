//! Result and error types for the core library

use thiserror::Error;

/// Core library error type
///
/// Callers can always distinguish "no rules configured" from "the request
/// failed": transport-level failures propagate as [`Error::Transport`]
/// instead of degrading to an empty result.
#[derive(Error, Debug)]
pub enum Error {
    /// Local misconfiguration (empty token, bad endpoint URL). Not
    /// retryable without fixing setup.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The server accepted the request but reported a logical error.
    /// Display format matches the upstream convention: `title: detail(type)`.
    #[error("{title}: {detail}({kind})")]
    Remote {
        title: String,
        detail: String,
        kind: String,
    },

    /// HTTP-level failure: non-2xx status, connection error, timeout.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create an API-reported error
    pub fn remote(
        title: impl Into<String>,
        detail: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self::Remote {
            title: title.into(),
            detail: detail.into(),
            kind: kind.into(),
        }
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;
