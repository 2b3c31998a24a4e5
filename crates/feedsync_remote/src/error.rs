//! Error types for remote calls.

use thiserror::Error;

/// Result type for remote calls.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// The two ways a remote call can fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// No usable response: connection failure, timeout or an undecodable body.
    #[error("network error: {0}")]
    Network(String),

    /// The server responded but declined the request.
    #[error("remote rejected request with status {code}: {message}")]
    Rejected {
        /// HTTP status code.
        code: u16,
        /// Server-provided reason, possibly empty.
        message: String,
    },
}

impl RemoteError {
    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a rejection with an empty message.
    pub fn rejected(code: u16) -> Self {
        Self::Rejected {
            code,
            message: String::new(),
        }
    }

    /// Returns true if the error is transient.
    pub fn is_network(&self) -> bool {
        matches!(self, RemoteError::Network(_))
    }
}
