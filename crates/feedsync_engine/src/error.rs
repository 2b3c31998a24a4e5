//! Error types for the sync engine.

use feedsync_remote::RemoteError;
use feedsync_store::{ItemKey, StoreError};
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// An operation the state machine forbids in the row's current state.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalStateError {
    /// No row is stored under the key.
    #[error("item {0} not found")]
    NotFound(ItemKey),

    /// The row has no server identity yet.
    #[error("item {0} is not synced with the server yet")]
    Unsynced(ItemKey),
}

/// Errors surfaced by sync engine operations.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Connectivity failure or timeout; the operation may be retried.
    #[error("network error: {0}")]
    Network(String),

    /// The server explicitly declined the request.
    #[error("remote rejected request with status {code}")]
    RemoteRejected {
        /// HTTP status code.
        code: u16,
        /// Server-provided reason, possibly empty.
        message: String,
    },

    /// The caller attempted something the local state forbids.
    #[error("local state error: {0}")]
    LocalState(#[from] LocalStateError),

    /// The local store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Coarse classification of a [`SyncError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`SyncError::Network`].
    Network,
    /// See [`SyncError::RemoteRejected`].
    RemoteRejected,
    /// See [`SyncError::LocalState`].
    LocalState,
    /// See [`SyncError::Store`].
    Store,
}

impl SyncError {
    /// Returns the error's kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::Network(_) => ErrorKind::Network,
            SyncError::RemoteRejected { .. } => ErrorKind::RemoteRejected,
            SyncError::LocalState(_) => ErrorKind::LocalState,
            SyncError::Store(_) => ErrorKind::Store,
        }
    }

    /// Returns true if repeating the whole operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SyncError::Network(_))
    }

    /// Returns the rejection status code, if this is a rejection.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            SyncError::RemoteRejected { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<RemoteError> for SyncError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Network(message) => SyncError::Network(message),
            RemoteError::Rejected { code, message } => SyncError::RemoteRejected { code, message },
        }
    }
}
