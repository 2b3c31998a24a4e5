//! Error types for store operations.

use std::io;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The snapshot could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(String),

    /// The snapshot file is corrupted.
    #[error("store corrupted: {0}")]
    Corrupted(String),

    /// Another process holds the store directory.
    #[error("store locked: another process has exclusive access")]
    Locked,

    /// The store directory does not exist.
    #[error("store not found: {0}")]
    NotFound(String),
}

impl StoreError {
    /// Creates a codec error from any displayable error.
    pub fn codec(err: impl std::fmt::Display) -> Self {
        Self::Codec(err.to_string())
    }
}
