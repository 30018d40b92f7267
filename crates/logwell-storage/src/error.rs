//! Error types for logwell-storage
//!
//! This module defines the error types used throughout the storage crate.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur in storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// I/O error while reading the store
    #[error("I/O error: {0}")]
    Io(String),

    /// The store file exists but does not parse as a record document
    #[error("Store file {} is corrupt: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },

    /// The new document could not be written and swapped into place
    #[error("Failed to write store: {0}")]
    WriteFailed(String),

    /// The write lock was not obtained within the configured ceiling
    #[error("Timed out after {waited:?} waiting for the store write lock")]
    LockTimeout { waited: Duration },
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

impl StorageError {
    /// Create a new Corrupt error
    pub fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a new WriteFailed error
    pub fn write_failed(message: impl Into<String>) -> Self {
        Self::WriteFailed(message.into())
    }

    /// Whether retrying the same call later may succeed
    ///
    /// Only lock contention is transient; the store never retries internally.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StorageError::LockTimeout { .. })
    }
}
