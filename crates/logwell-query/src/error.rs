//! Error types for the query engine

use logwell_core::CoreError;
use logwell_storage::StorageError;
use thiserror::Error;

/// Errors returned by [`QueryEngine`](crate::QueryEngine) operations
#[derive(Debug, Error)]
pub enum QueryError {
    /// The submitted level is not legal
    #[error("Invalid log level: {value}. Must be one of: {legal}")]
    InvalidLevel { value: String, legal: String },

    /// The submitted timestamp is not a canonical instant
    #[error("Invalid timestamp: {value}. Must be ISO 8601 format (e.g. 2023-09-15T10:00:00.000Z)")]
    InvalidTimestamp { value: String },

    /// The submitted message is empty or whitespace
    #[error("Log message cannot be empty")]
    EmptyMessage,

    /// Storage failure
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<CoreError> for QueryError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidLevel { value, legal } => QueryError::InvalidLevel { value, legal },
            CoreError::InvalidTimestamp { value } => QueryError::InvalidTimestamp { value },
        }
    }
}

impl QueryError {
    /// Whether the caller's input was rejected (as opposed to an environment fault)
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            QueryError::InvalidLevel { .. }
                | QueryError::InvalidTimestamp { .. }
                | QueryError::EmptyMessage
        )
    }

    /// Whether retrying later may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, QueryError::Storage(e) if e.is_retryable())
    }
}

/// Result type alias for query engine operations
pub type QueryResult<T> = Result<T, QueryError>;
