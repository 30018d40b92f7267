//! Error types for the Logwell data model

use thiserror::Error;

use crate::level::LogLevel;

/// Errors raised while turning caller input into model values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The level is not one of the four legal values
    #[error("Invalid log level: {value}. Must be one of: {legal}")]
    InvalidLevel { value: String, legal: String },

    /// The timestamp is not a canonical instant
    #[error("Invalid timestamp: {value}. Must be ISO 8601 format (e.g. 2023-09-15T10:00:00.000Z)")]
    InvalidTimestamp { value: String },
}

impl CoreError {
    /// Create an InvalidLevel error naming the offending value and the legal set
    pub fn invalid_level(value: impl Into<String>) -> Self {
        Self::InvalidLevel {
            value: value.into(),
            legal: LogLevel::legal_values(),
        }
    }

    /// Create an InvalidTimestamp error
    pub fn invalid_timestamp(value: impl Into<String>) -> Self {
        Self::InvalidTimestamp {
            value: value.into(),
        }
    }
}
