//! Error types for the server
//!
//! [`ApiError`] is what handlers return; it renders as
//! `{"success": false, "error": "..."}` with a status chosen from the
//! failure kind. [`ServerError`] covers startup and the serve loop.

use std::path::PathBuf;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use logwell_logging::LoggingError;
use logwell_query::QueryError;
use logwell_storage::StorageError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Failure of a single API request
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body or query parameters have the wrong shape
    #[error("{0}")]
    BadRequest(String),

    /// No route matched
    #[error("{0}")]
    NotFound(String),

    /// Failure reported by the query engine
    #[error(transparent)]
    Query(#[from] QueryError),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Query(e) if e.is_validation() => StatusCode::BAD_REQUEST,
            ApiError::Query(QueryError::Storage(StorageError::LockTimeout { .. })) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::Query(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError::Query(QueryError::Storage(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = %status, error = %self, "Request failed");
        }

        let body = json!({
            "success": false,
            "error": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

/// Failure to start or run the server
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to read config file {}: {reason}", .path.display())]
    ConfigFile { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Logging setup failed: {0}")]
    Logging(#[from] LoggingError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::bad_request("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Query(QueryError::EmptyMessage).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(StorageError::LockTimeout {
                waited: Duration::from_secs(5)
            })
            .status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(StorageError::corrupt("/tmp/logs.json", "eof")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(StorageError::write_failed("disk full")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_message_is_passed_through() {
        let err = ApiError::bad_request("Missing required fields: level, commit");
        assert_eq!(err.to_string(), "Missing required fields: level, commit");
    }
}
