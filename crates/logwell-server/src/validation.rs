//! Request shape validation
//!
//! Bodies and query strings are checked here before anything reaches the
//! query engine, so that clients get field-specific messages.

use logwell_core::{FilterSet, LogLevel, Metadata, NewLogRecord, Timestamp, parse_instant};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;

/// Fields every submitted log must carry
pub const REQUIRED_FIELDS: [&str; 7] = [
    "level",
    "message",
    "resourceId",
    "traceId",
    "spanId",
    "commit",
    "metadata",
];

fn must_be_string<'a>(
    body: &'a serde_json::Map<String, Value>,
    field: &str,
) -> Result<&'a str, ApiError> {
    body.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::bad_request(format!("Field \"{field}\" must be a string")))
}

/// Check a POST /logs body and turn it into a candidate
pub fn parse_log_body(body: &Value) -> Result<NewLogRecord, ApiError> {
    let body = match body.as_object() {
        Some(map) if !map.is_empty() => map,
        _ => return Err(ApiError::bad_request("Request body is required")),
    };

    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| !body.contains_key(*field))
        .collect();
    if !missing.is_empty() {
        return Err(ApiError::bad_request(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    let level = must_be_string(body, "level")?;
    if level.parse::<LogLevel>().is_err() {
        return Err(ApiError::bad_request(format!(
            "Field \"level\" must be one of: {}",
            LogLevel::legal_values()
        )));
    }

    let message = must_be_string(body, "message")?;
    if message.trim().is_empty() {
        return Err(ApiError::bad_request("Field \"message\" cannot be empty"));
    }

    let resource_id = must_be_string(body, "resourceId")?;
    let trace_id = must_be_string(body, "traceId")?;
    let span_id = must_be_string(body, "spanId")?;
    let commit = must_be_string(body, "commit")?;

    let metadata: Metadata = match body.get("metadata") {
        Some(Value::Object(map)) => map.clone(),
        _ => return Err(ApiError::bad_request("Field \"metadata\" must be an object")),
    };

    let mut candidate = NewLogRecord::new(level, message)
        .with_resource_id(resource_id)
        .with_trace_id(trace_id)
        .with_span_id(span_id)
        .with_commit(commit)
        .with_metadata(metadata);

    if let Some(raw) = body.get("timestamp") {
        let Some(raw) = raw.as_str() else {
            return Err(ApiError::bad_request(
                "Field \"timestamp\" must be a string in ISO 8601 format",
            ));
        };
        if Timestamp::parse_canonical(raw).is_err() {
            return Err(ApiError::bad_request(
                "Field \"timestamp\" must be a valid ISO 8601 date string",
            ));
        }
        candidate = candidate.with_timestamp(raw);
    }

    Ok(candidate)
}

/// Query string of GET /logs
#[derive(Debug, Default, Deserialize)]
pub struct LogQueryParams {
    pub level: Option<String>,
    pub message: Option<String>,
    #[serde(rename = "resourceId")]
    pub resource_id: Option<String>,
    #[serde(rename = "traceId")]
    pub trace_id: Option<String>,
    #[serde(rename = "spanId")]
    pub span_id: Option<String>,
    pub commit: Option<String>,
    pub timestamp_start: Option<String>,
    pub timestamp_end: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn parse_bound(
    name: &str,
    value: Option<String>,
) -> Result<Option<chrono::DateTime<chrono::Utc>>, ApiError> {
    match non_empty(value) {
        Some(raw) => parse_instant(&raw).map(Some).map_err(|_| {
            ApiError::bad_request(format!(
                "Query parameter \"{name}\" must be a valid ISO 8601 date string"
            ))
        }),
        None => Ok(None),
    }
}

impl LogQueryParams {
    /// Validate and convert to a filter; empty parameters count as absent
    pub fn into_filter(self) -> Result<FilterSet, ApiError> {
        let level = match non_empty(self.level) {
            Some(raw) => Some(raw.parse::<LogLevel>().map_err(|_| {
                ApiError::bad_request(format!(
                    "Query parameter \"level\" must be one of: {}",
                    LogLevel::legal_values()
                ))
            })?),
            None => None,
        };

        Ok(FilterSet {
            level,
            message: non_empty(self.message),
            resource_id: non_empty(self.resource_id),
            trace_id: non_empty(self.trace_id),
            span_id: non_empty(self.span_id),
            commit: non_empty(self.commit),
            timestamp_start: parse_bound("timestamp_start", self.timestamp_start)?,
            timestamp_end: parse_bound("timestamp_end", self.timestamp_end)?,
        })
    }
}
