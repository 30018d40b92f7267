//! Log records and submission candidates

use serde::{Deserialize, Serialize};

use crate::level::LogLevel;
use crate::timestamp::Timestamp;

/// Caller-defined key/value data attached to a record
///
/// Stored and returned verbatim; key order is preserved.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// One persisted log entry
///
/// Records are created only through the append path and never change
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
    pub resource_id: String,
    pub timestamp: Timestamp,
    pub trace_id: String,
    pub span_id: String,
    pub commit: String,
    pub metadata: Metadata,
}

/// A record as submitted, before validation
///
/// `level` is still free text and `timestamp` is optional; the query engine
/// turns this into a [`LogRecord`] or rejects it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLogRecord {
    pub level: String,
    pub message: String,
    pub resource_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub trace_id: String,
    pub span_id: String,
    pub commit: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl NewLogRecord {
    /// Create a candidate with the given level and message; other fields empty
    pub fn new(level: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = resource_id.into();
        self
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = trace_id.into();
        self
    }

    pub fn with_span_id(mut self, span_id: impl Into<String>) -> Self {
        self.span_id = span_id.into();
        self
    }

    pub fn with_commit(mut self, commit: impl Into<String>) -> Self {
        self.commit = commit.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_wire_shape_is_camel_case() {
        let record = LogRecord {
            level: LogLevel::Error,
            message: "db down".into(),
            resource_id: "r1".into(),
            timestamp: Timestamp::parse_canonical("2023-09-15T10:00:00.000Z").unwrap(),
            trace_id: "t1".into(),
            span_id: "s1".into(),
            commit: "c1".into(),
            metadata: Metadata::new(),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "level": "error",
                "message": "db down",
                "resourceId": "r1",
                "timestamp": "2023-09-15T10:00:00.000Z",
                "traceId": "t1",
                "spanId": "s1",
                "commit": "c1",
                "metadata": {}
            })
        );
    }

    #[test]
    fn test_metadata_preserves_key_order() {
        let raw = r#"{"zeta":1,"alpha":{"nested":[true,null]},"mid":"x"}"#;
        let metadata: Metadata = serde_json::from_str(raw).unwrap();
        assert_eq!(serde_json::to_string(&metadata).unwrap(), raw);
    }

    #[test]
    fn test_candidate_timestamp_optional() {
        let candidate: NewLogRecord = serde_json::from_value(json!({
            "level": "info",
            "message": "hello",
            "resourceId": "r",
            "traceId": "t",
            "spanId": "s",
            "commit": "c",
            "metadata": {"k": "v"}
        }))
        .unwrap();
        assert!(candidate.timestamp.is_none());
        assert_eq!(candidate.metadata["k"], "v");
    }
}
