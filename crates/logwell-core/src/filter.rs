//! Read-side filter predicates

use chrono::{DateTime, Utc};

use crate::level::LogLevel;
use crate::record::LogRecord;

/// A set of optional predicates, combined with AND semantics
///
/// Text predicates set to the empty string behave as if absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    /// Exact level match
    pub level: Option<LogLevel>,
    /// Case-insensitive substring of the message
    pub message: Option<String>,
    /// Exact match
    pub resource_id: Option<String>,
    /// Exact match
    pub trace_id: Option<String>,
    /// Exact match
    pub span_id: Option<String>,
    /// Exact match
    pub commit: Option<String>,
    /// Inclusive lower bound on the timestamp
    pub timestamp_start: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the timestamp
    pub timestamp_end: Option<DateTime<Utc>>,
}

impl FilterSet {
    /// A filter set that matches every record
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    pub fn with_span_id(mut self, span_id: impl Into<String>) -> Self {
        self.span_id = Some(span_id.into());
        self
    }

    pub fn with_commit(mut self, commit: impl Into<String>) -> Self {
        self.commit = Some(commit.into());
        self
    }

    pub fn starting_at(mut self, start: DateTime<Utc>) -> Self {
        self.timestamp_start = Some(start);
        self
    }

    pub fn ending_at(mut self, end: DateTime<Utc>) -> Self {
        self.timestamp_end = Some(end);
        self
    }

    /// Whether no predicate is active
    pub fn is_empty(&self) -> bool {
        self.level.is_none()
            && active(&self.message).is_none()
            && active(&self.resource_id).is_none()
            && active(&self.trace_id).is_none()
            && active(&self.span_id).is_none()
            && active(&self.commit).is_none()
            && self.timestamp_start.is_none()
            && self.timestamp_end.is_none()
    }

    /// Whether `record` satisfies every active predicate
    pub fn matches(&self, record: &LogRecord) -> bool {
        if let Some(level) = self.level
            && record.level != level
        {
            return false;
        }

        if let Some(needle) = active(&self.message)
            && !record
                .message
                .to_lowercase()
                .contains(&needle.to_lowercase())
        {
            return false;
        }

        let exact = [
            (&self.resource_id, &record.resource_id),
            (&self.trace_id, &record.trace_id),
            (&self.span_id, &record.span_id),
            (&self.commit, &record.commit),
        ];
        if exact
            .iter()
            .any(|(wanted, actual)| active(wanted).is_some_and(|w| w != actual.as_str()))
        {
            return false;
        }

        let instant = record.timestamp.as_datetime();
        if self.timestamp_start.is_some_and(|start| instant < start) {
            return false;
        }
        if self.timestamp_end.is_some_and(|end| instant > end) {
            return false;
        }

        true
    }
}

fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
