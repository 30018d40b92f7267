//! The query engine
//!
//! Validates candidates on the way in, and filters, orders and aggregates
//! store snapshots on the way out. Holds no state of its own between calls.

use std::collections::BTreeMap;
use std::sync::Arc;

use logwell_core::{FilterSet, LogLevel, LogRecord, NewLogRecord, Timestamp};
use logwell_storage::{LogStorage, StorageInfo};
use tracing::{debug, instrument};

use crate::error::{QueryError, QueryResult};
use crate::stats::{LogStats, tally_levels};

/// Validation, filtering, ordering and aggregation over a [`LogStorage`]
#[derive(Clone)]
pub struct QueryEngine {
    store: Arc<dyn LogStorage>,
}

impl QueryEngine {
    /// Create an engine over the given store
    pub fn new(store: Arc<dyn LogStorage>) -> Self {
        Self { store }
    }

    /// Validate a candidate and persist it
    ///
    /// A missing timestamp is resolved to the current instant.
    ///
    /// # Errors
    ///
    /// - [`QueryError::InvalidLevel`] if the level is not legal
    /// - [`QueryError::EmptyMessage`] if the message is blank
    /// - [`QueryError::InvalidTimestamp`] if a supplied timestamp is not canonical
    /// - [`QueryError::Storage`] if the append fails (write failure, lock timeout)
    #[instrument(skip(self, candidate), fields(level = %candidate.level))]
    pub async fn submit(&self, candidate: NewLogRecord) -> QueryResult<LogRecord> {
        let record = validate(candidate, Timestamp::now)?;
        let record = self.store.append(record).await?;
        debug!(timestamp = %record.timestamp, "Accepted log record");
        Ok(record)
    }

    /// Records matching every active predicate, most recent first
    ///
    /// Records with equal timestamps keep their append order.
    pub async fn query(&self, filter: &FilterSet) -> QueryResult<Vec<LogRecord>> {
        let mut records = self.store.read_all().await?;
        if !filter.is_empty() {
            records.retain(|record| filter.matches(record));
        }
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(records)
    }

    /// Number of persisted records
    pub async fn count(&self) -> QueryResult<usize> {
        Ok(self.store.read_all().await?.len())
    }

    /// Records per level; levels without records are absent
    pub async fn count_by_level(&self) -> QueryResult<BTreeMap<LogLevel, usize>> {
        let records = self.store.read_all().await?;
        Ok(tally_levels(&records))
    }

    /// Summary statistics as of `now`, from a single snapshot
    pub async fn stats(&self, now: Timestamp) -> QueryResult<LogStats> {
        let records = self.store.read_all().await?;
        Ok(LogStats::compute(&records, now))
    }

    /// Discard every record
    pub async fn reset(&self) -> QueryResult<()> {
        self.store.reset().await?;
        Ok(())
    }

    /// Diagnostic description of the backing store
    pub async fn storage_info(&self) -> StorageInfo {
        self.store.info().await
    }
}

/// Turn a candidate into a record, or explain why it is not one
///
/// `now` is only called when the candidate carries no timestamp.
pub fn validate(
    candidate: NewLogRecord,
    now: impl FnOnce() -> Timestamp,
) -> QueryResult<LogRecord> {
    let level: LogLevel = candidate.level.parse()?;

    if candidate.message.trim().is_empty() {
        return Err(QueryError::EmptyMessage);
    }

    let timestamp = match candidate.timestamp.as_deref() {
        Some(raw) => Timestamp::parse_canonical(raw)?,
        None => now(),
    };

    Ok(LogRecord {
        level,
        message: candidate.message,
        resource_id: candidate.resource_id,
        timestamp,
        trace_id: candidate.trace_id,
        span_id: candidate.span_id,
        commit: candidate.commit,
        metadata: candidate.metadata,
    })
}
