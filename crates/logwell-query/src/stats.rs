//! Aggregate statistics over a snapshot

use std::collections::BTreeMap;

use chrono::Duration;
use logwell_core::{LogLevel, LogRecord, Timestamp};
use serde::{Deserialize, Serialize};

/// Window used for the recent-activity figure
pub const RECENT_WINDOW_HOURS: i64 = 24;

/// Count records per level; levels with no records are omitted
pub fn tally_levels(records: &[LogRecord]) -> BTreeMap<LogLevel, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(record.level).or_insert(0) += 1;
    }
    counts
}

/// Per-level counts with every level present
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCounts {
    pub error: usize,
    pub warn: usize,
    pub info: usize,
    pub debug: usize,
}

impl LevelCounts {
    /// Zero-fill a sparse tally
    pub fn from_tally(tally: &BTreeMap<LogLevel, usize>) -> Self {
        let get = |level| tally.get(&level).copied().unwrap_or(0);
        Self {
            error: get(LogLevel::Error),
            warn: get(LogLevel::Warn),
            info: get(LogLevel::Info),
            debug: get(LogLevel::Debug),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivity {
    /// Records strictly newer than 24 hours before the stats instant
    #[serde(rename = "last24Hours")]
    pub last_24_hours: usize,
    /// Percentage of error records, two decimals
    pub error_rate: f64,
}

/// Summary of the whole store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogStats {
    pub total_logs: usize,
    pub logs_by_level: LevelCounts,
    pub recent_activity: RecentActivity,
    /// When the stats were computed
    pub timestamp: Timestamp,
}

impl LogStats {
    /// Compute stats for a snapshot as of `now`
    pub fn compute(records: &[LogRecord], now: Timestamp) -> Self {
        let total_logs = records.len();
        let logs_by_level = LevelCounts::from_tally(&tally_levels(records));

        let cutoff = now.as_datetime() - Duration::hours(RECENT_WINDOW_HOURS);
        let last_24_hours = records
            .iter()
            .filter(|r| r.timestamp.as_datetime() > cutoff)
            .count();

        let error_rate = if total_logs > 0 {
            let pct = logs_by_level.error as f64 / total_logs as f64 * 100.0;
            (pct * 100.0).round() / 100.0
        } else {
            0.0
        };

        Self {
            total_logs,
            logs_by_level,
            recent_activity: RecentActivity {
                last_24_hours,
                error_rate,
            },
            timestamp: now,
        }
    }
}
