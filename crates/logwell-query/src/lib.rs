//! # Logwell Query
//!
//! The read/write front of the log core. [`QueryEngine`] validates
//! candidate records before handing them to a [`LogStorage`], and answers
//! filtered queries, counts and statistics from full store snapshots.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use logwell_core::{FilterSet, NewLogRecord};
//! use logwell_query::QueryEngine;
//! use logwell_storage::{JsonFileStore, StoreConfig};
//!
//! let store = JsonFileStore::open(StoreConfig::new("./data/logs.json")).await?;
//! let engine = QueryEngine::new(Arc::new(store));
//!
//! engine.submit(NewLogRecord::new("error", "db down").with_resource_id("r1")).await?;
//! let recent = engine.query(&FilterSet::new().with_resource_id("r1")).await?;
//! ```
//!
//! [`LogStorage`]: logwell_storage::LogStorage

pub mod engine;
pub mod error;
pub mod stats;

pub use engine::{QueryEngine, validate};
pub use error::{QueryError, QueryResult};
pub use stats::{LevelCounts, LogStats, RecentActivity, tally_levels};
