//! # Logwell Core
//!
//! Data model shared by every Logwell crate.
//!
//! ## Key Types
//!
//! - [`LogLevel`]: The four legal severities (`error`, `warn`, `info`, `debug`)
//! - [`Timestamp`]: A UTC instant with a single canonical, round-trippable text form
//! - [`LogRecord`]: One persisted log entry
//! - [`NewLogRecord`]: An unvalidated candidate submitted by a caller
//! - [`FilterSet`]: Optional predicates combined with AND semantics on read

pub mod error;
pub mod filter;
pub mod level;
pub mod record;
pub mod timestamp;

// Re-export main types
pub use error::*;
pub use filter::*;
pub use level::*;
pub use record::*;
pub use timestamp::*;
