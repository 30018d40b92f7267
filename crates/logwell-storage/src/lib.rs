//! # Logwell Storage
//!
//! Durable persistence for the append-only log record sequence.
//!
//! ## Features
//!
//! - **LogStorage trait**: Abstraction over the record store
//! - **JsonFileStore**: Single JSON file, replaced atomically on every write,
//!   writers serialized by a timeout-bounded lock
//! - **InMemoryLogStore**: In-memory implementation for tests
//!
//! ## Example
//!
//! ```rust,ignore
//! use logwell_storage::{JsonFileStore, LogStorage, StoreConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = JsonFileStore::open(StoreConfig::new("./data/logs.json"))
//!         .await
//!         .unwrap();
//!
//!     let records = store.read_all().await.unwrap();
//!     println!("{} records", records.len());
//! }
//! ```

pub mod error;
pub mod file;
pub mod memory;

// Re-exports
pub use error::StorageError;
pub use file::{JsonFileStore, StoreConfig};
pub use memory::InMemoryLogStore;

use async_trait::async_trait;
use logwell_core::LogRecord;
use serde::{Deserialize, Serialize};

/// Trait for the durable record store
///
/// Writers (`append`, `reset`) are mutually exclusive; readers never
/// observe a partially applied write.
#[async_trait]
pub trait LogStorage: Send + Sync {
    /// Ensure the backing store exists, creating an empty one if absent
    ///
    /// Safe to call on every startup.
    async fn initialize(&self) -> Result<(), StorageError>;

    /// Read a full snapshot of every persisted record, in append order
    ///
    /// A missing store is the initial state: it is recreated empty and an
    /// empty snapshot is returned.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Corrupt`] if the store exists but does not
    /// parse. It is never silently replaced.
    async fn read_all(&self) -> Result<Vec<LogRecord>, StorageError>;

    /// Append one record and persist the whole sequence atomically
    ///
    /// Returns the persisted record unchanged.
    async fn append(&self, record: LogRecord) -> Result<LogRecord, StorageError>;

    /// Replace the store with an empty record sequence
    async fn reset(&self) -> Result<(), StorageError>;

    /// Describe the backing store for diagnostics. Never fails.
    async fn info(&self) -> StorageInfo;
}

/// Diagnostic description of a store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageInfo {
    /// Whether the backing store exists
    pub exists: bool,
    /// Size of the persisted document in bytes
    pub size: u64,
    /// Number of records, zero when missing or unreadable
    pub log_count: usize,
    /// Whether the document parses as a record sequence
    pub valid: bool,
}
