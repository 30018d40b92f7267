//! In-memory storage implementation
//!
//! Suitable for tests of components layered on top of [`LogStorage`].
//! Nothing is persisted.

use async_trait::async_trait;
use logwell_core::LogRecord;
use tokio::sync::RwLock;
use tracing::trace;

use crate::error::StorageError;
use crate::{LogStorage, StorageInfo};

/// In-memory implementation of LogStorage
#[derive(Debug, Default)]
pub struct InMemoryLogStore {
    logs: RwLock<Vec<LogRecord>>,
}

impl InMemoryLogStore {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `logs`, in append order
    pub fn with_records(logs: Vec<LogRecord>) -> Self {
        Self {
            logs: RwLock::new(logs),
        }
    }
}

#[async_trait]
impl LogStorage for InMemoryLogStore {
    async fn initialize(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<LogRecord>, StorageError> {
        Ok(self.logs.read().await.clone())
    }

    async fn append(&self, record: LogRecord) -> Result<LogRecord, StorageError> {
        trace!(level = %record.level, "Appending record (memory)");
        self.logs.write().await.push(record.clone());
        Ok(record)
    }

    async fn reset(&self) -> Result<(), StorageError> {
        self.logs.write().await.clear();
        Ok(())
    }

    async fn info(&self) -> StorageInfo {
        let logs = self.logs.read().await;
        let size = serde_json::to_vec(&*logs)
            .map(|bytes| bytes.len() as u64)
            .unwrap_or(0);
        StorageInfo {
            exists: true,
            size,
            log_count: logs.len(),
            valid: true,
        }
    }
}
