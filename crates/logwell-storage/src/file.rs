//! JSON file store
//!
//! The whole record sequence lives in one pretty-printed JSON document:
//!
//! ```text
//! { "logs": [ { "level": "info", "message": ..., ... }, ... ] }
//! ```
//!
//! Every write serializes the complete document to a sibling temp file,
//! syncs it, and renames it over the store file. Readers therefore see
//! either the old or the new document, never a truncated one.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use logwell_core::LogRecord;
use serde::{Deserialize, Serialize};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

use crate::error::StorageError;
use crate::{LogStorage, StorageInfo};

/// Configuration for a JSON file store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to the store document
    pub path: PathBuf,
    /// Longest a writer waits for the write lock before failing
    pub lock_timeout: Duration,
    /// Whether to fsync the new document before swapping it in
    pub sync_on_write: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/logs.json"),
            lock_timeout: Duration::from_secs(5),
            sync_on_write: true,
        }
    }
}

impl StoreConfig {
    /// Config for the given path with default lock timeout and syncing
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Set the write lock timeout
    pub fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }

    /// Enable or disable fsync on write
    pub fn with_sync_on_write(mut self, sync_on_write: bool) -> Self {
        self.sync_on_write = sync_on_write;
        self
    }
}

/// On-disk document, as read
#[derive(Debug, Deserialize)]
struct StoreDocument {
    logs: Vec<LogRecord>,
}

/// On-disk document, as written
#[derive(Debug, Serialize)]
struct StoreDocumentRef<'a> {
    logs: &'a [LogRecord],
}

/// Record store backed by a single JSON file
///
/// Writers hold `write_lock` for their whole read-modify-write sequence.
/// The lock is owned by this instance, so a single process must share one
/// `JsonFileStore` (typically behind an `Arc`) per file.
#[derive(Debug)]
pub struct JsonFileStore {
    config: StoreConfig,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Create a store without touching the filesystem
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            write_lock: Mutex::new(()),
        }
    }

    /// Create a store and make sure its file exists
    #[instrument(skip(config), fields(path = %config.path.display()))]
    pub async fn open(config: StoreConfig) -> Result<Self, StorageError> {
        let store = Self::new(config);
        store.initialize().await?;
        info!("Opened log store");
        Ok(store)
    }

    /// Path of the store document
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Whether the store document currently parses as a record sequence
    pub async fn validate(&self) -> bool {
        matches!(self.read_document().await, Ok(Some(_)))
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .config
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| OsString::from("logs.json"));
        name.push(".tmp");
        self.config.path.with_file_name(name)
    }

    /// Acquire the write lock, waiting at most `lock_timeout`
    ///
    /// Waiters are served in FIFO order. The guard releases the lock on
    /// drop, on every exit path.
    async fn lock_for_write(&self) -> Result<MutexGuard<'_, ()>, StorageError> {
        let waited = self.config.lock_timeout;
        tokio::time::timeout(waited, self.write_lock.lock())
            .await
            .map_err(|_| {
                debug!(
                    timeout_ms = u64::try_from(waited.as_millis()).unwrap_or(u64::MAX),
                    "Gave up waiting for store write lock"
                );
                StorageError::LockTimeout { waited }
            })
    }

    async fn ensure_parent_dir(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.config.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::write_failed(format!("{}: {}", parent.display(), e))
            })?;
        }
        Ok(())
    }

    /// Read and parse the document; `None` if the file does not exist
    async fn read_document(&self) -> Result<Option<Vec<LogRecord>>, StorageError> {
        let bytes = match tokio::fs::read(&self.config.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let document: StoreDocument = serde_json::from_slice(&bytes)
            .map_err(|e| StorageError::corrupt(&self.config.path, e.to_string()))?;
        Ok(Some(document.logs))
    }

    /// Replace the document atomically. Caller must hold the write lock.
    async fn write_document(&self, logs: &[LogRecord]) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(&StoreDocumentRef { logs })
            .map_err(|e| StorageError::write_failed(e.to_string()))?;
        let temp_path = self.temp_path();

        if let Err(e) = self.write_temp(&temp_path, &bytes).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(StorageError::write_failed(format!(
                "{}: {}",
                temp_path.display(),
                e
            )));
        }

        if let Err(e) = tokio::fs::rename(&temp_path, &self.config.path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(StorageError::write_failed(format!(
                "{}: {}",
                self.config.path.display(),
                e
            )));
        }

        Ok(())
    }

    /// Put an empty document back in place of a missing file
    ///
    /// Readers never wait on writers: when the lock is busy the recreate is
    /// left to whoever holds it, and failures only cost the empty file.
    async fn recreate_if_idle(&self) {
        let Ok(_guard) = self.write_lock.try_lock() else {
            debug!(path = %self.config.path.display(), "Log store missing, writer active");
            return;
        };

        if matches!(tokio::fs::try_exists(&self.config.path).await, Ok(true)) {
            return;
        }

        let recreated = match self.ensure_parent_dir().await {
            Ok(()) => self.write_document(&[]).await,
            Err(e) => Err(e),
        };
        match recreated {
            Ok(()) => debug!(path = %self.config.path.display(), "Recreated missing log store"),
            Err(e) => debug!(error = %e, "Could not recreate missing log store"),
        }
    }

    async fn write_temp(&self, temp_path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        let mut file = File::create(temp_path).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        if self.config.sync_on_write {
            file.sync_all().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl LogStorage for JsonFileStore {
    async fn initialize(&self) -> Result<(), StorageError> {
        let _guard = self.lock_for_write().await?;

        let exists = tokio::fs::try_exists(&self.config.path)
            .await
            .map_err(|e| StorageError::write_failed(e.to_string()))?;
        if exists {
            return Ok(());
        }

        self.ensure_parent_dir().await?;
        self.write_document(&[]).await?;
        debug!(path = %self.config.path.display(), "Created empty log store");
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<LogRecord>, StorageError> {
        match self.read_document().await? {
            Some(logs) => Ok(logs),
            None => {
                self.recreate_if_idle().await;
                Ok(Vec::new())
            }
        }
    }

    #[instrument(skip(self, record), fields(level = %record.level))]
    async fn append(&self, record: LogRecord) -> Result<LogRecord, StorageError> {
        let _guard = self.lock_for_write().await?;

        // Corrupt passes through untouched; other read faults fail the write
        let mut logs = match self.read_document().await {
            Ok(Some(logs)) => logs,
            Ok(None) => {
                self.ensure_parent_dir().await?;
                Vec::new()
            }
            Err(StorageError::Io(e)) => return Err(StorageError::write_failed(e)),
            Err(e) => return Err(e),
        };
        logs.push(record.clone());
        self.write_document(&logs).await?;

        debug!(total = logs.len(), "Appended log record");
        Ok(record)
    }

    #[instrument(skip(self))]
    async fn reset(&self) -> Result<(), StorageError> {
        let _guard = self.lock_for_write().await?;

        self.ensure_parent_dir().await?;
        self.write_document(&[]).await?;

        info!(path = %self.config.path.display(), "Log store reset");
        Ok(())
    }

    async fn info(&self) -> StorageInfo {
        let size = match tokio::fs::metadata(&self.config.path).await {
            Ok(metadata) => metadata.len(),
            Err(_) => {
                return StorageInfo {
                    exists: false,
                    size: 0,
                    log_count: 0,
                    valid: false,
                };
            }
        };

        match self.read_document().await {
            Ok(Some(logs)) => StorageInfo {
                exists: true,
                size,
                log_count: logs.len(),
                valid: true,
            },
            _ => StorageInfo {
                exists: true,
                size,
                log_count: 0,
                valid: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logwell_core::{LogLevel, Metadata, Timestamp};
    use tempfile::TempDir;
    use tokio_test::{assert_err, assert_ok};

    fn sample(message: &str) -> LogRecord {
        LogRecord {
            level: LogLevel::Warn,
            message: message.into(),
            resource_id: "server-1".into(),
            timestamp: Timestamp::parse_canonical("2023-09-15T10:00:00.000Z").unwrap(),
            trace_id: "trace-1".into(),
            span_id: "span-1".into(),
            commit: "abc123".into(),
            metadata: Metadata::new(),
        }
    }

    async fn create_test_store() -> (JsonFileStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config = StoreConfig::new(temp_dir.path().join("data").join("logs.json"))
            .with_lock_timeout(Duration::from_millis(100));
        let store = JsonFileStore::open(config).await.unwrap();
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_open_creates_directory_and_empty_document() {
        let (store, _temp) = create_test_store().await;

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value, serde_json::json!({ "logs": [] }));
        assert!(store.validate().await);
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let (store, _temp) = create_test_store().await;
        store.append(sample("kept")).await.unwrap();

        store.initialize().await.unwrap();
        store.initialize().await.unwrap();

        let records = store.read_all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "kept");
    }

    #[tokio::test]
    async fn test_append_persists_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("logs.json");

        {
            let store = JsonFileStore::open(StoreConfig::new(&path)).await.unwrap();
            for i in 0..5 {
                let returned = store.append(sample(&format!("entry {}", i))).await.unwrap();
                assert_eq!(returned.message, format!("entry {}", i));
            }
        }

        {
            let store = JsonFileStore::open(StoreConfig::new(&path)).await.unwrap();
            let records = store.read_all().await.unwrap();
            assert_eq!(records.len(), 5);
            assert_eq!(records[0].message, "entry 0");
            assert_eq!(records[4].message, "entry 4");
        }
    }

    #[tokio::test]
    async fn test_append_leaves_no_temp_file() {
        let (store, _temp) = create_test_store().await;
        store.append(sample("one")).await.unwrap();
        assert!(!store.temp_path().exists());
    }

    #[tokio::test]
    async fn test_missing_file_reads_as_empty_and_is_recreated() {
        let (store, _temp) = create_test_store().await;
        store.append(sample("gone soon")).await.unwrap();
        std::fs::remove_file(store.path()).unwrap();

        let records = store.read_all().await.unwrap();
        assert!(records.is_empty());
        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_surfaced_not_replaced() {
        let (store, _temp) = create_test_store().await;
        std::fs::write(store.path(), b"{ \"logs\": [ {\"level\": ").unwrap();

        let err = store.read_all().await.unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));

        let err = store.append(sample("new")).await.unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));

        // Still the corrupt bytes; nothing was silently discarded
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw, "{ \"logs\": [ {\"level\": ");
        assert!(!store.validate().await);
    }

    #[tokio::test]
    async fn test_illegal_level_on_disk_is_corrupt() {
        let (store, _temp) = create_test_store().await;
        let mut value = serde_json::json!({ "logs": [sample("x")] });
        value["logs"][0]["level"] = "fatal".into();
        std::fs::write(store.path(), value.to_string()).unwrap();

        assert_err!(store.read_all().await);
    }

    #[tokio::test]
    async fn test_reset_empties_store() {
        let (store, _temp) = create_test_store().await;
        for i in 0..3 {
            store.append(sample(&format!("{}", i))).await.unwrap();
        }

        assert_ok!(store.reset().await);
        assert!(store.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_writers_time_out_while_lock_is_held() {
        let (store, _temp) = create_test_store().await;

        let held = store.write_lock.lock().await;
        let err = store.append(sample("blocked")).await.unwrap_err();
        assert!(matches!(err, StorageError::LockTimeout { .. }));
        assert!(err.is_retryable());
        let err = store.reset().await.unwrap_err();
        assert!(matches!(err, StorageError::LockTimeout { .. }));

        // Readers are not blocked by the writer lock
        assert!(store.read_all().await.unwrap().is_empty());

        drop(held);
        assert_ok!(store.append(sample("unblocked")).await);
        assert_eq!(store.read_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_write_keeps_previous_document() {
        let (store, _temp) = create_test_store().await;
        store.append(sample("before")).await.unwrap();

        // A directory squatting on the temp path makes the write fail
        std::fs::create_dir(store.temp_path()).unwrap();

        let err = store.append(sample("after")).await.unwrap_err();
        assert!(matches!(err, StorageError::WriteFailed(_)));

        std::fs::remove_dir(store.temp_path()).unwrap();
        let records = store.read_all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "before");
    }

    #[tokio::test]
    async fn test_missing_file_read_does_not_wait_on_writer() {
        let (store, _temp) = create_test_store().await;
        store.append(sample("gone soon")).await.unwrap();

        let held = store.write_lock.lock().await;
        std::fs::remove_file(store.path()).unwrap();

        // Served immediately as empty; the busy writer owns the recreate
        let records = assert_ok!(store.read_all().await);
        assert!(records.is_empty());
        assert!(!store.path().exists());

        drop(held);
        assert!(store.read_all().await.unwrap().is_empty());
        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn test_unusable_parent_dir_is_write_failure() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, b"a plain file").unwrap();

        let store = JsonFileStore::new(
            StoreConfig::new(blocker.join("logs.json"))
                .with_lock_timeout(Duration::from_millis(100)),
        );

        let err = store.reset().await.unwrap_err();
        assert!(matches!(err, StorageError::WriteFailed(_)));
        let err = store.append(sample("nowhere")).await.unwrap_err();
        assert!(matches!(err, StorageError::WriteFailed(_)));
        let err = store.initialize().await.unwrap_err();
        assert!(matches!(err, StorageError::WriteFailed(_)));
    }

    #[tokio::test]
    async fn test_info_reports_state() {
        let (store, _temp) = create_test_store().await;
        store.append(sample("a")).await.unwrap();
        store.append(sample("b")).await.unwrap();

        let info = store.info().await;
        assert!(info.exists);
        assert!(info.valid);
        assert_eq!(info.log_count, 2);
        assert!(info.size > 0);

        std::fs::write(store.path(), b"not json").unwrap();
        let info = store.info().await;
        assert!(info.exists);
        assert!(!info.valid);
        assert_eq!(info.log_count, 0);

        std::fs::remove_file(store.path()).unwrap();
        let info = store.info().await;
        assert!(!info.exists);
    }
}
