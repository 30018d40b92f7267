//! Stress tests for logwell-storage
//!
//! These tests verify the JSON file store under concurrent writers and
//! readers racing writers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use logwell_core::{LogLevel, LogRecord, Metadata, Timestamp};
use logwell_storage::{JsonFileStore, LogStorage, StoreConfig};
use tempfile::TempDir;

fn record(i: usize) -> LogRecord {
    let mut metadata = Metadata::new();
    metadata.insert("writer".into(), serde_json::json!(i));
    LogRecord {
        level: LogLevel::ALL[i % 4],
        message: format!("concurrent message {}", i),
        resource_id: format!("resource-{}", i % 3),
        timestamp: Timestamp::now(),
        trace_id: format!("trace-{}", i),
        span_id: format!("span-{}", i),
        commit: "deadbeef".into(),
        metadata,
    }
}

async fn open_store(temp_dir: &TempDir) -> Arc<JsonFileStore> {
    let config = StoreConfig::new(temp_dir.path().join("logs.json"))
        .with_lock_timeout(Duration::from_secs(30))
        .with_sync_on_write(false);
    Arc::new(JsonFileStore::open(config).await.unwrap())
}

// ============================================================================
// Concurrent Writer Tests
// ============================================================================

/// Concurrent appends are serialized; none is dropped
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_appends_are_all_persisted() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir).await;
    let writers = 50;

    let start = Instant::now();
    let mut handles = vec![];
    for i in 0..writers {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move { store.append(record(i)).await }));
    }

    for handle in handles {
        handle.await.unwrap().expect("append should succeed");
    }
    println!("{} concurrent appends in {:?}", writers, start.elapsed());

    let records = store.read_all().await.unwrap();
    assert_eq!(records.len(), writers);

    let mut seen: Vec<String> = records.iter().map(|r| r.trace_id.clone()).collect();
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), writers, "every writer's record is present exactly once");
}

/// Readers racing writers always see a complete document
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_readers_never_observe_partial_writes() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir).await;
    let writes = 40;

    let writer = {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            for i in 0..writes {
                store.append(record(i)).await.unwrap();
            }
        })
    };

    let reader = {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            let mut last_len = 0;
            for _ in 0..200 {
                let records = store.read_all().await.expect("snapshot must always parse");
                assert!(records.len() >= last_len, "snapshots never go backwards");
                last_len = records.len();
                tokio::task::yield_now().await;
            }
        })
    };

    writer.await.unwrap();
    reader.await.unwrap();

    assert_eq!(store.read_all().await.unwrap().len(), writes);
}

/// Reset interleaved with appends leaves a well-formed store
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_reset_interleaved_with_appends() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir).await;

    let mut handles = vec![];
    for i in 0..20 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            if i == 10 {
                store.reset().await.map(|_| ())
            } else {
                store.append(record(i)).await.map(|_| ())
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let records = store.read_all().await.unwrap();
    assert!(records.len() <= 19);
    assert!(store.validate().await);
    assert_eq!(store.info().await.log_count, records.len());
}
