//! Live event fanout to WebSocket clients
//!
//! The hub owns a `tokio::sync::broadcast` channel. Each connected socket
//! holds its own receiver and decides per event whether to forward it:
//! record and stats events only reach clients that sent `subscribe_logs`,
//! system notifications reach everyone.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use logwell_core::{LogRecord, Timestamp};
use logwell_query::{LevelCounts, LogStats};
use serde::Serialize;
use serde_json::{Value, json};
use tokio::sync::broadcast;
use tracing::debug;

/// Severity of a system notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

/// Payload of a `log_stats` event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsUpdate {
    pub logs_by_level: LevelCounts,
    pub total_logs: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_log: Option<LogRecord>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub reset: bool,
}

impl StatsUpdate {
    /// Counts after a record was accepted
    pub fn after_submit(stats: &LogStats, latest: LogRecord) -> Self {
        Self {
            logs_by_level: stats.logs_by_level,
            total_logs: stats.total_logs,
            latest_log: Some(latest),
            reset: false,
        }
    }

    /// Zeroed counts after the store was emptied
    pub fn after_reset() -> Self {
        Self {
            logs_by_level: LevelCounts::default(),
            total_logs: 0,
            latest_log: None,
            reset: true,
        }
    }
}

/// One event on the live feed
#[derive(Debug, Clone)]
pub enum LiveEvent {
    NewLog {
        record: LogRecord,
        timestamp: Timestamp,
    },
    Stats {
        update: StatsUpdate,
        timestamp: Timestamp,
    },
    Notification {
        level: NotificationLevel,
        message: String,
        timestamp: Timestamp,
    },
}

impl LiveEvent {
    /// Event name on the wire
    pub fn name(&self) -> &'static str {
        match self {
            LiveEvent::NewLog { .. } => "new_log",
            LiveEvent::Stats { .. } => "log_stats",
            LiveEvent::Notification { .. } => "system_notification",
        }
    }

    /// Whether only `subscribe_logs` clients receive this event
    pub fn subscribers_only(&self) -> bool {
        !matches!(self, LiveEvent::Notification { .. })
    }

    /// The `{event, data}` text frame sent to clients
    pub fn to_frame(&self) -> Value {
        let data = match self {
            LiveEvent::NewLog { record, timestamp } => json!({
                "type": "LOG_CREATED",
                "data": record,
                "timestamp": timestamp,
            }),
            LiveEvent::Stats { update, timestamp } => json!({
                "type": "STATS_UPDATE",
                "data": update,
                "timestamp": timestamp,
            }),
            LiveEvent::Notification {
                level,
                message,
                timestamp,
            } => json!({
                "type": "SYSTEM_NOTIFICATION",
                "level": level,
                "message": message,
                "timestamp": timestamp,
            }),
        };
        frame(self.name(), data)
    }
}

/// Wrap a payload in the `{event, data}` envelope
pub fn frame(event: &str, data: Value) -> Value {
    json!({ "event": event, "data": data })
}

/// Publish/subscribe hub shared by the HTTP handlers and socket tasks
#[derive(Debug)]
pub struct BroadcastHub {
    sender: broadcast::Sender<LiveEvent>,
    connected: Arc<AtomicUsize>,
}

impl BroadcastHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            connected: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Receiver for events published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<LiveEvent> {
        self.sender.subscribe()
    }

    /// Register a connected client; the count drops when the guard does
    pub fn connect(&self) -> ConnectionGuard {
        let now = self.connected.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(connected_clients = now, "Client connected");
        ConnectionGuard {
            connected: Arc::clone(&self.connected),
        }
    }

    pub fn connected_clients(&self) -> usize {
        self.connected.load(Ordering::SeqCst)
    }

    /// Publish an event; returns how many sockets will see it
    pub fn publish(&self, event: LiveEvent) -> usize {
        let name = event.name();
        match self.sender.send(event) {
            Ok(receivers) => {
                debug!(event = name, receivers, "Published live event");
                receivers
            }
            // No receivers is the normal state with no clients connected
            Err(_) => 0,
        }
    }

    pub fn publish_new_log(&self, record: LogRecord) -> usize {
        self.publish(LiveEvent::NewLog {
            record,
            timestamp: Timestamp::now(),
        })
    }

    pub fn publish_stats(&self, update: StatsUpdate) -> usize {
        self.publish(LiveEvent::Stats {
            update,
            timestamp: Timestamp::now(),
        })
    }

    pub fn publish_notification(
        &self,
        message: impl Into<String>,
        level: NotificationLevel,
    ) -> usize {
        self.publish(LiveEvent::Notification {
            level,
            message: message.into(),
            timestamp: Timestamp::now(),
        })
    }
}

/// Keeps a client counted while alive
#[derive(Debug)]
pub struct ConnectionGuard {
    connected: Arc<AtomicUsize>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let now = self.connected.fetch_sub(1, Ordering::SeqCst) - 1;
        debug!(connected_clients = now, "Client disconnected");
    }
}
