//! WebSocket endpoint for the live feed

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use logwell_core::Timestamp;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::broadcast::{BroadcastHub, frame};
use crate::handlers::AppState;

/// Greeting sent right after the upgrade
pub const WELCOME_MESSAGE: &str = "Connected to log ingestion system";

/// Commands a client may send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCommand {
    Subscribe,
    Unsubscribe,
    Ping,
}

#[derive(Deserialize)]
struct CommandEnvelope {
    event: String,
}

impl ClientCommand {
    /// Parse a text frame: a bare event name or `{"event": "..."}`
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let name = if text.starts_with('{') {
            serde_json::from_str::<CommandEnvelope>(text).ok()?.event
        } else {
            text.to_string()
        };

        match name.as_str() {
            "subscribe_logs" => Some(ClientCommand::Subscribe),
            "unsubscribe_logs" => Some(ClientCommand::Unsubscribe),
            "ping" => Some(ClientCommand::Ping),
            _ => None,
        }
    }
}

/// GET /ws
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let hub = Arc::clone(&state.hub);
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

async fn send_frame(socket: &mut WebSocket, frame: &Value) -> Result<(), axum::Error> {
    socket.send(Message::Text(frame.to_string().into())).await
}

async fn handle_socket(mut socket: WebSocket, hub: Arc<BroadcastHub>) {
    let _guard = hub.connect();
    let mut events = hub.subscribe();
    let mut subscribed = false;
    info!(connected_clients = hub.connected_clients(), "WebSocket client connected");

    let welcome = frame(
        "connected",
        json!({ "message": WELCOME_MESSAGE, "timestamp": Timestamp::now() }),
    );
    if send_frame(&mut socket, &welcome).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Text(text))) => match ClientCommand::parse(text.as_str()) {
                    Some(ClientCommand::Subscribe) => {
                        subscribed = true;
                        debug!("Client subscribed to log updates");
                    }
                    Some(ClientCommand::Unsubscribe) => {
                        subscribed = false;
                        debug!("Client unsubscribed from log updates");
                    }
                    Some(ClientCommand::Ping) => {
                        let pong = frame("pong", json!({ "timestamp": Timestamp::now() }));
                        if send_frame(&mut socket, &pong).await.is_err() {
                            break;
                        }
                    }
                    None => debug!(frame = %text.as_str(), "Ignoring unknown client frame"),
                },
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(error = %e, "WebSocket receive failed");
                    break;
                }
            },
            event = events.recv() => match event {
                Ok(event) => {
                    if event.subscribers_only() && !subscribed {
                        continue;
                    }
                    if send_frame(&mut socket, &event.to_frame()).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "WebSocket client lagged; dropping missed events");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    info!("WebSocket client disconnected");
}
