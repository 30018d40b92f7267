//! # Logwell Server
//!
//! HTTP API and live WebSocket feed over the Logwell query engine.
//!
//! ## Routes
//!
//! | Method | Path | |
//! |---|---|---|
//! | GET | `/health` | liveness and connected client count |
//! | GET | `/ws` | WebSocket live feed |
//! | GET | `/ws/status` | connected client count |
//! | POST | `/logs` | submit a record (201) |
//! | GET | `/logs` | filtered records, newest first |
//! | GET | `/logs/stats` | totals, per-level counts, recent activity |
//! | GET | `/logs/debug` | storage diagnostics |
//! | POST | `/logs/reset` | discard every record |
//!
//! Errors render as `{"success": false, "error": "..."}`.

pub mod broadcast;
pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod validation;
pub mod ws;

pub use broadcast::{BroadcastHub, LiveEvent, NotificationLevel, StatsUpdate};
pub use config::{Cli, ServerConfig};
pub use error::{ApiError, ServerError};
pub use handlers::AppState;
pub use router::{app, cors_layer};
pub use server::LogwellServer;
