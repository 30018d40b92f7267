//! HTTP route handlers

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::{Method, StatusCode, Uri};
use axum::response::IntoResponse;
use logwell_core::{LogRecord, Timestamp};
use logwell_query::QueryEngine;
use serde_json::{Value, json};
use tracing::{info, instrument, warn};

use crate::broadcast::{BroadcastHub, NotificationLevel, StatsUpdate};
use crate::error::ApiError;
use crate::validation::{LogQueryParams, parse_log_body};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: QueryEngine,
    pub hub: Arc<BroadcastHub>,
}

impl AppState {
    pub fn new(engine: QueryEngine, hub: Arc<BroadcastHub>) -> Self {
        Self { engine, hub }
    }
}

/// GET /health
pub async fn handle_health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Server is healthy",
        "timestamp": Timestamp::now(),
        "connectedClients": state.hub.connected_clients(),
    }))
}

/// GET /ws/status
pub async fn handle_ws_status(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "success": true,
        "connectedClients": state.hub.connected_clients(),
        "timestamp": Timestamp::now(),
    }))
}

/// POST /logs
///
/// Persists the record, then publishes it and refreshed counts on the live
/// feed. A stats failure after a successful write is logged, not returned.
#[instrument(skip_all)]
pub async fn handle_create_log(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<LogRecord>), ApiError> {
    let Json(body) =
        body.map_err(|e| ApiError::bad_request(format!("Invalid JSON body: {}", e.body_text())))?;
    let candidate = parse_log_body(&body)?;

    let record = state.engine.submit(candidate).await?;
    info!(level = %record.level, resource_id = %record.resource_id, "Log created");

    state.hub.publish_new_log(record.clone());
    match state.engine.stats(Timestamp::now()).await {
        Ok(stats) => {
            state
                .hub
                .publish_stats(StatsUpdate::after_submit(&stats, record.clone()));
        }
        Err(e) => warn!(error = %e, "Failed to compute stats for live update"),
    }

    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /logs
pub async fn handle_get_logs(
    State(state): State<AppState>,
    params: Result<Query<LogQueryParams>, QueryRejection>,
) -> Result<Json<Vec<LogRecord>>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let filter = params.into_filter()?;
    let records = state.engine.query(&filter).await?;
    Ok(Json(records))
}

/// GET /logs/stats
pub async fn handle_get_stats(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let stats = state.engine.stats(Timestamp::now()).await?;
    Ok(Json(json!({ "success": true, "data": stats })))
}

/// GET /logs/debug
pub async fn handle_get_debug(State(state): State<AppState>) -> Json<Value> {
    let storage = state.engine.storage_info().await;
    Json(json!({
        "success": true,
        "debug": {
            "storage": storage,
            "isValid": storage.valid,
            "webSocket": {
                "connectedClients": state.hub.connected_clients(),
            },
            "timestamp": Timestamp::now(),
        },
    }))
}

/// POST /logs/reset
#[instrument(skip_all)]
pub async fn handle_reset(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.engine.reset().await?;
    info!("Storage reset");

    state
        .hub
        .publish_notification("Storage has been reset", NotificationLevel::Info);
    state.hub.publish_stats(StatsUpdate::after_reset());

    Ok(Json(json!({
        "success": true,
        "message": "Storage reset successfully",
    })))
}

/// Fallback for unmatched routes
pub async fn handle_not_found(method: Method, uri: Uri) -> impl IntoResponse {
    ApiError::NotFound(format!("Route {} {} not found", method, uri.path()))
}
