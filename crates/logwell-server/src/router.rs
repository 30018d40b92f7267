//! Route table and middleware

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::ServerError;
use crate::handlers::{
    AppState, handle_create_log, handle_get_debug, handle_get_logs, handle_get_stats,
    handle_health, handle_not_found, handle_reset, handle_ws_status,
};
use crate::ws::ws_handler;

/// CORS for a single browser origin, with credentials
pub fn cors_layer(origin: &str) -> Result<CorsLayer, ServerError> {
    let origin: HeaderValue = origin
        .parse()
        .map_err(|_| ServerError::InvalidConfig(format!("Invalid CORS origin: {origin}")))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true))
}

/// Build the application router
pub fn app(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/ws", get(ws_handler))
        .route("/ws/status", get(handle_ws_status))
        .route("/logs", post(handle_create_log).get(handle_get_logs))
        .route("/logs/stats", get(handle_get_stats))
        .route("/logs/debug", get(handle_get_debug))
        .route("/logs/reset", post(handle_reset))
        .fallback(handle_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
