//! Server bootstrap and serve loop

use std::future::Future;
use std::sync::Arc;

use logwell_query::QueryEngine;
use logwell_storage::JsonFileStore;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

use crate::broadcast::BroadcastHub;
use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::handlers::AppState;
use crate::router::{app, cors_layer};

/// The HTTP + WebSocket server
pub struct LogwellServer {
    config: ServerConfig,
}

impl LogwellServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Open the store and assemble shared state
    pub async fn state(&self) -> Result<AppState, ServerError> {
        let store = JsonFileStore::open(self.config.store_config()).await?;
        info!(path = %store.path().display(), "Log store ready");

        let engine = QueryEngine::new(Arc::new(store));
        let hub = Arc::new(BroadcastHub::new(self.config.broadcast_capacity));
        Ok(AppState::new(engine, hub))
    }

    /// Bind the configured address and serve until SIGINT or SIGTERM
    pub async fn run(self) -> Result<(), ServerError> {
        let listener = TcpListener::bind(self.config.bind).await?;
        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an existing listener until `shutdown` resolves
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let state = self.state().await?;
        let router = app(state, cors_layer(&self.config.cors_origin)?);

        let addr = listener.local_addr()?;
        info!("Log API available at http://{}/logs", addr);
        info!("WebSocket feed available at ws://{}/ws", addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Server shut down gracefully");
        Ok(())
    }
}

/// Listen for SIGTERM and SIGINT (Ctrl+C)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, starting graceful shutdown"),
        _ = terminate => info!("Received SIGTERM, starting graceful shutdown"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_serve_answers_health_and_shuts_down() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config = ServerConfig {
            data_file: temp_dir.path().join("logs.json"),
            ..Default::default()
        };

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let server = tokio::spawn(LogwellServer::new(config).serve(listener, async move {
            let _ = stop_rx.await;
        }));

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.contains("Server is healthy"));

        stop_tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .unwrap()
            .unwrap()
            .unwrap();

        assert!(temp_dir.path().join("logs.json").exists());
    }
}
