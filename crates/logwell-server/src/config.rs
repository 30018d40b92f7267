//! Server configuration
//!
//! Resolved in three layers: built-in defaults, an optional TOML file, then
//! command line flags and their environment variables.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use logwell_logging::LogConfig;
use logwell_storage::StoreConfig;
use serde::{Deserialize, Serialize};

use crate::error::ServerError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP server listens on
    pub bind: SocketAddr,
    /// Path to the JSON store document
    pub data_file: PathBuf,
    /// Longest a writer waits for the store lock, in milliseconds
    pub lock_timeout_ms: u64,
    /// Whether to fsync every store write
    pub sync_on_write: bool,
    /// Origin allowed by CORS (credentials allowed)
    pub cors_origin: String,
    /// Live events buffered per WebSocket client before it lags
    pub broadcast_capacity: usize,
    /// Logging configuration
    pub log: LogConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 3001)),
            data_file: PathBuf::from("./data/logs.json"),
            lock_timeout_ms: 5_000,
            sync_on_write: true,
            cors_origin: "http://localhost:3000".to_string(),
            broadcast_capacity: 1024,
            log: LogConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load a config file; missing keys take their defaults
    pub fn from_file(path: &Path) -> Result<Self, ServerError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ServerError::ConfigFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        toml::from_str(&contents).map_err(|e| ServerError::ConfigFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Defaults, then the `--config` file, then flag/env overrides
    pub fn resolve(cli: &Cli) -> Result<Self, ServerError> {
        let mut config = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(bind) = cli.bind {
            config.bind = bind;
        }
        if let Some(port) = cli.port {
            config.bind.set_port(port);
        }
        if let Some(data_file) = &cli.data_file {
            config.data_file = data_file.clone();
        }
        if let Some(origin) = &cli.cors_origin {
            config.cors_origin = origin.clone();
        }
        if let Some(level) = &cli.log_level {
            config.log.level = level.clone();
        }
        if cli.pretty {
            config.log = config.log.with_pretty_console();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ServerError> {
        if self.broadcast_capacity == 0 {
            return Err(ServerError::InvalidConfig(
                "broadcast_capacity must be at least 1".into(),
            ));
        }
        if self.lock_timeout_ms == 0 {
            return Err(ServerError::InvalidConfig(
                "lock_timeout_ms must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    /// Store settings derived from this config
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(&self.data_file)
            .with_lock_timeout(self.lock_timeout())
            .with_sync_on_write(self.sync_on_write)
    }
}

#[derive(Debug, Default, Parser)]
#[command(name = "logwell-server", about = "Log ingestion service with a live WebSocket feed")]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, env = "LOGWELL_BIND")]
    pub bind: Option<SocketAddr>,

    /// Port to listen on (overrides the port of --bind)
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Path to the JSON store document
    #[arg(long, env = "LOGWELL_DATA_FILE")]
    pub data_file: Option<PathBuf>,

    /// Origin allowed by CORS
    #[arg(long, env = "FRONTEND_URL")]
    pub cors_origin: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Human-readable console logs instead of JSONL
    #[arg(long)]
    pub pretty: bool,
}
