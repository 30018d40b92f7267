//! Structured logging setup for Logwell
//!
//! Builds the process-wide `tracing` subscriber used by the server binary.
//!
//! # Features
//!
//! - **JSONL Output**: Structured JSON lines on stdout (default)
//! - **Pretty Console**: Human-readable output for development
//! - **Log File**: Daily or single-file JSONL output via tracing-appender
//! - **RUST_LOG**: An `EnvFilter` from the environment overrides the configured level
//!
//! # Quick Start
//!
//! ```ignore
//! use logwell_logging::{LogConfig, LogwellSubscriberBuilder};
//!
//! // JSONL to console
//! let _guard = LogwellSubscriberBuilder::new().try_init()?;
//!
//! // Pretty human-readable output
//! let _guard = LogwellSubscriberBuilder::new()
//!     .with_config(LogConfig::default().with_pretty_console())
//!     .try_init()?;
//! ```
//!
//! Keep the returned [`WorkerGuard`] alive for as long as file output
//! should be flushed.

pub mod config;

pub use config::{ConsoleConfig, FileConfig, LogConfig, RotationStrategy};
pub use tracing_appender::non_blocking::WorkerGuard;

use thiserror::Error;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// The level filter sits directly on the registry so it gates every output
type FilteredRegistry = Layered<EnvFilter, Registry>;
type BoxedLayer = Box<dyn Layer<FilteredRegistry> + Send + Sync + 'static>;
type LogwellSubscriber = Layered<Vec<BoxedLayer>, FilteredRegistry>;

/// Errors raised while installing the subscriber
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid filter directive '{directive}': {reason}")]
    InvalidFilter { directive: String, reason: String },

    #[error("Failed to create log file appender: {0}")]
    Appender(#[from] InitError),

    #[error("Global subscriber already set: {0}")]
    AlreadyInitialized(#[from] TryInitError),
}

/// Builder for configuring and initializing the Logwell logging subscriber
///
/// By default, console output uses JSONL format.
pub struct LogwellSubscriberBuilder {
    config: LogConfig,
}

impl LogwellSubscriberBuilder {
    /// Create a new subscriber builder with default configuration
    pub fn new() -> Self {
        Self {
            config: LogConfig::default(),
        }
    }

    /// Use a specific configuration
    pub fn with_config(mut self, config: LogConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the level directive
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.config.level = level.into();
        self
    }

    /// Enable or disable console output
    pub fn with_console(mut self, enabled: bool) -> Self {
        self.config.console.enabled = enabled;
        self
    }

    /// Configure file output
    pub fn with_file_output(mut self, config: FileConfig) -> Self {
        self.config.file = Some(config);
        self
    }

    /// The configuration that will be installed
    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Try to initialize the subscriber globally
    ///
    /// Returns the file writer guard when file output is configured.
    pub fn try_init(self) -> Result<Option<WorkerGuard>, LoggingError> {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => parse_filter(&self.config.level)?,
        };

        let (subscriber, guard) = self.build(env_filter)?;
        subscriber.try_init()?;
        Ok(guard)
    }

    fn build(
        &self,
        env_filter: EnvFilter,
    ) -> Result<(LogwellSubscriber, Option<WorkerGuard>), LoggingError> {
        let mut layers: Vec<BoxedLayer> = Vec::new();
        let mut guard = None;

        let console = &self.config.console;
        if console.enabled {
            let layer = if console.pretty {
                tracing_subscriber::fmt::layer()
                    .with_ansi(console.ansi)
                    .with_target(true)
                    .boxed()
            } else {
                json_layer(std::io::stdout)
            };
            layers.push(layer);
        }

        if let Some(file_config) = &self.config.file {
            let appender = file_appender(file_config)?;
            let (non_blocking, worker_guard) = tracing_appender::non_blocking(appender);
            layers.push(json_layer(non_blocking));
            guard = Some(worker_guard);
        }

        let subscriber = tracing_subscriber::registry().with(env_filter).with(layers);
        Ok((subscriber, guard))
    }
}

impl Default for LogwellSubscriberBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_filter(directive: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(directive).map_err(|e| LoggingError::InvalidFilter {
        directive: directive.to_string(),
        reason: e.to_string(),
    })
}

/// One flattened JSON object per event, with the enclosing spans
fn json_layer<W>(writer: W) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .json()
        .flatten_event(true)
        .with_current_span(true)
        .with_span_list(true)
        .with_file(true)
        .with_line_number(true)
        .with_writer(writer)
        .boxed()
}

fn file_appender(file_config: &FileConfig) -> Result<RollingFileAppender, LoggingError> {
    let rotation = match file_config.rotation {
        RotationStrategy::Daily => Rotation::DAILY,
        RotationStrategy::Never => Rotation::NEVER,
    };

    let appender = RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(&file_config.prefix)
        .filename_suffix("log")
        .build(&file_config.directory)?;
    Ok(appender)
}
