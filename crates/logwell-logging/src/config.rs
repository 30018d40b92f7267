//! Logging settings carried by the server's `[log]` table

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// What the server logs and where it goes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive, e.g. `info` or `logwell_storage=debug,info`.
    /// `RUST_LOG` wins when set.
    pub level: String,

    pub console: ConsoleConfig,

    /// JSONL copy of every event, off unless configured
    pub file: Option<FileConfig>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console: ConsoleConfig::default(),
            file: None,
        }
    }
}

impl LogConfig {
    /// Human-readable colored console, as used by `--pretty`
    pub fn with_pretty_console(mut self) -> Self {
        self.console.pretty = true;
        self.console.ansi = true;
        self
    }
}

/// Stdout output; JSONL unless `pretty` is set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub enabled: bool,
    pub pretty: bool,
    /// Colors; only honored by the pretty format
    pub ansi: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            pretty: false,
            ansi: false,
        }
    }
}

/// Rolling JSONL log file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub directory: PathBuf,
    /// File name prefix; files are named `<prefix>.<date>.log`
    pub prefix: String,
    pub rotation: RotationStrategy,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./logs"),
            prefix: "logwell".to_string(),
            rotation: RotationStrategy::Daily,
        }
    }
}

/// When the log file rolls over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RotationStrategy {
    #[default]
    Daily,
    /// A single `<prefix>.log`
    Never,
}
