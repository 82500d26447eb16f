//! Application configuration: chunking parameters plus the ambient
//! logging/runtime knobs, loadable from a TOML file.

use std::path::PathBuf;

use curv_chunk_core::{ChunkingConfig, HybridConfig, DEFAULT_SIGNAL_WINDOW};
use serde::{Deserialize, Serialize};
use tracing::Level;

/// Logging verbosity, independent of the `tracing` crate's own `Level` so
/// it can be parsed from TOML/CLI without pulling `tracing` into the
/// config's public surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::Info
    }
}

impl LogLevel {
    pub fn to_tracing_level(self) -> Level {
        match self {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

/// Top-level application configuration. Precedence when assembling the
/// effective configuration is CLI flags > TOML file > these defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub chunking: ChunkingConfig,
    pub hybrid: HybridConfig,
    /// Width, in bytes, of the window used for signal extraction.
    pub signal_window_bytes: usize,
    pub log_level: LogLevel,
    pub log_file: Option<PathBuf>,
    pub verbose: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            chunking: ChunkingConfig::default(),
            hybrid: HybridConfig::default(),
            signal_window_bytes: DEFAULT_SIGNAL_WINDOW,
            log_level: LogLevel::default(),
            log_file: None,
            verbose: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, falling back to defaults for
    /// any field the file omits.
    pub fn load(path: &std::path::Path) -> crate::error::Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| crate::error::AppError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| crate::error::AppError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }
}
