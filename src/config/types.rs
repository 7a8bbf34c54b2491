// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory every request path is resolved against
    pub root: PathBuf,
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            root: PathBuf::from("."),
            workers: None,
        }
    }
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HttpConfig {
    pub server_name: String,
    pub index_files: Vec<String>,
    pub directory_listing: bool,
    /// Extra extension -> MIME type entries merged over the built-in table
    pub mime_types: HashMap<String, String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            server_name: default_server_name(),
            index_files: vec!["index.html".to_string(), "index.htm".to_string()],
            directory_listing: true,
            mime_types: HashMap::new(),
        }
    }
}

fn default_server_name() -> String {
    format!("coi-serve/{}", env!("CARGO_PKG_VERSION"))
}

/// Log verbosity, ordered from least to most verbose
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    pub error_log_file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            access_log: true,
            access_log_format: "combined".to_string(),
            access_log_file: None,
            error_log_file: None,
        }
    }
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    /// Seconds allowed for a request head to arrive; 0 disables the limit.
    /// Response bodies are never cut off.
    pub read_timeout: u64,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            keep_alive: true,
            read_timeout: 30,
        }
    }
}
