// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub http: HttpConfig,
    pub performance: PerformanceConfig,
    #[serde(default)]
    pub forms: FormsConfig,
    pub storage: StorageConfig,
    pub notifier: NotifierConfig,
    pub preview: PreviewConfig,
}

/// Forms server listener configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
    /// Output format: `text` or `json`
    pub format: String,
    pub access_log: bool,
    /// Log file path (optional, stdout if not set)
    #[serde(default)]
    pub log_file: Option<String>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub enable_cors: bool,
    pub max_body_size: u64,
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    /// Seconds before an idle or slow connection is dropped
    pub connection_timeout: u64,
    #[serde(default)]
    pub max_connections: Option<u64>,
    /// Seconds in-flight connections get to finish after a shutdown signal
    pub shutdown_timeout: u64,
}

/// Collaborator settings shared by both form handlers.
///
/// All three are required for a working deployment, but a missing value is
/// carried as `None` and only fails when the store or notifier is called.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct FormsConfig {
    #[serde(default)]
    pub table_name: Option<String>,
    #[serde(default)]
    pub from_email: Option<String>,
    #[serde(default)]
    pub to_email: Option<String>,
}

/// Storage backend selection
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    File,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub data_dir: String,
}

/// Notifier backend selection
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotifierBackend {
    Smtp,
    Log,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotifierConfig {
    pub backend: NotifierBackend,
    pub smtp_host: String,
    pub smtp_port: u16,
    #[serde(default)]
    pub smtp_username: String,
    #[serde(default)]
    pub smtp_password: String,
}

/// Email template preview server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PreviewConfig {
    pub host: String,
    pub port: u16,
    /// Root of the routes tree scanned for templates
    pub routes_dir: String,
    pub template_suffix: String,
}
