// Configuration module entry point
// Loads layered configuration: defaults, optional config file, environment

mod types;

use std::net::SocketAddr;

pub use types::{
    Config, FormsConfig, HttpConfig, LoggingConfig, NotifierBackend, NotifierConfig,
    PerformanceConfig, PreviewConfig, ServerConfig, StorageBackend, StorageConfig,
};

/// Environment variables carrying the collaborator settings
pub const TABLE_NAME_VAR: &str = "TROLLHAIR_TABLE_NAME";
pub const FROM_EMAIL_VAR: &str = "TROLLHAIR_FROM_EMAIL";
pub const TO_EMAIL_VAR: &str = "TROLLHAIR_TO_EMAIL";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("FORMS").separator("__"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "text")?
            .set_default("logging.access_log", true)?
            .set_default("http.server_name", "site-forms/0.1")?
            .set_default("http.enable_cors", false)?
            .set_default("http.max_body_size", 65_536)? // 64KB
            .set_default("performance.connection_timeout", 30)?
            .set_default("performance.shutdown_timeout", 10)?
            .set_default("storage.backend", "file")?
            .set_default("storage.data_dir", "data")?
            .set_default("notifier.backend", "log")?
            .set_default("notifier.smtp_host", "localhost")?
            .set_default("notifier.smtp_port", 587)?
            .set_default("preview.host", "127.0.0.1")?
            .set_default("preview.port", 3333)?
            .set_default("preview.routes_dir", "routes")?
            .set_default("preview.template_suffix", ".email.html")?
            .set_override_option("forms.table_name", std::env::var(TABLE_NAME_VAR).ok())?
            .set_override_option("forms.from_email", std::env::var(FROM_EMAIL_VAR).ok())?
            .set_override_option("forms.to_email", std::env::var(TO_EMAIL_VAR).ok())?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    pub fn get_preview_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.preview.host, self.preview.port)
            .parse()
            .map_err(|e| format!("Invalid preview address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("does-not-exist").unwrap();
        assert_eq!(cfg.preview.port, 3333);
        assert_eq!(cfg.preview.routes_dir, "routes");
        assert_eq!(cfg.preview.template_suffix, ".email.html");
        assert_eq!(cfg.storage.backend, StorageBackend::File);
        assert_eq!(cfg.notifier.backend, NotifierBackend::Log);
        assert_eq!(cfg.performance.shutdown_timeout, 10);
        assert!(cfg.get_socket_addr().is_ok());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forms.toml");
        std::fs::write(
            &path,
            "[server]\nport = 9090\n\n[storage]\nbackend = \"memory\"\n",
        )
        .unwrap();

        let stem = dir.path().join("forms");
        let cfg = Config::load_from(stem.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.storage.backend, StorageBackend::Memory);
    }
}
