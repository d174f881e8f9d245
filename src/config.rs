//! Process-wide configuration.
//!
//! Everything that would otherwise be global state (listener settings,
//! miss responses, log level) lives here and is handed to the router and
//! server at construction. Every section and field has a default, so a TOML
//! file only needs the keys it changes.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tokio::sync::Semaphore;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub router: RouterConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address, e.g. "127.0.0.1:3000".
    pub addr: String,
    /// Connections served concurrently; further accepts wait for a free slot.
    pub max_connections: usize,
    /// Requests with a larger `Content-Length` are answered with 413.
    pub max_body_bytes: usize,
    /// Request line plus headers; a larger head is answered with 431.
    pub max_header_bytes: usize,
    /// How long a client may take to send the request head.
    pub read_timeout_secs: u64,
}

impl ServerConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.addr.trim().is_empty() {
            return Err(Error::Config("server.addr must not be empty".to_string()));
        }
        if self.max_connections == 0 || self.max_connections > Semaphore::MAX_PERMITS {
            return Err(Error::Config(format!(
                "server.max_connections must be between 1 and {}",
                Semaphore::MAX_PERMITS
            )));
        }
        if self.max_header_bytes == 0 {
            return Err(Error::Config("server.max_header_bytes must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:3000".to_string(),
            max_connections: 256,
            max_body_bytes: 1024 * 1024,
            max_header_bytes: 16 * 1024,
            read_timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub not_found_message: String,
    pub method_not_allowed_message: String,
    /// List the registered methods in an `Allow` header on 405 responses.
    pub allow_header: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            not_found_message: "page not found".to_string(),
            method_not_allowed_message: "method not allowed".to_string(),
            allow_header: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set.
    pub level: String,
    pub compact: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            compact: false,
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Config> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        self.server.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.server.addr, "127.0.0.1:3000");
        assert_eq!(config.server.max_connections, 256);
        assert_eq!(config.router.not_found_message, "page not found");
        assert!(config.router.allow_header);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::from_toml_str(
            r#"
            [server]
            addr = "0.0.0.0:8080"

            [router]
            allow_header = false
            "#,
        )
        .unwrap();
        assert_eq!(config.server.addr, "0.0.0.0:8080");
        assert_eq!(config.server.read_timeout(), Duration::from_secs(5));
        assert!(!config.router.allow_header);
        assert_eq!(config.router.method_not_allowed_message, "method not allowed");
    }

    #[test]
    fn rejects_zero_connections() {
        let err = Config::from_toml_str("[server]\nmax_connections = 0\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn server_section_validates_on_its_own() {
        assert!(ServerConfig::default().validate().is_ok());

        let too_many = ServerConfig {
            max_connections: Semaphore::MAX_PERMITS + 1,
            ..ServerConfig::default()
        };
        assert!(matches!(too_many.validate(), Err(Error::Config(_))));

        let no_head = ServerConfig {
            max_header_bytes: 0,
            ..ServerConfig::default()
        };
        assert!(matches!(no_head.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn reports_parse_errors() {
        let err = Config::from_toml_str("[server]\naddr = 42\n").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\nlevel = \"debug\"\ncompact = true").unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.compact);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Config::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
