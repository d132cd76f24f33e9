//! Where the client connects to.
//!
//! Read from a small JSON file (`connection.json` by default):
//!
//! ```json
//! { "host": "192.168.1.20", "port": 7777, "direct": "203.0.113.7" }
//! ```
//!
//! `host` is tried first and `direct` second. Missing fields take their
//! defaults. Building with the `force-default-connection` feature ignores the
//! file entirely.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use shared::DEFAULT_PORT;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Primary host address
    pub host: String,
    /// Port shared by both addresses
    pub port: u16,
    /// Fallback address used when the primary cannot be reached
    pub direct: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            direct: "127.0.0.1".to_string(),
        }
    }
}

impl ConnectionConfig {
    /// Loads the file at `path`, falling back to the defaults when it is
    /// missing or malformed.
    pub fn load(path: &Path) -> Self {
        if cfg!(feature = "force-default-connection") {
            info!("Using the built-in default connection");
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(text) => match Self::from_json(&text) {
                Ok(config) => {
                    info!("Loaded connection settings from {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("Ignoring malformed {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                info!("No connection file at {} ({}), using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Applies command line overrides on top of the loaded settings.
    pub fn with_overrides(
        mut self,
        host: Option<String>,
        port: Option<u16>,
        direct: Option<String>,
    ) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        if let Some(direct) = direct {
            self.direct = direct;
        }
        self
    }

    pub fn primary_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn fallback_addr(&self) -> String {
        format!("{}:{}", self.direct, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_file() {
        let config =
            ConnectionConfig::from_json(r#"{"host": "10.0.0.2", "port": 9000, "direct": "1.2.3.4"}"#)
                .unwrap();

        assert_eq!(config.primary_addr(), "10.0.0.2:9000");
        assert_eq!(config.fallback_addr(), "1.2.3.4:9000");
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = ConnectionConfig::from_json(r#"{"host": "example.org"}"#).unwrap();

        assert_eq!(config.host, "example.org");
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.direct, ConnectionConfig::default().direct);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(ConnectionConfig::from_json("{ host: ").is_err());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = ConnectionConfig::load(Path::new("/definitely/not/here/connection.json"));
        assert_eq!(config, ConnectionConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = ConnectionConfig::default().with_overrides(
            Some("192.168.0.9".to_string()),
            None,
            Some("10.1.1.1".to_string()),
        );

        assert_eq!(config.primary_addr(), format!("192.168.0.9:{}", DEFAULT_PORT));
        assert_eq!(config.fallback_addr(), format!("10.1.1.1:{}", DEFAULT_PORT));
    }
}
