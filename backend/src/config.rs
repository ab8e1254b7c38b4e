//! Application configuration file support.
//!
//! Configuration is read from a TOML file with three optional sections:
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//! body_limit_bytes = 10485760
//!
//! [storage]
//! type = "local"
//! fixture_path = "fixtures/demo.json"
//!
//! [scheduling]
//! max_range_days = 365
//! default_page_size = 20
//! max_suggestions = 5
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::db::repository::RepositoryError;

/// Environment variable pointing at an explicit configuration file.
pub const CONFIG_ENV_VAR: &str = "SHIFTPLAN_CONFIG";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub scheduling: SchedulingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

/// Storage backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(rename = "type", default = "default_storage_type")]
    pub repo_type: String,
    /// JSON fixture loaded into the local repository at startup.
    #[serde(default)]
    pub fixture_path: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            repo_type: default_storage_type(),
            fixture_path: None,
        }
    }
}

/// Planning limits shared by the service layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingConfig {
    #[serde(default = "default_max_range_days")]
    pub max_range_days: i64,
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            max_range_days: default_max_range_days(),
            default_page_size: default_page_size(),
            max_suggestions: default_max_suggestions(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_body_limit() -> usize {
    10 * 1024 * 1024
}

fn default_storage_type() -> String {
    "local".to_string()
}

fn default_max_range_days() -> i64 {
    365
}

fn default_page_size() -> usize {
    20
}

fn default_max_suggestions() -> usize {
    5
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            RepositoryError::configuration(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, RepositoryError> {
        toml::from_str(content).map_err(|e| {
            RepositoryError::configuration(format!("Failed to parse config file: {}", e))
        })
    }

    /// Locate and load the configuration.
    ///
    /// Lookup order:
    /// 1. the file named by `SHIFTPLAN_CONFIG` (an error if it cannot be read)
    /// 2. `shiftplan.toml`, then `backend/shiftplan.toml`
    /// 3. built-in defaults
    ///
    /// `HOST` and `PORT` override the `[server]` section afterwards.
    pub fn load() -> Result<Self, RepositoryError> {
        let mut config = match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim())?,
            _ => Self::from_default_location()?.unwrap_or_default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Returns `Ok(None)` when no file exists in the standard locations.
    pub fn from_default_location() -> Result<Option<Self>, RepositoryError> {
        let search_paths = [
            PathBuf::from("shiftplan.toml"),
            PathBuf::from("backend/shiftplan.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path).map(Some);
            }
        }
        Ok(None)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("HOST") {
            if !host.trim().is_empty() {
                self.server.host = host.trim().to_string();
            }
        }
        if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.trim().parse().ok()) {
            self.server.port = port;
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [scheduling]
            max_suggestions = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.scheduling.max_suggestions, 3);
        assert_eq!(config.scheduling.max_range_days, 365);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.repo_type, "local");
    }

    #[test]
    fn test_invalid_toml_is_a_configuration_error() {
        let err = AppConfig::from_toml_str("[server\nport = 1").unwrap_err();
        assert!(matches!(err, RepositoryError::ConfigurationError { .. }));
    }

    #[test]
    fn test_storage_type_key() {
        let config = AppConfig::from_toml_str(
            r#"
            [storage]
            type = "memory"
            fixture_path = "demo.json"
            "#,
        )
        .unwrap();
        assert_eq!(config.storage.repo_type, "memory");
        assert_eq!(config.storage.fixture_path, Some(PathBuf::from("demo.json")));
    }
}
