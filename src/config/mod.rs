//! Configuration management for the inventory gateway
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use inventory_gateway::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Server listening on: {}", config.server.bind_addr);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `INVENTORY__<section>__<key>`
//!
//! Examples:
//! - `INVENTORY__SERVER__BIND_ADDR=0.0.0.0:9000`
//! - `INVENTORY__FETCH__BATCH_SIZE=4`
//! - `INVENTORY__FETCH__BATCH_DELAY=750ms`
//!
//! Upstream credentials are only read from `SMARTSUITE_API_KEY` and
//! `SMARTSUITE_ACCOUNT_ID`; `SMARTSUITE_INVENTORY_TABLE_ID` fills in the table
//! when the file does not name one.
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/inventory.toml`.
//! This can be overridden using the `INVENTORY_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

pub use crate::humanize::HumanDuration;
pub use models::{
    Config, FallbackMode, FetchConfig, FieldMap, ServerConfig, UpstreamConfig,
};
pub use validation::ValidationError;

use crate::upstream::UpstreamCredentials;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("{0} not configured")]
    MissingSetting(&'static str),

    #[error("Failed to build upstream client: {0}")]
    ClientError(String),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is malformed or a
    /// value fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(None)
    }

    /// Same as [`Config::load`] but with an explicit file path taking
    /// precedence over `INVENTORY_CONFIG`.
    pub fn load_with(path: Option<std::path::PathBuf>) -> Result<Self, ConfigError> {
        let config = sources::load(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path, without reading secrets
    ///
    /// Useful for testing with custom configuration files.
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }
}

impl UpstreamConfig {
    /// Credentials for the upstream client, or the first missing setting
    pub fn credentials(&self) -> Result<UpstreamCredentials, ConfigError> {
        let api_key = self
            .api_key
            .clone()
            .ok_or(ConfigError::MissingSetting("SMARTSUITE_API_KEY"))?;
        let account_id = self
            .account_id
            .clone()
            .ok_or(ConfigError::MissingSetting("SMARTSUITE_ACCOUNT_ID"))?;

        Ok(UpstreamCredentials::new(api_key, account_id))
    }

    /// The inventory table, required before any listing request
    pub fn require_table_id(&self) -> Result<&str, ConfigError> {
        self.table_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(ConfigError::MissingSetting("SMARTSUITE_INVENTORY_TABLE_ID"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[upstream]
table_id = "inventory"
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = Config::load_from_path(config_path).unwrap();
        assert_eq!(config.upstream.require_table_id().unwrap(), "inventory");
    }

    #[test]
    fn test_validation_runs_on_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[fetch]
batch_size = 0
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let result = Config::load_from_path(config_path);
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError(ValidationError::InvalidBatchSize)
        ));
    }

    #[test]
    fn test_credentials_require_both_values() {
        let mut upstream = UpstreamConfig::default();
        assert!(matches!(
            upstream.credentials(),
            Err(ConfigError::MissingSetting("SMARTSUITE_API_KEY"))
        ));

        upstream.api_key = Some("token".to_string());
        assert!(matches!(
            upstream.credentials(),
            Err(ConfigError::MissingSetting("SMARTSUITE_ACCOUNT_ID"))
        ));

        upstream.account_id = Some("account".to_string());
        let credentials = upstream.credentials().unwrap();
        assert_eq!(credentials.account_id(), "account");
    }

    #[test]
    fn test_missing_table_id() {
        let upstream = UpstreamConfig::default();
        assert!(matches!(
            upstream.require_table_id(),
            Err(ConfigError::MissingSetting("SMARTSUITE_INVENTORY_TABLE_ID"))
        ));
    }

    #[test]
    fn test_full_config_example() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[server]
bind_addr = "0.0.0.0:8080"
listing_cache_ttl = "5m"
detail_cache_ttl = "1h"
homepage_limit = 6
in_stock_label = "Available"

[upstream]
base_url = "https://app.smartsuite.com/api/v1"
table_id = "67a1b2c3d4"
request_timeout = "10s"
connect_timeout = "2s"

[fetch]
batch_size = 3
batch_delay = "500ms"
max_attempts = 3
backoff_base = "1s"
backoff_cap = "5s"
fallback = "unresolved"

[fields]
slug = "scccefe375"
images = ["sc577d7e98", "s7fea29195"]
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = Config::load_from_path(config_path).unwrap();

        assert_eq!(config.server.detail_cache_ttl.as_millis(), 3_600_000);
        assert_eq!(config.server.in_stock_label, "Available");
        assert_eq!(config.upstream.connect_timeout.as_millis(), 2_000);
        assert_eq!(config.fetch.backoff_cap.as_millis(), 5_000);
        assert_eq!(config.fields.images, vec!["sc577d7e98", "s7fea29195"]);
        // Unlisted field ids keep their defaults
        assert_eq!(config.fields.title, "sd70909ac5");
    }
}
