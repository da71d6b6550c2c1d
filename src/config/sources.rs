use super::models::Config;
use config::{ConfigError, Environment, File};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "INVENTORY_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/inventory.toml";
const ENV_PREFIX: &str = "INVENTORY";
const ENV_SEPARATOR: &str = "__";

const API_KEY_VAR: &str = "SMARTSUITE_API_KEY";
const ACCOUNT_ID_VAR: &str = "SMARTSUITE_ACCOUNT_ID";
const TABLE_ID_VAR: &str = "SMARTSUITE_INVENTORY_TABLE_ID";

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
pub fn load(path: Option<PathBuf>) -> Result<Config, ConfigError> {
    // Load .env file if it exists (ignore errors if file doesn't exist)
    let _ = dotenvy::dotenv();

    let config_path = path.unwrap_or_else(|| {
        env::var(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
    });

    let mut config = load_from_sources(config_path)?;

    apply_secrets(&mut config, |name| env::var(name).ok());

    Ok(config)
}

/// Copy upstream credentials from the environment into config
/// Secrets are never stored in TOML files, only in environment
fn apply_secrets(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

    if let Some(api_key) = non_empty(API_KEY_VAR) {
        config.upstream.api_key = Some(api_key);
    }
    if let Some(account_id) = non_empty(ACCOUNT_ID_VAR) {
        config.upstream.account_id = Some(account_id);
    }

    // The table id is not secret, but deployments historically set it next to the credentials
    if config.upstream.table_id.is_none() {
        if let Some(table_id) = non_empty(TABLE_ID_VAR) {
            config.upstream.table_id = Some(table_id);
        }
    }
}

/// Load configuration from a specific path and environment
/// Useful for testing with custom config files
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::info!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::warn!(
            "Configuration file not found at {}, using defaults and environment overrides",
            config_path.display()
        );
    }

    // INVENTORY__FETCH__BATCH_SIZE -> fetch.batch_size
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    );

    let config = builder.build()?;
    config.try_deserialize()
}
