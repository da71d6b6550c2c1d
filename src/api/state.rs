use std::sync::Arc;
use tracing::warn;

use super::error::ApiError;
use crate::catalog::Catalog;
use crate::config::{Config, ConfigError};
use crate::observability::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<Result<Catalog, ConfigError>>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    /// Build the catalog once; a configuration problem is kept and reported per request
    pub fn new(config: Config) -> Self {
        let metrics = Arc::new(Metrics::new());
        let catalog = Catalog::from_config(&config, metrics.clone());

        if let Err(e) = &catalog {
            warn!(error = %e, "Inventory source unavailable; inventory requests will fail");
        }

        Self {
            config: Arc::new(config),
            catalog: Arc::new(catalog),
            metrics,
        }
    }

    pub fn catalog(&self) -> Result<&Catalog, ApiError> {
        (*self.catalog).as_ref().map_err(ApiError::from)
    }

    pub fn upstream_configured(&self) -> bool {
        self.catalog.is_ok()
    }
}
