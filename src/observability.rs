//! Logging setup and image resolution counters

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber, honouring `RUST_LOG` (default `info`)
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // A second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Metrics handle for recording counters
#[derive(Debug, Default)]
pub struct Metrics {
    lookups_attempted: AtomicU64,
    urls_resolved: AtomicU64,
    urls_unresolved: AtomicU64,
    rate_limit_retries: AtomicU64,
    upstream_failures: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup_attempted(&self) {
        self.lookups_attempted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn url_resolved(&self) {
        self.urls_resolved.fetch_add(1, Ordering::Relaxed);
    }

    pub fn url_unresolved(&self) {
        self.urls_unresolved.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "urls_unresolved", "Metric incremented");
    }

    pub fn rate_limit_retry(&self) {
        self.rate_limit_retries.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "rate_limit_retries", "Metric incremented");
    }

    pub fn upstream_failed(&self) {
        self.upstream_failures.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "upstream_failures", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            lookups_attempted: self.lookups_attempted.load(Ordering::Relaxed),
            urls_resolved: self.urls_resolved.load(Ordering::Relaxed),
            urls_unresolved: self.urls_unresolved.load(Ordering::Relaxed),
            rate_limit_retries: self.rate_limit_retries.load(Ordering::Relaxed),
            upstream_failures: self.upstream_failures.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub lookups_attempted: u64,
    pub urls_resolved: u64,
    pub urls_unresolved: u64,
    pub rate_limit_retries: u64,
    pub upstream_failures: u64,
}
