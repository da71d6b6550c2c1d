//! Single file handle to public URL resolution
//!
//! Best effort: every handle gets at least one attempt, HTTP 429 is retried
//! with capped exponential backoff, and any failure ends as `None`. A bad
//! handle degrades one image, never the surrounding batch or request.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::FetchConfig;
use crate::observability::Metrics;
use crate::upstream::FileUrlError;

/// One lookup attempt against whatever stores the files
#[async_trait]
pub trait FileUrlSource: Send + Sync {
    async fn lookup_file_url(&self, handle: &str) -> Result<String, FileUrlError>;
}

/// Retry schedule for rate-limited lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl From<&FetchConfig> for RetryPolicy {
    fn from(config: &FetchConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: config.backoff_base.as_duration(),
            max_delay: config.backoff_cap.as_duration(),
        }
    }
}

impl RetryPolicy {
    /// Delay after failed attempt number `attempt` (1-based): base, 2x base, 4x base... capped
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }
}

/// Resolves one handle at a time with bounded retry on rate limiting
#[derive(Clone)]
pub struct FileUrlResolver {
    source: Arc<dyn FileUrlSource>,
    policy: RetryPolicy,
    metrics: Arc<Metrics>,
}

impl FileUrlResolver {
    pub fn new(source: Arc<dyn FileUrlSource>, policy: RetryPolicy, metrics: Arc<Metrics>) -> Self {
        Self {
            source,
            policy,
            metrics,
        }
    }

    /// Public URL for `handle`, or `None` once resolution has failed
    pub async fn get_file_url(&self, handle: &str) -> Option<String> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            self.metrics.lookup_attempted();

            match self.source.lookup_file_url(handle).await {
                Ok(url) => {
                    if attempt > 1 {
                        debug!(handle, attempt, "File URL resolved after retry");
                    }
                    self.metrics.url_resolved();
                    return Some(url);
                }
                Err(FileUrlError::RateLimited) if attempt < max_attempts => {
                    let delay = self.policy.backoff(attempt);
                    warn!(
                        handle,
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        "Rate limited, retrying file URL lookup"
                    );
                    self.metrics.rate_limit_retry();
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    warn!(handle, attempt, error = %e, "Failed to resolve file URL");
                    self.metrics.url_unresolved();
                    return None;
                }
            }
        }
    }
}
