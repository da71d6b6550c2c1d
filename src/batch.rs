//! Rate-limited batch resolution of many file handles
//!
//! Handles are deduplicated, split into chunks of `batch_size`, and each chunk
//! is resolved concurrently. A fixed `delay` separates consecutive chunks.
//! The concurrency ceiling plus inter-chunk pause keeps the request rate under
//! the upstream's unpublished limit without tracking its quota.

use async_trait::async_trait;
use futures::future::join_all;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::FetchConfig;
use crate::resolver::FileUrlResolver;

/// Resolved handles; a missing key means that handle could not be resolved
pub type HandleUrlMap = HashMap<String, String>;

/// Chunk size and inter-chunk pause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchBatchConfig {
    batch_size: usize,
    delay: Duration,
}

impl FetchBatchConfig {
    /// `batch_size` below 1 is treated as 1
    pub fn new(batch_size: usize, delay: Duration) -> Self {
        Self {
            batch_size: batch_size.max(1),
            delay,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for FetchBatchConfig {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500))
    }
}

impl From<&FetchConfig> for FetchBatchConfig {
    fn from(config: &FetchConfig) -> Self {
        Self::new(config.batch_size, config.batch_delay.as_duration())
    }
}

/// Anything that turns a list of handles into a (possibly partial) URL map
#[async_trait]
pub trait HandleBatchResolver: Send + Sync {
    async fn resolve_handles(&self, handles: &[String]) -> HandleUrlMap;
}

/// Chunked, concurrency-bounded resolver over [`FileUrlResolver`]
#[derive(Clone)]
pub struct BatchUrlFetcher {
    resolver: FileUrlResolver,
    config: FetchBatchConfig,
}

impl BatchUrlFetcher {
    pub fn new(resolver: FileUrlResolver, config: FetchBatchConfig) -> Self {
        Self { resolver, config }
    }

    /// Resolve `handles`, returning only the ones that succeeded
    pub async fn get_file_urls(&self, handles: &[String]) -> HandleUrlMap {
        let unique = dedupe(handles);
        let mut urls = HandleUrlMap::with_capacity(unique.len());

        if unique.is_empty() {
            return urls;
        }

        let batch_size = self.config.batch_size;
        let chunk_count = unique.len().div_ceil(batch_size);

        for (index, chunk) in unique.chunks(batch_size).enumerate() {
            if index > 0 {
                tokio::time::sleep(self.config.delay).await;
            }

            debug!(chunk = index + 1, chunk_count, size = chunk.len(), "Resolving handle chunk");

            let results = join_all(chunk.iter().map(|&handle| async move {
                (handle, self.resolver.get_file_url(handle).await)
            }))
            .await;

            for (handle, url) in results {
                if let Some(url) = url {
                    urls.insert(handle.to_string(), url);
                }
            }
        }

        info!(
            requested = handles.len(),
            unique = unique.len(),
            resolved = urls.len(),
            chunks = chunk_count,
            "Resolved file URLs"
        );

        urls
    }
}

#[async_trait]
impl HandleBatchResolver for BatchUrlFetcher {
    async fn resolve_handles(&self, handles: &[String]) -> HandleUrlMap {
        self.get_file_urls(handles).await
    }
}

/// First occurrence of each non-empty handle, in input order
fn dedupe(handles: &[String]) -> Vec<&str> {
    let mut seen = HashSet::with_capacity(handles.len());
    handles
        .iter()
        .map(String::as_str)
        .filter(|handle| !handle.is_empty() && seen.insert(*handle))
        .collect()
}
