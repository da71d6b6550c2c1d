use crate::humanize::HumanDuration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub fields: FieldMap,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    /// `s-maxage` advertised on listing responses
    #[serde(default = "default_listing_cache_ttl")]
    pub listing_cache_ttl: HumanDuration,
    /// `s-maxage` advertised on single-item responses
    #[serde(default = "default_detail_cache_ttl")]
    pub detail_cache_ttl: HumanDuration,
    /// Number of records returned by the homepage endpoint
    #[serde(default = "default_homepage_limit")]
    pub homepage_limit: usize,
    /// Sales status label a unit needs to appear in listings; empty disables the check
    #[serde(default = "default_in_stock_label")]
    pub in_stock_label: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            listing_cache_ttl: default_listing_cache_ttl(),
            detail_cache_ttl: default_detail_cache_ttl(),
            homepage_limit: default_homepage_limit(),
            in_stock_label: default_in_stock_label(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_listing_cache_ttl() -> HumanDuration {
    HumanDuration::from_secs(300)
}

fn default_detail_cache_ttl() -> HumanDuration {
    HumanDuration::from_secs(3600)
}

fn default_homepage_limit() -> usize {
    6
}

fn default_in_stock_label() -> String {
    "In Stock".to_string()
}

/// Upstream inventory API configuration
#[derive(Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Application (table) holding inventory records
    pub table_id: Option<String>,
    /// API token (loaded from environment, not from config file)
    #[serde(skip)]
    pub api_key: Option<String>,
    /// Account identifier (loaded from environment, not from config file)
    #[serde(skip)]
    pub account_id: Option<String>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout: HumanDuration,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: HumanDuration,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            table_id: None,
            api_key: None,
            account_id: None,
            request_timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("base_url", &self.base_url)
            .field("table_id", &self.table_id)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("account_id", &self.account_id)
            .field("request_timeout", &self.request_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

fn default_base_url() -> String {
    "https://app.smartsuite.com/api/v1".to_string()
}

fn default_request_timeout() -> HumanDuration {
    HumanDuration::from_secs(15)
}

fn default_connect_timeout() -> HumanDuration {
    HumanDuration::from_secs(5)
}

fn default_user_agent() -> String {
    format!("inventory-gateway/{}", env!("CARGO_PKG_VERSION"))
}

/// What an image gets when its handle could not be resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackMode {
    /// Leave `url` absent
    #[default]
    Unresolved,
    /// Substitute `fallback_template` with `{handle}` replaced
    CdnTemplate,
}

/// Image URL resolution and batching configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetchConfig {
    /// Concurrent resolutions per chunk
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Pause between chunks
    #[serde(default = "default_batch_delay")]
    pub batch_delay: HumanDuration,
    /// Total attempts per handle when rate limited (first try included)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_backoff_base")]
    pub backoff_base: HumanDuration,
    #[serde(default = "default_backoff_cap")]
    pub backoff_cap: HumanDuration,
    #[serde(default)]
    pub fallback: FallbackMode,
    #[serde(default = "default_fallback_template")]
    pub fallback_template: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            batch_delay: default_batch_delay(),
            max_attempts: default_max_attempts(),
            backoff_base: default_backoff_base(),
            backoff_cap: default_backoff_cap(),
            fallback: FallbackMode::default(),
            fallback_template: default_fallback_template(),
        }
    }
}

fn default_batch_size() -> usize {
    3
}

fn default_batch_delay() -> HumanDuration {
    HumanDuration::from_millis(500)
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_base() -> HumanDuration {
    HumanDuration::from_secs(1)
}

fn default_backoff_cap() -> HumanDuration {
    HumanDuration::from_secs(5)
}

fn default_fallback_template() -> String {
    "https://cdn.filestackcontent.com/{handle}".to_string()
}

/// Upstream field identifiers for the typed inventory shape
///
/// Upstream tables expose opaque generated keys; these defaults match the
/// dealer's inventory table and can be overridden per deployment.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FieldMap {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub full_description: String,
    pub year: String,
    pub model: String,
    pub vin: String,
    pub condition: String,
    pub sales_status: String,
    pub equipment_type: String,
    pub manufacturer: String,
    pub location: String,
    pub salesperson: String,
    pub price: String,
    pub quantity: String,
    /// Image fields in priority order; the first non-empty one is used
    pub images: Vec<String>,
}

impl Default for FieldMap {
    fn default() -> Self {
        Self {
            slug: "scccefe375".to_string(),
            title: "sd70909ac5".to_string(),
            description: "description".to_string(),
            full_description: "s3de57aeca".to_string(),
            year: "sc7cd7026e".to_string(),
            model: "s96205b0ac".to_string(),
            vin: "s01296f69c".to_string(),
            condition: "sb1892731b".to_string(),
            sales_status: "s934963a2a".to_string(),
            equipment_type: "se69701513".to_string(),
            manufacturer: "s47d53952b".to_string(),
            location: "s3aa410cc9".to_string(),
            salesperson: "sd7ea2e708".to_string(),
            price: "sbbb93f261".to_string(),
            quantity: "scc81eb170".to_string(),
            images: vec![
                "sc577d7e98".to_string(),
                "s7fea29195".to_string(),
                "s5c4a6b7c3".to_string(),
            ],
        }
    }
}
