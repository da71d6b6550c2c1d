//! Cache header helpers shared by the inventory handlers

use axum::http::HeaderValue;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Stale window advertised on listing responses
pub const LISTING_STALE_WHILE_REVALIDATE: Duration = Duration::from_secs(60);

/// `public, s-maxage=<ttl>, stale-while-revalidate=<swr>` in whole seconds
pub fn cache_control(ttl: Duration, stale_while_revalidate: Duration) -> HeaderValue {
    let value = format!(
        "public, s-maxage={}, stale-while-revalidate={}",
        ttl.as_secs(),
        stale_while_revalidate.as_secs()
    );
    // Only digits and ASCII punctuation, always a valid header value
    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("no-store"))
}

/// Instant at which a response produced at `now` stops being fresh
pub fn cached_until(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(now)
}
