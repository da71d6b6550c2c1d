//! Upstream inventory API (no-code database) client
//!
//! - [`UpstreamClient`] - authenticated record listing and file handle lookups
//! - [`ListParams`] / [`Filter`] - query shape for list calls
//! - [`RawRecord`] - records as returned, keyed by opaque field ids
//!
//! Listing failures surface as [`UpstreamError`] and fail the caller's request.
//! File handle lookups surface as [`FileUrlError`] and are only ever consumed by
//! [`crate::resolver::FileUrlResolver`], which never lets them escape.

mod client;
mod error;
mod models;

pub use client::{HttpConfig, MAX_PAGES, PAGE_LIMIT, UpstreamClient, UpstreamCredentials};
pub use error::{FileUrlError, UpstreamError};
pub use models::{
    Comparison, FieldFilter, Filter, FilterOperator, ListParams, ListResponse, RawRecord, Sort,
    SortDirection,
};
