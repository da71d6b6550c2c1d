use thiserror::Error;

/// Failures of record listing calls; these fail the whole request
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream API error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("upstream request timed out")]
    Timeout,

    #[error("upstream request failed: {0}")]
    Network(String),

    #[error("upstream response could not be decoded: {0}")]
    Decode(String),

    #[error("upstream pagination stalled at offset {offset} with {fetched} of {total} records")]
    IncompletePagination {
        offset: usize,
        fetched: usize,
        total: usize,
    },

    #[error("upstream pagination exceeded {0} pages")]
    TooManyPages(usize),

    #[error("invalid upstream client settings: {0}")]
    InvalidClient(String),
}

/// Outcome of a single file handle lookup attempt
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FileUrlError {
    #[error("rate limited (HTTP 429)")]
    RateLimited,

    #[error("HTTP {0}")]
    Status(u16),

    #[error("network failure: {0}")]
    Network(String),

    #[error("response did not contain a url")]
    MissingUrl,

    #[error("cannot build file url: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            UpstreamError::Timeout
        } else if e.is_decode() {
            UpstreamError::Decode(e.to_string())
        } else {
            UpstreamError::Network(e.to_string())
        }
    }
}

impl From<reqwest::Error> for FileUrlError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FileUrlError::Network("request timed out".to_string())
        } else {
            FileUrlError::Network(e.to_string())
        }
    }
}
