//! HTTP client for the upstream inventory API

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode, Url};
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

use super::error::{FileUrlError, UpstreamError};
use super::models::{FileUrlResponse, Filter, ListParams, ListResponse, RawRecord};
use crate::config::UpstreamConfig;
use crate::resolver::FileUrlSource;

pub type Result<T> = std::result::Result<T, UpstreamError>;

/// Largest page the upstream will return for one list call
pub const PAGE_LIMIT: usize = 1000;

/// Upper bound on list round trips for a single `list_all_records`
pub const MAX_PAGES: usize = 1000;

/// Token and account id sent with every request
#[derive(Clone)]
pub struct UpstreamCredentials {
    api_key: String,
    account_id: String,
}

impl UpstreamCredentials {
    pub fn new(api_key: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            account_id: account_id.into(),
        }
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }
}

impl fmt::Debug for UpstreamCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamCredentials")
            .field("api_key", &"<redacted>")
            .field("account_id", &self.account_id)
            .finish()
    }
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        let upstream = UpstreamConfig::default();
        Self::from(&upstream)
    }
}

impl From<&UpstreamConfig> for HttpConfig {
    fn from(config: &UpstreamConfig) -> Self {
        Self {
            connect_timeout: config.connect_timeout.as_duration(),
            request_timeout: config.request_timeout.as_duration(),
            user_agent: config.user_agent.clone(),
        }
    }
}

/// Authenticated client for record listing and file handle lookups
#[derive(Clone)]
pub struct UpstreamClient {
    http: Client,
    base_url: String,
    account_id: String,
    page_limit: usize,
}

impl fmt::Debug for UpstreamClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamClient")
            .field("base_url", &self.base_url)
            .field("account_id", &self.account_id)
            .field("page_limit", &self.page_limit)
            .finish()
    }
}

impl UpstreamClient {
    /// Create a new client; every request carries `config.request_timeout`
    pub fn new(
        base_url: impl Into<String>,
        credentials: UpstreamCredentials,
        config: HttpConfig,
    ) -> Result<Self> {
        let mut authorization = HeaderValue::from_str(&format!("Token {}", credentials.api_key))
            .map_err(|_| UpstreamError::InvalidClient("API key is not a valid header value".into()))?;
        authorization.set_sensitive(true);

        let account = HeaderValue::from_str(&credentials.account_id).map_err(|_| {
            UpstreamError::InvalidClient("account id is not a valid header value".into())
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(reqwest::header::AUTHORIZATION, authorization);
        headers.insert("account-id", account);

        let http = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .build()
            .map_err(|e| UpstreamError::InvalidClient(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            account_id: credentials.account_id,
            page_limit: PAGE_LIMIT,
        })
    }

    /// Build from loaded configuration
    pub fn from_config(config: &UpstreamConfig, credentials: UpstreamCredentials) -> Result<Self> {
        Self::new(config.base_url.clone(), credentials, HttpConfig::from(config))
    }

    /// Override the page size used by [`UpstreamClient::list_all_records`]
    pub fn with_page_limit(mut self, page_limit: usize) -> Self {
        self.page_limit = page_limit.max(1);
        self
    }

    /// Fetch one page of records from a table
    pub async fn list_records(&self, table_id: &str, params: &ListParams) -> Result<ListResponse> {
        let url = format!("{}/applications/{}/records/list/", self.base_url, table_id);

        debug!(table_id, offset = ?params.offset, limit = ?params.limit, "Listing upstream records");

        let response = self
            .http
            .post(&url)
            .query(&params.query_pairs())
            .json(&params.body())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(table_id, status = status.as_u16(), "Upstream list request failed");
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let page: ListResponse =
            serde_json::from_slice(&bytes).map_err(|e| UpstreamError::Decode(e.to_string()))?;

        debug!(table_id, items = page.items.len(), total = page.total, "Upstream page received");

        Ok(page)
    }

    /// Fetch every record of a table, one page at a time
    ///
    /// `offset` and `limit` in `params` are ignored. Stops once the reported
    /// `total` is reached; an empty page before that is an error rather than
    /// another round trip.
    pub async fn list_all_records(&self, table_id: &str, params: &ListParams) -> Result<Vec<RawRecord>> {
        let mut records = Vec::new();
        let mut offset = 0;

        for _ in 0..MAX_PAGES {
            let page_params = ListParams {
                offset: Some(offset),
                limit: Some(self.page_limit),
                ..params.clone()
            };

            let page = self.list_records(table_id, &page_params).await?;
            let received = page.items.len();
            let total = page.total;
            records.extend(page.items);

            if records.len() >= total {
                debug!(table_id, records = records.len(), "Fetched all upstream records");
                return Ok(records);
            }

            if received == 0 {
                return Err(UpstreamError::IncompletePagination {
                    offset,
                    fetched: records.len(),
                    total,
                });
            }

            offset += self.page_limit;
        }

        Err(UpstreamError::TooManyPages(MAX_PAGES))
    }

    /// First record whose `field` equals `value`
    pub async fn find_by_field(
        &self,
        table_id: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<RawRecord>> {
        let params = ListParams::builder()
            .filter(Filter::field_is(field, value))
            .limit(1)
            .build();

        let page = self.list_records(table_id, &params).await?;
        Ok(page.items.into_iter().next())
    }

    /// Single record by its upstream id
    pub async fn get_record(&self, table_id: &str, record_id: &str) -> Result<Option<RawRecord>> {
        self.find_by_field(table_id, "id", record_id).await
    }
}

impl UpstreamClient {
    /// `{base}/shared-files/{handle}/url/` with the handle escaped as one path segment
    fn file_url_endpoint(&self, handle: &str) -> std::result::Result<Url, FileUrlError> {
        // Dot segments would be dropped from the path rather than escaped
        if matches!(handle, "" | "." | "..") {
            return Err(FileUrlError::InvalidUrl(format!("unusable file handle '{handle}'")));
        }

        let mut url =
            Url::parse(&self.base_url).map_err(|e| FileUrlError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| FileUrlError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(["shared-files", handle, "url", ""]);
        Ok(url)
    }
}

#[async_trait]
impl FileUrlSource for UpstreamClient {
    /// One lookup of a file handle's public URL, without retries
    async fn lookup_file_url(&self, handle: &str) -> std::result::Result<String, FileUrlError> {
        let url = self.file_url_endpoint(handle)?;

        let response = self.http.get(url).send().await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FileUrlError::RateLimited);
        }
        if !status.is_success() {
            return Err(FileUrlError::Status(status.as_u16()));
        }

        let body: FileUrlResponse = response
            .json()
            .await
            .map_err(|e| FileUrlError::Network(e.to_string()))?;

        body.url
            .filter(|url| !url.is_empty())
            .ok_or(FileUrlError::MissingUrl)
    }
}
