//! Inventory queries: upstream listing, record adaptation, image enrichment

use bon::Builder;
use std::sync::Arc;
use tracing::{debug, info};

use crate::batch::{BatchUrlFetcher, FetchBatchConfig};
use crate::config::{Config, ConfigError, FieldMap};
use crate::enrich::{FallbackPolicy, ImageEnricher};
use crate::inventory::InventoryItem;
use crate::observability::Metrics;
use crate::resolver::{FileUrlResolver, RetryPolicy};
use crate::upstream::{ListParams, UpstreamClient, UpstreamError};

pub type Result<T> = std::result::Result<T, UpstreamError>;

/// Label filters a listing request narrows the catalog with
///
/// Both compare case-insensitively against the adapted select labels; an
/// absent or blank value keeps everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder)]
pub struct ListingFilter {
    #[builder(into)]
    pub equipment_type: Option<String>,
    #[builder(into)]
    pub condition: Option<String>,
}

impl ListingFilter {
    pub fn matches(&self, item: &InventoryItem) -> bool {
        label_matches(&item.equipment_type, self.equipment_type.as_deref())
            && label_matches(&item.condition, self.condition.as_deref())
    }
}

#[derive(Clone)]
pub struct Catalog {
    client: Arc<UpstreamClient>,
    table_id: String,
    fields: FieldMap,
    enricher: ImageEnricher,
    homepage_limit: usize,
    in_stock_label: String,
}

impl Catalog {
    pub fn new(
        client: Arc<UpstreamClient>,
        table_id: impl Into<String>,
        fields: FieldMap,
        enricher: ImageEnricher,
        homepage_limit: usize,
        in_stock_label: impl Into<String>,
    ) -> Self {
        Self {
            client,
            table_id: table_id.into(),
            fields,
            enricher,
            homepage_limit: homepage_limit.max(1),
            in_stock_label: in_stock_label.into(),
        }
    }

    /// Wire the client, resolver, batch fetcher and enricher from configuration
    ///
    /// Fails without network I/O when credentials or the table id are missing.
    pub fn from_config(config: &Config, metrics: Arc<Metrics>) -> std::result::Result<Self, ConfigError> {
        let credentials = config.upstream.credentials()?;
        let table_id = config.upstream.require_table_id()?.to_string();

        let client = UpstreamClient::from_config(&config.upstream, credentials)
            .map_err(|e| ConfigError::ClientError(e.to_string()))?;
        let client = Arc::new(client);

        let resolver = FileUrlResolver::new(client.clone(), RetryPolicy::from(&config.fetch), metrics);
        let fetcher = BatchUrlFetcher::new(resolver, FetchBatchConfig::from(&config.fetch));
        let enricher = ImageEnricher::new(Arc::new(fetcher), FallbackPolicy::from(&config.fetch));

        Ok(Self::new(
            client,
            table_id,
            config.fields.clone(),
            enricher,
            config.server.homepage_limit,
            config.server.in_stock_label.clone(),
        ))
    }

    pub fn table_id(&self) -> &str {
        &self.table_id
    }

    /// Every in-stock record that passes `filter`
    pub async fn list(&self, filter: &ListingFilter) -> Result<Vec<InventoryItem>> {
        let records = self
            .client
            .list_all_records(&self.table_id, &ListParams::default())
            .await?;
        let fetched = records.len();

        let mut items: Vec<InventoryItem> = records
            .iter()
            .map(|record| InventoryItem::from_record(record, &self.fields))
            .filter(|item| self.is_in_stock(item) && filter.matches(item))
            .collect();

        debug!(fetched, kept = items.len(), ?filter, "Adapted inventory records");

        self.enricher.enrich_listing(&mut items).await;
        info!(count = items.len(), "Inventory listing ready");
        Ok(items)
    }

    /// First `homepage_limit` in-stock records, in upstream order
    ///
    /// Stock status is a hydrated select, so it is checked after adaptation;
    /// pages of `homepage_limit` records are read until enough units qualify
    /// or the table is exhausted.
    pub async fn homepage(&self) -> Result<Vec<InventoryItem>> {
        let mut items = Vec::with_capacity(self.homepage_limit);
        let mut offset = 0;

        while items.len() < self.homepage_limit {
            let params = ListParams::builder()
                .offset(offset)
                .limit(self.homepage_limit)
                .build();
            let page = self.client.list_records(&self.table_id, &params).await?;
            if page.items.is_empty() {
                break;
            }
            offset += page.items.len();

            items.extend(
                page.items
                    .iter()
                    .map(|record| InventoryItem::from_record(record, &self.fields))
                    .filter(|item| self.is_in_stock(item)),
            );

            if offset >= page.total {
                break;
            }
        }
        items.truncate(self.homepage_limit);

        debug!(count = items.len(), scanned = offset, "Homepage records selected");
        self.enricher.enrich_listing(&mut items).await;
        Ok(items)
    }

    /// Single record by its slug field, fully enriched
    pub async fn by_slug(&self, slug: &str) -> Result<Option<InventoryItem>> {
        let Some(record) = self
            .client
            .find_by_field(&self.table_id, &self.fields.slug, slug)
            .await?
        else {
            debug!(slug, "No inventory record for slug");
            return Ok(None);
        };

        let mut item = InventoryItem::from_record(&record, &self.fields);
        self.enricher.enrich_item(&mut item).await;
        Ok(Some(item))
    }

    /// An empty `in_stock_label` turns stock filtering off
    fn is_in_stock(&self, item: &InventoryItem) -> bool {
        label_matches(&item.sales_status, Some(self.in_stock_label.as_str()))
    }
}

/// Case-insensitive label match; no wanted label keeps everything
fn label_matches(label: &str, wanted: Option<&str>) -> bool {
    match wanted.map(str::trim).filter(|w| !w.is_empty()) {
        Some(wanted) => label.trim().eq_ignore_ascii_case(wanted),
        None => true,
    }
}
