//! Attach resolved public URLs to inventory images
//!
//! Both paths make exactly one batch call per request. Items are never
//! dropped: an image that fails to resolve is left as is or given the
//! configured fallback URL.

use std::sync::Arc;
use tracing::info;

use crate::batch::{HandleBatchResolver, HandleUrlMap};
use crate::config::{FallbackMode, FetchConfig};
use crate::inventory::{ImageRef, InventoryItem};

/// What an image gets when its handle did not resolve
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FallbackPolicy {
    /// Leave the entry without a resolved `url`
    #[default]
    Unresolved,
    /// Substitute the template with `{handle}` replaced
    CdnTemplate(String),
}

impl FallbackPolicy {
    pub fn fallback_url(&self, handle: &str) -> Option<String> {
        match self {
            FallbackPolicy::Unresolved => None,
            FallbackPolicy::CdnTemplate(template) => Some(template.replace("{handle}", handle)),
        }
    }
}

impl From<&FetchConfig> for FallbackPolicy {
    fn from(config: &FetchConfig) -> Self {
        match config.fallback {
            FallbackMode::Unresolved => FallbackPolicy::Unresolved,
            FallbackMode::CdnTemplate => FallbackPolicy::CdnTemplate(config.fallback_template.clone()),
        }
    }
}

#[derive(Clone)]
pub struct ImageEnricher {
    batch: Arc<dyn HandleBatchResolver>,
    fallback: FallbackPolicy,
}

impl ImageEnricher {
    pub fn new(batch: Arc<dyn HandleBatchResolver>, fallback: FallbackPolicy) -> Self {
        Self { batch, fallback }
    }

    /// Detail path: resolve every image of one item
    pub async fn enrich_item(&self, item: &mut InventoryItem) {
        let handles: Vec<String> = item
            .images
            .iter()
            .filter_map(ImageRef::handle)
            .map(str::to_string)
            .collect();

        if !handles.is_empty() {
            let urls = self.batch.resolve_handles(&handles).await;

            let mut resolved = 0;
            for image in item.images.iter_mut() {
                if self.apply(image, &urls) {
                    resolved += 1;
                }
            }

            info!(
                item = %item.id,
                resolved,
                unresolved = handles.len() - resolved,
                "Enriched item images"
            );
        }

        item.refresh_first_image();
    }

    /// Listing path: resolve only the thumbnail of each item, in one batch
    pub async fn enrich_listing(&self, items: &mut [InventoryItem]) {
        let handles: Vec<String> = items
            .iter()
            .filter_map(InventoryItem::first_image_handle)
            .map(str::to_string)
            .collect();

        if handles.is_empty() {
            items.iter_mut().for_each(InventoryItem::refresh_first_image);
            return;
        }

        let urls = self.batch.resolve_handles(&handles).await;

        let mut resolved = 0;
        let mut unresolved = 0;
        for item in items.iter_mut() {
            if let Some(image) = item.thumbnail_mut() {
                if self.apply(image, &urls) {
                    resolved += 1;
                } else {
                    unresolved += 1;
                }
            }
            item.refresh_first_image();
        }

        info!(items = items.len(), resolved, unresolved, "Enriched listing images");
    }

    /// Patch one image from the map; `true` when its handle resolved
    fn apply(&self, image: &mut ImageRef, urls: &HandleUrlMap) -> bool {
        let Some(handle) = image.handle() else {
            return false;
        };

        match urls.get(handle) {
            Some(url) => {
                image.url = Some(url.clone());
                true
            }
            None => {
                if let Some(url) = self.fallback.fallback_url(handle) {
                    image.url = Some(url);
                }
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Resolves from a fixed table and records every batch it was asked for
    #[derive(Default)]
    struct RecordingResolver {
        known: HashMap<String, String>,
        batches: Mutex<Vec<Vec<String>>>,
    }

    impl RecordingResolver {
        fn with(known: &[(&str, &str)]) -> Arc<Self> {
            Arc::new(Self {
                known: known
                    .iter()
                    .map(|(h, u)| (h.to_string(), u.to_string()))
                    .collect(),
                batches: Mutex::new(Vec::new()),
            })
        }

        fn batches(&self) -> Vec<Vec<String>> {
            self.batches.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HandleBatchResolver for RecordingResolver {
        async fn resolve_handles(&self, handles: &[String]) -> HandleUrlMap {
            self.batches.lock().unwrap().push(handles.to_vec());
            handles
                .iter()
                .filter_map(|h| self.known.get(h).map(|u| (h.clone(), u.clone())))
                .collect()
        }
    }

    fn item(id: &str, handles: &[&str]) -> InventoryItem {
        InventoryItem {
            id: id.to_string(),
            images: handles.iter().map(|h| ImageRef::with_handle(*h)).collect(),
            ..InventoryItem::default()
        }
    }

    #[tokio::test]
    async fn test_detail_partial_resolution_preserves_order() {
        let resolver = RecordingResolver::with(&[("a", "https://cdn/a.jpg")]);
        let enricher = ImageEnricher::new(resolver.clone(), FallbackPolicy::Unresolved);
        let mut item = item("r1", &["a", "b"]);

        enricher.enrich_item(&mut item).await;

        assert_eq!(item.images.len(), 2);
        assert_eq!(item.images[0].handle(), Some("a"));
        assert_eq!(item.images[0].url.as_deref(), Some("https://cdn/a.jpg"));
        assert_eq!(item.images[1].handle(), Some("b"));
        assert!(item.images[1].url.is_none());
        assert_eq!(item.first_image.as_deref(), Some("https://cdn/a.jpg"));
        assert_eq!(resolver.batches(), vec![vec!["a".to_string(), "b".to_string()]]);
    }

    #[tokio::test]
    async fn test_detail_keeps_metadata_and_handleless_entries() {
        let resolver = RecordingResolver::with(&[("a", "https://cdn/a.jpg")]);
        let enricher = ImageEnricher::new(resolver, FallbackPolicy::Unresolved);

        let with_meta: ImageRef = serde_json::from_value(json!({
            "handle": "a",
            "metadata": { "filename": "front.jpg", "mimetype": "image/jpeg" }
        }))
        .unwrap();
        let handleless: ImageRef = serde_json::from_value(json!({ "name": "orphan" })).unwrap();

        let mut item = InventoryItem {
            id: "r1".to_string(),
            images: vec![handleless.clone(), with_meta],
            ..InventoryItem::default()
        };

        enricher.enrich_item(&mut item).await;

        assert_eq!(item.images[0], handleless);
        assert_eq!(item.images[1].mimetype(), Some("image/jpeg"));
        assert_eq!(item.images[1].url.as_deref(), Some("https://cdn/a.jpg"));
    }

    #[tokio::test]
    async fn test_listing_makes_one_batch_call() {
        let known: Vec<(String, String)> = (0..10)
            .map(|i| (format!("h{i}"), format!("https://cdn/h{i}.jpg")))
            .collect();
        let known_refs: Vec<(&str, &str)> =
            known.iter().map(|(h, u)| (h.as_str(), u.as_str())).collect();
        let resolver = RecordingResolver::with(&known_refs);
        let enricher = ImageEnricher::new(resolver.clone(), FallbackPolicy::Unresolved);

        let mut items: Vec<InventoryItem> = (0..10)
            .map(|i| {
                let handle = format!("h{i}");
                item(&format!("r{i}"), &[handle.as_str(), "secondary"])
            })
            .collect();

        enricher.enrich_listing(&mut items).await;

        let batches = resolver.batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 10);
        assert!(!batches[0].contains(&"secondary".to_string()));
        assert!(items.iter().all(|item| item.first_image.is_some()));
        // Only first images are touched on the listing path
        assert!(items.iter().all(|item| item.images[1].url.is_none()));
    }

    #[tokio::test]
    async fn test_listing_skips_non_image_attachments() {
        let resolver = RecordingResolver::with(&[
            ("brochure", "https://cdn/brochure.pdf"),
            ("photo", "https://cdn/photo.jpg"),
        ]);
        let enricher = ImageEnricher::new(resolver.clone(), FallbackPolicy::Unresolved);

        let brochure: ImageRef = serde_json::from_value(json!({
            "handle": "brochure",
            "metadata": { "filename": "brochure.pdf", "mimetype": "application/pdf" }
        }))
        .unwrap();
        let photo: ImageRef = serde_json::from_value(json!({
            "handle": "photo",
            "metadata": { "filename": "front.jpg", "mimetype": "image/jpeg" }
        }))
        .unwrap();
        let mut items = vec![InventoryItem {
            id: "r1".to_string(),
            images: vec![brochure, photo],
            ..InventoryItem::default()
        }];

        enricher.enrich_listing(&mut items).await;

        assert_eq!(resolver.batches(), vec![vec!["photo".to_string()]]);
        assert!(items[0].images[0].url.is_none());
        assert_eq!(items[0].images[1].url.as_deref(), Some("https://cdn/photo.jpg"));
        assert_eq!(items[0].first_image.as_deref(), Some("https://cdn/photo.jpg"));
    }

    #[tokio::test]
    async fn test_listing_keeps_items_with_failed_images() {
        let resolver = RecordingResolver::with(&[("h1", "https://cdn/h1.jpg")]);
        let enricher = ImageEnricher::new(resolver, FallbackPolicy::Unresolved);
        let mut items = vec![item("r1", &["h1"]), item("r2", &["h2"])];

        enricher.enrich_listing(&mut items).await;

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].images[0].url.as_deref(), Some("https://cdn/h1.jpg"));
        assert_eq!(items[1].id, "r2");
        assert!(items[1].images[0].url.is_none());
        assert!(items[1].first_image.is_none());
    }

    #[tokio::test]
    async fn test_fallback_template_applied_on_both_paths() {
        let policy = FallbackPolicy::CdnTemplate("https://cdn.example/{handle}".to_string());
        let resolver = RecordingResolver::with(&[("h1", "https://cdn/h1.jpg")]);
        let enricher = ImageEnricher::new(resolver, policy);

        let mut items = vec![item("r1", &["h1"]), item("r2", &["h2"])];
        enricher.enrich_listing(&mut items).await;
        assert_eq!(items[1].images[0].url.as_deref(), Some("https://cdn.example/h2"));

        let mut detail = item("r2", &["h2", "h3"]);
        enricher.enrich_item(&mut detail).await;
        assert_eq!(detail.images[0].url.as_deref(), Some("https://cdn.example/h2"));
        assert_eq!(detail.images[1].url.as_deref(), Some("https://cdn.example/h3"));
    }

    #[tokio::test]
    async fn test_no_handles_skips_batch_call() {
        let resolver = RecordingResolver::with(&[]);
        let enricher = ImageEnricher::new(resolver.clone(), FallbackPolicy::Unresolved);
        let mut items = vec![item("r1", &[]), item("r2", &[])];

        enricher.enrich_listing(&mut items).await;
        enricher.enrich_item(&mut items[0]).await;

        assert!(resolver.batches().is_empty());
    }

    #[test]
    fn test_policy_from_config() {
        let mut config = FetchConfig::default();
        assert_eq!(FallbackPolicy::from(&config), FallbackPolicy::Unresolved);

        config.fallback = FallbackMode::CdnTemplate;
        config.fallback_template = "https://files.example/{handle}/raw".to_string();
        let policy = FallbackPolicy::from(&config);
        assert_eq!(
            policy.fallback_url("abc").as_deref(),
            Some("https://files.example/abc/raw")
        );
    }
}
