use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::fields::{
    format_price, linked_title, plain_text, rich_text, select_label, strip_html_and_truncate,
};
use crate::config::FieldMap;
use crate::upstream::RawRecord;

/// Characters kept in the listing description
pub const DESCRIPTION_PREVIEW_CHARS: usize = 150;

/// One entry of an upstream file field
///
/// Only `handle` and `url` are interpreted; every other key (`metadata`,
/// `created_on`, ...) is carried through untouched.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct ImageRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ImageRef {
    pub fn with_handle(handle: impl Into<String>) -> Self {
        Self {
            handle: Some(handle.into()),
            ..Self::default()
        }
    }

    /// Handle, if present and non-empty
    pub fn handle(&self) -> Option<&str> {
        self.handle.as_deref().filter(|h| !h.is_empty())
    }

    pub fn mimetype(&self) -> Option<&str> {
        self.extra
            .get("metadata")
            .and_then(|meta| meta.get("mimetype"))
            .and_then(Value::as_str)
    }

    /// Files without a recorded mimetype are assumed to be images
    pub fn is_image(&self) -> bool {
        self.mimetype().is_none_or(|mime| mime.starts_with("image/"))
    }
}

/// Inventory record in the shape served to the frontend
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: String,
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
    pub images: Vec<ImageRef>,
    pub first_image: Option<String>,
}

impl InventoryItem {
    /// Translate an upstream record through the configured field ids
    pub fn from_record(record: &RawRecord, fields: &FieldMap) -> Self {
        let get = |key: &str| record.field(key);

        let year = plain_text(get(&fields.year));
        let model = plain_text(get(&fields.model));
        let manufacturer = linked_title(get(&fields.manufacturer));

        let title = [plain_text(get(&fields.title)), plain_text(get("title"))]
            .into_iter()
            .find(|t| !t.trim().is_empty())
            .unwrap_or_else(|| {
                [year.as_str(), manufacturer.as_str(), model.as_str()]
                    .iter()
                    .filter(|part| !part.is_empty())
                    .copied()
                    .collect::<Vec<_>>()
                    .join(" ")
            });

        let images = fields
            .images
            .iter()
            .filter_map(|key| get(key).and_then(Value::as_array))
            .find(|entries| !entries.is_empty())
            .map(|entries| parse_images(entries))
            .unwrap_or_default();

        let mut item = Self {
            id: record.id.clone(),
            slug: plain_text(get(&fields.slug)),
            title,
            description: strip_html_and_truncate(
                &rich_text(get(&fields.description)),
                DESCRIPTION_PREVIEW_CHARS,
            ),
            full_description: rich_text(get(&fields.full_description)),
            year,
            model,
            vin: plain_text(get(&fields.vin)),
            condition: select_label(get(&fields.condition)),
            sales_status: select_label(get(&fields.sales_status)),
            equipment_type: select_label(get(&fields.equipment_type)),
            manufacturer,
            location: linked_title(get(&fields.location)),
            salesperson: linked_title(get(&fields.salesperson)),
            price: format_price(get(&fields.price)),
            quantity: plain_text(get(&fields.quantity)),
            images,
            first_image: None,
        };
        item.refresh_first_image();
        item
    }

    /// Handle of the thumbnail candidate, the only image listings resolve
    pub fn first_image_handle(&self) -> Option<&str> {
        self.thumbnail_position()
            .and_then(|index| self.images[index].handle())
    }

    /// The entry [`InventoryItem::first_image_handle`] refers to
    pub fn thumbnail_mut(&mut self) -> Option<&mut ImageRef> {
        let index = self.thumbnail_position()?;
        self.images.get_mut(index)
    }

    /// First entry that is an image and carries a handle
    fn thumbnail_position(&self) -> Option<usize> {
        self.images
            .iter()
            .position(|image| image.is_image() && image.handle().is_some())
    }

    /// Recompute `first_image` from the current image list
    pub fn refresh_first_image(&mut self) {
        self.first_image = self
            .images
            .iter()
            .filter(|image| image.is_image())
            .find_map(|image| image.url.clone());
    }
}

fn parse_images(entries: &[Value]) -> Vec<ImageRef> {
    entries
        .iter()
        .filter(|entry| entry.is_object())
        .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
        .collect()
}
