//! Typed view of upstream inventory records
//!
//! [`InventoryItem::from_record`] flattens a hydrated [`crate::upstream::RawRecord`]
//! through the configured [`crate::config::FieldMap`]. Image entries keep
//! their upstream metadata so enrichment only ever touches `url`.

mod fields;
mod item;

pub use fields::{
    format_price, linked_title, plain_text, rich_text, select_label, strip_html_and_truncate,
};
pub use item::{DESCRIPTION_PREVIEW_CHARS, ImageRef, InventoryItem};
