//! Response envelopes for the inventory endpoints
//!
//! Success bodies carry `success: true`, the payload under `data`, and the
//! instant the response stops being fresh (`cached_until`). Errors use
//! [`ErrorResponse`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::inventory::InventoryItem;
use crate::observability::MetricsSnapshot;

#[derive(Debug, Serialize, Deserialize)]
pub struct ListingResponse {
    pub success: bool,
    pub data: Vec<InventoryItem>,
    pub count: usize,
    pub cached_until: DateTime<Utc>,
}

impl ListingResponse {
    pub fn new(data: Vec<InventoryItem>, cached_until: DateTime<Utc>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
            cached_until,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ItemResponse {
    pub success: bool,
    pub data: InventoryItem,
    pub cached_until: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub code: &'static str,
    pub error: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct InventoryQuery {
    pub equipment_type: Option<String>,
    pub condition: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub upstream_configured: bool,
    pub version: String,
    pub metrics: MetricsSnapshot,
}
