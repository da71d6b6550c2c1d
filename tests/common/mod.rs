//! In-process mock of the upstream inventory API
//!
//! Serves record pages from a fixed dataset and file URLs from handle names:
//! - `missing-*` handles answer 404
//! - `nourl-*` handles answer 200 without a `url`
//! - handles registered with [`MockUpstream::rate_limit`] answer 429 that many times
//! - everything else resolves to `https://cdn.test/<handle>.jpg`

#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

pub const API_KEY: &str = "test-token";
pub const ACCOUNT_ID: &str = "acct-42";
pub const TABLE_ID: &str = "inventory-table";

#[derive(Debug, Clone)]
pub struct ListCall {
    pub table_id: String,
    pub query: HashMap<String, String>,
    pub body: Value,
    pub authorization: Option<String>,
    pub account_id: Option<String>,
}

#[derive(Default)]
pub struct MockUpstream {
    records: Vec<Value>,
    reported_total: Option<usize>,
    list_status: Option<StatusCode>,
    rate_limits: Mutex<HashMap<String, usize>>,
    list_calls: Mutex<Vec<ListCall>>,
    file_calls: Mutex<Vec<String>>,
}

impl MockUpstream {
    pub fn with_records(records: Vec<Value>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    /// Claim a larger `total` than the dataset holds
    pub fn reporting_total(mut self, total: usize) -> Self {
        self.reported_total = Some(total);
        self
    }

    /// Fail every list call with `status`
    pub fn failing_list(mut self, status: StatusCode) -> Self {
        self.list_status = Some(status);
        self
    }

    pub fn rate_limit(self, handle: &str, times: usize) -> Self {
        self.rate_limits
            .lock()
            .unwrap()
            .insert(handle.to_string(), times);
        self
    }

    pub fn list_calls(&self) -> Vec<ListCall> {
        self.list_calls.lock().unwrap().clone()
    }

    pub fn file_calls(&self) -> Vec<String> {
        self.file_calls.lock().unwrap().clone()
    }
}

/// Bind the mock on an ephemeral port and return its base URL
pub async fn spawn(mock: Arc<MockUpstream>) -> String {
    let app = Router::new()
        .route("/applications/{table_id}/records/list/", post(list_records))
        .route("/shared-files/{handle}/url/", get(file_url))
        .with_state(mock);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

async fn list_records(
    State(mock): State<Arc<MockUpstream>>,
    Path(table_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    mock.list_calls.lock().unwrap().push(ListCall {
        table_id,
        query: query.clone(),
        body: body.clone(),
        authorization: header("authorization"),
        account_id: header("account-id"),
    });

    if let Some(status) = mock.list_status {
        return (status, "upstream unavailable").into_response();
    }

    let matching: Vec<&Value> = mock
        .records
        .iter()
        .filter(|record| matches_filter(record, &body["filter"]))
        .collect();

    let offset: usize = query.get("offset").and_then(|v| v.parse().ok()).unwrap_or(0);
    let limit: usize = query.get("limit").and_then(|v| v.parse().ok()).unwrap_or(1000);
    let items: Vec<&Value> = matching.iter().skip(offset).take(limit).copied().collect();
    let total = mock.reported_total.unwrap_or(matching.len());

    Json(json!({
        "items": items,
        "total": total,
        "offset": offset,
        "limit": limit,
    }))
    .into_response()
}

fn matches_filter(record: &Value, filter: &Value) -> bool {
    let Some(fields) = filter["fields"].as_array() else {
        return true;
    };

    fields.iter().all(|condition| {
        let field = condition["field"].as_str().unwrap_or_default();
        record[field] == condition["value"]
    })
}

async fn file_url(
    State(mock): State<Arc<MockUpstream>>,
    Path(handle): Path<String>,
) -> Response {
    mock.file_calls.lock().unwrap().push(handle.clone());

    {
        let mut rate_limits = mock.rate_limits.lock().unwrap();
        if let Some(remaining) = rate_limits.get_mut(&handle) {
            if *remaining > 0 {
                *remaining -= 1;
                return (StatusCode::TOO_MANY_REQUESTS, "slow down").into_response();
            }
        }
    }

    if handle.starts_with("missing") {
        return (StatusCode::NOT_FOUND, "no such file").into_response();
    }

    if handle.starts_with("nourl") {
        return Json(json!({})).into_response();
    }

    Json(json!({ "url": format!("https://cdn.test/{handle}.jpg") })).into_response()
}

/// A hydrated, in-stock, used unit as the upstream returns it, keyed by the
/// default field ids
pub fn record(id: &str, slug: &str, equipment_type: &str, handles: &[&str]) -> Value {
    let images: Vec<Value> = handles
        .iter()
        .map(|handle| {
            json!({
                "handle": handle,
                "metadata": { "filename": format!("{handle}.jpg"), "mimetype": "image/jpeg" }
            })
        })
        .collect();

    json!({
        "id": id,
        "scccefe375": slug,
        "sd70909ac5": format!("Unit {id}"),
        "description": { "preview": format!("<p>Details for {id}</p>") },
        "sc7cd7026e": 2020,
        "se69701513": { "label": equipment_type, "value": equipment_type.to_lowercase() },
        "s934963a2a": { "label": "In Stock", "value": "in-stock" },
        "sb1892731b": { "label": "Used", "value": "used" },
        "s47d53952b": [{ "id": "m1", "title": "Kenworth" }],
        "sbbb93f261": 125000,
        "sc577d7e98": images,
    })
}

/// Replace the sales status label of a record built by [`record`]
pub fn with_status(mut record: Value, label: &str) -> Value {
    record["s934963a2a"] = json!({ "label": label, "value": label.to_lowercase() });
    record
}

/// Replace the condition label of a record built by [`record`]
pub fn with_condition(mut record: Value, label: &str) -> Value {
    record["sb1892731b"] = json!({ "label": label, "value": label.to_lowercase() });
    record
}
