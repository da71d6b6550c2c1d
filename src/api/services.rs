use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderName, HeaderValue, header},
    response::IntoResponse,
};
use chrono::Utc;
use tracing::{error, info};

use super::{
    error::ApiError,
    models::{HealthResponse, InventoryQuery, ItemResponse, ListingResponse},
    state::AppState,
    utils::{LISTING_STALE_WHILE_REVALIDATE, cache_control, cached_until},
    validation::{RequestValidationError, validate_filter, validate_slug},
};
use crate::catalog::ListingFilter;
use crate::inventory::InventoryItem;
use crate::upstream::UpstreamError;

/// In-stock inventory, optionally narrowed with `?equipment_type=` and `?condition=`
pub async fn list_inventory(
    State(state): State<AppState>,
    Query(query): Query<InventoryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(equipment_type) = &query.equipment_type {
        validate_filter("equipment_type", equipment_type).map_err(map_validation_error)?;
    }
    if let Some(condition) = &query.condition {
        validate_filter("condition", condition).map_err(map_validation_error)?;
    }

    let filter = ListingFilter::builder()
        .maybe_equipment_type(query.equipment_type)
        .maybe_condition(query.condition)
        .build();

    let catalog = state.catalog()?;
    let items = catalog
        .list(&filter)
        .await
        .map_err(|e| upstream_failure(&state, e))?;

    Ok(listing_response(&state, items))
}

/// First few in-stock records for the landing page
pub async fn homepage_inventory(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let catalog = state.catalog()?;
    let items = catalog
        .homepage()
        .await
        .map_err(|e| upstream_failure(&state, e))?;

    Ok(listing_response(&state, items))
}

/// One record by slug with every image resolved
pub async fn get_inventory_item(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    validate_slug(&slug).map_err(map_validation_error)?;

    let catalog = state.catalog()?;
    let item = catalog
        .by_slug(&slug)
        .await
        .map_err(|e| upstream_failure(&state, e))?
        .ok_or_else(|| ApiError::NotFound(slug.clone()))?;

    let ttl = state.config.server.detail_cache_ttl.as_duration();
    info!(slug = %slug, images = item.images.len(), "Serving inventory item");

    let body = ItemResponse {
        success: true,
        data: item,
        cached_until: cached_until(Utc::now(), ttl),
    };

    Ok(([(header::CACHE_CONTROL, cache_control(ttl, ttl * 2))], Json(body)))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        upstream_configured: state.upstream_configured(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        metrics: state.metrics.snapshot(),
    })
}

type CachedJson<T> = ([(HeaderName, HeaderValue); 1], Json<T>);

fn listing_response(state: &AppState, items: Vec<InventoryItem>) -> CachedJson<ListingResponse> {
    let ttl = state.config.server.listing_cache_ttl.as_duration();
    let body = ListingResponse::new(items, cached_until(Utc::now(), ttl));

    (
        [(header::CACHE_CONTROL, cache_control(ttl, LISTING_STALE_WHILE_REVALIDATE))],
        Json(body),
    )
}

fn upstream_failure(state: &AppState, err: UpstreamError) -> ApiError {
    error!(error = %err, "Upstream inventory request failed");
    state.metrics.upstream_failed();
    ApiError::Upstream(err)
}

fn map_validation_error(err: RequestValidationError) -> ApiError {
    ApiError::BadRequest(err.to_string())
}
