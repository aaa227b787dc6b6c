//! Route handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use tracing::{info, warn};

use super::error::ApiResult;
use super::types::{BrokersResponse, LeaseSpacesResponse, ListingsResponse, RefreshResponse};
use super::AppState;
use crate::data::BrokerIndex;
use crate::query::{query, ListingQuery};
use crate::refresh::SchedulerStatus;

/// GET /api/listings
pub async fn list_listings(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListingQuery>,
) -> Json<ListingsResponse> {
    let snapshot = state.scheduler.current().await;
    // Broker text only participates in search once brokers have been fetched
    let brokers = state.scheduler.cached_brokers().await;
    let index = brokers
        .as_deref()
        .map(|b| BrokerIndex::new(b))
        .unwrap_or_default();

    let properties = query(&snapshot, &params, &index);
    Json(ListingsResponse {
        count: properties.len(),
        properties,
        last_updated: snapshot.last_updated,
    })
}

/// POST /api/refresh
pub async fn refresh(State(state): State<Arc<AppState>>) -> Json<RefreshResponse> {
    info!("manual refresh requested");
    let report = state.scheduler.refresh().await;
    Json(RefreshResponse {
        refreshed: true,
        count: report.count,
    })
}

/// GET /api/brokers
pub async fn brokers(State(state): State<Arc<AppState>>) -> ApiResult<Json<BrokersResponse>> {
    let brokers = state.scheduler.brokers().await.map_err(|e| {
        warn!(error = %e, "broker fetch failed");
        e
    })?;

    Ok(Json(BrokersResponse {
        brokers: brokers.as_ref().clone(),
    }))
}

/// GET /api/lease_spaces
pub async fn lease_spaces(State(state): State<Arc<AppState>>) -> ApiResult<Json<LeaseSpacesResponse>> {
    let spaces = state.scheduler.lease_spaces().await.map_err(|e| {
        warn!(error = %e, "lease space fetch failed");
        e
    })?;

    Ok(Json(LeaseSpacesResponse {
        lease_spaces: spaces.as_ref().clone(),
    }))
}

/// GET /api/status
pub async fn status(State(state): State<Arc<AppState>>) -> Json<SchedulerStatus> {
    Json(state.scheduler.status().await)
}
