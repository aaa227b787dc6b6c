//! HTTP API
//!
//! Routes:
//! - `GET /api/listings?search=&type=` filtered listings from the current snapshot
//! - `POST /api/refresh` synchronous refresh, returns the resulting count
//! - `GET /api/brokers` brokers, cached and reloaded by every refresh
//! - `GET /api/lease_spaces` raw lease spaces, cached with a fixed TTL
//! - `GET /api/status` scheduler phase and snapshot metadata

mod error;
mod handlers;
pub mod types;

pub use error::{ApiError, ApiResult};
pub use types::{BrokersResponse, LeaseSpacesResponse, ListingsResponse, RefreshResponse};

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::refresh::RefreshScheduler;

pub use crate::refresh::LEASE_SPACES_TTL;

/// State shared by all handlers
pub struct AppState {
    /// Owns the snapshot and the broker and lease space caches
    pub scheduler: Arc<RefreshScheduler>,
}

impl AppState {
    pub fn new(scheduler: Arc<RefreshScheduler>) -> Self {
        Self { scheduler }
    }
}

/// Builds the API router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/listings", get(handlers::list_listings))
        .route("/api/refresh", post(handlers::refresh))
        .route("/api/brokers", get(handlers::brokers))
        .route("/api/lease_spaces", get(handlers::lease_spaces))
        .route("/api/status", get(handlers::status))
        .with_state(state)
}
