//! Response bodies, shared by the server and the proxy client

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::data::{Broker, Listing};

/// Body of `GET /api/listings`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingsResponse {
    pub properties: Vec<Listing>,
    /// `null` when no data has ever been loaded
    pub last_updated: Option<DateTime<Utc>>,
    pub count: usize,
}

/// Body of `POST /api/refresh`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub refreshed: bool,
    pub count: usize,
}

/// Body of `GET /api/brokers`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrokersResponse {
    pub brokers: Vec<Broker>,
}

/// Body of `GET /api/lease_spaces`; records are passed through as the
/// provider sent them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaseSpacesResponse<T = Value> {
    pub lease_spaces: Vec<T>,
}
