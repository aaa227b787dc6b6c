//! Client for the leasedesk proxy
//!
//! Used by the table browser and the export command. Listings, brokers and
//! lease spaces are fetched concurrently; any fetch that fails is logged and
//! treated as an empty collection so the table still renders.

use chrono::{DateTime, Utc};
use reqwest::Client;
use thiserror::Error;
use tracing::warn;

use crate::api::{BrokersResponse, LeaseSpacesResponse, ListingsResponse, RefreshResponse};
use crate::data::{Broker, LeaseSpace, Listing};
use crate::query::ListingQuery;
use crate::view::{build_views, DerivedListingView};

/// Default proxy address
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

/// Errors from talking to the proxy
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
}

/// Everything the table needs, fetched in one go
#[derive(Debug, Clone, Default)]
pub struct TableData {
    pub listings: Vec<Listing>,
    pub brokers: Vec<Broker>,
    pub lease_spaces: Vec<LeaseSpace>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl TableData {
    /// Joins the collections into table rows
    pub fn views(&self) -> Vec<DerivedListingView> {
        build_views(&self.listings, &self.brokers, &self.lease_spaces)
    }
}

/// HTTP client for the proxy API
#[derive(Debug, Clone)]
pub struct ProxyClient {
    client: Client,
    base_url: String,
}

impl ProxyClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn fetch_listings(&self, params: &ListingQuery) -> Result<ListingsResponse, ClientError> {
        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(search) = params.search.as_deref() {
            query.push(("search", search));
        }
        if let Some(type_id) = params.type_id.as_deref() {
            query.push(("type", type_id));
        }

        Ok(self
            .client
            .get(self.url("/api/listings"))
            .query(&query)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?)
    }

    pub async fn fetch_brokers(&self) -> Result<Vec<Broker>, ClientError> {
        let response: BrokersResponse = self
            .client
            .get(self.url("/api/brokers"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response.brokers)
    }

    pub async fn fetch_lease_spaces(&self) -> Result<Vec<LeaseSpace>, ClientError> {
        let response: LeaseSpacesResponse<LeaseSpace> = self
            .client
            .get(self.url("/api/lease_spaces"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response.lease_spaces)
    }

    /// Asks the proxy to refresh its snapshot now
    pub async fn request_refresh(&self) -> Result<RefreshResponse, ClientError> {
        Ok(self
            .client
            .post(self.url("/api/refresh"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?)
    }

    /// Fetches all three collections concurrently
    pub async fn load_table_data(&self) -> TableData {
        let unfiltered = ListingQuery::default();
        let (listings, brokers, lease_spaces) = futures::join!(
            self.fetch_listings(&unfiltered),
            self.fetch_brokers(),
            self.fetch_lease_spaces()
        );

        let (listings, last_updated) = match listings {
            Ok(response) => (response.properties, response.last_updated),
            Err(e) => {
                warn!(error = %e, "failed to load listings");
                (Vec::new(), None)
            }
        };

        TableData {
            listings,
            last_updated,
            brokers: brokers.unwrap_or_else(|e| {
                warn!(error = %e, "failed to load brokers");
                Vec::new()
            }),
            lease_spaces: lease_spaces.unwrap_or_else(|e| {
                warn!(error = %e, "failed to load lease spaces");
                Vec::new()
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = ProxyClient::new("http://localhost:3000/");
        assert_eq!(client.url("/api/listings"), "http://localhost:3000/api/listings");
    }

    #[test]
    fn test_lease_space_payload_with_orphans_decodes() {
        let body = r#"{"lease_spaces": [
            {"id": 1, "property_id": 10, "size_sf": 750},
            {"id": 2, "property_id": null, "size_sf": 300},
            {"id": "3", "property_id": "10", "size_sf": "1,250"}
        ]}"#;
        let response: LeaseSpacesResponse<LeaseSpace> = serde_json::from_str(body).unwrap();
        let data = TableData {
            lease_spaces: response.lease_spaces,
            ..Default::default()
        };

        assert_eq!(data.lease_spaces.len(), 3);
        assert!(data.lease_spaces[1].property_id.is_none());
        assert_eq!(
            crate::data::LeaseSpaceIndex::new(&data.lease_spaces).total_sf(10),
            2000.0
        );
    }

    #[tokio::test]
    async fn test_unreachable_proxy_degrades_to_empty_table() {
        // Port 9 (discard) on localhost is not expected to run an HTTP server
        let client = ProxyClient::new("http://127.0.0.1:9");
        let data = client.load_table_data().await;

        assert!(data.listings.is_empty());
        assert!(data.brokers.is_empty());
        assert!(data.lease_spaces.is_empty());
        assert!(data.last_updated.is_none());
        assert!(data.views().is_empty());
    }
}
