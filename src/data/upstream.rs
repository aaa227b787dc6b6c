//! Listings provider HTTP client
//!
//! Fetches the `properties`, `brokers` and `lease_spaces` collections from the
//! provider. Every collection is paginated with `limit`/`offset` and wrapped in
//! an envelope keyed by the collection name, e.g. `{"properties": [...]}`.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use super::{Broker, Listing};

/// Records requested per page
pub const DEFAULT_PAGE_SIZE: usize = 1000;

pub const PROPERTIES: &str = "properties";
pub const BROKERS: &str = "brokers";
pub const LEASE_SPACES: &str = "lease_spaces";

/// Errors that can occur when talking to the provider
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Network failure or unreadable body
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("provider returned {status} for {collection}")]
    Status {
        status: StatusCode,
        collection: String,
    },

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Envelope did not contain the requested collection
    #[error("response is missing the `{0}` collection")]
    MissingCollection(String),
}

/// Source of provider collections
///
/// Implemented by [`UpstreamClient`]; the refresh scheduler and the API only
/// depend on this trait.
#[async_trait]
pub trait ListingsProvider: Send + Sync {
    async fn fetch_listings(&self) -> Result<Vec<Listing>, UpstreamError>;

    async fn fetch_brokers(&self) -> Result<Vec<Broker>, UpstreamError>;

    /// Lease spaces exactly as the provider returned them
    async fn fetch_lease_spaces(&self) -> Result<Vec<Value>, UpstreamError>;
}

/// Requests pages at increasing offsets until a page comes back shorter than
/// `page_size`, then returns all records in request order.
pub async fn paginate<T, F, Fut>(page_size: usize, mut fetch_page: F) -> Result<Vec<T>, UpstreamError>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<Vec<T>, UpstreamError>>,
{
    let page_size = page_size.max(1);
    let mut records = Vec::new();
    let mut offset = 0;

    loop {
        let page = fetch_page(offset).await?;
        let len = page.len();
        records.extend(page);

        if len < page_size {
            break;
        }
        offset += page_size;
    }

    Ok(records)
}

/// Client for the listings provider
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
    /// Base URL including any account path segment, without a trailing slash
    base_url: String,
    page_size: usize,
}

impl UpstreamClient {
    /// Creates a client with a default reqwest client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Creates a client whose requests time out after `timeout`
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, UpstreamError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Creates a client with a custom HTTP client
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{}.json", self.base_url, collection)
    }

    /// Fetches one page of a collection
    async fn fetch_page<T: DeserializeOwned>(
        &self,
        collection: &str,
        offset: usize,
    ) -> Result<Vec<T>, UpstreamError> {
        debug!(collection, offset, limit = self.page_size, "fetching page");

        let response = self
            .client
            .get(self.collection_url(collection))
            .query(&[("limit", self.page_size), ("offset", offset)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                status,
                collection: collection.to_string(),
            });
        }

        let text = response.text().await?;
        let mut envelope: Map<String, Value> = serde_json::from_str(&text)?;
        let records = envelope
            .remove(collection)
            .ok_or_else(|| UpstreamError::MissingCollection(collection.to_string()))?;

        Ok(serde_json::from_value(records)?)
    }

    /// Fetches every page of a collection
    pub async fn fetch_all_pages<T: DeserializeOwned>(
        &self,
        collection: &str,
    ) -> Result<Vec<T>, UpstreamError> {
        let records = paginate(self.page_size, |offset| self.fetch_page(collection, offset)).await?;
        debug!(collection, count = records.len(), "fetched collection");
        Ok(records)
    }
}

#[async_trait]
impl ListingsProvider for UpstreamClient {
    async fn fetch_listings(&self) -> Result<Vec<Listing>, UpstreamError> {
        self.fetch_all_pages(PROPERTIES).await
    }

    async fn fetch_brokers(&self) -> Result<Vec<Broker>, UpstreamError> {
        self.fetch_all_pages(BROKERS).await
    }

    async fn fetch_lease_spaces(&self) -> Result<Vec<Value>, UpstreamError> {
        self.fetch_all_pages(LEASE_SPACES).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Serves `sizes[i]` records for the i-th requested page
    fn pages(sizes: &[usize]) -> Vec<Vec<usize>> {
        let mut next = 0;
        sizes
            .iter()
            .map(|&n| {
                let page: Vec<usize> = (next..next + n).collect();
                next += n;
                page
            })
            .collect()
    }

    #[tokio::test]
    async fn test_paginate_concatenates_pages_in_order() {
        let served = pages(&[1000, 1000, 400]);
        let offsets = RefCell::new(Vec::new());

        let records = paginate(1000, |offset| {
            offsets.borrow_mut().push(offset);
            let page = served[offset / 1000].clone();
            async move { Ok(page) }
        })
        .await
        .unwrap();

        assert_eq!(records.len(), 2400);
        assert!(records.windows(2).all(|w| w[0] + 1 == w[1]), "order and uniqueness");
        assert_eq!(*offsets.borrow(), vec![0, 1000, 2000]);
    }

    #[tokio::test]
    async fn test_paginate_requests_trailing_empty_page_on_exact_multiple() {
        let served = pages(&[2, 2, 0]);
        let calls = RefCell::new(0);

        let records = paginate(2, |offset| {
            *calls.borrow_mut() += 1;
            let page = served[offset / 2].clone();
            async move { Ok(page) }
        })
        .await
        .unwrap();

        assert_eq!(records, vec![0, 1, 2, 3]);
        assert_eq!(*calls.borrow(), 3);
    }

    #[tokio::test]
    async fn test_paginate_propagates_page_failure() {
        let result: Result<Vec<u8>, _> = paginate(10, |offset| async move {
            if offset == 0 {
                Ok(vec![0; 10])
            } else {
                Err(UpstreamError::MissingCollection("properties".to_string()))
            }
        })
        .await;

        assert!(matches!(result, Err(UpstreamError::MissingCollection(_))));
    }

    #[test]
    fn test_collection_url_trims_trailing_slash() {
        let client = UpstreamClient::new("https://provider.example/api/v1/key/");
        assert_eq!(
            client.collection_url(PROPERTIES),
            "https://provider.example/api/v1/key/properties.json"
        );
    }

    #[test]
    fn test_page_size_is_never_zero() {
        let client = UpstreamClient::new("http://localhost").with_page_size(0);
        assert_eq!(client.page_size(), 1);
    }
}
