//! Server-side listing filters
//!
//! `query` is a pure function over a snapshot: it never mutates its input and
//! returns matches in snapshot order.

use serde::Deserialize;

use crate::cache::CacheSnapshot;
use crate::data::{BrokerIndex, Listing};

/// Filter parameters accepted by `GET /api/listings`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListingQuery {
    /// Case-insensitive substring over address, title and broker text
    pub search: Option<String>,
    /// Exact property type id
    #[serde(rename = "type")]
    pub type_id: Option<String>,
}

impl ListingQuery {
    pub fn new(search: Option<&str>, type_id: Option<&str>) -> Self {
        Self {
            search: search.map(String::from),
            type_id: type_id.map(String::from),
        }
    }

    /// Lowercased search needle; blank means no filter
    fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    fn type_filter(&self) -> Option<&str> {
        self.type_id.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Whether a listing passes both filters
pub fn matches(listing: &Listing, needle: Option<&str>, type_id: Option<&str>, brokers: &BrokerIndex) -> bool {
    if let Some(type_id) = type_id {
        if listing.type_id().as_deref() != Some(type_id) {
            return false;
        }
    }

    let Some(needle) = needle else {
        return true;
    };

    listing.address_text().to_lowercase().contains(needle)
        || listing
            .resolved_title()
            .is_some_and(|title| title.to_lowercase().contains(needle))
        || brokers.display(listing).to_lowercase().contains(needle)
}

/// Listings of `snapshot` matching `params`, in snapshot order
pub fn query(snapshot: &CacheSnapshot, params: &ListingQuery, brokers: &BrokerIndex) -> Vec<Listing> {
    let needle = params.needle();
    let type_id = params.type_filter();

    snapshot
        .listings
        .iter()
        .filter(|listing| matches(listing, needle.as_deref(), type_id, brokers))
        .cloned()
        .collect()
}
