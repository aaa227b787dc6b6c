//! The cached listing set

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::data::Listing;

/// Listing set plus the time it was fetched
///
/// Serialized as `{"lastUpdated": ..., "listings": [...]}`, which is also the
/// persisted file layout. `last_updated` is `Some` iff the listings came from a
/// successful fetch or a persisted file; [`CacheSnapshot::empty`] is the only
/// snapshot without one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheSnapshot {
    pub last_updated: Option<DateTime<Utc>>,
    pub listings: Vec<Listing>,
}

impl CacheSnapshot {
    /// Well-formed snapshot with no listings, served when every source failed
    pub fn empty() -> Self {
        Self {
            last_updated: None,
            listings: Vec::new(),
        }
    }

    pub fn populated(listings: Vec<Listing>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            last_updated: Some(fetched_at),
            listings,
        }
    }

    pub fn count(&self) -> usize {
        self.listings.len()
    }

    /// Whether this snapshot was ever populated
    pub fn has_data(&self) -> bool {
        self.last_updated.is_some()
    }

    /// Whether the snapshot is younger than `max_age` at `now`
    pub fn is_fresh(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
        match self.last_updated {
            Some(at) => now
                .signed_duration_since(at)
                .to_std()
                .map(|age| age < max_age)
                // Timestamps in the future count as fresh
                .unwrap_or(true),
            None => false,
        }
    }
}
