//! Core data models for the listings provider
//!
//! This module contains the records returned by the upstream provider
//! (listings, brokers, lease spaces) and the lookup indexes used to join them.
//! Fields the crate does not interpret are kept in an `extra` map so the proxy
//! re-serves the provider payload without losing anything.

pub mod de;
pub mod upstream;

pub use upstream::{paginate, ListingsProvider, UpstreamClient, UpstreamError, DEFAULT_PAGE_SIZE};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A property record for sale and/or for lease
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    /// Provider identifier
    #[serde(deserialize_with = "de::lenient_id")]
    pub id: u64,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    /// Property type id, kept in its upstream JSON shape (number or string)
    pub property_type_id: Option<Value>,
    pub property_subtype_id: Option<Value>,
    /// Listed for lease
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub lease: bool,
    /// Listed for sale
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub sale: bool,
    pub lease_title: Option<String>,
    pub sale_title: Option<String>,
    pub lease_description: Option<String>,
    pub sale_description: Option<String>,
    /// Total building size in square feet
    #[serde(default, deserialize_with = "de::lenient_f64")]
    pub building_size_sf: Option<f64>,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub photos: Vec<Value>,
    pub lease_listing_url: Option<String>,
    pub sale_listing_url: Option<String>,
    /// Lease brochure
    pub lease_pdf_url: Option<String>,
    /// Sale brochure
    pub sale_pdf_url: Option<String>,
    pub lease_video_url: Option<String>,
    pub sale_video_url: Option<String>,
    /// Primary broker
    #[serde(default, deserialize_with = "de::lenient_opt_id")]
    pub broker_id: Option<u64>,
    /// Secondary broker
    #[serde(default, deserialize_with = "de::lenient_opt_id")]
    pub second_broker_id: Option<u64>,
    /// Upstream fields not modelled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A listing broker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Broker {
    #[serde(deserialize_with = "de::lenient_id")]
    pub id: u64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A leasable sub-unit of a property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaseSpace {
    #[serde(deserialize_with = "de::lenient_id")]
    pub id: u64,
    /// Parent listing id, absent on orphaned spaces
    #[serde(default, deserialize_with = "de::lenient_opt_id")]
    pub property_id: Option<u64>,
    #[serde(default, deserialize_with = "de::lenient_f64")]
    pub size_sf: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Returns the trimmed value if the field is present and non-blank
pub fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl Listing {
    /// Creates a listing with only an id set
    pub fn new(id: u64) -> Self {
        Self {
            id,
            address: None,
            city: None,
            state: None,
            zip: None,
            property_type_id: None,
            property_subtype_id: None,
            lease: false,
            sale: false,
            lease_title: None,
            sale_title: None,
            lease_description: None,
            sale_description: None,
            building_size_sf: None,
            photos: Vec::new(),
            lease_listing_url: None,
            sale_listing_url: None,
            lease_pdf_url: None,
            sale_pdf_url: None,
            lease_video_url: None,
            sale_video_url: None,
            broker_id: None,
            second_broker_id: None,
            extra: Map::new(),
        }
    }

    /// Property type id rendered as a string, whatever its JSON shape
    pub fn type_id(&self) -> Option<String> {
        match self.property_type_id.as_ref()? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Lease title, falling back to the sale title
    pub fn resolved_title(&self) -> Option<&str> {
        non_empty(&self.lease_title).or_else(|| non_empty(&self.sale_title))
    }

    /// Address, city, state and zip separated by spaces, used for text search
    pub fn address_text(&self) -> String {
        [&self.address, &self.city, &self.state, &self.zip]
            .iter()
            .map(|part| part.as_deref().unwrap_or(""))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Broker {
    /// First and last name joined, trimmed
    pub fn display_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string()
    }

    /// Name followed by the email in angle brackets when known
    pub fn contact_line(&self) -> String {
        match non_empty(&self.email) {
            Some(email) => format!("{} <{}>", self.display_name(), email),
            None => self.display_name(),
        }
    }
}

/// Brokers indexed by id
#[derive(Debug, Default)]
pub struct BrokerIndex<'a> {
    by_id: HashMap<u64, &'a Broker>,
}

impl<'a> BrokerIndex<'a> {
    pub fn new(brokers: &'a [Broker]) -> Self {
        Self {
            by_id: brokers.iter().map(|b| (b.id, b)).collect(),
        }
    }

    pub fn get(&self, id: u64) -> Option<&'a Broker> {
        self.by_id.get(&id).copied()
    }

    /// Primary then secondary broker of a listing; ids that do not resolve are skipped
    pub fn resolve(&self, listing: &Listing) -> Vec<&'a Broker> {
        [listing.broker_id, listing.second_broker_id]
            .into_iter()
            .flatten()
            .filter_map(|id| self.get(id))
            .collect()
    }

    /// Contact lines of the resolved brokers joined with ", "
    pub fn display(&self, listing: &Listing) -> String {
        self.resolve(listing)
            .iter()
            .map(|b| b.contact_line())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Lease spaces grouped by parent property id
#[derive(Debug, Default)]
pub struct LeaseSpaceIndex<'a> {
    by_property: HashMap<u64, Vec<&'a LeaseSpace>>,
}

impl<'a> LeaseSpaceIndex<'a> {
    /// Spaces without a parent property are left out
    pub fn new(spaces: &'a [LeaseSpace]) -> Self {
        let mut by_property: HashMap<u64, Vec<&'a LeaseSpace>> = HashMap::new();
        for space in spaces {
            if let Some(property_id) = space.property_id {
                by_property.entry(property_id).or_default().push(space);
            }
        }
        Self { by_property }
    }

    pub fn spaces_for(&self, property_id: u64) -> &[&'a LeaseSpace] {
        self.by_property
            .get(&property_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Sum of space sizes for a property. Missing sizes count as zero.
    pub fn total_sf(&self, property_id: u64) -> f64 {
        self.spaces_for(property_id)
            .iter()
            .map(|s| s.size_sf.unwrap_or(0.0))
            .sum()
    }
}
