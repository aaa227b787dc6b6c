//! Joins listings with brokers and lease spaces and computes display fields

use serde::Serialize;
use std::fmt;

use crate::data::{non_empty, Broker, BrokerIndex, LeaseSpace, LeaseSpaceIndex, Listing};

pub const SIZE_PLACEHOLDER: &str = "N/A";
pub const TITLE_PLACEHOLDER: &str = "Untitled";
pub const DESCRIPTION_PLACEHOLDER: &str = "No description available.";

/// How a listing is offered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ListingType {
    ForSale,
    ForLease,
    ForSaleAndLease,
}

impl ListingType {
    /// Sale is the default when neither flag is set
    pub fn from_flags(lease: bool, sale: bool) -> Self {
        match (lease, sale) {
            (true, true) => ListingType::ForSaleAndLease,
            (true, false) => ListingType::ForLease,
            _ => ListingType::ForSale,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ListingType::ForSale => "For Sale",
            ListingType::ForLease => "For Lease",
            ListingType::ForSaleAndLease => "For Sale & Lease",
        }
    }
}

impl fmt::Display for ListingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Broker fields shown alongside a listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrokerContact {
    pub id: u64,
    pub name: String,
    pub email: Option<String>,
}

impl From<&Broker> for BrokerContact {
    fn from(broker: &Broker) -> Self {
        Self {
            id: broker.id,
            name: broker.display_name(),
            email: non_empty(&broker.email).map(String::from),
        }
    }
}

/// A listing with its joined and computed display fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedListingView {
    pub listing: Listing,
    /// Contact lines of the resolved brokers
    pub broker_display: String,
    pub brokers: Vec<BrokerContact>,
    /// Sum of the listing's lease space sizes
    pub total_available_sf: f64,
    pub location: String,
    pub size: String,
    pub listing_type: ListingType,
    pub title: String,
    pub brochure_url: Option<String>,
    pub video_url: Option<String>,
    pub description: String,
    pub primary_url: Option<String>,
}

impl DerivedListingView {
    /// Broker names joined with "; "
    pub fn broker_names(&self) -> String {
        self.brokers
            .iter()
            .map(|b| b.name.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn type_id(&self) -> Option<String> {
        self.listing.type_id()
    }
}

/// Formats square footage with thousands separators, e.g. `12,500 SF`
pub fn format_sf(value: f64) -> String {
    let digits = (value.round() as u64).to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{} SF", grouped)
}

/// `address, city, state zip` with missing parts left empty
fn location(listing: &Listing) -> String {
    let part = |field: &Option<String>| field.as_deref().unwrap_or("").to_string();
    format!(
        "{}, {}, {} {}",
        part(&listing.address),
        part(&listing.city),
        part(&listing.state),
        part(&listing.zip)
    )
}

fn size(listing: &Listing, total_available_sf: f64) -> String {
    if total_available_sf > 0.0 {
        return format_sf(total_available_sf);
    }
    match listing.building_size_sf {
        Some(sf) if sf > 0.0 => format_sf(sf),
        _ => SIZE_PLACEHOLDER.to_string(),
    }
}

/// Picks the sale or lease variant of a link by listing type.
/// Combined listings prefer the lease link and fall back to the sale link.
fn by_type(listing_type: ListingType, lease: &Option<String>, sale: &Option<String>) -> Option<String> {
    let chosen = match listing_type {
        ListingType::ForSale => non_empty(sale),
        ListingType::ForLease => non_empty(lease),
        ListingType::ForSaleAndLease => non_empty(lease).or_else(|| non_empty(sale)),
    };
    chosen.map(String::from)
}

fn description(listing: &Listing) -> String {
    let lease = non_empty(&listing.lease_description).filter(|_| listing.lease);
    let sale = non_empty(&listing.sale_description).filter(|_| listing.sale);
    lease
        .or(sale)
        .unwrap_or(DESCRIPTION_PLACEHOLDER)
        .to_string()
}

/// Builds the view for one listing
pub fn derive(listing: &Listing, brokers: &BrokerIndex, spaces: &LeaseSpaceIndex) -> DerivedListingView {
    let resolved = brokers.resolve(listing);
    let broker_display = resolved
        .iter()
        .map(|b| b.contact_line())
        .collect::<Vec<_>>()
        .join(", ");
    let contacts = resolved.into_iter().map(BrokerContact::from).collect();

    let total_available_sf = spaces.total_sf(listing.id);
    let listing_type = ListingType::from_flags(listing.lease, listing.sale);
    let brochure_url = by_type(listing_type, &listing.lease_pdf_url, &listing.sale_pdf_url);
    let primary_url = by_type(listing_type, &listing.lease_listing_url, &listing.sale_listing_url)
        .or_else(|| brochure_url.clone());

    DerivedListingView {
        broker_display,
        brokers: contacts,
        total_available_sf,
        location: location(listing),
        size: size(listing, total_available_sf),
        listing_type,
        title: listing.resolved_title().unwrap_or(TITLE_PLACEHOLDER).to_string(),
        video_url: by_type(listing_type, &listing.lease_video_url, &listing.sale_video_url),
        brochure_url,
        description: description(listing),
        primary_url,
        listing: listing.clone(),
    }
}

/// Builds views for every listing, in listing order
pub fn build_views(listings: &[Listing], brokers: &[Broker], spaces: &[LeaseSpace]) -> Vec<DerivedListingView> {
    let broker_index = BrokerIndex::new(brokers);
    let space_index = LeaseSpaceIndex::new(spaces);
    listings
        .iter()
        .map(|listing| derive(listing, &broker_index, &space_index))
        .collect()
}
