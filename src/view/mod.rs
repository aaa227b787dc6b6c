//! Table view over joined listings
//!
//! Builds [`DerivedListingView`]s from listings, brokers and lease spaces, then
//! filters, sorts and exports them. Everything here is pure and runs on data
//! already fetched from the proxy.

pub mod derive;
pub mod export;
pub mod table;

pub use derive::{build_views, derive, format_sf, BrokerContact, DerivedListingView, ListingType};
pub use export::{csv_field, to_csv, CSV_HEADER};
pub use table::{FilterSortState, SortDirection, SortKey};
