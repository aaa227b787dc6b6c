//! Client-side filtering and sorting of derived views

use std::cmp::Ordering;
use std::str::FromStr;

use super::DerivedListingView;

/// Sortable table columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Composed address string
    Location,
    /// Numeric building size (not the derived available SF)
    Size,
    /// Broker display string
    Brokers,
    /// Derived listing type label
    Type,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [SortKey::Location, SortKey::Size, SortKey::Brokers, SortKey::Type];

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Location => "Location",
            SortKey::Size => "Size",
            SortKey::Brokers => "Brokers",
            SortKey::Type => "Type",
        }
    }

    /// Parses a sort key name, case-insensitively
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "location" => Some(SortKey::Location),
            "size" => Some(SortKey::Size),
            "brokers" | "broker" => Some(SortKey::Brokers),
            "type" => Some(SortKey::Type),
            _ => None,
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_opt(s).ok_or_else(|| s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "\u{25B2}",  // ▲
            SortDirection::Descending => "\u{25BC}", // ▼
        }
    }
}

/// Current text query, type filter and sort of the table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSortState {
    pub text_query: String,
    /// Exact property type id
    pub type_filter: Option<String>,
    pub sort_key: Option<SortKey>,
    pub direction: SortDirection,
}

impl FilterSortState {
    /// Selecting the active key flips direction; a new key starts ascending
    pub fn toggle_sort(&mut self, key: SortKey) {
        if self.sort_key == Some(key) {
            self.direction = self.direction.toggled();
        } else {
            self.sort_key = Some(key);
            self.direction = SortDirection::Ascending;
        }
    }

    pub fn clear_filters(&mut self) {
        self.text_query.clear();
        self.type_filter = None;
    }

    pub fn is_filtered(&self) -> bool {
        !self.text_query.trim().is_empty() || self.type_filter.is_some()
    }

    /// Whether a view passes the text query and type filter
    pub fn matches(&self, view: &DerivedListingView) -> bool {
        if let Some(type_filter) = self.type_filter.as_deref() {
            if view.type_id().as_deref() != Some(type_filter) {
                return false;
            }
        }

        let needle = self.text_query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        let listing = &view.listing;
        [
            &listing.address,
            &listing.city,
            &listing.state,
            &listing.zip,
        ]
        .iter()
        .filter_map(|field| field.as_deref())
        .chain([view.broker_display.as_str(), listing.resolved_title().unwrap_or("")])
        .any(|text| text.to_lowercase().contains(&needle))
    }

    /// Filtered and sorted rows
    pub fn apply<'a>(&self, views: &'a [DerivedListingView]) -> Vec<&'a DerivedListingView> {
        let mut rows: Vec<&DerivedListingView> = views.iter().filter(|v| self.matches(v)).collect();

        if let Some(key) = self.sort_key {
            rows.sort_by(|a, b| match self.direction {
                SortDirection::Ascending => compare(key, a, b),
                SortDirection::Descending => compare(key, b, a),
            });
        }

        rows
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

fn compare(key: SortKey, a: &DerivedListingView, b: &DerivedListingView) -> Ordering {
    match key {
        SortKey::Location => compare_text(&a.location, &b.location),
        SortKey::Size => {
            let size = |v: &DerivedListingView| v.listing.building_size_sf.unwrap_or(0.0);
            size(a).total_cmp(&size(b))
        }
        SortKey::Brokers => compare_text(&a.broker_display, &b.broker_display),
        SortKey::Type => compare_text(a.listing_type.label(), b.listing_type.label()),
    }
}
