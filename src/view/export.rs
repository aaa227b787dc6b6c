//! CSV export of table rows

use super::DerivedListingView;

/// Export column headers
pub const CSV_HEADER: [&str; 6] = ["Location", "Size", "Brokers", "Type", "Available SF", "URL"];

/// Quotes a CSV field, doubling embedded quotes
pub fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn csv_line<I, S>(fields: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    fields
        .into_iter()
        .map(|f| csv_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Cells of one export row, in header order
pub fn export_row(view: &DerivedListingView) -> [String; 6] {
    [
        view.location.clone(),
        view.size.clone(),
        view.broker_names(),
        view.listing_type.label().to_string(),
        view.total_available_sf.to_string(),
        view.primary_url.clone().unwrap_or_default(),
    ]
}

/// Renders a header line plus one line per row, newline-terminated
pub fn to_csv<'a, I>(rows: I) -> String
where
    I: IntoIterator<Item = &'a DerivedListingView>,
{
    let mut out = csv_line(CSV_HEADER);
    out.push('\n');
    for row in rows {
        out.push_str(&csv_line(export_row(row)));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Broker, LeaseSpace, Listing};
    use crate::view::build_views;
    use serde_json::Map;

    fn views() -> Vec<DerivedListingView> {
        let mut listing = Listing::new(1);
        listing.address = Some("5 Elm St".to_string());
        listing.city = Some("Reno".to_string());
        listing.state = Some("NV".to_string());
        listing.zip = Some("89501".to_string());
        listing.lease = true;
        listing.broker_id = Some(1);
        listing.second_broker_id = Some(2);
        listing.lease_listing_url = Some("https://example.com/l/1".to_string());

        let brokers = vec![
            Broker {
                id: 1,
                first_name: Some("Pat".to_string()),
                last_name: Some("O\"Brien".to_string()),
                email: None,
                extra: Map::new(),
            },
            Broker {
                id: 2,
                first_name: Some("Lou".to_string()),
                last_name: Some("Chen".to_string()),
                email: None,
                extra: Map::new(),
            },
        ];
        let spaces = vec![LeaseSpace {
            id: 9,
            property_id: Some(1),
            size_sf: Some(1500.5),
            extra: Map::new(),
        }];

        build_views(&[listing], &brokers, &spaces)
    }

    #[test]
    fn test_csv_field_doubles_quotes() {
        assert_eq!(csv_field("O\"Brien"), "\"O\"\"Brien\"");
        assert_eq!(csv_field("plain"), "\"plain\"");
        assert_eq!(csv_field(""), "\"\"");
    }

    #[test]
    fn test_to_csv_layout() {
        let views = views();
        let csv = to_csv(&views);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "\"Location\",\"Size\",\"Brokers\",\"Type\",\"Available SF\",\"URL\""
        );
        assert_eq!(
            lines[1],
            "\"5 Elm St, Reno, NV 89501\",\"1,501 SF\",\"Pat O\"\"Brien; Lou Chen\",\"For Lease\",\"1500.5\",\"https://example.com/l/1\""
        );
    }

    #[test]
    fn test_broker_quote_is_doubled_in_output() {
        let csv = to_csv(&views());
        assert!(csv.contains("\"Pat O\"\"Brien; Lou Chen\""));
    }

    #[test]
    fn test_empty_rows_still_have_header() {
        let csv = to_csv(std::iter::empty());
        assert_eq!(csv, "\"Location\",\"Size\",\"Brokers\",\"Type\",\"Available SF\",\"URL\"\n");
    }
}
