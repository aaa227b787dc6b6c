//! Detail panel for the selected listing
//!
//! Shows the resolved title and description, broker contacts, available
//! lease space and the listing's links.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use leasedesk::view::{format_sf, DerivedListingView};

/// Color scheme for the panel
mod colors {
    use ratatui::style::Color;

    /// Field labels
    pub const LABEL: Color = Color::Cyan;
    /// Missing values
    pub const MISSING: Color = Color::DarkGray;
    /// Links
    pub const LINK: Color = Color::Blue;
}

fn field<'a>(label: &'a str, value: Option<&'a str>) -> Line<'a> {
    let value = match value {
        Some(v) => Span::styled(v, Style::default().fg(colors::LINK)),
        None => Span::styled("none", Style::default().fg(colors::MISSING)),
    };
    Line::from(vec![
        Span::styled(format!("{:<12}", label), Style::default().fg(colors::LABEL)),
        value,
    ])
}

/// Renders the detail panel into `area`
pub fn render(frame: &mut Frame, view: &DerivedListingView, area: Rect) {
    let brokers = if view.brokers.is_empty() {
        "none".to_string()
    } else {
        view.brokers
            .iter()
            .map(|b| match &b.email {
                Some(email) => format!("{} <{}>", b.name, email),
                None => b.name.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    };
    let available = if view.total_available_sf > 0.0 {
        format_sf(view.total_available_sf)
    } else {
        "none".to_string()
    };

    let lines = vec![
        Line::from(Span::styled(
            view.title.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            view.location.as_str(),
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(format!("{:<12}", "Brokers"), Style::default().fg(colors::LABEL)),
            Span::raw(brokers),
        ]),
        Line::from(vec![
            Span::styled(format!("{:<12}", "Available"), Style::default().fg(colors::LABEL)),
            Span::raw(available),
        ]),
        field("Listing", view.primary_url.as_deref()),
        field("Brochure", view.brochure_url.as_deref()),
        field("Video", view.video_url.as_deref()),
        Line::from(""),
        Line::from(view.description.as_str()),
    ];

    let block = Block::default()
        .title(format!(" {} ", view.listing_type))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::LABEL));

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use leasedesk::data::{Broker, LeaseSpace, Listing};
    use leasedesk::view::build_views;
    use ratatui::{backend::TestBackend, Terminal};
    use serde_json::Map;

    #[test]
    fn test_detail_shows_links_and_contacts() {
        let mut listing = Listing::new(7);
        listing.lease = true;
        listing.lease_title = Some("Corner Retail".to_string());
        listing.lease_description = Some("Busy intersection.".to_string());
        listing.lease_pdf_url = Some("https://cdn.example/7.pdf".to_string());
        listing.broker_id = Some(1);
        let brokers = vec![Broker {
            id: 1,
            first_name: Some("Sam".to_string()),
            last_name: Some("Ortiz".to_string()),
            email: Some("sam@example.com".to_string()),
            extra: Map::new(),
        }];
        let spaces = vec![LeaseSpace {
            id: 1,
            property_id: Some(7),
            size_sf: Some(1500.0),
            extra: Map::new(),
        }];
        let views = build_views(&[listing], &brokers, &spaces);

        let backend = TestBackend::new(100, 12);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                render(frame, &views[0], area);
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        let content: String = buffer.content().iter().map(|cell| cell.symbol()).collect();

        assert!(content.contains("For Lease"));
        assert!(content.contains("Corner Retail"));
        assert!(content.contains("Sam Ortiz <sam@example.com>"));
        assert!(content.contains("1,500 SF"));
        assert!(content.contains("https://cdn.example/7.pdf"));
        assert!(content.contains("Busy intersection."));
    }
}
