//! Listing table screen rendering
//!
//! Renders the main table: a header with counts and active filters, one row
//! per visible listing with sortable columns, an optional detail panel for the
//! selected row and a footer with key hints or the last status message.

use chrono::Local;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use leasedesk::view::{DerivedListingView, ListingType, SortKey};

use crate::app::{App, InputMode};

/// Height of the detail panel when open
const DETAIL_HEIGHT: u16 = 12;

/// Color for the listing type column
fn type_color(listing_type: ListingType) -> Color {
    match listing_type {
        ListingType::ForLease => Color::Cyan,
        ListingType::ForSale => Color::Green,
        ListingType::ForSaleAndLease => Color::Magenta,
    }
}

/// Column header text, with an arrow on the active sort column
fn column_title(app: &App, key: SortKey, number: usize) -> String {
    let arrow = if app.filter.sort_key == Some(key) {
        format!(" {}", app.filter.direction.arrow())
    } else {
        String::new()
    };
    format!("{} {}{}", number, key.label(), arrow)
}

/// Renders the listing table screen
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let rows = app.visible_rows();
    let selected = rows.get(app.selected_index).copied();
    let detail_height = if app.show_detail && selected.is_some() {
        DETAIL_HEIGHT
    } else {
        0
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(3),
            Constraint::Length(detail_height),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(frame, app, rows.len(), chunks[0]);
    render_rows(frame, app, &rows, chunks[1]);
    if let (Some(view), true) = (selected, detail_height > 0) {
        super::render_listing_detail(frame, view, chunks[2]);
    }
    render_footer(frame, app, chunks[3]);
}

fn render_header(frame: &mut Frame, app: &App, visible: usize, area: Rect) {
    let updated = app
        .last_updated
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "never".to_string());

    let search_style = if app.input_mode == InputMode::Search {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let cursor = if app.input_mode == InputMode::Search { "_" } else { "" };

    let lines = vec![
        Line::from(vec![
            Span::styled(
                format!("{} of {} listings", visible, app.views.len()),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("   Updated: {}", updated),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Line::from(vec![
            Span::raw("Search: "),
            Span::styled(format!("{}{}", app.filter.text_query, cursor), search_style),
            Span::raw("   Type: "),
            Span::raw(app.filter.type_filter.as_deref().unwrap_or("All").to_string()),
        ]),
    ];

    let block = Block::default()
        .title(" Listings ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_rows(frame: &mut Frame, app: &App, rows: &[&DerivedListingView], area: Rect) {
    if rows.is_empty() {
        let message = if app.views.is_empty() {
            "No listings available"
        } else {
            "No listings match the current filters"
        };
        let empty = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new(
        SortKey::ALL
            .iter()
            .enumerate()
            .map(|(i, key)| Cell::from(column_title(app, *key, i + 1))),
    )
    .style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    let body: Vec<Row> = rows
        .iter()
        .map(|view| {
            Row::new(vec![
                Cell::from(view.location.clone()),
                Cell::from(view.size.clone()),
                Cell::from(view.broker_names()),
                Cell::from(view.listing_type.label())
                    .style(Style::default().fg(type_color(view.listing_type))),
            ])
        })
        .collect();

    let widths = [
        Constraint::Percentage(40),
        Constraint::Percentage(15),
        Constraint::Percentage(30),
        Constraint::Percentage(15),
    ];

    let table = Table::new(body, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    let mut state = TableState::default().with_selected(Some(app.selected_index));
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let text = match (&app.status_message, app.input_mode) {
        (_, InputMode::Search) => "Type to search  Enter: keep  Esc: clear".to_string(),
        (Some(message), _) => message.clone(),
        (None, _) => {
            "j/k: move  Enter: details  /: search  t: type  1-4: sort  e: export  r: refresh  ?: help  q: quit"
                .to_string()
        }
    };

    frame.render_widget(
        Paragraph::new(text).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}
