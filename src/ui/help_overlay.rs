//! Help overlay listing the browser keybindings
//!
//! The modal is sized from the binding table and clipped to the frame.

use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Padding, Paragraph},
    Frame,
};

/// Width of the key column
const KEY_WIDTH: usize = 10;

/// Sections of (key, action) pairs, in display order
const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Table",
        &[
            ("↑/k ↓/j", "Move selection"),
            ("Enter", "Toggle listing details"),
            ("Esc", "Close details, then quit"),
            ("q", "Quit"),
        ],
    ),
    (
        "Filter and sort",
        &[
            ("/", "Search address, brokers, title"),
            ("t", "Cycle property type"),
            ("1-4", "Sort by column, again to reverse"),
            ("c", "Clear search and type"),
        ],
    ),
    (
        "Data",
        &[
            ("e", "Export visible rows to CSV"),
            ("r", "Refresh listings"),
            ("?", "Toggle this help"),
        ],
    ),
];

const FOOTER: &str = "Esc or ? closes this help";

fn section_lines() -> Vec<Line<'static>> {
    let heading = Style::default().add_modifier(Modifier::BOLD);
    let key = Style::default().fg(Color::Yellow);

    let mut lines = Vec::new();
    for (title, bindings) in SECTIONS {
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        lines.push(Line::styled(*title, heading));
        lines.extend(bindings.iter().map(|(keys, action)| {
            Line::from(vec![
                Span::styled(format!(" {:<KEY_WIDTH$}", keys), key),
                Span::raw(*action),
            ])
        }));
    }
    lines.push(Line::default());
    lines.push(Line::styled(FOOTER, Style::default().fg(Color::DarkGray)));
    lines
}

/// Centers a `width` x `height` box inside `area`, shrinking it to fit
fn modal_area(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [modal] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    modal
}

/// Renders the help overlay on top of the current view
pub fn render(frame: &mut Frame) {
    let lines = section_lines();
    let content_width = lines.iter().map(Line::width).max().unwrap_or(0);
    // Two border cells and one cell of padding per side
    let width = u16::try_from(content_width + 4).unwrap_or(u16::MAX);
    let height = u16::try_from(lines.len() + 2).unwrap_or(u16::MAX);
    let area = modal_area(frame.area(), width, height);

    let block = Block::default()
        .title(" Keys ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .padding(Padding::horizontal(1));

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
