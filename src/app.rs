//! Application state management for the listings browser
//!
//! This module contains the browser state, handling keyboard input, data
//! loading from the proxy and the filter/sort state of the table.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};
use crossterm::event::{KeyCode, KeyEvent};
use tracing::{info, warn};

use leasedesk::client::{ProxyClient, TableData};
use leasedesk::view::{to_csv, DerivedListingView, FilterSortState, SortKey};

/// File written by the export key, relative to the working directory
pub const EXPORT_FILE: &str = "listings.csv";

/// Application state enum representing the current view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// Initial loading state while fetching data
    Loading,
    /// Listing table
    Table,
}

/// Where key presses go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Typing into the search box
    Search,
}

/// Main application struct managing state and data
pub struct App {
    /// Current application state/view
    pub state: AppState,
    pub input_mode: InputMode,
    /// Every row, in server order
    pub views: Vec<DerivedListingView>,
    pub filter: FilterSortState,
    /// Index into the visible rows
    pub selected_index: usize,
    /// Whether the detail panel for the selected row is open
    pub show_detail: bool,
    /// Flag to show help overlay
    pub show_help: bool,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag indicating a refresh has been requested
    pub refresh_requested: bool,
    /// When the proxy's snapshot was built
    pub last_updated: Option<DateTime<Utc>>,
    /// When this browser last loaded data
    pub last_refresh: Option<DateTime<Local>>,
    /// One-line feedback shown in the footer
    pub status_message: Option<String>,
    export_path: PathBuf,
    client: ProxyClient,
}

impl App {
    pub fn new(client: ProxyClient) -> Self {
        Self {
            state: AppState::Loading,
            input_mode: InputMode::Normal,
            views: Vec::new(),
            filter: FilterSortState::default(),
            selected_index: 0,
            show_detail: false,
            show_help: false,
            should_quit: false,
            refresh_requested: false,
            last_updated: None,
            last_refresh: None,
            status_message: None,
            export_path: PathBuf::from(EXPORT_FILE),
            client,
        }
    }

    /// Overrides where the export key writes
    pub fn with_export_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.export_path = path.into();
        self
    }

    /// Loads listings, brokers and lease spaces from the proxy
    pub async fn load_all_data(&mut self) {
        let data = self.client.load_table_data().await;
        self.apply_data(data);
    }

    /// Asks the proxy to refresh, then reloads everything
    pub async fn refresh(&mut self) {
        self.refresh_requested = false;
        match self.client.request_refresh().await {
            Ok(response) => {
                info!(count = response.count, "proxy refreshed");
                self.status_message = Some(format!("Refreshed: {} listings", response.count));
            }
            Err(e) => {
                warn!(error = %e, "refresh request failed");
                self.status_message = Some("Refresh failed; showing cached data".to_string());
            }
        }
        self.load_all_data().await;
    }

    /// Replaces the table contents with freshly loaded data
    pub fn apply_data(&mut self, data: TableData) {
        self.views = data.views();
        self.last_updated = data.last_updated;
        self.last_refresh = Some(Local::now());
        self.state = AppState::Table;
        self.clamp_selection();
    }

    /// Rows after filtering and sorting
    pub fn visible_rows(&self) -> Vec<&DerivedListingView> {
        self.filter.apply(&self.views)
    }

    pub fn selected_view(&self) -> Option<&DerivedListingView> {
        self.visible_rows().get(self.selected_index).copied()
    }

    /// Distinct property type ids present in the data, sorted
    pub fn type_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.views.iter().filter_map(|v| v.type_id()).collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// Steps the type filter through all types, then back to none
    pub fn cycle_type_filter(&mut self) {
        let ids = self.type_ids();
        let next = match self.filter.type_filter.as_deref() {
            None => ids.first().cloned(),
            Some(current) => ids
                .iter()
                .position(|id| id == current)
                .and_then(|i| ids.get(i + 1))
                .cloned(),
        };
        self.filter.type_filter = next;
        self.clamp_selection();
    }

    /// Writes the visible rows as CSV
    pub fn export_visible(&self) -> io::Result<&Path> {
        std::fs::write(&self.export_path, to_csv(self.visible_rows()))?;
        Ok(&self.export_path)
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_rows().len();
        if len == 0 {
            self.selected_index = 0;
            self.show_detail = false;
        } else if self.selected_index >= len {
            self.selected_index = len - 1;
        }
    }

    fn move_selection(&mut self, down: bool) {
        let len = self.visible_rows().len();
        if len == 0 {
            return;
        }
        self.selected_index = if down {
            (self.selected_index + 1).min(len - 1)
        } else {
            self.selected_index.saturating_sub(1)
        };
    }

    fn handle_search_key(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Char(c) => {
                self.filter.text_query.push(c);
            }
            KeyCode::Backspace => {
                self.filter.text_query.pop();
            }
            KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Esc => {
                self.filter.text_query.clear();
                self.input_mode = InputMode::Normal;
            }
            _ => {}
        }
        self.clamp_selection();
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - `q`: Quit (Esc also quits when no panel is open)
    /// - `Up`/`k`, `Down`/`j`: Move selection
    /// - `Enter`: Toggle the detail panel
    /// - `/`: Edit the search text; `Enter` keeps it, `Esc` clears it
    /// - `t`: Cycle the property type filter
    /// - `1`-`4`: Sort by location, size, brokers, type; again to reverse
    /// - `c`: Clear search and type filter
    /// - `e`: Export visible rows to CSV
    /// - `r`: Refresh
    /// - `?`: Toggle help
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Handle help overlay - intercepts all keys when shown
        if self.show_help {
            if matches!(
                key_event.code,
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')
            ) {
                self.show_help = false;
            }
            return;
        }

        if self.input_mode == InputMode::Search {
            self.handle_search_key(key_event);
            return;
        }

        match self.state {
            AppState::Loading => {
                // Only quit is allowed during loading
                if key_event.code == KeyCode::Char('q') {
                    self.should_quit = true;
                }
            }
            AppState::Table => match key_event.code {
                KeyCode::Char('q') => {
                    self.should_quit = true;
                }
                KeyCode::Esc => {
                    if self.show_detail {
                        self.show_detail = false;
                    } else {
                        self.should_quit = true;
                    }
                }
                KeyCode::Up | KeyCode::Char('k') => self.move_selection(false),
                KeyCode::Down | KeyCode::Char('j') => self.move_selection(true),
                KeyCode::Enter => {
                    self.show_detail = !self.show_detail && self.selected_view().is_some();
                }
                KeyCode::Char('/') => {
                    self.input_mode = InputMode::Search;
                }
                KeyCode::Char('t') => self.cycle_type_filter(),
                KeyCode::Char(c @ '1'..='4') => {
                    let index = c as usize - '1' as usize;
                    self.filter.toggle_sort(SortKey::ALL[index]);
                }
                KeyCode::Char('c') => {
                    self.filter.clear_filters();
                    self.clamp_selection();
                }
                KeyCode::Char('e') => {
                    self.status_message = Some(match self.export_visible() {
                        Ok(path) => format!("Exported to {}", path.display()),
                        Err(e) => {
                            warn!(error = %e, "export failed");
                            format!("Export failed: {}", e)
                        }
                    });
                }
                KeyCode::Char('r') => {
                    self.refresh_requested = true;
                }
                KeyCode::Char('?') => {
                    self.show_help = true;
                }
                _ => {}
            },
        }
    }
}
