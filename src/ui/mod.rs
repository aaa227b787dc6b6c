//! UI rendering module for the listings browser
//!
//! This module contains all the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components.

pub mod help_overlay;
pub mod listing_detail;
pub mod listing_table;

pub use help_overlay::render as render_help_overlay;
pub use listing_detail::render as render_listing_detail;
pub use listing_table::render as render_listing_table;
