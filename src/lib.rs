//! leasedesk library
//!
//! The caching proxy, the table view builder and the proxy client. The binary
//! in `main.rs` adds the terminal browser on top.

pub mod api;
pub mod cache;
pub mod cli;
pub mod client;
pub mod data;
pub mod logging;
pub mod query;
pub mod refresh;
pub mod view;
