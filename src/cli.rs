//! Command-line interface parsing for leasedesk
//!
//! This module handles parsing of CLI arguments using clap. Every option that
//! configures the server can also come from a `LEASEDESK_*` environment variable.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use crate::cache::SnapshotStore;
use crate::client::DEFAULT_SERVER_URL;
use crate::data::{UpstreamClient, UpstreamError, DEFAULT_PAGE_SIZE};
use crate::refresh::RefreshConfig;
use crate::view::{FilterSortState, SortDirection, SortKey};

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// The specified sort key is not recognized
    #[error("Invalid sort key: '{0}'. Valid keys: location, size, brokers, type")]
    InvalidSortKey(String),

    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    /// No --data-dir and no home directory to derive one from
    #[error("Could not determine a cache directory; pass --data-dir")]
    NoCacheDir,

    #[error("Refresh failed; serving {0} listings from fallback")]
    RefreshFailed(usize),
}

/// leasedesk - caching proxy and table browser for property listings
#[derive(Parser, Debug)]
#[command(name = "leasedesk")]
#[command(about = "Caching proxy and table browser for commercial property listings")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the caching proxy server
    Serve(ServeArgs),
    /// Fetch listings once, persist them and exit
    Refresh(UpstreamArgs),
    /// Browse listings from a running proxy in the terminal
    Browse(ClientArgs),
    /// Export listings from a running proxy as CSV
    Export(ExportArgs),
}

/// Provider and persistence options
#[derive(Args, Debug, Clone)]
pub struct UpstreamArgs {
    /// Provider base URL; collections are fetched from `<url>/<collection>.json`
    #[arg(long, env = "LEASEDESK_API_BASE_URL")]
    pub api_base_url: String,

    /// Records requested per page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,

    /// Provider request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Directory for the persisted snapshot (defaults to the XDG cache dir)
    #[arg(long, env = "LEASEDESK_DATA_DIR", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
}

/// Server options
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, env = "LEASEDESK_BIND", default_value = "127.0.0.1")]
    pub bind: String,

    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Minutes between scheduled refreshes
    #[arg(long, env = "LEASEDESK_REFRESH_MINUTES", default_value_t = 60)]
    pub refresh_minutes: u64,

    /// Minutes lease spaces stay cached
    #[arg(long, env = "LEASEDESK_LEASE_SPACES_TTL_MINUTES", default_value_t = 15)]
    pub lease_spaces_ttl_minutes: u64,

    #[command(flatten)]
    pub upstream: UpstreamArgs,
}

/// Options for commands that talk to a running proxy
#[derive(Args, Debug, Clone)]
pub struct ClientArgs {
    /// Proxy base URL
    #[arg(long, env = "LEASEDESK_SERVER", default_value = DEFAULT_SERVER_URL)]
    pub server: String,
}

/// CSV export options
#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub client: ClientArgs,

    /// Case-insensitive text filter
    #[arg(long)]
    pub search: Option<String>,

    /// Exact property type id
    #[arg(long = "type", value_name = "TYPE_ID")]
    pub type_id: Option<String>,

    /// Sort column: location, size, brokers, type
    #[arg(long, value_name = "KEY")]
    pub sort: Option<String>,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,

    /// Output file (defaults to stdout)
    #[arg(long, short, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Parses a sort key argument.
///
/// # Returns
/// * `Ok(SortKey)` if the string names a column
/// * `Err(CliError::InvalidSortKey)` otherwise
pub fn parse_sort_arg(s: &str) -> Result<SortKey, CliError> {
    SortKey::from_str_opt(s).ok_or_else(|| CliError::InvalidSortKey(s.to_string()))
}

impl UpstreamArgs {
    pub fn snapshot_store(&self) -> Result<SnapshotStore, CliError> {
        match &self.data_dir {
            Some(dir) => Ok(SnapshotStore::with_dir(dir.clone())),
            None => SnapshotStore::new().ok_or(CliError::NoCacheDir),
        }
    }

    pub fn upstream_client(&self) -> Result<UpstreamClient, UpstreamError> {
        Ok(
            UpstreamClient::with_timeout(&self.api_base_url, Duration::from_secs(self.timeout_secs))?
                .with_page_size(self.page_size),
        )
    }
}

impl ServeArgs {
    pub fn refresh_config(&self) -> RefreshConfig {
        RefreshConfig {
            interval: Duration::from_secs(self.refresh_minutes.max(1) * 60),
            enabled: true,
            lease_spaces_ttl: self.lease_spaces_ttl(),
        }
    }

    pub fn lease_spaces_ttl(&self) -> Duration {
        Duration::from_secs(self.lease_spaces_ttl_minutes * 60)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, CliError> {
        let addr = format!("{}:{}", self.bind, self.port);
        addr.parse()
            .map_err(|_| CliError::InvalidBindAddress(addr))
    }
}

impl ExportArgs {
    /// Filter and sort state equivalent to these options
    pub fn filter_state(&self) -> Result<FilterSortState, CliError> {
        let mut state = FilterSortState {
            text_query: self.search.clone().unwrap_or_default(),
            type_filter: self.type_id.clone().filter(|t| !t.trim().is_empty()),
            ..Default::default()
        };

        if let Some(sort) = &self.sort {
            state.sort_key = Some(parse_sort_arg(sort)?);
            if self.desc {
                state.direction = SortDirection::Descending;
            }
        }

        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "--api-base-url=https://provider.example/api";

    #[test]
    fn test_parse_sort_arg_valid() {
        assert_eq!(parse_sort_arg("location").unwrap(), SortKey::Location);
        assert_eq!(parse_sort_arg("SIZE").unwrap(), SortKey::Size);
        assert_eq!(parse_sort_arg("brokers").unwrap(), SortKey::Brokers);
        assert_eq!(parse_sort_arg("type").unwrap(), SortKey::Type);
    }

    #[test]
    fn test_parse_sort_arg_invalid() {
        let err = parse_sort_arg("price").unwrap_err();
        assert!(err.to_string().contains("Invalid sort key"));
        assert!(err.to_string().contains("price"));
    }

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::parse_from(["leasedesk", "serve", BASE]);
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };

        assert_eq!(args.port, 3000);
        assert_eq!(args.upstream.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(args.refresh_config().interval, Duration::from_secs(3600));
        assert_eq!(args.lease_spaces_ttl(), Duration::from_secs(900));
        assert_eq!(args.refresh_config().lease_spaces_ttl, Duration::from_secs(900));
        assert_eq!(args.socket_addr().unwrap().to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn test_serve_overrides() {
        let cli = Cli::parse_from([
            "leasedesk",
            "serve",
            BASE,
            "--port",
            "8080",
            "--bind",
            "0.0.0.0",
            "--refresh-minutes",
            "5",
            "--data-dir",
            "/tmp/leasedesk",
        ]);
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };

        assert_eq!(args.socket_addr().unwrap().to_string(), "0.0.0.0:8080");
        assert_eq!(args.refresh_config().interval, Duration::from_secs(300));
        assert_eq!(
            args.upstream.snapshot_store().unwrap().cache_dir(),
            &PathBuf::from("/tmp/leasedesk")
        );
    }

    #[test]
    fn test_invalid_bind_address() {
        let cli = Cli::parse_from(["leasedesk", "serve", BASE, "--bind", "not an ip"]);
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert!(matches!(args.socket_addr(), Err(CliError::InvalidBindAddress(_))));
    }

    #[test]
    fn test_export_filter_state() {
        let cli = Cli::parse_from([
            "leasedesk", "export", "--search", "dock", "--type", "3", "--sort", "size", "--desc",
        ]);
        let Command::Export(args) = cli.command else {
            panic!("expected export");
        };

        let state = args.filter_state().unwrap();
        assert_eq!(state.text_query, "dock");
        assert_eq!(state.type_filter.as_deref(), Some("3"));
        assert_eq!(state.sort_key, Some(SortKey::Size));
        assert_eq!(state.direction, SortDirection::Descending);
    }

    #[test]
    fn test_export_invalid_sort() {
        let cli = Cli::parse_from(["leasedesk", "export", "--sort", "price"]);
        let Command::Export(args) = cli.command else {
            panic!("expected export");
        };
        assert!(args.filter_state().is_err());
    }

    #[test]
    fn test_browse_default_server() {
        let cli = Cli::parse_from(["leasedesk", "browse"]);
        let Command::Browse(args) = cli.command else {
            panic!("expected browse");
        };
        assert!(args.server.starts_with("http://"));
    }
}
