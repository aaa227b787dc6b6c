//! Integration tests for CLI argument handling
//!
//! Runs the built binary for the paths that do not need a terminal.

use std::process::Command;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_leasedesk"))
        .args(args)
        .env_remove("LEASEDESK_API_BASE_URL")
        .env_remove("LEASEDESK_SERVER")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute leasedesk")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(
        output.status.success(),
        "Expected --help to exit successfully"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("leasedesk"), "Help should mention leasedesk");
    for subcommand in ["serve", "refresh", "browse", "export"] {
        assert!(stdout.contains(subcommand), "Help should list {}", subcommand);
    }
}

#[test]
fn test_serve_requires_api_base_url() {
    let output = run_cli(&["serve"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("--api-base-url"),
        "Should name the missing option: {}",
        stderr
    );
}

#[test]
fn test_export_invalid_sort_prints_error_and_exits() {
    let output = run_cli(&["export", "--sort", "price"]);
    assert!(!output.status.success(), "Expected invalid sort to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid sort key"),
        "Should print error message about invalid sort key: {}",
        stderr
    );
}

#[test]
fn test_export_without_proxy_writes_header_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("listings.csv");

    // Nothing listens on the discard port, so every fetch degrades to empty
    let output = run_cli(&[
        "export",
        "--server",
        "http://127.0.0.1:9",
        "--output",
        path.to_str().unwrap(),
    ]);
    assert!(output.status.success());

    let csv = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        csv,
        "\"Location\",\"Size\",\"Brokers\",\"Type\",\"Available SF\",\"URL\"\n"
    );
}

#[test]
fn test_refresh_against_unreachable_provider_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_cli(&[
        "refresh",
        "--api-base-url",
        "http://127.0.0.1:9",
        "--timeout-secs",
        "2",
        "--data-dir",
        dir.path().to_str().unwrap(),
    ]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Refresh failed"), "stderr: {}", stderr);
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use clap::Parser;
    use leasedesk::cli::{parse_sort_arg, Cli, Command};
    use leasedesk::view::SortKey;

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["leasedesk"]).is_err());
    }

    #[test]
    fn test_refresh_takes_upstream_options() {
        let cli = Cli::parse_from([
            "leasedesk",
            "refresh",
            "--api-base-url",
            "https://provider.example",
            "--page-size",
            "250",
        ]);
        let Command::Refresh(args) = cli.command else {
            panic!("expected refresh");
        };
        assert_eq!(args.api_base_url, "https://provider.example");
        assert_eq!(args.page_size, 250);
        assert!(args.upstream_client().is_ok());
    }

    #[test]
    fn test_export_output_short_flag() {
        let cli = Cli::parse_from(["leasedesk", "export", "-o", "out.csv"]);
        let Command::Export(args) = cli.command else {
            panic!("expected export");
        };
        assert_eq!(args.output.unwrap().to_str(), Some("out.csv"));
        assert!(!args.desc);
    }

    #[test]
    fn test_parse_sort_arg_is_case_insensitive() {
        assert_eq!(parse_sort_arg("Brokers").unwrap(), SortKey::Brokers);
        assert!(parse_sort_arg("").is_err());
    }
}
