//! leasedesk - caching proxy and table browser for property listings
//!
//! `serve` runs the proxy, `refresh` fetches once and persists, `browse` is a
//! terminal table over a running proxy and `export` writes that table as CSV.

mod app;
mod ui;

use std::error::Error;
use std::io::{self, Write};
use std::panic;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};

use leasedesk::api::{self, AppState as ApiState};
use leasedesk::cache::SnapshotStore;
use leasedesk::cli::{Cli, CliError, ClientArgs, Command, ExportArgs, ServeArgs, UpstreamArgs};
use leasedesk::client::ProxyClient;
use leasedesk::data::ListingsProvider;
use leasedesk::logging;
use leasedesk::refresh::{Fallback, RefreshConfig, RefreshScheduler};
use leasedesk::view::to_csv;

use app::{App, AppState};

/// Log file of the terminal browser, inside the cache directory
const BROWSE_LOG_FILE: &str = "browse.log";

/// Sets up a panic hook that restores the terminal before printing the panic message.
/// This ensures the terminal is usable even if the application panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        // Call the original panic hook
        original_hook(panic_info);
    }));
}

/// Renders the UI based on the current application state
fn render_ui(frame: &mut ratatui::Frame, app: &App) {
    match app.state {
        AppState::Loading => {
            render_loading(frame);
        }
        AppState::Table => {
            ui::render_listing_table(frame, app);
        }
    }

    if app.show_help {
        ui::render_help_overlay(frame);
    }
}

/// Renders a loading message while data is being fetched
fn render_loading(frame: &mut ratatui::Frame) {
    use ratatui::{
        layout::{Alignment, Constraint, Direction, Layout},
        style::{Color, Style},
        widgets::Paragraph,
    };

    let area = frame.area();

    // Center the loading message vertically
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(3),
            Constraint::Percentage(45),
        ])
        .split(area);

    let loading_text = Paragraph::new("Loading listings...")
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center);

    frame.render_widget(loading_text, chunks[1]);
}

/// Resolves on Ctrl+C
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

async fn serve(args: ServeArgs) -> Result<(), Box<dyn Error>> {
    logging::init_stderr();

    let addr = args.socket_addr()?;
    let store = args.upstream.snapshot_store()?;
    let provider: Arc<dyn ListingsProvider> = Arc::new(args.upstream.upstream_client()?);
    info!(path = %store.path().display(), "snapshot location");

    let scheduler = Arc::new(RefreshScheduler::new(
        provider,
        store,
        args.refresh_config(),
    ));

    // Boot in the background so the API answers while the first fetch runs
    let booting = Arc::clone(&scheduler);
    let boot = tokio::spawn(async move {
        let report = booting.boot().await;
        info!(source = ?report.source, count = report.count, "boot complete");
        booting.spawn_interval()
    });

    let state = Arc::new(ApiState::new(scheduler));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Ok(timer) = boot.await {
        timer.shutdown().await;
    }
    Ok(())
}

async fn refresh_once(args: UpstreamArgs) -> Result<(), Box<dyn Error>> {
    logging::init_stderr();

    let provider: Arc<dyn ListingsProvider> = Arc::new(args.upstream_client()?);
    let config = RefreshConfig {
        enabled: false,
        ..Default::default()
    };
    let scheduler = RefreshScheduler::new(provider, args.snapshot_store()?, config);

    let report = scheduler.refresh().await;
    if report.source != Fallback::Upstream {
        return Err(CliError::RefreshFailed(report.count).into());
    }

    println!("Refreshed {} listings", report.count);
    Ok(())
}

async fn export(args: ExportArgs) -> Result<(), Box<dyn Error>> {
    logging::init_stderr();

    let state = args.filter_state()?;
    let client = ProxyClient::new(&args.client.server);
    let views = client.load_table_data().await.views();
    let csv = to_csv(state.apply(&views));

    match &args.output {
        Some(path) => {
            std::fs::write(path, csv)?;
            info!(path = %path.display(), "exported listings");
        }
        None => io::stdout().write_all(csv.as_bytes())?,
    }
    Ok(())
}

async fn browse(args: ClientArgs) -> Result<(), Box<dyn Error>> {
    if let Some(store) = SnapshotStore::new() {
        logging::init_file(&store.cache_dir().join(BROWSE_LOG_FILE))?;
    }

    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(ProxyClient::new(&args.server));

    // Initial render to show loading state
    terminal.draw(|f| render_ui(f, &app))?;

    app.load_all_data().await;

    // Main event loop
    loop {
        terminal.draw(|f| render_ui(f, &app))?;

        // Poll for keyboard events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }

        if app.refresh_requested {
            app.refresh().await;
        }

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Serve(args) => serve(args).await,
        Command::Refresh(args) => refresh_once(args).await,
        Command::Export(args) => export(args).await,
        Command::Browse(args) => browse(args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
