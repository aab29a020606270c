//! Sumi-Lens main entry point
//!
//! This is the command-line interface for the Sumi-Lens crawl search.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use sumi_lens::config::load_config;
use sumi_lens::inventory::SqliteInventory;
use sumi_lens::output::{write_markdown_report, TerminalView, ViewFormat};
use sumi_lens::search::{event_channel, EventReceiver, HttpPageFetcher, SearchEvent};
use sumi_lens::{Orchestrator, SearchPlugin};
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

/// Sumi-Lens: structural search over a completed crawl
///
/// Sumi-Lens re-fetches every HTML page recorded in a Sumi crawl database,
/// counts the elements matching a CSS selector on each page, and ranks the
/// pages by match count.
#[derive(Parser, Debug)]
#[command(name = "sumi-lens")]
#[command(version = "1.0.0")]
#[command(about = "Cross-page structural search over a completed crawl", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// CSS selector to search for (e.g. "article h2", "img:not([alt])")
    #[arg(value_name = "SELECTOR")]
    selector: String,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Print the result as JSON instead of markdown
    #[arg(long)]
    json: bool,

    /// Also write a markdown report to this path (overrides the config)
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    let database_path = Path::new(&config.inventory.database_path);
    let inventory = SqliteInventory::open(database_path)
        .with_context(|| format!("Failed to open crawl database {}", database_path.display()))?;

    let fetcher = HttpPageFetcher::from_config(&config.user_agent, &config.fetcher)
        .context("Failed to build HTTP client")?;

    let (events, receiver) = event_channel();
    let progress = spawn_progress_logger(receiver);

    let orchestrator = Orchestrator::new(fetcher)
        .with_batch_size(config.search.batch_size)
        .with_events(events);
    let mut plugin = SearchPlugin::new(orchestrator, Box::new(inventory));

    let format = if cli.json {
        ViewFormat::Json
    } else {
        ViewFormat::Markdown
    };
    let mut view = TerminalView::new(format);

    plugin.on_load();
    plugin.on_activate(&mut view, None)?;

    let outcome = plugin.search(&mut view, &cli.selector).await;

    let report_path = cli
        .report
        .or_else(|| config.output.report_path.as_ref().map(PathBuf::from));
    if let (Some(path), Some(session)) = (report_path, plugin.session()) {
        let report = match plugin.inventory() {
            Some(inventory) => session.results().refresh_metadata(&inventory.urls),
            None => session.results().clone(),
        };
        write_markdown_report(session, &report, &path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        tracing::info!("Report written to: {}", path.display());
    }

    plugin.on_deactivate();

    // Closes the event channel so the logger task can finish
    drop(plugin);
    if let Err(e) = progress.await {
        tracing::warn!("Progress logger stopped unexpectedly: {}", e);
    }

    outcome?;
    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_lens=info,warn"),
            1 => EnvFilter::new("sumi_lens=debug,info"),
            2 => EnvFilter::new("sumi_lens=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Logs search events until the orchestrator goes away
fn spawn_progress_logger(mut receiver: EventReceiver) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = receiver.recv().await {
            match event {
                SearchEvent::Started { selector, total } => {
                    tracing::info!("Searching {} pages for '{}'", total, selector);
                }
                SearchEvent::Progress(progress) => {
                    tracing::info!(
                        "Progress: {} / {} ({}%)",
                        progress.processed,
                        progress.total,
                        progress.percent
                    );
                }
                SearchEvent::Finished {
                    state,
                    pages_with_matches,
                    total_matches,
                } => {
                    tracing::info!(
                        "Search {}: {} matches on {} pages",
                        state,
                        total_matches,
                        pages_with_matches
                    );
                }
            }
        }
    })
}
