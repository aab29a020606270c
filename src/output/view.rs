//! Presentation seam for the search panel
//!
//! The plugin host drives a `SearchView`: it pushes notifications after each
//! search and asks the view to render the session whenever it changes.

use crate::inventory::Inventory;
use crate::output::json::format_json_report;
use crate::output::markdown::format_markdown_report;
use crate::search::SearchReport;
use crate::state::SearchSession;
use crate::SearchError;
use std::fmt;
use std::io::{self, Write};

/// User-facing message shown after a search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success(String),
    Info(String),
    Error(String),
}

impl Notification {
    /// Picks the notification for a finished search
    pub fn for_outcome(selector: &str, outcome: &Result<SearchReport, SearchError>) -> Self {
        match outcome {
            Ok(report) if report.is_empty() => {
                Self::Info(format!("No elements found matching '{}'", selector.trim()))
            }
            Ok(report) => Self::Success(format!(
                "Found {} matching elements on {} pages",
                report.total_matches,
                report.pages_with_matches()
            )),
            Err(err) => Self::Error(err.to_string()),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Success(message) | Self::Info(message) | Self::Error(message) => message,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self {
            Self::Success(_) => "✓",
            Self::Info(_) => "ℹ",
            Self::Error(_) => "✗",
        };
        write!(f, "{} {}", marker, self.message())
    }
}

/// Something that can show the search panel
pub trait SearchView {
    /// Shows a one-off message to the user
    fn notify(&mut self, notification: &Notification);

    /// Renders the session with `report` as its result table
    fn render(&mut self, session: &SearchSession, report: &SearchReport, inventory: &Inventory);
}

/// Output format of the terminal view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewFormat {
    #[default]
    Markdown,
    Json,
}

/// Renders the search panel on a terminal
///
/// The finished report goes to `out`. Status lines (readiness, success and
/// info notifications) share `out` in markdown mode but move to `err` in JSON
/// mode, so the JSON output can be piped as-is. Errors always go to `err`.
#[derive(Debug)]
pub struct TerminalView<O = io::Stdout, E = io::Stderr> {
    format: ViewFormat,
    out: O,
    err: E,
}

impl TerminalView {
    /// Creates a view writing to stdout and stderr
    pub fn new(format: ViewFormat) -> Self {
        Self::with_writers(format, io::stdout(), io::stderr())
    }
}

impl<O: Write, E: Write> TerminalView<O, E> {
    pub fn with_writers(format: ViewFormat, out: O, err: E) -> Self {
        Self { format, out, err }
    }

    /// Returns the underlying writers
    pub fn into_writers(self) -> (O, E) {
        (self.out, self.err)
    }

    fn status_line(&mut self, line: &str) {
        let written = match self.format {
            ViewFormat::Markdown => writeln!(self.out, "{}", line),
            ViewFormat::Json => writeln!(self.err, "{}", line),
        };
        if let Err(e) = written {
            tracing::warn!("Failed to write to terminal: {}", e);
        }
    }
}

impl<O: Write, E: Write> SearchView for TerminalView<O, E> {
    fn notify(&mut self, notification: &Notification) {
        if notification.is_error() {
            if let Err(e) = writeln!(self.err, "{}", notification) {
                tracing::warn!("Failed to write to terminal: {}", e);
            }
        } else {
            self.status_line(&notification.to_string());
        }
    }

    fn render(&mut self, session: &SearchSession, report: &SearchReport, inventory: &Inventory) {
        if !session.state().is_terminal() {
            self.status_line(&format!(
                "Ready to search {} of {} crawled pages",
                inventory.searchable_count(),
                inventory.urls.len()
            ));
            return;
        }

        let written = match self.format {
            ViewFormat::Markdown => write!(self.out, "{}", format_markdown_report(session, report)),
            ViewFormat::Json => match format_json_report(session, report) {
                Ok(json) => writeln!(self.out, "{}", json),
                Err(e) => {
                    tracing::error!("Failed to render JSON report: {}", e);
                    Ok(())
                }
            },
        };
        if let Err(e) = written {
            tracing::warn!("Failed to write to terminal: {}", e);
        }
    }
}
