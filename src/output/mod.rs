//! Output module for presenting search results
//!
//! This module handles:
//! - The `SearchView` seam the plugin host renders through
//! - Markdown reports of a search session
//! - JSON export of a search session

mod json;
mod markdown;
mod view;

pub use json::format_json_report;
pub use markdown::{format_markdown_report, write_markdown_report};
pub use view::{Notification, SearchView, TerminalView, ViewFormat};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
