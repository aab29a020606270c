//! Sumi-Lens: cross-page structural search over a completed crawl
//!
//! This crate re-fetches the pages a crawl already mapped and counts how many
//! elements on each page match a CSS selector, then ranks the pages by that
//! count. Pages are scanned in small concurrent batches and a failing page
//! never stops the sweep.

pub mod config;
pub mod inventory;
pub mod output;
pub mod plugin;
pub mod search;
pub mod state;

use thiserror::Error;

/// Main error type for Sumi-Lens operations
#[derive(Debug, Error)]
pub enum LensError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Inventory error: {0}")]
    Inventory(#[from] inventory::InventoryError),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors that end a search as a whole
///
/// Messages are shown to the user as-is, so they carry no prefix.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("{0}")]
    Validation(String),

    #[error("A search is already running")]
    AlreadyRunning,

    #[error("{0}")]
    SelectorSyntax(#[from] search::MatchError),

    #[error("Unexpected error: {0}")]
    Unexpected(String),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::SearchState,
        to: state::SearchState,
    },
}

/// Result type alias for Sumi-Lens operations
pub type Result<T> = std::result::Result<T, LensError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use inventory::{CrawlPageRecord, Inventory};
pub use plugin::SearchPlugin;
pub use search::{Orchestrator, SearchQuery, SearchReport};
pub use state::{SearchSession, SearchState};
