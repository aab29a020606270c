//! Inventory provider trait and error types

use crate::inventory::Inventory;
use thiserror::Error;

/// Errors that can occur while loading the crawl inventory
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Crawl database not found: {0}")]
    MissingDatabase(String),

    #[error("Inventory unavailable: {0}")]
    Unavailable(String),
}

/// Result type for inventory operations
pub type InventoryResult<T> = Result<T, InventoryError>;

/// Source of the crawled page list
///
/// Providers return a fresh snapshot on every call; callers never mutate
/// what they receive back into the provider.
pub trait InventoryProvider {
    /// Loads the current crawl inventory
    fn load_inventory(&self) -> InventoryResult<Inventory>;
}

impl<T: InventoryProvider + ?Sized> InventoryProvider for Box<T> {
    fn load_inventory(&self) -> InventoryResult<Inventory> {
        (**self).load_inventory()
    }
}
