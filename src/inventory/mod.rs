//! Crawl inventory: the pages a finished crawl visited
//!
//! The search never discovers pages itself. It works from a snapshot of
//! what the crawler recorded, supplied by an [`InventoryProvider`]:
//! - `SqliteInventory` reads a crawl database directly
//! - `StaticInventory` serves a snapshot held in memory

mod memory;
mod sqlite;
mod traits;

pub use memory::StaticInventory;
pub use sqlite::SqliteInventory;
pub use traits::{InventoryError, InventoryProvider, InventoryResult};

use serde::{Deserialize, Serialize};

/// A page the crawler visited, with the metadata it recorded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlPageRecord {
    pub url: String,
    pub status_code: u16,
    pub content_type: String,
    pub title: Option<String>,
}

impl CrawlPageRecord {
    pub fn new(url: impl Into<String>, status_code: u16, content_type: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status_code,
            content_type: content_type.into(),
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Returns true if this page can be meaningfully scanned:
    /// it answered 200 and served HTML.
    pub fn is_searchable(&self) -> bool {
        self.status_code == 200 && self.content_type.contains("text/html")
    }
}

/// A link between two crawled pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlLink {
    pub from: String,
    pub to: String,
}

/// A page the crawler recorded a problem for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlIssue {
    pub url: String,
    pub state: String,
    pub message: String,
}

/// Summary counts for the crawl
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryStats {
    /// Every page the crawler knows about, visited or not
    pub discovered: u64,

    /// Pages the crawler actually fetched
    pub crawled: u64,

    pub links: u64,
    pub issues: u64,
}

/// Full snapshot returned by an inventory provider
///
/// Only `urls` feeds the search; the rest is carried for the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub urls: Vec<CrawlPageRecord>,
    pub links: Vec<CrawlLink>,
    pub issues: Vec<CrawlIssue>,
    pub stats: InventoryStats,
}

impl Inventory {
    /// Builds an inventory from page records alone
    pub fn from_pages(urls: Vec<CrawlPageRecord>) -> Self {
        let stats = InventoryStats {
            discovered: urls.len() as u64,
            crawled: urls.len() as u64,
            ..InventoryStats::default()
        };
        Self {
            urls,
            stats,
            ..Self::default()
        }
    }

    /// Looks up a page by its URL
    pub fn page(&self, url: &str) -> Option<&CrawlPageRecord> {
        self.urls.iter().find(|page| page.url == url)
    }

    /// Number of pages a search would actually fetch
    pub fn searchable_count(&self) -> usize {
        self.urls.iter().filter(|page| page.is_searchable()).count()
    }
}
