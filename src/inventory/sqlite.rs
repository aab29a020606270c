//! SQLite inventory provider
//!
//! Reads the page list out of a crawl database. Only the `pages` and `links`
//! tables of the crawl schema are consulted, and the database is opened
//! read-only so a running crawler is never disturbed.

use crate::inventory::traits::{InventoryError, InventoryProvider, InventoryResult};
use crate::inventory::{CrawlIssue, CrawlLink, CrawlPageRecord, Inventory, InventoryStats};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;

/// Inventory provider reading a crawl database
pub struct SqliteInventory {
    conn: Connection,
}

impl SqliteInventory {
    /// Opens an existing crawl database for reading
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file written by the crawler
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteInventory)` - Database opened
    /// * `Err(InventoryError)` - File missing or not a readable database
    pub fn open(path: &Path) -> InventoryResult<Self> {
        if !path.exists() {
            return Err(InventoryError::MissingDatabase(path.display().to_string()));
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        Ok(Self { conn })
    }

    /// Wraps an already-open connection
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Visited pages in discovery order
    fn load_pages(&self) -> InventoryResult<Vec<CrawlPageRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT url, status_code, content_type, title FROM pages
             WHERE status_code IS NOT NULL
             ORDER BY id ASC",
        )?;

        let pages = stmt
            .query_map([], |row| {
                let status_code: i64 = row.get(1)?;
                let content_type: Option<String> = row.get(2)?;
                Ok(CrawlPageRecord {
                    url: row.get(0)?,
                    status_code: u16::try_from(status_code).unwrap_or(0),
                    content_type: content_type.unwrap_or_default(),
                    title: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(pages)
    }

    fn load_links(&self) -> InventoryResult<Vec<CrawlLink>> {
        let mut stmt = self.conn.prepare(
            "SELECT f.url, t.url FROM links l
             JOIN pages f ON f.id = l.from_page_id
             JOIN pages t ON t.id = l.to_page_id
             ORDER BY l.id ASC",
        )?;

        let links = stmt
            .query_map([], |row| {
                Ok(CrawlLink {
                    from: row.get(0)?,
                    to: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(links)
    }

    fn load_issues(&self) -> InventoryResult<Vec<CrawlIssue>> {
        let mut stmt = self.conn.prepare(
            "SELECT url, state, error_message FROM pages
             WHERE error_message IS NOT NULL
             ORDER BY id ASC",
        )?;

        let issues = stmt
            .query_map([], |row| {
                Ok(CrawlIssue {
                    url: row.get(0)?,
                    state: row.get(1)?,
                    message: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(issues)
    }

    fn count_discovered(&self) -> InventoryResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

impl InventoryProvider for SqliteInventory {
    fn load_inventory(&self) -> InventoryResult<Inventory> {
        let urls = self.load_pages()?;
        let links = self.load_links()?;
        let issues = self.load_issues()?;

        let stats = InventoryStats {
            discovered: self.count_discovered()?,
            crawled: urls.len() as u64,
            links: links.len() as u64,
            issues: issues.len() as u64,
        };

        tracing::debug!(
            "Loaded inventory: {} crawled of {} discovered pages, {} links, {} issues",
            stats.crawled,
            stats.discovered,
            stats.links,
            stats.issues
        );

        Ok(Inventory {
            urls,
            links,
            issues,
            stats,
        })
    }
}
