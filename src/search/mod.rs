//! Search module: counting selector matches across crawled pages
//!
//! This module contains the search engine, including:
//! - Page content fetching (HTTP, behind the `PageFetcher` trait)
//! - Structural matching of CSS selectors against markup
//! - Batched, fault-isolated orchestration of a sweep
//! - Ranking per-page counts into a report

mod aggregator;
mod events;
mod fetcher;
mod matcher;
mod orchestrator;

pub use aggregator::{aggregate, PageMatchResult, SearchReport};
pub use events::{
    event_channel, event_channel_with_capacity, EventReceiver, EventSender, SearchEvent,
    SearchProgress, DEFAULT_EVENT_CAPACITY,
};
pub use fetcher::{build_http_client, FetchError, HttpPageFetcher, PageContent, PageFetcher};
pub use matcher::{count_matches, MatchError, ScraperDocument, StructuralDocument};
pub use orchestrator::{
    Orchestrator, PageError, SearchQuery, DEFAULT_BATCH_SIZE, INTERRUPTED_MESSAGE,
};

use crate::inventory::CrawlPageRecord;
use crate::state::SearchSession;
use crate::SearchError;

/// Runs a one-off search with the default engine and batch size
///
/// Convenience wrapper for callers that do not need to keep a session or
/// observe progress.
///
/// # Example
///
/// ```no_run
/// use sumi_lens::config::{FetcherConfig, UserAgentConfig};
/// use sumi_lens::inventory::CrawlPageRecord;
/// use sumi_lens::search::{search_pages, HttpPageFetcher};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let user_agent = UserAgentConfig {
///     crawler_name: "SumiLens".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
/// let fetcher = HttpPageFetcher::from_config(&user_agent, &FetcherConfig::default())?;
/// let pages = vec![CrawlPageRecord::new("https://example.com/", 200, "text/html")];
///
/// let report = search_pages(fetcher, "h1", &pages).await?;
/// println!("{} matches", report.total_matches);
/// # Ok(())
/// # }
/// ```
pub async fn search_pages<F: PageFetcher>(
    fetcher: F,
    selector: &str,
    pages: &[CrawlPageRecord],
) -> Result<SearchReport, SearchError> {
    let mut session = SearchSession::new();
    Orchestrator::new(fetcher)
        .run_search(&mut session, &SearchQuery::new(selector), pages)
        .await
}
