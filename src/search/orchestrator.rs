//! Search orchestrator - drives a selector sweep over crawled pages
//!
//! This module contains the run loop that coordinates a search:
//! - Validating the query and claiming the session
//! - Filtering the inventory down to searchable pages
//! - Fetching and matching pages in sequential, bounded batches
//! - Isolating per-page failures and aborting on selector errors
//! - Publishing progress and handing counts to the aggregator

use crate::inventory::CrawlPageRecord;
use crate::search::aggregator::{aggregate, PageMatchResult, SearchReport};
use crate::search::events::{EventSender, SearchEvent};
use crate::search::fetcher::PageFetcher;
use crate::search::matcher::{MatchError, ScraperDocument, StructuralDocument};
use crate::state::SearchSession;
use crate::SearchError;
use futures::stream::{FuturesUnordered, StreamExt};
use std::ops::{Deref, DerefMut};
use std::panic::{catch_unwind, AssertUnwindSafe};
use thiserror::Error;
use tokio::sync::mpsc::error::TrySendError;

/// Pages fetched concurrently when no batch size is configured
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Error recorded when a run is dropped before it settles
pub const INTERRUPTED_MESSAGE: &str = "Search was interrupted";

/// A structural query as entered by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub selector: String,
}

impl SearchQuery {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
        }
    }

    /// Returns the trimmed selector, rejecting blank input
    pub fn validate(&self) -> Result<&str, SearchError> {
        let selector = self.selector.trim();
        if selector.is_empty() {
            return Err(SearchError::Validation(
                "Please enter a CSS selector".to_string(),
            ));
        }
        Ok(selector)
    }
}

/// Why a single page produced no result
///
/// Only `Selector` is fatal to the run; every other variant is absorbed.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("No content returned for {url}")]
    Unavailable { url: String },

    #[error("Matching failed for {url}: {message}")]
    Match { url: String, message: String },

    #[error(transparent)]
    Selector(#[from] MatchError),
}

/// Runs selector searches over crawled pages
///
/// The orchestrator owns the fetcher and the query engine; the session it
/// writes to is passed into each run.
pub struct Orchestrator<F, D = ScraperDocument> {
    fetcher: F,
    matcher: D,
    batch_size: usize,
    events: Option<EventSender>,
}

impl<F: PageFetcher> Orchestrator<F> {
    /// Creates an orchestrator using the default `scraper` engine
    pub fn new(fetcher: F) -> Self {
        Self::with_matcher(fetcher, ScraperDocument)
    }
}

impl<F: PageFetcher, D: StructuralDocument> Orchestrator<F, D> {
    pub fn with_matcher(fetcher: F, matcher: D) -> Self {
        Self {
            fetcher,
            matcher,
            batch_size: DEFAULT_BATCH_SIZE,
            events: None,
        }
    }

    /// Sets how many pages are fetched concurrently (minimum 1)
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Publishes run events on `events`
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Runs a search over `pages`, recording progress in `session`
    ///
    /// # Flow
    ///
    /// 1. Reject a blank selector (session untouched)
    /// 2. Claim the session; refused while it is already running
    /// 3. Compile the selector; a syntax error fails the run before any fetch
    /// 4. Count non-200 / non-HTML pages as processed without fetching them
    /// 5. Fetch and match the rest in batches of `batch_size`; a batch only
    ///    starts once every page of the previous one has settled
    /// 6. Aggregate pages with at least one match
    ///
    /// Dropping the returned future before it resolves drops the in-flight
    /// fetches and leaves the session `Failed`, so the next run can start.
    ///
    /// # Returns
    ///
    /// * `Ok(SearchReport)` - The run completed; the report is also stored in the session
    /// * `Err(SearchError)` - The query was rejected, or the run failed
    pub async fn run_search(
        &self,
        session: &mut SearchSession,
        query: &SearchQuery,
        pages: &[CrawlPageRecord],
    ) -> Result<SearchReport, SearchError> {
        let selector = query.validate()?;
        session.begin(selector, pages.len())?;
        let mut session = RunGuard { session };

        tracing::debug!(
            "Searching {} pages for '{}' (batch size {})",
            pages.len(),
            selector,
            self.batch_size
        );
        self.emit(SearchEvent::Started {
            selector: selector.to_string(),
            total: pages.len(),
        });

        let outcome = match self.matcher.compile(selector) {
            Ok(compiled) => match self.sweep(&mut session, &compiled, pages).await {
                Ok(matches) => {
                    let report = aggregate(matches);
                    session.complete(report.clone()).map(|()| report)
                }
                Err(err) => Err(err),
            },
            Err(err) => Err(SearchError::SelectorSyntax(err)),
        };

        match &outcome {
            Ok(report) => tracing::debug!(
                "Search for '{}' complete: {} matches on {} pages",
                selector,
                report.total_matches,
                report.pages_with_matches()
            ),
            Err(err) => {
                tracing::error!("Search for '{}' failed: {}", selector, err);
                session.fail(err.to_string());
            }
        }

        self.emit(SearchEvent::Finished {
            state: session.state(),
            pages_with_matches: session.results().pages_with_matches(),
            total_matches: session.results().total_matches,
        });

        outcome
    }

    /// Fetches and matches every eligible page, returning non-zero counts in
    /// inventory order
    async fn sweep(
        &self,
        session: &mut SearchSession,
        query: &D::Query,
        pages: &[CrawlPageRecord],
    ) -> Result<Vec<PageMatchResult>, SearchError> {
        let eligible: Vec<(usize, &CrawlPageRecord)> = pages
            .iter()
            .enumerate()
            .filter(|(_, page)| page.is_searchable())
            .collect();

        let skipped = pages.len() - eligible.len();
        session.record_skipped(skipped, eligible.len());
        if skipped > 0 {
            tracing::debug!("Skipping {} non-HTML or non-200 pages", skipped);
            self.publish_progress(session);
        }

        let mut matches: Vec<(usize, PageMatchResult)> = Vec::new();

        for (batch_number, batch) in eligible.chunks(self.batch_size).enumerate() {
            tracing::debug!(
                "Starting batch {} ({} pages)",
                batch_number + 1,
                batch.len()
            );

            let mut in_flight: FuturesUnordered<_> = batch
                .iter()
                .map(|&(position, page)| async move {
                    (position, page, self.scan_page(page, query).await)
                })
                .collect();

            while let Some((position, page, outcome)) = in_flight.next().await {
                match outcome {
                    Ok(0) => tracing::debug!("No matches on {}", page.url),
                    Ok(count) => {
                        tracing::debug!("{} matches on {}", count, page.url);
                        matches.push((position, PageMatchResult::from_page(page, count)));
                    }
                    Err(PageError::Selector(err)) => {
                        // Remaining pages of the batch are dropped with `in_flight`
                        return Err(SearchError::SelectorSyntax(err));
                    }
                    Err(err) => tracing::warn!("Skipping page: {}", err),
                }

                session.record_processed();
                self.publish_progress(session);
            }
        }

        matches.sort_by_key(|(position, _)| *position);
        Ok(matches.into_iter().map(|(_, result)| result).collect())
    }

    /// Fetches one page and counts selector matches in it
    async fn scan_page(&self, page: &CrawlPageRecord, query: &D::Query) -> Result<usize, PageError> {
        let content = self
            .fetcher
            .fetch(&page.url)
            .await
            .map_err(|e| PageError::Fetch {
                url: page.url.clone(),
                message: e.to_string(),
            })?;

        let markup = content.into_markup().ok_or_else(|| PageError::Unavailable {
            url: page.url.clone(),
        })?;

        match catch_unwind(AssertUnwindSafe(|| {
            self.matcher.count_matches(&markup, query)
        })) {
            Ok(counted) => Ok(counted?),
            Err(panic) => Err(PageError::Match {
                url: page.url.clone(),
                message: panic_message(panic.as_ref()),
            }),
        }
    }

    fn publish_progress(&self, session: &SearchSession) {
        let progress = session.progress();
        tracing::trace!(
            "Progress: {}/{} ({}%)",
            progress.processed,
            progress.total,
            progress.percent
        );
        self.emit(SearchEvent::Progress(progress));
    }

    fn emit(&self, event: SearchEvent) {
        let Some(events) = &self.events else {
            return;
        };

        match events.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                tracing::debug!("Search event dropped, receiver is behind: {:?}", event);
            }
            // A dropped receiver only means nobody is watching
            Err(TrySendError::Closed(_)) => {}
        }
    }
}

/// Exclusive hold on a session claimed by `run_search`
///
/// A session still `Running` when the guard goes away belongs to a run that
/// never settled; it is failed on the spot.
struct RunGuard<'a> {
    session: &'a mut SearchSession,
}

impl Deref for RunGuard<'_> {
    type Target = SearchSession;

    fn deref(&self) -> &SearchSession {
        self.session
    }
}

impl DerefMut for RunGuard<'_> {
    fn deref_mut(&mut self) -> &mut SearchSession {
        self.session
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if self.session.state().is_running() {
            tracing::warn!("Search for '{}' was interrupted", self.session.selector());
            self.session.fail(INTERRUPTED_MESSAGE);
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "matcher panicked".to_string()
    }
}
