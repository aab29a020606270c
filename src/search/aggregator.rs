//! Result aggregation: ranking per-page counts into a report

use crate::inventory::CrawlPageRecord;
use serde::Serialize;
use std::collections::HashMap;

/// Match count for a single page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMatchResult {
    pub url: String,
    pub title: Option<String>,
    pub count: usize,
    pub status_code: u16,
}

impl PageMatchResult {
    pub fn from_page(page: &CrawlPageRecord, count: usize) -> Self {
        Self {
            url: page.url.clone(),
            title: page.title.clone(),
            count,
            status_code: page.status_code,
        }
    }
}

/// Ranked search results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchReport {
    /// Pages with at least one match, most matches first
    pub results: Vec<PageMatchResult>,

    /// Sum of `count` over `results`
    pub total_matches: usize,
}

impl SearchReport {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn pages_with_matches(&self) -> usize {
        self.results.len()
    }

    /// Returns a copy with titles and status codes taken from `pages`
    ///
    /// Rows whose URL is no longer in `pages` keep their recorded metadata.
    /// Counts and ordering are unchanged.
    pub fn refresh_metadata(&self, pages: &[CrawlPageRecord]) -> SearchReport {
        let latest: HashMap<&str, &CrawlPageRecord> =
            pages.iter().map(|page| (page.url.as_str(), page)).collect();

        let results = self
            .results
            .iter()
            .map(|row| match latest.get(row.url.as_str()) {
                Some(page) => PageMatchResult {
                    title: page.title.clone(),
                    status_code: page.status_code,
                    ..row.clone()
                },
                None => row.clone(),
            })
            .collect();

        SearchReport {
            results,
            total_matches: self.total_matches,
        }
    }
}

/// Builds a report from per-page counts given in inventory order
///
/// Entries with a zero count are dropped. The sort is stable, so pages with
/// equal counts keep the order they were given in.
pub fn aggregate(matches: Vec<PageMatchResult>) -> SearchReport {
    let mut results: Vec<PageMatchResult> =
        matches.into_iter().filter(|m| m.count > 0).collect();
    results.sort_by(|a, b| b.count.cmp(&a.count));

    let total_matches = results.iter().map(|m| m.count).sum();

    SearchReport {
        results,
        total_matches,
    }
}
