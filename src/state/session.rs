//! Search session: the run state observed by the presentation layer
//!
//! Only the orchestrator (and the plugin host, for failures it detects before
//! a sweep starts) mutates a session; everyone else reads it through the
//! accessors.

use crate::search::{SearchProgress, SearchReport};
use crate::state::SearchState;
use crate::SearchError;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Mutable run state for one search at a time
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchSession {
    selector: String,
    state: SearchState,

    /// Pages settled so far, ineligible pages included
    processed_count: usize,

    /// Pages considered by the sweep
    total_eligible: usize,

    /// Pages that passed the eligibility filter and were fetched
    eligible_count: usize,

    results: SearchReport,
    last_error: Option<String>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl SearchSession {
    /// Creates an idle session
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    pub fn processed_count(&self) -> usize {
        self.processed_count
    }

    pub fn total_eligible(&self) -> usize {
        self.total_eligible
    }

    pub fn eligible_count(&self) -> usize {
        self.eligible_count
    }

    pub fn results(&self) -> &SearchReport {
        &self.results
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Wall-clock duration of the last finished run
    pub fn duration(&self) -> Option<chrono::Duration> {
        Some(self.finished_at? - self.started_at?)
    }

    pub fn has_results(&self) -> bool {
        self.state == SearchState::Completed && !self.results.is_empty()
    }

    pub fn progress(&self) -> SearchProgress {
        SearchProgress::new(self.processed_count, self.total_eligible)
    }

    /// Starts a new run, discarding everything from the previous one
    ///
    /// Refused while another run is in progress.
    pub(crate) fn begin(&mut self, selector: &str, total: usize) -> Result<(), SearchError> {
        if !self.state.can_transition_to(SearchState::Running) {
            return Err(SearchError::AlreadyRunning);
        }

        *self = Self {
            selector: selector.to_string(),
            state: SearchState::Running,
            total_eligible: total,
            started_at: Some(Utc::now()),
            ..Self::default()
        };

        Ok(())
    }

    /// Accounts for pages filtered out before fetching
    pub(crate) fn record_skipped(&mut self, skipped: usize, eligible: usize) {
        self.eligible_count = eligible;
        self.processed_count = (self.processed_count + skipped).min(self.total_eligible);
    }

    /// Accounts for one fetched page settling, whatever its outcome
    pub(crate) fn record_processed(&mut self) {
        if self.processed_count < self.total_eligible {
            self.processed_count += 1;
        }
    }

    /// Finishes the run successfully with `report`
    pub(crate) fn complete(&mut self, report: SearchReport) -> Result<(), SearchError> {
        if !self.state.can_transition_to(SearchState::Completed) {
            return Err(SearchError::InvalidTransition {
                from: self.state,
                to: SearchState::Completed,
            });
        }

        self.processed_count = self.total_eligible;
        self.results = report;
        self.state = SearchState::Completed;
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    /// Ends the run with an error; any partial results are discarded
    pub(crate) fn fail(&mut self, message: impl Into<String>) {
        self.processed_count = self.total_eligible;
        self.results = SearchReport::default();
        self.last_error = Some(message.into());
        self.state = SearchState::Failed;
        self.finished_at = Some(Utc::now());
    }
}
