/// Run state of a search session
///
/// This module defines the states a session moves through for each query.
use serde::Serialize;
use std::fmt;

/// Represents where a search session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchState {
    /// No search has run yet
    Idle,

    /// A search is sweeping pages
    Running,

    /// The last search finished and its results are available
    Completed,

    /// The last search was aborted with an error
    Failed,
}

impl SearchState {
    /// Returns true if the session is not running a query
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Checks whether a session in this state may move to `next`
    ///
    /// A new search may start from any state except `Running`; a running
    /// search may only end. Any state may fail.
    pub fn can_transition_to(&self, next: SearchState) -> bool {
        match next {
            Self::Running => !self.is_running(),
            Self::Completed => self.is_running(),
            Self::Failed => true,
            Self::Idle => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl Default for SearchState {
    fn default() -> Self {
        Self::Idle
    }
}

impl fmt::Display for SearchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
