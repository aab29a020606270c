//! Notifications published while a search runs

use crate::state::SearchState;
use tokio::sync::mpsc;

/// Events buffered by `event_channel` before new ones are dropped
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Sender half handed to the orchestrator
pub type EventSender = mpsc::Sender<SearchEvent>;

/// Receiver half held by whoever renders progress
pub type EventReceiver = mpsc::Receiver<SearchEvent>;

/// Creates a channel for search events with the default capacity
pub fn event_channel() -> (EventSender, EventReceiver) {
    event_channel_with_capacity(DEFAULT_EVENT_CAPACITY)
}

/// Creates a channel buffering at most `capacity` events
///
/// The orchestrator never waits on a full channel: events that do not fit
/// are dropped, so a receiver that stops reading cannot grow memory or stall
/// the search.
pub fn event_channel_with_capacity(capacity: usize) -> (EventSender, EventReceiver) {
    mpsc::channel(capacity.max(1))
}

/// Progress snapshot of a running search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchProgress {
    pub processed: usize,
    pub total: usize,
    /// `processed / total` as a rounded percentage; 100 for an empty sweep
    pub percent: u8,
}

impl SearchProgress {
    pub fn new(processed: usize, total: usize) -> Self {
        let percent = if total == 0 {
            100
        } else {
            ((processed as f64 / total as f64) * 100.0).round().min(100.0) as u8
        };

        Self {
            processed,
            total,
            percent,
        }
    }
}

/// Event emitted by the orchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    /// A run began for `selector` over `total` pages
    Started { selector: String, total: usize },

    /// One or more pages settled
    Progress(SearchProgress),

    /// The run reached a terminal state
    Finished {
        state: SearchState,
        pages_with_matches: usize,
        total_matches: usize,
    },
}
