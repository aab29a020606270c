//! State module for tracking search runs
//!
//! # Components
//!
//! - `SearchState`: Where a session is in its lifecycle (idle, running, completed, failed)
//! - `SearchSession`: Progress, results and last error of the current search

mod search_state;
mod session;

// Re-export main types
pub use search_state::SearchState;
pub use session::SearchSession;
