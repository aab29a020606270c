//! JSON report rendering

use crate::output::OutputResult;
use crate::search::{PageMatchResult, SearchReport};
use crate::state::{SearchSession, SearchState};
use serde::Serialize;

/// Serialized shape of a search outcome
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    selector: &'a str,
    state: SearchState,
    processed: usize,
    total: usize,
    scanned: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    total_matches: usize,
    results: &'a [PageMatchResult],
}

/// Formats a search session as pretty-printed JSON
pub fn format_json_report(session: &SearchSession, report: &SearchReport) -> OutputResult<String> {
    let json = JsonReport {
        selector: session.selector(),
        state: session.state(),
        processed: session.processed_count(),
        total: session.total_eligible(),
        scanned: session.eligible_count(),
        error: session.last_error(),
        total_matches: report.total_matches,
        results: &report.results,
    };

    Ok(serde_json::to_string_pretty(&json)?)
}
