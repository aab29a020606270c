//! Markdown report generation
//!
//! Renders a search session and its ranked results as a markdown document
//! with a summary section and a results table.

use crate::output::OutputResult;
use crate::search::SearchReport;
use crate::state::{SearchSession, SearchState};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown report for `session` to `output_path`
///
/// # Arguments
///
/// * `session` - The session whose outcome is reported
/// * `report` - Results to list (normally `session.results()`, possibly refreshed)
/// * `output_path` - Path where the markdown file should be written
pub fn write_markdown_report(
    session: &SearchSession,
    report: &SearchReport,
    output_path: &Path,
) -> OutputResult<()> {
    let markdown = format_markdown_report(session, report);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a search session as markdown
pub fn format_markdown_report(session: &SearchSession, report: &SearchReport) -> String {
    let mut md = String::new();

    md.push_str("# Sumi-Lens Search Report\n\n");

    if session.state() == SearchState::Idle {
        md.push_str("No search has been run yet.\n");
        return md;
    }

    md.push_str("## Search\n\n");
    md.push_str(&format!("- **Selector**: `{}`\n", session.selector()));
    md.push_str(&format!("- **Status**: {}\n", session.state()));
    if let Some(started) = session.started_at() {
        md.push_str(&format!("- **Started**: {}\n", started.to_rfc3339()));
    }
    if let Some(duration) = session.duration() {
        md.push_str(&format!(
            "- **Duration**: {:.2} seconds\n",
            duration.num_milliseconds() as f64 / 1000.0
        ));
    }
    md.push_str(&format!(
        "- **Pages processed**: {} / {} ({}%)\n",
        session.processed_count(),
        session.total_eligible(),
        session.progress().percent
    ));
    md.push_str(&format!(
        "- **Pages scanned**: {}\n\n",
        session.eligible_count()
    ));

    match session.state() {
        SearchState::Failed => {
            md.push_str("## Error\n\n");
            md.push_str(session.last_error().unwrap_or("Search failed"));
            md.push('\n');
        }
        SearchState::Running => {
            md.push_str("Search in progress.\n");
        }
        _ => {
            md.push_str("## Results\n\n");
            md.push_str(&format!(
                "- **Pages with matches**: {}\n",
                report.pages_with_matches()
            ));
            md.push_str(&format!("- **Total matches**: {}\n\n", report.total_matches));

            if report.is_empty() {
                md.push_str("No elements matched this selector.\n");
            } else {
                md.push_str("| # | Page | Title | Status | Matches |\n");
                md.push_str("|---|------|-------|--------|---------|\n");
                for (rank, row) in report.results.iter().enumerate() {
                    md.push_str(&format!(
                        "| {} | {} | {} | {} | {} |\n",
                        rank + 1,
                        escape_cell(&row.url),
                        escape_cell(row.title.as_deref().unwrap_or("-")),
                        row.status_code,
                        row.count
                    ));
                }
            }
        }
    }

    md
}

/// Keeps table cells on one line and out of the column syntax
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\n', '\r'], " ")
}
