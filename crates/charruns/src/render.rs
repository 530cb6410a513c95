//! Presentation of a session: run table, empty state, status line, JSON.

use charruns_core::filter::{ViewOutcome, ViewState};
use charruns_core::runs::Run;
use charruns_core::session::{Session, SessionState};
use charruns_core::status::EMPTY_STATE_MESSAGE;
use colored::Colorize;
use serde::Serialize;

use crate::prelude::*;

#[derive(Debug, Serialize)]
pub struct ViewOutput<'a> {
    pub document: Option<&'a str>,
    pub filter: &'a str,
    pub status: String,
    pub total_count: usize,
    pub displayed_count: usize,
    pub outcome: Option<ViewOutcome>,
    pub rows: Vec<&'a Run>,
}

impl<'a> ViewOutput<'a> {
    pub fn from_session(session: &'a Session) -> Self {
        let view = session.view();
        ViewOutput {
            document: session.document(),
            filter: session.filter().trim(),
            status: session.status_line(),
            total_count: view.as_ref().map_or(0, |v| v.total_count),
            displayed_count: view.as_ref().map_or(0, |v| v.displayed_count),
            outcome: view.as_ref().map(|v| v.outcome),
            rows: view.map(|v| v.rows).unwrap_or_default(),
        }
    }
}

/// Make control characters visible; a run of newlines would otherwise
/// break the table layout.
pub fn display_text(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_control() {
                c.escape_default().to_string()
            } else {
                c.to_string()
            }
        })
        .collect()
}

/// Two-column table of the view's rows.
pub fn format_table(view: &ViewState<'_>) -> String {
    let mut table = new_table();
    table.set_titles(prettytable::row!["Run", "Length"]);
    for run in &view.rows {
        table.add_row(prettytable::row![display_text(run.text()), r->run.length()]);
    }
    table.to_string()
}

fn format_status(session: &Session) -> String {
    let status = session.status_line();
    match session.state() {
        SessionState::Failed { .. } => status.red().bold().to_string(),
        SessionState::Ready => status.bright_cyan().to_string(),
        _ => status.yellow().to_string(),
    }
}

/// The table (or empty-state message) followed by the status line.
pub fn format_session(session: &Session) -> String {
    let mut result = String::new();

    if let Some(document) = session.document() {
        result.push_str(&f!("{}\n", document.bold()));
    }

    match session.view() {
        Some(view) if view.outcome == ViewOutcome::NoMatches => {
            result.push_str(&f!("\n{}\n", EMPTY_STATE_MESSAGE.yellow()));
        }
        Some(view) => {
            result.push('\n');
            result.push_str(&format_table(&view));
        }
        None => {}
    }

    result.push_str(&f!("\n{}\n", format_status(session)));
    result
}

pub fn format_json(session: &Session) -> Result<String> {
    serde_json::to_string_pretty(&ViewOutput::from_session(session))
        .map_err(|e| eyre!("JSON serialization failed: {}", e))
}
