//! Filtering of a ranked dataset into a displayable view
//!
//! A filter expression is a plain literal. A run is shown when its character
//! equals the expression or its text contains the expression.

use serde::Serialize;

use crate::aggregate::MasterDataset;
use crate::runs::Run;

/// How a [`ViewState`] came to hold its rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewOutcome {
    /// No filter was applied and the dataset has rows.
    Unfiltered,
    /// A filter was applied and at least one row matched.
    Matched,
    /// Nothing to show: the filter matched no row, or the dataset is empty.
    NoMatches,
}

/// The rows to display plus the counts for the status line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewState<'a> {
    pub rows: Vec<&'a Run>,
    pub total_count: usize,
    pub displayed_count: usize,
    pub outcome: ViewOutcome,
}

impl ViewState<'_> {
    pub fn is_empty(&self) -> bool {
        self.outcome == ViewOutcome::NoMatches
    }
}

/// Whether a single run passes the (already trimmed, non-empty) expression.
pub fn matches(run: &Run, expr: &str) -> bool {
    let mut chars = expr.chars();
    let single_char_hit = chars.next() == Some(run.character()) && chars.next().is_none();
    single_char_hit || run.text().contains(expr)
}

/// Compute the view of `dataset` under the filter expression `expr`.
///
/// Leading and trailing whitespace in `expr` is ignored; an expression that
/// is empty after trimming shows every row.
pub fn filter<'a>(dataset: &'a MasterDataset, expr: &str) -> ViewState<'a> {
    let expr = expr.trim();
    let total_count = dataset.len();

    let (rows, outcome): (Vec<&Run>, _) = if expr.is_empty() {
        (dataset.iter().collect(), ViewOutcome::Unfiltered)
    } else {
        (
            dataset.iter().filter(|run| matches(run, expr)).collect(),
            ViewOutcome::Matched,
        )
    };

    let outcome = if rows.is_empty() {
        ViewOutcome::NoMatches
    } else {
        outcome
    };

    ViewState {
        displayed_count: rows.len(),
        rows,
        total_count,
        outcome,
    }
}
