//! Status line and empty-state text

use crate::filter::ViewState;
use crate::session::SessionState;

/// Shown in place of the table when a view has no rows.
pub const EMPTY_STATE_MESSAGE: &str = "No matching runs found.";

/// Shown before any document has been submitted.
pub const AWAITING_DOCUMENT: &str = "Awaiting document";

/// `"<displayed> of <total> shown"`.
pub fn format_counts(displayed_count: usize, total_count: usize) -> String {
    format!("{displayed_count} of {total_count} shown")
}

/// Status line for a session in `state`, given its current view if any.
///
/// Counts come only from a view. A ready document with zero runs still has
/// one and reads `"0 of 0 shown"`; with no view at all there is nothing to
/// count yet, so the line asks for a document.
pub fn status_line(state: &SessionState, view: Option<&ViewState<'_>>) -> String {
    match (state, view) {
        (SessionState::Processing { document }, _) => format!("Processing {document}..."),
        (SessionState::Failed { message }, _) => format!("Error: {message}"),
        (SessionState::Ready, Some(view)) => format_counts(view.displayed_count, view.total_count),
        (SessionState::Idle | SessionState::Ready, _) => AWAITING_DOCUMENT.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::filter::filter;

    #[test]
    fn test_format_counts() {
        assert_eq!(format_counts(3, 10), "3 of 10 shown");
        assert_eq!(format_counts(0, 0), "0 of 0 shown");
    }

    #[test]
    fn test_status_line_ready_uses_view_counts() {
        let dataset = aggregate(["xx", "yyy"]);
        let view = filter(&dataset, "x");
        assert_eq!(
            status_line(&SessionState::Ready, Some(&view)),
            "1 of 2 shown"
        );
    }

    #[test]
    fn test_status_line_ready_with_no_runs() {
        let dataset = aggregate(["abc"]);
        let view = filter(&dataset, "");
        assert_eq!(
            status_line(&SessionState::Ready, Some(&view)),
            "0 of 0 shown"
        );
    }

    #[test]
    fn test_status_line_without_view_awaits_document() {
        assert_eq!(status_line(&SessionState::Ready, None), AWAITING_DOCUMENT);
    }

    #[test]
    fn test_status_line_other_states() {
        assert_eq!(status_line(&SessionState::Idle, None), "Awaiting document");
        assert_eq!(
            status_line(
                &SessionState::Processing {
                    document: "a.pdf".into()
                },
                None
            ),
            "Processing a.pdf..."
        );
        assert_eq!(
            status_line(
                &SessionState::Failed {
                    message: "Document is encrypted".into()
                },
                None
            ),
            "Error: Document is encrypted"
        );
    }
}
