//! Analysis session: the current document, its dataset, and the active filter
//!
//! The session replaces the dataset wholesale on every document submission.
//! Each submission hands out a [`Ticket`]; a completion carrying an older
//! ticket is discarded, so output for a superseded document is never shown.

use std::fmt::Display;

use thiserror::Error;

use crate::aggregate::MasterDataset;
use crate::filter::{self, ViewState};
use crate::status;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("No document is being processed")]
    NotProcessing,
}

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing submitted yet.
    Idle,
    /// A document was submitted and its pages are being read.
    Processing { document: String },
    /// The latest document was analysed; its dataset is available.
    Ready,
    /// The latest document could not be read.
    Failed { message: String },
}

/// Handle for one document submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
}

/// What [`Session::complete`] did with a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Superseded,
}

#[derive(Debug, Clone)]
pub struct Session {
    state: SessionState,
    dataset: Option<MasterDataset>,
    document: Option<String>,
    filter: String,
    generation: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Session {
            state: SessionState::Idle,
            dataset: None,
            document: None,
            filter: String::new(),
            generation: 0,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn dataset(&self) -> Option<&MasterDataset> {
        self.dataset.as_ref()
    }

    /// Display name of the most recently submitted document.
    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Start processing a new document.
    ///
    /// Clears the current dataset and supersedes any submission still in
    /// flight.
    pub fn submit(&mut self, document: impl Into<String>) -> Ticket {
        let document = document.into();
        self.generation += 1;
        self.dataset = None;
        self.document = Some(document.clone());
        self.state = SessionState::Processing { document };
        Ticket {
            generation: self.generation,
        }
    }

    /// Deliver the outcome of the submission identified by `ticket`.
    ///
    /// Results for a superseded ticket are dropped and leave the session
    /// untouched.
    pub fn complete<E: Display>(
        &mut self,
        ticket: Ticket,
        result: Result<MasterDataset, E>,
    ) -> Result<Completion, SessionError> {
        if ticket.generation != self.generation {
            return Ok(Completion::Superseded);
        }
        if !matches!(self.state, SessionState::Processing { .. }) {
            return Err(SessionError::NotProcessing);
        }

        match result {
            Ok(dataset) => {
                self.dataset = Some(dataset);
                self.state = SessionState::Ready;
            }
            Err(err) => {
                self.dataset = None;
                self.state = SessionState::Failed {
                    message: err.to_string(),
                };
            }
        }
        Ok(Completion::Applied)
    }

    /// Replace the active filter expression.
    pub fn set_filter(&mut self, expr: impl Into<String>) {
        self.filter = expr.into();
    }

    /// The current view, available only once a dataset is ready.
    pub fn view(&self) -> Option<ViewState<'_>> {
        match (&self.state, &self.dataset) {
            (SessionState::Ready, Some(dataset)) => Some(filter::filter(dataset, &self.filter)),
            _ => None,
        }
    }

    pub fn status_line(&self) -> String {
        status::status_line(&self.state, self.view().as_ref())
    }
}
