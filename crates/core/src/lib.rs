//! Core library for charruns
//!
//! This crate is the **Functional Core** of charruns: it finds runs of
//! identical consecutive characters in page text, ranks them across a whole
//! document, and filters the ranked dataset for display. It performs no I/O.
//! Reading documents and drawing tables live in the `pdf` and `charruns`
//! crates (the Imperative Shell).
//!
//! # Pipeline
//!
//! ```text
//! page texts  ->  Run[] per page  ->  MasterDataset  ->  ViewState
//!                 runs::extract       aggregate          filter
//! ```
//!
//! # Module Organization
//!
//! - [`runs`]: maximal run detection within one page of text
//! - [`aggregate`]: cross-page collection and stable ranking by length
//! - [`filter`]: filter expressions and the derived view
//! - [`session`]: the analysis session state machine and supersession tickets
//! - [`status`]: status line and empty-state text
//!
//! # Example Usage
//!
//! ```rust
//! use charruns_core::{aggregate::aggregate, filter::filter};
//!
//! let dataset = aggregate(["xx", "yyy"]);
//! let view = filter(&dataset, "y");
//!
//! assert_eq!(view.displayed_count, 1);
//! assert_eq!(view.total_count, 2);
//! assert_eq!(view.rows[0].text(), "yyy");
//! ```

pub mod aggregate;
pub mod filter;
pub mod runs;
pub mod session;
pub mod status;
