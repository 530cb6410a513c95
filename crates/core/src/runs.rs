//! Consecutive-character run extraction
//!
//! Pure functions that scan a page of text for maximal runs of two or more
//! identical code points. A run of five `x` characters is reported once, as a
//! single run of length five, never as overlapping pieces.

use std::iter::Peekable;
use std::str::Chars;

use serde::Serialize;

/// A maximal run of one repeated character.
///
/// Only constructed by the extractor, so `text` always holds `character`
/// repeated `length` times and `length` is at least 2. Runs serialize for
/// output but never deserialize:
///
/// ```compile_fail
/// let run: charruns_core::runs::Run =
///     serde_json::from_str(r#"{"character":"a","text":"b","length":9}"#).unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Run {
    character: char,
    text: String,
    length: usize,
}

impl Run {
    fn repeated(character: char, length: usize) -> Self {
        Run {
            character,
            text: std::iter::repeat(character).take(length).collect(),
            length,
        }
    }

    /// The repeated code point.
    pub fn character(&self) -> char {
        self.character
    }

    /// The full matched text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of code points in the run.
    pub fn length(&self) -> usize {
        self.length
    }
}

/// A run together with where it starts in the scanned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunMatch {
    /// Code-point index of the first character of the run.
    pub offset: usize,
    pub run: Run,
}

/// Lazy iterator over the runs of a text, left to right.
#[derive(Debug, Clone)]
pub struct RunMatches<'a> {
    chars: Peekable<Chars<'a>>,
    position: usize,
}

impl Iterator for RunMatches<'_> {
    type Item = RunMatch;

    fn next(&mut self) -> Option<RunMatch> {
        while let Some(current) = self.chars.next() {
            let start = self.position;
            let mut length = 1;
            while self.chars.next_if_eq(&current).is_some() {
                length += 1;
            }
            self.position += length;

            if length >= 2 {
                return Some(RunMatch {
                    offset: start,
                    run: Run::repeated(current, length),
                });
            }
        }
        None
    }
}

/// Iterate over every maximal run in `text`, with offsets.
pub fn find_runs(text: &str) -> RunMatches<'_> {
    RunMatches {
        chars: text.chars().peekable(),
        position: 0,
    }
}

/// Extract every maximal run in `text`, in left-to-right order.
///
/// Every code point is eligible, whitespace and punctuation included. Empty
/// input yields an empty vector.
pub fn extract(text: &str) -> Vec<Run> {
    find_runs(text).map(|m| m.run).collect()
}
