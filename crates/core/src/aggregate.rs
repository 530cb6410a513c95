//! Cross-page aggregation of runs into a ranked dataset

use serde::Serialize;

use crate::runs::{self, Run};

/// Every run found in one document, longest first.
///
/// Runs of equal length keep their discovery order (page order, then left to
/// right within a page). Only built through [`aggregate`] or
/// [`try_aggregate`], so the ordering always holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MasterDataset {
    runs: Vec<Run>,
}

impl MasterDataset {
    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Run> {
        self.runs.iter()
    }

    fn ranked(mut runs: Vec<Run>) -> Self {
        // `sort_by` is stable; ties stay in discovery order.
        runs.sort_by(|a, b| b.length().cmp(&a.length()));
        MasterDataset { runs }
    }
}

impl<'a> IntoIterator for &'a MasterDataset {
    type Item = &'a Run;
    type IntoIter = std::slice::Iter<'a, Run>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Extract runs from every page, in page order, and rank them.
pub fn aggregate<I, S>(pages: I) -> MasterDataset
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut collected = Vec::new();
    for page in pages {
        collected.extend(runs::extract(page.as_ref()));
    }
    MasterDataset::ranked(collected)
}

/// Like [`aggregate`], but over fallible page texts.
///
/// Stops at the first failed page and returns its error. Runs gathered from
/// earlier pages are dropped.
pub fn try_aggregate<I, S, E>(pages: I) -> Result<MasterDataset, E>
where
    I: IntoIterator<Item = Result<S, E>>,
    S: AsRef<str>,
{
    let mut collected = Vec::new();
    for page in pages {
        collected.extend(runs::extract(page?.as_ref()));
    }
    Ok(MasterDataset::ranked(collected))
}
