//! Document submission: admission check, page text loading, aggregation.
//!
//! Pages are read on a blocking worker and streamed back over a channel in
//! page order. A submission comes in two halves: [`begin`] registers the
//! document with the session and starts the reader, [`Pending::complete`]
//! hands the result back. Dropping a [`Pending`] drops the receiving side of
//! the channel, and the worker stops at its next page.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::time::{Duration, Instant};

use charruns_core::aggregate::{try_aggregate, MasterDataset};
use charruns_core::session::{Completion, Session, Ticket};
use indicatif::{ProgressBar, ProgressStyle};
use pdf::PageTextSource;
use tokio::task::JoinHandle;

use crate::prelude::{eprintln, *};

/// Pages buffered between the worker and the aggregator.
const PAGE_BUFFER: usize = 8;

/// A document that passed the admission check.
#[derive(Debug, Clone)]
pub struct Document {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// A fully analysed document.
#[derive(Debug)]
pub struct Analysis {
    pub dataset: MasterDataset,
    pub page_count: usize,
    pub elapsed: Duration,
}

/// What happened to a submitted path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submitted {
    /// Not a PDF; the session was left untouched.
    Ignored,
    /// The session now holds the new dataset or the failure.
    Applied,
    /// A newer submission replaced this one before it finished.
    Superseded,
}

enum PageEvent {
    Opened { page_count: usize },
    Page(std::result::Result<String, pdf::PdfError>),
}

type AnalysisFuture =
    Pin<Box<dyn Future<Output = std::result::Result<Analysis, Error>> + Send>>;

/// A submitted document whose pages are still being read.
pub struct Pending {
    ticket: Ticket,
    document: String,
    spinner: Option<ProgressBar>,
    analysis: AnalysisFuture,
}

impl Pending {
    pub fn document(&self) -> &str {
        &self.document
    }

    /// Wait for the analysis to finish.
    ///
    /// Cancel safe: dropping the returned future leaves the reader running,
    /// and a later call picks up where this one stopped. Do not call again
    /// once it has returned.
    pub async fn analysis(&mut self) -> std::result::Result<Analysis, Error> {
        (&mut self.analysis).await
    }

    /// Deliver `result` to `session`.
    pub fn complete(
        self,
        session: &mut Session,
        result: std::result::Result<Analysis, Error>,
        global: &crate::Global,
    ) -> Result<Submitted> {
        if let Some(spinner) = &self.spinner {
            spinner.finish_and_clear();
        }

        let result = result.map(|analysis| {
            log::info!(
                "{}: {} runs on {} pages in {:?}",
                self.document,
                analysis.dataset.len(),
                analysis.page_count,
                analysis.elapsed
            );
            if global.verbose {
                eprintln!(
                    "Analysed {} ({} pages) in {} ms",
                    self.document,
                    analysis.page_count,
                    analysis.elapsed.as_millis()
                );
            }
            analysis.dataset
        });

        let completion = session
            .complete(self.ticket, result)
            .wrap_err_with(|| f!("Failed to deliver the analysis of {}", self.document))?;

        match completion {
            Completion::Applied => Ok(Submitted::Applied),
            Completion::Superseded => {
                log::debug!("discarding superseded result for {}", self.document);
                Ok(Submitted::Superseded)
            }
        }
    }

    /// Stop reading pages without touching the session.
    pub fn abandon(self) {
        if let Some(spinner) = &self.spinner {
            spinner.finish_and_clear();
        }
        log::debug!("abandoning {}", self.document);
    }
}

/// Helper to set spinner message if spinner is present
fn set_spinner_msg(spinner: Option<&ProgressBar>, msg: impl Into<String>) {
    if let Some(s) = spinner {
        s.set_message(msg.into());
    }
}

pub fn new_spinner(document: &str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .wrap_err("Invalid spinner template")?;
    spinner.set_style(style);
    spinner.set_message(f!("Processing {document}..."));
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

/// Read `path` and keep it only if it is a PDF.
pub async fn read_document(path: &Path) -> std::result::Result<Document, Error> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| Error::Ingestion(f!("{}: {e}", path.display())))?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    match pdf::media_type(&bytes) {
        Some(pdf::PDF_MEDIA_TYPE) => Ok(Document { name, bytes }),
        _ => Err(Error::UnsupportedInput(f!(
            "{name} is not {}",
            pdf::PDF_MEDIA_TYPE
        ))),
    }
}

/// Walk the document's pages on the current (blocking) thread, sending each
/// page's text as soon as it is ready. Stops after the first failure or once
/// the receiver is gone. Returns the number of pages delivered.
fn stream_pages(bytes: &[u8], tx: &async_channel::Sender<PageEvent>) -> usize {
    let doc = match pdf::open_document(bytes) {
        Ok(doc) => doc,
        Err(err) => {
            let _ = tx.send_blocking(PageEvent::Page(Err(err)));
            return 0;
        }
    };

    let page_count = doc.page_count();
    if tx.send_blocking(PageEvent::Opened { page_count }).is_err() {
        return 0;
    }

    let mut delivered = 0;
    for page in doc.page_texts() {
        let failed = page.is_err();
        if tx.send_blocking(PageEvent::Page(page)).is_err() {
            log::debug!(
                "page reader stopped after {delivered} of {page_count} pages: receiver dropped"
            );
            return delivered;
        }
        delivered += 1;
        if failed {
            break;
        }
    }
    delivered
}

fn spawn_page_reader(
    bytes: Vec<u8>,
) -> (async_channel::Receiver<PageEvent>, JoinHandle<usize>) {
    let (tx, rx) = async_channel::bounded(PAGE_BUFFER);
    let worker = tokio::task::spawn_blocking(move || stream_pages(&bytes, &tx));
    (rx, worker)
}

/// Extract and rank the runs of every page of `bytes`.
pub async fn analyse(
    bytes: Vec<u8>,
    spinner: Option<ProgressBar>,
) -> std::result::Result<Analysis, Error> {
    let started = Instant::now();
    let (rx, worker) = spawn_page_reader(bytes);

    let mut page_count = 0;
    let mut pages = Vec::new();
    while let Ok(event) = rx.recv().await {
        match event {
            PageEvent::Opened { page_count: n } => page_count = n,
            PageEvent::Page(page) => {
                pages.push(page);
                set_spinner_msg(
                    spinner.as_ref(),
                    f!("Reading page {} of {page_count}...", pages.len()),
                );
            }
        }
    }

    worker
        .await
        .map_err(|e| Error::Ingestion(f!("page reader failed: {e}")))?;

    let dataset = try_aggregate(pages)?;
    Ok(Analysis {
        dataset,
        page_count,
        elapsed: started.elapsed(),
    })
}

/// Register the document at `path` with `session` and start reading it.
///
/// Returns `None`, leaving the session untouched, when `path` is not a PDF.
pub async fn begin(
    session: &mut Session,
    path: &Path,
    show_progress: bool,
) -> Result<Option<Pending>> {
    let document = match read_document(path).await {
        Ok(document) => document,
        Err(Error::UnsupportedInput(reason)) => {
            log::debug!("ignoring input: {reason}");
            return Ok(None);
        }
        Err(err) => {
            // Reading the file is part of ingestion: the failure is shown
            // through the session like any other.
            let name = path.display().to_string();
            let ticket = session.submit(name.clone());
            return Ok(Some(Pending {
                ticket,
                document: name,
                spinner: None,
                analysis: Box::pin(std::future::ready(Err(err))),
            }));
        }
    };

    let ticket = session.submit(document.name.clone());
    let spinner = if show_progress {
        Some(new_spinner(&document.name)?)
    } else {
        None
    };
    let analysis = Box::pin(analyse(document.bytes, spinner.clone()));

    Ok(Some(Pending {
        ticket,
        document: document.name,
        spinner,
        analysis,
    }))
}

/// Submit the document at `path` to `session` and wait for its analysis.
pub async fn submit(
    session: &mut Session,
    path: &Path,
    global: &crate::Global,
    show_progress: bool,
) -> Result<Submitted> {
    let Some(mut pending) = begin(session, path, show_progress).await? else {
        return Ok(Submitted::Ignored);
    };
    let result = pending.analysis().await;
    pending.complete(session, result, global)
}
