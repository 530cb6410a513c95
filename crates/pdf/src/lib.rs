use thiserror::Error;

use parser::backend::{LopdfBackend, PageId, PdfBackend};

pub mod admission;
pub mod normalize;
pub mod parser;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use admission::{is_pdf, media_type, PDF_MEDIA_TYPE};

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF parsing error: {0}")]
    Parse(String),
    #[error("Document is encrypted")]
    Encrypted,
    #[error("Page {page} out of range (document has {page_count} pages)")]
    PageOutOfRange { page: usize, page_count: usize },
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Anything that can hand out the linear text of its pages.
pub trait PageTextSource {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Linear text of the 1-based page `page_number`.
    fn page_text(&self, page_number: usize) -> Result<String, PdfError>;

    /// Text of every page, in page order.
    fn page_texts(&self) -> impl Iterator<Item = Result<String, PdfError>> + '_
    where
        Self: Sized,
    {
        (1..=self.page_count()).map(move |n| self.page_text(n))
    }
}

/// An opened PDF document.
///
/// Constructed via [`open_document`]. Pages are resolved once at open time;
/// their text is extracted on demand.
pub struct PdfDocument {
    backend: LopdfBackend,
    pages: Vec<PageId>,
}

impl PdfDocument {
    /// Parse PDF bytes into a document.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PdfError> {
        let backend = LopdfBackend::load_bytes(bytes)?;
        // `pages()` is a BTreeMap keyed by page number, so values are in
        // page order.
        let pages: Vec<PageId> = backend.pages().into_values().collect();
        log::debug!(
            "opened PDF: {} bytes, {} pages",
            bytes.len(),
            backend.page_count()
        );
        Ok(PdfDocument { backend, pages })
    }
}

impl PageTextSource for PdfDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, page_number: usize) -> Result<String, PdfError> {
        let page_id = page_number
            .checked_sub(1)
            .and_then(|idx| self.pages.get(idx))
            .copied()
            .ok_or(PdfError::PageOutOfRange {
                page: page_number,
                page_count: self.pages.len(),
            })?;

        let raw = parser::text::extract_page_text(&self.backend, page_id)?;
        let text = normalize::normalize_page_text(&raw);
        log::debug!("page {}: {} characters", page_number, text.chars().count());
        Ok(text)
    }
}

/// Parse PDF bytes into a [`PdfDocument`].
pub fn open_document(bytes: &[u8]) -> Result<PdfDocument, PdfError> {
    PdfDocument::from_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{build_cid_pdf, build_pdf};

    #[test]
    fn test_open_document_page_count() {
        let bytes = build_pdf(&["one", "two", "three"]).unwrap();
        let doc = open_document(&bytes).unwrap();
        assert_eq!(doc.page_count(), 3);
    }

    #[test]
    fn test_page_text_in_order() {
        let bytes = build_pdf(&["xx", "yyy"]).unwrap();
        let doc = open_document(&bytes).unwrap();
        assert_eq!(doc.page_text(1).unwrap(), "xx");
        assert_eq!(doc.page_text(2).unwrap(), "yyy");

        let all: Vec<String> = doc.page_texts().collect::<Result<_, _>>().unwrap();
        assert_eq!(all, vec!["xx", "yyy"]);
    }

    #[test]
    fn test_page_text_out_of_range() {
        let bytes = build_pdf(&["only"]).unwrap();
        let doc = open_document(&bytes).unwrap();
        assert!(matches!(
            doc.page_text(0),
            Err(PdfError::PageOutOfRange { page: 0, page_count: 1 })
        ));
        assert!(matches!(
            doc.page_text(2),
            Err(PdfError::PageOutOfRange { page: 2, page_count: 1 })
        ));
    }

    #[test]
    fn test_empty_page_text() {
        let bytes = build_pdf(&[""]).unwrap();
        let doc = open_document(&bytes).unwrap();
        assert_eq!(doc.page_text(1).unwrap(), "");
    }

    #[test]
    fn test_identity_h_font_decodes_through_to_unicode() {
        let bytes = build_cid_pdf(&[(0x0003, 'あ')], &[&[0x0003, 0x0003]]).unwrap();
        let doc = open_document(&bytes).unwrap();
        assert_eq!(doc.page_text(1).unwrap(), "ああ");
    }

    #[test]
    fn test_identity_h_maps_every_code() {
        let bytes = build_cid_pdf(
            &[(0x0010, '一'), (0x0020, 'ー'), (0x0030, '𠀀')],
            &[&[0x0010, 0x0010, 0x0020, 0x0020, 0x0020], &[0x0030, 0x0030]],
        )
        .unwrap();
        let doc = open_document(&bytes).unwrap();
        assert_eq!(doc.page_text(1).unwrap(), "一一ーーー");
        assert_eq!(doc.page_text(2).unwrap(), "𠀀𠀀");
    }

    #[test]
    fn test_fixture_passes_admission() {
        let bytes = build_pdf(&["a"]).unwrap();
        assert!(is_pdf(&bytes));
    }

    #[test]
    fn test_open_document_rejects_garbage() {
        assert!(open_document(&[]).is_err());
        assert!(open_document(b"<html>not a pdf</html>").is_err());
    }

    #[test]
    fn test_page_out_of_range_message() {
        let err = PdfError::PageOutOfRange {
            page: 4,
            page_count: 3,
        };
        assert_eq!(
            err.to_string(),
            "Page 4 out of range (document has 3 pages)"
        );
    }
}
