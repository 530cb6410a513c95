//! Input admission: only PDF documents are analysed.

/// Media type reported for documents that pass [`media_type`].
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Readers accept the header anywhere in the first kilobyte.
const HEADER_SEARCH_WINDOW: usize = 1024;

const PDF_SIGNATURE: &[u8] = b"%PDF-";

/// Sniff the media type of `bytes`.
///
/// Returns [`PDF_MEDIA_TYPE`] when the `%PDF-` signature appears in the first
/// 1024 bytes, `None` otherwise.
pub fn media_type(bytes: &[u8]) -> Option<&'static str> {
    let window = &bytes[..bytes.len().min(HEADER_SEARCH_WINDOW)];
    window
        .windows(PDF_SIGNATURE.len())
        .any(|w| w == PDF_SIGNATURE)
        .then_some(PDF_MEDIA_TYPE)
}

pub fn is_pdf(bytes: &[u8]) -> bool {
    media_type(bytes) == Some(PDF_MEDIA_TYPE)
}
