use std::collections::BTreeMap;

use lopdf::{self, content::Content};

use crate::PdfError;

// ---------------------------------------------------------------------------
// Type aliases
// ---------------------------------------------------------------------------

/// A page identifier mirroring `lopdf::ObjectId`: (object number, generation number).
pub type PageId = (u32, u16);

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// A simplified, lopdf-independent representation of a content-stream operand.
///
/// Keeps the text walker free of `lopdf::Object` so it can be driven by
/// hand-built operations in tests.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Dict(Vec<(Vec<u8>, PdfValue)>),
    Reference(PageId),
}

/// A single content-stream operation (operator + operands).
#[derive(Debug, Clone)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

impl ContentOp {
    pub fn new(operator: &str, operands: Vec<PdfValue>) -> Self {
        ContentOp {
            operator: operator.to_string(),
            operands,
        }
    }
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Extract an `f32` from a [`PdfValue`], accepting both `Integer` and `Real`.
pub fn get_number_from_value(val: &PdfValue) -> Option<f32> {
    match val {
        PdfValue::Integer(i) => Some(*i as f32),
        PdfValue::Real(f) => Some(*f),
        _ => None,
    }
}

/// Convert a `lopdf::Object` into a [`PdfValue`].
///
/// Stream dictionaries are kept but their bytes are dropped; operands never
/// carry stream data.
pub fn convert_object(obj: &lopdf::Object) -> PdfValue {
    match obj {
        lopdf::Object::Null => PdfValue::Null,
        lopdf::Object::Boolean(b) => PdfValue::Bool(*b),
        lopdf::Object::Integer(i) => PdfValue::Integer(*i),
        lopdf::Object::Real(f) => PdfValue::Real(*f),
        lopdf::Object::Name(n) => PdfValue::Name(n.clone()),
        lopdf::Object::String(s, _) => PdfValue::Str(s.clone()),
        lopdf::Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        lopdf::Object::Dictionary(dict) => PdfValue::Dict(convert_entries(dict)),
        lopdf::Object::Stream(stream) => PdfValue::Dict(convert_entries(&stream.dict)),
        lopdf::Object::Reference(id) => PdfValue::Reference(*id),
    }
}

fn convert_entries(dict: &lopdf::Dictionary) -> Vec<(Vec<u8>, PdfValue)> {
    dict.iter()
        .map(|(k, v)| (k.clone(), convert_object(v)))
        .collect()
}

/// Best-effort decoding of raw PDF string bytes into a Rust `String`, for
/// fonts whose encoding cannot be resolved.
///
/// Tried in order: UTF-16BE with a `\xFE\xFF` BOM, UTF-8, then Latin-1 with
/// each byte mapped to the code point of the same value.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    if let Some(payload) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        return decode_utf16be(payload);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    bytes.iter().map(|&b| b as char).collect()
}

/// Decode big-endian UTF-16 code units; a trailing odd byte is ignored.
fn decode_utf16be(payload: &[u8]) -> String {
    let code_units: Vec<u16> = payload
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&code_units)
}

// ---------------------------------------------------------------------------
// Text decoding
// ---------------------------------------------------------------------------

/// Turns the bytes of a text-showing operand into text, given the page font
/// resource (`/F1`-style key) selected by the last `Tf`.
pub trait TextDecoder {
    fn decode(&self, font_key: &[u8], bytes: &[u8]) -> String;
}

/// Decoder that ignores fonts and always uses [`decode_text_simple`].
pub struct SimpleDecoder;

impl TextDecoder for SimpleDecoder {
    fn decode(&self, _font_key: &[u8], bytes: &[u8]) -> String {
        decode_text_simple(bytes)
    }
}

/// The resolved encodings of one page's fonts.
///
/// Built once per page, so each `/ToUnicode` CMap is parsed once rather than
/// per string.
pub struct PageFonts<'a> {
    encodings: BTreeMap<Vec<u8>, lopdf::Encoding<'a>>,
}

impl<'a> PageFonts<'a> {
    fn load(doc: &'a lopdf::Document, page: PageId) -> Self {
        let fonts = match doc.get_page_fonts(page) {
            Ok(fonts) => fonts,
            Err(e) => {
                log::debug!("page {:?}: cannot read fonts: {}", page, e);
                BTreeMap::new()
            }
        };

        let encodings = fonts
            .into_iter()
            .filter_map(|(key, font)| match font.get_font_encoding(doc) {
                Ok(encoding) => Some((key, encoding)),
                Err(e) => {
                    log::debug!(
                        "font {}: no usable encoding ({}), falling back to byte decoding",
                        String::from_utf8_lossy(&key),
                        e
                    );
                    None
                }
            })
            .collect();

        PageFonts { encodings }
    }
}

impl TextDecoder for PageFonts<'_> {
    fn decode(&self, font_key: &[u8], bytes: &[u8]) -> String {
        let Some(encoding) = self.encodings.get(font_key) else {
            return decode_text_simple(bytes);
        };
        lopdf::Document::decode_text(encoding, bytes).unwrap_or_else(|e| {
            log::debug!("cannot decode with {:?}: {}", encoding, e);
            decode_text_simple(bytes)
        })
    }
}

// ---------------------------------------------------------------------------
// PdfBackend trait
// ---------------------------------------------------------------------------

/// Abstraction over a PDF parsing backend (currently backed by `lopdf`).
///
/// The page text walker only talks to this trait, so it can be exercised
/// against an in-memory implementation.
pub trait PdfBackend {
    /// Return a mapping from 1-based page number to [`PageId`].
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// Return the raw (decompressed) content stream bytes for a page.
    fn page_content(&self, page: PageId) -> Result<Vec<u8>, PdfError>;

    /// Decode raw content-stream bytes into a sequence of [`ContentOp`]s.
    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>, PdfError>;

    /// Decoder for the strings painted on `page`, resolving each font's
    /// `/Encoding` and `/ToUnicode` CMap.
    fn text_decoder(&self, page: PageId) -> Box<dyn TextDecoder + '_>;
}

// ---------------------------------------------------------------------------
// LopdfBackend
// ---------------------------------------------------------------------------

/// Concrete [`PdfBackend`] implementation backed by [`lopdf::Document`].
pub struct LopdfBackend {
    doc: lopdf::Document,
}

impl LopdfBackend {
    /// Parse a PDF from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self, PdfError> {
        let doc = lopdf::Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        if doc.is_encrypted() {
            return Err(PdfError::Encrypted);
        }

        Ok(Self { doc })
    }

    /// Total number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }
}

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn page_content(&self, page: PageId) -> Result<Vec<u8>, PdfError> {
        self.doc
            .get_page_content(page)
            .map_err(|e| PdfError::Parse(format!("cannot get page content: {}", e)))
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>, PdfError> {
        let content = Content::decode(data)
            .map_err(|e| PdfError::Parse(format!("content stream decode error: {}", e)))?;

        Ok(content
            .operations
            .into_iter()
            .map(|op| ContentOp {
                operator: op.operator,
                operands: op.operands.iter().map(convert_object).collect(),
            })
            .collect())
    }

    fn text_decoder(&self, page: PageId) -> Box<dyn TextDecoder + '_> {
        Box::new(PageFonts::load(&self.doc, page))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
