//! Linear page text extraction.
//!
//! Walks a page's content stream and concatenates, in stream order, every
//! string painted by the text-showing operators. No separator is inserted
//! between strings; the only synthesized character is a single space where a
//! `TJ` kerning adjustment is wide enough to read as a word gap.
//!
//! | Operator | Action |
//! |----------|--------|
//! | `Tf`     | Set font and size |
//! | `Tz`     | Set horizontal scaling |
//! | `Tj`     | Show a string |
//! | `TJ`     | Show strings with kerning adjustments |
//! | `'`      | Move to next line and show string |
//! | `"`      | Set spacing, move to next line and show string |

use super::backend::{get_number_from_value, ContentOp, PageId, PdfBackend, PdfValue, TextDecoder};
use crate::PdfError;

/// Approximate glyph width as a fraction of the font size.
const APPROX_CHAR_WIDTH_RATIO: f32 = 0.5;

/// Fraction of a glyph width a `TJ` displacement must exceed to count as a
/// word gap.
const WORD_GAP_RATIO: f32 = 0.3;

/// The slice of the PDF text state the walker needs.
#[derive(Debug, Clone)]
struct TextState {
    /// Current font resource name (the `/F1`-style key).
    font_key: Vec<u8>,
    font_size: f32,
    /// Horizontal scaling factor (percent / 100).
    horiz_scale: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font_key: Vec::new(),
            font_size: 0.0,
            horiz_scale: 1.0,
        }
    }
}

impl TextState {
    /// Smallest `TJ` displacement, in text space, treated as a space.
    fn gap_threshold(&self) -> f32 {
        self.font_size * APPROX_CHAR_WIDTH_RATIO * self.horiz_scale * WORD_GAP_RATIO
    }

    /// Horizontal displacement for a `TJ` adjustment in thousandths of a
    /// text-space unit. Negative adjustments move right.
    fn kerning_displacement(&self, adjustment: f32) -> f32 {
        -adjustment / 1000.0 * self.font_size * self.horiz_scale
    }
}

/// Extract the linear text of one page.
pub fn extract_page_text(backend: &dyn PdfBackend, page_id: PageId) -> Result<String, PdfError> {
    let raw_content = backend.page_content(page_id)?;
    let ops = backend.decode_content(&raw_content)?;
    let decoder = backend.text_decoder(page_id);
    Ok(text_from_ops(&ops, decoder.as_ref()))
}

/// Concatenate the strings shown by `ops`.
pub fn text_from_ops(ops: &[ContentOp], decoder: &dyn TextDecoder) -> String {
    let mut state = TextState::default();
    let mut out = String::new();

    for op in ops {
        match op.operator.as_str() {
            "Tf" => handle_tf(&op.operands, &mut state),
            "Tz" => {
                if let Some(v) = op.operands.first().and_then(get_number_from_value) {
                    state.horiz_scale = v / 100.0;
                }
            }
            "Tj" | "'" => {
                if let Some(operand) = op.operands.first() {
                    push_string(operand, decoder, &state, &mut out);
                }
            }
            "\"" => {
                // aw ac string
                if let Some(operand) = op.operands.get(2) {
                    push_string(operand, decoder, &state, &mut out);
                }
            }
            "TJ" => {
                if let Some(PdfValue::Array(arr)) = op.operands.first() {
                    handle_tj_array(arr, decoder, &state, &mut out);
                }
            }
            _ => {}
        }
    }

    out
}

fn handle_tf(operands: &[PdfValue], state: &mut TextState) {
    if operands.len() < 2 {
        return;
    }
    let key = match &operands[0] {
        PdfValue::Name(n) => n.clone(),
        PdfValue::Str(s) => s.clone(),
        _ => return,
    };
    state.font_key = key;
    state.font_size = get_number_from_value(&operands[1]).unwrap_or(0.0);
}

fn decode_string(val: &PdfValue, decoder: &dyn TextDecoder, state: &TextState) -> Option<String> {
    match val {
        PdfValue::Str(bytes) => Some(decoder.decode(&state.font_key, bytes)),
        _ => None,
    }
}

fn push_string(
    operand: &PdfValue,
    decoder: &dyn TextDecoder,
    state: &TextState,
    out: &mut String,
) {
    if let Some(text) = decode_string(operand, decoder, state) {
        out.push_str(&text);
    }
}

/// Process a `TJ` array: strings interleaved with numeric kerning.
///
/// A word-gap space is only emitted between two strings, never before the
/// first or after the last.
fn handle_tj_array(
    arr: &[PdfValue],
    decoder: &dyn TextDecoder,
    state: &TextState,
    out: &mut String,
) {
    let mut shown_any = false;
    let mut pending_space = false;

    for elem in arr {
        if let Some(fragment) = decode_string(elem, decoder, state) {
            if fragment.is_empty() {
                continue;
            }
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push_str(&fragment);
            shown_any = true;
        } else if let Some(adjustment) = get_number_from_value(elem) {
            let dx = state.kerning_displacement(adjustment);
            if shown_any && dx > state.gap_threshold() {
                pending_space = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::parser::backend::SimpleDecoder;

    /// Backend serving pre-built operations for a single page.
    struct FixtureBackend {
        ops: Vec<ContentOp>,
    }

    impl PdfBackend for FixtureBackend {
        fn pages(&self) -> BTreeMap<u32, PageId> {
            BTreeMap::from([(1, (1, 0))])
        }

        fn page_content(&self, _page: PageId) -> Result<Vec<u8>, PdfError> {
            Ok(Vec::new())
        }

        fn decode_content(&self, _data: &[u8]) -> Result<Vec<ContentOp>, PdfError> {
            Ok(self.ops.clone())
        }

        fn text_decoder(&self, _page: PageId) -> Box<dyn TextDecoder + '_> {
            Box::new(SimpleDecoder)
        }
    }

    struct BrokenBackend;

    impl PdfBackend for BrokenBackend {
        fn pages(&self) -> BTreeMap<u32, PageId> {
            BTreeMap::new()
        }

        fn page_content(&self, _page: PageId) -> Result<Vec<u8>, PdfError> {
            Err(PdfError::Parse("cannot get page content".into()))
        }

        fn decode_content(&self, _data: &[u8]) -> Result<Vec<ContentOp>, PdfError> {
            Ok(Vec::new())
        }

        fn text_decoder(&self, _page: PageId) -> Box<dyn TextDecoder + '_> {
            Box::new(SimpleDecoder)
        }
    }

    fn s(text: &str) -> PdfValue {
        PdfValue::Str(text.as_bytes().to_vec())
    }

    fn font(size: i64) -> ContentOp {
        ContentOp::new("Tf", vec![PdfValue::Name(b"F1".to_vec()), PdfValue::Integer(size)])
    }

    fn page_text(ops: Vec<ContentOp>) -> String {
        let backend = FixtureBackend { ops };
        extract_page_text(&backend, (1, 0)).unwrap()
    }

    #[test]
    fn test_empty_content_stream() {
        assert_eq!(page_text(vec![]), "");
    }

    #[test]
    fn test_tj_strings_concatenate_without_separator() {
        let text = page_text(vec![
            ContentOp::new("BT", vec![]),
            font(12),
            ContentOp::new("Tj", vec![s("aa")]),
            ContentOp::new("Td", vec![PdfValue::Integer(0), PdfValue::Integer(-14)]),
            ContentOp::new("Tj", vec![s("ab")]),
            ContentOp::new("ET", vec![]),
        ]);
        assert_eq!(text, "aaab");
    }

    #[test]
    fn test_quote_operators() {
        let text = page_text(vec![
            font(10),
            ContentOp::new("'", vec![s("x")]),
            ContentOp::new(
                "\"",
                vec![PdfValue::Integer(1), PdfValue::Integer(0), s("yy")],
            ),
        ]);
        assert_eq!(text, "xyy");
    }

    #[test]
    fn test_tj_array_small_kerning_keeps_letters_together() {
        let text = page_text(vec![
            font(10),
            ContentOp::new(
                "TJ",
                vec![PdfValue::Array(vec![s("bo"), PdfValue::Integer(-20), s("ok")])],
            ),
        ]);
        assert_eq!(text, "book");
    }

    #[test]
    fn test_tj_array_wide_gap_inserts_space() {
        let text = page_text(vec![
            font(10),
            ContentOp::new(
                "TJ",
                vec![PdfValue::Array(vec![s("Hello"), PdfValue::Integer(-300), s("world")])],
            ),
        ]);
        assert_eq!(text, "Hello world");
    }

    #[test]
    fn test_tj_array_trailing_gap_adds_nothing() {
        let text = page_text(vec![
            font(10),
            ContentOp::new(
                "TJ",
                vec![PdfValue::Array(vec![
                    PdfValue::Integer(-900),
                    s("end"),
                    PdfValue::Integer(-900),
                ])],
            ),
        ]);
        assert_eq!(text, "end");
    }

    #[test]
    fn test_gap_threshold_is_relative_to_glyph_width() {
        // Displacement and threshold both scale with size and Tz, so the
        // cut-off sits at 150 thousandths whatever the scaling.
        let ops = |scale: i64, adjustment: i64| {
            vec![
                font(24),
                ContentOp::new("Tz", vec![PdfValue::Integer(scale)]),
                ContentOp::new(
                    "TJ",
                    vec![PdfValue::Array(vec![
                        s("a"),
                        PdfValue::Integer(adjustment),
                        s("b"),
                    ])],
                ),
            ]
        };
        assert_eq!(page_text(ops(100, -200)), "a b");
        assert_eq!(page_text(ops(50, -200)), "a b");
        assert_eq!(page_text(ops(100, -100)), "ab");
        assert_eq!(page_text(ops(50, -100)), "ab");
    }

    #[test]
    fn test_positive_kerning_never_inserts_space() {
        let text = page_text(vec![
            font(10),
            ContentOp::new(
                "TJ",
                vec![PdfValue::Array(vec![s("a"), PdfValue::Integer(400), s("a")])],
            ),
        ]);
        assert_eq!(text, "aa");
    }

    #[test]
    fn test_non_text_operators_ignored() {
        let text = page_text(vec![
            ContentOp::new("q", vec![]),
            ContentOp::new("re", vec![PdfValue::Integer(0); 4]),
            ContentOp::new("Tj", vec![PdfValue::Integer(5)]),
            ContentOp::new("Q", vec![]),
        ]);
        assert_eq!(text, "");
    }

    /// `F2` decodes each byte as its uppercase letter; other fonts pass through.
    struct ShoutingDecoder;

    impl TextDecoder for ShoutingDecoder {
        fn decode(&self, font_key: &[u8], bytes: &[u8]) -> String {
            let text = String::from_utf8_lossy(bytes);
            if font_key == b"F2" {
                text.to_uppercase()
            } else {
                text.into_owned()
            }
        }
    }

    #[test]
    fn test_strings_decode_with_selected_font() {
        let ops = vec![
            font(10),
            ContentOp::new("Tj", vec![s("aa")]),
            ContentOp::new("Tf", vec![PdfValue::Name(b"F2".to_vec()), PdfValue::Integer(10)]),
            ContentOp::new("Tj", vec![s("aa")]),
            ContentOp::new(
                "TJ",
                vec![PdfValue::Array(vec![s("b"), PdfValue::Integer(-10), s("b")])],
            ),
        ];
        assert_eq!(text_from_ops(&ops, &ShoutingDecoder), "aaAABB");
    }

    #[test]
    fn test_content_error_propagates() {
        assert!(matches!(
            extract_page_text(&BrokenBackend, (1, 0)),
            Err(PdfError::Parse(_))
        ));
    }
}
