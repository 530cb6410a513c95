use unicode_normalization::UnicodeNormalization;

/// Normalize extracted page text before run detection.
///
/// Composes to NFC so that a base letter plus combining mark compares equal to
/// its precomposed form. U+FFFD from unmappable glyphs is kept in place: it
/// stands between its neighbours, so they never join into a run.
/// Ligatures and compatibility forms are left alone: `ﬀ` is one code point,
/// not a run.
pub fn normalize_page_text(text: &str) -> String {
    text.nfc().collect()
}
