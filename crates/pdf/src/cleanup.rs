use unicode_normalization::UnicodeNormalization;

const LIGATURES: [(char, &str); 5] = [
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
];

/// Normalize the glyphs of one extracted text run.
///
/// Applies NFC normalization, expands typographic ligatures and drops the
/// Unicode replacement character left behind by unmapped glyphs. Spacing and
/// private-use glyphs are left as-is; callers that key on layout need them.
pub fn clean_span_text(text: &str) -> String {
    let mut result: String = text.nfc().collect();

    for (ligature, replacement) in LIGATURES {
        if result.contains(ligature) {
            result = result.replace(ligature, replacement);
        }
    }

    result.replace('\u{FFFD}', "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough() {
        assert_eq!(clean_span_text("Link to UTSC Timetable"), "Link to UTSC Timetable");
    }

    #[test]
    fn test_ligatures() {
        assert_eq!(clean_span_text("\u{FB01}rst"), "first");
        assert_eq!(clean_span_text("o\u{FB00}ered"), "offered");
        assert_eq!(clean_span_text("a\u{FB04}e"), "affle");
    }

    #[test]
    fn test_replacement_char_removed() {
        assert_eq!(clean_span_text("Pre\u{FFFD}requisite"), "Prerequisite");
    }

    #[test]
    fn test_nfc_normalization() {
        assert_eq!(clean_span_text("caf\u{0065}\u{0301}"), "caf\u{00E9}");
    }

    #[test]
    fn test_private_use_glyph_kept() {
        assert_eq!(clean_span_text("LEC01\u{f067}"), "LEC01\u{f067}");
    }

    #[test]
    fn test_whitespace_kept() {
        assert_eq!(clean_span_text("  a   b "), "  a   b ");
    }
}
