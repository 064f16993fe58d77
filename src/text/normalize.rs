//! Map Unicode text onto what the standard fonts can actually draw.
//!
//! Helvetica in WinAnsi encoding covers ASCII plus a handful of Latin-1
//! and typographic glyphs. Anything else renders as a missing-glyph box or
//! breaks the width measurements, so spaces, dashes, quotes and ellipses
//! are folded to their ASCII forms here.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static SPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").expect("valid regex"));

/// Normalize `s` for drawing with a standard font. Pure and total.
pub fn normalize(s: &str) -> String {
    let mut mapped = String::with_capacity(s.len());
    for ch in s.nfkc() {
        match ch {
            // Non-breaking, narrow, figure, thin, hair and other fixed-width spaces.
            '\u{00A0}' | '\u{2000}'..='\u{200A}' | '\u{202F}' | '\u{205F}' | '\u{3000}' => {
                mapped.push(' ')
            }
            // Zero-width characters vanish.
            '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{FEFF}' => {}
            // Hyphens, non-breaking hyphen, figure/en/em dashes, minus.
            '\u{2010}'..='\u{2015}' | '\u{2212}' | '\u{FE58}' | '\u{FE63}' | '\u{FF0D}' => {
                mapped.push('-')
            }
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' | '\u{2032}' => mapped.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{2033}' => mapped.push('"'),
            '\u{2026}' => mapped.push_str("..."),
            '\u{2028}' | '\u{2029}' | '\u{0085}' => mapped.push('\n'),
            _ => mapped.push(ch),
        }
    }

    let unified = mapped.replace("\r\n", "\n").replace('\r', "\n");
    let collapsed = SPACE_RUNS.replace_all(&unified, " ");
    collapsed.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_spaces() {
        assert_eq!(normalize("a\u{00A0}b\u{202F}c\u{2009}d\u{200A}e"), "a b c d e");
        assert_eq!(normalize("12\u{2007}000"), "12 000");
    }

    #[test]
    fn folds_dashes() {
        assert_eq!(normalize("a\u{2013}b\u{2014}c\u{2212}d\u{2011}e\u{2012}f"), "a-b-c-d-e-f");
    }

    #[test]
    fn folds_quotes_and_ellipsis() {
        assert_eq!(
            normalize("\u{201C}quoted\u{201D} \u{2018}single\u{2019} \u{201E}low\u{201C}\u{2026}"),
            "\"quoted\" 'single' \"low\"..."
        );
    }

    #[test]
    fn collapses_whitespace_and_line_endings() {
        assert_eq!(normalize("  a  \t b\r\nc\rd  "), "a b\nc\nd");
    }

    #[test]
    fn keeps_paragraph_breaks() {
        assert_eq!(normalize("first\n\nsecond"), "first\n\nsecond");
    }

    #[test]
    fn nfkc_composes() {
        // e + combining acute composes to a single Latin-1 glyph.
        assert_eq!(normalize("cafe\u{0301}"), "caf\u{00E9}");
        // Full-width letters fold to ASCII.
        assert_eq!(normalize("\u{FF21}\u{FF22}"), "AB");
    }

    #[test]
    fn idempotent() {
        let samples = [
            "",
            "   ",
            "plain ascii",
            "\u{201C}Smart\u{201D} \u{2014} quotes\u{2026}",
            " \t lead and trail \r\n",
            "cafe\u{0301} na\u{00EF}ve \u{FB01}ne",
            "a\u{00A0}\u{00A0}\u{2009}b",
            "x\r\n\r\n\r\ny",
            "\u{2028}line\u{2029}sep",
            "\u{0301} leading combining",
            "\u{00BD} \u{00B2} \u{2122}",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", s);
        }
    }
}
