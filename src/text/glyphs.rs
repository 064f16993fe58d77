//! Aggressive ASCII substitution for technical notation.
//!
//! Markdown produced by assistants is full of arrows, comparison operators,
//! fractions, superscripts and currency symbols. The standard fonts have
//! none of them. This runs *before* [`normalize`](super::normalize) because
//! NFKC would otherwise flatten `x²` to `x2` and `½` to `1⁄2`.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

fn substitution(ch: char) -> Option<&'static str> {
    let s = match ch {
        // Arrows
        '\u{2192}' | '\u{27F6}' | '\u{279C}' | '\u{2794}' => "->",
        '\u{2190}' | '\u{27F5}' => "<-",
        '\u{2194}' | '\u{27F7}' => "<->",
        '\u{21D2}' | '\u{27F9}' => "=>",
        '\u{21D0}' | '\u{27F8}' => "<=",
        '\u{21D4}' | '\u{27FA}' => "<=>",
        '\u{2191}' => "^",
        '\u{2193}' => "v",
        // Comparison and arithmetic
        '\u{2264}' | '\u{2A7D}' => "<=",
        '\u{2265}' | '\u{2A7E}' => ">=",
        '\u{2260}' => "!=",
        '\u{2248}' | '\u{2243}' | '\u{223C}' => "~",
        '\u{2261}' => "==",
        '\u{00B1}' => "+/-",
        '\u{00D7}' | '\u{2715}' | '\u{2716}' => "x",
        '\u{00F7}' => "/",
        '\u{22C5}' | '\u{2219}' => "*",
        '\u{221A}' => "sqrt",
        '\u{221E}' => "inf",
        '\u{2211}' => "sum",
        '\u{220F}' => "prod",
        '\u{2206}' | '\u{0394}' => "delta",
        '\u{03C0}' => "pi",
        '\u{03BC}' | '\u{00B5}' => "u",
        '\u{00B0}' => " deg",
        '\u{2030}' => " per mille",
        // Fractions
        '\u{00BD}' => "1/2",
        '\u{2153}' => "1/3",
        '\u{2154}' => "2/3",
        '\u{00BC}' => "1/4",
        '\u{00BE}' => "3/4",
        '\u{2155}' => "1/5",
        '\u{215B}' => "1/8",
        '\u{2044}' => "/",
        // Superscript and subscript digits
        '\u{2070}' => "^0",
        '\u{00B9}' => "^1",
        '\u{00B2}' => "^2",
        '\u{00B3}' => "^3",
        '\u{2074}' => "^4",
        '\u{2075}' => "^5",
        '\u{2076}' => "^6",
        '\u{2077}' => "^7",
        '\u{2078}' => "^8",
        '\u{2079}' => "^9",
        '\u{207A}' => "^+",
        '\u{207B}' => "^-",
        '\u{2080}' => "0",
        '\u{2081}' => "1",
        '\u{2082}' => "2",
        '\u{2083}' => "3",
        '\u{2084}' => "4",
        // Currency
        '\u{20AC}' => "EUR ",
        '\u{00A3}' => "GBP ",
        '\u{00A5}' => "JPY ",
        '\u{20B9}' => "INR ",
        '\u{20A9}' => "KRW ",
        '\u{20BD}' => "RUB ",
        '\u{00A2}' => "c",
        // Bullets and checkmarks
        '\u{2713}' | '\u{2714}' | '\u{2705}' => "[x]",
        '\u{2717}' | '\u{2718}' | '\u{274C}' => "[ ]",
        '\u{25CF}' | '\u{25AA}' | '\u{25E6}' | '\u{2023}' | '\u{2043}' => "\u{2022}",
        '\u{00A9}' => "(c)",
        '\u{00AE}' => "(R)",
        '\u{2122}' => "(TM)",
        _ => return None,
    };
    Some(s)
}

/// Replace technical symbols with ASCII spellings and strip accents from
/// Latin letters (`é` becomes `e`).
pub fn substitute_technical(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if let Some(rep) = substitution(ch) {
            out.push_str(rep);
            continue;
        }
        if ch.is_ascii() {
            out.push(ch);
            continue;
        }
        // Decompose and drop combining marks: accented letters keep their base.
        let owned = ch.to_string();
        let mut stripped = owned
            .nfd()
            .filter(|c| !is_combining_mark(*c))
            .peekable();
        if stripped.peek().is_none() {
            continue;
        }
        out.extend(stripped);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_and_operators() {
        assert_eq!(substitute_technical("a \u{2192} b"), "a -> b");
        assert_eq!(substitute_technical("x \u{2264} 5 \u{2260} y"), "x <= 5 != y");
        assert_eq!(substitute_technical("\u{00B1}3 \u{00D7} 2"), "+/-3 x 2");
    }

    #[test]
    fn fractions_and_superscripts() {
        assert_eq!(substitute_technical("\u{00BD} cup"), "1/2 cup");
        assert_eq!(substitute_technical("E = mc\u{00B2}"), "E = mc^2");
        assert_eq!(substitute_technical("H\u{2082}O"), "H2O");
    }

    #[test]
    fn currency() {
        assert_eq!(substitute_technical("\u{20AC}20"), "EUR 20");
        assert_eq!(substitute_technical("\u{00A3}5"), "GBP 5");
    }

    #[test]
    fn strips_accents() {
        assert_eq!(substitute_technical("caf\u{00E9} na\u{00EF}ve \u{00C5}ngstr\u{00F6}m"), "cafe naive Angstrom");
        assert_eq!(substitute_technical("e\u{0301}"), "e");
    }

    #[test]
    fn ascii_passes_through() {
        let s = "Plain (ascii) text: 1 + 2 = 3 | ok";
        assert_eq!(substitute_technical(s), s);
    }
}
