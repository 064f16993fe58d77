//! # Text Layout
//!
//! Line breaking for report text. Break opportunities come from UAX#14
//! (via `unicode-linebreak`); lines are filled greedily against measured
//! glyph widths of the standard fonts. A word wider than the whole line is
//! force-broken between characters rather than allowed to overflow.
//!
//! Measuring is separate from drawing: [`wrap`] only computes lines and
//! heights, so renderers can decide page breaks before committing anything.

pub mod glyphs;
pub mod normalize;

pub use glyphs::substitute_technical;
pub use normalize::normalize;

use unicode_linebreak::{linebreaks, BreakOpportunity};

use crate::font::StandardFont;

/// A measured block of wrapped lines.
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedText {
    pub lines: Vec<String>,
    pub font: StandardFont,
    pub font_size: f64,
    /// Distance between consecutive baselines.
    pub line_height: f64,
}

impl WrappedText {
    /// Total height of the block.
    pub fn height(&self) -> f64 {
        self.lines.len() as f64 * self.line_height
    }
}

/// Wrap `text` to `max_width` and measure it.
pub fn wrap(
    text: &str,
    font: StandardFont,
    font_size: f64,
    line_height_factor: f64,
    max_width: f64,
) -> WrappedText {
    WrappedText {
        lines: break_into_lines(text, font, font_size, max_width),
        font,
        font_size,
        line_height: font_size * line_height_factor,
    }
}

/// Break a string into lines that fit within `max_width`.
///
/// Explicit newlines always break. An empty input yields one empty line so
/// that callers reserve at least a line of height for it.
pub fn break_into_lines(
    text: &str,
    font: StandardFont,
    font_size: f64,
    max_width: f64,
) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        break_paragraph(paragraph, font, font_size, max_width, &mut lines);
    }
    lines
}

fn break_paragraph(
    paragraph: &str,
    font: StandardFont,
    font_size: f64,
    max_width: f64,
    lines: &mut Vec<String>,
) {
    if paragraph.is_empty() {
        lines.push(String::new());
        return;
    }

    let mut current = String::new();
    let mut start = 0;
    for (idx, opportunity) in linebreaks(paragraph) {
        let segment = &paragraph[start..idx];
        start = idx;
        if segment.is_empty() {
            continue;
        }

        let candidate = format!("{}{}", current, segment);
        if font.measure(candidate.trim_end(), font_size) <= max_width {
            current = candidate;
        } else {
            if !current.trim().is_empty() {
                lines.push(current.trim_end().to_string());
            }
            current = String::new();
            if font.measure(segment.trim_end(), font_size) <= max_width {
                current.push_str(segment);
            } else {
                current = force_break(segment, font, font_size, max_width, lines);
            }
        }

        if opportunity == BreakOpportunity::Mandatory && idx < paragraph.len() {
            lines.push(std::mem::take(&mut current).trim_end().to_string());
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current.trim_end().to_string());
    }
}

/// Split an over-long word between characters. Full lines are pushed;
/// the unfinished tail is returned to continue filling.
fn force_break(
    word: &str,
    font: StandardFont,
    font_size: f64,
    max_width: f64,
    lines: &mut Vec<String>,
) -> String {
    let mut current = String::new();
    let mut width = 0.0;
    for ch in word.chars() {
        let w = font.metrics().char_width(ch, font_size);
        if width + w > max_width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            width = 0.0;
        }
        current.push(ch);
        width += w;
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    const F: StandardFont = StandardFont::Helvetica;

    #[test]
    fn single_line_fits() {
        let lines = break_into_lines("Hello world", F, 12.0, 500.0);
        assert_eq!(lines, vec!["Hello world"]);
    }

    #[test]
    fn breaks_at_spaces() {
        let lines = break_into_lines("alpha beta gamma delta", F, 12.0, 70.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(F.measure(line, 12.0) <= 70.0, "line too wide: {:?}", line);
            assert!(!line.ends_with(' '));
        }
        assert_eq!(lines.join(" "), "alpha beta gamma delta");
    }

    #[test]
    fn explicit_newlines_break() {
        let lines = break_into_lines("one\ntwo\n\nthree", F, 12.0, 500.0);
        assert_eq!(lines, vec!["one", "two", "", "three"]);
    }

    #[test]
    fn empty_string_is_one_empty_line() {
        assert_eq!(break_into_lines("", F, 12.0, 100.0), vec![String::new()]);
    }

    #[test]
    fn long_word_is_force_broken() {
        let word = "x".repeat(200);
        let lines = break_into_lines(&word, F, 10.0, 100.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(F.measure(line, 10.0) <= 100.0 + 1e-9);
        }
        assert_eq!(lines.concat(), word);
    }

    #[test]
    fn wrapped_height() {
        let wrapped = wrap("a\nb\nc", F, 10.0, 1.5, 200.0);
        assert_eq!(wrapped.lines.len(), 3);
        assert!((wrapped.height() - 45.0).abs() < 1e-9);
    }
}
