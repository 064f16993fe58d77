//! Advance widths for the standard Helvetica faces, from the Adobe AFM files.
//!
//! Widths are in 1/1000 em for the printable ASCII range 0x20..=0x7E. The
//! oblique faces share their upright widths.

/// Glyph widths for one standard font face.
pub struct StandardFontMetrics {
    ascii: [u16; 95],
    fallback: u16,
}

#[rustfmt::skip]
pub(crate) static HELVETICA: StandardFontMetrics = StandardFontMetrics {
    ascii: [
        // space ! " # $ % & ' ( ) * + , - . /
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
        // 0-9
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        // : ; < = > ? @
        278, 278, 584, 584, 584, 556, 1015,
        // A-Z
        667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        // [ \ ] ^ _ `
        278, 278, 278, 469, 556, 333,
        // a-z
        556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
        556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
        // { | } ~
        334, 260, 334, 584,
    ],
    fallback: 556,
};

#[rustfmt::skip]
pub(crate) static HELVETICA_BOLD: StandardFontMetrics = StandardFontMetrics {
    ascii: [
        278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        333, 333, 584, 584, 584, 611, 975,
        722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        333, 278, 333, 584, 556, 333,
        556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
        611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
        389, 280, 389, 584,
    ],
    fallback: 611,
};

impl StandardFontMetrics {
    /// Width of `ch` in 1/1000 em.
    pub fn glyph_width(&self, ch: char) -> u16 {
        let cp = ch as u32;
        if (0x20..=0x7E).contains(&cp) {
            return self.ascii[(cp - 0x20) as usize];
        }
        match ch {
            '\u{2022}' => 350, // bullet
            '\u{00A0}' => self.ascii[0],
            '\u{00B0}' => 400, // degree
            '\u{00B7}' => 278,
            '\u{20AC}' => 556,
            '\u{00A3}' | '\u{00A5}' => 556,
            '\u{00A9}' | '\u{00AE}' => 737,
            _ => self.fallback,
        }
    }

    /// Width of `ch` in points at `font_size`.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        self.glyph_width(ch) as f64 * font_size / 1000.0
    }

    /// Width of `text` in points at `font_size`.
    pub fn measure_string(&self, text: &str, font_size: f64) -> f64 {
        text.chars().map(|ch| self.char_width(ch, font_size)).sum()
    }
}
