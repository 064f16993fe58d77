//! # Fonts
//!
//! Reports are drawn with the standard Helvetica family, which every PDF
//! viewer ships and which needs no embedding. The price is a fixed glyph
//! set (WinAnsi), which is why all text goes through the normalizer first.

pub mod metrics;

pub use metrics::StandardFontMetrics;

/// The standard faces the report engine draws with. Body text is
/// regular; titles, labels and table headers are bold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
}

impl StandardFont {
    /// The PDF /BaseFont name for this face.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
        }
    }

    pub fn metrics(&self) -> &'static StandardFontMetrics {
        match self {
            Self::Helvetica => &metrics::HELVETICA,
            Self::HelveticaBold => &metrics::HELVETICA_BOLD,
        }
    }

    /// Measure the width of a string in points.
    pub fn measure(&self, text: &str, font_size: f64) -> f64 {
        self.metrics().measure_string(text, font_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_font_names() {
        assert_eq!(StandardFont::Helvetica.pdf_name(), "Helvetica");
        assert_eq!(StandardFont::HelveticaBold.pdf_name(), "Helvetica-Bold");
    }

    #[test]
    fn bold_measures_wider() {
        let regular = StandardFont::Helvetica.measure("report", 10.0);
        let bold = StandardFont::HelveticaBold.measure("report", 10.0);
        assert!(bold > regular);
    }
}
