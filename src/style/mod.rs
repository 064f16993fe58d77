//! # Report Styling
//!
//! The `pdfStyling` block of the report metadata. Every knob has a default,
//! so partial JSON (or none at all) yields a usable report. Colors are
//! `#RGB`/`#RRGGBB` strings in JSON and RGB floats internally, because that
//! is what the PDF color operators want.

use serde::{Deserialize, Serialize};

use crate::model::PageSize;

/// An RGB color with channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RGB` or `#RRGGBB`. Returns `None` for anything else.
    pub fn parse_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        let (r, g, b) = match hex.len() {
            3 => (
                u8::from_str_radix(&hex[0..1].repeat(2), 16).ok()?,
                u8::from_str_radix(&hex[1..2].repeat(2), 16).ok()?,
                u8::from_str_radix(&hex[2..3].repeat(2), 16).ok()?,
            ),
            6 => (
                u8::from_str_radix(&hex[0..2], 16).ok()?,
                u8::from_str_radix(&hex[2..4], 16).ok()?,
                u8::from_str_radix(&hex[4..6], 16).ok()?,
            ),
            _ => return None,
        };
        Some(Self::from_bytes(r, g, b))
    }

    /// Like [`Color::parse_hex`] but never fails: bad input logs and yields black.
    pub fn hex(hex: &str) -> Self {
        Self::parse_hex(hex).unwrap_or_else(|| {
            tracing::warn!(color = hex, "unparseable color, falling back to black");
            Color::BLACK
        })
    }

    pub fn from_bytes(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
        }
    }

    pub fn to_bytes(self) -> [u8; 3] {
        [
            (self.r.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.g.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.b.clamp(0.0, 1.0) * 255.0).round() as u8,
        ]
    }
}

impl From<String> for Color {
    fn from(s: String) -> Self {
        Color::hex(&s)
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        let [r, g, b] = c.to_bytes();
        format!("#{:02X}{:02X}{:02X}", r, g, b)
    }
}

// ── Styling tree ────────────────────────────────────────────────

/// The complete styling configuration for one generation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PdfStyling {
    pub page: PageStyle,
    pub header: HeaderStyle,
    pub footer: FooterStyle,
    pub sections: SectionStyle,
    pub table: TableStyle,
    pub image: ImageStyle,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageStyle {
    pub size: PageSize,
    pub orientation: Orientation,
    pub margin_left: f64,
    pub margin_right: f64,
    /// Space reserved below the content-bottom bound for the footer.
    pub margin_bottom: f64,
    /// Gap between the header banner and the first line of content.
    pub content_top_gap: f64,
}

impl Default for PageStyle {
    fn default() -> Self {
        Self {
            size: PageSize::A4,
            orientation: Orientation::Portrait,
            margin_left: 40.0,
            margin_right: 40.0,
            margin_bottom: 48.0,
            content_top_gap: 18.0,
        }
    }
}

impl PageStyle {
    /// Page (width, height) in points after applying orientation.
    pub fn dimensions(&self) -> (f64, f64) {
        let (w, h) = self.size.dimensions();
        match self.orientation {
            Orientation::Portrait => (w.min(h), w.max(h)),
            Orientation::Landscape => (w.max(h), w.min(h)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeaderStyle {
    pub background_color: Color,
    pub text_color: Color,
    pub subtitle_color: Color,
    pub height: f64,
    pub title_font_size: f64,
    pub subtitle_font_size: f64,
    pub main_title_font_size: f64,
    pub main_title_color: Color,
}

impl Default for HeaderStyle {
    fn default() -> Self {
        Self {
            background_color: Color::from_bytes(0x1E, 0x3A, 0x5F),
            text_color: Color::WHITE,
            subtitle_color: Color::from_bytes(0xCB, 0xD5, 0xE1),
            height: 56.0,
            title_font_size: 16.0,
            subtitle_font_size: 9.0,
            main_title_font_size: 15.0,
            main_title_color: Color::from_bytes(0x1E, 0x3A, 0x5F),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FooterStyle {
    pub left_text: Option<String>,
    pub center_text: Option<String>,
    /// `{page}` and `{pages}` are substituted per page.
    pub right_text: Option<String>,
    pub font_size: f64,
    pub color: Color,
    /// Baseline distance from the bottom edge of the page.
    pub offset: f64,
    pub show_rule: bool,
    pub rule_color: Color,
}

impl Default for FooterStyle {
    fn default() -> Self {
        Self {
            left_text: None,
            center_text: None,
            right_text: Some("Page {page} of {pages}".to_string()),
            font_size: 8.0,
            color: Color::from_bytes(0x6B, 0x72, 0x80),
            offset: 24.0,
            show_rule: true,
            rule_color: Color::from_bytes(0xE5, 0xE7, 0xEB),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SectionStyle {
    pub title_font_size: f64,
    pub title_color: Color,
    pub rule_color: Color,
    pub header_height: f64,
    pub content_font_size: f64,
    /// Line height as a multiple of the font size.
    pub line_height: f64,
    pub text_color: Color,
    /// Gap left after each rendered section.
    pub spacing: f64,
}

impl Default for SectionStyle {
    fn default() -> Self {
        Self {
            title_font_size: 11.0,
            title_color: Color::from_bytes(0x1E, 0x3A, 0x5F),
            rule_color: Color::from_bytes(0xCB, 0xD5, 0xE1),
            header_height: 22.0,
            content_font_size: 10.0,
            line_height: 1.35,
            text_color: Color::from_bytes(0x1F, 0x29, 0x37),
            spacing: 14.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableStyle {
    pub header_background: Color,
    pub header_text_color: Color,
    pub header_font_size: f64,
    pub content_font_size: f64,
    pub text_color: Color,
    pub cell_padding: f64,
    pub border_color: Color,
    pub alternate_row_background: Option<Color>,
    /// Redraw the header row at the top of every continuation page.
    pub repeat_header: bool,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            header_background: Color::from_bytes(0x1E, 0x3A, 0x5F),
            header_text_color: Color::WHITE,
            header_font_size: 9.0,
            content_font_size: 9.0,
            text_color: Color::from_bytes(0x1F, 0x29, 0x37),
            cell_padding: 4.0,
            border_color: Color::from_bytes(0xCB, 0xD5, 0xE1),
            alternate_row_background: Some(Color::from_bytes(0xF8, 0xFA, 0xFC)),
            repeat_header: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Jpeg,
    Png,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFit {
    /// Letterbox inside the cell, preserving aspect ratio.
    #[default]
    Contain,
    /// Fill the cell, cropping the overflow, preserving aspect ratio.
    Cover,
    /// Fill the cell exactly, ignoring aspect ratio.
    Stretch,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageAlign {
    Start,
    #[default]
    Center,
    End,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageStyle {
    pub dpi: f64,
    pub format: ImageFormat,
    /// Encoder quality in `0.0..=1.0` (JPEG only).
    pub quality: f64,
    pub background_color: Color,
    pub fit: ImageFit,
    pub align: ImageAlign,
    pub grid_columns: usize,
    pub grid_rows: usize,
    pub gap: f64,
    /// Cell height as a fraction of cell width.
    pub cell_aspect: f64,
}

impl Default for ImageStyle {
    fn default() -> Self {
        Self {
            dpi: 150.0,
            format: ImageFormat::Jpeg,
            quality: 0.85,
            background_color: Color::WHITE,
            fit: ImageFit::Contain,
            align: ImageAlign::Center,
            grid_columns: 2,
            grid_rows: 3,
            gap: 10.0,
            cell_aspect: 0.75,
        }
    }
}
