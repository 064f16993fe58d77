//! # Report Model
//!
//! The input representation for the report engine: static report metadata
//! (header, styling, sections) produced by the form builder, plus an
//! arbitrary JSON tree of gadget data that sections address by path.
//!
//! Section content is a closed sum type. Dispatch over it is an exhaustive
//! `match`, so a new content kind is a compile error everywhere it matters
//! instead of a silent fallthrough. Tags the engine does not know still
//! deserialize (into [`SectionContent::Unknown`]) so one bad section never
//! prevents the rest of the report from rendering.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::style::{ImageFit, ImageFormat, PdfStyling};

/// Gadget data: the resolved runtime field values, read-only to the engine.
pub type GadgetData = Value;

/// Everything needed to lay out one report. Immutable per generation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    #[serde(default)]
    pub header: Option<ReportHeader>,
    #[serde(default)]
    pub pdf_styling: PdfStyling,
    #[serde(default)]
    pub sections: Vec<Section>,
}

/// Text shown in the page header banner and the first-page title line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportHeader {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub company_name: Option<String>,
    pub address: Option<String>,
}

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub enum PageSize {
    A3,
    #[default]
    A4,
    A5,
    Letter,
    Legal,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in points, portrait.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A3 => (841.89, 1190.55),
            PageSize::A4 => (595.28, 841.89),
            PageSize::A5 => (419.53, 595.28),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// One titled block of report content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Only sections with this set to `true` are rendered.
    #[serde(default)]
    pub include_in_pdf: bool,
    /// Sort key. Ties keep their input order.
    #[serde(default)]
    pub order: f64,
    /// Suppress the section title banner.
    #[serde(default)]
    pub hide_header: bool,
    pub content: SectionContent,
}

/// What a section draws and how it is measured.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SectionContent {
    /// Interpolated prose; markdown is flattened and pipe tables are drawn
    /// as real tables after the prose.
    #[serde(rename = "text")]
    Text(TextContent),
    /// Markdown rendered line by line with headings, lists and tables kept.
    #[serde(rename = "rawtext")]
    RawText(TextContent),
    #[serde(rename = "table")]
    Table(TableContent),
    #[serde(rename = "image")]
    Image(ImageContent),
    #[serde(rename = "labelTopGrid")]
    LabelTopGrid(LabelGridContent),
    #[serde(rename = "formGrid")]
    FormGrid(FormGridContent),
    #[serde(other)]
    Unknown,
}

impl SectionContent {
    pub fn kind_name(&self) -> &'static str {
        match self {
            SectionContent::Text(_) => "text",
            SectionContent::RawText(_) => "rawtext",
            SectionContent::Table(_) => "table",
            SectionContent::Image(_) => "image",
            SectionContent::LabelTopGrid(_) => "labelTopGrid",
            SectionContent::FormGrid(_) => "formGrid",
            SectionContent::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContent {
    #[serde(default)]
    pub template: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableColumn {
    pub header: String,
    /// Path resolved against each row object (`name`, `address.city`, ...).
    pub key: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableContent {
    #[serde(default)]
    pub columns: Vec<TableColumn>,
    #[serde(default)]
    pub data: Option<Vec<Value>>,
    #[serde(default)]
    pub data_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageContent {
    #[serde(default)]
    pub data: Option<Vec<Value>>,
    #[serde(default)]
    pub data_path: Option<String>,
    #[serde(default)]
    pub fit: Option<ImageFit>,
    #[serde(default)]
    pub format: Option<ImageFormat>,
    #[serde(default)]
    pub quality: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GridItem {
    #[serde(default)]
    pub label: String,
    /// Strings are interpolated as templates; other JSON is stringified.
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelGridContent {
    #[serde(default)]
    pub items: Vec<GridItem>,
    pub columns_count: Option<usize>,
    #[serde(flatten)]
    pub spacing: GridSpacing,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormGridCell {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub value: Value,
    /// Width in 24ths of the row. Defaults to an equal share of the row.
    #[serde(default)]
    pub span: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormGridContent {
    #[serde(default)]
    pub rows: Vec<Vec<FormGridCell>>,
    #[serde(flatten)]
    pub spacing: GridSpacing,
}

/// Spacing and font-size knobs shared by both grid kinds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSpacing {
    pub column_gap: Option<f64>,
    pub row_gap: Option<f64>,
    pub label_font_size: Option<f64>,
    pub value_font_size: Option<f64>,
    pub label_value_spacing: Option<f64>,
    pub padding: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_defaults() {
        let section: Section =
            serde_json::from_str(r#"{ "content": { "type": "text", "template": "hi" } }"#).unwrap();
        assert!(!section.include_in_pdf);
        assert!(!section.hide_header);
        assert_eq!(section.order, 0.0);
        assert!(matches!(section.content, SectionContent::Text(ref t) if t.template == "hi"));
    }

    #[test]
    fn unknown_content_type_deserializes() {
        let section: Section = serde_json::from_str(
            r#"{ "id": "x", "includeInPdf": true, "content": { "type": "signature" } }"#,
        )
        .unwrap();
        assert!(matches!(section.content, SectionContent::Unknown));
        assert_eq!(section.content.kind_name(), "unknown");
    }

    #[test]
    fn table_content_fields() {
        let content: SectionContent = serde_json::from_str(
            r#"{ "type": "table", "columns": [{ "header": "Name", "key": "name" }], "dataPath": "people" }"#,
        )
        .unwrap();
        match content {
            SectionContent::Table(t) => {
                assert_eq!(t.columns.len(), 1);
                assert_eq!(t.data_path.as_deref(), Some("people"));
                assert!(t.data.is_none());
            }
            other => panic!("expected table, got {}", other.kind_name()),
        }
    }

    #[test]
    fn grid_spacing_is_flattened() {
        let content: SectionContent = serde_json::from_str(
            r#"{ "type": "labelTopGrid", "columnsCount": 3, "columnGap": 12, "labelFontSize": 7,
                 "items": [{ "label": "A", "value": 1 }] }"#,
        )
        .unwrap();
        match content {
            SectionContent::LabelTopGrid(g) => {
                assert_eq!(g.columns_count, Some(3));
                assert_eq!(g.spacing.column_gap, Some(12.0));
                assert_eq!(g.spacing.label_font_size, Some(7.0));
                assert_eq!(g.items[0].value, serde_json::json!(1));
            }
            other => panic!("expected labelTopGrid, got {}", other.kind_name()),
        }
    }

    #[test]
    fn form_grid_rows() {
        let content: SectionContent = serde_json::from_str(
            r#"{ "type": "formGrid", "rows": [[{ "label": "A", "value": "x", "span": 6 }, { "label": "B", "value": "y" }]] }"#,
        )
        .unwrap();
        match content {
            SectionContent::FormGrid(g) => {
                assert_eq!(g.rows[0][0].span, Some(6));
                assert_eq!(g.rows[0][1].span, None);
            }
            other => panic!("expected formGrid, got {}", other.kind_name()),
        }
    }

    #[test]
    fn custom_page_size() {
        let size: PageSize =
            serde_json::from_str(r#"{ "Custom": { "width": 300, "height": 400 } }"#).unwrap();
        assert_eq!(size.dimensions(), (300.0, 400.0));
    }
}
