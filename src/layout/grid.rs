//! # Label/Value Grids
//!
//! `labelTopGrid` places items in a fixed number of equal columns.
//! `formGrid` gives each cell a span out of 24 units, so one row can mix a
//! wide cell with narrow ones. Both use the same row engine: every cell is
//! a bold label above a wrapped value, a row is as tall as its tallest
//! cell, and a row that would overflow moves to a new page where the
//! section title is repeated as a continuation.

use serde_json::Value;

use super::{Cursor, RenderContext};
use crate::font::StandardFont;
use crate::model::{FormGridContent, GridSpacing, LabelGridContent};
use crate::style::SectionStyle;
use crate::template::render_value;
use crate::text::{normalize, wrap, WrappedText};

/// Layout units across one `formGrid` row.
pub const GRID_UNITS: u32 = 24;
const DEFAULT_COLUMNS: usize = 2;
const GRID_LINE_HEIGHT: f64 = 1.25;

/// Spacing knobs with defaults filled in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSettings {
    pub column_gap: f64,
    pub row_gap: f64,
    pub label_font_size: f64,
    pub value_font_size: f64,
    pub label_value_spacing: f64,
    pub padding: f64,
}

impl GridSettings {
    pub fn resolve(spacing: &GridSpacing, sections: &SectionStyle) -> Self {
        Self {
            column_gap: spacing.column_gap.unwrap_or(10.0).max(0.0),
            row_gap: spacing.row_gap.unwrap_or(6.0).max(0.0),
            label_font_size: spacing.label_font_size.unwrap_or(8.0),
            value_font_size: spacing.value_font_size.unwrap_or(sections.content_font_size),
            label_value_spacing: spacing.label_value_spacing.unwrap_or(2.0),
            padding: spacing.padding.unwrap_or(4.0).max(0.0),
        }
    }
}

/// Cell widths for spans out of [`GRID_UNITS`].
///
/// The gaps between cells come off the row first; each unit is then
/// 1/24th of what is left. A missing span is an equal share of the row;
/// explicit spans are clamped to `1..=24`.
pub fn span_widths(spans: &[Option<u32>], available: f64, gap: f64) -> Vec<f64> {
    if spans.is_empty() {
        return Vec::new();
    }
    let usable = (available - gap * (spans.len() - 1) as f64).max(0.0);
    let unit = usable / GRID_UNITS as f64;
    let equal_share = GRID_UNITS as f64 / spans.len() as f64;
    spans
        .iter()
        .map(|span| match span {
            Some(s) => unit * (*s).clamp(1, GRID_UNITS) as f64,
            None => unit * equal_share,
        })
        .collect()
}

// ── Measurement ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct MeasuredCell {
    pub label: Option<WrappedText>,
    pub value: WrappedText,
    pub height: f64,
}

/// A cell placed in its row: offset from the content left edge and width.
#[derive(Debug, Clone)]
pub struct PlacedCell {
    pub x_offset: f64,
    pub width: f64,
    pub cell: MeasuredCell,
}

#[derive(Debug, Clone)]
pub struct GridRow {
    pub cells: Vec<PlacedCell>,
    /// The tallest cell; shorter cells leave whitespace below.
    pub height: f64,
}

pub fn measure_cell(label: &str, value: &str, width: f64, settings: &GridSettings) -> MeasuredCell {
    let inner = (width - 2.0 * settings.padding).max(1.0);
    let label = (!label.is_empty()).then(|| {
        wrap(
            label,
            StandardFont::HelveticaBold,
            settings.label_font_size,
            GRID_LINE_HEIGHT,
            inner,
        )
    });
    let value = wrap(
        value,
        StandardFont::Helvetica,
        settings.value_font_size,
        GRID_LINE_HEIGHT,
        inner,
    );
    let label_height = label
        .as_ref()
        .map_or(0.0, |l| l.height() + settings.label_value_spacing);
    let height = 2.0 * settings.padding + label_height + value.height();
    MeasuredCell {
        label,
        value,
        height,
    }
}

fn place_row(cells: Vec<(String, String)>, widths: &[f64], settings: &GridSettings) -> GridRow {
    let mut x_offset = 0.0;
    let mut placed = Vec::with_capacity(cells.len());
    for ((label, value), width) in cells.into_iter().zip(widths) {
        placed.push(PlacedCell {
            x_offset,
            width: *width,
            cell: measure_cell(&label, &value, *width, settings),
        });
        x_offset += width + settings.column_gap;
    }
    let height = placed.iter().map(|c| c.cell.height).fold(0.0, f64::max);
    GridRow {
        cells: placed,
        height,
    }
}

/// Measure a `labelTopGrid` into rows of `columnsCount` cells.
pub fn measure_label_grid(
    content: &LabelGridContent,
    data: &Value,
    width: f64,
    settings: &GridSettings,
) -> Vec<GridRow> {
    let columns = content.columns_count.unwrap_or(DEFAULT_COLUMNS).max(1);
    let widths = span_widths(&vec![None; columns], width, settings.column_gap);
    content
        .items
        .chunks(columns)
        .map(|chunk| {
            let cells = chunk
                .iter()
                .map(|item| (normalize(&item.label), render_value(&item.value, data)))
                .collect();
            place_row(cells, &widths, settings)
        })
        .collect()
}

/// Measure a `formGrid`, one grid row per input row.
pub fn measure_form_grid(
    content: &FormGridContent,
    data: &Value,
    width: f64,
    settings: &GridSettings,
) -> Vec<GridRow> {
    content
        .rows
        .iter()
        .filter(|row| !row.is_empty())
        .map(|row| {
            let spans: Vec<Option<u32>> = row.iter().map(|c| c.span).collect();
            let widths = span_widths(&spans, width, settings.column_gap);
            let cells = row
                .iter()
                .map(|cell| (normalize(&cell.label), render_value(&cell.value, data)))
                .collect();
            place_row(cells, &widths, settings)
        })
        .collect()
}

/// At least one item has a non-blank value.
pub fn label_grid_has_values(content: &LabelGridContent, data: &Value) -> bool {
    content
        .items
        .iter()
        .any(|item| !render_value(&item.value, data).is_empty())
}

/// At least one cell across all rows has a non-blank value.
pub fn form_grid_has_values(content: &FormGridContent, data: &Value) -> bool {
    content
        .rows
        .iter()
        .flatten()
        .any(|cell| !render_value(&cell.value, data).is_empty())
}

// ── Drawing ─────────────────────────────────────────────────────

/// Lay out measured rows. `continuation_title` is redrawn with a
/// continuation marker at the top of every page the grid breaks onto,
/// unless the row that opens the page needs the whole page to itself.
pub fn render(
    ctx: &mut RenderContext<'_>,
    cursor: Cursor,
    rows: &[GridRow],
    settings: &GridSettings,
    continuation_title: Option<&str>,
) -> Cursor {
    let label_color = ctx.styling.sections.title_color;
    let value_color = ctx.styling.sections.text_color;
    let x = ctx.frame.content_x();
    let title_height = ctx.section_header_height();
    let mut cursor = cursor;

    for (idx, row) in rows.iter().enumerate() {
        if idx > 0 {
            cursor = cursor.advance(settings.row_gap);
        }
        let placed = ctx.ensure_space(cursor, row.height);
        cursor = match continuation_title {
            Some(title) if placed.page_index != cursor.page_index && ctx.fits(placed, title_height + row.height) => {
                ctx.draw_section_title(placed, title, true)
            }
            _ => placed,
        };

        for placed_cell in &row.cells {
            let cell_x = x + placed_cell.x_offset + settings.padding;
            let inner = (placed_cell.width - 2.0 * settings.padding).max(1.0);
            let mut top = cursor.y + settings.padding;
            if let Some(label) = &placed_cell.cell.label {
                ctx.draw_wrapped(cursor.page_index, cell_x, top, inner, label, label_color);
                top += label.height() + settings.label_value_spacing;
            }
            ctx.draw_wrapped(cursor.page_index, cell_x, top, inner, &placed_cell.cell.value, value_color);
        }
        cursor = cursor.advance(row.height);
    }
    cursor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FormGridCell, GridItem};
    use crate::style::PdfStyling;
    use serde_json::json;

    fn settings() -> GridSettings {
        GridSettings::resolve(&GridSpacing::default(), &SectionStyle::default())
    }

    #[test]
    fn halves_leave_room_for_the_gap() {
        let widths = span_widths(&[Some(12), Some(12)], 500.0, 10.0);
        assert!((widths[0] - 245.0).abs() < 1e-9);
        assert!((widths[1] - 245.0).abs() < 1e-9);
    }

    #[test]
    fn quarter_and_three_quarters() {
        let widths = span_widths(&[Some(6), Some(18)], 515.28, 10.0);
        assert!((widths[1] / widths[0] - 3.0).abs() < 1e-9);
    }

    #[test]
    fn missing_spans_share_the_row() {
        let widths = span_widths(&[None, None, None], 320.0, 10.0);
        for w in &widths {
            assert!((w - 100.0).abs() < 1e-9);
        }
        let clamped = span_widths(&[Some(0), Some(99)], 250.0, 10.0);
        assert!((clamped[0] - 10.0).abs() < 1e-9);
        assert!((clamped[1] - 240.0).abs() < 1e-9);
    }

    #[test]
    fn defaults_resolve() {
        let s = settings();
        assert_eq!(s.column_gap, 10.0);
        assert_eq!(s.label_font_size, 8.0);
        assert_eq!(s.value_font_size, SectionStyle::default().content_font_size);
    }

    #[test]
    fn row_height_is_the_tallest_cell() {
        let content = LabelGridContent {
            items: vec![
                GridItem {
                    label: "Short".into(),
                    value: json!("x"),
                },
                GridItem {
                    label: "Long".into(),
                    value: json!("word ".repeat(80)),
                },
                GridItem {
                    label: "Next row".into(),
                    value: json!(1),
                },
            ],
            columns_count: Some(2),
            spacing: GridSpacing::default(),
        };
        let rows = measure_label_grid(&content, &json!({}), 400.0, &settings());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].cells.len(), 2);
        assert!(rows[0].cells[1].cell.height > rows[0].cells[0].cell.height);
        assert_eq!(rows[0].height, rows[0].cells[1].cell.height);
        assert!((rows[0].cells[1].x_offset - (rows[0].cells[0].width + 10.0)).abs() < 1e-9);
        // The lone cell of the last row keeps the column width.
        assert_eq!(rows[1].cells.len(), 1);
        assert!((rows[1].cells[0].width - rows[0].cells[0].width).abs() < 1e-9);
    }

    #[test]
    fn values_are_templates() {
        let content = LabelGridContent {
            items: vec![GridItem {
                label: "Who".into(),
                value: json!("{{person.name}}"),
            }],
            ..LabelGridContent::default()
        };
        let data = json!({ "person": { "name": "Ann" } });
        assert!(label_grid_has_values(&content, &data));
        assert!(!label_grid_has_values(&content, &json!({})));
    }

    #[test]
    fn form_grid_emptiness() {
        let blank = FormGridContent {
            rows: vec![vec![
                FormGridCell {
                    label: "A".into(),
                    value: json!("  "),
                    span: Some(12),
                },
                FormGridCell {
                    label: "B".into(),
                    value: Value::Null,
                    span: Some(12),
                },
            ]],
            spacing: GridSpacing::default(),
        };
        assert!(!form_grid_has_values(&blank, &json!({})));
        let mut filled = blank.clone();
        filled.rows[0][1].value = json!(false);
        assert!(form_grid_has_values(&filled, &json!({})));
    }

    #[test]
    fn breaking_rows_repeat_the_title() {
        let styling = PdfStyling::default();
        let data = json!({});
        let mut ctx = RenderContext::new(&styling, None, &data);
        let cursor = ctx.start_document();
        let content = FormGridContent {
            rows: (0..80)
                .map(|i| {
                    vec![FormGridCell {
                        label: format!("Field {}", i),
                        value: json!("value"),
                        span: None,
                    }]
                })
                .collect(),
            spacing: GridSpacing::default(),
        };
        let s = settings();
        let rows = measure_form_grid(&content, &data, ctx.frame.content_width(), &s);
        let end = render(&mut ctx, cursor, &rows, &s, Some("Details"));
        assert!(end.page_index >= 1);
        let doc = ctx.finish();
        assert!(doc.text_lines(0).iter().all(|l| !l.text.contains("(CONT.)")));
        for idx in 1..doc.page_count() {
            assert!(doc.text_lines(idx).iter().any(|l| l.text == "DETAILS (CONT.)"));
        }
        assert!(doc.find_text("Field 79").is_some());
    }

    fn single_field_rows(count: usize, data: &Value, width: f64) -> Vec<GridRow> {
        let content = FormGridContent {
            rows: (0..count)
                .map(|i| {
                    vec![FormGridCell {
                        label: format!("Field {}", i),
                        value: json!("value"),
                        span: None,
                    }]
                })
                .collect(),
            spacing: GridSpacing::default(),
        };
        measure_form_grid(&content, data, width, &settings())
    }

    #[test]
    fn continuation_title_never_pushes_rows_past_the_bottom() {
        let styling = PdfStyling::default();
        let data = json!({});
        let mut ctx = RenderContext::new(&styling, None, &data);
        let cursor = ctx.start_document();
        let mut rows = single_field_rows(3, &data, ctx.frame.content_width());
        // Fits on an empty page, but not below a repeated title.
        rows[1].height = ctx.frame.page_capacity() - ctx.section_header_height() / 2.0;
        let end = render(&mut ctx, cursor, &rows, &settings(), Some("Details"));
        assert_eq!(end.page_index, 2);
        let doc = ctx.finish();
        let bottom = doc.frame.content_bottom;
        for page in &doc.pages {
            for el in &page.elements {
                assert!(el.y + el.height <= bottom + 1e-6, "element at {} runs past {}", el.y, bottom);
            }
        }
        let (tall_page, tall) = doc.find_text("Field 1").unwrap();
        assert_eq!(tall_page, 1);
        assert!(tall.y < doc.frame.content_top + 20.0);
        assert!(doc.text_lines(1).iter().all(|l| !l.text.contains("(CONT.)")));
        assert!(doc.text_lines(2).iter().any(|l| l.text == "DETAILS (CONT.)"));
    }
}
