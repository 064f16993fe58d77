//! # Table Layout
//!
//! Tables are laid out row by row. Each row's height is the tallest of its
//! wrapped cells plus padding; rows never split across pages. A row that
//! does not fit moves to a new page, and the header row is redrawn there
//! when `repeatHeader` is set. Columns share the content width equally.

use serde_json::Value;

use super::{Cursor, RenderContext};
use crate::font::StandardFont;
use crate::markdown::ExtractedTable;
use crate::model::{TableColumn, TableContent};
use crate::path;
use crate::style::TableStyle;
use crate::template::value_to_display;
use crate::text::{normalize, wrap, WrappedText};

/// Line height factor for table cell text.
const TABLE_LINE_HEIGHT: f64 = 1.25;

/// Table text resolved to strings, ready to measure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableGrid {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableGrid {
    /// Resolve a `table` section against gadget data.
    pub fn from_content(content: &TableContent, data: &Value) -> Self {
        Self::from_rows(&content.columns, dataset(content, data))
    }

    /// A table lifted out of `text` markdown.
    pub fn from_extracted(table: &ExtractedTable) -> Self {
        Self::from_rows(&table.columns, &table.data)
    }

    /// Resolve each column key as a path against each row object.
    pub fn from_rows(columns: &[TableColumn], rows: &[Value]) -> Self {
        let headers = columns.iter().map(|c| normalize(&c.header)).collect();
        let rows = rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|c| {
                        path::resolve(row, &c.key)
                            .map(|v| normalize(&value_to_display(v)))
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .collect();
        Self { headers, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The rows of a table section: `dataPath` when it names an array,
/// otherwise inline `data`, otherwise nothing.
///
/// A `dataPath` that is missing or not an array falls back to inline
/// `data` on purpose, so metadata can carry sample rows for gadgets
/// that have not been filled in yet.
pub fn dataset<'v>(content: &'v TableContent, data: &'v Value) -> &'v [Value] {
    if let Some(Value::Array(rows)) = content.data_path.as_deref().and_then(|p| path::resolve(data, p)) {
        return rows;
    }
    content.data.as_deref().unwrap_or(&[])
}

// ── Measurement ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct MeasuredRow {
    pub cells: Vec<WrappedText>,
    pub height: f64,
}

#[derive(Debug, Clone)]
pub struct MeasuredTable {
    pub widths: Vec<f64>,
    pub header: MeasuredRow,
    pub rows: Vec<MeasuredRow>,
}

impl MeasuredTable {
    /// Height that must stay together with whatever precedes the table:
    /// the header row plus the first body row.
    pub fn lead_height(&self) -> f64 {
        self.header.height + self.rows.first().map_or(0.0, |r| r.height)
    }
}

/// Wrap every cell of a row and take the tallest as the row height.
pub fn measure_row(
    cells: &[String],
    widths: &[f64],
    font: StandardFont,
    font_size: f64,
    padding: f64,
) -> MeasuredRow {
    let wrapped: Vec<WrappedText> = widths
        .iter()
        .enumerate()
        .map(|(i, w)| {
            let text = cells.get(i).map(String::as_str).unwrap_or("");
            wrap(text, font, font_size, TABLE_LINE_HEIGHT, (w - 2.0 * padding).max(1.0))
        })
        .collect();
    let tallest = wrapped.iter().map(WrappedText::height).fold(0.0, f64::max);
    MeasuredRow {
        cells: wrapped,
        height: tallest + 2.0 * padding,
    }
}

pub fn measure(grid: &TableGrid, style: &TableStyle, width: f64) -> MeasuredTable {
    let columns = grid.headers.len().max(1);
    let widths = vec![width / columns as f64; grid.headers.len()];
    let header = measure_row(
        &grid.headers,
        &widths,
        StandardFont::HelveticaBold,
        style.header_font_size,
        style.cell_padding,
    );
    let rows = grid
        .rows
        .iter()
        .map(|r| {
            measure_row(
                r,
                &widths,
                StandardFont::Helvetica,
                style.content_font_size,
                style.cell_padding,
            )
        })
        .collect();
    MeasuredTable {
        widths,
        header,
        rows,
    }
}

// ── Drawing ─────────────────────────────────────────────────────

/// Lay out a table at the cursor and return the cursor below it.
pub fn render(ctx: &mut RenderContext<'_>, cursor: Cursor, grid: &TableGrid) -> Cursor {
    if grid.headers.is_empty() {
        return cursor;
    }
    let style = ctx.styling.table.clone();
    let measured = measure(grid, &style, ctx.frame.content_width());

    let mut cursor = ctx.ensure_space(cursor, measured.lead_height());
    cursor = draw_row(ctx, cursor, &measured.widths, &measured.header, &style, RowKind::Header);

    for (idx, row) in measured.rows.iter().enumerate() {
        let placed = ctx.ensure_space(cursor, row.height);
        if placed.page_index != cursor.page_index && style.repeat_header {
            cursor = draw_row(ctx, placed, &measured.widths, &measured.header, &style, RowKind::Header);
        } else {
            cursor = placed;
        }
        let kind = if idx % 2 == 1 { RowKind::Alternate } else { RowKind::Body };
        cursor = draw_row(ctx, cursor, &measured.widths, row, &style, kind);
    }
    cursor
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowKind {
    Header,
    Body,
    Alternate,
}

fn draw_row(
    ctx: &mut RenderContext<'_>,
    cursor: Cursor,
    widths: &[f64],
    row: &MeasuredRow,
    style: &TableStyle,
    kind: RowKind,
) -> Cursor {
    let (fill, color) = match kind {
        RowKind::Header => (Some(style.header_background), style.header_text_color),
        RowKind::Body => (None, style.text_color),
        RowKind::Alternate => (style.alternate_row_background, style.text_color),
    };
    let mut x = ctx.frame.content_x();
    for (width, cell) in widths.iter().zip(&row.cells) {
        ctx.stroke_rect(cursor.page_index, x, cursor.y, *width, row.height, fill, style.border_color);
        ctx.draw_wrapped(
            cursor.page_index,
            x + style.cell_padding,
            cursor.y + style.cell_padding,
            width - 2.0 * style.cell_padding,
            cell,
            color,
        );
        x += width;
    }
    cursor.advance(row.height)
}
