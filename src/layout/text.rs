//! # Text Sections
//!
//! Two renderers share this module:
//!
//! - `text`: the template is interpolated and flattened by the markdown
//!   sanitizer. The prose is drawn as one block, which moves to a fresh page
//!   rather than starting mid-page and spilling over. Prose that cannot
//!   share a page with its title flows line by line from where the title
//!   leaves off. Pipe tables lifted out of the markdown are drawn after the
//!   prose as real tables.
//! - `rawtext`: the markdown keeps its structure. Each block (heading,
//!   paragraph, list item, table, blank line) is measured and placed in
//!   order, with technical notation spelled out in ASCII first.

use serde_json::Value;

use super::table::{self, TableGrid};
use super::{baseline_offset, Cursor, PageFrame, RenderContext, TextAlign};
use crate::font::StandardFont;
use crate::markdown::{parse_blocks, sanitize, Block};
use crate::model::TextContent;
use crate::style::PdfStyling;
use crate::template::{interpolate, interpolate_raw};
use crate::text::{normalize, substitute_technical, wrap, WrappedText};

/// Vertical gap between prose and a table, or between consecutive tables.
const TABLE_GAP: f64 = 6.0;
/// Left indent of list item text; the marker sits in this gutter.
const LIST_INDENT: f64 = 14.0;

// ── text ────────────────────────────────────────────────────────

/// A `text` section after interpolation and sanitizing.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedText {
    pub prose: String,
    pub tables: Vec<TableGrid>,
}

impl PreparedText {
    pub fn new(content: &TextContent, data: &Value) -> Self {
        let sanitized = sanitize(&interpolate(&content.template, data));
        Self {
            prose: sanitized.text,
            tables: sanitized.tables.iter().map(TableGrid::from_extracted).collect(),
        }
    }

    fn wrapped(&self, styling: &PdfStyling, frame: &PageFrame) -> Option<WrappedText> {
        if self.prose.is_empty() {
            return None;
        }
        let ss = &styling.sections;
        Some(wrap(
            &self.prose,
            StandardFont::Helvetica,
            ss.content_font_size,
            ss.line_height,
            frame.content_width(),
        ))
    }

    /// Height that must fit below the section title: the whole prose
    /// block when title and block fit on one page, otherwise its first line.
    pub fn lead_height(&self, styling: &PdfStyling, frame: &PageFrame, title_height: f64) -> f64 {
        match self.wrapped(styling, frame) {
            Some(w) if fits_below_title(&w, frame, title_height) => w.height(),
            Some(w) => w.line_height,
            None => self
                .tables
                .first()
                .map_or(0.0, |t| table::measure(t, &styling.table, frame.content_width()).lead_height()),
        }
    }
}

fn fits_below_title(wrapped: &WrappedText, frame: &PageFrame, title_height: f64) -> bool {
    wrapped.height() <= frame.page_capacity() - title_height
}

/// Draw a `text` section below its title. `title_height` is the space the
/// title took directly above `cursor` (zero for hidden titles).
pub fn render_text(ctx: &mut RenderContext<'_>, cursor: Cursor, prepared: &PreparedText, title_height: f64) -> Cursor {
    let mut cursor = cursor;
    let (x, width) = (ctx.frame.content_x(), ctx.frame.content_width());
    let color = ctx.styling.sections.text_color;

    let prose_drawn = if let Some(wrapped) = prepared.wrapped(ctx.styling, &ctx.frame) {
        // Moving the block would leave the title behind: either the section
        // already starts at the page top, or no page could hold both.
        let section_top = Cursor {
            y: cursor.y - title_height,
            ..cursor
        };
        let split_here = ctx.at_page_top(section_top) || !fits_below_title(&wrapped, &ctx.frame, title_height);
        cursor = if split_here {
            ctx.flow_wrapped_split(cursor, x, width, &wrapped, color)
        } else {
            ctx.flow_wrapped(cursor, x, width, &wrapped, color)
        };
        true
    } else {
        false
    };

    for (idx, grid) in prepared.tables.iter().enumerate() {
        if prose_drawn || idx > 0 {
            cursor = cursor.advance(TABLE_GAP);
        }
        cursor = table::render(ctx, cursor, grid);
    }
    cursor
}

// ── rawtext ─────────────────────────────────────────────────────

/// Interpolate, spell out technical symbols, normalize, then split into blocks.
pub fn prepare_rawtext(content: &TextContent, data: &Value) -> Vec<Block> {
    let raw = interpolate_raw(&content.template, data);
    parse_blocks(&normalize(&substitute_technical(&raw)))
}

fn heading_size(base: f64, level: u8) -> f64 {
    base + 2.0 * f64::from(4u8.saturating_sub(level.clamp(1, 3)))
}

/// Height of the first block, which must fit below the section title.
pub fn rawtext_lead_height(blocks: &[Block], styling: &PdfStyling, frame: &PageFrame) -> f64 {
    let ss = &styling.sections;
    let line = ss.content_font_size * ss.line_height;
    match blocks.iter().find(|b| !matches!(b, Block::Blank)) {
        Some(Block::Heading { level, text }) => {
            let size = heading_size(ss.content_font_size, *level);
            wrap(text, StandardFont::HelveticaBold, size, ss.line_height, frame.content_width()).height()
        }
        Some(Block::Table { header, rows }) => {
            let grid = TableGrid {
                headers: header.clone(),
                rows: rows.clone(),
            };
            table::measure(&grid, &styling.table, frame.content_width()).lead_height()
        }
        Some(_) => line,
        None => 0.0,
    }
}

pub fn render_rawtext(ctx: &mut RenderContext<'_>, cursor: Cursor, blocks: &[Block]) -> Cursor {
    let ss = ctx.styling.sections.clone();
    let (x, width) = (ctx.frame.content_x(), ctx.frame.content_width());
    let mut cursor = cursor;

    for block in blocks {
        match block {
            Block::Heading { level, text } => {
                let size = heading_size(ss.content_font_size, *level);
                if !ctx.at_page_top(cursor) {
                    cursor = cursor.advance(size * 0.4);
                }
                let wrapped = wrap(text, StandardFont::HelveticaBold, size, ss.line_height, width);
                cursor = ctx.ensure_space(cursor, wrapped.height());
                cursor = ctx.flow_wrapped(cursor, x, width, &wrapped, ss.title_color);
            }
            Block::Paragraph(text) => {
                let wrapped = wrap(text, StandardFont::Helvetica, ss.content_font_size, ss.line_height, width);
                cursor = ctx.flow_wrapped(cursor, x, width, &wrapped, ss.text_color);
            }
            Block::ListItem { marker, text } => {
                let wrapped = wrap(
                    text,
                    StandardFont::Helvetica,
                    ss.content_font_size,
                    ss.line_height,
                    width - LIST_INDENT,
                );
                cursor = ctx.ensure_space(cursor, wrapped.height());
                let baseline = cursor.y + baseline_offset(wrapped.font_size, wrapped.line_height);
                let prefix = marker.prefix();
                let marker_line = ctx.single_line(
                    x,
                    LIST_INDENT,
                    baseline,
                    prefix.trim_end(),
                    StandardFont::Helvetica,
                    ss.content_font_size,
                    TextAlign::Left,
                );
                ctx.push_text(cursor.page_index, vec![marker_line], ss.text_color);
                cursor = ctx.flow_wrapped(cursor, x + LIST_INDENT, width - LIST_INDENT, &wrapped, ss.text_color);
            }
            Block::Blank => {
                if !ctx.at_page_top(cursor) {
                    cursor = cursor.advance(ss.content_font_size * 0.6);
                }
            }
            Block::Table { header, rows } => {
                let grid = TableGrid {
                    headers: header.clone(),
                    rows: rows.clone(),
                };
                if !ctx.at_page_top(cursor) {
                    cursor = cursor.advance(TABLE_GAP / 2.0);
                }
                cursor = table::render(ctx, cursor, &grid);
                cursor = cursor.advance(TABLE_GAP / 2.0);
            }
        }
    }
    cursor
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn content(template: &str) -> TextContent {
        TextContent {
            template: template.to_string(),
        }
    }

    #[test]
    fn text_extracts_tables_after_interpolation() {
        let data = json!({ "qty": 3 });
        let prepared = PreparedText::new(
            &content("Summary for **site**\n\n| Item | Qty |\n|---|---|\n| Bolt | {{qty}} |"),
            &data,
        );
        assert_eq!(prepared.prose, "Summary for site");
        assert_eq!(prepared.tables.len(), 1);
        assert_eq!(prepared.tables[0].headers, vec!["Item", "Qty"]);
        assert_eq!(prepared.tables[0].rows, vec![vec!["Bolt".to_string(), "3".to_string()]]);
    }

    #[test]
    fn text_fits_in_place() {
        let styling = PdfStyling::default();
        let data = json!({});
        let mut ctx = RenderContext::new(&styling, None, &data);
        let start = ctx.start_document();
        let prepared = PreparedText::new(&content("one\ntwo"), &data);
        let end = render_text(&mut ctx, start, &prepared, 0.0);
        let line = styling.sections.content_font_size * styling.sections.line_height;
        assert_eq!(end.page_index, 0);
        assert!((end.y - start.y - 2.0 * line).abs() < 1e-9);
    }

    #[test]
    fn text_that_does_not_fit_moves_whole() {
        let styling = PdfStyling::default();
        let data = json!({});
        let mut ctx = RenderContext::new(&styling, None, &data);
        let start = ctx.start_document();
        let low = Cursor {
            page_index: 0,
            y: ctx.frame.content_bottom - 20.0,
        };
        let prepared = PreparedText::new(&content("alpha\nbeta\ngamma"), &data);
        let end = render_text(&mut ctx, low, &prepared, 0.0);
        assert_eq!(end.page_index, 1);
        let doc = ctx.finish();
        let (page, line) = doc.find_text("alpha").unwrap();
        assert_eq!(page, 1);
        assert!(line.y > doc.frame.content_top);
        assert!(doc.text_lines(0).iter().all(|l| l.text != "alpha"));
        assert!(start.y < low.y);
    }

    #[test]
    fn oversized_text_flows() {
        let styling = PdfStyling::default();
        let data = json!({});
        let mut ctx = RenderContext::new(&styling, None, &data);
        let start = ctx.start_document();
        let body = (0..200).map(|i| format!("line {}", i)).collect::<Vec<_>>().join("\n");
        let prepared = PreparedText::new(&content(&body), &data);
        assert!(prepared.lead_height(&styling, &ctx.frame, 0.0) < 20.0);
        let end = render_text(&mut ctx, start, &prepared, 0.0);
        assert!(end.page_index >= 2);
        let doc = ctx.finish();
        assert_eq!(doc.find_text("line 0").map(|(p, _)| p), Some(0));
        assert!(doc.find_text("line 199").is_some());
    }

    #[test]
    fn rawtext_substitutes_and_parses() {
        let data = json!({ "t": "x \u{2264} 5" });
        let blocks = prepare_rawtext(&content("# Caf\u{00E9}\n\n- {{t}}\n1) \u{00BD} done"), &data);
        assert_eq!(
            blocks,
            vec![
                Block::Heading { level: 1, text: "Cafe".into() },
                Block::Blank,
                Block::ListItem {
                    marker: crate::markdown::ListMarker::Bullet,
                    text: "x <= 5".into()
                },
                Block::ListItem {
                    marker: crate::markdown::ListMarker::Numbered("1".into()),
                    text: "1/2 done".into()
                },
            ]
        );
    }

    #[test]
    fn rawtext_draws_every_block() {
        let styling = PdfStyling::default();
        let data = json!({});
        let mut ctx = RenderContext::new(&styling, None, &data);
        let start = ctx.start_document();
        let blocks = prepare_rawtext(
            &content("## Findings\nPlain *line*\n- first\n2. second\n\n| K | V |\n|---|---|\n| a | b |"),
            &data,
        );
        let end = render_rawtext(&mut ctx, start, &blocks);
        assert!(end.y > start.y);
        let doc = ctx.finish();
        for needle in ["Findings", "Plain line", "\u{2022}", "first", "2.", "second", "K", "b"] {
            assert!(doc.find_text(needle).is_some(), "missing {:?}", needle);
        }
    }

    #[test]
    fn heading_sizes_decrease() {
        assert_eq!(heading_size(10.0, 1), 16.0);
        assert_eq!(heading_size(10.0, 2), 14.0);
        assert_eq!(heading_size(10.0, 3), 12.0);
    }
}
