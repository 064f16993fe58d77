//! # Page-Aware Report Layout
//!
//! Sections flow INTO pages. Nothing is laid out on an infinite canvas and
//! sliced afterwards: every renderer measures a block first, asks
//! [`page_break::decide_break`] whether it fits at the current cursor, and
//! only then commits draw commands to a concrete page.
//!
//! The write position is an explicit [`Cursor`] value. Renderers take one
//! and return the cursor after their content; nothing else carries layout
//! state between calls.
//!
//! Output is a [`ReportDocument`]: pages of absolutely positioned
//! [`LayoutElement`]s in top-left-origin points, ready for the PDF writer.
//! Footers are drawn in a final pass by [`finalize_footers`] because the
//! total page count is only known once all content is placed.

pub mod grid;
pub mod image;
pub mod page_break;
pub mod table;
pub mod text;

use serde_json::Value;
use tracing::debug;

use crate::font::StandardFont;
use crate::image_loader::LoadedImage;
use crate::model::ReportHeader;
use crate::style::{Color, FooterStyle, PdfStyling};
use crate::text::{normalize, wrap, WrappedText};

use page_break::{decide_break, BreakDecision, EPSILON};

/// Distance between the section title baseline and its underline.
const TITLE_RULE_GAP: f64 = 4.0;
/// The first-page main title occupies this many times its font size.
const MAIN_TITLE_LEADING: f64 = 1.8;

/// The current write position: a page and a y offset from its top edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    pub page_index: usize,
    pub y: f64,
}

impl Cursor {
    pub fn advance(self, dy: f64) -> Self {
        Self {
            page_index: self.page_index,
            y: self.y + dy,
        }
    }
}

/// Page geometry shared by every page of a report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFrame {
    pub width: f64,
    pub height: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    /// Where content starts on continuation pages (below the banner).
    pub content_top: f64,
    /// Where content starts on the first page (below the main title).
    pub first_content_top: f64,
    /// Content must not extend below this y.
    pub content_bottom: f64,
}

impl PageFrame {
    pub fn new(styling: &PdfStyling, header: Option<&ReportHeader>) -> Self {
        let (width, height) = styling.page.dimensions();
        let content_top = styling.header.height + styling.page.content_top_gap;
        let has_main_title = header
            .and_then(|h| h.title.as_deref())
            .is_some_and(|t| !t.trim().is_empty());
        let first_content_top = if has_main_title {
            content_top + styling.header.main_title_font_size * MAIN_TITLE_LEADING
        } else {
            content_top
        };
        Self {
            width,
            height,
            margin_left: styling.page.margin_left,
            margin_right: styling.page.margin_right,
            content_top,
            first_content_top,
            content_bottom: height - styling.page.margin_bottom,
        }
    }

    pub fn content_x(&self) -> f64 {
        self.margin_left
    }

    pub fn content_width(&self) -> f64 {
        (self.width - self.margin_left - self.margin_right).max(0.0)
    }

    /// Usable height of a continuation page.
    pub fn page_capacity(&self) -> f64 {
        self.content_bottom - self.content_top
    }

    /// Top of the content area on a given page.
    pub fn top_of(&self, page_index: usize) -> f64 {
        if page_index == 0 {
            self.first_content_top
        } else {
            self.content_top
        }
    }
}

// ── Layout output ───────────────────────────────────────────────

/// A fully laid-out page ready for PDF serialization.
#[derive(Debug, Clone)]
pub struct LayoutPage {
    pub width: f64,
    pub height: f64,
    pub elements: Vec<LayoutElement>,
}

/// A positioned element on a page (top-left corner, y grows downward).
#[derive(Debug, Clone)]
pub struct LayoutElement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub draw: DrawCommand,
}

/// What to actually draw for an element.
#[derive(Debug, Clone)]
pub enum DrawCommand {
    /// A filled and/or stroked rectangle covering the element box.
    Rect {
        fill: Option<Color>,
        stroke: Option<Color>,
        stroke_width: f64,
    },
    /// A straight line from the element's top-left corner to
    /// `(x + width, y + height)`.
    Line { color: Color, thickness: f64 },
    Text { lines: Vec<TextLine>, color: Color },
    /// An image scaled into the element box.
    Image { image_data: LoadedImage },
}

/// One line of text. `y` is the baseline.
#[derive(Debug, Clone)]
pub struct TextLine {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub font: StandardFont,
    pub font_size: f64,
    pub width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// The in-memory paginated report.
#[derive(Debug, Clone)]
pub struct ReportDocument {
    pub frame: PageFrame,
    pub pages: Vec<LayoutPage>,
}

impl ReportDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All text lines on a page, in drawing order.
    pub fn text_lines(&self, page_index: usize) -> Vec<&TextLine> {
        self.pages
            .get(page_index)
            .map(|page| {
                page.elements
                    .iter()
                    .filter_map(|el| match &el.draw {
                        DrawCommand::Text { lines, .. } => Some(lines.iter()),
                        _ => None,
                    })
                    .flatten()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Find the first line whose text contains `needle`, as (page, line).
    pub fn find_text(&self, needle: &str) -> Option<(usize, &TextLine)> {
        (0..self.pages.len()).find_map(|idx| {
            self.text_lines(idx)
                .into_iter()
                .find(|line| line.text.contains(needle))
                .map(|line| (idx, line))
        })
    }
}

/// Baseline offset of the first line inside a line box.
pub fn baseline_offset(font_size: f64, line_height: f64) -> f64 {
    (line_height - font_size) / 2.0 + font_size * 0.8
}

// ── Render context ──────────────────────────────────────────────

/// Everything a renderer needs: styling, data, geometry and the pages
/// produced so far.
pub struct RenderContext<'a> {
    pub styling: &'a PdfStyling,
    pub header: Option<&'a ReportHeader>,
    pub data: &'a Value,
    pub frame: PageFrame,
    pages: Vec<LayoutPage>,
}

impl<'a> RenderContext<'a> {
    pub fn new(styling: &'a PdfStyling, header: Option<&'a ReportHeader>, data: &'a Value) -> Self {
        Self {
            styling,
            header,
            data,
            frame: PageFrame::new(styling, header),
            pages: Vec::new(),
        }
    }

    /// Open page 1: banner, optional main title. Returns the first content cursor.
    pub fn start_document(&mut self) -> Cursor {
        self.open_page();
        if let Some(title) = self.header.and_then(|h| h.title.as_deref()) {
            let title = normalize(title);
            if !title.is_empty() {
                let styling = self.styling;
                let hs = &styling.header;
                let baseline = self.frame.content_top + hs.main_title_font_size;
                let line = self.single_line(
                    self.frame.content_x(),
                    self.frame.content_width(),
                    baseline,
                    &title,
                    StandardFont::HelveticaBold,
                    hs.main_title_font_size,
                    TextAlign::Left,
                );
                self.push_text(0, vec![line], hs.main_title_color);
            }
        }
        Cursor {
            page_index: 0,
            y: self.frame.first_content_top,
        }
    }

    /// Start a new page, redraw its banner, and return a cursor at its top.
    pub fn page_break(&mut self, cursor: Cursor) -> Cursor {
        let page_index = self.open_page();
        debug!(from = cursor.page_index + 1, to = page_index + 1, "page break");
        Cursor {
            page_index,
            y: self.frame.content_top,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn remaining(&self, cursor: Cursor) -> f64 {
        self.frame.content_bottom - cursor.y
    }

    pub fn fits(&self, cursor: Cursor, height: f64) -> bool {
        height <= self.remaining(cursor) + EPSILON
    }

    pub fn at_page_top(&self, cursor: Cursor) -> bool {
        cursor.y <= self.frame.top_of(cursor.page_index) + EPSILON
    }

    /// Make room for an unbreakable block of `height`, breaking the page
    /// when needed.
    pub fn ensure_space(&mut self, cursor: Cursor, height: f64) -> Cursor {
        match decide_break(self.remaining(cursor), self.at_page_top(cursor), &[height], false) {
            BreakDecision::MoveToNextPage => self.page_break(cursor),
            _ => cursor,
        }
    }

    /// The finished document, without footers.
    pub fn finish(self) -> ReportDocument {
        ReportDocument {
            frame: self.frame,
            pages: self.pages,
        }
    }

    // ── Drawing primitives ──────────────────────────────────────

    pub fn push(&mut self, page_index: usize, element: LayoutElement) {
        if let Some(page) = self.pages.get_mut(page_index) {
            page.elements.push(element);
        }
    }

    pub fn fill_rect(&mut self, page_index: usize, x: f64, y: f64, width: f64, height: f64, fill: Color) {
        self.push(
            page_index,
            LayoutElement {
                x,
                y,
                width,
                height,
                draw: DrawCommand::Rect {
                    fill: Some(fill),
                    stroke: None,
                    stroke_width: 0.0,
                },
            },
        );
    }

    pub fn stroke_rect(
        &mut self,
        page_index: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Option<Color>,
        stroke: Color,
    ) {
        self.push(
            page_index,
            LayoutElement {
                x,
                y,
                width,
                height,
                draw: DrawCommand::Rect {
                    fill,
                    stroke: Some(stroke),
                    stroke_width: 0.5,
                },
            },
        );
    }

    pub fn hline(&mut self, page_index: usize, x: f64, y: f64, width: f64, color: Color, thickness: f64) {
        self.push(
            page_index,
            LayoutElement {
                x,
                y,
                width,
                height: 0.0,
                draw: DrawCommand::Line { color, thickness },
            },
        );
    }

    /// Draw a measured block with its top edge at `top`.
    pub fn draw_wrapped(
        &mut self,
        page_index: usize,
        x: f64,
        top: f64,
        width: f64,
        wrapped: &WrappedText,
        color: Color,
    ) {
        self.draw_lines(page_index, x, top, width, wrapped, &wrapped.lines, color);
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_lines(
        &mut self,
        page_index: usize,
        x: f64,
        top: f64,
        width: f64,
        wrapped: &WrappedText,
        lines: &[String],
        color: Color,
    ) {
        let first = top + baseline_offset(wrapped.font_size, wrapped.line_height);
        let text_lines: Vec<TextLine> = lines
            .iter()
            .enumerate()
            .filter(|(_, l)| !l.is_empty())
            .map(|(i, l)| TextLine {
                x,
                y: first + i as f64 * wrapped.line_height,
                text: l.clone(),
                font: wrapped.font,
                font_size: wrapped.font_size,
                width: wrapped.font.measure(l, wrapped.font_size),
            })
            .collect();
        if text_lines.is_empty() {
            return;
        }
        self.push(
            page_index,
            LayoutElement {
                x,
                y: top,
                width,
                height: lines.len() as f64 * wrapped.line_height,
                draw: DrawCommand::Text {
                    lines: text_lines,
                    color,
                },
            },
        );
    }

    /// Draw wrapped text at the cursor, flowing line by line onto new
    /// pages when it is taller than the space left. Mid-page, a block that
    /// does not fit moves to the next page before it starts splitting.
    pub fn flow_wrapped(&mut self, cursor: Cursor, x: f64, width: f64, wrapped: &WrappedText, color: Color) -> Cursor {
        self.flow_lines(cursor, x, width, wrapped, color, false)
    }

    /// Like [`flow_wrapped`](Self::flow_wrapped), but splits at the cursor
    /// even mid-page, so the first lines stay on the current page.
    pub fn flow_wrapped_split(&mut self, cursor: Cursor, x: f64, width: f64, wrapped: &WrappedText, color: Color) -> Cursor {
        self.flow_lines(cursor, x, width, wrapped, color, true)
    }

    fn flow_lines(
        &mut self,
        cursor: Cursor,
        x: f64,
        width: f64,
        wrapped: &WrappedText,
        color: Color,
        split_here: bool,
    ) -> Cursor {
        let mut cursor = cursor;
        let mut start = 0;
        let mut splittable = split_here;
        while start < wrapped.lines.len() {
            let rest = &wrapped.lines[start..];
            let heights = vec![wrapped.line_height; rest.len()];
            let at_top = self.at_page_top(cursor) || (splittable && self.fits(cursor, wrapped.line_height));
            splittable = false;
            match decide_break(self.remaining(cursor), at_top, &heights, true) {
                BreakDecision::Place => {
                    self.draw_lines(cursor.page_index, x, cursor.y, width, wrapped, rest, color);
                    return cursor.advance(rest.len() as f64 * wrapped.line_height);
                }
                BreakDecision::MoveToNextPage => cursor = self.page_break(cursor),
                BreakDecision::Split {
                    items_on_current_page,
                } => {
                    let placed = &rest[..items_on_current_page];
                    self.draw_lines(cursor.page_index, x, cursor.y, width, wrapped, placed, color);
                    start += items_on_current_page;
                    cursor = self.page_break(cursor);
                }
            }
        }
        cursor
    }

    /// A single positioned line with the given alignment inside `[x, x + width]`.
    #[allow(clippy::too_many_arguments)]
    pub fn single_line(
        &self,
        x: f64,
        width: f64,
        baseline: f64,
        text: &str,
        font: StandardFont,
        font_size: f64,
        align: TextAlign,
    ) -> TextLine {
        let line_width = font.measure(text, font_size);
        let line_x = match align {
            TextAlign::Left => x,
            TextAlign::Center => x + (width - line_width) / 2.0,
            TextAlign::Right => x + width - line_width,
        };
        TextLine {
            x: line_x,
            y: baseline,
            text: text.to_string(),
            font,
            font_size,
            width: line_width,
        }
    }

    pub fn push_text(&mut self, page_index: usize, lines: Vec<TextLine>, color: Color) {
        if lines.is_empty() {
            return;
        }
        let x = lines.iter().map(|l| l.x).fold(f64::INFINITY, f64::min);
        let right = lines.iter().map(|l| l.x + l.width).fold(f64::NEG_INFINITY, f64::max);
        let top = lines.iter().map(|l| l.y - l.font_size).fold(f64::INFINITY, f64::min);
        let bottom = lines.iter().map(|l| l.y).fold(f64::NEG_INFINITY, f64::max);
        self.push(
            page_index,
            LayoutElement {
                x,
                y: top,
                width: right - x,
                height: bottom - top,
                draw: DrawCommand::Text { lines, color },
            },
        );
    }

    // ── Page furniture ──────────────────────────────────────────

    /// Height consumed by a section title banner.
    pub fn section_header_height(&self) -> f64 {
        self.styling.sections.header_height
    }

    /// Draw an upper-cased section title with an underline rule.
    pub fn draw_section_title(&mut self, cursor: Cursor, title: &str, continued: bool) -> Cursor {
        let ss = &self.styling.sections;
        let mut text = normalize(&title.to_uppercase());
        if continued {
            text.push_str(" (CONT.)");
        }
        let baseline = cursor.y + ss.title_font_size;
        let (x, width) = (self.frame.content_x(), self.frame.content_width());
        let wrapped = wrap(&text, StandardFont::HelveticaBold, ss.title_font_size, 1.0, width);
        // Titles are a single line; anything wider is clipped to the first.
        let first = wrapped.lines.into_iter().next().unwrap_or_default();
        let line = self.single_line(x, width, baseline, &first, StandardFont::HelveticaBold, ss.title_font_size, TextAlign::Left);
        let (title_color, rule_color, header_height) = (ss.title_color, ss.rule_color, ss.header_height);
        self.push_text(cursor.page_index, vec![line], title_color);
        self.hline(cursor.page_index, x, baseline + TITLE_RULE_GAP, width, rule_color, 0.75);
        cursor.advance(header_height)
    }

    fn open_page(&mut self) -> usize {
        self.pages.push(LayoutPage {
            width: self.frame.width,
            height: self.frame.height,
            elements: Vec::new(),
        });
        let index = self.pages.len() - 1;
        self.draw_page_header(index);
        index
    }

    /// The header banner: company/address on the left, title/subtitle on the right.
    fn draw_page_header(&mut self, page_index: usize) {
        let hs = self.styling.header.clone();
        self.fill_rect(page_index, 0.0, 0.0, self.frame.width, hs.height, hs.background_color);

        let Some(header) = self.header else { return };
        let (x, width) = (self.frame.content_x(), self.frame.content_width());
        let clean = |s: &Option<String>| s.as_deref().map(normalize).filter(|s| !s.is_empty());

        let left = (clean(&header.company_name), clean(&header.address));
        let right = (clean(&header.title), clean(&header.subtitle));

        for ((primary, secondary), align) in [(left, TextAlign::Left), (right, TextAlign::Right)] {
            let (first, second) = banner_baselines(&hs, secondary.is_some() && primary.is_some());
            let mut lines = Vec::new();
            if let Some(p) = &primary {
                lines.push(self.single_line(x, width, first, p, StandardFont::HelveticaBold, hs.title_font_size, align));
            }
            if !lines.is_empty() {
                self.push_text(page_index, lines, hs.text_color);
            }
            if let Some(s) = &secondary {
                let baseline = if primary.is_some() { second } else { first };
                let line = self.single_line(x, width, baseline, s, StandardFont::Helvetica, hs.subtitle_font_size, align);
                self.push_text(page_index, vec![line], hs.subtitle_color);
            }
        }
    }
}

/// Baselines for one or two lines centered vertically in the banner.
fn banner_baselines(hs: &crate::style::HeaderStyle, two_lines: bool) -> (f64, f64) {
    let gap = 4.0;
    if two_lines {
        let block = hs.title_font_size + gap + hs.subtitle_font_size;
        let top = (hs.height - block) / 2.0;
        let first = top + hs.title_font_size * 0.8;
        (first, first + gap + hs.subtitle_font_size)
    } else {
        let first = hs.height / 2.0 + hs.title_font_size * 0.3;
        (first, first)
    }
}

// ── Footer pass ─────────────────────────────────────────────────

/// Substitute `{page}` and `{pages}` in a footer template.
pub fn footer_text(template: &str, page: usize, pages: usize) -> String {
    template
        .replace("{pages}", &pages.to_string())
        .replace("{page}", &page.to_string())
}

/// Draw the footer on every page. Runs once, after all content is placed.
pub fn finalize_footers(document: &mut ReportDocument, footer: &FooterStyle) {
    let total = document.pages.len();
    let frame = document.frame;
    let baseline = frame.height - footer.offset;
    let (x, width) = (frame.content_x(), frame.content_width());
    let slots = [
        (&footer.left_text, TextAlign::Left),
        (&footer.center_text, TextAlign::Center),
        (&footer.right_text, TextAlign::Right),
    ];

    for (idx, page) in document.pages.iter_mut().enumerate() {
        if footer.show_rule {
            page.elements.push(LayoutElement {
                x,
                y: baseline - footer.font_size - 4.0,
                width,
                height: 0.0,
                draw: DrawCommand::Line {
                    color: footer.rule_color,
                    thickness: 0.5,
                },
            });
        }

        for (template, align) in slots {
            let Some(template) = template.as_deref() else { continue };
            let text = normalize(&footer_text(template, idx + 1, total));
            if text.is_empty() {
                continue;
            }
            let font = StandardFont::Helvetica;
            let line_width = font.measure(&text, footer.font_size);
            let line_x = match align {
                TextAlign::Left => x,
                TextAlign::Center => x + (width - line_width) / 2.0,
                TextAlign::Right => x + width - line_width,
            };
            page.elements.push(LayoutElement {
                x: line_x,
                y: baseline - footer.font_size,
                width: line_width,
                height: footer.font_size,
                draw: DrawCommand::Text {
                    lines: vec![TextLine {
                        x: line_x,
                        y: baseline,
                        text,
                        font,
                        font_size: footer.font_size,
                        width: line_width,
                    }],
                    color: footer.color,
                },
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn header() -> ReportHeader {
        ReportHeader {
            title: Some("Inspection".into()),
            subtitle: Some("Site 4".into()),
            company_name: Some("Acme".into()),
            address: Some("1 Road".into()),
        }
    }

    #[test]
    fn frame_geometry() {
        let styling = PdfStyling::default();
        let frame = PageFrame::new(&styling, None);
        assert!((frame.width - 595.28).abs() < 1e-9);
        assert!((frame.content_width() - (595.28 - 80.0)).abs() < 1e-9);
        assert!((frame.content_top - 74.0).abs() < 1e-9);
        assert_eq!(frame.first_content_top, frame.content_top);
        assert!((frame.content_bottom - (841.89 - 48.0)).abs() < 1e-9);
    }

    #[test]
    fn main_title_pushes_first_page_content_down() {
        let styling = PdfStyling::default();
        let h = header();
        let frame = PageFrame::new(&styling, Some(&h));
        assert!(frame.first_content_top > frame.content_top);
        assert_eq!(frame.top_of(0), frame.first_content_top);
        assert_eq!(frame.top_of(3), frame.content_top);
    }

    #[test]
    fn page_break_redraws_banner() {
        let styling = PdfStyling::default();
        let h = header();
        let data = json!({});
        let mut ctx = RenderContext::new(&styling, Some(&h), &data);
        let cursor = ctx.start_document();
        let next = ctx.page_break(cursor);
        assert_eq!(next.page_index, 1);
        assert_eq!(next.y, ctx.frame.content_top);
        let doc = ctx.finish();
        for page in &doc.pages {
            assert!(matches!(page.elements[0].draw, DrawCommand::Rect { fill: Some(_), .. }));
        }
        // Company name on every page, main title only on the first.
        assert!(doc.text_lines(1).iter().any(|l| l.text == "Acme"));
        assert_eq!(doc.text_lines(0).iter().filter(|l| l.text == "Inspection").count(), 2);
        assert_eq!(doc.text_lines(1).iter().filter(|l| l.text == "Inspection").count(), 1);
    }

    #[test]
    fn ensure_space_breaks_only_below_top() {
        let styling = PdfStyling::default();
        let data = json!({});
        let mut ctx = RenderContext::new(&styling, None, &data);
        let top = ctx.start_document();
        let huge = ctx.frame.page_capacity() * 2.0;
        // At the top of a page there is nowhere better to go.
        assert_eq!(ctx.ensure_space(top, huge), top);
        let lower = top.advance(100.0);
        let moved = ctx.ensure_space(lower, ctx.remaining(lower) + 1.0);
        assert_eq!(moved.page_index, 1);
        assert_eq!(ctx.page_count(), 2);
    }

    #[test]
    fn section_title_is_uppercased_with_rule() {
        let styling = PdfStyling::default();
        let data = json!({});
        let mut ctx = RenderContext::new(&styling, None, &data);
        let cursor = ctx.start_document();
        let after = ctx.draw_section_title(cursor, "Site notes", true);
        assert!((after.y - cursor.y - styling.sections.header_height).abs() < 1e-9);
        let doc = ctx.finish();
        assert!(doc.text_lines(0).iter().any(|l| l.text == "SITE NOTES (CONT.)"));
        assert!(doc.pages[0]
            .elements
            .iter()
            .any(|e| matches!(e.draw, DrawCommand::Line { .. })));
    }

    #[test]
    fn flow_splits_across_pages() {
        let styling = PdfStyling::default();
        let data = json!({});
        let mut ctx = RenderContext::new(&styling, None, &data);
        let cursor = ctx.start_document();
        let lines_per_page = (ctx.frame.page_capacity() / 10.0).floor() as usize;
        let text = vec!["line"; lines_per_page * 2 + 3].join("\n");
        let wrapped = wrap(&text, StandardFont::Helvetica, 8.0, 1.25, 300.0);
        let end = ctx.flow_wrapped(cursor, 40.0, 300.0, &wrapped, Color::BLACK);
        assert_eq!(end.page_index, 2);
        assert!((end.y - (ctx.frame.content_top + 30.0)).abs() < 1e-6);
    }

    #[test]
    fn footer_substitution() {
        assert_eq!(footer_text("Page {page} of {pages}", 2, 5), "Page 2 of 5");
        assert_eq!(footer_text("static", 1, 1), "static");
    }

    #[test]
    fn footers_on_every_page() {
        let styling = PdfStyling::default();
        let data = json!({});
        let mut ctx = RenderContext::new(&styling, None, &data);
        let c = ctx.start_document();
        let c = ctx.page_break(c);
        ctx.page_break(c);
        let mut doc = ctx.finish();
        finalize_footers(&mut doc, &styling.footer);
        for idx in 0..3 {
            let expected = format!("Page {} of 3", idx + 1);
            assert!(doc.text_lines(idx).iter().any(|l| l.text == expected));
        }
    }
}
