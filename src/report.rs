//! # Document Assembler
//!
//! Drives one generation run: filter and order the sections, skip the
//! empty ones, keep each title together with the start of its content,
//! dispatch to the per-type renderer, then stamp footers once the page
//! count is known.
//!
//! Every section is prepared (interpolated, parsed, measured) before
//! anything is drawn for it, so the title banner never ends up orphaned at
//! the bottom of a page.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::ReportError;
use crate::image_loader::{DefaultFetcher, ImageFetcher};
use crate::layout::grid::{self, GridRow, GridSettings};
use crate::layout::image::{self as image_grid, ImageGrid};
use crate::layout::table::{self, TableGrid};
use crate::layout::text::{self, PreparedText};
use crate::layout::{finalize_footers, Cursor, RenderContext, ReportDocument};
use crate::markdown::Block;
use crate::model::{ImageContent, ReportMetadata, Section, SectionContent};
use crate::pdf::{DocumentInfo, PdfWriter};
use crate::template::{interpolate, interpolate_raw};

/// Runtime knobs for one generation run.
#[derive(Clone)]
pub struct GenerateOptions {
    /// Upper bound on waiting for one image chunk to load.
    pub image_timeout: Duration,
    pub fetcher: Arc<dyn ImageFetcher>,
    /// Fail with [`ReportError::UnknownContent`] instead of warning.
    pub reject_unknown_content: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            image_timeout: Duration::from_secs(8),
            fetcher: Arc::new(DefaultFetcher::default()),
            reject_unknown_content: false,
        }
    }
}

impl std::fmt::Debug for GenerateOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerateOptions")
            .field("image_timeout", &self.image_timeout)
            .field("reject_unknown_content", &self.reject_unknown_content)
            .finish_non_exhaustive()
    }
}

/// A finished report.
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

impl RenderedReport {
    /// The report as a `data:` URL for inline preview.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:application/pdf;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

/// Sections with `includeInPdf` set, sorted by `order`. Ties keep input order.
pub fn ordered_sections(sections: &[Section]) -> Vec<&Section> {
    let mut included: Vec<&Section> = sections.iter().filter(|s| s.include_in_pdf).collect();
    included.sort_by(|a, b| a.order.total_cmp(&b.order));
    included
}

/// Whether a section has anything to draw. Empty sections are skipped
/// entirely: no title, no spacing.
pub fn has_content(section: &Section, data: &Value) -> bool {
    match &section.content {
        SectionContent::Text(c) => !interpolate(&c.template, data).trim().is_empty(),
        SectionContent::RawText(c) => !interpolate_raw(&c.template, data).trim().is_empty(),
        SectionContent::Table(c) => !table::dataset(c, data).is_empty(),
        SectionContent::Image(c) => !image_grid::descriptors(c, data).is_empty(),
        SectionContent::LabelTopGrid(c) => grid::label_grid_has_values(c, data),
        SectionContent::FormGrid(c) => grid::form_grid_has_values(c, data),
        SectionContent::Unknown => true,
    }
}

/// A section's content resolved and measured, ready to place.
enum PreparedSection<'m> {
    Text(PreparedText),
    RawText(Vec<Block>),
    Table(TableGrid),
    Grid { rows: Vec<GridRow>, settings: GridSettings },
    Image(&'m ImageContent),
    Nothing,
}

impl<'m> PreparedSection<'m> {
    fn new(content: &'m SectionContent, ctx: &RenderContext<'_>) -> Self {
        let width = ctx.frame.content_width();
        match content {
            SectionContent::Text(c) => Self::Text(PreparedText::new(c, ctx.data)),
            SectionContent::RawText(c) => Self::RawText(text::prepare_rawtext(c, ctx.data)),
            SectionContent::Table(c) => Self::Table(TableGrid::from_content(c, ctx.data)),
            SectionContent::LabelTopGrid(c) => {
                let settings = GridSettings::resolve(&c.spacing, &ctx.styling.sections);
                Self::Grid {
                    rows: grid::measure_label_grid(c, ctx.data, width, &settings),
                    settings,
                }
            }
            SectionContent::FormGrid(c) => {
                let settings = GridSettings::resolve(&c.spacing, &ctx.styling.sections);
                Self::Grid {
                    rows: grid::measure_form_grid(c, ctx.data, width, &settings),
                    settings,
                }
            }
            SectionContent::Image(c) => Self::Image(c),
            SectionContent::Unknown => Self::Nothing,
        }
    }

    /// Height of the first piece of content, which must share a page with
    /// the section title.
    fn lead_height(&self, ctx: &RenderContext<'_>, title_height: f64) -> f64 {
        let styling = ctx.styling;
        match self {
            Self::Text(prepared) => prepared.lead_height(styling, &ctx.frame, title_height),
            Self::RawText(blocks) => text::rawtext_lead_height(blocks, styling, &ctx.frame),
            Self::Table(grid) => table::measure(grid, &styling.table, ctx.frame.content_width()).lead_height(),
            Self::Grid { rows, .. } => rows.first().map_or(0.0, |r| r.height),
            Self::Image(content) => {
                let grid = ImageGrid::new(&styling.image, ctx.frame.content_width());
                let count = image_grid::descriptors(content, ctx.data).len();
                grid.chunk_height(count.min(grid.columns * grid.rows))
            }
            Self::Nothing => 0.0,
        }
    }

    async fn render(
        &self,
        ctx: &mut RenderContext<'_>,
        cursor: Cursor,
        section: &Section,
        title_height: f64,
        options: &GenerateOptions,
    ) -> Cursor {
        match self {
            Self::Text(prepared) => text::render_text(ctx, cursor, prepared, title_height),
            Self::RawText(blocks) => text::render_rawtext(ctx, cursor, blocks),
            Self::Table(grid) => table::render(ctx, cursor, grid),
            Self::Grid { rows, settings } => {
                let title = (!section.hide_header).then_some(section.title.as_str());
                grid::render(ctx, cursor, rows, settings, title)
            }
            Self::Image(content) => {
                image_grid::render(ctx, cursor, content, &options.fetcher, options.image_timeout).await
            }
            Self::Nothing => cursor,
        }
    }
}

/// Lay out the whole report into pages, footers included.
pub async fn layout_report(
    metadata: &ReportMetadata,
    data: &Value,
    options: &GenerateOptions,
) -> Result<ReportDocument, ReportError> {
    let styling = &metadata.pdf_styling;
    let mut ctx = RenderContext::new(styling, metadata.header.as_ref(), data);
    let mut cursor = ctx.start_document();

    for section in ordered_sections(&metadata.sections) {
        if matches!(section.content, SectionContent::Unknown) {
            if options.reject_unknown_content {
                return Err(ReportError::UnknownContent {
                    section: section.id.clone(),
                });
            }
            warn!(section = %section.id, "unknown section content type, drawing title only");
        }
        if !has_content(section, data) {
            debug!(section = %section.id, kind = section.content.kind_name(), "skipping empty section");
            continue;
        }

        let prepared = PreparedSection::new(&section.content, &ctx);
        let title_height = if section.hide_header {
            0.0
        } else {
            ctx.section_header_height()
        };

        if cursor.y > ctx.frame.content_bottom {
            cursor = ctx.page_break(cursor);
        }
        cursor = ctx.ensure_space(cursor, title_height + prepared.lead_height(&ctx, title_height));
        debug!(
            section = %section.id,
            kind = section.content.kind_name(),
            page = cursor.page_index + 1,
            y = cursor.y,
            "placing section"
        );

        if !section.hide_header {
            cursor = ctx.draw_section_title(cursor, &section.title, false);
        }
        cursor = prepared.render(&mut ctx, cursor, section, title_height, options).await;
        cursor = cursor.advance(styling.sections.spacing);
    }

    let mut document = ctx.finish();
    finalize_footers(&mut document, &styling.footer);
    Ok(document)
}

/// Lay out and serialize a report to PDF bytes.
pub async fn generate(
    metadata: &ReportMetadata,
    data: &Value,
    options: &GenerateOptions,
) -> Result<RenderedReport, ReportError> {
    let document = layout_report(metadata, data, options).await?;
    let header = metadata.header.as_ref();
    let info = DocumentInfo {
        title: header.and_then(|h| h.title.clone()),
        author: header.and_then(|h| h.company_name.clone()),
    };
    let bytes = PdfWriter::new().write(&document.pages, &info)?;
    info!(pages = document.page_count(), bytes = bytes.len(), "report generated");
    Ok(RenderedReport {
        page_count: document.page_count(),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FormGridCell, FormGridContent, TableContent, TextContent};
    use serde_json::json;

    fn section(id: &str, order: f64, content: SectionContent) -> Section {
        Section {
            id: id.to_string(),
            title: id.to_string(),
            include_in_pdf: true,
            order,
            hide_header: false,
            content,
        }
    }

    fn text(template: &str) -> SectionContent {
        SectionContent::Text(TextContent {
            template: template.to_string(),
        })
    }

    #[test]
    fn ordering_is_stable_and_filtered() {
        let mut hidden = section("hidden", 0.0, text("x"));
        hidden.include_in_pdf = false;
        let sections = vec![
            section("a", 2.0, text("x")),
            section("b", 1.0, text("x")),
            hidden,
            section("c", 2.0, text("x")),
        ];
        let ids: Vec<&str> = ordered_sections(&sections).iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn emptiness_rules() {
        let data = json!({ "name": "Ann", "rows": [] });
        assert!(has_content(&section("t", 0.0, text("{{name}}")), &data));
        assert!(!has_content(&section("t", 0.0, text("  {{missing}} ")), &data));
        assert!(!has_content(
            &section(
                "r",
                0.0,
                SectionContent::RawText(TextContent {
                    template: "\n\n".into()
                })
            ),
            &data
        ));
        let table = SectionContent::Table(TableContent {
            columns: vec![],
            data: None,
            data_path: Some("rows".into()),
        });
        assert!(!has_content(&section("tb", 0.0, table), &data));
        let form = SectionContent::FormGrid(FormGridContent {
            rows: vec![vec![FormGridCell {
                label: "Name".into(),
                value: json!("{{nobody}}"),
                span: None,
            }]],
            ..FormGridContent::default()
        });
        assert!(!has_content(&section("f", 0.0, form), &data));
        assert!(has_content(&section("u", 0.0, SectionContent::Unknown), &data));
    }

    #[test]
    fn data_url_prefix() {
        let report = RenderedReport {
            bytes: b"%PDF".to_vec(),
            page_count: 1,
        };
        assert_eq!(report.to_data_url(), "data:application/pdf;base64,JVBERg==");
    }

    #[tokio::test]
    async fn unknown_content_is_lenient_by_default() {
        let metadata = ReportMetadata {
            sections: vec![section("mystery", 0.0, SectionContent::Unknown)],
            ..ReportMetadata::default()
        };
        let data = json!({});
        let doc = layout_report(&metadata, &data, &GenerateOptions::default()).await.unwrap();
        assert!(doc.find_text("MYSTERY").is_some());

        let strict = GenerateOptions {
            reject_unknown_content: true,
            ..GenerateOptions::default()
        };
        let err = layout_report(&metadata, &data, &strict).await.unwrap_err();
        assert!(matches!(err, ReportError::UnknownContent { ref section } if section == "mystery"));
    }

    #[tokio::test]
    async fn title_moves_with_its_content() {
        let mut metadata = ReportMetadata::default();
        let filler = (0..49).map(|i| format!("filler {}", i)).collect::<Vec<_>>().join("\n");
        metadata.sections = vec![
            section("first", 0.0, text(&filler)),
            section("second", 1.0, text("alpha\nbeta\ngamma\ndelta")),
        ];
        let data = json!({});
        let doc = layout_report(&metadata, &data, &GenerateOptions::default()).await.unwrap();
        let (title_page, _) = doc.find_text("SECOND").unwrap();
        let (body_page, _) = doc.find_text("alpha").unwrap();
        assert_eq!(title_page, body_page);
    }

    fn numbered_lines(prefix: &str, count: usize) -> String {
        (0..count).map(|i| format!("{} {}", prefix, i)).collect::<Vec<_>>().join("\n")
    }

    #[tokio::test]
    async fn page_sized_text_keeps_its_title() {
        // 53 lines fill all but a few points of a page, leaving no room for the title.
        let mut metadata = ReportMetadata::default();
        metadata.sections = vec![section("long", 0.0, text(&numbered_lines("line", 53)))];
        let data = json!({});
        let doc = layout_report(&metadata, &data, &GenerateOptions::default()).await.unwrap();
        let (title_page, _) = doc.find_text("LONG").unwrap();
        let (body_page, _) = doc.find_text("line 0").unwrap();
        assert_eq!(title_page, body_page);
        assert_eq!(doc.pages.len(), 2);
        for page in 0..doc.pages.len() {
            for line in doc.text_lines(page).iter().filter(|l| l.text.starts_with("line ")) {
                assert!(line.y <= doc.frame.content_bottom, "{:?} below content", line.text);
            }
        }
        assert!(doc.find_text("line 52").is_some());
    }

    #[tokio::test]
    async fn oversized_text_starts_below_a_mid_page_title() {
        let mut metadata = ReportMetadata::default();
        metadata.sections = vec![
            section("intro", 0.0, text("short intro")),
            section("long", 1.0, text(&numbered_lines("row", 80))),
        ];
        let data = json!({});
        let doc = layout_report(&metadata, &data, &GenerateOptions::default()).await.unwrap();
        let (title_page, _) = doc.find_text("LONG").unwrap();
        let (body_page, _) = doc.find_text("row 0").unwrap();
        assert_eq!(title_page, 0);
        assert_eq!(body_page, 0);
        assert!(doc.find_text("row 79").is_some_and(|(page, _)| page >= 1));
    }
}
