//! # Gadget Report
//!
//! A metadata-driven PDF report engine for form gadgets.
//!
//! A report is described once, as static metadata: a header, styling, and
//! an ordered list of sections (prose, markdown, tables, label grids, form
//! grids, image grids). At generation time the metadata is combined with a
//! JSON tree of gadget data that sections address by path and template.
//!
//! Sections flow INTO pages. Each renderer measures its content, decides
//! whether it fits at the cursor, and only then draws onto a concrete
//! page. Footers are stamped in a final pass once the page count is known.
//!
//! ## Architecture
//!
//! ```text
//! ReportMetadata + GadgetData (JSON)
//!       ↓
//!   [report]   — Order, filter and skip empty sections; dispatch
//!       ↓
//!   [layout]   — Cursor, page frame, per-type renderers (measure + draw)
//!       ↓
//!   [pdf]      — Serialize to PDF bytes
//! ```
//!
//! The leaf stages (`path`, `text`, `markdown`, `template`) are total
//! functions: missing data renders as nothing, never as an error.

pub mod error;
pub mod font;
pub mod image_loader;
pub mod layout;
pub mod markdown;
pub mod model;
pub mod path;
pub mod pdf;
pub mod report;
pub mod style;
pub mod template;
pub mod text;

pub use error::ReportError;
pub use image_loader::{DefaultFetcher, ImageFetcher};
pub use model::{GadgetData, ReportMetadata, Section, SectionContent};
pub use report::{generate, layout_report, GenerateOptions, RenderedReport};

/// Generate a report from metadata and gadget data given as JSON strings.
pub async fn generate_json(
    metadata_json: &str,
    data_json: &str,
    options: &GenerateOptions,
) -> Result<RenderedReport, ReportError> {
    let metadata: ReportMetadata = serde_json::from_str(metadata_json)?;
    let data: GadgetData = serde_json::from_str(data_json)?;
    generate(&metadata, &data, options).await
}

/// Generate a report from synchronous code.
///
/// Spins up a private current-thread runtime for the duration of the call,
/// so it must not be called from inside another tokio runtime.
pub fn generate_blocking(
    metadata: &ReportMetadata,
    data: &GadgetData,
    options: &GenerateOptions,
) -> Result<RenderedReport, ReportError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(generate(metadata, data, options))
}
