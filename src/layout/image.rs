//! # Image Grids
//!
//! Images are placed in chunks of `gridColumns x gridRows` cells (2 x 3 by
//! default). Chunks are processed strictly in order because each one is
//! placed where the previous one left the cursor. Within a chunk every
//! image loads concurrently against one deadline; a slot whose image fails
//! or arrives late stays blank.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use super::{Cursor, DrawCommand, LayoutElement, RenderContext};
use crate::image_loader::{load_images, ImageFetcher, ImageSettings};
use crate::model::ImageContent;
use crate::path;
use crate::style::ImageStyle;

/// Split `items` into chunks of exactly `columns * rows` slots, padding
/// the last chunk with `None`.
pub fn chunk_cells<T: Clone>(items: &[T], columns: usize, rows: usize) -> Vec<Vec<Option<T>>> {
    let size = (columns * rows).max(1);
    items
        .chunks(size)
        .map(|chunk| {
            let mut slots: Vec<Option<T>> = chunk.iter().cloned().map(Some).collect();
            slots.resize(size, None);
            slots
        })
        .collect()
}

/// The image descriptors of a section: `dataPath` when it names an array,
/// otherwise inline `data`. The inline fallback for an unresolved
/// `dataPath` is deliberate and matches [`table::dataset`](super::table::dataset).
pub fn descriptors<'v>(content: &'v ImageContent, data: &'v Value) -> &'v [Value] {
    if let Some(Value::Array(items)) = content.data_path.as_deref().and_then(|p| path::resolve(data, p)) {
        return items;
    }
    content.data.as_deref().unwrap_or(&[])
}

/// The source of one descriptor: a bare string, or an object's `src`
/// (preferred) or `url`.
pub fn image_source(descriptor: &Value) -> Option<String> {
    let src = match descriptor {
        Value::String(s) => Some(s.as_str()),
        Value::Object(map) => ["src", "url"]
            .iter()
            .find_map(|k| map.get(*k).and_then(Value::as_str).filter(|s| !s.trim().is_empty())),
        _ => None,
    }?;
    let src = src.trim();
    (!src.is_empty()).then(|| src.to_string())
}

/// Cell geometry for one image grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageGrid {
    pub columns: usize,
    pub rows: usize,
    pub cell_width: f64,
    pub cell_height: f64,
    pub gap: f64,
}

impl ImageGrid {
    pub fn new(style: &ImageStyle, content_width: f64) -> Self {
        let columns = style.grid_columns.max(1);
        let rows = style.grid_rows.max(1);
        let gap = style.gap.max(0.0);
        let cell_width = ((content_width - gap * (columns - 1) as f64) / columns as f64).max(1.0);
        Self {
            columns,
            rows,
            cell_width,
            cell_height: cell_width * style.cell_aspect.max(0.01),
            gap,
        }
    }

    /// Height of a chunk whose first `occupied` slots hold images.
    pub fn chunk_height(&self, occupied: usize) -> f64 {
        let used_rows = occupied.div_ceil(self.columns).min(self.rows);
        if used_rows == 0 {
            return 0.0;
        }
        used_rows as f64 * self.cell_height + (used_rows - 1) as f64 * self.gap
    }

    /// Offset of slot `k` from the chunk's top-left corner.
    pub fn slot_offset(&self, k: usize) -> (f64, f64) {
        let col = k % self.columns;
        let row = k / self.columns;
        (
            col as f64 * (self.cell_width + self.gap),
            row as f64 * (self.cell_height + self.gap),
        )
    }
}

/// Lay out an image section chunk by chunk.
pub async fn render(
    ctx: &mut RenderContext<'_>,
    cursor: Cursor,
    content: &ImageContent,
    fetcher: &Arc<dyn ImageFetcher>,
    timeout: Duration,
) -> Cursor {
    let style = ctx.styling.image.clone();
    let grid = ImageGrid::new(&style, ctx.frame.content_width());
    let settings = ImageSettings::resolve(&style, content);
    let sources: Vec<Option<String>> = descriptors(content, ctx.data).iter().map(image_source).collect();
    let indices: Vec<usize> = (0..sources.len()).collect();
    let x = ctx.frame.content_x();
    let mut cursor = cursor;

    for (chunk_idx, chunk) in chunk_cells(&indices, grid.columns, grid.rows).iter().enumerate() {
        let occupied = chunk.iter().filter(|slot| slot.is_some()).count();
        if chunk_idx > 0 {
            cursor = cursor.advance(grid.gap);
        }
        cursor = ctx.ensure_space(cursor, grid.chunk_height(occupied));
        debug!(chunk = chunk_idx, images = occupied, page = cursor.page_index + 1, "image chunk");

        let chunk_sources = chunk
            .iter()
            .map(|slot| slot.and_then(|i| sources[i].clone()))
            .collect();
        let loaded = load_images(
            Arc::clone(fetcher),
            chunk_sources,
            (grid.cell_width, grid.cell_height),
            settings.clone(),
            timeout,
        )
        .await;

        for (k, image) in loaded.into_iter().enumerate() {
            let Some(image_data) = image else { continue };
            let (dx, dy) = grid.slot_offset(k);
            ctx.push(
                cursor.page_index,
                LayoutElement {
                    x: x + dx,
                    y: cursor.y + dy,
                    width: grid.cell_width,
                    height: grid.cell_height,
                    draw: DrawCommand::Image { image_data },
                },
            );
        }
        cursor = cursor.advance(grid.chunk_height(occupied));
    }
    cursor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_loader::DefaultFetcher;
    use crate::style::PdfStyling;
    use serde_json::json;

    fn png_data_uri() -> String {
        use base64::Engine;
        use image::ImageEncoder;
        let img = image::RgbImage::from_pixel(4, 3, image::Rgb([10, 120, 200]));
        let mut buf = Vec::new();
        image::codecs::png::PngEncoder::new(&mut buf)
            .write_image(img.as_raw(), 4, 3, image::ColorType::Rgb8)
            .unwrap();
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(buf)
        )
    }

    #[test]
    fn seven_items_make_two_chunks() {
        let items: Vec<u32> = (1..=7).collect();
        let chunks = chunk_cells(&items, 2, 3);
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].iter().all(Option::is_some));
        assert_eq!(chunks[1].iter().filter(|s| s.is_some()).count(), 1);
        assert_eq!(chunks[1].iter().filter(|s| s.is_none()).count(), 5);
        assert_eq!(chunks[1][0], Some(7));
    }

    #[test]
    fn no_items_no_chunks() {
        assert!(chunk_cells::<u32>(&[], 2, 3).is_empty());
    }

    #[test]
    fn sources_from_descriptors() {
        assert_eq!(image_source(&json!("a.png")), Some("a.png".into()));
        assert_eq!(image_source(&json!({ "src": "s", "url": "u" })), Some("s".into()));
        assert_eq!(image_source(&json!({ "url": "u" })), Some("u".into()));
        assert_eq!(image_source(&json!({ "src": "  ", "url": "u" })), Some("u".into()));
        assert_eq!(image_source(&json!({ "name": "x" })), None);
        assert_eq!(image_source(&json!(5)), None);
    }

    #[test]
    fn descriptors_prefer_data_path() {
        let content = ImageContent {
            data: Some(vec![json!("inline")]),
            data_path: Some("photos".into()),
            ..ImageContent::default()
        };
        let data = json!({ "photos": ["a", "b"] });
        assert_eq!(descriptors(&content, &data).len(), 2);
        assert_eq!(descriptors(&content, &json!({})).len(), 1);
        assert_eq!(descriptors(&content, &json!({ "photos": "a" })).len(), 1);
        let no_inline = ImageContent {
            data_path: Some("photos".into()),
            ..ImageContent::default()
        };
        assert!(descriptors(&no_inline, &json!({})).is_empty());
    }

    #[test]
    fn grid_geometry() {
        let grid = ImageGrid::new(&ImageStyle::default(), 510.0);
        assert!((grid.cell_width - 250.0).abs() < 1e-9);
        assert!((grid.cell_height - 187.5).abs() < 1e-9);
        assert_eq!(grid.chunk_height(0), 0.0);
        assert!((grid.chunk_height(1) - 187.5).abs() < 1e-9);
        assert!((grid.chunk_height(2) - 187.5).abs() < 1e-9);
        assert!((grid.chunk_height(6) - (3.0 * 187.5 + 20.0)).abs() < 1e-9);
        assert_eq!(grid.slot_offset(3), (260.0, 197.5));
    }

    #[tokio::test]
    async fn failed_images_leave_blank_cells() {
        let styling = PdfStyling::default();
        let uri = png_data_uri();
        let data = json!({ "photos": [uri.clone(), "broken", { "src": uri }] });
        let mut ctx = RenderContext::new(&styling, None, &data);
        let start = ctx.start_document();
        let content = ImageContent {
            data_path: Some("photos".into()),
            ..ImageContent::default()
        };
        let fetcher: Arc<dyn ImageFetcher> = Arc::new(DefaultFetcher::default());
        let end = render(&mut ctx, start, &content, &fetcher, Duration::from_secs(10)).await;

        let grid = ImageGrid::new(&styling.image, ctx.frame.content_width());
        assert!((end.y - start.y - grid.chunk_height(3)).abs() < 1e-9);
        let doc = ctx.finish();
        let images: Vec<&LayoutElement> = doc.pages[0]
            .elements
            .iter()
            .filter(|e| matches!(e.draw, DrawCommand::Image { .. }))
            .collect();
        assert_eq!(images.len(), 2);
        // Slot 0 and slot 2 (second row, first column).
        assert!((images[0].x - doc.frame.content_x()).abs() < 1e-9);
        assert!((images[1].y - (start.y + grid.cell_height + grid.gap)).abs() < 1e-9);
    }
}
