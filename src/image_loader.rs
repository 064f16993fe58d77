//! # Image Loading and Preparation
//!
//! Fetches image bytes through an [`ImageFetcher`], then prepares each one
//! for its grid cell: decode, fit onto a canvas of the cell's pixel size,
//! fill the unused area with the background color, and re-encode. JPEG
//! output is embedded with DCTDecode; PNG output is kept as raw RGB and
//! Flate-compressed by the PDF writer.
//!
//! Loads within a chunk run concurrently and race a single deadline. A
//! failed or late image becomes `None` (a blank cell), never an error.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageEncoder, Rgba, RgbaImage};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::ReportError;
use crate::style::{Color, ImageAlign, ImageFit, ImageFormat, ImageStyle};
use crate::model::ImageContent;

/// Longest canvas side in pixels, whatever the dpi asks for.
const MAX_CANVAS_PX: f64 = 2400.0;

/// A prepared image ready for PDF embedding.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub pixel_data: ImagePixelData,
    pub width_px: u32,
    pub height_px: u32,
}

/// The pixel data in a form the PDF serializer embeds directly.
#[derive(Debug, Clone)]
pub enum ImagePixelData {
    /// Baseline JPEG bytes, embedded with DCTDecode.
    Jpeg { data: Vec<u8> },
    /// `width * height * 3` bytes of RGB, embedded with FlateDecode.
    Rgb { data: Vec<u8> },
}

// ── Fetching ────────────────────────────────────────────────────

/// Turns an image source string into raw encoded bytes.
///
/// This is the one boundary-crossing operation of report generation.
/// Implementations must be cheap to share across tasks.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, src: &str) -> Result<Vec<u8>, ReportError>;
}

/// Resolves data URIs, file paths, raw base64 and (with the
/// `remote-images` feature) `http(s)` URLs.
#[derive(Debug, Clone, Default)]
pub struct DefaultFetcher {
    #[cfg(feature = "remote-images")]
    client: reqwest::Client,
}

#[async_trait]
impl ImageFetcher for DefaultFetcher {
    async fn fetch(&self, src: &str) -> Result<Vec<u8>, ReportError> {
        let src = src.trim();
        if src.is_empty() {
            return Err(ReportError::Image("empty image source".to_string()));
        }

        if src.starts_with("data:") {
            let comma = src
                .find(',')
                .ok_or_else(|| ReportError::Image("invalid data URI: missing comma".to_string()))?;
            return base64_decode(&src[comma + 1..]);
        }

        if src.starts_with("http://") || src.starts_with("https://") {
            return self.fetch_remote(src).await;
        }

        // Only explicit path prefixes: base64 payloads contain '/' too.
        if src.starts_with('/') || src.starts_with("./") || src.starts_with("../") {
            return Ok(tokio::fs::read(src).await?);
        }

        base64_decode(src)
    }
}

impl DefaultFetcher {
    #[cfg(feature = "remote-images")]
    async fn fetch_remote(&self, url: &str) -> Result<Vec<u8>, ReportError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ReportError::Image(format!("failed to fetch '{}': {}", url, e)))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ReportError::Image(format!("failed to read '{}': {}", url, e)))?;
        Ok(bytes.to_vec())
    }

    #[cfg(not(feature = "remote-images"))]
    async fn fetch_remote(&self, url: &str) -> Result<Vec<u8>, ReportError> {
        Err(ReportError::Image(format!(
            "remote image '{}' needs the `remote-images` feature",
            url
        )))
    }
}

fn base64_decode(input: &str) -> Result<Vec<u8>, ReportError> {
    use base64::Engine;
    let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(cleaned)
        .map_err(|e| ReportError::Image(format!("base64 decode error: {}", e)))
}

// ── Preparation ─────────────────────────────────────────────────

/// How to rasterize an image into its cell.
#[derive(Debug, Clone)]
pub struct ImageSettings {
    pub dpi: f64,
    pub format: ImageFormat,
    pub quality: f64,
    pub background: Color,
    pub fit: ImageFit,
    pub align: ImageAlign,
}

impl ImageSettings {
    /// Global image styling with a section's overrides applied.
    pub fn resolve(style: &ImageStyle, content: &ImageContent) -> Self {
        Self {
            dpi: style.dpi,
            format: content.format.unwrap_or(style.format),
            quality: content.quality.unwrap_or(style.quality),
            background: style.background_color,
            fit: content.fit.unwrap_or(style.fit),
            align: style.align,
        }
    }

    /// Canvas size in pixels for a cell of `width` x `height` points.
    pub fn canvas_px(&self, width: f64, height: f64) -> (u32, u32) {
        let scale = self.dpi.max(1.0) / 72.0;
        let w = (width * scale).round().clamp(1.0, MAX_CANVAS_PX);
        let h = (height * scale).round().clamp(1.0, MAX_CANVAS_PX);
        (w as u32, h as u32)
    }
}

/// Decode `bytes` and render them onto a canvas sized for a `target`
/// cell of (width, height) points.
pub fn prepare_image(
    bytes: &[u8],
    target: (f64, f64),
    settings: &ImageSettings,
) -> Result<LoadedImage, ReportError> {
    let source = image::load_from_memory(bytes)
        .map_err(|e| ReportError::Image(format!("decode failed: {}", e)))?;
    let (canvas_w, canvas_h) = settings.canvas_px(target.0, target.1);

    let [r, g, b] = settings.background.to_bytes();
    let mut canvas = RgbaImage::from_pixel(canvas_w, canvas_h, Rgba([r, g, b, 255]));

    match settings.fit {
        ImageFit::Contain => {
            let fitted = source.resize(canvas_w, canvas_h, FilterType::Triangle).to_rgba8();
            let x = align_offset(canvas_w, fitted.width(), settings.align);
            let y = align_offset(canvas_h, fitted.height(), ImageAlign::Center);
            imageops::overlay(&mut canvas, &fitted, x, y);
        }
        ImageFit::Cover => {
            let filled = source
                .resize_to_fill(canvas_w, canvas_h, FilterType::Triangle)
                .to_rgba8();
            imageops::overlay(&mut canvas, &filled, 0, 0);
        }
        ImageFit::Stretch => {
            let stretched = source
                .resize_exact(canvas_w, canvas_h, FilterType::Triangle)
                .to_rgba8();
            imageops::overlay(&mut canvas, &stretched, 0, 0);
        }
    }

    // Overlaying onto an opaque canvas flattened any transparency.
    let rgb = DynamicImage::ImageRgba8(canvas).to_rgb8();
    let pixel_data = match settings.format {
        ImageFormat::Jpeg => {
            let quality = (settings.quality.clamp(0.0, 1.0) * 100.0).round().max(1.0) as u8;
            let mut buf = Cursor::new(Vec::new());
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality)
                .write_image(rgb.as_raw(), canvas_w, canvas_h, image::ColorType::Rgb8)
                .map_err(|e| ReportError::Image(format!("jpeg encode failed: {}", e)))?;
            ImagePixelData::Jpeg {
                data: buf.into_inner(),
            }
        }
        ImageFormat::Png => ImagePixelData::Rgb {
            data: rgb.into_raw(),
        },
    };

    Ok(LoadedImage {
        pixel_data,
        width_px: canvas_w,
        height_px: canvas_h,
    })
}

fn align_offset(outer: u32, inner: u32, align: ImageAlign) -> i64 {
    let slack = outer.saturating_sub(inner) as i64;
    match align {
        ImageAlign::Start => 0,
        ImageAlign::Center => slack / 2,
        ImageAlign::End => slack,
    }
}

// ── Concurrent loading ──────────────────────────────────────────

/// Fetch and prepare every source concurrently, racing `timeout`.
///
/// The result has one slot per source. `None` marks a missing source, a
/// failed load, or a load still running when the deadline passed. Late
/// loads are detached rather than aborted; their results are discarded.
pub async fn load_images(
    fetcher: Arc<dyn ImageFetcher>,
    sources: Vec<Option<String>>,
    target: (f64, f64),
    settings: ImageSettings,
    timeout: Duration,
) -> Vec<Option<LoadedImage>> {
    let deadline = Instant::now() + timeout;
    let mut results: Vec<Option<LoadedImage>> = (0..sources.len()).map(|_| None).collect();
    let mut tasks = JoinSet::new();

    for (idx, src) in sources.into_iter().enumerate() {
        let Some(src) = src else { continue };
        let fetcher = Arc::clone(&fetcher);
        let settings = settings.clone();
        tasks.spawn(async move {
            match fetch_and_prepare(fetcher.as_ref(), &src, target, settings).await {
                Ok(image) => (idx, Some(image)),
                Err(e) => {
                    warn!(src = %truncate_src(&src), error = %e, "image load failed, leaving cell blank");
                    (idx, None)
                }
            }
        });
    }

    loop {
        match tokio::time::timeout_at(deadline, tasks.join_next()).await {
            Ok(Some(Ok((idx, image)))) => results[idx] = image,
            Ok(Some(Err(e))) => warn!(error = %e, "image task failed"),
            Ok(None) => break,
            Err(_) => {
                warn!(pending = tasks.len(), ?timeout, "image loads timed out");
                tasks.detach_all();
                break;
            }
        }
    }

    debug!(
        loaded = results.iter().filter(|r| r.is_some()).count(),
        slots = results.len(),
        "image chunk loaded"
    );
    results
}

async fn fetch_and_prepare(
    fetcher: &dyn ImageFetcher,
    src: &str,
    target: (f64, f64),
    settings: ImageSettings,
) -> Result<LoadedImage, ReportError> {
    let bytes = fetcher.fetch(src).await?;
    tokio::task::spawn_blocking(move || prepare_image(&bytes, target, &settings))
        .await
        .map_err(|e| ReportError::Image(format!("image worker failed: {}", e)))?
}

/// Data URIs are huge; keep log lines readable.
fn truncate_src(src: &str) -> String {
    const MAX: usize = 64;
    if src.len() <= MAX {
        return src.to_string();
    }
    let end = (0..=MAX).rev().find(|i| src.is_char_boundary(*i)).unwrap_or(0);
    format!("{}...", &src[..end])
}
