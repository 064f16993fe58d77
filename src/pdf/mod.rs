//! # PDF Serializer
//!
//! Takes laid-out report pages and writes a valid PDF file.
//!
//! This is a from-scratch PDF writer. We write the raw PDF objects
//! ourselves because the report engine only ever needs a small, fixed
//! subset of the format:
//!
//! - Helvetica and Helvetica-Bold, referenced by name with
//!   WinAnsiEncoding (no embedding)
//! - filled and stroked rectangles and straight rules
//! - image XObjects, either baseline JPEG (DCTDecode) or raw RGB
//!   (FlateDecode)
//! - an `/Info` dictionary carrying the report title and author
//!
//! PDF coordinates have their origin at the bottom-left with y growing up.
//! Layout uses a top-left origin, so every y is flipped here and nowhere
//! else.

use std::collections::{BTreeSet, HashMap};
use std::fmt::Write as FmtWrite;
use std::io::Write as IoWrite;

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::error::ReportError;
use crate::font::StandardFont;
use crate::image_loader::{ImagePixelData, LoadedImage};
use crate::layout::{DrawCommand, LayoutElement, LayoutPage};
use crate::style::Color;

/// Metadata written to the document `/Info` dictionary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub author: Option<String>,
}

pub struct PdfWriter;

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<PdfObject>,
    /// Standard faces in use, with their object id. Index in this list
    /// is the `/F` resource number.
    font_objects: Vec<(StandardFont, usize)>,
    /// XObject ids for images, referenced as /Im0, /Im1, ...
    image_objects: Vec<usize>,
    /// Maps (page_index, image_position_in_page) to an index in image_objects.
    image_index_map: HashMap<(usize, usize), usize>,
}

struct PdfObject {
    data: Vec<u8>,
}

impl PdfBuilder {
    fn new() -> Self {
        Self {
            objects: Vec::new(),
            font_objects: Vec::new(),
            image_objects: Vec::new(),
            image_index_map: HashMap::new(),
        }
    }

    /// Append an object and return its id.
    fn push(&mut self, data: Vec<u8>) -> usize {
        self.objects.push(PdfObject { data });
        self.objects.len() - 1
    }

    /// Append a stream object with the given extra dictionary entries.
    fn push_stream(&mut self, dict_entries: &str, payload: &[u8]) -> usize {
        let mut data: Vec<u8> = Vec::new();
        let _ = write!(data, "<< {} /Length {} >>\nstream\n", dict_entries, payload.len());
        data.extend_from_slice(payload);
        data.extend_from_slice(b"\nendstream");
        self.push(data)
    }

    fn font_index(&self, font: StandardFont) -> usize {
        self.font_objects
            .iter()
            .position(|(f, _)| *f == font)
            .unwrap_or(0)
    }
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write laid-out pages to a PDF byte vector.
    pub fn write(&self, pages: &[LayoutPage], info: &DocumentInfo) -> Result<Vec<u8>, ReportError> {
        if pages.is_empty() {
            return Err(ReportError::Render("a report needs at least one page".to_string()));
        }

        let mut builder = PdfBuilder::new();

        // Reserve object IDs:
        // 0 = placeholder (PDF objects are 1-indexed)
        // 1 = Catalog
        // 2 = Pages (page tree root)
        // 3+ = fonts, images, then content streams and page objects
        builder.push(Vec::new());
        builder.push(Vec::new());
        builder.push(Vec::new());

        self.register_fonts(&mut builder, pages);
        self.register_images(&mut builder, pages);

        let font_resources = self.build_font_resource_dict(&builder);
        let mut page_obj_ids: Vec<usize> = Vec::new();

        for (page_idx, page) in pages.iter().enumerate() {
            let content = self.build_content_stream_for_page(page, page_idx, &builder);
            let compressed = compress_to_vec_zlib(content.as_bytes(), 6);
            let content_obj_id = builder.push_stream("/Filter /FlateDecode", &compressed);

            let xobject_resources = self.build_xobject_resource_dict(page_idx, &builder);
            let resources = if xobject_resources.is_empty() {
                format!("/Font << {} >>", font_resources)
            } else {
                format!("/Font << {} >> /XObject << {} >>", font_resources, xobject_resources)
            };
            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << {} >> >>",
                page.width, page.height, content_obj_id, resources
            );
            page_obj_ids.push(builder.push(page_dict.into_bytes()));
        }

        builder.objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2].data = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        let info_obj_id = builder.push(self.build_info_dict(info).into_bytes());

        Ok(self.serialize(&builder, info_obj_id))
    }

    fn build_info_dict(&self, info: &DocumentInfo) -> String {
        let mut dict = String::from("<< ");
        if let Some(title) = info.title.as_deref().filter(|t| !t.trim().is_empty()) {
            let _ = write!(dict, "/Title ({}) ", Self::encode_text(title));
        }
        if let Some(author) = info.author.as_deref().filter(|a| !a.trim().is_empty()) {
            let _ = write!(dict, "/Author ({}) ", Self::encode_text(author));
        }
        dict.push_str("/Producer (gadget-report) /Creator (gadget-report) >>");
        dict
    }

    // ── Fonts ───────────────────────────────────────────────────

    /// Register every standard face used by any text line. Helvetica is
    /// always registered so each page has a valid /Font resource.
    fn register_fonts(&self, builder: &mut PdfBuilder, pages: &[LayoutPage]) {
        let mut used: BTreeSet<StandardFont> = BTreeSet::new();
        used.insert(StandardFont::Helvetica);
        for page in pages {
            for element in &page.elements {
                if let DrawCommand::Text { lines, .. } = &element.draw {
                    used.extend(lines.iter().map(|l| l.font));
                }
            }
        }

        for font in used {
            let dict = format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                font.pdf_name()
            );
            let id = builder.push(dict.into_bytes());
            builder.font_objects.push((font, id));
        }
    }

    fn build_font_resource_dict(&self, builder: &PdfBuilder) -> String {
        builder
            .font_objects
            .iter()
            .enumerate()
            .map(|(idx, (_, obj_id))| format!("/F{} {} 0 R", idx, obj_id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    // ── Images ──────────────────────────────────────────────────

    /// Create one XObject per image element and remember where each one
    /// is referenced from.
    fn register_images(&self, builder: &mut PdfBuilder, pages: &[LayoutPage]) {
        for (page_idx, page) in pages.iter().enumerate() {
            let images = page.elements.iter().filter_map(|el| match &el.draw {
                DrawCommand::Image { image_data } => Some(image_data),
                _ => None,
            });
            for (position, image) in images.enumerate() {
                let img_idx = builder.image_objects.len();
                let xobj_id = Self::write_image_xobject(builder, image);
                builder.image_objects.push(xobj_id);
                builder.image_index_map.insert((page_idx, position), img_idx);
            }
        }
    }

    fn write_image_xobject(builder: &mut PdfBuilder, image: &LoadedImage) -> usize {
        let header = format!(
            "/Type /XObject /Subtype /Image /Width {} /Height {} \
             /ColorSpace /DeviceRGB /BitsPerComponent 8",
            image.width_px, image.height_px
        );
        match &image.pixel_data {
            ImagePixelData::Jpeg { data } => {
                builder.push_stream(&format!("{} /Filter /DCTDecode", header), data)
            }
            ImagePixelData::Rgb { data } => {
                let compressed = compress_to_vec_zlib(data, 6);
                builder.push_stream(&format!("{} /Filter /FlateDecode", header), &compressed)
            }
        }
    }

    /// Build the /XObject resource dict entries for a specific page.
    fn build_xobject_resource_dict(&self, page_idx: usize, builder: &PdfBuilder) -> String {
        let mut entries: Vec<(usize, usize)> = builder
            .image_index_map
            .iter()
            .filter(|((pidx, _), _)| *pidx == page_idx)
            .map(|(_, &img_idx)| (img_idx, builder.image_objects[img_idx]))
            .collect();
        entries.sort_by_key(|(idx, _)| *idx);
        entries
            .iter()
            .map(|(idx, obj_id)| format!("/Im{} {} 0 R", idx, obj_id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    // ── Content streams ─────────────────────────────────────────

    /// Build the PDF content stream for a single page.
    fn build_content_stream_for_page(&self, page: &LayoutPage, page_idx: usize, builder: &PdfBuilder) -> String {
        let mut stream = String::new();
        let mut image_counter = 0usize;
        for element in &page.elements {
            self.write_element(&mut stream, element, page.height, builder, page_idx, &mut image_counter);
        }
        stream
    }

    fn write_element(
        &self,
        stream: &mut String,
        element: &LayoutElement,
        page_height: f64,
        builder: &PdfBuilder,
        page_idx: usize,
        image_counter: &mut usize,
    ) {
        match &element.draw {
            DrawCommand::Rect {
                fill,
                stroke,
                stroke_width,
            } => {
                let op = match (fill, stroke) {
                    (Some(_), Some(_)) => "B",
                    (Some(_), None) => "f",
                    (None, Some(_)) => "S",
                    (None, None) => return,
                };
                let y = page_height - element.y - element.height;
                let _ = writeln!(stream, "q");
                if let Some(c) = fill {
                    let _ = writeln!(stream, "{} rg", Self::color_operands(*c));
                }
                if let Some(c) = stroke {
                    let _ = writeln!(stream, "{} RG\n{:.2} w", Self::color_operands(*c), stroke_width);
                }
                let _ = writeln!(
                    stream,
                    "{:.2} {:.2} {:.2} {:.2} re\n{}\nQ",
                    element.x, y, element.width, element.height, op
                );
            }

            DrawCommand::Line { color, thickness } => {
                let _ = writeln!(
                    stream,
                    "q\n{} RG\n{:.2} w\n{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ",
                    Self::color_operands(*color),
                    thickness,
                    element.x,
                    page_height - element.y,
                    element.x + element.width,
                    page_height - element.y - element.height
                );
            }

            DrawCommand::Text { lines, color } => {
                if lines.is_empty() {
                    return;
                }
                let _ = writeln!(stream, "BT\n{} rg", Self::color_operands(*color));
                let mut current: Option<(StandardFont, f64)> = None;
                for line in lines {
                    if current != Some((line.font, line.font_size)) {
                        let _ = writeln!(
                            stream,
                            "/F{} {:.2} Tf",
                            builder.font_index(line.font),
                            line.font_size
                        );
                        current = Some((line.font, line.font_size));
                    }
                    let _ = writeln!(
                        stream,
                        "1 0 0 1 {:.2} {:.2} Tm\n({}) Tj",
                        line.x,
                        page_height - line.y,
                        Self::encode_text(&line.text)
                    );
                }
                let _ = writeln!(stream, "ET");
            }

            DrawCommand::Image { .. } => {
                let position = *image_counter;
                *image_counter += 1;
                let x = element.x;
                let y = page_height - element.y - element.height;
                if let Some(&img_idx) = builder.image_index_map.get(&(page_idx, position)) {
                    let _ = writeln!(
                        stream,
                        "q\n{:.4} 0 0 {:.4} {:.2} {:.2} cm\n/Im{} Do\nQ",
                        element.width, element.height, x, y, img_idx
                    );
                } else {
                    // Grey placeholder if the image was never registered
                    let _ = writeln!(
                        stream,
                        "q\n0.9 0.9 0.9 rg\n{:.2} {:.2} {:.2} {:.2} re\nf\nQ",
                        x, y, element.width, element.height
                    );
                }
            }
        }
    }

    fn color_operands(c: Color) -> String {
        format!("{:.3} {:.3} {:.3}", c.r, c.g, c.b)
    }

    /// Encode text as the body of a PDF literal string in WinAnsiEncoding.
    /// Characters outside the encoding become `?`.
    fn encode_text(text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for ch in text.chars() {
            let b = Self::unicode_to_winansi(ch).unwrap_or(b'?');
            match b {
                b'\\' => out.push_str("\\\\"),
                b'(' => out.push_str("\\("),
                b')' => out.push_str("\\)"),
                0x20..=0x7E => out.push(b as char),
                _ => {
                    // Octal escape for bytes outside ASCII printable range
                    let _ = write!(out, "\\{:03o}", b);
                }
            }
        }
        out
    }

    /// Map a Unicode codepoint to a WinAnsiEncoding byte value.
    ///
    /// WinAnsiEncoding is based on Windows-1252. Most codepoints in
    /// 0x20..=0x7E and 0xA0..=0xFF map directly. The 0x80..=0x9F range
    /// holds smart quotes, the bullet, dashes and a few letters.
    fn unicode_to_winansi(ch: char) -> Option<u8> {
        let cp = ch as u32;
        if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
            return Some(cp as u8);
        }
        match cp {
            0x20AC => Some(0x80), // Euro sign
            0x201A => Some(0x82), // Single low-9 quotation mark
            0x0192 => Some(0x83), // Latin small letter f with hook
            0x201E => Some(0x84), // Double low-9 quotation mark
            0x2026 => Some(0x85), // Horizontal ellipsis
            0x2020 => Some(0x86), // Dagger
            0x2021 => Some(0x87), // Double dagger
            0x02C6 => Some(0x88), // Modifier letter circumflex accent
            0x2030 => Some(0x89), // Per mille sign
            0x0160 => Some(0x8A), // Latin capital letter S with caron
            0x2039 => Some(0x8B), // Single left-pointing angle quotation
            0x0152 => Some(0x8C), // Latin capital ligature OE
            0x017D => Some(0x8E), // Latin capital letter Z with caron
            0x2018 => Some(0x91), // Left single quotation mark
            0x2019 => Some(0x92), // Right single quotation mark
            0x201C => Some(0x93), // Left double quotation mark
            0x201D => Some(0x94), // Right double quotation mark
            0x2022 => Some(0x95), // Bullet
            0x2013 => Some(0x96), // En dash
            0x2014 => Some(0x97), // Em dash
            0x02DC => Some(0x98), // Small tilde
            0x2122 => Some(0x99), // Trade mark sign
            0x0161 => Some(0x9A), // Latin small letter s with caron
            0x203A => Some(0x9B), // Single right-pointing angle quotation
            0x0153 => Some(0x9C), // Latin small ligature oe
            0x017E => Some(0x9E), // Latin small letter z with caron
            0x0178 => Some(0x9F), // Latin capital letter Y with diaeresis
            _ => None,
        }
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(&self, builder: &PdfBuilder, info_obj_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            builder.objects.len(),
            info_obj_id,
            xref_offset
        );

        output
    }
}
