//! # Markdown
//!
//! Two ways of turning markdown into report content:
//!
//! - [`sanitize`] flattens markdown to plain prose for `text` sections,
//!   lifting pipe tables out as structured [`ExtractedTable`]s so they can
//!   still be drawn as real tables.
//! - [`blocks::parse_blocks`] keeps the structure (headings, lists, tables,
//!   blank lines) for the line-oriented `rawtext` renderer.

pub mod blocks;

pub use blocks::{parse_blocks, Block, ListMarker};

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::model::TableColumn;
use crate::text::normalize;

static HEADER_MARKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*#{1,6}[ \t]+").expect("valid regex"));
static LIST_MARKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*[-*+][ \t]+").expect("valid regex"));
static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*([^*]+?)\*\*").expect("valid regex"));
static BOLD_UNDERSCORE: Lazy<Regex> = Lazy::new(|| Regex::new(r"__([^_]+?)__").expect("valid regex"));
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*\n]+)\*").expect("valid regex"));
static CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").expect("valid regex"));
static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]\([^)]*\)").expect("valid regex"));
static EXCESS_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("valid regex"));
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\[TABLE_\d+\]\]").expect("valid regex"));
static SEPARATOR_ROW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\|?[ \t]*:?-+:?[ \t]*(\|[ \t]*:?-+:?[ \t]*)*\|?[ \t]*$").expect("valid regex"));

/// A pipe table lifted out of markdown, shaped like a `table` section.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedTable {
    pub columns: Vec<TableColumn>,
    /// One object per body row, keyed by the column keys.
    pub data: Vec<Value>,
}

/// Result of flattening a markdown blob.
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizedMarkdown {
    pub text: String,
    pub tables: Vec<ExtractedTable>,
}

/// Flatten markdown to prose and extract its pipe tables.
pub fn sanitize(markdown: &str) -> SanitizedMarkdown {
    let unified = markdown.replace("\r\n", "\n");
    let (with_placeholders, tables) = extract_tables(&unified);

    let text = HEADER_MARKS.replace_all(&with_placeholders, "");
    let text = LIST_MARKS.replace_all(&text, "\u{2022} ");
    let text = BOLD.replace_all(&text, "$1");
    let text = BOLD_UNDERSCORE.replace_all(&text, "$1");
    let text = ITALIC.replace_all(&text, "$1");
    let text = CODE.replace_all(&text, "$1");
    let text = LINK.replace_all(&text, "$1");
    let text = PLACEHOLDER.replace_all(&text, "");
    let text = EXCESS_NEWLINES.replace_all(&text, "\n\n");

    SanitizedMarkdown {
        text: normalize(&text),
        tables,
    }
}

/// Strip inline emphasis/code/link markers from a single line.
pub fn strip_inline(line: &str) -> String {
    let text = BOLD.replace_all(line, "$1");
    let text = BOLD_UNDERSCORE.replace_all(&text, "$1");
    let text = ITALIC.replace_all(&text, "$1");
    let text = CODE.replace_all(&text, "$1");
    LINK.replace_all(&text, "$1").into_owned()
}

/// Derive a snake-case key from a column header.
pub fn column_key(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

pub(crate) fn is_table_line(line: &str) -> bool {
    line.trim_start().starts_with('|')
}

pub(crate) fn is_separator_row(line: &str) -> bool {
    SEPARATOR_ROW.is_match(line.trim())
}

/// Split a `| a | b |` row into trimmed cells.
pub(crate) fn split_row(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    inner.split('|').map(|c| c.trim().to_string()).collect()
}

/// Replace each header + separator + body-rows region with a placeholder.
fn extract_tables(source: &str) -> (String, Vec<ExtractedTable>) {
    let lines: Vec<&str> = source.split('\n').collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut tables = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let starts_table = is_table_line(lines[i])
            && i + 1 < lines.len()
            && is_table_line(lines[i + 1])
            && is_separator_row(lines[i + 1]);
        if !starts_table {
            out.push(lines[i].to_string());
            i += 1;
            continue;
        }

        let headers: Vec<String> = split_row(lines[i]).iter().map(|h| normalize(h)).collect();
        let columns: Vec<TableColumn> = headers
            .iter()
            .map(|h| TableColumn {
                header: h.clone(),
                key: column_key(h),
            })
            .collect();

        i += 2;
        let mut data = Vec::new();
        while i < lines.len() && is_table_line(lines[i]) {
            if !is_separator_row(lines[i]) {
                let cells = split_row(lines[i]);
                let mut row = Map::new();
                for (idx, column) in columns.iter().enumerate() {
                    let cell = cells.get(idx).map(|c| normalize(c)).unwrap_or_default();
                    row.insert(column.key.clone(), Value::String(cell));
                }
                data.push(Value::Object(row));
            }
            i += 1;
        }

        out.push(format!("[[TABLE_{}]]", tables.len()));
        tables.push(ExtractedTable { columns, data });
    }

    (out.join("\n"), tables)
}
