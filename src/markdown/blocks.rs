//! Line-oriented markdown blocks for `rawtext` sections.
//!
//! Each source line is classified in priority order: heading, pipe-table
//! run, list item, blank, paragraph. Tables consume a contiguous run of
//! `|`-prefixed lines; separator rows are dropped. Inline markers are
//! stripped from every piece of text that ends up on the page.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{is_separator_row, is_table_line, split_row, strip_inline};

static BULLET_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-*+][ \t]+(.*)$").expect("valid regex"));
static NUMBERED_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)[.)][ \t]+(.*)$").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListMarker {
    Bullet,
    /// The item number as written (`3` for `3.` or `3)`).
    Numbered(String),
}

impl ListMarker {
    /// The prefix drawn before the item text.
    pub fn prefix(&self) -> String {
        match self {
            ListMarker::Bullet => "\u{2022} ".to_string(),
            ListMarker::Numbered(n) => format!("{}. ", n),
        }
    }
}

/// One structural piece of a markdown document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// `#`, `##` or `###`. Deeper headings are clamped to level 3.
    Heading { level: u8, text: String },
    Table {
        header: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    ListItem { marker: ListMarker, text: String },
    Blank,
    Paragraph(String),
}

/// Split markdown into blocks.
pub fn parse_blocks(markdown: &str) -> Vec<Block> {
    let unified = markdown.replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<&str> = unified.split('\n').collect();
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim();

        if let Some((level, text)) = heading(line) {
            blocks.push(Block::Heading {
                level,
                text: strip_inline(text),
            });
            i += 1;
            continue;
        }

        if is_table_line(line) {
            let mut run = Vec::new();
            while i < lines.len() && is_table_line(lines[i]) {
                if !is_separator_row(lines[i]) {
                    run.push(split_row(lines[i]).iter().map(|c| strip_inline(c)).collect::<Vec<_>>());
                }
                i += 1;
            }
            let mut run = run.into_iter();
            if let Some(header) = run.next() {
                blocks.push(Block::Table {
                    header,
                    rows: run.collect(),
                });
            }
            continue;
        }

        if let Some(caps) = BULLET_ITEM.captures(line) {
            blocks.push(Block::ListItem {
                marker: ListMarker::Bullet,
                text: strip_inline(&caps[1]),
            });
        } else if let Some(caps) = NUMBERED_ITEM.captures(line) {
            blocks.push(Block::ListItem {
                marker: ListMarker::Numbered(caps[1].to_string()),
                text: strip_inline(&caps[2]),
            });
        } else if line.is_empty() {
            blocks.push(Block::Blank);
        } else {
            blocks.push(Block::Paragraph(strip_inline(line)));
        }
        i += 1;
    }

    blocks
}

fn heading(line: &str) -> Option<(u8, &str)> {
    let hashes = line.chars().take_while(|c| *c == '#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &line[hashes..];
    if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
        return None;
    }
    Some(((hashes as u8).min(3), rest.trim()))
}
