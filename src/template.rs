//! # Template Interpolation
//!
//! Substitutes `{{ path }}` tokens with values resolved from gadget data.
//! Missing values become empty strings and malformed tokens are left as
//! literal text, so interpolation never fails.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

use crate::path;
use crate::text::normalize;

static TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\{\{\s*([A-Za-z0-9_.\-\[\]'"]+)\s*\}\}"#).expect("valid regex"));

/// Interpolate `template` against `data` and normalize the result.
pub fn interpolate(template: &str, data: &Value) -> String {
    normalize(&interpolate_raw(template, data))
}

/// Interpolate without normalizing. Used for markdown, where line structure
/// and indentation still matter to the block parser.
pub fn interpolate_raw(template: &str, data: &Value) -> String {
    TOKEN
        .replace_all(template, |caps: &Captures| {
            path::resolve(data, &caps[1])
                .map(value_to_display)
                .unwrap_or_default()
        })
        .into_owned()
}

/// Render a JSON value the way it appears in a report cell.
///
/// Strings pass through, `null` is empty, everything else is compact JSON
/// (`42`, `true`, `{"a":1}`).
pub fn value_to_display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Render a grid item value: strings are templates, other values are
/// stringified. Always normalized.
pub fn render_value(value: &Value, data: &Value) -> String {
    match value {
        Value::String(s) => interpolate(s, data),
        other => normalize(&value_to_display(other)),
    }
}
