//! Path resolution against gadget data.
//!
//! Paths are dotted with optional bracket segments: `a.b[0].c`,
//! `answers["first name"]`, `rows['x'][2]`. Bracketed quoted keys may
//! contain dots. Resolution never fails loudly: any missing or nullish
//! intermediate just yields `None`.

use serde_json::Value;

/// Split a path into its segments, translating bracket syntax into the same
/// segment list a dotted path would produce.
pub fn segments(path: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut chars = path.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '.' => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            }
            '[' => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
                let quote = match chars.peek() {
                    Some(&q @ ('"' | '\'')) => {
                        chars.next();
                        Some(q)
                    }
                    _ => None,
                };
                let mut inner = String::new();
                while let Some(c) = chars.next() {
                    match quote {
                        Some(q) if c == q => {
                            // Consume up to and including the closing bracket.
                            for rest in chars.by_ref() {
                                if rest == ']' {
                                    break;
                                }
                            }
                            break;
                        }
                        None if c == ']' => break,
                        _ => inner.push(c),
                    }
                }
                let inner = if quote.is_some() {
                    inner
                } else {
                    inner.trim().to_string()
                };
                if !inner.is_empty() {
                    out.push(inner);
                }
            }
            _ => current.push(ch),
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Resolve `path` against `root`.
///
/// Numeric segments index arrays (or look up the same string key on
/// objects, for array-like maps). Empty paths and null roots resolve to
/// `None`.
pub fn resolve<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    if root.is_null() || path.trim().is_empty() {
        return None;
    }
    let parts = segments(path.trim());
    if parts.is_empty() {
        return None;
    }
    traverse(root, &parts)
}

/// Walk `value` one segment at a time.
fn traverse<'a>(value: &'a Value, parts: &[String]) -> Option<&'a Value> {
    let mut current = value;
    for part in parts {
        current = match current {
            Value::Object(map) => map.get(part.as_str())?,
            Value::Array(arr) => {
                let idx: usize = part.parse().ok()?;
                arr.get(idx)?
            }
            _ => return None,
        };
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dotted_and_bracket_segments_match() {
        assert_eq!(segments("a.b[0].c"), vec!["a", "b", "0", "c"]);
        assert_eq!(segments("a.b.0.c"), vec!["a", "b", "0", "c"]);
        assert_eq!(segments(r#"a["b"]['c']"#), vec!["a", "b", "c"]);
    }

    #[test]
    fn quoted_keys_keep_dots() {
        assert_eq!(segments(r#"answers["v1.2"].x"#), vec!["answers", "v1.2", "x"]);
    }

    #[test]
    fn resolves_nested_values() {
        let data = json!({ "a": { "b": [ { "c": 42 }, { "c": "second" } ] } });
        assert_eq!(resolve(&data, "a.b[0].c"), Some(&json!(42)));
        assert_eq!(resolve(&data, "a.b.1.c"), Some(&json!("second")));
        assert_eq!(resolve(&data, r#"a["b"][1]["c"]"#), Some(&json!("second")));
    }

    #[test]
    fn every_own_path_round_trips() {
        let data = json!({
            "name": "Ann",
            "tags": ["x", "y"],
            "nested": { "deep": { "list": [ { "v": true } ] } }
        });
        assert_eq!(resolve(&data, "name"), Some(&json!("Ann")));
        assert_eq!(resolve(&data, "tags[1]"), Some(&json!("y")));
        assert_eq!(resolve(&data, "nested.deep.list[0].v"), Some(&json!(true)));
        assert_eq!(resolve(&data, "nested.deep"), data.get("nested").and_then(|n| n.get("deep")));
    }

    #[test]
    fn missing_paths_are_none() {
        let data = json!({ "a": { "b": null }, "list": [1] });
        assert_eq!(resolve(&data, "a.b.c"), None);
        assert_eq!(resolve(&data, "a.x"), None);
        assert_eq!(resolve(&data, "list[5]"), None);
        assert_eq!(resolve(&data, "list.first"), None);
        assert_eq!(resolve(&data, "a.b[0]"), None);
    }

    #[test]
    fn empty_path_or_null_root() {
        let data = json!({ "a": 1 });
        assert_eq!(resolve(&data, ""), None);
        assert_eq!(resolve(&data, "   "), None);
        assert_eq!(resolve(&Value::Null, "a"), None);
    }

    #[test]
    fn numeric_key_on_object() {
        let data = json!({ "rows": { "0": "first" } });
        assert_eq!(resolve(&data, "rows[0]"), Some(&json!("first")));
    }
}
