//! Structured error types for report generation.
//!
//! Most degenerate inputs never reach this type: missing paths, malformed
//! templates and broken images all degrade to "render nothing" locally.
//! What remains is input parsing, the strict unknown-content mode, and
//! genuine engine failures.

use thiserror::Error;

/// The unified error type returned by the public generation API.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Metadata or gadget data JSON failed to parse.
    #[error("Failed to parse report input: {source}{}", format_hint(.hint))]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },

    /// An image could not be fetched, decoded or re-encoded.
    /// Only ever surfaces from the image loader; the image grid swallows it.
    #[error("Image error: {0}")]
    Image(String),

    /// A section declared a content type this engine does not know, and the
    /// caller asked for strict handling.
    #[error("Section '{section}' has an unknown content type")]
    UnknownContent { section: String },

    /// Layout or PDF serialization failed.
    #[error("Render error: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_hint(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the report metadata schema. Check section content types and field names.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        ReportError::Parse { source: e, hint }
    }
}
