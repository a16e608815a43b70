//! Structured error types for the Lamina engine.
//!
//! Layout is a pure function of its input: every error is deterministic and
//! fatal for the whole call. There is no partial output.

use thiserror::Error;

use crate::font::FontError;

/// The unified error type returned by all public Lamina API functions.
#[derive(Debug, Error)]
pub enum Error {
    /// JSON input failed to parse as a valid Lamina document.
    #[error("Failed to parse document: {source}{}", hint_suffix(.hint))]
    Parse {
        source: serde_json::Error,
        hint: String,
    },
    /// A size could not be determined: a non-positive available width, or
    /// a stage or page root without explicit width and height.
    #[error("Measure error: {0}")]
    Measure(String),
    /// A font could not be loaded or resolved.
    #[error("Font error: {0}")]
    Font(#[from] FontError),
    /// The laid-out tree has a shape the pager cannot handle.
    #[error("Structure error: {0}")]
    Structure(String),
    /// The engine configuration is invalid.
    #[error("Config error: {0}")]
    Config(String),
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the Lamina document schema. Check node kinds and field names.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input, is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        Error::Parse { source: e, hint }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
