//! Structured error types for the Folio layout engine.
//!
//! Five variants cover the real error sources: JSON parsing, bad table
//! configuration, malformed image references, image download/storage
//! failures, and opaque drawing-surface failures passed through unmodified.

use thiserror::Error;

use crate::surface::SurfaceError;

/// The unified error type returned by all public Folio API functions.
#[derive(Debug, Error)]
pub enum FolioError {
    /// JSON input failed to parse as a valid Folio document.
    #[error("failed to parse document: {source}{hint}")]
    Parse {
        source: serde_json::Error,
        /// Pre-formatted hint suffix, empty when no hint applies.
        hint: String,
    },

    /// Table layout could not be configured (bad or missing column widths).
    #[error("table configuration error: {0}")]
    Configuration(String),

    /// An image URL is empty or has no recognizable extension.
    #[error("invalid image reference '{url}': {reason}")]
    InvalidReference { url: String, reason: String },

    /// An image could not be downloaded, or its backing file could not be
    /// written and verified on disk.
    #[error("failed to fetch image '{url}': {reason}")]
    Fetch { url: String, reason: String },

    /// The drawing surface rejected a paint or page operation.
    #[error("drawing surface error: {0}")]
    Surface(#[from] SurfaceError),
}

impl From<serde_json::Error> for FolioError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "\n  Hint: check for trailing commas, missing quotes, or unescaped characters."
            }
            serde_json::error::Category::Data => {
                "\n  Hint: the JSON is valid but doesn't match the Folio document schema. \
                 Each content node carries exactly one of `text`, `list`, `image`, `table`."
            }
            serde_json::error::Category::Eof => {
                "\n  Hint: unexpected end of input, is the JSON truncated?"
            }
            serde_json::error::Category::Io => "",
        };
        FolioError::Parse {
            source: e,
            hint: hint.to_string(),
        }
    }
}
