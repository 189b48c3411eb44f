//! Error types for wordbook operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading word lists, assembling documents or
/// exporting them.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The external renderer could not be located or failed validation.
    #[error(
        "Could not find a working {program} executable{}. Install wkhtmltopdf \
         (https://wkhtmltopdf.org) or pass the path of the executable explicitly.",
        .tried.as_ref().map(|p| format!(" at {}", p.display())).unwrap_or_default()
    )]
    RendererNotFound {
        program: &'static str,
        tried: Option<PathBuf>,
    },

    /// The external renderer ran but did not produce the requested output.
    #[error("{program} failed ({status}): {stderr}")]
    RendererFailed {
        program: String,
        status: String,
        stderr: String,
    },

    /// A word was missing from the dictionary and the abort policy is in force.
    #[error("\"{word}\" (lesson \"{lesson}\") was not found in the dictionary")]
    WordNotFound { lesson: String, word: String },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Encoding failed: {0}")]
    Encode(String),
}

pub type Result<T> = std::result::Result<T, Error>;
