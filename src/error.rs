//! Error types for paperweave library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for paperweave operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during layout reconciliation.
///
/// Lookups that may legitimately find nothing (outline search, candidate
/// disambiguation) return `None` or `-1` instead of an error.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A statistic was requested over a collection with nothing to measure.
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Unparsable path data, inverted coordinates or a missing box.
    #[error("Malformed geometry: {0}")]
    MalformedGeometry(String),

    /// Vector markup file larger than the configured limit.
    #[error("Input {} is {size} bytes, over the limit of {limit} bytes", path.display())]
    OversizedInput {
        /// Offending file
        path: PathBuf,
        /// Actual size in bytes
        size: u64,
        /// Configured limit in bytes
        limit: u64,
    },

    /// Error parsing vector markup or outline XML.
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    /// A tagged sequence line could not be interpreted.
    #[error("Malformed sequence at line {line}: {reason}")]
    MalformedSequence {
        /// 1-based line number
        line: usize,
        /// What was wrong with it
        reason: String,
    },

    /// Error during rendering (JSON).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Invalid page range string.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<roxmltree::Error> for Error {
    fn from(err: roxmltree::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Render(err.to_string())
    }
}
