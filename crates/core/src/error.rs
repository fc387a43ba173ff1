//! Error types surfaced by format detection and parsing.

use thiserror::Error;

/// Failures that abort the processing of a single input file.
/// Records that merely fail to map are dropped by the parsers and never show up here.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The probe could not classify the content.
    #[error("unrecognized format")]
    UnrecognizedFormat,

    /// A format name outside the known set.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("malformed XML document: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed JSON document: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
