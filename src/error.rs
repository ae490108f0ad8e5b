//! Error types for the pdfblocks engine.

use std::io;
use thiserror::Error;

use crate::model::BlockId;

/// Result type alias for pdfblocks operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading, editing, or exporting a block scene.
///
/// Edits that have no target (nothing selected) are not errors; they are
/// reported through [`crate::edit::EditOutcome`] instead.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not a document the renderer understands.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF header declares a version we cannot read.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// The source document could not be decoded.
    #[error("Document load failed: {0}")]
    Load(String),

    /// Text content of a page could not be extracted.
    #[error("Text extraction error on page {page}: {reason}")]
    TextExtract { page: u32, reason: String },

    /// Vector content of a page could not be extracted.
    #[error("Vector extraction error on page {page}: {reason}")]
    VectorExtract { page: u32, reason: String },

    /// An optional collaborator is not available, so the feature it backs is off.
    #[error("{feature} is unavailable: {reason}")]
    Unavailable { feature: String, reason: String },

    /// Page index does not exist in the scene.
    #[error("Page {0} not found")]
    PageNotFound(u32),

    /// Block id does not exist in the scene.
    #[error("Block {0} not found")]
    BlockNotFound(BlockId),

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Page range string that does not parse.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// A service request arrived before any document was loaded.
    #[error("No document loaded")]
    NoDocument,

    /// Screenshot capture failed for a page during export.
    #[error("Capture failed for page {page}: {reason}")]
    Capture { page: u32, reason: String },

    /// The output document could not be assembled.
    #[error("Export error: {0}")]
    Export(String),

    /// Serialization of transport state failed.
    #[error("Serialization error: {0}")]
    Serialize(String),
}

impl Error {
    /// Shorthand for an [`Error::Unavailable`] value.
    pub fn unavailable(feature: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Unavailable {
            feature: feature.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error means a collaborator is missing rather than broken.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Error::Unavailable { .. })
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            _ => Error::Load(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialize(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::PageOutOfRange(10, 5);
        assert_eq!(
            err.to_string(),
            "Page 10 is out of range (document has 5 pages)"
        );

        let err = Error::unavailable("Page rasterization", "no rasterizer linked");
        assert_eq!(
            err.to_string(),
            "Page rasterization is unavailable: no rasterizer linked"
        );
        assert!(err.is_unavailable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(!err.is_unavailable());
    }
}
