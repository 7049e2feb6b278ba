//! Error types for pdfgloss.

use std::io;
use thiserror::Error;

/// Result type alias for pdfgloss operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while translating a PDF page.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// The input document could not be opened (missing, unreadable or corrupt).
    #[error("Cannot open document {path}: {reason}")]
    DocumentOpen { path: String, reason: String },

    /// The requested page could not be decoded.
    #[error("Cannot decode page {page}: {reason}")]
    PageDecode { page: u32, reason: String },

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// The translation backend failed.
    #[error("Translation error: {0}")]
    Translation(String),

    /// An annotation could not be added to the edit model.
    #[error("Annotation error: {0}")]
    Annotation(String),

    /// The edited document could not be serialized.
    #[error("Cannot write document {path}: {reason}")]
    Write { path: String, reason: String },

    /// The run was interrupted while waiting between translation calls.
    #[error("Interrupted")]
    Interrupted,

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error was caused by an interruption request.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Error::Interrupted)
    }
}

#[cfg(feature = "google")]
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Translation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Interrupted;
        assert_eq!(err.to_string(), "Interrupted");

        let err = Error::PageOutOfRange(10, 5);
        assert_eq!(
            err.to_string(),
            "Page 10 is out of range (document has 5 pages)"
        );

        let err = Error::DocumentOpen {
            path: "missing.pdf".to_string(),
            reason: "not found".to_string(),
        };
        assert_eq!(err.to_string(), "Cannot open document missing.pdf: not found");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_is_interrupted() {
        assert!(Error::Interrupted.is_interrupted());
        assert!(!Error::Translation("boom".into()).is_interrupted());
    }
}
