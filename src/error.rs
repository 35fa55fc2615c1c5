//! Error types for pdfstruct.

use std::io;
use thiserror::Error;

/// Result type alias for pdfstruct operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error returned by the conversion pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// The PDF input could not be read or decoded.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// The threshold configuration was rejected before processing.
    #[error(transparent)]
    ClassificationConfig(#[from] ClassificationConfigError),

    /// Invalid page range specification.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// Error while serializing the JSON output.
    #[error("Rendering error: {0}")]
    Render(String),

    /// JSON that does not follow the node schema.
    #[error("Invalid document JSON: {0}")]
    InvalidDocument(String),

    /// I/O error outside of PDF loading (e.g. writing output).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Whether this error came from reading the PDF input.
    pub fn is_extraction(&self) -> bool {
        matches!(self, Error::Extraction(_))
    }

    /// Whether this error came from an invalid threshold table.
    pub fn is_config(&self) -> bool {
        matches!(self, Error::ClassificationConfig(_))
    }
}

/// Malformed, corrupted, or unsupported PDF input.
///
/// Fatal for the conversion; no partial output is produced.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// I/O error when reading the input.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version header is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The document is encrypted and no password was supplied.
    #[error("Document is encrypted")]
    Encrypted,

    /// The supplied password did not decrypt the document.
    #[error("Invalid password")]
    InvalidPassword,

    /// The PDF structure is corrupted or malformed.
    #[error("Corrupted PDF structure: {0}")]
    Corrupted(String),

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),
}

impl From<lopdf::Error> for ExtractionError {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => ExtractionError::Io(e),
            lopdf::Error::Decryption(_) => ExtractionError::Encrypted,
            _ => ExtractionError::PdfParse(err.to_string()),
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        Error::Extraction(err.into())
    }
}

/// An invalid font-size threshold table.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClassificationConfigError {
    /// A threshold is NaN or infinite.
    #[error("Threshold {name} is not a finite number")]
    NotFinite {
        /// Name of the offending option
        name: &'static str,
    },

    /// A threshold is zero or negative.
    #[error("Threshold {name} must be positive (got {value})")]
    NonPositive {
        /// Name of the offending option
        name: &'static str,
        /// The rejected value
        value: f32,
    },

    /// A lower heading band is not strictly below the band above it.
    #[error("{lower} ({lower_value}) must be smaller than {upper} ({upper_value})")]
    InvertedBands {
        /// The more senior band
        upper: &'static str,
        /// Its value
        upper_value: f32,
        /// The less senior band
        lower: &'static str,
        /// Its value
        lower_value: f32,
    },

    /// An adaptive ratio is not usable.
    #[error("Invalid heading ratio {name}: {value}")]
    InvalidRatio {
        /// Name of the offending ratio
        name: &'static str,
        /// The rejected value
        value: f32,
    },

    /// A threshold table could not be parsed.
    #[error("Cannot parse threshold table: {0}")]
    Parse(String),
}
