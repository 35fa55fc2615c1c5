//! # pdfstruct
//!
//! Infer document structure from PDF typography and emit it as JSON.
//!
//! A PDF has no notion of "heading" or "paragraph"; it only paints text
//! with fonts at positions. This library extracts the painted text runs,
//! classifies each one by its font size and weight, nests the results into
//! a heading hierarchy, and serializes that tree to a stable JSON schema
//! with a few root-level metadata fields.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfstruct::{convert_bytes, ConvertOptions, JsonFormat};
//!
//! fn main() -> pdfstruct::Result<()> {
//!     let data = std::fs::read("document.pdf")?;
//!     let doc = convert_bytes(&data, "https://example.com/", &ConvertOptions::default())?;
//!
//!     println!("{}", doc.generated_title().unwrap_or_default());
//!     println!("{}", doc.to_json(JsonFormat::Pretty)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! - [`parser`]: PDF bytes → ordered [`TextRun`]s
//! - [`classify`]: run → [`Role`] using a [`Thresholds`] table
//! - [`structure`]: classified runs → [`StructureNode`] tree
//! - [`render`]: tree → [`JsonDocument`] with `source_url`,
//!   `element_count` and `generated_title`
//! - [`convert`]: the driver tying the stages together

pub mod classify;
pub mod convert;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;
pub mod structure;

// Re-export commonly used types
pub use classify::{classify, FontStyleClassifier, ThresholdStrategy, Thresholds};
pub use convert::{ConversionStats, ConvertOptions, ConvertResult, PdfConverter};
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_pdf, PdfFormat};
pub use error::{ClassificationConfigError, Error, ExtractionError, Result};
pub use model::{DocumentInfo, FontStyle, NodeKind, Role, StructureNode, TextRun};
pub use parser::{ErrorMode, PageSelection, ParseOptions, ReadingOrder, TextRunExtractor};
pub use render::{JsonDocument, JsonFormat, MetadataEnricher, ProjectOptions};
pub use structure::{ParagraphMerge, StructureBuilder};

use std::io::Read;
use std::path::Path;

/// Convert PDF bytes to an enriched JSON document.
///
/// `base_url` is written to `source_url` verbatim; pass an empty string to
/// omit the field.
///
/// # Example
///
/// ```no_run
/// use pdfstruct::{convert_bytes, ConvertOptions};
///
/// let data = std::fs::read("document.pdf").unwrap();
/// let doc = convert_bytes(&data, "", &ConvertOptions::default()).unwrap();
/// assert!(doc.source_url().is_none());
/// ```
pub fn convert_bytes(data: &[u8], base_url: &str, options: &ConvertOptions) -> Result<JsonDocument> {
    let options = options.clone().with_base_url(base_url);
    PdfConverter::new(options)?.convert_bytes(data)
}

/// Convert a PDF file.
///
/// # Example
///
/// ```no_run
/// use pdfstruct::{convert_file, ConvertOptions};
///
/// let options = ConvertOptions::new().with_base_url("https://example.com/");
/// let doc = convert_file("document.pdf", &options).unwrap();
/// println!("{} elements", doc.element_count().unwrap_or(0));
/// ```
pub fn convert_file<P: AsRef<Path>>(path: P, options: &ConvertOptions) -> Result<JsonDocument> {
    let result = PdfConverter::new(options.clone())?.convert_file(path)?;
    Ok(result.document)
}

/// Convert a PDF from a reader.
///
/// # Example
///
/// ```no_run
/// use pdfstruct::{convert_reader, ConvertOptions};
/// use std::fs::File;
///
/// let file = File::open("document.pdf").unwrap();
/// let doc = convert_reader(file, &ConvertOptions::default()).unwrap();
/// ```
pub fn convert_reader<R: Read>(reader: R, options: &ConvertOptions) -> Result<JsonDocument> {
    let result = PdfConverter::new(options.clone())?.convert_reader(reader)?;
    Ok(result.document)
}

/// Convert several PDF files in parallel.
///
/// One independent pipeline runs per input; results are returned in input
/// order. An invalid threshold configuration fails every entry.
pub fn convert_batch<P: AsRef<Path> + Sync>(paths: &[P], options: &ConvertOptions) -> Vec<Result<JsonDocument>> {
    match PdfConverter::new(options.clone()) {
        Ok(converter) => converter
            .convert_batch(paths)
            .into_iter()
            .map(|result| result.map(ConvertResult::into_document))
            .collect(),
        Err(e) => paths.iter().map(|_| Err(e.clone().into())).collect(),
    }
}

/// Convert a PDF file, reading it asynchronously.
#[cfg(feature = "async")]
pub async fn convert_file_async<P: AsRef<Path>>(path: P, options: &ConvertOptions) -> Result<JsonDocument> {
    let converter = PdfConverter::new(options.clone())?;
    Ok(converter.convert_file_async(path).await?.document)
}

/// Extract text runs in reading order.
///
/// # Example
///
/// ```no_run
/// use pdfstruct::{extract_runs, ParseOptions};
///
/// let data = std::fs::read("document.pdf").unwrap();
/// for run in extract_runs(&data, &ParseOptions::default()).unwrap() {
///     println!("{:>5.1}pt {}", run.font_size(), run.text());
/// }
/// ```
pub fn extract_runs(data: &[u8], options: &ParseOptions) -> Result<Vec<TextRun>> {
    let extractor = TextRunExtractor::from_bytes(data, options)?;
    Ok(extractor.collect_runs()?)
}

/// Builder for converting PDF documents.
///
/// # Example
///
/// ```no_run
/// use pdfstruct::Pdfstruct;
///
/// let json = Pdfstruct::new()
///     .with_base_url("https://example.com/")
///     .adaptive()
///     .lenient()
///     .convert("document.pdf")?
///     .to_json()?;
/// # Ok::<(), pdfstruct::Error>(())
/// ```
pub struct Pdfstruct {
    options: ConvertOptions,
}

impl Pdfstruct {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self {
            options: ConvertOptions::default(),
        }
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.options = self.options.with_base_url(base_url);
        self
    }

    /// Use a fixed threshold table.
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.options = self.options.with_thresholds(thresholds);
        self
    }

    /// Derive thresholds from the body font size.
    pub fn adaptive(mut self) -> Self {
        self.options = self.options.adaptive();
        self
    }

    /// Promote bold body text to emphasis.
    pub fn with_bold_emphasis(mut self) -> Self {
        self.options.thresholds = self.options.thresholds.with_bold_implies_heading(true);
        self
    }

    /// Enable lenient parsing mode.
    pub fn lenient(mut self) -> Self {
        self.options = self.options.lenient();
        self
    }

    /// Set document password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.options = self.options.with_password(password);
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.options = self.options.with_pages(pages);
        self
    }

    /// Set reading order.
    pub fn with_reading_order(mut self, order: ReadingOrder) -> Self {
        self.options = self.options.with_reading_order(order);
        self
    }

    /// Emit `page` on every node.
    pub fn with_page_numbers(mut self) -> Self {
        self.options = self.options.with_page_numbers(true);
        self
    }

    /// Attach `pdf_info` to the output.
    pub fn with_info(mut self) -> Self {
        self.options = self.options.with_info(true);
        self
    }

    /// Use compact JSON output.
    pub fn compact(mut self) -> Self {
        self.options = self.options.with_format(JsonFormat::Compact);
        self
    }

    /// The options collected so far.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert a PDF file.
    pub fn convert<P: AsRef<Path>>(self, path: P) -> Result<ConvertResult> {
        PdfConverter::new(self.options)?.convert_file(path)
    }

    /// Convert PDF bytes.
    pub fn convert_bytes(self, data: &[u8]) -> Result<ConvertResult> {
        PdfConverter::new(self.options)?.convert_bytes_with_stats(data)
    }
}

impl Default for Pdfstruct {
    fn default() -> Self {
        Self::new()
    }
}
