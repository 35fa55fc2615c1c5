//! The conversion pipeline: PDF bytes to an enriched [`JsonDocument`].
//!
//! # Example
//!
//! ```no_run
//! use pdfstruct::convert::{ConvertOptions, PdfConverter};
//!
//! fn main() -> pdfstruct::Result<()> {
//!     let options = ConvertOptions::new().with_base_url("https://example.com/");
//!     let converter = PdfConverter::new(options)?;
//!
//!     let result = converter.convert_file("document.pdf")?;
//!     println!("{} headings", result.stats.headings());
//!     println!("{}", result.to_json()?);
//!     Ok(())
//! }
//! ```

mod pdf;

pub use pdf::PdfConverter;

use serde::{Deserialize, Serialize};

use crate::classify::{ThresholdStrategy, Thresholds};
use crate::error::{Error, Result};
use crate::model::{DocumentInfo, NodeKind, StructureNode};
use crate::parser::{PageSelection, ParseOptions, ReadingOrder};
use crate::render::{JsonDocument, JsonFormat, ProjectOptions};
use crate::structure::ParagraphMerge;

/// Options for document conversion.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Extraction options
    pub parse: ParseOptions,

    /// Where heading thresholds come from
    pub thresholds: ThresholdStrategy,

    /// Paragraph coalescing policy
    pub paragraph_merge: ParagraphMerge,

    /// Projection options
    pub project: ProjectOptions,

    /// Base URL written to `source_url` (empty to omit)
    pub base_url: String,

    /// Source file name for the `file` and `link` fields
    pub file_name: Option<String>,

    /// Attach PDF document information under `pdf_info`
    pub include_info: bool,

    /// Title used when the document has no level-1 heading
    pub title_placeholder: Option<String>,

    /// Output format for [`ConvertResult::to_json`]
    pub format: JsonFormat,
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set a fixed threshold table.
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = ThresholdStrategy::Fixed(thresholds);
        self
    }

    /// Set the threshold strategy.
    pub fn with_strategy(mut self, strategy: ThresholdStrategy) -> Self {
        self.thresholds = strategy;
        self
    }

    /// Derive thresholds from the document's body size.
    pub fn adaptive(mut self) -> Self {
        self.thresholds = ThresholdStrategy::adaptive();
        self
    }

    /// Set extraction options.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse = options;
        self
    }

    /// Set document password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.parse = self.parse.with_password(password);
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.parse = self.parse.with_pages(pages);
        self
    }

    /// Set page selection from a string such as `"1-3,5"`.
    pub fn with_page_range(self, pages: &str) -> Result<Self> {
        let selection = PageSelection::parse(pages).map_err(Error::InvalidPageRange)?;
        Ok(self.with_pages(selection))
    }

    /// Skip undecodable pages instead of failing.
    pub fn lenient(mut self) -> Self {
        self.parse = self.parse.lenient();
        self
    }

    /// Set reading order.
    pub fn with_reading_order(mut self, order: ReadingOrder) -> Self {
        self.parse = self.parse.with_reading_order(order);
        self
    }

    /// Set the paragraph merge policy.
    pub fn with_paragraph_merge(mut self, merge: ParagraphMerge) -> Self {
        self.paragraph_merge = merge;
        self
    }

    /// Emit `page` on every node.
    pub fn with_page_numbers(mut self, include: bool) -> Self {
        self.project = self.project.with_pages(include);
        self
    }

    /// Set the source file name.
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    /// Attach `pdf_info` to the output.
    pub fn with_info(mut self, include: bool) -> Self {
        self.include_info = include;
        self
    }

    /// Replace the "Untitled Document" placeholder.
    pub fn with_title_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.title_placeholder = Some(placeholder.into());
        self
    }

    /// Set output format.
    pub fn with_format(mut self, format: JsonFormat) -> Self {
        self.format = format;
        self
    }
}

/// Counts collected during one conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Pages decoded
    pub pages: usize,
    /// Runs extracted
    pub runs: usize,
    /// Runs whose size could not be classified
    pub unknown_runs: usize,
    /// Level-1 heading nodes
    pub heading1: usize,
    /// Level-2 heading nodes
    pub heading2: usize,
    /// Level-3 heading nodes
    pub heading3: usize,
    /// Paragraph nodes
    pub paragraphs: usize,
    /// Emphasis nodes
    pub emphasis: usize,
}

impl ConversionStats {
    /// Count node kinds in a tree (root excluded).
    pub fn from_tree(root: &StructureNode) -> Self {
        let mut stats = Self::default();
        for node in root.iter().skip(1) {
            match node.kind {
                NodeKind::Heading1 => stats.heading1 += 1,
                NodeKind::Heading2 => stats.heading2 += 1,
                NodeKind::Heading3 => stats.heading3 += 1,
                NodeKind::Paragraph => stats.paragraphs += 1,
                NodeKind::Emphasis => stats.emphasis += 1,
                NodeKind::Document => {}
            }
        }
        stats
    }

    /// Heading nodes of every level.
    pub fn headings(&self) -> usize {
        self.heading1 + self.heading2 + self.heading3
    }

    /// All structural nodes.
    pub fn nodes(&self) -> usize {
        self.headings() + self.paragraphs + self.emphasis
    }
}

/// Result of document conversion.
#[derive(Debug, Clone)]
pub struct ConvertResult {
    /// The enriched JSON document
    pub document: JsonDocument,

    /// Source document information
    pub info: DocumentInfo,

    /// The threshold table that was applied
    pub thresholds: Thresholds,

    /// Conversion statistics
    pub stats: ConversionStats,

    format: JsonFormat,
}

impl ConvertResult {
    /// Serialize the document in the configured format.
    pub fn to_json(&self) -> Result<String> {
        self.document.to_json(self.format)
    }

    /// Take the document.
    pub fn into_document(self) -> JsonDocument {
        self.document
    }
}
