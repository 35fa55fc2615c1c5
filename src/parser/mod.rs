//! PDF parsing module.
//!
//! Turns PDF bytes into a stream of [`TextRun`](crate::model::TextRun)s.

pub mod backend;
mod content;
mod extractor;
mod normalize;
mod options;

pub use backend::{BackendFontInfo, ContentOp, LopdfBackend, PageId, PdfBackend, PdfValue};
pub use extractor::{RunStream, TextRunExtractor};
pub use normalize::normalize_run_text;
pub use options::{ErrorMode, PageSelection, ParseOptions, ReadingOrder};
