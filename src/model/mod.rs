//! Value types shared by the pipeline stages.
//!
//! Runs flow out of the parser, roles out of the classifier, and structure
//! nodes out of the builder. None of these types hold references into the
//! underlying PDF object graph.

mod info;
mod node;
mod role;
mod run;

pub use info::{parse_pdf_date, DocumentInfo};
pub use node::{NodeKind, PreOrder, StructureNode};
pub use role::Role;
pub use run::{FontStyle, RunPosition, TextRun};
