//! Document tree assembly.
//!
//! Heading runs open sections; a heading of the same or a more senior
//! level closes the current section and starts a sibling. Body runs become
//! paragraph leaves of the innermost open section.

mod builder;

pub use builder::{ParagraphMerge, StructureBuilder};

use crate::classify::FontStyleClassifier;
use crate::model::{StructureNode, TextRun};

/// Classify `runs` and assemble them into a document tree.
pub fn build_structure(
    runs: &[TextRun],
    classifier: &FontStyleClassifier,
    merge: ParagraphMerge,
) -> StructureNode {
    StructureBuilder::build(runs.iter().map(|run| (run, classifier.classify(run))), merge)
}
