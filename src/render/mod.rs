//! Rendering of document trees to JSON.
//!
//! [`json`] projects a [`StructureNode`](crate::model::StructureNode) tree
//! onto the node schema; [`enrich`] adds root-level metadata.

pub mod enrich;
pub mod json;

pub use enrich::{MetadataEnricher, DEFAULT_BASE_URL, UNTITLED_PLACEHOLDER};
pub use json::{project, project_with, to_json, JsonDocument, JsonFormat, JsonNode, ProjectOptions};
