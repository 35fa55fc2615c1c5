//! Root-level metadata for projected documents.

use std::path::Path;

use serde_json::{Map, Value};

use super::json::JsonDocument;
use crate::model::{DocumentInfo, NodeKind};

/// Base URL used by the command line front end when none is given.
pub const DEFAULT_BASE_URL: &str = "https://example.com/";

/// Title used when a document has no level-1 heading.
pub const UNTITLED_PLACEHOLDER: &str = "Untitled Document";

/// Root key holding the configured base URL.
pub const SOURCE_URL_KEY: &str = "source_url";
/// Root key holding the number of nodes below the root.
pub const ELEMENT_COUNT_KEY: &str = "element_count";
/// Root key holding the first level-1 heading text.
pub const GENERATED_TITLE_KEY: &str = "generated_title";
/// Root key holding the input file name.
pub const FILE_KEY: &str = "file";
/// Root key holding the base URL joined with the file name.
pub const LINK_KEY: &str = "link";
/// Root key holding the document information dictionary.
pub const PDF_INFO_KEY: &str = "pdf_info";

/// Adds root-level metadata to a projected document.
///
/// Only root keys are written; node fields (`type`, `text`, `order`,
/// `children`, `page`) are left as they are. Every key is overwritten or
/// removed on each call, so enriching twice gives the same result as
/// enriching once.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataEnricher {
    base_url: String,
    file_name: Option<String>,
    info: Option<DocumentInfo>,
    placeholder: String,
}

impl MetadataEnricher {
    /// Create an enricher for a base URL (may be empty).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            file_name: None,
            info: None,
            placeholder: UNTITLED_PLACEHOLDER.to_string(),
        }
    }

    /// Record the source file; only its base name is kept.
    pub fn with_file_name(mut self, path: impl AsRef<Path>) -> Self {
        self.file_name = path
            .as_ref()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .filter(|name| !name.is_empty());
        self
    }

    /// Attach PDF document information under `pdf_info`.
    pub fn with_document_info(mut self, info: DocumentInfo) -> Self {
        self.info = Some(info);
        self
    }

    /// Replace the title placeholder.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// The base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `base_url` joined with the file name, when both are available.
    pub fn link(&self) -> Option<String> {
        let file = self.file_name.as_deref()?;
        if self.base_url.is_empty() {
            return None;
        }
        if self.base_url.ends_with('/') {
            Some(format!("{}{}", self.base_url, file))
        } else {
            Some(format!("{}/{}", self.base_url, file))
        }
    }

    /// Enrich a root object.
    pub fn enrich(&self, mut root: Map<String, Value>) -> Map<String, Value> {
        if self.base_url.is_empty() {
            root.remove(SOURCE_URL_KEY);
        } else {
            root.insert(SOURCE_URL_KEY.into(), Value::String(self.base_url.clone()));
        }

        let count = count_elements(&root);
        root.insert(ELEMENT_COUNT_KEY.into(), Value::from(count));

        let title = first_heading1(&root)
            .map(str::to_string)
            .unwrap_or_else(|| self.placeholder.clone());
        root.insert(GENERATED_TITLE_KEY.into(), Value::String(title));

        match &self.file_name {
            Some(file) => {
                root.insert(FILE_KEY.into(), Value::String(file.clone()));
            }
            None => {
                root.remove(FILE_KEY);
            }
        }

        match self.link() {
            Some(link) => {
                root.insert(LINK_KEY.into(), Value::String(link));
            }
            None => {
                root.remove(LINK_KEY);
            }
        }

        let info = self.info.as_ref().and_then(|info| match serde_json::to_value(info) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Dropping {}: {}", PDF_INFO_KEY, e);
                None
            }
        });
        match info {
            Some(info) => {
                root.insert(PDF_INFO_KEY.into(), info);
            }
            None => {
                root.remove(PDF_INFO_KEY);
            }
        }

        root
    }

    /// Enrich a [`JsonDocument`].
    pub fn enrich_document(&self, doc: JsonDocument) -> JsonDocument {
        JsonDocument::from_map(self.enrich(doc.into_map()))
    }
}

impl Default for MetadataEnricher {
    fn default() -> Self {
        Self::new("")
    }
}

fn children(node: &Map<String, Value>) -> impl Iterator<Item = &Map<String, Value>> {
    node.get("children")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

/// Number of nodes below `node`, found by walking every `children` array.
fn count_elements(node: &Map<String, Value>) -> usize {
    children(node).map(|child| 1 + count_elements(child)).sum()
}

/// Text of the first `heading1` below `node`, in pre-order.
fn first_heading1(node: &Map<String, Value>) -> Option<&str> {
    let heading1 = NodeKind::Heading1.as_str();
    for child in children(node) {
        if child.get("type").and_then(Value::as_str) == Some(heading1) {
            if let Some(text) = child.get("text").and_then(Value::as_str) {
                return Some(text);
            }
        }
        if let Some(text) = first_heading1(child) {
            return Some(text);
        }
    }
    None
}
