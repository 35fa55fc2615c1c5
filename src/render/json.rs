//! JSON projection of the document tree.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::model::{NodeKind, StructureNode};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Options for projecting a tree to JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProjectOptions {
    /// Emit the `page` field on every node
    pub include_pages: bool,
}

impl ProjectOptions {
    /// Enable or disable page fields.
    pub fn with_pages(mut self, include: bool) -> Self {
        self.include_pages = include;
        self
    }
}

/// One node of the JSON schema.
///
/// `text` is present only on nodes that carry text and `children` only on
/// containers, where it is emitted even when empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonNode {
    #[serde(rename = "type")]
    pub kind: NodeKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    pub order: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<JsonNode>>,
}

/// Project a tree with default options.
pub fn project(node: &StructureNode) -> JsonNode {
    project_with(node, &ProjectOptions::default())
}

/// Project a tree, depth-first and pre-order, preserving child order.
pub fn project_with(node: &StructureNode, options: &ProjectOptions) -> JsonNode {
    JsonNode {
        kind: node.kind,
        text: if node.kind.has_text() {
            Some(node.text().to_string())
        } else {
            None
        },
        order: node.order,
        page: options.include_pages.then_some(node.page),
        children: if node.kind.is_container() {
            Some(
                node.children
                    .iter()
                    .map(|child| project_with(child, options))
                    .collect(),
            )
        } else {
            None
        },
    }
}

impl TryFrom<JsonNode> for StructureNode {
    type Error = Error;

    fn try_from(node: JsonNode) -> Result<Self> {
        into_structure(node, true)
    }
}

fn into_structure(node: JsonNode, is_root: bool) -> Result<StructureNode> {
    let kind = node.kind;

    if (kind == NodeKind::Document) != is_root {
        return Err(Error::InvalidDocument(format!(
            "node {} of type {} is not allowed here",
            node.order, kind
        )));
    }

    let text = match (kind.has_text(), node.text) {
        (true, Some(text)) => Some(text),
        (false, None) => None,
        (true, None) => {
            return Err(Error::InvalidDocument(format!(
                "{} node {} has no text",
                kind, node.order
            )))
        }
        (false, Some(_)) => {
            return Err(Error::InvalidDocument(format!(
                "{} node {} must not carry text",
                kind, node.order
            )))
        }
    };

    let children = match (kind.is_container(), node.children) {
        (true, Some(children)) => children
            .into_iter()
            .map(|child| into_structure(child, false))
            .collect::<Result<Vec<_>>>()?,
        (true, None) => {
            return Err(Error::InvalidDocument(format!(
                "{} node {} has no children array",
                kind, node.order
            )))
        }
        (false, None) => Vec::new(),
        (false, Some(_)) => {
            return Err(Error::InvalidDocument(format!(
                "{} node {} cannot have children",
                kind, node.order
            )))
        }
    };

    Ok(StructureNode {
        kind,
        text,
        children,
        order: node.order,
        page: node.page.unwrap_or(0),
    })
}

/// Serialize any value to JSON text.
pub fn to_json<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// The final JSON document: the projected root object plus root-level
/// metadata fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonDocument {
    root: Map<String, Value>,
}

impl JsonDocument {
    /// Project a tree into a document without metadata.
    pub fn from_tree(root: &StructureNode, options: &ProjectOptions) -> Result<Self> {
        let value = serde_json::to_value(project_with(root, options))
            .map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))?;
        match value {
            Value::Object(root) => Ok(Self { root }),
            _ => Err(Error::Render("root node did not serialize to an object".into())),
        }
    }

    /// Wrap an existing root object.
    pub fn from_map(root: Map<String, Value>) -> Self {
        Self { root }
    }

    /// Parse a document from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        match serde_json::from_str(json) {
            Ok(Value::Object(root)) => Ok(Self { root }),
            Ok(_) => Err(Error::InvalidDocument("root is not a JSON object".into())),
            Err(e) => Err(Error::InvalidDocument(e.to_string())),
        }
    }

    /// The root object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    /// Consume into the root object.
    pub fn into_map(self) -> Map<String, Value> {
        self.root
    }

    /// Consume into a `serde_json::Value`.
    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }

    /// Look up a root-level field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    /// Top-level children of the document.
    pub fn children(&self) -> &[Value] {
        self.root
            .get("children")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// `source_url` metadata, when present.
    pub fn source_url(&self) -> Option<&str> {
        self.root.get("source_url").and_then(Value::as_str)
    }

    /// `element_count` metadata, when present.
    pub fn element_count(&self) -> Option<u64> {
        self.root.get("element_count").and_then(Value::as_u64)
    }

    /// `generated_title` metadata, when present.
    pub fn generated_title(&self) -> Option<&str> {
        self.root.get("generated_title").and_then(Value::as_str)
    }

    /// Rebuild the tree, ignoring root-level metadata fields.
    pub fn structure(&self) -> Result<StructureNode> {
        let node: JsonNode = serde_json::from_value(Value::Object(self.root.clone()))
            .map_err(|e| Error::InvalidDocument(e.to_string()))?;
        StructureNode::try_from(node)
    }

    /// Serialize to JSON text.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        to_json(&self.root, format)
    }
}
