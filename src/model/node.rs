//! The intermediate document tree.

use super::Role;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Type tag of a structural node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// The root container
    Document,
    /// Level-1 heading container
    Heading1,
    /// Level-2 heading container
    Heading2,
    /// Level-3 heading container
    Heading3,
    /// Body text leaf
    Paragraph,
    /// Emphasized text leaf
    Emphasis,
}

impl NodeKind {
    /// Nesting level: 0 for the document, 1-3 for headings, `None` for leaves.
    pub fn level(self) -> Option<u8> {
        match self {
            NodeKind::Document => Some(0),
            NodeKind::Heading1 => Some(1),
            NodeKind::Heading2 => Some(2),
            NodeKind::Heading3 => Some(3),
            NodeKind::Paragraph | NodeKind::Emphasis => None,
        }
    }

    /// Whether nodes of this kind hold children.
    pub fn is_container(self) -> bool {
        self.level().is_some()
    }

    /// Whether this kind is a heading.
    pub fn is_heading(self) -> bool {
        matches!(
            self,
            NodeKind::Heading1 | NodeKind::Heading2 | NodeKind::Heading3
        )
    }

    /// Whether nodes of this kind carry text.
    pub fn has_text(self) -> bool {
        self != NodeKind::Document
    }

    /// The node kind a role produces. Unknown runs are treated as body text.
    pub fn from_role(role: Role) -> Self {
        match role {
            Role::Heading1 => NodeKind::Heading1,
            Role::Heading2 => NodeKind::Heading2,
            Role::Heading3 => NodeKind::Heading3,
            Role::Emphasis => NodeKind::Emphasis,
            Role::Paragraph | Role::Unknown => NodeKind::Paragraph,
        }
    }

    /// Stable lowercase tag used in JSON output.
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Document => "document",
            NodeKind::Heading1 => "heading1",
            NodeKind::Heading2 => "heading2",
            NodeKind::Heading3 => "heading3",
            NodeKind::Paragraph => "paragraph",
            NodeKind::Emphasis => "emphasis",
        }
    }

    /// Parse a JSON type tag.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "document" => Some(NodeKind::Document),
            "heading1" => Some(NodeKind::Heading1),
            "heading2" => Some(NodeKind::Heading2),
            "heading3" => Some(NodeKind::Heading3),
            "paragraph" => Some(NodeKind::Paragraph),
            "emphasis" => Some(NodeKind::Emphasis),
            _ => None,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node of the document tree.
///
/// Containers (document, headings) own an ordered list of children; leaves
/// (paragraph, emphasis) carry text only. Headings carry both their own text
/// and their section content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureNode {
    /// Type tag
    pub kind: NodeKind,
    /// Text content (absent on the document root)
    pub text: Option<String>,
    /// Children in document order
    pub children: Vec<StructureNode>,
    /// Pre-order document index (root is 0)
    pub order: usize,
    /// Page index of the first contributing run
    pub page: usize,
}

impl StructureNode {
    /// Create an empty document root.
    pub fn document() -> Self {
        Self {
            kind: NodeKind::Document,
            text: None,
            children: Vec::new(),
            order: 0,
            page: 0,
        }
    }

    /// Create a node with text.
    pub fn with_text(kind: NodeKind, text: impl Into<String>, order: usize, page: usize) -> Self {
        Self {
            kind,
            text: Some(text.into()),
            children: Vec::new(),
            order,
            page,
        }
    }

    /// Text content, or an empty string for the root.
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Nesting level of containers (0 = document, 1-3 = headings).
    pub fn level(&self) -> Option<u8> {
        self.kind.level()
    }

    /// Number of nodes below this one (this node excluded).
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| 1 + child.descendant_count())
            .sum()
    }

    /// Depth-first, pre-order iterator over this node and its descendants.
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }

    /// First heading of the given kind in document order.
    pub fn first_of_kind(&self, kind: NodeKind) -> Option<&StructureNode> {
        self.iter().find(|node| node.kind == kind)
    }

    /// Depth of the heading hierarchy below this node.
    pub fn heading_depth(&self) -> usize {
        self.children
            .iter()
            .filter(|c| c.kind.is_heading())
            .map(|c| 1 + c.heading_depth())
            .max()
            .unwrap_or(0)
    }
}

/// Pre-order traversal of a [`StructureNode`] tree.
pub struct PreOrder<'a> {
    stack: Vec<&'a StructureNode>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a StructureNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
