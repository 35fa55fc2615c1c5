//! Single-pass tree assembly from classified runs.

use serde::{Deserialize, Serialize};

use crate::model::{NodeKind, Role, StructureNode, TextRun};

/// When consecutive paragraph runs are coalesced into one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParagraphMerge {
    /// Merge every run that directly follows a paragraph run
    #[default]
    Always,
    /// Merge only runs from the same page and text block
    WithinBlock,
}

/// Where the open paragraph came from; used to decide the next merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ParagraphSource {
    page: usize,
    block: usize,
}

/// Builds a [`StructureNode`] tree from `(run, role)` pairs in reading order.
///
/// Open containers live on a stack keyed by heading level with the
/// document root (level 0) at the bottom. A container is attached to its
/// parent when it is closed, so every node is owned by exactly one parent
/// and no back references are needed.
#[derive(Debug)]
pub struct StructureBuilder {
    stack: Vec<StructureNode>,
    next_order: usize,
    merge: ParagraphMerge,
    open_paragraph: Option<ParagraphSource>,
}

impl Default for StructureBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StructureBuilder {
    /// Create a builder holding an empty document.
    pub fn new() -> Self {
        Self {
            stack: vec![StructureNode::document()],
            next_order: 1,
            merge: ParagraphMerge::default(),
            open_paragraph: None,
        }
    }

    /// Set the paragraph merge policy.
    pub fn with_paragraph_merge(mut self, merge: ParagraphMerge) -> Self {
        self.merge = merge;
        self
    }

    /// Build a tree in one call.
    pub fn build<'a, I>(items: I, merge: ParagraphMerge) -> StructureNode
    where
        I: IntoIterator<Item = (&'a TextRun, Role)>,
    {
        let mut builder = Self::new().with_paragraph_merge(merge);
        for (run, role) in items {
            builder.push(run, role);
        }
        builder.finish()
    }

    /// Number of nodes created so far (root excluded).
    pub fn node_count(&self) -> usize {
        self.next_order - 1
    }

    /// Feed the next run.
    pub fn push(&mut self, run: &TextRun, role: Role) {
        let text = run.text().trim();
        if text.is_empty() {
            return;
        }

        let position = run.position();
        let source = ParagraphSource {
            page: position.page,
            block: position.block,
        };

        match role.heading_level() {
            Some(level) => {
                self.open_paragraph = None;
                self.close_until_below(level);
                let node = self.new_node(NodeKind::from_role(role), text, position.page);
                self.stack.push(node);
            }
            None if role == Role::Emphasis => {
                self.open_paragraph = None;
                let node = self.new_node(NodeKind::Emphasis, text, position.page);
                self.top().children.push(node);
            }
            None => {
                if self.can_merge(source) {
                    if let Some(paragraph) = self.top().children.last_mut() {
                        let merged = paragraph.text.get_or_insert_with(String::new);
                        merged.push(' ');
                        merged.push_str(text);
                        self.open_paragraph = Some(source);
                        return;
                    }
                }
                let node = self.new_node(NodeKind::Paragraph, text, position.page);
                self.top().children.push(node);
                self.open_paragraph = Some(source);
            }
        }
    }

    /// Close every open container and return the document root.
    pub fn finish(mut self) -> StructureNode {
        self.close_until_below(1);
        // Only the root is left
        self.stack.pop().unwrap_or_else(StructureNode::document)
    }

    fn can_merge(&self, source: ParagraphSource) -> bool {
        match (self.open_paragraph, self.merge) {
            (None, _) => false,
            (Some(_), ParagraphMerge::Always) => true,
            (Some(previous), ParagraphMerge::WithinBlock) => previous == source,
        }
    }

    fn new_node(&mut self, kind: NodeKind, text: &str, page: usize) -> StructureNode {
        let order = self.next_order;
        self.next_order += 1;
        StructureNode::with_text(kind, text, order, page)
    }

    fn top(&mut self) -> &mut StructureNode {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    /// Pop containers until the top has a level strictly below `level`.
    fn close_until_below(&mut self, level: u8) {
        while self.stack.len() > 1 {
            let top_level = self.stack[self.stack.len() - 1].level().unwrap_or(0);
            if top_level < level {
                break;
            }
            if let Some(closed) = self.stack.pop() {
                self.top().children.push(closed);
            }
        }
    }
}
