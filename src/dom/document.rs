//! The arena-backed document tree.
//!
//! All nodes live in one `Vec`; handles are indices and are never reused
//! within a document's lifetime, so a detached subtree simply becomes
//! unreachable. The mutation methods here are the *only* code that touches
//! child lists and parent links, which is what keeps the parent/child
//! invariant maintainable: every child appears exactly once in its parent's
//! list, and every listed child points back at that parent.

use std::collections::HashSet;

use tracing::trace;

use crate::dom::attribute::Attribute;
use crate::dom::journal::{InverseOp, Journal};
use crate::dom::node::{ElementData, Node, NodeId, NodeKind};
use crate::dom::tag::chars::{OBJECT_REPLACEMENT, PARAGRAPH_SEPARATOR};
use crate::range::{TextRange, utf16_len};

/// A document tree: the authoritative structural store.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<Node>,
    journal: Journal,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document holding only the root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::root()],
            journal: Journal::default(),
        }
    }

    /// The root node ID.
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID.
    ///
    /// # Panics
    ///
    /// Panics when `id` does not belong to this document; handle misuse is
    /// a programmer error, not a recoverable condition.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Number of allocated nodes, including detached ones.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Allocate a node and return its handle. The node starts detached.
    pub fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn new_text(&mut self, contents: impl Into<String>) -> NodeId {
        self.alloc(Node::text(contents))
    }

    pub fn new_comment(&mut self, contents: impl Into<String>) -> NodeId {
        self.alloc(Node::comment(contents))
    }

    pub fn new_element(&mut self, data: ElementData) -> NodeId {
        self.alloc(Node::element(data))
    }

    // MARK: - Structure queries

    /// Child handles of an element, or an empty slice for leaves.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id)
            .as_element()
            .map(|data| data.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Position of `child` within `parent`'s child list.
    ///
    /// # Panics
    ///
    /// Panics when `child` claims `parent` but is missing from its list —
    /// that means a prior mutation broke the tree invariant.
    pub fn index_of_child(&self, parent: NodeId, child: NodeId) -> usize {
        self.children(parent)
            .iter()
            .position(|&c| c == child)
            .expect("child not found in its claimed parent; the tree invariant is broken")
    }

    // MARK: - Structure mutation

    /// Append `child` as the last child of `parent`, detaching it from any
    /// previous parent first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let index = self.children(parent).len();
        self.insert_child(parent, index, child);
    }

    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_child(parent, 0, child);
    }

    /// Insert `child` at `index` in `parent`'s child list.
    ///
    /// # Panics
    ///
    /// Panics when `parent` is a leaf or `index` is past the end of the
    /// child list.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        trace!(?parent, ?child, index, "insert child");
        let data = self
            .node_mut(parent)
            .as_element_mut()
            .expect("cannot insert children into a leaf node");
        assert!(
            index <= data.children.len(),
            "insertion index {index} is out of bounds"
        );
        data.children.insert(index, child);
        self.node_mut(child).parent = Some(parent);
        self.journal.record(InverseOp::RemoveChild { parent, index });
    }

    /// Remove `child` from `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        let index = self.index_of_child(parent, child);
        trace!(?parent, ?child, index, "remove child");
        self.node_mut(parent)
            .as_element_mut()
            .expect("parent is a leaf")
            .children
            .remove(index);
        self.node_mut(child).parent = None;
        self.journal.record(InverseOp::InsertChild {
            parent,
            index,
            child,
        });
    }

    /// Remove `child` from its parent, if it has one.
    pub fn detach(&mut self, child: NodeId) {
        if let Some(parent) = self.parent(child) {
            self.remove_child(parent, child);
        }
    }

    /// Replace `child` with `replacements` at the same position, preserving
    /// order. The replacements are detached from any previous parents.
    pub fn replace_child_with(&mut self, parent: NodeId, child: NodeId, replacements: Vec<NodeId>) {
        let index = self.index_of_child(parent, child);
        self.remove_child(parent, child);
        for (offset, replacement) in replacements.into_iter().enumerate() {
            self.insert_child(parent, index + offset, replacement);
        }
    }

    /// Replace a text node's contents.
    pub fn set_text_contents(&mut self, id: NodeId, contents: impl Into<String>) {
        match &mut self.node_mut(id).kind {
            NodeKind::Text(current) => {
                let previous = std::mem::replace(current, contents.into());
                self.journal.record(InverseOp::SetTextContents {
                    node: id,
                    contents: previous,
                });
            }
            _ => panic!("set_text_contents called on a non-text node"),
        }
    }

    /// Literal contents of a text node.
    pub fn text_contents(&self, id: NodeId) -> &str {
        match &self.node(id).kind {
            NodeKind::Text(contents) => contents,
            _ => panic!("text_contents called on a non-text node"),
        }
    }

    /// Replace an element's attribute list wholesale.
    pub fn set_attributes(&mut self, id: NodeId, attributes: Vec<Attribute>) {
        let data = self
            .node_mut(id)
            .as_element_mut()
            .expect("set_attributes called on a leaf node");
        let previous = std::mem::replace(&mut data.attributes, attributes);
        self.journal.record(InverseOp::SetAttributes {
            node: id,
            attributes: previous,
        });
    }

    // MARK: - Rendered text

    /// The rendered text of a node's subtree.
    ///
    /// Elements concatenate their children, then append one paragraph
    /// separator when they are block-level and their last non-empty child
    /// is not itself block-level. Line breaks, images and rules read as
    /// their implicit representation; unsupported elements read as a single
    /// placeholder character; comments read as a single paragraph
    /// separator.
    pub fn text_of(&self, id: NodeId) -> String {
        match &self.node(id).kind {
            NodeKind::Text(contents) => contents.clone(),
            NodeKind::Comment(_) => PARAGRAPH_SEPARATOR.to_string(),
            NodeKind::Root(data) => self.children_text(data),
            NodeKind::Element(data) => match data.standard() {
                None => OBJECT_REPLACEMENT.to_string(),
                Some(tag) => {
                    let mut text = match tag.implicit_text() {
                        Some(implicit) => implicit.to_string(),
                        None => self.children_text(data),
                    };
                    if tag.is_block_level() && self.last_child_needs_separator(data) {
                        text.push(PARAGRAPH_SEPARATOR);
                    }
                    text
                }
            },
        }
    }

    fn children_text(&self, data: &ElementData) -> String {
        data.children
            .iter()
            .map(|&child| self.text_of(child))
            .collect()
    }

    /// Rendered length in UTF-16 code units. Always equals
    /// `utf16_len(&text_of(id))`.
    pub fn length_of(&self, id: NodeId) -> usize {
        match &self.node(id).kind {
            NodeKind::Text(contents) => utf16_len(contents),
            NodeKind::Comment(_) => 1,
            NodeKind::Root(data) => self.children_length(data),
            NodeKind::Element(data) => match data.standard() {
                None => 1,
                Some(tag) => {
                    let base = match tag.implicit_text() {
                        Some(implicit) => utf16_len(implicit),
                        None => self.children_length(data),
                    };
                    let separator =
                        (tag.is_block_level() && self.last_child_needs_separator(data)) as usize;
                    base + separator
                }
            },
        }
    }

    fn children_length(&self, data: &ElementData) -> usize {
        data.children
            .iter()
            .map(|&child| self.length_of(child))
            .sum()
    }

    /// Combined length of an element's children, excluding any closing
    /// separator the element itself contributes. This is the coordinate
    /// space its children live in.
    pub fn content_length(&self, id: NodeId) -> usize {
        match self.node(id).as_element() {
            Some(data) => self.children_length(data),
            None => self.length_of(id),
        }
    }

    /// The node's full range in its own coordinates.
    pub fn range_of(&self, id: NodeId) -> TextRange {
        TextRange::new(0, self.length_of(id))
    }

    /// Whether a block-level element ends in an implicit paragraph
    /// separator of its own.
    pub fn needs_closing_separator(&self, id: NodeId) -> bool {
        match &self.node(id).kind {
            NodeKind::Element(data) => {
                data.is_block_level() && self.last_child_needs_separator(data)
            }
            _ => false,
        }
    }

    /// True unless the last non-empty child already supplies a separator —
    /// either a block-level element or a comment, whose rendered text is
    /// itself one separator character.
    fn last_child_needs_separator(&self, data: &ElementData) -> bool {
        let last = data.children.iter().rev().find(|&&child| {
            let node = self.node(child);
            match &node.kind {
                NodeKind::Text(contents) => !contents.is_empty(),
                _ => true,
            }
        });
        match last {
            Some(&child) => {
                let node = self.node(child);
                !node.is_block_level() && !node.is_comment()
            }
            None => true,
        }
    }

    // MARK: - Journal

    /// Enable or disable inverse-operation recording.
    pub fn set_journaling(&mut self, enabled: bool) {
        self.journal.set_enabled(enabled);
    }

    /// Drain the recorded inverse operations, oldest first.
    pub fn take_journal(&mut self) -> Vec<InverseOp> {
        self.journal.drain()
    }

    // MARK: - Validation

    /// Walk the tree and panic on any parent/child inconsistency.
    /// Intended as a debugging and test aid.
    pub fn assert_consistent(&self) {
        let mut seen = HashSet::new();
        self.assert_subtree_consistent(self.root(), &mut seen);
    }

    fn assert_subtree_consistent(&self, id: NodeId, seen: &mut HashSet<NodeId>) {
        assert!(seen.insert(id), "node {id:?} reachable through two parents");
        for &child in self.children(id) {
            assert_eq!(
                self.node(child).parent,
                Some(id),
                "child {child:?} does not point back at its parent {id:?}"
            );
            self.assert_subtree_consistent(child, seen);
        }
    }
}
