//! Node types for the DOM tree.
//!
//! Nodes live in an arena ([`super::document::Document`]) and refer to each
//! other through [`NodeId`] handles: children are owned handle lists, the
//! parent link is a plain back-handle, so there are no reference cycles to
//! manage. Node equality is identity equality — two text nodes with the same
//! contents are still distinct nodes with distinct ids.

use crate::dom::attribute::{Attribute, AttributeValue};
use crate::dom::tag::StandardTag;

/// Unique identifier for a node within a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The root node ID (always 0).
    pub const ROOT: NodeId = NodeId(0);

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// The synthetic tag name carried by the root node.
pub const ROOT_TAG_NAME: &str = "#root";

/// Payload shared by element and root nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    /// Tag name as written in the source (matched case-insensitively).
    pub name: String,
    /// Attributes in source order. Duplicates may appear transiently while
    /// editing; lookup takes the first match and writes update-or-append.
    pub attributes: Vec<Attribute>,
    /// Child handles in document order.
    pub children: Vec<NodeId>,
}

impl ElementData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attributes(name: impl Into<String>, attributes: Vec<Attribute>) -> Self {
        Self {
            name: name.into(),
            attributes,
            children: Vec::new(),
        }
    }

    /// The standard tag for this element's name, if the name is standard.
    pub fn standard(&self) -> Option<StandardTag> {
        StandardTag::from_name(&self.name)
    }

    /// Whether this element belongs to the fixed block-level set.
    /// Non-standard elements are never block-level.
    pub fn is_block_level(&self) -> bool {
        self.standard().is_some_and(|tag| tag.is_block_level())
    }

    /// First attribute with the given name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|attr| attr.name.eq_ignore_ascii_case(name))
    }

    /// String value of the first attribute with the given name.
    pub fn attribute_value(&self, name: &str) -> Option<String> {
        self.attribute(name).and_then(Attribute::value_as_string)
    }

    /// Update the first attribute with the given name, or append a new one.
    pub fn set_attribute(&mut self, name: &str, value: AttributeValue) {
        if let Some(attr) = self
            .attributes
            .iter_mut()
            .find(|attr| attr.name.eq_ignore_ascii_case(name))
        {
            attr.value = value;
            return;
        }
        self.attributes.push(Attribute::new(name, value));
    }

    /// Remove every attribute with the given name.
    pub fn remove_attribute(&mut self, name: &str) {
        self.attributes
            .retain(|attr| !attr.name.eq_ignore_ascii_case(name));
    }
}

/// The kind of a node plus its kind-specific payload.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// A text leaf. `contents` is the literal text.
    Text(String),
    /// A comment leaf. Its rendered text is a single paragraph-separator
    /// character, not its literal contents.
    Comment(String),
    /// An ordinary element.
    Element(ElementData),
    /// The document root: element-shaped, no parent, fixed synthetic tag,
    /// always treated as supported.
    Root(ElementData),
}

/// A node in the document tree.
#[derive(Debug, Clone)]
pub struct Node {
    /// Back-reference to the owning element (`None` only for the root).
    pub parent: Option<NodeId>,
    pub kind: NodeKind,
}

impl Node {
    pub fn text(contents: impl Into<String>) -> Self {
        Self {
            parent: None,
            kind: NodeKind::Text(contents.into()),
        }
    }

    pub fn comment(contents: impl Into<String>) -> Self {
        Self {
            parent: None,
            kind: NodeKind::Comment(contents.into()),
        }
    }

    pub fn element(data: ElementData) -> Self {
        Self {
            parent: None,
            kind: NodeKind::Element(data),
        }
    }

    pub(crate) fn root() -> Self {
        Self {
            parent: None,
            kind: NodeKind::Root(ElementData::new(ROOT_TAG_NAME)),
        }
    }

    /// Element payload for element and root nodes.
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.kind {
            NodeKind::Element(data) | NodeKind::Root(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.kind {
            NodeKind::Element(data) | NodeKind::Root(data) => Some(data),
            _ => None,
        }
    }

    /// Text and comment nodes; cannot have children.
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Text(_) | NodeKind::Comment(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text(_))
    }

    pub fn is_comment(&self) -> bool {
        matches!(self.kind, NodeKind::Comment(_))
    }

    pub fn is_root(&self) -> bool {
        matches!(self.kind, NodeKind::Root(_))
    }

    /// Whether the node is an element (not the root) with the given
    /// standard tag.
    pub fn is_tag(&self, tag: StandardTag) -> bool {
        match &self.kind {
            NodeKind::Element(data) => data.standard() == Some(tag),
            _ => false,
        }
    }

    /// Block-level test; the root itself is not block-level.
    pub fn is_block_level(&self) -> bool {
        match &self.kind {
            NodeKind::Element(data) => data.is_block_level(),
            _ => false,
        }
    }
}
