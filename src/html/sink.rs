//! html5ever adapter producing the abstract parse tree.
//!
//! The editor core consumes a plain tree of elements/text/comments (see
//! [`crate::dom::builder::ParseNode`]); this sink is the only place aware
//! of html5ever. It parses leniently — parse errors are ignored, like a
//! browser — and extracts the `<body>` contents of the parsed document.

use std::cell::RefCell;

use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::tree_builder::{ElemName, ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{Attribute as Html5Attribute, LocalName, QualName, parse_document};

use crate::dom::builder::ParseNode;
use crate::dom::tag::StandardTag;

/// Parse an HTML string into parse-tree nodes (the `<body>` contents).
pub fn parse_html(html: &str) -> Vec<ParseNode> {
    let sink = ParseTreeSink::new();
    let result = parse_document(sink, Default::default()).one(StrTendril::from(html));
    result.into_parse_nodes()
}

/// Handle used by the TreeSink to reference nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeHandle(usize);

#[derive(Debug)]
enum SinkKind {
    Document,
    Element {
        name: QualName,
        attributes: Vec<(String, Option<String>)>,
    },
    Text(String),
    Comment(String),
}

#[derive(Debug)]
struct SinkNode {
    kind: SinkKind,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// TreeSink implementation building the abstract parse tree.
///
/// Uses interior mutability (RefCell) because html5ever's TreeSink trait
/// takes `&self` but tree construction needs mutation.
pub struct ParseTreeSink {
    nodes: RefCell<Vec<SinkNode>>,
    quirks_mode: RefCell<QuirksMode>,
}

impl Default for ParseTreeSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ParseTreeSink {
    pub fn new() -> Self {
        Self {
            nodes: RefCell::new(vec![SinkNode {
                kind: SinkKind::Document,
                parent: None,
                children: Vec::new(),
            }]),
            quirks_mode: RefCell::new(QuirksMode::NoQuirks),
        }
    }

    fn alloc(&self, kind: SinkKind) -> NodeHandle {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(SinkNode {
            kind,
            parent: None,
            children: Vec::new(),
        });
        NodeHandle(nodes.len() - 1)
    }

    fn attach(&self, parent: usize, child: usize) {
        let mut nodes = self.nodes.borrow_mut();
        nodes[child].parent = Some(parent);
        nodes[parent].children.push(child);
    }

    fn append_text_to(&self, parent: usize, text: &str) {
        {
            // Coalesce with a trailing text child; html5ever streams text
            // in chunks.
            let mut nodes = self.nodes.borrow_mut();
            if let Some(&last) = nodes[parent].children.last()
                && let SinkKind::Text(contents) = &mut nodes[last].kind
            {
                contents.push_str(text);
                return;
            }
        }
        let child = self.alloc(SinkKind::Text(text.to_string()));
        self.attach(parent, child.0);
    }

    /// Consume the sink and return the parsed `<body>` contents.
    pub fn into_parse_nodes(self) -> Vec<ParseNode> {
        let nodes = self.nodes.into_inner();

        let find_child = |parent: usize, tag: &str| -> Option<usize> {
            nodes[parent].children.iter().copied().find(|&child| {
                matches!(&nodes[child].kind, SinkKind::Element { name, .. }
                    if name.local.as_ref().eq_ignore_ascii_case(tag))
            })
        };

        let content_root = find_child(0, "html")
            .and_then(|html| find_child(html, "body"))
            .unwrap_or(0);

        convert_children(&nodes, content_root)
    }
}

fn convert_children(nodes: &[SinkNode], parent: usize) -> Vec<ParseNode> {
    let children = &nodes[parent].children;
    let mut converted = Vec::new();

    for (index, &child) in children.iter().enumerate() {
        match &nodes[child].kind {
            SinkKind::Document => {}
            SinkKind::Comment(contents) => converted.push(ParseNode::Comment(contents.clone())),
            SinkKind::Text(contents) => {
                if is_formatting_whitespace(nodes, parent, children, index, contents) {
                    continue;
                }
                converted.push(ParseNode::Text(contents.clone()));
            }
            SinkKind::Element { name, attributes } => converted.push(ParseNode::Element {
                tag_name: name.local.to_string(),
                attributes: attributes.clone(),
                children: convert_children(nodes, child),
            }),
        }
    }

    converted
}

/// Whitespace-only text between block-level siblings (or inside structural
/// containers like lists and tables) is source formatting, not content.
fn is_formatting_whitespace(
    nodes: &[SinkNode],
    parent: usize,
    siblings: &[usize],
    index: usize,
    contents: &str,
) -> bool {
    if !contents.chars().all(|ch| ch.is_ascii_whitespace()) {
        return false;
    }

    let is_structural = |node: usize| -> bool {
        match &nodes[node].kind {
            SinkKind::Document => true,
            SinkKind::Element { name, .. } => {
                let tag = name.local.as_ref();
                tag.eq_ignore_ascii_case("body")
                    || matches!(
                        StandardTag::from_name(tag),
                        Some(
                            StandardTag::Ol
                                | StandardTag::Ul
                                | StandardTag::Dl
                                | StandardTag::Table
                                | StandardTag::Thead
                                | StandardTag::Tbody
                                | StandardTag::Tfoot
                                | StandardTag::Tr
                        )
                    )
            }
            _ => false,
        }
    };

    if is_structural(parent) {
        return true;
    }

    let is_block = |node: Option<&usize>| -> bool {
        node.is_some_and(|&n| {
            matches!(&nodes[n].kind, SinkKind::Element { name, .. }
                if StandardTag::from_name(name.local.as_ref())
                    .is_some_and(|tag| tag.is_block_level()))
        })
    };

    is_block(index.checked_sub(1).and_then(|i| siblings.get(i)))
        && is_block(siblings.get(index + 1))
}

/// Owned element name wrapper, so `elem_name` needs no lifetime gymnastics.
#[derive(Debug, Clone)]
pub struct OwnedElemName(QualName);

impl ElemName for OwnedElemName {
    fn ns(&self) -> &html5ever::Namespace {
        &self.0.ns
    }

    fn local_name(&self) -> &LocalName {
        &self.0.local
    }
}

impl TreeSink for ParseTreeSink {
    type Handle = NodeHandle;
    type Output = Self;
    type ElemName<'a>
        = OwnedElemName
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        self
    }

    fn parse_error(&self, _msg: std::borrow::Cow<'static, str>) {
        // Ignore parse errors - be lenient like browsers.
    }

    fn get_document(&self) -> Self::Handle {
        NodeHandle(0)
    }

    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> Self::ElemName<'a> {
        let nodes = self.nodes.borrow();
        match &nodes[target.0].kind {
            SinkKind::Element { name, .. } => OwnedElemName(name.clone()),
            _ => OwnedElemName(QualName {
                prefix: None,
                ns: html5ever::ns!(),
                local: html5ever::local_name!(""),
            }),
        }
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<Html5Attribute>,
        _flags: ElementFlags,
    ) -> Self::Handle {
        let attributes = attrs
            .into_iter()
            .map(|attr| {
                let value = attr.value.to_string();
                let value = (!value.is_empty()).then_some(value);
                (attr.name.local.to_string(), value)
            })
            .collect();
        self.alloc(SinkKind::Element { name, attributes })
    }

    fn create_comment(&self, text: StrTendril) -> Self::Handle {
        self.alloc(SinkKind::Comment(text.to_string()))
    }

    fn create_pi(&self, _target: StrTendril, _data: StrTendril) -> Self::Handle {
        // Processing instructions carry nothing the editor wants.
        self.alloc(SinkKind::Comment(String::new()))
    }

    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        match child {
            NodeOrText::AppendNode(node) => self.attach(parent.0, node.0),
            NodeOrText::AppendText(text) => self.append_text_to(parent.0, &text),
        }
    }

    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        let has_parent = self.nodes.borrow()[element.0].parent.is_some();
        if has_parent {
            let parent = self.nodes.borrow()[element.0].parent.unwrap();
            match child {
                NodeOrText::AppendNode(node) => self.attach(parent, node.0),
                NodeOrText::AppendText(text) => self.append_text_to(parent, &text),
            }
            return;
        }
        self.append(prev_element, child);
    }

    fn append_doctype_to_document(
        &self,
        _name: StrTendril,
        _public_id: StrTendril,
        _system_id: StrTendril,
    ) {
        // The editor has no use for the doctype.
    }

    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        *target
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        x.0 == y.0
    }

    fn set_quirks_mode(&self, mode: QuirksMode) {
        *self.quirks_mode.borrow_mut() = mode;
    }

    fn append_before_sibling(&self, sibling: &Self::Handle, new_node: NodeOrText<Self::Handle>) {
        let parent = self.nodes.borrow()[sibling.0].parent;
        let Some(parent) = parent else {
            return;
        };
        let node = match new_node {
            NodeOrText::AppendNode(node) => node.0,
            NodeOrText::AppendText(text) => self.alloc(SinkKind::Text(text.to_string())).0,
        };
        let mut nodes = self.nodes.borrow_mut();
        let index = nodes[parent]
            .children
            .iter()
            .position(|&c| c == sibling.0)
            .unwrap_or(nodes[parent].children.len());
        nodes[parent].children.insert(index, node);
        nodes[node].parent = Some(parent);
    }

    fn add_attrs_if_missing(&self, target: &Self::Handle, attrs: Vec<Html5Attribute>) {
        let mut nodes = self.nodes.borrow_mut();
        if let SinkKind::Element { attributes, .. } = &mut nodes[target.0].kind {
            for attr in attrs {
                let name = attr.name.local.to_string();
                if !attributes.iter().any(|(existing, _)| *existing == name) {
                    let value = attr.value.to_string();
                    let value = (!value.is_empty()).then_some(value);
                    attributes.push((name, value));
                }
            }
        }
    }

    fn remove_from_parent(&self, target: &Self::Handle) {
        let mut nodes = self.nodes.borrow_mut();
        let Some(parent) = nodes[target.0].parent.take() else {
            return;
        };
        nodes[parent].children.retain(|&c| c != target.0);
    }

    fn reparent_children(&self, node: &Self::Handle, new_parent: &Self::Handle) {
        let mut nodes = self.nodes.borrow_mut();
        let children = std::mem::take(&mut nodes[node.0].children);
        for &child in &children {
            nodes[child].parent = Some(new_parent.0);
        }
        nodes[new_parent.0].children.extend(children);
    }
}
