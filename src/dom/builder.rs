//! Construction of a [`Document`] from an abstract parse tree.
//!
//! The parse tree is the boundary contract with the external HTML parser:
//! ordered nodes carrying a kind, a tag name, raw attributes, and children.
//! The builder consumes that shape exactly once; it never re-tokenizes.

use crate::dom::attribute::{Attribute, AttributeValue};
use crate::dom::document::Document;
use crate::dom::node::{ElementData, Node, NodeId};

/// One node of the abstract parse tree handed over by the HTML parser.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseNode {
    Element {
        tag_name: String,
        /// Raw attributes in source order; `None` values are value-less
        /// attributes.
        attributes: Vec<(String, Option<String>)>,
        children: Vec<ParseNode>,
    },
    Text(String),
    Comment(String),
}

/// Build a document whose root holds the given parse-tree nodes.
pub fn build_document(nodes: &[ParseNode]) -> Document {
    let mut dom = Document::new();
    let root = dom.root();
    for node in nodes {
        let child = build_node(&mut dom, node);
        dom.append_child(root, child);
    }
    dom
}

/// Convert one parse-tree node into a detached document node.
pub fn build_node(dom: &mut Document, parse_node: &ParseNode) -> NodeId {
    match parse_node {
        ParseNode::Text(contents) => dom.new_text(contents.clone()),
        ParseNode::Comment(contents) => dom.new_comment(contents.clone()),
        ParseNode::Element {
            tag_name,
            attributes,
            children,
        } => {
            let attributes = attributes
                .iter()
                .map(|(name, raw)| {
                    Attribute::new(name.clone(), convert_value(name, raw.as_deref()))
                })
                .collect();
            let element = dom.new_element(ElementData {
                name: tag_name.clone(),
                attributes,
                children: Vec::new(),
            });
            for child in children {
                let built = build_node(dom, child);
                dom.append_child(element, built);
            }
            element
        }
    }
}

fn convert_value(name: &str, raw: Option<&str>) -> AttributeValue {
    match raw {
        None => AttributeValue::None,
        Some(raw) if name.eq_ignore_ascii_case("style") => AttributeValue::style(raw),
        Some(raw) => AttributeValue::String(raw.to_string()),
    }
}
