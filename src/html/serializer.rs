//! Tree-walking HTML output.
//!
//! Walks the document emitting `<tag attr="value">…</tag>` per node,
//! escaping `&`, `<`, `>`, `"` and `'`. Void elements are emitted without
//! closing tags, comments as `<!--…-->`. The root contributes no tag of its
//! own.

use memchr::memchr3;

use crate::dom::document::Document;
use crate::dom::node::{ElementData, NodeId, NodeKind};

/// Serialize the whole document (the root's children).
pub fn serialize(dom: &Document) -> String {
    let mut out = String::new();
    for &child in dom.children(dom.root()) {
        write_node(dom, child, &mut out);
    }
    out
}

/// Serialize a single node and its subtree.
pub fn serialize_node(dom: &Document, id: NodeId) -> String {
    let mut out = String::new();
    write_node(dom, id, &mut out);
    out
}

fn write_node(dom: &Document, id: NodeId, out: &mut String) {
    match &dom.node(id).kind {
        NodeKind::Text(contents) => escape_text(contents, out),
        NodeKind::Comment(contents) => {
            out.push_str("<!--");
            out.push_str(contents);
            out.push_str("-->");
        }
        NodeKind::Root(data) => {
            for &child in &data.children {
                write_node(dom, child, out);
            }
        }
        NodeKind::Element(data) => write_element(dom, data, out),
    }
}

fn write_element(dom: &Document, data: &ElementData, out: &mut String) {
    out.push('<');
    out.push_str(&data.name);
    for attribute in &data.attributes {
        out.push(' ');
        out.push_str(&attribute.name);
        if let Some(value) = attribute.value_as_string() {
            out.push_str("=\"");
            escape_attribute(&value, out);
            out.push('"');
        }
    }
    out.push('>');

    if data.standard().is_some_and(|tag| tag.is_void()) {
        return;
    }

    for &child in &data.children {
        write_node(dom, child, out);
    }

    out.push_str("</");
    out.push_str(&data.name);
    out.push('>');
}

/// Escape `&`, `<` and `>` in text content. The scan runs over raw bytes;
/// all three targets are ASCII so UTF-8 continuation bytes never match.
fn escape_text(text: &str, out: &mut String) {
    let bytes = text.as_bytes();
    let mut start = 0;

    while let Some(found) = memchr3(b'&', b'<', b'>', &bytes[start..]) {
        let index = start + found;
        out.push_str(&text[start..index]);
        out.push_str(match bytes[index] {
            b'&' => "&amp;",
            b'<' => "&lt;",
            _ => "&gt;",
        });
        start = index + 1;
    }
    out.push_str(&text[start..]);
}

/// Escape attribute values; quotes matter here too.
fn escape_attribute(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
}
