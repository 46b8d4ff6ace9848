//! Rendering the document tree into styled-text runs.
//!
//! A depth-first walk accumulates one run per styled span of leaf content.
//! Character styles come from the inline ancestors of each leaf, paragraph
//! styles from its block-level ancestors; block elements that need a
//! closing separator emit one separator character styled like the content
//! it terminates.

use crate::dom::document::Document;
use crate::dom::node::{NodeId, NodeKind};
use crate::dom::tag::StandardTag;
use crate::dom::tag::chars::{OBJECT_REPLACEMENT, PARAGRAPH_SEPARATOR};
use crate::styled::{
    EmbeddedObject, ListItem, ParagraphStyle, RunBuilder, RunStyle, StyledString,
};

/// Project the document into its flat text plus attribute runs.
pub fn serialize_styled(dom: &Document) -> StyledString {
    let mut builder = RunBuilder::new();
    let mut last_style = RunStyle::default();
    serialize_children(dom, dom.root(), &mut builder, &mut last_style);
    builder.finish()
}

fn serialize_children(
    dom: &Document,
    element: NodeId,
    builder: &mut RunBuilder,
    last_style: &mut RunStyle,
) {
    for &child in dom.children(element) {
        serialize_node(dom, child, builder, last_style);
    }
}

fn serialize_node(
    dom: &Document,
    id: NodeId,
    builder: &mut RunBuilder,
    last_style: &mut RunStyle,
) {
    match &dom.node(id).kind {
        NodeKind::Text(contents) => {
            let style = styles_for_leaf(dom, id);
            builder.append(contents, style.clone());
            *last_style = style;
        }
        NodeKind::Comment(contents) => {
            let mut style = styles_for_leaf(dom, id);
            style.embedded = Some(EmbeddedObject::Comment(contents.clone()));
            builder.append(&PARAGRAPH_SEPARATOR.to_string(), style.clone());
            *last_style = style;
        }
        NodeKind::Root(_) => serialize_children(dom, id, builder, last_style),
        NodeKind::Element(data) => match data.standard() {
            None => {
                // Unknown elements round-trip as raw HTML fragments behind
                // a single placeholder character.
                let raw = crate::html::serialize_node(dom, id);
                let mut style = styles_for_leaf(dom, id);
                style.embedded = Some(EmbeddedObject::Html(raw));
                builder.append(&OBJECT_REPLACEMENT.to_string(), style.clone());
                *last_style = style;
            }
            Some(StandardTag::Br) => {
                let style = styles_for_leaf(dom, id);
                builder.append("\n", style.clone());
                *last_style = style;
            }
            Some(StandardTag::Img) => {
                let src = data.attribute_value("src").unwrap_or_default();
                let mut style = styles_for_leaf(dom, id);
                style.embedded = Some(EmbeddedObject::Image { src });
                builder.append(&OBJECT_REPLACEMENT.to_string(), style.clone());
                *last_style = style;
            }
            Some(StandardTag::Hr) => {
                let mut style = styles_for_leaf(dom, id);
                style.paragraph.horizontal_rule = true;
                style.embedded = Some(EmbeddedObject::Rule);
                builder.append(&OBJECT_REPLACEMENT.to_string(), style.clone());
                if dom.needs_closing_separator(id) {
                    let mut separator_style = style.clone();
                    separator_style.embedded = None;
                    builder.append(&PARAGRAPH_SEPARATOR.to_string(), separator_style);
                }
                *last_style = style;
            }
            Some(_) => {
                serialize_children(dom, id, builder, last_style);
                if dom.needs_closing_separator(id) {
                    // The separator inherits the character style of the
                    // content it closes, so a uniformly styled paragraph
                    // stays a single run.
                    let mut style = last_style.clone();
                    style.embedded = None;
                    style.paragraph = paragraph_style_for(dom, id);
                    builder.append(&PARAGRAPH_SEPARATOR.to_string(), style);
                }
            }
        },
    }
}

/// Character and paragraph styles for a leaf, collected by walking its
/// ancestor chain up to the root.
fn styles_for_leaf(dom: &Document, leaf: NodeId) -> RunStyle {
    let mut style = RunStyle::default();
    let mut lists_inner_first: Vec<ListItem> = Vec::new();

    let mut current = leaf;
    while let Some(parent) = dom.parent(current) {
        if let NodeKind::Element(data) = &dom.node(parent).kind {
            match data.standard() {
                Some(StandardTag::B) | Some(StandardTag::Strong) => style.bold = true,
                Some(StandardTag::I) | Some(StandardTag::Em) => style.italic = true,
                Some(StandardTag::S) | Some(StandardTag::Strike) | Some(StandardTag::Del) => {
                    style.strike = true;
                }
                Some(StandardTag::U) => style.underline = true,
                Some(StandardTag::A) => {
                    // The innermost link wins.
                    if style.link.is_none() {
                        style.link = Some(data.attribute_value("href").unwrap_or_default());
                    }
                }
                Some(StandardTag::Span) => {
                    if let Some(attr) = data.attribute("style")
                        && let crate::dom::attribute::AttributeValue::InlineCss(css) = &attr.value
                    {
                        style.css.extend(css.iter().cloned());
                    }
                }
                Some(StandardTag::Blockquote) => style.paragraph.blockquote = true,
                Some(StandardTag::P) => style.paragraph.html_paragraph = true,
                Some(StandardTag::Pre) => style.paragraph.preformatted = true,
                Some(tag) if tag.header_level().is_some() => {
                    // The innermost heading wins.
                    if style.paragraph.header.is_none() {
                        style.paragraph.header = tag.header_level();
                    }
                }
                Some(StandardTag::Ol) => {
                    lists_inner_first.push(ListItem {
                        kind: crate::styled::ListKind::Ordered,
                        number: list_item_number(dom, parent, current),
                    });
                }
                Some(StandardTag::Ul) => {
                    lists_inner_first.push(ListItem {
                        kind: crate::styled::ListKind::Unordered,
                        number: None,
                    });
                }
                _ => {}
            }
        }
        current = parent;
    }

    lists_inner_first.reverse();
    style.paragraph.lists = lists_inner_first;
    style
}

/// Paragraph style as seen by content directly inside `element`, including
/// the element itself.
fn paragraph_style_for(dom: &Document, element: NodeId) -> ParagraphStyle {
    // A synthetic probe from the element's own position: collect ancestor
    // paragraph styles by reusing the leaf walk one level up, then add the
    // element's own contribution.
    let mut style = match dom.parent(element) {
        Some(_) => styles_for_leaf(dom, element).paragraph,
        None => ParagraphStyle::default(),
    };

    if let NodeKind::Element(data) = &dom.node(element).kind {
        match data.standard() {
            Some(StandardTag::Blockquote) => style.blockquote = true,
            Some(StandardTag::P) => style.html_paragraph = true,
            Some(StandardTag::Pre) => style.preformatted = true,
            Some(tag) if tag.header_level().is_some() => {
                if style.header.is_none() {
                    style.header = tag.header_level();
                }
            }
            _ => {}
        }
    }
    style
}

/// 1-based position of the list item the ancestor path crosses, counted
/// among the `li` children of `list`. `None` when the path enters the list
/// outside any `li`, or for unordered lists the caller ignores it anyway.
fn list_item_number(dom: &Document, list: NodeId, path_child: NodeId) -> Option<u32> {
    let mut number = 0;
    for &child in dom.children(list) {
        let is_item = dom.node(child).is_tag(StandardTag::Li);
        if is_item {
            number += 1;
        }
        if child == path_child {
            return is_item.then_some(number);
        }
    }
    None
}
