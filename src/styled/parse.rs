//! Building a document tree from styled-text runs.
//!
//! The run sequence is grouped into paragraphs at separator boundaries.
//! Each paragraph builds its paragraph-style elements outside-in, then each
//! character-style run builds nested inline elements in the fixed order
//! link → bold → italic → strike → underline → css span (outermost to
//! innermost), which keeps the produced HTML canonical for a given style
//! set. Consecutive paragraphs sharing a list structure are merged into a
//! single list element so item numbering stays continuous.

use tracing::warn;

use crate::dom::attribute::{Attribute, AttributeValue};
use crate::dom::builder;
use crate::dom::document::Document;
use crate::dom::node::{ElementData, NodeId};
use crate::dom::tag::chars::PARAGRAPH_SEPARATOR;
use crate::dom::tag::{StandardTag, tags_equivalent};
use crate::error::{Error, Result};
use crate::range::{TextRange, slice_utf16};
use crate::styled::{EmbeddedObject, ParagraphStyle, RunStyle, StyleRun, StyledString};

/// Build a document from a validated run sequence.
pub fn parse_styled(styled: &StyledString) -> Result<Document> {
    styled.validate()?;

    let mut dom = Document::new();
    let root = dom.root();
    let mut previous_tail: Option<NodeId> = None;

    for paragraph_range in styled.paragraph_ranges() {
        let nodes = build_paragraph(&mut dom, styled, paragraph_range)?;
        for node in nodes {
            if let Some(tail) = previous_tail
                && try_merge_block_chains(&mut dom, tail, node)
            {
                continue;
            }
            dom.append_child(root, node);
            previous_tail = Some(node);
        }
    }

    Ok(dom)
}

/// A run clipped to a sub-range, with its text materialized.
struct ClippedRun<'a> {
    text: String,
    style: &'a RunStyle,
}

fn clip_runs<'a>(styled: &'a StyledString, range: TextRange) -> Result<Vec<ClippedRun<'a>>> {
    let mut clipped = Vec::new();
    for StyleRun { range: run_range, style } in &styled.runs {
        let Some(intersection) = run_range.intersection(range) else {
            continue;
        };
        if intersection.is_empty() {
            continue;
        }
        let text = slice_utf16(&styled.text, intersection)
            .ok_or_else(|| Error::InvalidRuns("run boundary splits a surrogate pair".into()))?;
        clipped.push(ClippedRun {
            text: text.to_string(),
            style,
        });
    }
    Ok(clipped)
}

/// Convert one paragraph of runs into top-level nodes.
fn build_paragraph(
    dom: &mut Document,
    styled: &StyledString,
    paragraph_range: TextRange,
) -> Result<Vec<NodeId>> {
    let paragraph_text = slice_utf16(&styled.text, paragraph_range)
        .ok_or_else(|| Error::InvalidRuns("paragraph boundary splits a surrogate pair".into()))?;
    let terminated = paragraph_text.ends_with(PARAGRAPH_SEPARATOR);

    let content_range = if terminated {
        TextRange::new(paragraph_range.location, paragraph_range.length - 1)
    } else {
        paragraph_range
    };

    let all_runs = clip_runs(styled, paragraph_range)?;
    let paragraph_style = all_runs
        .first()
        .map(|run| run.style.paragraph.clone())
        .unwrap_or_default();

    // Horizontal rules are their own paragraph and their own element.
    if paragraph_style.horizontal_rule
        || all_runs
            .iter()
            .any(|run| run.style.embedded == Some(EmbeddedObject::Rule))
    {
        let hr = dom.new_element(ElementData::new(StandardTag::Hr.name()));
        return Ok(vec![hr]);
    }

    // A comment supplies the paragraph's separator character itself.
    let comment_terminator = terminated
        .then(|| {
            all_runs.last().and_then(|run| match &run.style.embedded {
                Some(EmbeddedObject::Comment(contents)) => Some(contents.clone()),
                _ => None,
            })
        })
        .flatten();

    let mut children = Vec::new();
    for run in clip_runs(styled, content_range)? {
        children.extend(build_run_nodes(dom, &run));
    }

    // A comment supplies its own separator, so a plain comment paragraph
    // needs no default wrapper.
    let needs_default = terminated && comment_terminator.is_none();
    if let Some(contents) = comment_terminator {
        children.push(dom.new_comment(contents));
    }

    let wrappers = paragraph_wrappers(&paragraph_style, needs_default);
    if wrappers.is_empty() {
        return Ok(children);
    }

    // Nest outside-in: the last wrapper is innermost and receives the
    // content.
    let mut current_children = children;
    for data in wrappers.into_iter().rev() {
        let element = dom.new_element(data);
        for child in current_children {
            dom.append_child(element, child);
        }
        current_children = vec![element];
    }
    Ok(current_children)
}

/// The paragraph-style element chain, outermost first.
///
/// Lists come outermost (each level contributing a list element and an
/// item), then blockquote, then the paragraph tag, heading, and
/// preformatted block innermost. With `needs_default`, a paragraph with no
/// style at all gets a plain `<p>`.
fn paragraph_wrappers(style: &ParagraphStyle, needs_default: bool) -> Vec<ElementData> {
    let mut wrappers = Vec::new();

    for item in &style.lists {
        let list_tag = match item.kind {
            crate::styled::ListKind::Ordered => StandardTag::Ol,
            crate::styled::ListKind::Unordered => StandardTag::Ul,
        };
        wrappers.push(ElementData::new(list_tag.name()));
        wrappers.push(ElementData::new(StandardTag::Li.name()));
    }
    if style.blockquote {
        wrappers.push(ElementData::new(StandardTag::Blockquote.name()));
    }
    if style.html_paragraph {
        wrappers.push(ElementData::new(StandardTag::P.name()));
    }
    if let Some(level) = style.header
        && let Some(tag) = StandardTag::for_header_level(level)
    {
        wrappers.push(ElementData::new(tag.name()));
    }
    if style.preformatted {
        wrappers.push(ElementData::new(StandardTag::Pre.name()));
    }

    if wrappers.is_empty() && needs_default {
        wrappers.push(ElementData::new(StandardTag::P.name()));
    }
    wrappers
}

/// Build the leaf nodes for one run and wrap them in its character-style
/// elements.
fn build_run_nodes(dom: &mut Document, run: &ClippedRun<'_>) -> Vec<NodeId> {
    let leaves = match &run.style.embedded {
        Some(EmbeddedObject::Image { src }) => {
            let element = ElementData::with_attributes(
                StandardTag::Img.name(),
                vec![Attribute::string("src", src.clone())],
            );
            vec![dom.new_element(element)]
        }
        Some(EmbeddedObject::Rule) => {
            vec![dom.new_element(ElementData::new(StandardTag::Hr.name()))]
        }
        Some(EmbeddedObject::Comment(contents)) => vec![dom.new_comment(contents.clone())],
        Some(EmbeddedObject::Html(raw)) => html_fragment_nodes(dom, raw),
        None => text_leaves(dom, &run.text),
    };

    wrap_inline(dom, leaves, run.style)
}

/// Split text on line breaks into text nodes interleaved with `<br>`.
fn text_leaves(dom: &mut Document, text: &str) -> Vec<NodeId> {
    let mut nodes = Vec::new();
    for (index, piece) in text.split('\n').enumerate() {
        if index > 0 {
            nodes.push(dom.new_element(ElementData::new(StandardTag::Br.name())));
        }
        if !piece.is_empty() {
            nodes.push(dom.new_text(piece));
        }
    }
    nodes
}

/// Re-parse a raw HTML fragment. A fragment with exactly one root child is
/// spliced in directly; multiple children are wrapped in a neutral `span`
/// so the caller still deals with a single node. An unparseable fragment
/// degrades to literal text.
fn html_fragment_nodes(dom: &mut Document, raw: &str) -> Vec<NodeId> {
    let parsed = crate::html::parse_fragment(raw);
    if parsed.is_empty() {
        warn!("raw HTML fragment parsed to nothing, keeping it as text");
        return vec![dom.new_text(raw)];
    }

    let built: Vec<NodeId> = parsed
        .iter()
        .map(|node| builder::build_node(dom, node))
        .collect();

    if built.len() == 1 {
        return built;
    }
    let span = dom.new_element(ElementData::new(StandardTag::Span.name()));
    for child in built {
        dom.append_child(span, child);
    }
    vec![span]
}

/// Wrap nodes in the run's inline style elements, outermost to innermost:
/// link, bold, italic, strike, underline, css span.
fn wrap_inline(dom: &mut Document, leaves: Vec<NodeId>, style: &RunStyle) -> Vec<NodeId> {
    let mut shells: Vec<ElementData> = Vec::new();

    if let Some(href) = &style.link {
        shells.push(ElementData::with_attributes(
            StandardTag::A.name(),
            vec![Attribute::string("href", href.clone())],
        ));
    }
    if style.bold {
        shells.push(ElementData::new(StandardTag::Strong.name()));
    }
    if style.italic {
        shells.push(ElementData::new(StandardTag::Em.name()));
    }
    if style.strike {
        shells.push(ElementData::new(StandardTag::Del.name()));
    }
    if style.underline {
        shells.push(ElementData::new(StandardTag::U.name()));
    }
    if !style.css.is_empty() {
        shells.push(ElementData::with_attributes(
            StandardTag::Span.name(),
            vec![Attribute::new(
                "style",
                AttributeValue::InlineCss(style.css.clone()),
            )],
        ));
    }

    let mut nodes = leaves;
    for data in shells.into_iter().rev() {
        let element = dom.new_element(data);
        for child in nodes {
            dom.append_child(element, child);
        }
        nodes = vec![element];
    }
    nodes
}

// MARK: - Paragraph-chain merging

/// Merge the new paragraph's leftmost block chain into the previous
/// paragraph's rightmost chain when both are the same kind of list
/// container, so consecutive list paragraphs share one list element.
/// Returns `true` when `current` was absorbed.
fn try_merge_block_chains(dom: &mut Document, previous: NodeId, current: NodeId) -> bool {
    if !mergeable(dom, previous, current) {
        return false;
    }
    merge_chain(dom, previous, current);
    true
}

fn mergeable(dom: &Document, left: NodeId, right: NodeId) -> bool {
    let (Some(left_data), Some(right_data)) = (
        dom.node(left).as_element(),
        dom.node(right).as_element(),
    ) else {
        return false;
    };
    if !tags_equivalent(&left_data.name, &right_data.name) {
        return false;
    }

    match left_data.standard() {
        Some(StandardTag::Ol) | Some(StandardTag::Ul) => true,
        // List items merge only when they exist purely to host nested
        // lists; merging two content items would collapse them into one.
        Some(StandardTag::Li) => {
            let left_last = left_data.children.last().copied();
            let right_first = right_data.children.first().copied();
            matches!((left_last, right_first), (Some(l), Some(r))
                if is_list(dom, l) && is_list(dom, r))
        }
        _ => false,
    }
}

fn is_list(dom: &Document, id: NodeId) -> bool {
    dom.node(id).is_tag(StandardTag::Ol) || dom.node(id).is_tag(StandardTag::Ul)
}

/// Move `right`'s children into `left`, descending first wherever their
/// edge children are themselves mergeable.
fn merge_chain(dom: &mut Document, left: NodeId, right: NodeId) {
    let left_last = dom.children(left).last().copied();
    let right_first = dom.children(right).first().copied();

    if let (Some(inner_left), Some(inner_right)) = (left_last, right_first)
        && mergeable(dom, inner_left, inner_right)
    {
        dom.detach(inner_right);
        merge_chain(dom, inner_left, inner_right);
    }

    for child in dom.children(right).to_vec() {
        dom.append_child(left, child);
    }
    dom.detach(right);
}
