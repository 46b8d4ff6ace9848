//! The editing facade tying the tree, the converter and the HTML boundary
//! together.
//!
//! An [`Engine`] owns one document and exposes the command surface a
//! hosting text view drives: HTML in/out, plain-text edits, and style
//! toggles over ranges. Character styles (bold, links, …) are structural
//! edits on the tree; paragraph styles (lists, headings) go through the
//! styled-text projection, which rebuilds the tree with the paragraph
//! structure renormalized.

use crate::dom::builder::build_document;
use crate::dom::document::Document;
use crate::dom::editor::{EditPolicy, Editor, ElementDescriptor};
use crate::dom::journal::InverseOp;
use crate::dom::tag::StandardTag;
use crate::dom::Attribute;
use crate::error::{Error, Result};
use crate::html;
use crate::range::TextRange;
use crate::styled::{
    ListItem, ListKind, StyleRun, StyledString, parse_styled, paragraph_ranges, serialize_styled,
};

/// A rich-text document with its editing command surface.
#[derive(Debug, Default)]
pub struct Engine {
    dom: Document,
    policy: EditPolicy,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            dom: Document::new(),
            policy: EditPolicy::default(),
        }
    }

    pub fn with_policy(policy: EditPolicy) -> Self {
        Self {
            dom: Document::new(),
            policy,
        }
    }

    // MARK: - HTML in / out

    pub fn from_html(html: &str) -> Self {
        let mut engine = Self::new();
        engine.set_html(html);
        engine
    }

    /// Replace the document with the parse of `html`.
    pub fn set_html(&mut self, html: &str) {
        let parse_tree = html::parse_html(html);
        self.dom = build_document(&parse_tree);
    }

    /// The document serialized back to an HTML string.
    pub fn html(&self) -> String {
        html::serialize(&self.dom)
    }

    // MARK: - Projections

    pub fn document(&self) -> &Document {
        &self.dom
    }

    /// The flattened text, paragraph separators and placeholders included.
    pub fn text(&self) -> String {
        self.dom.text_of(self.dom.root())
    }

    /// Flattened text length in UTF-16 code units.
    pub fn len(&self) -> usize {
        self.dom.length_of(self.dom.root())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Project the document into styled-text runs.
    pub fn styled(&self) -> StyledString {
        serialize_styled(&self.dom)
    }

    /// Replace the document from edited styled-text runs.
    pub fn set_styled(&mut self, styled: &StyledString) -> Result<()> {
        self.dom = parse_styled(styled)?;
        Ok(())
    }

    // MARK: - Plain-text edits

    pub fn insert_text(&mut self, text: &str, location: usize) -> Result<()> {
        self.editor().insert_text(text, location)
    }

    pub fn delete(&mut self, range: TextRange) -> Result<()> {
        self.editor().delete(range)
    }

    pub fn replace_characters(&mut self, range: TextRange, text: &str) -> Result<()> {
        self.editor().replace(range, text)
    }

    // MARK: - Character styles

    pub fn apply_bold(&mut self, range: TextRange) -> Result<()> {
        self.apply_element(StandardTag::Strong, range)
    }

    pub fn remove_bold(&mut self, range: TextRange) -> Result<()> {
        self.remove_element(StandardTag::B, range)
    }

    pub fn apply_italic(&mut self, range: TextRange) -> Result<()> {
        self.apply_element(StandardTag::Em, range)
    }

    pub fn remove_italic(&mut self, range: TextRange) -> Result<()> {
        self.remove_element(StandardTag::I, range)
    }

    pub fn apply_strikethrough(&mut self, range: TextRange) -> Result<()> {
        self.apply_element(StandardTag::Del, range)
    }

    pub fn remove_strikethrough(&mut self, range: TextRange) -> Result<()> {
        self.remove_element(StandardTag::S, range)
    }

    pub fn apply_underline(&mut self, range: TextRange) -> Result<()> {
        self.apply_element(StandardTag::U, range)
    }

    pub fn remove_underline(&mut self, range: TextRange) -> Result<()> {
        self.remove_element(StandardTag::U, range)
    }

    /// Wrap `range` in a standard element, merging with equivalent
    /// wrappers rather than nesting duplicates.
    pub fn apply_element(&mut self, tag: StandardTag, range: TextRange) -> Result<()> {
        self.editor().wrap(range, &ElementDescriptor::new(tag))
    }

    /// Unwrap `range` from a standard element and everything equivalent to
    /// it.
    pub fn remove_element(&mut self, tag: StandardTag, range: TextRange) -> Result<()> {
        let names: Vec<String> = tag.equivalent_names().iter().map(|n| n.to_string()).collect();
        self.editor().unwrap(range, &names)
    }

    pub fn set_link(&mut self, range: TextRange, href: &str) -> Result<()> {
        let descriptor = ElementDescriptor::new(StandardTag::A)
            .with_attributes(vec![Attribute::string("href", href)]);
        self.editor().wrap(range, &descriptor)
    }

    pub fn remove_link(&mut self, range: TextRange) -> Result<()> {
        self.editor().unwrap(range, &["a".to_string()])
    }

    /// Replace `range` with an image element.
    pub fn insert_image(&mut self, range: TextRange, src: &str) -> Result<()> {
        let descriptor = ElementDescriptor::new(StandardTag::Img)
            .with_attributes(vec![Attribute::string("src", src)]);
        self.editor().insert_element(range, &descriptor)
    }

    // MARK: - Paragraph styles

    pub fn apply_blockquote(&mut self, range: TextRange) -> Result<()> {
        self.apply_element(StandardTag::Blockquote, range)
    }

    pub fn remove_blockquote(&mut self, range: TextRange) -> Result<()> {
        self.remove_element(StandardTag::Blockquote, range)
    }

    /// Toggle ordered-list membership for the paragraphs touching `range`.
    /// When every touched paragraph is already in such a list, membership
    /// is removed; otherwise every touched paragraph joins one.
    pub fn toggle_ordered_list(&mut self, range: TextRange) -> Result<()> {
        self.toggle_list(range, ListKind::Ordered)
    }

    pub fn toggle_unordered_list(&mut self, range: TextRange) -> Result<()> {
        self.toggle_list(range, ListKind::Unordered)
    }

    fn toggle_list(&mut self, range: TextRange, kind: ListKind) -> Result<()> {
        self.update_paragraph_styles(range, |style: &mut crate::styled::ParagraphStyle, all_on| {
            if all_on {
                style.lists.clear();
            } else if style.lists.first().map(|item| item.kind) != Some(kind) {
                style.lists = vec![ListItem { kind, number: None }];
            }
        }, |style| style.lists.first().map(|item| item.kind) == Some(kind))
    }

    /// Set or clear the heading level of the paragraphs touching `range`.
    pub fn set_header(&mut self, range: TextRange, level: Option<u8>) -> Result<()> {
        if let Some(level) = level
            && StandardTag::for_header_level(level).is_none()
        {
            return Err(Error::InvalidHeaderLevel(level));
        }
        self.update_paragraph_styles(
            range,
            |style, _| {
                style.header = level;
                // A heading is the paragraph tag; it does not nest inside
                // an explicit <p>.
                if level.is_some() {
                    style.html_paragraph = false;
                }
            },
            |style| style.header == level,
        )
    }

    /// Rewrite the paragraph styles of every paragraph touching `range` and
    /// rebuild the tree from the result. `update` receives whether all
    /// touched paragraphs already satisfy `is_on`.
    fn update_paragraph_styles(
        &mut self,
        range: TextRange,
        update: impl Fn(&mut crate::styled::ParagraphStyle, bool),
        is_on: impl Fn(&crate::styled::ParagraphStyle) -> bool,
    ) -> Result<()> {
        let mut styled = self.styled();
        let paragraphs = paragraph_ranges(&styled.text);

        let touched: Vec<TextRange> = paragraphs
            .into_iter()
            .filter(|paragraph| paragraph_touches(*paragraph, range))
            .collect();
        if touched.is_empty() {
            return Ok(());
        }

        // Paragraph styles may only change at paragraph boundaries, so
        // first cut every run at the boundaries of the touched paragraphs.
        let cuts: Vec<usize> = touched
            .iter()
            .flat_map(|paragraph| [paragraph.location, paragraph.end()])
            .collect();
        styled.runs = split_runs_at(&styled.runs, &cuts);

        let all_on = touched.iter().all(|paragraph| {
            styled
                .runs
                .iter()
                .filter(|run| run.range.intersection(*paragraph).is_some_and(|i| !i.is_empty()))
                .all(|run| is_on(&run.style.paragraph))
        });

        for paragraph in &touched {
            for run in styled.runs.iter_mut() {
                if run
                    .range
                    .intersection(*paragraph)
                    .is_some_and(|i| !i.is_empty())
                {
                    update(&mut run.style.paragraph, all_on);
                }
            }
        }

        self.set_styled(&styled)
    }

    // MARK: - Journal

    /// Enable or disable inverse-operation recording for undo support.
    pub fn set_journaling(&mut self, enabled: bool) {
        self.dom.set_journaling(enabled);
    }

    /// Drain the inverse operations recorded since the last call.
    pub fn take_journal(&mut self) -> Vec<InverseOp> {
        self.dom.take_journal()
    }

    fn editor(&mut self) -> Editor<'_> {
        Editor::with_policy(&mut self.dom, self.policy.clone())
    }
}

/// Whether a paragraph is touched by an edit range: real overlap, or a
/// caret sitting inside or at the end of the paragraph.
fn paragraph_touches(paragraph: TextRange, range: TextRange) -> bool {
    if range.is_empty() {
        return paragraph.contains_location(range.location)
            || paragraph.end() == range.location;
    }
    paragraph
        .intersection(range)
        .is_some_and(|intersection| !intersection.is_empty())
}

/// Split runs so that no run crosses any of the given cut locations.
fn split_runs_at(runs: &[StyleRun], cuts: &[usize]) -> Vec<StyleRun> {
    let mut result = Vec::new();
    for run in runs {
        let mut start = run.range.location;
        let end = run.range.end();
        let mut inner: Vec<usize> = cuts
            .iter()
            .copied()
            .filter(|&cut| cut > start && cut < end)
            .collect();
        inner.sort_unstable();
        inner.dedup();

        for cut in inner {
            result.push(StyleRun {
                range: TextRange::new(start, cut - start),
                style: run.style.clone(),
            });
            start = cut;
        }
        result.push(StyleRun {
            range: TextRange::new(start, end - start),
            style: run.style.clone(),
        });
    }
    result
}
