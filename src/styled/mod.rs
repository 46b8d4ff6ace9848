//! The run-based styled-text representation.
//!
//! A [`StyledString`] is a flat string plus a gap-free, non-overlapping
//! sequence of attribute runs over it — the shape a hosting text surface
//! edits directly. The tree is the authoritative store; this projection is
//! regenerated from it and ingested back by the converter submodules.

pub mod parse;
pub mod serialize;

use crate::dom::attribute::CssAttribute;
use crate::error::{Error, Result};
use crate::range::{TextRange, utf16_len};

pub use parse::parse_styled;
pub use serialize::serialize_styled;

/// Kind of list a paragraph belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    Ordered,
    Unordered,
}

/// Membership in one list level. Paragraph styles carry one entry per
/// enclosing list, outermost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListItem {
    pub kind: ListKind,
    /// 1-based item number at this level. Filled in by serialization for
    /// ordered lists; ignored (and recomputed) when runs are turned back
    /// into a tree.
    pub number: Option<u32>,
}

impl ListItem {
    pub fn ordered(number: u32) -> Self {
        Self {
            kind: ListKind::Ordered,
            number: Some(number),
        }
    }

    pub fn unordered() -> Self {
        Self {
            kind: ListKind::Unordered,
            number: None,
        }
    }

    /// Equality that disregards item numbers, for deciding whether two
    /// paragraphs share a list structure.
    pub fn same_kind(&self, other: &ListItem) -> bool {
        self.kind == other.kind
    }
}

/// Paragraph-level style set. Only allowed to change at paragraph
/// boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParagraphStyle {
    pub blockquote: bool,
    /// The paragraph came from an explicit `<p>` element.
    pub html_paragraph: bool,
    /// Heading level 1-6.
    pub header: Option<u8>,
    pub preformatted: bool,
    /// A horizontal rule paragraph.
    pub horizontal_rule: bool,
    /// Enclosing lists, outermost first.
    pub lists: Vec<ListItem>,
}

impl ParagraphStyle {
    pub fn is_plain(&self) -> bool {
        !self.blockquote
            && !self.html_paragraph
            && self.header.is_none()
            && !self.preformatted
            && !self.horizontal_rule
            && self.lists.is_empty()
    }

    /// Whether two paragraph styles agree ignoring list item numbers.
    pub fn same_shape(&self, other: &ParagraphStyle) -> bool {
        self.blockquote == other.blockquote
            && self.html_paragraph == other.html_paragraph
            && self.header == other.header
            && self.preformatted == other.preformatted
            && self.horizontal_rule == other.horizontal_rule
            && self.lists.len() == other.lists.len()
            && self
                .lists
                .iter()
                .zip(&other.lists)
                .all(|(a, b)| a.same_kind(b))
    }
}

/// An object embedded in the text stream, occupying one placeholder
/// character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbeddedObject {
    /// An image with its source URL.
    Image { src: String },
    /// A horizontal rule.
    Rule,
    /// An HTML comment with its literal contents.
    Comment(String),
    /// A raw HTML fragment that round-trips through the parser.
    Html(String),
}

/// The full style set of one run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunStyle {
    pub bold: bool,
    pub italic: bool,
    pub strike: bool,
    pub underline: bool,
    /// Link target, when the run is inside an anchor.
    pub link: Option<String>,
    /// Opaque inline CSS carried by a wrapping `span`.
    pub css: Vec<CssAttribute>,
    /// Embedded object reference; such runs are atomic and never merge.
    pub embedded: Option<EmbeddedObject>,
    pub paragraph: ParagraphStyle,
}

impl RunStyle {
    /// Character-level equality: everything except the paragraph style.
    pub fn same_character_style(&self, other: &RunStyle) -> bool {
        self.bold == other.bold
            && self.italic == other.italic
            && self.strike == other.strike
            && self.underline == other.underline
            && self.link == other.link
            && self.css == other.css
            && self.embedded == other.embedded
    }
}

/// A maximal contiguous span of text sharing one style set.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleRun {
    pub range: TextRange,
    pub style: RunStyle,
}

/// A flat string plus its attribute runs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyledString {
    pub text: String,
    pub runs: Vec<StyleRun>,
}

impl StyledString {
    /// Validate the run invariants: runs partition the text with no gaps or
    /// overlaps, in order.
    pub fn validate(&self) -> Result<()> {
        let total = utf16_len(&self.text);
        let mut cursor = 0;

        for (index, run) in self.runs.iter().enumerate() {
            if run.range.location != cursor {
                return Err(Error::InvalidRuns(format!(
                    "run {index} starts at {} but the previous run ends at {cursor}",
                    run.range.location
                )));
            }
            if run.range.is_empty() {
                return Err(Error::InvalidRuns(format!("run {index} is empty")));
            }
            cursor = run.range.end();
        }

        if cursor != total {
            return Err(Error::InvalidRuns(format!(
                "runs cover {cursor} units of a {total}-unit string"
            )));
        }
        Ok(())
    }

    /// Ranges of the paragraphs of `text`, each including its trailing
    /// paragraph separator when present.
    pub fn paragraph_ranges(&self) -> Vec<TextRange> {
        paragraph_ranges(&self.text)
    }
}

/// Split a flat string into paragraph ranges (UTF-16 coordinates). Each
/// range includes its trailing separator; a final unterminated paragraph is
/// returned without one. The empty string has no paragraphs.
pub fn paragraph_ranges(text: &str) -> Vec<TextRange> {
    use crate::dom::tag::chars::PARAGRAPH_SEPARATOR;

    let mut ranges = Vec::new();
    let mut start = 0;
    let mut cursor = 0;

    for ch in text.chars() {
        cursor += ch.len_utf16();
        if ch == PARAGRAPH_SEPARATOR {
            ranges.push(TextRange::new(start, cursor - start));
            start = cursor;
        }
    }
    if cursor > start {
        ranges.push(TextRange::new(start, cursor - start));
    }
    ranges
}

/// Incrementally builds a [`StyledString`], coalescing adjacent spans with
/// identical styles. Runs carrying an embedded object are atomic and never
/// merge — images, rules and comments interrupt style continuity.
#[derive(Debug, Default)]
pub struct RunBuilder {
    text: String,
    runs: Vec<StyleRun>,
}

impl RunBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `text` styled with `style`.
    pub fn append(&mut self, text: &str, style: RunStyle) {
        if text.is_empty() {
            return;
        }
        let length = utf16_len(text);
        let start = utf16_len(&self.text);
        self.text.push_str(text);

        if let Some(last) = self.runs.last_mut()
            && last.style == style
            && last.style.embedded.is_none()
        {
            last.range.length += length;
            return;
        }
        self.runs.push(StyleRun {
            range: TextRange::new(start, length),
            style,
        });
    }

    pub fn finish(self) -> StyledString {
        StyledString {
            text: self.text,
            runs: self.runs,
        }
    }
}
