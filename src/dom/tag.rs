//! The standard HTML element table.
//!
//! Elements can carry any tag name, so this enum is deliberately *not* the
//! `name` field of an element node; it is the lookup table for the names the
//! editor understands. Everything else renders as an opaque placeholder and
//! round-trips as raw HTML.

/// Characters the flattened text representation is built from.
pub mod chars {
    /// Marks the end of one paragraph/block in the flattened text.
    pub const PARAGRAPH_SEPARATOR: char = '\u{2029}';

    /// A line break inside a paragraph (the rendering of `<br>`).
    pub const LINE_BREAK: char = '\n';

    /// Placeholder for embedded objects and unsupported elements.
    pub const OBJECT_REPLACEMENT: char = '\u{FFFC}';
}

/// HTML5 standard element names known to the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardTag {
    A,
    Address,
    B,
    Blockquote,
    Br,
    Code,
    Dd,
    Del,
    Div,
    Dl,
    Dt,
    Em,
    Fieldset,
    Figcaption,
    Figure,
    Form,
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    Hr,
    I,
    Img,
    Li,
    Noscript,
    Ol,
    P,
    Pre,
    S,
    Span,
    Strike,
    Strong,
    Table,
    Tbody,
    Td,
    Tfoot,
    Th,
    Thead,
    Tr,
    U,
    Ul,
}

impl StandardTag {
    /// Look up a tag by name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        use StandardTag::*;
        let lowered = name.to_ascii_lowercase();
        let tag = match lowered.as_str() {
            "a" => A,
            "address" => Address,
            "b" => B,
            "blockquote" => Blockquote,
            "br" => Br,
            "code" => Code,
            "dd" => Dd,
            "del" => Del,
            "div" => Div,
            "dl" => Dl,
            "dt" => Dt,
            "em" => Em,
            "fieldset" => Fieldset,
            "figcaption" => Figcaption,
            "figure" => Figure,
            "form" => Form,
            "h1" => H1,
            "h2" => H2,
            "h3" => H3,
            "h4" => H4,
            "h5" => H5,
            "h6" => H6,
            "hr" => Hr,
            "i" => I,
            "img" => Img,
            "li" => Li,
            "noscript" => Noscript,
            "ol" => Ol,
            "p" => P,
            "pre" => Pre,
            "s" => S,
            "span" => Span,
            "strike" => Strike,
            "strong" => Strong,
            "table" => Table,
            "tbody" => Tbody,
            "td" => Td,
            "tfoot" => Tfoot,
            "th" => Th,
            "thead" => Thead,
            "tr" => Tr,
            "u" => U,
            "ul" => Ul,
            _ => return None,
        };
        Some(tag)
    }

    /// The canonical lowercase name.
    pub fn name(&self) -> &'static str {
        use StandardTag::*;
        match self {
            A => "a",
            Address => "address",
            B => "b",
            Blockquote => "blockquote",
            Br => "br",
            Code => "code",
            Dd => "dd",
            Del => "del",
            Div => "div",
            Dl => "dl",
            Dt => "dt",
            Em => "em",
            Fieldset => "fieldset",
            Figcaption => "figcaption",
            Figure => "figure",
            Form => "form",
            H1 => "h1",
            H2 => "h2",
            H3 => "h3",
            H4 => "h4",
            H5 => "h5",
            H6 => "h6",
            Hr => "hr",
            I => "i",
            Img => "img",
            Li => "li",
            Noscript => "noscript",
            Ol => "ol",
            P => "p",
            Pre => "pre",
            S => "s",
            Span => "span",
            Strike => "strike",
            Strong => "strong",
            Table => "table",
            Tbody => "tbody",
            Td => "td",
            Tfoot => "tfoot",
            Th => "th",
            Thead => "thead",
            Tr => "tr",
            U => "u",
            Ul => "ul",
        }
    }

    /// Whether this element occupies its own visual line(s).
    pub fn is_block_level(&self) -> bool {
        use StandardTag::*;
        matches!(
            self,
            Address
                | Blockquote
                | Dd
                | Div
                | Dl
                | Dt
                | Fieldset
                | Figcaption
                | Figure
                | Form
                | H1
                | H2
                | H3
                | H4
                | H5
                | H6
                | Hr
                | Li
                | Noscript
                | Ol
                | P
                | Pre
                | Table
                | Tbody
                | Td
                | Tfoot
                | Th
                | Thead
                | Tr
                | Ul
        )
    }

    /// Tag names treated as interchangeable synonyms for matching and
    /// merging purposes.
    pub fn equivalent_names(&self) -> Vec<&'static str> {
        use StandardTag::*;
        match self {
            B | Strong => vec!["b", "strong"],
            I | Em => vec!["i", "em"],
            S | Strike | Del => vec!["s", "strike", "del"],
            _ => vec![self.name()],
        }
    }

    /// The fixed text some elements contribute regardless of children.
    ///
    /// `<br>` reads as one line break; `<img>` and `<hr>` read as one
    /// placeholder character.
    pub fn implicit_text(&self) -> Option<&'static str> {
        match self {
            StandardTag::Br => Some("\n"),
            StandardTag::Img => Some("\u{FFFC}"),
            StandardTag::Hr => Some("\u{FFFC}"),
            _ => None,
        }
    }

    /// Elements serialized without a closing tag.
    pub fn is_void(&self) -> bool {
        matches!(self, StandardTag::Br | StandardTag::Hr | StandardTag::Img)
    }

    /// Header level for `h1`-`h6`.
    pub fn header_level(&self) -> Option<u8> {
        use StandardTag::*;
        match self {
            H1 => Some(1),
            H2 => Some(2),
            H3 => Some(3),
            H4 => Some(4),
            H5 => Some(5),
            H6 => Some(6),
            _ => None,
        }
    }

    /// The header tag for a level between 1 and 6.
    pub fn for_header_level(level: u8) -> Option<Self> {
        use StandardTag::*;
        match level {
            1 => Some(H1),
            2 => Some(H2),
            3 => Some(H3),
            4 => Some(H4),
            5 => Some(H5),
            6 => Some(H6),
            _ => None,
        }
    }
}

/// Whether two tag names refer to the same kind of element under the
/// equivalence table (`b`≡`strong`, `i`≡`em`, `s`≡`strike`≡`del`).
/// Non-standard names only match themselves, case-insensitively.
pub fn tags_equivalent(a: &str, b: &str) -> bool {
    if a.eq_ignore_ascii_case(b) {
        return true;
    }
    match StandardTag::from_name(a) {
        Some(tag) => tag
            .equivalent_names()
            .iter()
            .any(|n| n.eq_ignore_ascii_case(b)),
        None => false,
    }
}
