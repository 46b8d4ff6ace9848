//! # vellum
//!
//! A rich-text editing engine that keeps two synchronized views of a
//! document: an HTML-like DOM tree and a run-based styled-text projection
//! (a flat string plus attribute runs, the shape GUI text surfaces edit).
//!
//! ## Features
//!
//! - Arena-backed DOM with text, comment and element nodes
//! - Range-based structural editing: insert, delete, split, merge, wrap,
//!   unwrap
//! - Bidirectional conversion between the tree and styled-text runs
//! - HTML parsing (via html5ever) and serialization
//! - Inline CSS attributes parsed into flat name/value pairs
//!
//! ## Quick Start
//!
//! ```
//! use vellum::{Engine, TextRange};
//!
//! let mut engine = Engine::from_html("<p>Hello world</p>");
//!
//! // Make "world" bold and link it.
//! engine.apply_bold(TextRange::new(6, 5)).unwrap();
//! engine.set_link(TextRange::new(6, 5), "https://example.com").unwrap();
//!
//! assert_eq!(
//!     engine.html(),
//!     "<p>Hello <a href=\"https://example.com\"><strong>world</strong></a></p>"
//! );
//!
//! // Edit as plain text; the tree follows.
//! engine.replace_characters(TextRange::new(0, 5), "Goodbye").unwrap();
//! assert!(engine.html().starts_with("<p>Goodbye "));
//! ```
//!
//! ## Working with styled text
//!
//! The [`Engine`] projects the tree into a [`StyledString`] — a flat UTF-16
//! string partitioned into runs of uniform style — and rebuilds the tree
//! from an edited run sequence:
//!
//! ```
//! use vellum::Engine;
//!
//! let engine = Engine::from_html("<p><em>hi</em></p>");
//! let styled = engine.styled();
//! assert!(styled.runs[0].style.italic);
//! ```

pub mod dom;
pub mod engine;
pub mod error;
pub mod html;
pub mod range;
pub mod styled;

pub use dom::{
    Attribute, AttributeValue, CssAttribute, Document, EditPolicy, Editor, ElementData,
    ElementDescriptor, Inspector, InverseOp, Node, NodeId, NodeKind, ParseNode, StandardTag,
    parse_inline_css, tags_equivalent,
};
pub use engine::Engine;
pub use error::{Error, Result};
pub use range::TextRange;
pub use styled::{
    EmbeddedObject, ListItem, ListKind, ParagraphStyle, RunStyle, StyleRun, StyledString,
    parse_styled, serialize_styled,
};
