//! The DOM side of the engine: node model, tree queries, and structural
//! edit operations.

pub mod attribute;
pub mod builder;
pub mod document;
pub mod editor;
pub mod inspector;
pub mod journal;
pub mod node;
pub mod tag;

pub use attribute::{Attribute, AttributeValue, CssAttribute, parse_inline_css};
pub use builder::{ParseNode, build_document};
pub use document::Document;
pub use editor::{EditPolicy, Editor, ElementDescriptor};
pub use inspector::Inspector;
pub use journal::{InverseOp, Journal};
pub use node::{ElementData, Node, NodeId, NodeKind};
pub use tag::{StandardTag, chars, tags_equivalent};
