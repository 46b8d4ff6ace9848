//! Element attributes, including parsed inline CSS.
//!
//! An attribute value is either absent, a plain string, or — for `style`
//! attributes whose content parses as a declaration block — a flat list of
//! CSS name/value pairs. Malformed CSS never errors; it degrades to a plain
//! string value so unknown markup still round-trips.

use std::fmt;

use cssparser::{Delimiter, ParseError, Parser, ParserInput, Token};
use tracing::warn;

/// A single parsed CSS declaration, e.g. `color: red`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CssAttribute {
    pub name: String,
    /// Raw value text, whitespace-trimmed. `None` for a bare property name.
    pub value: Option<String>,
}

impl CssAttribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }
}

impl fmt::Display for CssAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}: {}", self.name, value),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Parse an inline declaration block (`name: value; name: value`) into a
/// flat list of [`CssAttribute`]s.
///
/// Unparseable declarations are skipped (recovery resumes at the next
/// semicolon); an entirely empty input yields an empty list. Deciding
/// whether a non-CSS value should fall back to a plain string is the
/// caller's job — see [`AttributeValue::style`].
pub fn parse_inline_css(raw: &str) -> Vec<CssAttribute> {
    let mut input = ParserInput::new(raw);
    let mut parser = Parser::new(&mut input);
    let mut attributes = Vec::new();

    loop {
        parser.skip_whitespace();
        if parser.is_exhausted() {
            break;
        }

        let parsed: Result<CssAttribute, ParseError<'_, ()>> = parser.try_parse(|p| {
            let name = match p.next()? {
                Token::Ident(name) => name.to_string(),
                _ => return Err(p.new_custom_error(())),
            };

            p.skip_whitespace();

            if p.is_exhausted() {
                return Ok(CssAttribute::named(name));
            }

            match p.next()? {
                Token::Colon => {}
                _ => return Err(p.new_custom_error(())),
            }

            let value = p.parse_until_before(Delimiter::Semicolon, |v| {
                let start = v.position();
                while v.next().is_ok() {}
                Ok::<String, ParseError<'_, ()>>(v.slice_from(start).trim().to_string())
            })?;

            Ok(CssAttribute {
                name,
                value: (!value.is_empty()).then_some(value),
            })
        });

        match parsed {
            Ok(attribute) => attributes.push(attribute),
            Err(_) => {
                // Skip to the next semicolon to recover.
                loop {
                    match parser.next() {
                        Ok(Token::Semicolon) | Err(_) => break,
                        Ok(_) => continue,
                    }
                }
                continue;
            }
        }

        // Consume the separating semicolon, if any.
        loop {
            match parser.next() {
                Ok(Token::Semicolon) | Err(_) => break,
                Ok(_) => continue,
            }
        }
    }

    attributes
}

/// Serialize a declaration list back to `name: value; name: value` form.
pub fn css_to_string(attributes: &[CssAttribute]) -> String {
    attributes
        .iter()
        .map(CssAttribute::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// The value side of an element attribute.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AttributeValue {
    /// A value-less attribute, e.g. `checked`.
    #[default]
    None,
    /// An opaque string value.
    String(String),
    /// A `style` attribute parsed into flat declarations.
    InlineCss(Vec<CssAttribute>),
}

impl AttributeValue {
    /// Build the value for a `style` attribute.
    ///
    /// Content that parses to at least one declaration becomes
    /// [`AttributeValue::InlineCss`]; anything else is kept verbatim as a
    /// plain string so nothing is lost.
    pub fn style(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return AttributeValue::InlineCss(Vec::new());
        }
        let parsed = parse_inline_css(raw);
        if parsed.is_empty() {
            warn!(raw, "style attribute did not parse as CSS, keeping as string");
            return AttributeValue::String(raw.to_string());
        }
        AttributeValue::InlineCss(parsed)
    }
}

/// A named attribute attached to an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: AttributeValue,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: AttributeValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Shorthand for a plain string attribute.
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: AttributeValue::String(value.into()),
        }
    }

    /// The value rendered as a string, if the attribute carries one.
    pub fn value_as_string(&self) -> Option<String> {
        match &self.value {
            AttributeValue::None => None,
            AttributeValue::String(s) => Some(s.clone()),
            AttributeValue::InlineCss(list) => Some(css_to_string(list)),
        }
    }

    /// Remove the inline-CSS declarations matching `predicate`.
    /// No-op for other value kinds.
    pub fn remove_css_attributes(&mut self, predicate: impl Fn(&CssAttribute) -> bool) {
        if let AttributeValue::InlineCss(list) = &mut self.value {
            list.retain(|attr| !predicate(attr));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_declarations_with_whitespace() {
        let parsed = parse_inline_css("color: red; font-weight : bold");
        assert_eq!(
            parsed,
            vec![
                CssAttribute::new("color", "red"),
                CssAttribute::new("font-weight", "bold"),
            ]
        );
    }

    #[test]
    fn empty_input_yields_empty_list() {
        assert!(parse_inline_css("").is_empty());
        assert!(parse_inline_css("   ").is_empty());
    }

    #[test]
    fn bare_name_has_no_value() {
        let parsed = parse_inline_css("hidden-flag");
        assert_eq!(parsed, vec![CssAttribute::named("hidden-flag")]);
    }

    #[test]
    fn non_css_falls_back_to_string_value() {
        let value = AttributeValue::style("just some words, no colon; 123");
        match value {
            AttributeValue::String(s) => assert_eq!(s, "just some words, no colon; 123"),
            other => panic!("expected string fallback, got {other:?}"),
        }
    }

    #[test]
    fn multi_token_values_keep_raw_text() {
        let parsed = parse_inline_css("margin: 0 auto 2px");
        assert_eq!(parsed, vec![CssAttribute::new("margin", "0 auto 2px")]);
    }

    #[test]
    fn round_trips_to_declaration_string() {
        let list = parse_inline_css("color: red; font-weight: bold");
        assert_eq!(css_to_string(&list), "color: red; font-weight: bold");
    }

    #[test]
    fn value_as_string_variants() {
        assert_eq!(
            Attribute::new("checked", AttributeValue::None).value_as_string(),
            None
        );
        assert_eq!(
            Attribute::string("href", "https://example.com").value_as_string(),
            Some("https://example.com".to_string())
        );
        let css = Attribute::new(
            "style",
            AttributeValue::InlineCss(vec![CssAttribute::new("color", "red")]),
        );
        assert_eq!(css.value_as_string(), Some("color: red".to_string()));
    }

    #[test]
    fn remove_css_attributes_filters_in_place() {
        let mut attr = Attribute::new(
            "style",
            AttributeValue::InlineCss(vec![
                CssAttribute::new("color", "red"),
                CssAttribute::new("font-weight", "bold"),
            ]),
        );
        attr.remove_css_attributes(|css| css.name == "color");
        assert_eq!(
            attr.value,
            AttributeValue::InlineCss(vec![CssAttribute::new("font-weight", "bold")])
        );

        let mut plain = Attribute::string("href", "x");
        plain.remove_css_attributes(|_| true);
        assert_eq!(plain.value, AttributeValue::String("x".to_string()));
    }
}
