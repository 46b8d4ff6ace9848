//! Property tests: round-trip convergence, the length invariant, and
//! parent/child consistency under random edit sequences.

use proptest::prelude::*;

use vellum::{Document, Engine, NodeId, TextRange, parse_styled, serialize_styled};

const SEP: char = '\u{2029}';

#[derive(Debug, Clone)]
struct ParaSpec {
    content: String,
    bold: bool,
    italic: bool,
    header: Option<u8>,
    ordered_list: Option<bool>,
    blockquote: bool,
}

fn para_spec() -> impl Strategy<Value = ParaSpec> {
    (
        "[a-z][a-z ]{0,6}",
        any::<bool>(),
        any::<bool>(),
        prop::option::of(1u8..=3),
        prop::option::of(any::<bool>()),
        any::<bool>(),
    )
        .prop_map(
            |(content, bold, italic, header, ordered_list, blockquote)| ParaSpec {
                content,
                bold,
                italic,
                header,
                ordered_list,
                blockquote,
            },
        )
}

fn spec_to_html(specs: &[ParaSpec]) -> String {
    let mut html = String::new();
    for spec in specs {
        let mut inner = spec.content.clone();
        if spec.italic {
            inner = format!("<em>{inner}</em>");
        }
        if spec.bold {
            inner = format!("<strong>{inner}</strong>");
        }
        let mut block = match spec.header {
            Some(level) => format!("<h{level}>{inner}</h{level}>"),
            None => format!("<p>{inner}</p>"),
        };
        if spec.blockquote {
            block = format!("<blockquote>{block}</blockquote>");
        }
        match spec.ordered_list {
            Some(true) => block = format!("<ol><li>{block}</li></ol>"),
            Some(false) => block = format!("<ul><li>{block}</li></ul>"),
            None => {}
        }
        html.push_str(&block);
    }
    html
}

fn assert_length_invariant(dom: &Document, id: NodeId) {
    assert_eq!(
        dom.length_of(id),
        dom.text_of(id).encode_utf16().count(),
        "length invariant violated"
    );
    for &child in dom.children(id) {
        assert_length_invariant(dom, child);
    }
}

proptest! {
    /// serialize ∘ parse reaches a fixpoint after one application:
    /// adjacent same-kind structures may normalize once (e.g. two touching
    /// lists coalesce), after which the representation is stable.
    #[test]
    fn round_trip_reaches_a_fixpoint(specs in prop::collection::vec(para_spec(), 1..6)) {
        let engine = Engine::from_html(&spec_to_html(&specs));
        let styled0 = engine.styled();
        styled0.validate().unwrap();

        let dom1 = parse_styled(&styled0).unwrap();
        dom1.assert_consistent();
        let styled1 = serialize_styled(&dom1);
        styled1.validate().unwrap();

        let dom2 = parse_styled(&styled1).unwrap();
        let styled2 = serialize_styled(&dom2);

        prop_assert_eq!(&styled2.text, &styled1.text);
        prop_assert_eq!(&styled2.runs, &styled1.runs);
    }

    /// Every node's reported length equals the UTF-16 length of its
    /// rendered text, for documents and for run-built trees alike.
    #[test]
    fn length_invariant_holds_everywhere(specs in prop::collection::vec(para_spec(), 1..6)) {
        let engine = Engine::from_html(&spec_to_html(&specs));
        assert_length_invariant(engine.document(), engine.document().root());

        let rebuilt = parse_styled(&engine.styled()).unwrap();
        assert_length_invariant(&rebuilt, rebuilt.root());
    }

    /// Random edit sequences keep the tree consistent and the text/length
    /// agreement intact.
    #[test]
    fn random_edits_keep_invariants(
        ops in prop::collection::vec(
            (0u8..4, any::<usize>(), any::<usize>(), "[a-z]{1,4}", any::<bool>()),
            1..12,
        )
    ) {
        let mut engine = Engine::from_html("<p>seed text</p><p>more</p>");

        for (kind, a, b, text, with_separator) in ops {
            let len = engine.len();
            match kind {
                0 => {
                    let location = a % (len + 1);
                    let inserted = if with_separator {
                        format!("{text}{SEP}{text}")
                    } else {
                        text.clone()
                    };
                    engine.insert_text(&inserted, location).unwrap();
                }
                1 => {
                    if len > 0 {
                        let location = a % len;
                        let length = b % (len - location + 1);
                        engine.delete(TextRange::new(location, length)).unwrap();
                    }
                }
                2 => {
                    if len > 0 {
                        let location = a % len;
                        let length = b % (len - location + 1);
                        engine.apply_bold(TextRange::new(location, length)).unwrap();
                    }
                }
                _ => {
                    if len > 0 {
                        let location = a % len;
                        let length = b % (len - location + 1);
                        engine
                            .remove_bold(TextRange::new(location, length))
                            .unwrap();
                    }
                }
            }

            engine.document().assert_consistent();
            prop_assert_eq!(
                engine.len(),
                engine.text().encode_utf16().count()
            );
        }
    }
}
