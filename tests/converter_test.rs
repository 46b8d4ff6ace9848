//! Styled-text conversion scenarios: round trips, list numbering, embedded
//! objects.

use vellum::{
    EmbeddedObject, Engine, ListKind, ParagraphStyle, RunStyle, StyleRun, StyledString, TextRange,
    parse_styled, serialize_styled,
};

const SEP: char = '\u{2029}';

/// One serialize→parse→serialize cycle must be a fixed point.
fn assert_round_trip_stable(html: &str) {
    let engine = Engine::from_html(html);
    let styled = engine.styled();
    styled.validate().expect("serializer output must be valid");

    let reparsed = parse_styled(&styled).expect("round trip parse");
    reparsed.assert_consistent();
    let styled_again = serialize_styled(&reparsed);

    assert_eq!(styled_again.text, styled.text, "text drifted for {html}");
    assert_eq!(styled_again.runs, styled.runs, "runs drifted for {html}");
}

#[test]
fn round_trip_plain_paragraphs() {
    assert_round_trip_stable("<p>one</p><p>two</p>");
}

#[test]
fn round_trip_inline_styles() {
    assert_round_trip_stable("<p>a<strong>b</strong><em>c</em></p>");
}

#[test]
fn round_trip_nested_inline_styles() {
    assert_round_trip_stable(r#"<p><a href="https://example.com"><strong><em>x</em></strong></a>y</p>"#);
}

#[test]
fn round_trip_block_structures() {
    assert_round_trip_stable("<blockquote><p>q</p></blockquote><h2>t</h2><pre>code</pre>");
}

#[test]
fn round_trip_lists() {
    assert_round_trip_stable("<ol><li>a</li><li>b</li></ol><ul><li>c</li></ul>");
}

#[test]
fn round_trip_embedded_objects() {
    assert_round_trip_stable(r#"<p>a<img src="x.png">b</p><hr><p>c</p>"#);
}

#[test]
fn round_trip_comments() {
    assert_round_trip_stable("<p>x</p><!--note-->");
}

#[test]
fn round_trip_line_breaks() {
    assert_round_trip_stable("<p>l1<br>l2<br>l3</p>");
}

#[test]
fn round_trip_css_spans() {
    assert_round_trip_stable(r#"<p><span style="color: red">x</span></p>"#);
}

#[test]
fn serialized_runs_partition_the_text() {
    let engine = Engine::from_html("<p>a<strong>b</strong></p><h1>t</h1>");
    let styled = engine.styled();
    styled.validate().unwrap();

    let mut cursor = 0;
    for run in &styled.runs {
        assert_eq!(run.range.location, cursor);
        cursor = run.range.end();
    }
    assert_eq!(cursor, engine.len());
}

#[test]
fn paragraph_styles_only_change_at_boundaries() {
    let engine = Engine::from_html("<p>aaa</p><h2>bbb</h2>");
    let styled = engine.styled();

    for paragraph in styled.paragraph_ranges() {
        let shapes: Vec<ParagraphStyle> = styled
            .runs
            .iter()
            .filter(|run| {
                run.range
                    .intersection(paragraph)
                    .is_some_and(|i| !i.is_empty())
            })
            .map(|run| run.style.paragraph.clone())
            .collect();
        for pair in shapes.windows(2) {
            assert!(
                pair[0].same_shape(&pair[1]),
                "paragraph style changed mid-paragraph"
            );
        }
    }
}

#[test]
fn list_items_are_numbered_in_document_order() {
    let engine = Engine::from_html("<ol><li>alpha</li><li>beta</li><li>gamma</li></ol>");
    let styled = engine.styled();

    let number_of = |needle: &str| -> u32 {
        let position = styled.text.find(needle).expect("text present");
        let utf16_position = styled.text[..position].encode_utf16().count();
        let run = styled
            .runs
            .iter()
            .find(|run| run.range.contains_location(utf16_position))
            .expect("run present");
        run.style.paragraph.lists[0].number.expect("numbered item")
    };

    assert_eq!(number_of("alpha"), 1);
    assert_eq!(number_of("beta"), 2);
    assert_eq!(number_of("gamma"), 3);
}

#[test]
fn ordered_list_renumbering_across_toggles() {
    let mut engine =
        Engine::from_html("<p>P1</p><p>P2</p><p>P3</p><p>P4</p><p>P5</p>");

    // Toggle paragraphs 3-5 into an ordered list: items number 1,2,3.
    engine.toggle_ordered_list(TextRange::new(6, 9)).unwrap();
    let styled = engine.styled();
    let numbers = collect_list_numbers(&styled);
    assert_eq!(numbers, vec![(String::from("P3"), 1), ("P4".into(), 2), ("P5".into(), 3)]);

    // Toggle the whole document: one list numbered 1..5 in document order.
    let everything = TextRange::new(0, engine.len());
    engine.toggle_ordered_list(everything).unwrap();
    let styled = engine.styled();
    let numbers = collect_list_numbers(&styled);
    assert_eq!(
        numbers,
        vec![
            ("P1".to_string(), 1),
            ("P2".to_string(), 2),
            ("P3".to_string(), 3),
            ("P4".to_string(), 4),
            ("P5".to_string(), 5),
        ]
    );

    // Structurally one single list element.
    let dom = engine.document();
    assert_eq!(dom.children(dom.root()).len(), 1);
}

/// Pairs of (paragraph text, ordered-list item number) in document order.
fn collect_list_numbers(styled: &StyledString) -> Vec<(String, u32)> {
    let mut result = Vec::new();
    for paragraph in styled.paragraph_ranges() {
        let run = styled
            .runs
            .iter()
            .find(|run| {
                run.range
                    .intersection(paragraph)
                    .is_some_and(|i| !i.is_empty())
            })
            .expect("paragraph has a run");
        let Some(item) = run.style.paragraph.lists.first() else {
            continue;
        };
        let text = vellum::range::slice_utf16(&styled.text, paragraph)
            .unwrap()
            .trim_end_matches(SEP)
            .to_string();
        result.push((text, item.number.expect("ordered item number")));
    }
    result
}

#[test]
fn toggling_a_list_off_restores_paragraphs() {
    let mut engine = Engine::from_html("<p>a</p><p>b</p>");
    let everything = TextRange::new(0, engine.len());

    engine.toggle_unordered_list(everything).unwrap();
    assert_eq!(engine.html(), "<ul><li><p>a</p></li><li><p>b</p></li></ul>");

    let everything = TextRange::new(0, engine.len());
    engine.toggle_unordered_list(everything).unwrap();
    assert_eq!(engine.html(), "<p>a</p><p>b</p>");
}

#[test]
fn set_header_changes_the_paragraph_tag() {
    let mut engine = Engine::from_html("<p>title</p><p>body</p>");
    engine.set_header(TextRange::new(0, 3), Some(2)).unwrap();
    assert_eq!(engine.html(), "<h2>title</h2><p>body</p>");

    engine.set_header(TextRange::new(0, 3), None).unwrap();
    assert_eq!(engine.html(), "<p>title</p><p>body</p>");

    assert!(engine.set_header(TextRange::new(0, 3), Some(9)).is_err());
}

#[test]
fn embedded_image_runs_carry_their_source() {
    let engine = Engine::from_html(r#"<p>a<img src="pic.png">b</p>"#);
    let styled = engine.styled();

    let image_run = styled
        .runs
        .iter()
        .find(|run| run.style.embedded.is_some())
        .expect("image run");
    assert_eq!(
        image_run.style.embedded,
        Some(EmbeddedObject::Image {
            src: "pic.png".to_string()
        })
    );
    assert_eq!(image_run.range.length, 1);
}

#[test]
fn horizontal_rule_has_its_own_paragraph_style() {
    let engine = Engine::from_html("<p>a</p><hr><p>b</p>");
    let styled = engine.styled();

    let rule_run = styled
        .runs
        .iter()
        .find(|run| run.style.embedded == Some(EmbeddedObject::Rule))
        .expect("rule run");
    assert!(rule_run.style.paragraph.horizontal_rule);
}

#[test]
fn unknown_elements_round_trip_as_raw_html() {
    let engine = Engine::from_html(r#"<p>a<x-note id="1">inner</x-note>b</p>"#);
    let styled = engine.styled();

    let html_run = styled
        .runs
        .iter()
        .find(|run| matches!(run.style.embedded, Some(EmbeddedObject::Html(_))))
        .expect("raw html run");
    match &html_run.style.embedded {
        Some(EmbeddedObject::Html(raw)) => {
            assert_eq!(raw, r#"<x-note id="1">inner</x-note>"#);
        }
        other => panic!("unexpected embed {other:?}"),
    }

    // And it comes back as the same element.
    let reparsed = parse_styled(&styled).unwrap();
    assert_eq!(
        vellum::html::serialize(&reparsed),
        r#"<p>a<x-note id="1">inner</x-note>b</p>"#
    );
}

#[test]
fn multi_root_fragment_is_wrapped_in_a_span() {
    let styled = StyledString {
        text: format!("\u{FFFC}{SEP}"),
        runs: vec![StyleRun {
            range: TextRange::new(0, 2),
            style: RunStyle {
                embedded: Some(EmbeddedObject::Html("<b>a</b><i>b</i>".to_string())),
                paragraph: ParagraphStyle {
                    html_paragraph: true,
                    ..ParagraphStyle::default()
                },
                ..RunStyle::default()
            },
        }],
    };

    let dom = parse_styled(&styled).unwrap();
    assert_eq!(
        vellum::html::serialize(&dom),
        "<p><span><b>a</b><i>b</i></span></p>"
    );
}

#[test]
fn inline_wrapping_order_is_canonical() {
    let styled = StyledString {
        text: format!("x{SEP}"),
        runs: vec![StyleRun {
            range: TextRange::new(0, 2),
            style: RunStyle {
                bold: true,
                italic: true,
                strike: true,
                underline: true,
                link: Some("https://example.com".to_string()),
                paragraph: ParagraphStyle {
                    html_paragraph: true,
                    ..ParagraphStyle::default()
                },
                ..RunStyle::default()
            },
        }],
    };

    let dom = parse_styled(&styled).unwrap();
    assert_eq!(
        vellum::html::serialize(&dom),
        "<p><a href=\"https://example.com\"><strong><em><del><u>x</u></del></em></strong></a></p>"
    );
}

#[test]
fn gapped_runs_are_rejected() {
    let styled = StyledString {
        text: "abcd".to_string(),
        runs: vec![StyleRun {
            range: TextRange::new(0, 2),
            style: RunStyle::default(),
        }],
    };
    assert!(parse_styled(&styled).is_err());
}

#[test]
fn overlapping_runs_are_rejected() {
    let styled = StyledString {
        text: "abcd".to_string(),
        runs: vec![
            StyleRun {
                range: TextRange::new(0, 3),
                style: RunStyle::default(),
            },
            StyleRun {
                range: TextRange::new(2, 2),
                style: RunStyle::default(),
            },
        ],
    };
    assert!(parse_styled(&styled).is_err());
}

#[test]
fn deserialize_defaults_to_plain_paragraphs() {
    let styled = StyledString {
        text: format!("hello{SEP}"),
        runs: vec![StyleRun {
            range: TextRange::new(0, 6),
            style: RunStyle::default(),
        }],
    };

    let dom = parse_styled(&styled).unwrap();
    assert_eq!(vellum::html::serialize(&dom), "<p>hello</p>");
}

#[test]
fn consecutive_list_paragraphs_share_one_list_element() {
    let item = |location: usize, text_len: usize| StyleRun {
        range: TextRange::new(location, text_len),
        style: RunStyle {
            paragraph: ParagraphStyle {
                lists: vec![vellum::ListItem {
                    kind: ListKind::Ordered,
                    number: None,
                }],
                ..ParagraphStyle::default()
            },
            ..RunStyle::default()
        },
    };
    let styled = StyledString {
        text: format!("a{SEP}b{SEP}"),
        runs: vec![item(0, 2), item(2, 2)],
    };

    let dom = parse_styled(&styled).unwrap();
    assert_eq!(dom.children(dom.root()).len(), 1);
    assert_eq!(vellum::html::serialize(&dom), "<ol><li>a</li><li>b</li></ol>");
}
