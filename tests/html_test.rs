//! HTML input/output: parsing through the abstract parse tree, serializing
//! with escaping, formatting-whitespace handling.

use vellum::Engine;

#[test]
fn parse_serialize_round_trip() {
    let cases = [
        "<p>Hello</p>",
        "<p>a<strong>b</strong>c</p>",
        "<blockquote><p>quoted</p></blockquote>",
        "<ol><li>one</li><li>two</li></ol>",
        "<p>line<br>break</p>",
        "<p>a</p><hr><p>b</p>",
        r#"<p><a href="https://example.com/x?y=1">link</a></p>"#,
        r#"<p><img src="pic.png"></p>"#,
    ];
    for case in cases {
        let engine = Engine::from_html(case);
        assert_eq!(engine.html(), case, "round trip failed");
    }
}

#[test]
fn entities_are_unescaped_on_parse_and_reescaped_on_output() {
    let engine = Engine::from_html("<p>a &amp; b &lt;tag&gt;</p>");
    assert!(engine.text().starts_with("a & b <tag>"));
    assert_eq!(engine.html(), "<p>a &amp; b &lt;tag&gt;</p>");
}

#[test]
fn attribute_values_are_escaped() {
    let engine = Engine::from_html(r#"<p><a href="https://example.com/?a=1&amp;b=2">x</a></p>"#);
    assert_eq!(
        engine.html(),
        r#"<p><a href="https://example.com/?a=1&amp;b=2">x</a></p>"#
    );
}

#[test]
fn formatting_whitespace_between_blocks_is_dropped() {
    let engine = Engine::from_html("<p>a</p>\n  <p>b</p>\n");
    assert_eq!(engine.html(), "<p>a</p><p>b</p>");
}

#[test]
fn whitespace_inside_list_markup_is_dropped() {
    let engine = Engine::from_html("<ul>\n  <li>one</li>\n  <li>two</li>\n</ul>");
    assert_eq!(engine.html(), "<ul><li>one</li><li>two</li></ul>");
}

#[test]
fn significant_whitespace_is_kept() {
    let engine = Engine::from_html("<p>a b  c</p>");
    assert_eq!(engine.html(), "<p>a b  c</p>");
}

#[test]
fn style_attributes_survive_the_trip() {
    let engine = Engine::from_html(r#"<p><span style="color: red; font-weight: bold">x</span></p>"#);
    assert_eq!(
        engine.html(),
        r#"<p><span style="color: red; font-weight: bold">x</span></p>"#
    );
}

#[test]
fn value_less_attributes_stay_bare() {
    let engine = Engine::from_html("<p hidden>x</p>");
    assert_eq!(engine.html(), "<p hidden>x</p>");
}

#[test]
fn unknown_tags_are_preserved() {
    let engine = Engine::from_html(r#"<p><x-note id="7">n</x-note></p>"#);
    assert_eq!(engine.html(), r#"<p><x-note id="7">n</x-note></p>"#);
}

#[test]
fn comments_are_preserved() {
    let engine = Engine::from_html("<p>a</p><!-- keep me --><p>b</p>");
    assert_eq!(engine.html(), "<p>a</p><!-- keep me --><p>b</p>");
}

#[test]
fn malformed_html_parses_leniently() {
    // An unclosed tag is closed by the parser rather than rejected.
    let engine = Engine::from_html("<p>unclosed");
    assert_eq!(engine.html(), "<p>unclosed</p>");

    // Stray closing tags are dropped.
    let engine = Engine::from_html("</b><p>x</p>");
    assert_eq!(engine.html(), "<p>x</p>");
}

#[test]
fn set_html_replaces_the_document() {
    let mut engine = Engine::from_html("<p>old</p>");
    engine.set_html("<h1>new</h1>");
    assert_eq!(engine.html(), "<h1>new</h1>");
    assert_eq!(engine.text(), format!("new{}", '\u{2029}'));
}
