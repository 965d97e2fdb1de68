//! Comprehensive tests for scrap-html
//!
//! Parsing edge cases and markup round-trips.

use scrap_html::{HtmlParser, fragment_text, get_inner_html, get_outer_html, parse};

#[test]
fn test_parse_minimal_html() {
    let doc = parse("").unwrap();
    assert!(doc.tree().len() >= 1, "Even empty HTML should have root");
    assert!(doc.body().is_valid());
}

#[test]
fn test_parse_malformed_html() {
    let html = r#"
        <div>
            <p>Unclosed paragraph
            <span>Unclosed span
        </div>
        <p>Another paragraph without closing
    "#;
    let doc = HtmlParser::new().parse(html).unwrap();
    assert!(doc.tree().elements_by_tag(doc.body(), "p").len() >= 2);
}

#[test]
fn test_content_root_lookup() {
    let html = r#"<html><body>
        <header>Title</header>
        <div class="content"><h2>Heading</h2><p>The quick brown fox.</p></div>
    </body></html>"#;
    let doc = HtmlParser::new().parse(html).unwrap();
    let content = doc.first_element_with_class("content").unwrap();
    assert_eq!(doc.tree().text_content(content), "HeadingThe quick brown fox.");
}

#[test]
fn test_inner_html_round_trip() {
    let inner = r#"<p>The <b class="highlight-scrap" data-scrap-id="1">quick</b> brown fox.</p><h2>A &amp; B</h2>"#;
    let html = format!(r#"<html><head></head><body><div class="content">{inner}</div></body></html>"#);
    let doc = HtmlParser::new().parse(&html).unwrap();
    let content = doc.first_element_with_class("content").unwrap();

    assert_eq!(get_inner_html(doc.tree(), content), inner);
}

#[test]
fn test_outer_html_reparses_to_same_root() {
    let doc = HtmlParser::new()
        .parse(r#"<div class="content"><p>one <i>two</i></p></div>"#)
        .unwrap();
    let content = doc.first_element_with_class("content").unwrap();
    let snapshot = get_outer_html(doc.tree(), content);

    let again = HtmlParser::new().parse(&snapshot).unwrap();
    let reparsed = again.first_element_with_class("content").unwrap();
    assert_eq!(get_outer_html(again.tree(), reparsed), snapshot);
}

#[test]
fn test_fragment_text_strips_markup() {
    let text = fragment_text(r#"<b class="highlight-scrap" data-scrap-id="1">foo &amp; bar</b>"#).unwrap();
    assert_eq!(text, "foo & bar");
    assert_eq!(fragment_text("plain").unwrap(), "plain");
}

#[test]
fn test_non_bmp_text_survives() {
    let doc = parse("<p>a😀b 한글</p>").unwrap();
    assert_eq!(doc.tree().text_content(doc.body()), "a😀b 한글");
}
