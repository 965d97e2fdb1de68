//! Comprehensive tests for scrap-dom
//!
//! Range wrapping and unwrapping on small hand-built trees.

use scrap_dom::{BoundaryPoint, DomError, DomTree, NodeId, Range, Selection, utf16_len};

/// `<div><p>first</p><p>second <i>part</i> end</p></div>` under the document node
fn two_paragraphs() -> (DomTree, NodeId, [NodeId; 2]) {
    let mut tree = DomTree::new();
    let div = tree.create_element("div");
    tree.append_child(tree.root(), div).unwrap();

    let p1 = tree.create_element("p");
    let first = tree.create_text("first");
    tree.append_child(div, p1).unwrap();
    tree.append_child(p1, first).unwrap();

    let p2 = tree.create_element("p");
    tree.append_child(div, p2).unwrap();
    let second = tree.create_text("second ");
    let i = tree.create_element("i");
    let part = tree.create_text("part");
    let end = tree.create_text(" end");
    tree.append_child(p2, second).unwrap();
    tree.append_child(p2, i).unwrap();
    tree.append_child(i, part).unwrap();
    tree.append_child(p2, end).unwrap();

    (tree, div, [p1, p2])
}

#[test]
fn test_text_content_in_document_order() {
    let (tree, div, _) = two_paragraphs();
    assert_eq!(tree.text_content(div), "firstsecond part end");
}

#[test]
fn test_range_to_string_spans_elements() {
    let (tree, div, [p1, p2]) = two_paragraphs();
    let first = tree.first_child(p1).unwrap();
    let end = tree.child_ids(p2)[2];
    let range = Range::from_points(&tree, BoundaryPoint::new(first, 3), BoundaryPoint::new(end, 2)).unwrap();
    assert_eq!(range.to_string(&tree), "stsecond part e");
    assert_eq!(range.common_ancestor(&tree), Some(div));
}

#[test]
fn test_surround_within_paragraph_with_nested_element() {
    let (mut tree, _, [_, p2]) = two_paragraphs();
    let children = tree.child_ids(p2);
    let (second, end) = (children[0], children[2]);

    // "nd part e" stays inside p2, so the <i> is fully contained
    let b = tree.create_element("b");
    let mut range = Range::between(second, 4, end, 2);
    range.surround_contents(&mut tree, b).unwrap();

    assert_eq!(tree.text_content(b), "nd part e");
    assert_eq!(tree.text_content(p2), "second part end");
    assert_eq!(tree.parent(b), Some(p2));
}

#[test]
fn test_extract_and_reinsert_keeps_text_order() {
    let (mut tree, div, [p1, p2]) = two_paragraphs();
    let first = tree.first_child(p1).unwrap();
    let second = tree.first_child(p2).unwrap();
    let before = tree.text_content(div);

    let mut range = Range::between(first, 1, second, 3);
    let mut fragment = range.extract_contents(&mut tree).unwrap();
    let b = tree.create_element("b");
    range.insert_node(&mut tree, b).unwrap();
    tree.append_fragment(b, &mut fragment).unwrap();

    assert_eq!(tree.text_content(b), "irstsec");
    assert_eq!(tree.text_content(div), before);
    assert_eq!(tree.parent(b), Some(div));
}

#[test]
fn test_unwrap_then_normalize_restores_single_text() {
    let (mut tree, _, [p1, _]) = two_paragraphs();
    let first = tree.first_child(p1).unwrap();
    let b = tree.create_element("b");
    let mut range = Range::between(first, 1, first, 4);
    range.surround_contents(&mut tree, b).unwrap();
    assert_eq!(tree.child_count(p1), 3);

    tree.unwrap_element(b).unwrap();
    tree.normalize(p1).unwrap();
    assert_eq!(tree.child_ids(p1), vec![first]);
    assert_eq!(tree.text(first), Some("first"));
}

#[test]
fn test_surround_detached_range_fails() {
    let mut tree = DomTree::new();
    let orphan = tree.create_text("orphan");
    let other = tree.create_text("other");
    let range = Range::between(orphan, 0, other, 2);
    assert_eq!(
        range.validate(&tree),
        Err(DomError::InvalidState("range boundaries are in different trees"))
    );
}

#[test]
fn test_utf16_offsets_with_surrogates() {
    let mut tree = DomTree::new();
    let p = tree.create_element("p");
    let text = tree.create_text("a😀b");
    tree.append_child(tree.root(), p).unwrap();
    tree.append_child(p, text).unwrap();
    assert_eq!(utf16_len("a😀b"), 4);

    let range = Range::between(text, 1, text, 3);
    assert_eq!(range.to_string(&tree), "😀");

    // Splitting inside the surrogate pair is refused
    assert!(matches!(tree.split_text(text, 2), Err(DomError::IndexSize { .. })));
}

#[test]
fn test_selection_reports_text() {
    let (tree, _, [p1, _]) = two_paragraphs();
    let first = tree.first_child(p1).unwrap();
    let selection = Selection::from_range(Range::between(first, 0, first, 5));
    assert_eq!(selection.to_string(&tree), "first");
    assert_eq!(selection.range_count(), 1);
}
