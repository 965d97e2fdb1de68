//! Offset calculator
//!
//! Maps DOM positions to absolute offsets over the concatenated text of a
//! root element. The text nodes are visited in document order and their
//! UTF-16 lengths accumulated, so every offset means "this many code units of
//! `root.text_content()` come before me".

use std::cmp::Ordering;

use scrap_dom::{BoundaryPoint, DomTree, NodeId, Range};

use crate::{ScrapResult, TextSpan};

/// Absolute offset of `local_offset` inside the text node `node`.
///
/// A node that is not a text descendant of `root` yields the total text
/// length of `root`.
pub fn text_offset(tree: &DomTree, root: NodeId, node: NodeId, local_offset: usize) -> usize {
    let mut acc = 0;
    for text in tree.text_nodes(root) {
        if text == node {
            return acc + local_offset;
        }
        acc += tree.node_length(text);
    }
    acc
}

/// Length of `root`'s concatenated text
pub fn total_length(tree: &DomTree, root: NodeId) -> usize {
    tree.text_nodes(root).map(|text| tree.node_length(text)).sum()
}

/// Absolute offset of any boundary point.
///
/// Element containers (a child index, as selections ending on an element
/// boundary report) count the text of every text node before that child.
pub fn boundary_offset(tree: &DomTree, root: NodeId, point: BoundaryPoint) -> usize {
    if tree.is_text(point.node) {
        return text_offset(tree, root, point.node, point.offset);
    }

    let mut acc = 0;
    for text in tree.text_nodes(root) {
        if BoundaryPoint::new(text, 0).compare(tree, &point) != Some(Ordering::Less) {
            break;
        }
        acc += tree.node_length(text);
    }
    acc
}

/// Text span covered by a live range.
///
/// Fails with `InvalidSpan` when the range covers no text.
pub fn span_for_range(tree: &DomTree, root: NodeId, range: &Range) -> ScrapResult<TextSpan> {
    let start = boundary_offset(tree, root, range.start());
    let end = boundary_offset(tree, root, range.end());
    TextSpan::new(start, end)
}
