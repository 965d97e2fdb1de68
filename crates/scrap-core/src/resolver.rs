//! Range resolver
//!
//! The inverse of the offset calculator: absolute offsets back to a live
//! range over the current text nodes.

use scrap_dom::{BoundaryPoint, DomTree, NodeId, Range, utf16_len, utf16_to_byte};

/// Locate the live range covering `[start, end)` under `root`.
///
/// The start lands in the first text node whose running total reaches
/// `start`, the end in the first one reaching `end`. A boundary at a node
/// edge therefore resolves into the earlier node. Returns `None` when
/// either boundary is past the text, when `start > end`, or when a boundary
/// would split a surrogate pair.
pub fn range_for_offsets(tree: &DomTree, root: NodeId, start: usize, end: usize) -> Option<Range> {
    let mut acc = 0;
    let mut start_point = None;
    let mut end_point = None;

    for text in tree.text_nodes(root) {
        let len = tree.node_length(text);
        if start_point.is_none() && acc + len >= start {
            start_point = Some(BoundaryPoint::new(text, start - acc));
        }
        if acc + len >= end {
            end_point = Some(BoundaryPoint::new(text, end - acc));
            break;
        }
        acc += len;
    }

    let (start_point, end_point) = (start_point?, end_point?);
    if !splits_cleanly(tree, start_point) || !splits_cleanly(tree, end_point) {
        tracing::debug!(start, end, "offsets fall inside a surrogate pair");
        return None;
    }

    match Range::from_points(tree, start_point, end_point) {
        Ok(range) => Some(range),
        Err(err) => {
            tracing::debug!(start, end, "offsets do not form a range: {}", err);
            None
        }
    }
}

fn splits_cleanly(tree: &DomTree, point: BoundaryPoint) -> bool {
    tree.text(point.node)
        .is_some_and(|text| utf16_to_byte(text, point.offset).is_some())
}

/// Range over the first occurrence of `needle` in `root`'s text
pub fn range_for_text(tree: &DomTree, root: NodeId, needle: &str) -> Option<Range> {
    if needle.is_empty() {
        return None;
    }
    let haystack = tree.text_content(root);
    let byte = haystack.find(needle)?;
    let start = utf16_len(&haystack[..byte]);
    range_for_offsets(tree, root, start, start + utf16_len(needle))
}
