//! Range and Selection API
//!
//! Range represents a contiguous part of the document.
//! Selection represents the user's text selection.
//!
//! Boundary offsets count UTF-16 code units inside text nodes and child
//! indexes inside every other container.

use std::cmp::Ordering;

use crate::{DocumentFragment, DomError, DomResult, DomTree, NodeData, NodeId, utf16_to_byte};

/// Range boundary point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryPoint {
    /// The container node
    pub node: NodeId,
    /// Offset within the container
    pub offset: usize,
}

impl BoundaryPoint {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }

    /// Tree-order comparison. `None` when the points live in different trees.
    pub fn compare(&self, tree: &DomTree, other: &BoundaryPoint) -> Option<Ordering> {
        if self.node == other.node {
            return Some(self.offset.cmp(&other.offset));
        }

        let (root_a, a) = index_path(tree, self.node)?;
        let (root_b, b) = index_path(tree, other.node)?;
        if root_a != root_b {
            return None;
        }

        let common = a.iter().zip(&b).take_while(|(x, y)| x == y).count();
        let ordering = match (common == a.len(), common == b.len()) {
            // Distinct nodes never share a full path
            (true, true) => Ordering::Equal,
            // self.node is an ancestor of other.node
            (true, false) => {
                if self.offset <= b[common] {
                    Ordering::Less
                } else {
                    Ordering::Greater
                }
            }
            // other.node is an ancestor of self.node
            (false, true) => {
                if other.offset <= a[common] {
                    Ordering::Greater
                } else {
                    Ordering::Less
                }
            }
            (false, false) => a[common].cmp(&b[common]),
        };
        Some(ordering)
    }
}

/// Child indexes from the topmost ancestor down to `node`
fn index_path(tree: &DomTree, node: NodeId) -> Option<(NodeId, Vec<usize>)> {
    tree.get(node)?;
    let mut path = Vec::new();
    let mut cursor = node;
    while let Some(parent) = tree.parent(cursor) {
        path.push(tree.child_index(cursor)?);
        cursor = parent;
    }
    path.reverse();
    Some((cursor, path))
}

fn check_point(tree: &DomTree, point: BoundaryPoint) -> DomResult<()> {
    let node = tree.get(point.node).ok_or(DomError::NotFound(point.node))?;
    if matches!(node.data, NodeData::Doctype { .. }) {
        return Err(DomError::InvalidNodeType("range boundary"));
    }
    let length = tree.node_length(point.node);
    if point.offset > length {
        return Err(DomError::IndexSize {
            offset: point.offset,
            length,
        });
    }
    Ok(())
}

/// Slice a string by UTF-16 offsets
fn utf16_slice(s: &str, from: usize, to: usize) -> &str {
    match (utf16_to_byte(s, from), utf16_to_byte(s, to)) {
        (Some(a), Some(b)) if a <= b => &s[a..b],
        _ => "",
    }
}

/// Range - a contiguous part of the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Range {
    start: BoundaryPoint,
    end: BoundaryPoint,
}

impl Range {
    /// Create a collapsed range (not validated against any tree)
    pub fn new(container: NodeId, offset: usize) -> Self {
        let point = BoundaryPoint::new(container, offset);
        Self {
            start: point,
            end: point,
        }
    }

    /// Create a range between two points (not validated against any tree)
    pub fn between(
        start_container: NodeId,
        start_offset: usize,
        end_container: NodeId,
        end_offset: usize,
    ) -> Self {
        Self {
            start: BoundaryPoint::new(start_container, start_offset),
            end: BoundaryPoint::new(end_container, end_offset),
        }
    }

    /// Create a range, checking both points and their order against `tree`
    pub fn from_points(tree: &DomTree, start: BoundaryPoint, end: BoundaryPoint) -> DomResult<Self> {
        let range = Self { start, end };
        range.validate(tree)?;
        Ok(range)
    }

    // --- Getters ---

    pub fn start(&self) -> BoundaryPoint {
        self.start
    }

    pub fn end(&self) -> BoundaryPoint {
        self.end
    }

    pub fn start_container(&self) -> NodeId {
        self.start.node
    }

    pub fn start_offset(&self) -> usize {
        self.start.offset
    }

    pub fn end_container(&self) -> NodeId {
        self.end.node
    }

    pub fn end_offset(&self) -> usize {
        self.end.offset
    }

    /// Check if the range is collapsed
    pub fn collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Check that both boundary points fit the live tree and are ordered
    pub fn validate(&self, tree: &DomTree) -> DomResult<()> {
        check_point(tree, self.start)?;
        check_point(tree, self.end)?;
        match self.start.compare(tree, &self.end) {
            Some(Ordering::Less | Ordering::Equal) => Ok(()),
            Some(Ordering::Greater) => Err(DomError::InvalidState("range start is after its end")),
            None => Err(DomError::InvalidState("range boundaries are in different trees")),
        }
    }

    pub fn is_valid(&self, tree: &DomTree) -> bool {
        self.validate(tree).is_ok()
    }

    /// Deepest node containing both boundary points
    pub fn common_ancestor(&self, tree: &DomTree) -> Option<NodeId> {
        let end_chain: Vec<NodeId> = tree.inclusive_ancestors(self.end.node).collect();
        tree.inclusive_ancestors(self.start.node)
            .find(|id| end_chain.contains(id))
    }

    // --- Setters ---

    /// Set the start position; an end before the new start collapses onto it
    pub fn set_start(&mut self, tree: &DomTree, node: NodeId, offset: usize) -> DomResult<()> {
        let point = BoundaryPoint::new(node, offset);
        check_point(tree, point)?;
        self.start = point;
        if self.start.compare(tree, &self.end) != Some(Ordering::Less) {
            self.end = point;
        }
        Ok(())
    }

    /// Set the end position; a start after the new end collapses onto it
    pub fn set_end(&mut self, tree: &DomTree, node: NodeId, offset: usize) -> DomResult<()> {
        let point = BoundaryPoint::new(node, offset);
        check_point(tree, point)?;
        self.end = point;
        if self.start.compare(tree, &self.end) != Some(Ordering::Less) {
            self.start = point;
        }
        Ok(())
    }

    /// Collapse the range to one of its boundaries
    pub fn collapse(&mut self, to_start: bool) {
        if to_start {
            self.end = self.start;
        } else {
            self.start = self.end;
        }
    }

    /// Select a node (from just before it to just after it)
    pub fn select_node(&mut self, tree: &DomTree, node: NodeId) -> DomResult<()> {
        let parent = tree.parent(node).ok_or(DomError::InvalidNodeType("selectNode"))?;
        let index = tree.child_index(node).ok_or(DomError::NotAChild { parent, child: node })?;
        self.start = BoundaryPoint::new(parent, index);
        self.end = BoundaryPoint::new(parent, index + 1);
        Ok(())
    }

    // --- Content ---

    /// Text covered by the range
    pub fn to_string(&self, tree: &DomTree) -> String {
        if self.start.node == self.end.node {
            if let Some(text) = tree.text(self.start.node) {
                return utf16_slice(text, self.start.offset, self.end.offset).to_string();
            }
        }
        let Some(ancestor) = self.common_ancestor(tree) else {
            return String::new();
        };

        let mut out = String::new();
        for id in tree.text_nodes(ancestor) {
            let node_start = BoundaryPoint::new(id, 0);
            let from = if id == self.start.node {
                self.start.offset
            } else if node_start.compare(tree, &self.start) == Some(Ordering::Less) {
                continue;
            } else {
                0
            };
            let to = if id == self.end.node {
                self.end.offset
            } else if node_start.compare(tree, &self.end) != Some(Ordering::Less) {
                break;
            } else {
                tree.node_length(id)
            };
            if let Some(text) = tree.text(id) {
                out.push_str(utf16_slice(text, from, to));
            }
            if id == self.end.node {
                break;
            }
        }
        out
    }

    // --- Manipulation ---

    /// Move the range's contents into a fragment.
    ///
    /// Partially contained ancestors are split: the part inside the range is a
    /// shallow clone carrying the original's attributes. Afterwards the range
    /// is collapsed at the point the contents were removed from.
    pub fn extract_contents(&mut self, tree: &mut DomTree) -> DomResult<DocumentFragment> {
        self.validate(tree)?;
        let mut fragment = DocumentFragment::new();
        if self.collapsed() {
            return Ok(fragment);
        }

        let ancestor = self
            .common_ancestor(tree)
            .ok_or(DomError::InvalidState("range has no common ancestor"))?;
        let container = if tree.is_text(ancestor) {
            tree.parent(ancestor).ok_or(DomError::HierarchyRequest)?
        } else {
            ancestor
        };

        // End first: splitting there never moves the start point
        let end_ref = split_toward(tree, self.end, container)?;
        let start_ref = split_toward(tree, self.start, container)?;

        let mut cursor = start_ref;
        while let Some(node) = cursor {
            if Some(node) == end_ref {
                break;
            }
            cursor = tree.next_sibling(node);
            tree.detach(node);
            fragment.append(node);
        }

        let offset = match end_ref {
            Some(node) => tree
                .child_index(node)
                .ok_or(DomError::NotAChild { parent: container, child: node })?,
            None => tree.child_count(container),
        };
        self.start = BoundaryPoint::new(container, offset);
        self.end = self.start;
        Ok(fragment)
    }

    /// Insert a node at the start of the range.
    ///
    /// A text start container is split. The range start moves to just
    /// before the inserted node; a collapsed range grows to select it.
    pub fn insert_node(&mut self, tree: &mut DomTree, node: NodeId) -> DomResult<()> {
        check_point(tree, self.start)?;
        if tree.is_inclusive_ancestor(node, self.start.node) {
            return Err(DomError::HierarchyRequest);
        }

        let was_collapsed = self.collapsed();
        let start = self.start;
        // Element-container ends are re-derived from the child they precede
        let end_ref = (!tree.is_text(self.end.node))
            .then(|| tree.child_at(self.end.node, self.end.offset));

        let (parent, reference) = if tree.is_text(start.node) {
            let parent = tree.parent(start.node).ok_or(DomError::HierarchyRequest)?;
            let reference = if start.offset == 0 {
                Some(start.node)
            } else if start.offset >= tree.node_length(start.node) {
                tree.next_sibling(start.node)
            } else {
                let tail = tree.split_text(start.node, start.offset)?;
                if self.end.node == start.node {
                    self.end = BoundaryPoint::new(tail, self.end.offset - start.offset);
                }
                Some(tail)
            };
            (parent, reference)
        } else {
            (start.node, tree.child_at(start.node, start.offset))
        };

        tree.insert_before(parent, node, reference)?;
        let index = tree
            .child_index(node)
            .ok_or(DomError::NotAChild { parent, child: node })?;
        self.start = BoundaryPoint::new(parent, index);

        if was_collapsed {
            self.end = BoundaryPoint::new(parent, index + 1);
        } else if let Some(end_ref) = end_ref {
            let offset = match end_ref {
                Some(child) => tree.child_index(child).unwrap_or(0),
                None => tree.child_count(self.end.node),
            };
            self.end.offset = offset;
        }
        Ok(())
    }

    /// Wrap the range's contents in `new_parent`.
    ///
    /// Fails with `InvalidState` when a non-text node contains exactly one
    /// of the boundary points, which would require splitting an element.
    pub fn surround_contents(&mut self, tree: &mut DomTree, new_parent: NodeId) -> DomResult<()> {
        self.validate(tree)?;

        let start_chain: Vec<NodeId> = tree.inclusive_ancestors(self.start.node).collect();
        let end_chain: Vec<NodeId> = tree.inclusive_ancestors(self.end.node).collect();
        let partially_contains_element = start_chain
            .iter()
            .filter(|id| !end_chain.contains(id))
            .chain(end_chain.iter().filter(|id| !start_chain.contains(id)))
            .any(|&id| !tree.is_text(id));
        if partially_contains_element {
            return Err(DomError::InvalidState("range partially contains a non-text node"));
        }

        if !tree.is_element(new_parent) {
            return Err(DomError::InvalidNodeType("surroundContents"));
        }
        for child in tree.child_ids(new_parent) {
            tree.detach(child);
        }

        let mut fragment = self.extract_contents(tree)?;
        self.insert_node(tree, new_parent)?;
        tree.append_fragment(new_parent, &mut fragment)?;
        self.select_node(tree, new_parent)
    }
}

/// Split every ancestor of `point` below `container` at the point.
///
/// An element is only split when text lies on both sides of the point, so
/// no split leaves a copy without text. Returns the child of `container`
/// that now directly follows the point (`None` when the point ends up after
/// the last child).
fn split_toward(tree: &mut DomTree, point: BoundaryPoint, container: NodeId) -> DomResult<Option<NodeId>> {
    let (mut parent, mut next) = if tree.is_text(point.node) {
        let parent = tree.parent(point.node).ok_or(DomError::HierarchyRequest)?;
        let next = if point.offset == 0 {
            Some(point.node)
        } else if point.offset >= tree.node_length(point.node) {
            tree.next_sibling(point.node)
        } else {
            Some(tree.split_text(point.node, point.offset)?)
        };
        (parent, next)
    } else {
        (point.node, tree.child_at(point.node, point.offset))
    };

    while parent != container {
        let grandparent = tree.parent(parent).ok_or(DomError::HierarchyRequest)?;
        next = match next {
            None => tree.next_sibling(parent),
            Some(child) if !holds_text(tree, tree.prev_sibling(child), DomTree::prev_sibling) => Some(parent),
            Some(child) if !holds_text(tree, Some(child), DomTree::next_sibling) => tree.next_sibling(parent),
            Some(child) => {
                let clone = tree.shallow_clone(parent)?;
                tracing::trace!(element = %parent, clone = %clone, "splitting element at range boundary");
                tree.insert_after(parent, clone)?;
                let mut moving = Some(child);
                while let Some(node) = moving {
                    moving = tree.next_sibling(node);
                    tree.append_child(clone, node)?;
                }
                Some(clone)
            }
        };
        parent = grandparent;
    }
    Ok(next)
}

/// Whether `first` or any sibling reached from it through `step` has text
fn holds_text(tree: &DomTree, first: Option<NodeId>, step: fn(&DomTree, NodeId) -> Option<NodeId>) -> bool {
    std::iter::successors(first, |&id| step(tree, id)).any(|id| match tree.text(id) {
        Some(text) => !text.is_empty(),
        None => tree.text_nodes(id).any(|t| tree.text(t).is_some_and(|text| !text.is_empty())),
    })
}

/// Selection type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionType {
    #[default]
    None,
    Caret,
    Range,
}

/// Selection - the user's current selection in the document
#[derive(Debug, Clone, Default)]
pub struct Selection {
    ranges: Vec<Range>,
    anchor: Option<BoundaryPoint>,
    focus: Option<BoundaryPoint>,
    selection_type: SelectionType,
}

impl Selection {
    /// Create a new empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Selection holding a single range
    pub fn from_range(range: Range) -> Self {
        let mut selection = Self::new();
        selection.add_range(range);
        selection
    }

    pub fn anchor(&self) -> Option<BoundaryPoint> {
        self.anchor
    }

    pub fn focus(&self) -> Option<BoundaryPoint> {
        self.focus
    }

    /// True when nothing or only a caret is selected
    pub fn is_collapsed(&self) -> bool {
        self.selection_type != SelectionType::Range
    }

    pub fn range_count(&self) -> usize {
        self.ranges.len()
    }

    pub fn selection_type(&self) -> SelectionType {
        self.selection_type
    }

    /// Get a range by index
    pub fn get_range_at(&self, index: usize) -> Option<&Range> {
        self.ranges.get(index)
    }

    /// Add a range to the selection
    pub fn add_range(&mut self, range: Range) {
        if self.anchor.is_none() {
            self.anchor = Some(range.start());
        }
        self.focus = Some(range.end());
        self.selection_type = if range.collapsed() {
            SelectionType::Caret
        } else {
            SelectionType::Range
        };
        self.ranges.push(range);
    }

    /// Remove all ranges
    pub fn remove_all_ranges(&mut self) {
        *self = Self::default();
    }

    /// Collapse the selection to a caret
    pub fn collapse(&mut self, node: NodeId, offset: usize) {
        self.remove_all_ranges();
        self.add_range(Range::new(node, offset));
    }

    /// Selected text across all ranges
    pub fn to_string(&self, tree: &DomTree) -> String {
        self.ranges.iter().map(|r| r.to_string(tree)).collect()
    }
}
