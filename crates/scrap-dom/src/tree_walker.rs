//! TreeWalker
//!
//! Document-order traversal of a subtree, filtered by node type.
//! Offsets are defined by the order in which this walker visits text nodes.

use crate::{DomTree, NodeId, NodeType};

/// What types of nodes to show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WhatToShow(u32);

impl WhatToShow {
    pub const ALL: WhatToShow = WhatToShow(0xFFFF_FFFF);
    pub const ELEMENT: WhatToShow = WhatToShow(0x1);
    pub const TEXT: WhatToShow = WhatToShow(0x4);
    pub const COMMENT: WhatToShow = WhatToShow(0x80);
    pub const DOCUMENT: WhatToShow = WhatToShow(0x100);
    pub const DOCUMENT_TYPE: WhatToShow = WhatToShow(0x200);

    /// Check if a node type is shown
    pub fn includes(self, node_type: NodeType) -> bool {
        let flag = match node_type {
            NodeType::Element => Self::ELEMENT.0,
            NodeType::Text => Self::TEXT.0,
            NodeType::Comment => Self::COMMENT.0,
            NodeType::Document => Self::DOCUMENT.0,
            NodeType::DocumentType => Self::DOCUMENT_TYPE.0,
        };
        (self.0 & flag) != 0
    }
}

impl Default for WhatToShow {
    fn default() -> Self {
        Self::ALL
    }
}

/// Pre-order walker over the descendants of `root` (root excluded).
///
/// The walker holds no borrow of the tree, so callers may stop, mutate
/// and create a fresh walker. Continuing a walk across mutations is not
/// supported.
#[derive(Debug, Clone)]
pub struct TreeWalker {
    /// The root node of the traversal
    pub root: NodeId,
    /// What types of nodes to show
    pub what_to_show: WhatToShow,
    current_node: NodeId,
}

impl TreeWalker {
    pub fn new(root: NodeId, what_to_show: WhatToShow) -> Self {
        Self {
            root,
            what_to_show,
            current_node: root,
        }
    }

    /// Get the current node
    pub fn current_node(&self) -> NodeId {
        self.current_node
    }

    /// Advance to the next shown node in document order
    pub fn next_node(&mut self, tree: &DomTree) -> Option<NodeId> {
        loop {
            let next = following(tree, self.current_node, self.root)?;
            self.current_node = next;
            let shown = tree
                .get(next)
                .is_some_and(|node| self.what_to_show.includes(node.node_type()));
            if shown {
                return Some(next);
            }
        }
    }
}

/// Next node in pre-order, never leaving the subtree of `root`
fn following(tree: &DomTree, node: NodeId, root: NodeId) -> Option<NodeId> {
    let current = tree.get(node)?;
    if current.first_child.is_valid() {
        return Some(current.first_child);
    }

    let mut cursor = node;
    while cursor != root {
        let n = tree.get(cursor)?;
        if n.next_sibling.is_valid() {
            return Some(n.next_sibling);
        }
        cursor = n.parent.to_option()?;
    }
    None
}

/// Iterator adapter over a [`TreeWalker`]
pub struct Descendants<'a> {
    tree: &'a DomTree,
    walker: TreeWalker,
}

impl<'a> Descendants<'a> {
    pub fn new(tree: &'a DomTree, root: NodeId, what_to_show: WhatToShow) -> Self {
        Self {
            tree,
            walker: TreeWalker::new(root, what_to_show),
        }
    }
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        self.walker.next_node(self.tree)
    }
}
