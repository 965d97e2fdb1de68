//! Scrap DOM - Document Object Model
//!
//! Arena-based DOM tree with the range operations needed to address,
//! wrap and unwrap runs of text.
//!
//! Text offsets are UTF-16 code units throughout, matching what a browser
//! reports for `Range.startOffset` on a text node.

mod document;
mod interner;
mod node;
mod operations;
mod range;
mod text;
mod tree;
mod tree_walker;

pub use document::Document;
pub use interner::{InternedString, StringInterner};
pub use node::{Attribute, ElementData, Node, NodeData, NodeType, QualName, TextData};
pub use operations::{DocumentFragment, DomError, DomResult};
pub use range::{BoundaryPoint, Range, Selection, SelectionType};
pub use text::{utf16_len, utf16_to_byte};
pub use tree::DomTree;
pub use tree_walker::{Descendants, TreeWalker, WhatToShow};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root (document) node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check if this ID points at a node
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// `Some(self)` unless this is the sentinel
    #[inline]
    pub fn to_option(self) -> Option<NodeId> {
        self.is_valid().then_some(self)
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            write!(f, "#{}", self.0)
        } else {
            f.write_str("#none")
        }
    }
}
