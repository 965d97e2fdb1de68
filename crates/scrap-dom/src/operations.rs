//! DOM Node Operations
//!
//! Core node manipulation: appendChild, insertBefore, splitText,
//! normalize, and unwrapping an element in place.

use crate::{DomTree, Node, NodeData, NodeId, utf16_len, utf16_to_byte};

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// Node not found
    #[error("node {0} not found")]
    NotFound(NodeId),

    /// Hierarchy error (e.g., inserting an ancestor into its descendant)
    #[error("hierarchy request error")]
    HierarchyRequest,

    /// Invalid node type for the operation
    #[error("invalid node type for {0}")]
    InvalidNodeType(&'static str),

    /// Node is not a child of the given parent
    #[error("node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },

    /// Offset outside the node's length
    #[error("offset {offset} is out of bounds for node of length {length}")]
    IndexSize { offset: usize, length: usize },

    /// Operation not possible in the current state
    #[error("invalid state: {0}")]
    InvalidState(&'static str),
}

/// Document fragment - lightweight holder for detached nodes
#[derive(Debug, Clone, Default)]
pub struct DocumentFragment {
    pub children: Vec<NodeId>,
}

impl DocumentFragment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, node: NodeId) {
        self.children.push(node);
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Take all children (clears fragment)
    pub fn take_children(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.children)
    }

    /// Concatenated text of the fragment's nodes
    pub fn text_content(&self, tree: &DomTree) -> String {
        self.children.iter().map(|&id| tree.text_content(id)).collect()
    }
}

impl DomTree {
    fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.get(id).ok_or(DomError::NotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> DomResult<&mut Node> {
        self.get_mut(id).ok_or(DomError::NotFound(id))
    }

    /// Append `child` as the last child of `parent`.
    ///
    /// An attached `child` is moved.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` into `parent` before `reference` (append when `None`).
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<NodeId> {
        if !self.node(parent)?.can_have_children() {
            return Err(DomError::HierarchyRequest);
        }
        if matches!(self.node(child)?.data, NodeData::Document) || self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest);
        }
        if let Some(reference) = reference {
            if self.node(reference)?.parent != parent {
                return Err(DomError::NotAChild { parent, child: reference });
            }
            if reference == child {
                return Ok(child);
            }
        }

        self.detach(child);

        let (prev, next) = match reference {
            Some(reference) => (self.node(reference)?.prev_sibling, reference),
            None => (self.node(parent)?.last_child, NodeId::NONE),
        };

        {
            let node = self.node_mut(child)?;
            node.parent = parent;
            node.prev_sibling = prev;
            node.next_sibling = next;
        }
        match self.get_mut(prev) {
            Some(prev) => prev.next_sibling = child,
            None => self.node_mut(parent)?.first_child = child,
        }
        match self.get_mut(next) {
            Some(next) => next.prev_sibling = child,
            None => self.node_mut(parent)?.last_child = child,
        }
        Ok(child)
    }

    /// Insert `child` right after `sibling`
    pub fn insert_after(&mut self, sibling: NodeId, child: NodeId) -> DomResult<NodeId> {
        let parent = self.parent(sibling).ok_or(DomError::HierarchyRequest)?;
        let next = self.next_sibling(sibling);
        self.insert_before(parent, child, next)
    }

    /// Unlink a node from its parent and siblings. No-op when detached.
    pub fn detach(&mut self, id: NodeId) {
        let Some(node) = self.get_mut(id) else { return };
        let (parent, prev, next) = (node.parent, node.prev_sibling, node.next_sibling);
        if !parent.is_valid() {
            return;
        }
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;

        match self.get_mut(prev) {
            Some(prev) => prev.next_sibling = next,
            None => {
                if let Some(parent) = self.get_mut(parent) {
                    parent.first_child = next;
                }
            }
        }
        match self.get_mut(next) {
            Some(next) => next.prev_sibling = prev,
            None => {
                if let Some(parent) = self.get_mut(parent) {
                    parent.last_child = prev;
                }
            }
        }
    }

    /// Replace an element with its own children, in place.
    ///
    /// The element itself is removed. Returns the number of children moved
    /// up.
    pub fn unwrap_element(&mut self, element: NodeId) -> DomResult<usize> {
        if !self.node(element)?.is_element() {
            return Err(DomError::InvalidNodeType("unwrap"));
        }
        let parent = self.parent(element).ok_or(DomError::HierarchyRequest)?;

        let children = self.child_ids(element);
        for &child in &children {
            self.insert_before(parent, child, Some(element))?;
        }
        self.remove(element);
        Ok(children.len())
    }

    /// Split a text node at a UTF-16 offset.
    ///
    /// The original node keeps `[0, offset)`; a new node holding the rest is
    /// inserted right after it (when attached) and returned.
    pub fn split_text(&mut self, node: NodeId, offset: usize) -> DomResult<NodeId> {
        let NodeData::Text(text) = &self.node(node)?.data else {
            return Err(DomError::InvalidNodeType("splitText"));
        };
        let length = utf16_len(&text.content);
        let byte = utf16_to_byte(&text.content, offset).ok_or(DomError::IndexSize { offset, length })?;

        let tail = match &mut self.node_mut(node)?.data {
            NodeData::Text(text) => text.content.split_off(byte),
            _ => return Err(DomError::InvalidNodeType("splitText")),
        };
        let new_node = self.create_text(&tail);
        if self.parent(node).is_some() {
            self.insert_after(node, new_node)?;
        }
        Ok(new_node)
    }

    /// Copy a node without its children (detached)
    pub fn shallow_clone(&mut self, id: NodeId) -> DomResult<NodeId> {
        let data = self.node(id)?.data.clone();
        if matches!(data, NodeData::Document) {
            return Err(DomError::InvalidNodeType("clone"));
        }
        Ok(self.push(Node::with_data(data)))
    }

    /// Set an attribute, keeping the cached class list in sync
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> DomResult<()> {
        let name_id = self.interner_mut().intern(name);
        let classes = if name == "class" {
            Some(
                value
                    .split_ascii_whitespace()
                    .map(|class| self.interner_mut().intern(class))
                    .collect::<Vec<_>>(),
            )
        } else {
            None
        };

        let elem = self
            .node_mut(node)?
            .as_element_mut()
            .ok_or(DomError::InvalidNodeType("setAttribute"))?;
        elem.set_attr(name_id, value.to_string());
        if let Some(classes) = classes {
            elem.classes = classes;
        }
        Ok(())
    }

    /// Move the fragment's nodes to the end of `parent`
    pub fn append_fragment(&mut self, parent: NodeId, fragment: &mut DocumentFragment) -> DomResult<()> {
        for child in fragment.take_children() {
            self.append_child(parent, child)?;
        }
        Ok(())
    }

    /// Merge adjacent text nodes and drop empty ones in the subtree of `node`
    pub fn normalize(&mut self, node: NodeId) -> DomResult<()> {
        self.node(node)?;
        let containers: Vec<NodeId> = std::iter::once(node)
            .chain(self.descendants(node))
            .filter(|&id| self.get(id).is_some_and(Node::can_have_children))
            .collect();

        for container in containers {
            self.merge_text_children(container);
        }
        Ok(())
    }

    fn merge_text_children(&mut self, parent: NodeId) {
        let mut child = self.first_child(parent);
        while let Some(current) = child {
            let mut next = self.next_sibling(current);
            let Some(text_len) = self.text(current).map(str::len) else {
                child = next;
                continue;
            };

            if text_len == 0 {
                self.remove(current);
                child = next;
                continue;
            }

            while let Some(following) = next.filter(|&id| self.is_text(id)) {
                let after = self.next_sibling(following);
                let tail = match self.get_mut(following).map(|n| &mut n.data) {
                    Some(NodeData::Text(t)) => std::mem::take(&mut t.content),
                    _ => String::new(),
                };
                if let Some(NodeData::Text(t)) = self.get_mut(current).map(|n| &mut n.data) {
                    t.content.push_str(&tail);
                }
                self.remove(following);
                next = after;
            }
            child = next;
        }
    }
}
