//! DOM Tree (arena-based allocation)
//!
//! Read-side API: lookup, navigation and text queries. Mutations live in
//! `operations.rs`.

use crate::{
    Descendants, InternedString, Node, NodeData, NodeId, QualName, StringInterner, WhatToShow,
    utf16_len,
};

/// Arena-based DOM tree.
///
/// Node 0 is always the document node. Detached nodes stay in the arena
/// until removed; the slots of removed nodes (unwrapped elements, text
/// merged away by `normalize`) are reused by later insertions, so their
/// ids must not be held across those operations.
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Option<Node>>,
    free: Vec<u32>,
    interner: StringInterner,
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Some(Node::document())],
            free: Vec::new(),
            interner: StringInterner::new(),
        }
    }

    /// The document node
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())?.as_ref()
    }

    /// Get a mutable node by ID
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())?.as_mut()
    }

    /// Number of live nodes, attached or not
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    pub fn interner_mut(&mut self) -> &mut StringInterner {
        &mut self.interner
    }

    /// Resolve an interned name
    #[inline]
    pub fn resolve(&self, id: InternedString) -> &str {
        self.interner.get(id)
    }

    pub(crate) fn push(&mut self, node: Node) -> NodeId {
        if let Some(index) = self.free.pop() {
            self.nodes[index as usize] = Some(node);
            return NodeId(index);
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Some(node));
        id
    }

    /// Detach `id` and drop it with its subtree; the freed slots are reused
    /// by later node creation
    pub fn remove(&mut self, id: NodeId) {
        if id == NodeId::ROOT || self.get(id).is_none() {
            return;
        }
        self.detach(id);
        let doomed: Vec<NodeId> = std::iter::once(id).chain(self.descendants(id)).collect();
        for node in doomed {
            if let Some(slot) = self.nodes.get_mut(node.index()) {
                *slot = None;
                self.free.push(node.0);
            }
        }
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let local = self.interner.intern(tag);
        self.push(Node::element(QualName::local(local)))
    }

    /// Create a detached element with a qualified name
    pub fn create_element_qualified(&mut self, name: QualName) -> NodeId {
        self.push(Node::element(name))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.push(Node::text(content.to_string()))
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, content: &str) -> NodeId {
        self.push(Node::comment(content.to_string()))
    }

    /// Create a detached doctype node
    pub fn create_doctype(&mut self, name: &str) -> NodeId {
        self.push(Node::doctype(name.to_string()))
    }

    // --- Node queries ---

    #[inline]
    pub fn is_text(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::is_text)
    }

    #[inline]
    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::is_element)
    }

    /// Character data of a text node
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.get(id)?.as_text()
    }

    /// Tag name of an element
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        let elem = self.get(id)?.as_element()?;
        Some(self.resolve(elem.name.local))
    }

    /// Check an element's tag name (ASCII case-insensitive)
    pub fn is_element_named(&self, id: NodeId, tag: &str) -> bool {
        self.tag_name(id).is_some_and(|t| t.eq_ignore_ascii_case(tag))
    }

    /// DOM "length": UTF-16 units for text, child count otherwise
    pub fn node_length(&self, id: NodeId) -> usize {
        match self.get(id).map(|n| &n.data) {
            Some(NodeData::Text(t)) => utf16_len(&t.content),
            Some(NodeData::Comment(c)) => utf16_len(c),
            Some(NodeData::Doctype { .. }) | None => 0,
            Some(_) => self.child_count(id),
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent.to_option()
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.first_child.to_option()
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.next_sibling.to_option()
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.prev_sibling.to_option()
    }

    /// Iterate over direct children as `(id, node)` pairs
    pub fn children(&self, parent: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.get(parent).map_or(NodeId::NONE, |n| n.first_child),
        }
    }

    /// Snapshot of the child IDs, safe to hold across mutations
    pub fn child_ids(&self, parent: NodeId) -> Vec<NodeId> {
        self.children(parent).map(|(id, _)| id).collect()
    }

    pub fn child_count(&self, parent: NodeId) -> usize {
        self.children(parent).count()
    }

    /// Child at `index`, if any
    pub fn child_at(&self, parent: NodeId, index: usize) -> Option<NodeId> {
        self.children(parent).nth(index).map(|(id, _)| id)
    }

    /// Position of `node` among its siblings
    pub fn child_index(&self, node: NodeId) -> Option<usize> {
        let parent = self.parent(node)?;
        self.children(parent).position(|(id, _)| id == node)
    }

    /// Ancestors of `node`, nearest first (node itself excluded)
    pub fn ancestors(&self, node: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.get(node).map_or(NodeId::NONE, |n| n.parent),
        }
    }

    /// `node` followed by its ancestors
    pub fn inclusive_ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::once(node).chain(self.ancestors(node))
    }

    /// Whether `ancestor` is `node` or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.inclusive_ancestors(node).any(|id| id == ancestor)
    }

    /// All descendants of `root` in document order (root excluded)
    pub fn descendants(&self, root: NodeId) -> Descendants<'_> {
        Descendants::new(self, root, WhatToShow::ALL)
    }

    /// Text descendants of `root` in document order
    pub fn text_nodes(&self, root: NodeId) -> Descendants<'_> {
        Descendants::new(self, root, WhatToShow::TEXT)
    }

    /// Element descendants of `root` in document order
    pub fn elements(&self, root: NodeId) -> Descendants<'_> {
        Descendants::new(self, root, WhatToShow::ELEMENT)
    }

    /// Concatenated character data of all text descendants
    pub fn text_content(&self, node: NodeId) -> String {
        if let Some(text) = self.text(node) {
            return text.to_string();
        }
        self.text_nodes(node)
            .filter_map(|id| self.text(id))
            .collect()
    }

    // --- Attributes ---

    /// Get an attribute by name
    pub fn get_attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        let name = self.interner.lookup(name)?;
        self.get(node)?.as_element()?.get_attr(name)
    }

    /// Check the class list of an element
    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        let Some(class) = self.interner.lookup(class) else {
            return false;
        };
        self.get(node)
            .and_then(Node::as_element)
            .is_some_and(|e| e.has_class(class))
    }

    /// Nearest inclusive ancestor element matching `predicate`.
    ///
    /// Text nodes start the search at their parent element.
    pub fn closest<F>(&self, node: NodeId, mut predicate: F) -> Option<NodeId>
    where
        F: FnMut(&DomTree, NodeId) -> bool,
    {
        self.inclusive_ancestors(node)
            .filter(|&id| self.is_element(id))
            .find(|&id| predicate(self, id))
    }

    /// Elements under `root` (root excluded) carrying `class`, document order
    pub fn elements_with_class(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        let Some(class) = self.interner.lookup(class) else {
            return Vec::new();
        };
        self.elements(root)
            .filter(|&id| {
                self.get(id)
                    .and_then(Node::as_element)
                    .is_some_and(|e| e.has_class(class))
            })
            .collect()
    }

    /// Elements under `root` (root excluded) with the given tag name
    pub fn elements_by_tag(&self, root: NodeId, tag: &str) -> Vec<NodeId> {
        self.elements(root)
            .filter(|&id| self.is_element_named(id, tag))
            .collect()
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over direct children
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl<'a> Iterator for Children<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next.to_option()?;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}

/// Iterator over ancestors, nearest first
pub struct Ancestors<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next.to_option()?;
        self.next = self.tree.get(id).map_or(NodeId::NONE, |n| n.parent);
        Some(id)
    }
}
