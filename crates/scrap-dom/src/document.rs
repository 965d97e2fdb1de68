//! Document - High-level document API

use crate::{DomTree, NodeId};

/// HTML Document
#[derive(Debug)]
pub struct Document {
    /// The DOM tree
    pub tree: DomTree,
    /// Document URL
    url: String,
    /// Cached reference to <html> element
    html_element: NodeId,
    /// Cached reference to <head> element
    head_element: NodeId,
    /// Cached reference to <body> element
    body_element: NodeId,
}

impl Document {
    /// Create a document with an empty `html/head/body` skeleton
    pub fn new(url: &str) -> Self {
        let mut tree = DomTree::new();
        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        let mut doc = Self::empty(url);
        // Fresh elements under the document node cannot violate the hierarchy
        let linked = tree
            .append_child(tree.root(), html)
            .and_then(|_| tree.append_child(html, head))
            .and_then(|_| tree.append_child(html, body));
        if linked.is_ok() {
            doc.html_element = html;
            doc.head_element = head;
            doc.body_element = body;
        }
        doc.tree = tree;
        doc
    }

    /// Create an empty document (no structure)
    pub fn empty(url: &str) -> Self {
        Self {
            tree: DomTree::new(),
            url: url.to_string(),
            html_element: NodeId::NONE,
            head_element: NodeId::NONE,
            body_element: NodeId::NONE,
        }
    }

    /// Wrap a tree built elsewhere (e.g. by the parser) and locate its
    /// `html`, `head` and `body` elements.
    pub fn from_tree(url: &str, tree: DomTree) -> Self {
        let mut doc = Self::empty(url);
        doc.tree = tree;
        doc.finalize();
        doc
    }

    /// Refresh the cached structural elements
    pub fn finalize(&mut self) {
        let tree = &self.tree;
        let child_named = |parent: NodeId, tag: &str| {
            tree.children(parent)
                .map(|(id, _)| id)
                .find(|&id| tree.is_element_named(id, tag))
                .unwrap_or(NodeId::NONE)
        };
        let html = child_named(tree.root(), "html");
        let head = child_named(html, "head");
        let body = child_named(html, "body");

        self.html_element = html;
        self.head_element = head;
        self.body_element = body;
    }

    /// Get document URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Text of the first `<title>` in `<head>`
    pub fn title(&self) -> String {
        if !self.head_element.is_valid() {
            return String::new();
        }
        self.tree
            .children(self.head_element)
            .map(|(id, _)| id)
            .find(|&id| self.tree.is_element_named(id, "title"))
            .map(|title| self.tree.text_content(title).trim().to_string())
            .unwrap_or_default()
    }

    /// Get <html> element
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    /// Get <head> element
    pub fn head(&self) -> NodeId {
        self.head_element
    }

    /// Get <body> element
    pub fn body(&self) -> NodeId {
        self.body_element
    }

    /// Get element by ID
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree
            .elements(self.tree.root())
            .find(|&node| self.tree.get_attribute(node, "id") == Some(id))
    }

    /// First element in document order carrying `class`
    pub fn first_element_with_class(&self, class: &str) -> Option<NodeId> {
        self.tree
            .elements(self.tree.root())
            .find(|&node| self.tree.has_class(node, class))
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}
