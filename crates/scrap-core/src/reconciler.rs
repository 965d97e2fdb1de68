//! Highlight reconciler
//!
//! Paints scrap markers onto a document tree and strips them again. Markers
//! are always rebuilt from scratch: `render` removes every marker, restores
//! the text-node layout, then applies the current scrap list.

use std::collections::BTreeSet;

use scrap_dom::{DomError, DomResult, DomTree, NodeId, Range};

use crate::offsets::total_length;
use crate::resolver::{range_for_offsets, range_for_text};
use crate::{Config, MarkerSpec, ScrapId, ScrapRecord};

/// Outcome of one `apply_highlights` pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Scraps that received a marker, in application order
    pub applied: Vec<ScrapId>,
    /// Scraps whose offsets (and text, if enabled) no longer resolve
    pub unresolved: Vec<ScrapId>,
    /// Scraps that resolved but could not be wrapped
    pub failed: Vec<ScrapId>,
}

/// Applies and removes highlight markers
#[derive(Debug, Clone)]
pub struct HighlightReconciler {
    marker: MarkerSpec,
    content_tags: Vec<String>,
    content_fallback: bool,
}

impl HighlightReconciler {
    pub fn new(marker: MarkerSpec) -> Self {
        Self {
            marker,
            content_tags: vec!["p".to_string(), "h2".to_string()],
            content_fallback: false,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            marker: config.marker.clone(),
            content_tags: config.content_tags.clone(),
            content_fallback: config.content_fallback,
        }
    }

    /// Enable locating scraps by their text when offsets fail
    pub fn with_content_fallback(mut self, enabled: bool) -> Self {
        self.content_fallback = enabled;
        self
    }

    pub fn marker(&self) -> &MarkerSpec {
        &self.marker
    }

    /// Whether `node` is a marker element
    pub fn is_marker(&self, tree: &DomTree, node: NodeId) -> bool {
        tree.has_class(node, &self.marker.class)
    }

    /// Replace every marker under `root` with its children.
    ///
    /// Adjacent text nodes are merged afterwards in the content elements and
    /// in every element that lost a marker. Returns the number of markers
    /// removed.
    pub fn remove_all_highlights(&self, tree: &mut DomTree, root: NodeId) -> usize {
        let markers = tree.elements_with_class(root, &self.marker.class);
        let mut touched = BTreeSet::new();
        let mut removed = 0;

        // Document order: an outer marker goes first and its nested markers
        // are moved up before their own turn
        for marker in markers {
            let Some(parent) = tree.parent(marker) else {
                continue;
            };
            match tree.unwrap_element(marker) {
                Ok(_) => {
                    touched.insert(parent);
                    removed += 1;
                }
                Err(err) => tracing::warn!(%marker, "failed to unwrap marker: {}", err),
            }
        }

        if removed == 0 {
            return 0;
        }

        let content = self
            .content_tags
            .iter()
            .flat_map(|tag| tree.elements_by_tag(root, tag))
            .collect::<Vec<_>>();
        for node in content.into_iter().chain(touched) {
            if let Err(err) = tree.normalize(node) {
                tracing::warn!(%node, "failed to normalize after unwrapping: {}", err);
            }
        }

        tracing::debug!(removed, "removed highlight markers");
        removed
    }

    /// Wrap each scrap's text in a marker element.
    ///
    /// Scraps are resolved against the tree as it is before any marker is
    /// added, then applied from the last start offset to the first so that
    /// inserting a marker never moves an earlier scrap's boundaries.
    pub fn apply_highlights(&self, tree: &mut DomTree, root: NodeId, scraps: &[ScrapRecord]) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let mut sorted: Vec<&ScrapRecord> = scraps.iter().collect();
        sorted.sort_by_key(|scrap| scrap.offset.start);

        let total = total_length(tree, root);
        let mut resolved = Vec::with_capacity(sorted.len());
        for scrap in sorted {
            match self.resolve(tree, root, scrap, total) {
                Some(range) => resolved.push((scrap, range)),
                None => {
                    tracing::debug!(id = %scrap.id, span = %scrap.offset, "scrap no longer resolvable");
                    report.unresolved.push(scrap.id.clone());
                }
            }
        }

        for (scrap, range) in resolved.into_iter().rev() {
            // Earlier markers can only invalidate this range when scraps overlap
            let range = if range.is_valid(tree) {
                range
            } else {
                match self.resolve(tree, root, scrap, total) {
                    Some(range) => range,
                    None => {
                        report.unresolved.push(scrap.id.clone());
                        continue;
                    }
                }
            };

            match self.apply_one(tree, range, &scrap.id) {
                Ok(_) => report.applied.push(scrap.id.clone()),
                Err(err) => {
                    tracing::warn!(id = %scrap.id, span = %scrap.offset, "failed to apply highlight: {}", err);
                    report.failed.push(scrap.id.clone());
                }
            }
        }
        report
    }

    /// Remove then re-apply
    pub fn render(&self, tree: &mut DomTree, root: NodeId, scraps: &[ScrapRecord]) -> ReconcileReport {
        self.remove_all_highlights(tree, root);
        self.apply_highlights(tree, root, scraps)
    }

    fn resolve(&self, tree: &DomTree, root: NodeId, scrap: &ScrapRecord, total: usize) -> Option<Range> {
        if scrap.offset.is_empty() {
            return None;
        }
        let by_offset = scrap
            .offset
            .clamp(total)
            .and_then(|span| range_for_offsets(tree, root, span.start, span.end));
        if by_offset.is_some() || !self.content_fallback {
            return by_offset;
        }

        let range = range_for_text(tree, root, &scrap.display_text())?;
        tracing::debug!(id = %scrap.id, "located scrap by its text");
        Some(range)
    }

    fn apply_one(&self, tree: &mut DomTree, range: Range, id: &ScrapId) -> DomResult<NodeId> {
        match self.try_wrap_in_place(tree, range.clone(), id) {
            Ok(marker) => Ok(marker),
            Err(DomError::InvalidState(reason)) => {
                tracing::debug!(%id, "wrapping in place failed ({}), extracting", reason);
                self.try_extract_and_reinsert(tree, range, id)
            }
            Err(err) => Err(err),
        }
    }

    /// Build a detached marker element for `id`
    pub fn create_marker(&self, tree: &mut DomTree, id: &ScrapId) -> DomResult<NodeId> {
        let marker = tree.create_element(&self.marker.tag);
        tree.set_attribute(marker, "class", &self.marker.class)?;
        tree.set_attribute(marker, &self.marker.id_attribute, id.as_str())?;
        Ok(marker)
    }

    /// Wrap the range with `surround_contents`.
    ///
    /// Fails with `InvalidState` when the range crosses an element boundary.
    pub fn try_wrap_in_place(&self, tree: &mut DomTree, mut range: Range, id: &ScrapId) -> DomResult<NodeId> {
        let marker = self.create_marker(tree, id)?;
        if let Err(err) = range.surround_contents(tree, marker) {
            if tree.parent(marker).is_none() {
                tree.remove(marker);
            }
            return Err(err);
        }
        Ok(marker)
    }

    /// Move the range's contents into a marker and insert it where they were.
    ///
    /// Elements cut by the range boundaries are split, so a range spanning
    /// two paragraphs leaves four.
    pub fn try_extract_and_reinsert(&self, tree: &mut DomTree, mut range: Range, id: &ScrapId) -> DomResult<NodeId> {
        range.validate(tree)?;
        let marker = self.create_marker(tree, id)?;
        let mut contents = range.extract_contents(tree)?;
        tree.append_fragment(marker, &mut contents)?;
        range.insert_node(tree, marker)?;
        Ok(marker)
    }
}

impl Default for HighlightReconciler {
    fn default() -> Self {
        Self::new(MarkerSpec::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TextSpan;

    fn scrap(id: &str, start: usize, end: usize) -> ScrapRecord {
        ScrapRecord {
            id: ScrapId::new(id),
            offset: TextSpan { start, end },
            content: String::new(),
            timestamp: String::new(),
            url: String::new(),
        }
    }

    /// `<div><p>The quick brown fox.</p></div>`
    fn fox() -> (DomTree, NodeId, NodeId) {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        let p = tree.create_element("p");
        let text = tree.create_text("The quick brown fox.");
        tree.append_child(tree.root(), div).unwrap();
        tree.append_child(div, p).unwrap();
        tree.append_child(p, text).unwrap();
        (tree, div, p)
    }

    #[test]
    fn test_wrap_exact_text() {
        let (mut tree, div, p) = fox();
        let reconciler = HighlightReconciler::default();
        let report = reconciler.apply_highlights(&mut tree, div, &[scrap("1", 4, 9)]);

        assert_eq!(report.applied, vec![ScrapId::new("1")]);
        let markers = tree.elements_with_class(div, "highlight-scrap");
        assert_eq!(markers.len(), 1);
        assert_eq!(tree.text_content(markers[0]), "quick");
        assert_eq!(tree.get_attribute(markers[0], "data-scrap-id"), Some("1"));
        assert_eq!(tree.parent(markers[0]), Some(p));
    }

    #[test]
    fn test_remove_restores_single_text_node() {
        let (mut tree, div, p) = fox();
        let reconciler = HighlightReconciler::default();
        reconciler.apply_highlights(&mut tree, div, &[scrap("1", 4, 9), scrap("2", 0, 3)]);

        assert_eq!(reconciler.remove_all_highlights(&mut tree, div), 2);
        assert_eq!(tree.child_count(p), 1);
        assert_eq!(tree.text_content(p), "The quick brown fox.");
        assert_eq!(reconciler.remove_all_highlights(&mut tree, div), 0);
    }

    #[test]
    fn test_extract_fallback_across_paragraphs() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        tree.append_child(tree.root(), div).unwrap();
        for text in ["first", "second"] {
            let p = tree.create_element("p");
            let t = tree.create_text(text);
            tree.append_child(div, p).unwrap();
            tree.append_child(p, t).unwrap();
        }

        let reconciler = HighlightReconciler::default();
        let id = ScrapId::new("x");
        let range = range_for_offsets(&tree, div, 2, 8).unwrap();
        assert!(matches!(
            reconciler.try_wrap_in_place(&mut tree, range.clone(), &id),
            Err(DomError::InvalidState(_))
        ));
        // Nothing changed by the failed attempt
        assert_eq!(tree.elements_with_class(div, "highlight-scrap").len(), 0);

        let marker = reconciler.try_extract_and_reinsert(&mut tree, range, &id).unwrap();
        assert_eq!(tree.text_content(marker), "rstsec");
        assert_eq!(tree.text_content(div), "firstsecond");
    }

    #[test]
    fn test_unresolvable_is_reported() {
        let (mut tree, div, _) = fox();
        let reconciler = HighlightReconciler::default();
        let report = reconciler.apply_highlights(&mut tree, div, &[scrap("late", 40, 50), scrap("ok", 0, 3)]);
        assert_eq!(report.unresolved, vec![ScrapId::new("late")]);
        assert_eq!(report.applied, vec![ScrapId::new("ok")]);
    }

    #[test]
    fn test_empty_spans_are_unresolvable() {
        let (mut tree, div, _) = fox();
        let reconciler = HighlightReconciler::default().with_content_fallback(true);
        let report = reconciler.apply_highlights(&mut tree, div, &[scrap("empty", 4, 4), scrap("ok", 0, 3)]);
        assert_eq!(report.unresolved, vec![ScrapId::new("empty")]);
        assert_eq!(report.applied, vec![ScrapId::new("ok")]);
        assert_eq!(tree.elements_with_class(div, "highlight-scrap").len(), 1);
    }

    #[test]
    fn test_failed_wrap_frees_its_marker() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        tree.append_child(tree.root(), div).unwrap();
        for text in ["first", "second"] {
            let p = tree.create_element("p");
            let t = tree.create_text(text);
            tree.append_child(div, p).unwrap();
            tree.append_child(p, t).unwrap();
        }
        let live = tree.len();

        let range = range_for_offsets(&tree, div, 2, 8).unwrap();
        let reconciler = HighlightReconciler::default();
        assert!(reconciler.try_wrap_in_place(&mut tree, range, &ScrapId::new("x")).is_err());
        assert_eq!(tree.len(), live);
    }

    #[test]
    fn test_end_is_clamped() {
        let (mut tree, div, _) = fox();
        let reconciler = HighlightReconciler::default();
        let report = reconciler.apply_highlights(&mut tree, div, &[scrap("1", 16, 99)]);
        assert_eq!(report.applied.len(), 1);
        let markers = tree.elements_with_class(div, "highlight-scrap");
        assert_eq!(tree.text_content(markers[0]), "fox.");
    }

    #[test]
    fn test_content_fallback() {
        let (mut tree, div, _) = fox();
        let mut moved = scrap("1", 30, 35);
        moved.content = "brown".to_string();

        let strict = HighlightReconciler::default();
        assert_eq!(strict.apply_highlights(&mut tree, div, &[moved.clone()]).unresolved.len(), 1);

        let lenient = HighlightReconciler::default().with_content_fallback(true);
        let report = lenient.apply_highlights(&mut tree, div, &[moved]);
        assert_eq!(report.applied.len(), 1);
        let markers = tree.elements_with_class(div, "highlight-scrap");
        assert_eq!(tree.text_content(markers[0]), "brown");
    }
}
