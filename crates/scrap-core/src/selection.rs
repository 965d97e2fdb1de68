//! Selection controller
//!
//! Turns pointer and click events into tooltip state. Clicking an existing
//! marker also produces a pointer-up; the `suppress_next_selection` latch
//! makes that pointer-up skip the selection read so the marker's state
//! survives.

use std::time::Duration;

use scrap_dom::{DomTree, NodeId, Selection};
use smol::Timer;

use crate::{Config, ScrapId};

/// Tooltip visibility and mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TooltipState {
    pub visible: bool,
    /// The tooltip offers "remove" instead of "scrap"
    pub is_scraped: bool,
}

/// What the tooltip button would act on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentSelection {
    pub text: String,
    pub is_already_scraped: bool,
    pub scrap_id: Option<ScrapId>,
}

/// Whether a capture-phase click was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickDisposition {
    /// The click hit a marker; stop propagation
    Consumed,
    PassThrough,
}

/// Result of reading a settled selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Skipped after a marker click
    Suppressed,
    /// Nothing selected; tooltip hidden
    Hidden,
    /// Selection starts outside the eligible elements; tooltip hidden
    Ineligible,
    /// Tooltip shown for a new selection
    Shown,
}

#[derive(Debug, Clone)]
pub struct SelectionController {
    marker_class: String,
    id_attribute: String,
    eligible_tags: Vec<String>,
    settle: Duration,
    suppress_next_selection: bool,
    tooltip: TooltipState,
    current: Option<CurrentSelection>,
}

impl SelectionController {
    pub fn new(config: &Config) -> Self {
        Self {
            marker_class: config.marker.class.clone(),
            id_attribute: config.marker.id_attribute.clone(),
            eligible_tags: config.eligible_tags.clone(),
            settle: config.selection_settle,
            suppress_next_selection: false,
            tooltip: TooltipState::default(),
            current: None,
        }
    }

    pub fn tooltip(&self) -> TooltipState {
        self.tooltip
    }

    pub fn current(&self) -> Option<&CurrentSelection> {
        self.current.as_ref()
    }

    pub fn is_suppressing(&self) -> bool {
        self.suppress_next_selection
    }

    /// Nearest marker element containing `target`
    pub fn marker_at(&self, tree: &DomTree, target: NodeId) -> Option<NodeId> {
        tree.closest(target, |tree, id| tree.has_class(id, &self.marker_class))
    }

    /// Capture-phase click handler
    pub fn on_click_capture(&mut self, tree: &DomTree, target: NodeId) -> ClickDisposition {
        let Some(marker) = self.marker_at(tree, target) else {
            return ClickDisposition::PassThrough;
        };

        self.suppress_next_selection = true;
        self.current = Some(CurrentSelection {
            text: tree.text_content(marker),
            is_already_scraped: true,
            scrap_id: tree.get_attribute(marker, &self.id_attribute).map(ScrapId::from),
        });
        self.tooltip = TooltipState {
            visible: true,
            is_scraped: true,
        };
        tracing::debug!(%marker, "marker clicked");
        ClickDisposition::Consumed
    }

    /// Bubble-phase click handler: clicks away from the tooltip and from
    /// markers dismiss it
    pub fn on_click_bubble(&mut self, tree: &DomTree, target: NodeId, inside_tooltip: bool) {
        if !inside_tooltip && self.marker_at(tree, target).is_none() {
            self.hide_tooltip();
        }
    }

    /// Pointer-up: let the selection settle, then read it
    pub async fn on_pointer_up(&mut self, tree: &DomTree, selection: &Selection) -> SelectionOutcome {
        if !self.settle.is_zero() {
            Timer::after(self.settle).await;
        }
        self.on_selection_settled(tree, selection)
    }

    /// Read the live selection and update the tooltip
    pub fn on_selection_settled(&mut self, tree: &DomTree, selection: &Selection) -> SelectionOutcome {
        if self.suppress_next_selection {
            self.suppress_next_selection = false;
            return SelectionOutcome::Suppressed;
        }

        let text = selection.to_string(tree);
        let text = text.trim();
        let Some(range) = selection.get_range_at(0).filter(|_| !text.is_empty()) else {
            self.hide_tooltip();
            return SelectionOutcome::Hidden;
        };

        if !self.is_in_allowed_element(tree, range.start_container()) {
            self.hide_tooltip();
            return SelectionOutcome::Ineligible;
        }

        self.current = Some(CurrentSelection {
            text: text.to_string(),
            is_already_scraped: false,
            scrap_id: None,
        });
        self.tooltip = TooltipState {
            visible: true,
            is_scraped: false,
        };
        SelectionOutcome::Shown
    }

    /// Whether `node` sits inside an eligible element below `<body>`
    pub fn is_in_allowed_element(&self, tree: &DomTree, node: NodeId) -> bool {
        tree.inclusive_ancestors(node)
            .take_while(|&id| !tree.is_element_named(id, "body"))
            .any(|id| self.eligible_tags.iter().any(|tag| tree.is_element_named(id, tag)))
    }

    /// Hide the tooltip and forget the current selection
    pub fn hide_tooltip(&mut self) {
        self.tooltip = TooltipState::default();
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrap_dom::Range;

    /// `<body><p>The <b class="highlight-scrap" data-scrap-id="7">quick</b></p><div>aside</div></body>`
    struct Fixture {
        tree: DomTree,
        the: NodeId,
        quick: NodeId,
        aside: NodeId,
    }

    fn fixture() -> Fixture {
        let mut tree = DomTree::new();
        let body = tree.create_element("body");
        let p = tree.create_element("p");
        let b = tree.create_element("b");
        let div = tree.create_element("div");
        let the = tree.create_text("The ");
        let quick = tree.create_text("quick");
        let aside = tree.create_text("aside");
        tree.append_child(tree.root(), body).unwrap();
        tree.append_child(body, p).unwrap();
        tree.append_child(p, the).unwrap();
        tree.append_child(p, b).unwrap();
        tree.append_child(b, quick).unwrap();
        tree.append_child(body, div).unwrap();
        tree.append_child(div, aside).unwrap();
        tree.set_attribute(b, "class", "highlight-scrap").unwrap();
        tree.set_attribute(b, "data-scrap-id", "7").unwrap();
        Fixture { tree, the, quick, aside }
    }

    fn controller() -> SelectionController {
        SelectionController::new(&Config::default())
    }

    #[test]
    fn test_marker_click_sets_latch() {
        let f = fixture();
        let mut ctl = controller();
        assert_eq!(ctl.on_click_capture(&f.tree, f.quick), ClickDisposition::Consumed);
        assert!(ctl.is_suppressing());

        let current = ctl.current().unwrap();
        assert_eq!(current.text, "quick");
        assert_eq!(current.scrap_id, Some(ScrapId::new("7")));
        assert!(ctl.tooltip().is_scraped);

        // The pointer-up of the same click is skipped and state survives
        let selection = Selection::new();
        assert_eq!(ctl.on_selection_settled(&f.tree, &selection), SelectionOutcome::Suppressed);
        assert!(!ctl.is_suppressing());
        assert!(ctl.current().is_some());
    }

    #[test]
    fn test_plain_click_passes_through() {
        let f = fixture();
        let mut ctl = controller();
        assert_eq!(ctl.on_click_capture(&f.tree, f.the), ClickDisposition::PassThrough);
        assert!(!ctl.is_suppressing());
    }

    #[test]
    fn test_selection_shows_tooltip() {
        let f = fixture();
        let mut ctl = controller();
        let selection = Selection::from_range(Range::between(f.the, 0, f.the, 3));
        assert_eq!(ctl.on_selection_settled(&f.tree, &selection), SelectionOutcome::Shown);
        assert_eq!(ctl.current().unwrap().text, "The");
        assert!(ctl.tooltip().visible);
        assert!(!ctl.tooltip().is_scraped);
    }

    #[test]
    fn test_whitespace_selection_hides() {
        let f = fixture();
        let mut ctl = controller();
        let selection = Selection::from_range(Range::between(f.the, 3, f.the, 4));
        assert_eq!(ctl.on_selection_settled(&f.tree, &selection), SelectionOutcome::Hidden);
        assert!(!ctl.tooltip().visible);
    }

    #[test]
    fn test_ineligible_container() {
        let f = fixture();
        let mut ctl = controller();
        let selection = Selection::from_range(Range::between(f.aside, 0, f.aside, 5));
        assert_eq!(ctl.on_selection_settled(&f.tree, &selection), SelectionOutcome::Ineligible);
        assert!(ctl.current().is_none());
    }

    #[test]
    fn test_bubble_click_hides_unless_on_marker_or_tooltip() {
        let f = fixture();
        let mut ctl = controller();
        ctl.on_click_capture(&f.tree, f.quick);

        ctl.on_click_bubble(&f.tree, f.quick, false);
        assert!(ctl.tooltip().visible);
        ctl.on_click_bubble(&f.tree, f.aside, true);
        assert!(ctl.tooltip().visible);
        ctl.on_click_bubble(&f.tree, f.aside, false);
        assert!(!ctl.tooltip().visible);
        assert!(ctl.current().is_none());

        // Idempotent
        ctl.hide_tooltip();
        assert_eq!(ctl.tooltip(), TooltipState::default());
    }

    #[test]
    fn test_pointer_up_waits_then_reads() {
        let f = fixture();
        let mut ctl = controller();
        let selection = Selection::from_range(Range::between(f.quick, 0, f.quick, 5));
        let outcome = smol::block_on(ctl.on_pointer_up(&f.tree, &selection));
        assert_eq!(outcome, SelectionOutcome::Shown);
    }
}
