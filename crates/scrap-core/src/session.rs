//! Scrap session
//!
//! Ties one document to its scrap store. The session owns the parsed
//! document, the live selection and the controller state, and keeps the
//! rendered markers in step with the stored records.

use scrap_dom::{Document, NodeId, Selection};
use scrap_html::{HtmlParser, get_outer_html};

use crate::content::ContentSource;
use crate::offsets::span_for_range;
use crate::resolver::{range_for_offsets, range_for_text};
use crate::selection::{ClickDisposition, SelectionController, SelectionOutcome};
use crate::service::ScrapService;
use crate::{
    Config, CreateOutcome, HighlightReconciler, KeyValueStore, ReconcileReport, ScrapDraft, ScrapError,
    ScrapId, ScrapResult, ScrapStore,
};

/// What the tooltip button did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// The clicked scrap was removed
    Removed(ScrapId),
    /// A scrap was requested for the live selection
    Scrapped(CreateOutcome),
    /// No selection or clicked scrap was pending; nothing happened
    Idle,
}

pub struct ScrapSession<S> {
    document: Document,
    root: NodeId,
    store: ScrapStore<S>,
    reconciler: HighlightReconciler,
    controller: SelectionController,
    service: Box<dyn ScrapService>,
    selection: Selection,
    config: Config,
}

impl<S: KeyValueStore> ScrapSession<S> {
    /// Load the scraps, parse the document and render the highlights
    pub async fn open(
        source: &dyn ContentSource,
        storage: S,
        service: Box<dyn ScrapService>,
        mut config: Config,
    ) -> ScrapResult<Self> {
        if let Some(location) = source.location() {
            config.document_url = location.to_string();
        }

        let snapshot = if config.restore_snapshot {
            match storage.get(&config.snapshot_key) {
                Ok(snapshot) => snapshot.filter(|html| html.contains(&config.marker.class)),
                Err(err) => {
                    tracing::warn!("failed to read content snapshot: {}", err);
                    None
                }
            }
        } else {
            None
        };

        let store = ScrapStore::load(storage, &config)?;
        let html = match snapshot {
            Some(html) => {
                tracing::info!("restoring highlighted content snapshot");
                html
            }
            None => source.fetch().await?,
        };

        let document = HtmlParser::new().parse_with_url(&html, &config.document_url)?;
        let root = match document.first_element_with_class(&config.content_class) {
            Some(root) => root,
            None if document.body().is_valid() => {
                tracing::debug!(class = %config.content_class, "no content element, using <body>");
                document.body()
            }
            None => return Err(ScrapError::NoContentRoot),
        };

        let mut session = Self {
            document,
            root,
            store,
            reconciler: HighlightReconciler::from_config(&config),
            controller: SelectionController::new(&config),
            service,
            selection: Selection::new(),
            config,
        };
        session.render();
        Ok(session)
    }

    /// Remove every marker, re-apply the stored scraps and save a snapshot
    /// of the highlighted content.
    ///
    /// The live selection is cleared, since its text nodes are split or
    /// merged by the render.
    pub fn render(&mut self) -> ReconcileReport {
        let report = self
            .reconciler
            .render(&mut self.document.tree, self.root, self.store.list());
        self.selection.remove_all_ranges();
        tracing::info!(
            applied = report.applied.len(),
            unresolved = report.unresolved.len(),
            failed = report.failed.len(),
            "rendered highlights"
        );

        let snapshot = get_outer_html(&self.document.tree, self.root);
        if let Err(err) = self.store.storage_mut().set(&self.config.snapshot_key, &snapshot) {
            tracing::warn!("failed to save content snapshot: {}", err);
        }
        report
    }

    /// Scrap the live selection
    pub async fn create_from_selection(&mut self) -> ScrapResult<CreateOutcome> {
        let Some(range) = self.selection.get_range_at(0).filter(|range| !range.collapsed()) else {
            return Ok(CreateOutcome::NoSelection);
        };

        let tree = &self.document.tree;
        let inside_root = tree.is_inclusive_ancestor(self.root, range.start_container())
            && tree.is_inclusive_ancestor(self.root, range.end_container());
        if !inside_root || !self.controller.is_in_allowed_element(tree, range.start_container()) {
            tracing::debug!("selection outside the scrappable content ignored");
            return Ok(CreateOutcome::Ineligible);
        }

        let span = match span_for_range(tree, self.root, range) {
            Ok(span) => span,
            Err(ScrapError::InvalidSpan { .. }) => return Ok(CreateOutcome::NoSelection),
            Err(err) => return Err(err),
        };
        if let Some(outcome) = self.store.check(span) {
            return Ok(outcome);
        }

        let raw = range.to_string(tree);
        let content = match raw.trim() {
            "" => raw.clone(),
            trimmed => trimmed.to_string(),
        };

        let draft = ScrapDraft { content, offset: span };
        let receipt = self.service.save_scrap(&draft).await?;
        let outcome = self
            .store
            .insert_issued(receipt.id, &draft.content, span.start, span.end)?;
        if matches!(outcome, CreateOutcome::Created(_)) {
            self.render();
        }
        Ok(outcome)
    }

    /// The tooltip button: remove the clicked scrap, or scrap the selection
    /// the tooltip was shown for
    pub async fn activate(&mut self) -> ScrapResult<Activation> {
        let Some(current) = self.controller.current() else {
            tracing::debug!("tooltip activated with nothing pending");
            return Ok(Activation::Idle);
        };
        let clicked = current
            .scrap_id
            .clone()
            .filter(|_| current.is_already_scraped);

        let activation = match clicked {
            Some(id) => {
                self.delete(&id)?;
                Activation::Removed(id)
            }
            None => Activation::Scrapped(self.create_from_selection().await?),
        };

        self.selection.remove_all_ranges();
        self.controller.hide_tooltip();
        Ok(activation)
    }

    /// Delete a scrap and re-render; `false` when the id is unknown
    pub fn delete(&mut self, id: &ScrapId) -> ScrapResult<bool> {
        let deleted = self.store.delete(id)?;
        if deleted {
            self.render();
        }
        Ok(deleted)
    }

    pub fn clear_all(&mut self) -> ScrapResult<()> {
        self.store.clear_all()?;
        self.render();
        Ok(())
    }

    /// Select `[start, end)` of the content text
    pub fn select_offsets(&mut self, start: usize, end: usize) -> ScrapResult<()> {
        let range = range_for_offsets(&self.document.tree, self.root, start, end)
            .ok_or(ScrapError::InvalidSpan { start, end })?;
        self.selection = Selection::from_range(range);
        Ok(())
    }

    /// Select the first occurrence of `needle`; `false` when absent
    pub fn select_text(&mut self, needle: &str) -> bool {
        match range_for_text(&self.document.tree, self.root, needle) {
            Some(range) => {
                self.selection = Selection::from_range(range);
                true
            }
            None => false,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The element whose text scraps address
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn store(&self) -> &ScrapStore<S> {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    pub fn controller(&self) -> &SelectionController {
        &self.controller
    }

    /// Pointer released over the document
    pub async fn on_pointer_up(&mut self) -> SelectionOutcome {
        self.controller
            .on_pointer_up(&self.document.tree, &self.selection)
            .await
    }

    /// Click on `target`, dispatched through both phases
    pub fn on_click(&mut self, target: NodeId, inside_tooltip: bool) -> ClickDisposition {
        let tree = &self.document.tree;
        let disposition = self.controller.on_click_capture(tree, target);
        if disposition == ClickDisposition::PassThrough {
            self.controller.on_click_bubble(tree, target, inside_tooltip);
        }
        disposition
    }

    /// Markup of the content root, highlights included
    pub fn content_html(&self) -> String {
        get_outer_html(&self.document.tree, self.root)
    }
}
