//! Per-document sync session.
//!
//! A session owns the source text, its semantic model (with layout), the
//! review queue and the conflict state. Forward sync projects the model to
//! diagram markup and records which source it came from; reverse sync diffs
//! the edited diagram against the model and applies what is safe.
//!
//! A diagram edit is only trusted when the diagram was projected from the
//! current source. Otherwise every patch goes to review and the text is
//! left alone until the queue is resolved or the diagram is re-projected.

use super::apply::{ApplyOutcome, PatchApplicator};
use super::diff::diff;
use super::patch::{PatchPayload, Safety, SyncPatch, force_review};
use super::render::render_model;
use crate::base::content_hash;
use crate::interchange::{DiagramError, DiagramReader, DiagramView, DiagramWriter};
use crate::layout::{LayoutEngine, LayoutOptions};
use crate::semantic::{LayoutMap, ModelBuilder, SemanticModel};
use crate::syntax::PrintOptions;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Session configuration
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    pub layout: LayoutOptions,
    /// Diagram projected and read back
    pub view: DiagramView,
    /// Indentation of inserted statements and regenerated text
    pub print: PrintOptions,
}

impl SyncOptions {
    pub fn with_layout_options(mut self, layout: LayoutOptions) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_view(mut self, view: DiagramView) -> Self {
        self.view = view;
        self
    }

    pub fn with_print_options(mut self, print: PrintOptions) -> Self {
        self.print = print;
        self
    }
}

/// Observable sync state of a session
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncState {
    pub is_syncing: bool,
    pub source_hash: String,
    /// Source hash the current diagram was projected from
    pub drawio_snapshot_hash: Option<String>,
    /// Milliseconds since the Unix epoch
    pub last_synced_at: Option<u64>,
    pub conflict: Option<String>,
    pub diagnostics: Vec<String>,
}

/// Outcome of a reverse sync, approval or rejection
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub applied: Vec<SyncPatch>,
    pub needs_review: Vec<SyncPatch>,
    pub diagnostics: Vec<String>,
    pub conflict: Option<String>,
    /// The text changed; the host should re-project the diagram.
    pub source_changed: bool,
}

/// Message posted by the embedded diagram editor
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum CanvasMessage {
    Init,
    Save { xml: String },
    Autosave { xml: String },
    #[serde(other)]
    Other,
}

impl CanvasMessage {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Answer to a [`CanvasMessage`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum CanvasReply {
    /// Markup to load into the editor
    Load { xml: String },
    Ignored,
    Synced(SyncReport),
}

/// Sync session for one document
#[derive(Debug, Clone)]
pub struct SyncSession {
    options: SyncOptions,
    source: String,
    model: SemanticModel,
    state: SyncState,
    pending_review: Vec<SyncPatch>,
    last_pushed: Option<String>,
}

impl Default for SyncSession {
    fn default() -> Self {
        Self::new(SyncOptions::default())
    }
}

impl SyncSession {
    // ── Construction ─────────────────────────────────────────────────

    pub fn new(options: SyncOptions) -> Self {
        let mut session = Self {
            options,
            source: String::new(),
            model: SemanticModel::default(),
            state: SyncState::default(),
            pending_review: Vec::new(),
            last_pushed: None,
        };
        session.rebuild();
        session
    }

    pub fn with_source(options: SyncOptions, source: impl Into<String>) -> Self {
        let mut session = Self::new(options);
        session.load_source(source);
        session
    }

    // ── Access ───────────────────────────────────────────────────────

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn model(&self) -> &SemanticModel {
        &self.model
    }

    pub fn layout(&self) -> &LayoutMap {
        &self.model.layout
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    pub fn pending_review(&self) -> &[SyncPatch] {
        &self.pending_review
    }

    pub fn last_pushed(&self) -> Option<&str> {
        self.last_pushed.as_deref()
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    // ── Source side ──────────────────────────────────────────────────

    /// Replace the document, discarding layout, queue and sync state.
    pub fn load_source(&mut self, source: impl Into<String>) {
        self.source = source.into();
        self.model = SemanticModel::default();
        self.state = SyncState::default();
        self.pending_review.clear();
        self.last_pushed = None;
        self.rebuild();
    }

    /// The text was edited; known nodes keep their positions.
    pub fn update_source(&mut self, source: impl Into<String>) {
        self.source = source.into();
        self.rebuild();
    }

    /// Restore a persisted layout; entries for unknown ids are dropped.
    pub fn restore_layout(&mut self, layout: LayoutMap) {
        self.model.layout = layout;
        self.rebuild();
    }

    fn rebuild(&mut self) {
        let result = ModelBuilder::new()
            .with_previous_layout(self.model.layout.clone())
            .with_layout(LayoutEngine::new(self.options.layout.clone()))
            .build_text(&self.source);
        self.model = result.model;
        self.state.diagnostics = result.diagnostics;
        self.state.source_hash = content_hash(&self.source);
    }

    // ── Forward sync ─────────────────────────────────────────────────

    /// Project the model to diagram markup and record the snapshot.
    pub fn project(&mut self) -> Result<String, DiagramError> {
        let xml = DiagramWriter::new()
            .with_view(self.options.view)
            .with_layout_options(self.options.layout.clone())
            .write(&self.model)?;
        self.state.drawio_snapshot_hash = Some(self.state.source_hash.clone());
        if self.state.conflict.take().is_some() {
            info!("sync conflict cleared by projection");
        }
        self.state.last_synced_at = Some(now_millis());
        self.last_pushed = Some(xml.clone());
        Ok(xml)
    }

    fn in_sync(&self) -> bool {
        self.state.drawio_snapshot_hash.as_deref() == Some(self.state.source_hash.as_str())
    }

    // ── Reverse sync ─────────────────────────────────────────────────

    /// Bring diagram edits back into the text.
    pub fn sync_from_diagram(&mut self, xml: &str) -> Result<SyncReport, DiagramError> {
        let diagram = DiagramReader::new().read(xml)?;
        self.state.is_syncing = true;
        let report = if self.source.trim().is_empty() && self.state.drawio_snapshot_hash.is_none()
        {
            self.adopt(&diagram)
        } else {
            self.merge(&diagram)
        };
        self.state.is_syncing = false;
        self.state.last_synced_at = Some(now_millis());
        Ok(report)
    }

    /// Regenerate the text from a diagram that has no source yet.
    fn adopt(&mut self, diagram: &SemanticModel) -> SyncReport {
        self.source = render_model(diagram, &self.options.print);
        let built = ModelBuilder::new().build_text(&self.source);

        let mut used = FxHashSet::default();
        let mut layout = LayoutMap::new();
        for node in built.model.nodes.values() {
            let drawn = diagram.nodes.values().find_map(|d| {
                let rect = diagram.layout.get(&d.id)?;
                (d.kind == node.kind && d.name == node.name && !used.contains(&d.id))
                    .then_some((d.id.clone(), *rect))
            });
            if let Some((id, rect)) = drawn {
                used.insert(id);
                layout.insert(node.id.clone(), rect);
            }
        }
        self.model.layout = layout;
        self.rebuild();
        self.state.drawio_snapshot_hash = Some(self.state.source_hash.clone());
        info!(nodes = self.model.nodes.len(), "source regenerated from diagram");
        SyncReport {
            diagnostics: vec!["source regenerated from diagram".to_string()],
            source_changed: !self.source.is_empty(),
            ..SyncReport::default()
        }
    }

    fn merge(&mut self, diagram: &SemanticModel) -> SyncReport {
        let shown = self.options.view.filter(&self.model);
        let mut patches = diff(&shown, diagram);

        if !self.in_sync() {
            let message = match self.state.drawio_snapshot_hash {
                None => "diagram was not projected from this source",
                Some(_) => "source changed since the diagram was projected",
            }
            .to_string();
            warn!(%message, patches = patches.len(), "sync conflict");
            force_review(&mut patches);
            self.state.conflict = Some(message.clone());
            self.queue(&patches);
            return SyncReport {
                needs_review: patches,
                conflict: Some(message),
                ..SyncReport::default()
            };
        }

        let outcome = self.applicator().apply(&self.source, patches);
        let report = self.absorb(outcome);
        self.state.drawio_snapshot_hash = Some(self.state.source_hash.clone());
        report
    }

    fn applicator(&self) -> PatchApplicator {
        PatchApplicator::new(self.options.print.clone())
    }

    /// Take over an applied outcome: new text, carried layout, queued
    /// review patches.
    fn absorb(&mut self, outcome: ApplyOutcome) -> SyncReport {
        let source_changed = outcome.source != self.source;
        let layout = &mut self.model.layout;
        for (old, new) in &outcome.aliases {
            if let Some(rect) = layout.remove(old) {
                layout.insert(new.clone(), rect);
            }
        }
        for patch in &outcome.applied {
            let (id, rect) = match &patch.payload {
                PatchPayload::MoveResize { to, .. } => (&patch.target_id, *to),
                PatchPayload::AddNode {
                    node,
                    rect: Some(rect),
                } => (&node.id, *rect),
                _ => continue,
            };
            let id = outcome.aliases.get(id).unwrap_or(id);
            layout.insert(id.clone(), rect);
        }

        self.source = outcome.source;
        self.rebuild();
        self.queue(&outcome.needs_review);
        debug!(
            applied = outcome.applied.len(),
            review = outcome.needs_review.len(),
            source_changed,
            "absorbed patches"
        );
        SyncReport {
            applied: outcome.applied,
            needs_review: outcome.needs_review,
            diagnostics: outcome.diagnostics,
            conflict: self.state.conflict.clone(),
            source_changed,
        }
    }

    fn queue(&mut self, patches: &[SyncPatch]) {
        for patch in patches {
            if !self.pending_review.iter().any(|p| p.id == patch.id) {
                self.pending_review.push(patch.clone());
            }
        }
    }

    // ── Canvas ───────────────────────────────────────────────────────

    /// Handle a message from the embedded editor.
    ///
    /// `init` is answered with the projected diagram. Saves that echo the
    /// last pushed markup byte for byte are ignored.
    pub fn handle_canvas_message(
        &mut self,
        message: CanvasMessage,
    ) -> Result<CanvasReply, DiagramError> {
        match message {
            CanvasMessage::Init => Ok(CanvasReply::Load {
                xml: self.project()?,
            }),
            CanvasMessage::Save { xml } | CanvasMessage::Autosave { xml } => {
                if self.state.is_syncing || self.last_pushed.as_deref() == Some(xml.as_str()) {
                    debug!("canvas echo ignored");
                    return Ok(CanvasReply::Ignored);
                }
                Ok(CanvasReply::Synced(self.sync_from_diagram(&xml)?))
            }
            CanvasMessage::Other => Ok(CanvasReply::Ignored),
        }
    }

    // ── Review queue ─────────────────────────────────────────────────

    /// Apply the queued patches with the given ids.
    ///
    /// Patches that still cannot be applied return to the queue with a
    /// diagnostic.
    pub fn approve(&mut self, ids: &[&str]) -> SyncReport {
        let (chosen, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending_review)
            .into_iter()
            .partition(|p| ids.contains(&p.id.as_str()));
        self.pending_review = rest;

        let was_in_sync = self.in_sync();
        let patches = chosen.into_iter().map(|p| p.with_safety(Safety::Safe));
        let outcome = self.applicator().apply(&self.source, patches);
        let mut report = self.absorb(outcome);
        if was_in_sync {
            self.state.drawio_snapshot_hash = Some(self.state.source_hash.clone());
        }
        self.settle();
        report.conflict = self.state.conflict.clone();
        report
    }

    /// Drop the queued patches with the given ids.
    pub fn reject(&mut self, ids: &[&str]) -> Vec<SyncPatch> {
        let (rejected, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending_review)
            .into_iter()
            .partition(|p| ids.contains(&p.id.as_str()));
        self.pending_review = rest;
        self.settle();
        rejected
    }

    pub fn reject_all(&mut self) -> Vec<SyncPatch> {
        let rejected = std::mem::take(&mut self.pending_review);
        self.settle();
        rejected
    }

    /// An empty queue resolves a conflict.
    fn settle(&mut self) {
        if self.pending_review.is_empty() && self.state.conflict.take().is_some() {
            info!("sync conflict resolved");
            self.state.drawio_snapshot_hash = Some(self.state.source_hash.clone());
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
