//! Applying patches to source text.
//!
//! Patches are applied one at a time. Every mutation starts from a fresh
//! parse and build of the current text, so spans and ids are never stale.
//! A patch that cannot be applied leaves the text untouched and is demoted
//! to review with the failure as its diagnostic.
//!
//! Nodes created from the diagram carry diagram cell ids. Once inserted they
//! have a text-derived id; the applicator records the mapping so later
//! patches in the same batch (children, edges) can refer to them. Renames
//! and moves change the ids of a whole subtree and are recorded the same
//! way.

use super::error::PatchError;
use super::patch::{PatchPayload, Reconnect, Safety, SyncPatch};
use super::rename::rename_in;
use super::statement::{edge_statement, statement_owner, syntax_node};
use super::text;
use crate::base::Span;
use crate::parser::{Parse, parse};
use crate::semantic::indexer::node_id;
use crate::semantic::{
    BuildResult, EdgeKind, ModelBuilder, ReferenceIndex, SemanticEdge, SemanticModel,
    SemanticNode, index,
};
use crate::syntax::printer::print_node;
use crate::syntax::{ElementKind, PrintOptions};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use tracing::{debug, warn};

/// Result of [`PatchApplicator::apply`]
#[derive(Debug, Clone, Default)]
pub struct ApplyOutcome {
    /// Source after every applied patch
    pub source: String,
    pub applied: Vec<SyncPatch>,
    /// Review-required patches plus demoted ones
    pub needs_review: Vec<SyncPatch>,
    /// One line per demoted patch
    pub diagnostics: Vec<String>,
    /// Diagram or superseded id → id in the resulting source
    pub aliases: IndexMap<String, String>,
}

/// Applies safe patches to source text
#[derive(Debug, Clone, Default)]
pub struct PatchApplicator {
    options: PrintOptions,
}

impl PatchApplicator {
    pub fn new(options: PrintOptions) -> Self {
        Self { options }
    }

    /// Apply `patches` in order to `source`.
    ///
    /// Review-required patches are passed through untouched.
    pub fn apply(
        &self,
        source: &str,
        patches: impl IntoIterator<Item = SyncPatch>,
    ) -> ApplyOutcome {
        let mut outcome = ApplyOutcome {
            source: source.to_string(),
            ..ApplyOutcome::default()
        };
        let mut removed = FxHashSet::default();
        for patch in patches {
            if !patch.is_safe() {
                outcome.needs_review.push(patch);
                continue;
            }
            match self.apply_patch(&outcome.source, &patch, &mut outcome.aliases, &mut removed) {
                Ok(next) => {
                    if let Some(next) = next {
                        outcome.source = next;
                    }
                    outcome.applied.push(patch);
                }
                Err(error) => {
                    warn!(patch = %patch.id, op = %patch.op(), %error, "patch demoted to review");
                    outcome
                        .diagnostics
                        .push(format!("{} {}: {error}", patch.op(), patch.target_id));
                    outcome
                        .needs_review
                        .push(patch.with_safety(Safety::ReviewRequired));
                }
            }
        }
        debug!(
            applied = outcome.applied.len(),
            review = outcome.needs_review.len(),
            "applied patches"
        );
        outcome
    }

    /// `Ok(None)` when the patch holds without changing the text.
    ///
    /// `removed` collects the ids deleted by earlier removals in the batch,
    /// descendants included.
    fn apply_patch(
        &self,
        source: &str,
        patch: &SyncPatch,
        aliases: &mut IndexMap<String, String>,
        removed: &mut FxHashSet<String>,
    ) -> Result<Option<String>, PatchError> {
        let target = resolve(aliases, &patch.target_id);
        match &patch.payload {
            PatchPayload::MoveResize { .. } => Ok(None),
            PatchPayload::AddNode { node, .. } => self.add_node(source, node, aliases).map(Some),
            PatchPayload::RemoveNode { .. } => remove_node(source, &target, removed),
            PatchPayload::RenameNode { from, to } => {
                rename_node(source, &target, from, to, aliases).map(Some)
            }
            PatchPayload::Relabel { edge, from, to } => {
                relabel(source, edge, from.as_deref(), to.as_deref(), aliases)
            }
            PatchPayload::Reconnect(reconnect) => {
                self.reconnect(source, reconnect, aliases).map(Some)
            }
        }
    }

    fn add_node(
        &self,
        source: &str,
        node: &SemanticNode,
        aliases: &mut IndexMap<String, String>,
    ) -> Result<String, PatchError> {
        let before = Snapshot::take(source);
        let model = before.model();
        let parent = node.parent_id.as_deref().map(|p| resolve(aliases, p));

        let duplicate = model.contains_node(&node.id)
            || aliases.contains_key(&node.id)
            || (!node.name.is_empty()
                && model.nodes.values().any(|n| {
                    n.kind == node.kind && n.name == node.name && n.parent_id == parent
                }));
        if duplicate {
            return Err(PatchError::AlreadyExists(node.name.clone()));
        }

        let declaration = print_node(&syntax_node(node), 0, &self.options);
        let next = self.insert(source, &before, parent.as_deref(), &declaration)?;

        let after = Snapshot::take(&next);
        let inserted = after
            .model()
            .nodes
            .values()
            .find(|n| {
                n.kind == node.kind
                    && n.name == node.name
                    && n.parent_id == parent
                    && !model.contains_node(&n.id)
            })
            .ok_or_else(|| PatchError::NotInserted(declaration.trim().to_string()))?;
        record(aliases, &node.id, &inserted.id);
        Ok(next)
    }

    fn reconnect(
        &self,
        source: &str,
        reconnect: &Reconnect,
        aliases: &mut IndexMap<String, String>,
    ) -> Result<String, PatchError> {
        match reconnect {
            Reconnect::Add { edge } => self.add_edge(source, edge, aliases),
            Reconnect::Remove { edge } => remove_edge(source, edge, aliases),
            Reconnect::Change { before, after } => {
                let removed = remove_edge(source, before, aliases)
                    .map_err(|e| PatchError::ChangeAborted(Box::new(e)))?;
                self.add_edge(&removed, after, aliases)
                    .map_err(|e| PatchError::ChangeAborted(Box::new(e)))
            }
            Reconnect::Reparent {
                node_id, to_parent, ..
            } => self.reparent(source, node_id, to_parent.as_deref(), aliases),
        }
    }

    fn add_edge(
        &self,
        source: &str,
        edge: &SemanticEdge,
        aliases: &IndexMap<String, String>,
    ) -> Result<String, PatchError> {
        let before = Snapshot::take(source);
        let model = before.model();
        let source_id = resolve(aliases, &edge.source_id);
        let target_id = resolve(aliases, &edge.target_id);
        for id in [&source_id, &target_id] {
            if !model.contains_node(id) {
                return Err(PatchError::EndpointNotFound(id.clone()));
            }
        }
        if edge.kind.statement_kind().is_none() {
            return Err(PatchError::Unsupported(edge.kind));
        }
        let connects = |e: &SemanticEdge| {
            e.kind == edge.kind && e.source_id == source_id && e.target_id == target_id
        };
        if model.edges.values().any(connects) {
            return Err(PatchError::AlreadyExists(format!(
                "{} edge {source_id} -> {target_id}",
                edge.kind
            )));
        }

        let owner = statement_owner(model, edge.kind, &source_id, &target_id);
        let references = ReferenceIndex::from_model(model);
        let statement = edge_statement(
            model,
            &references,
            edge.kind,
            &source_id,
            &target_id,
            edge.label.as_deref(),
            owner.as_deref(),
        )?;
        let line = print_node(&statement, 0, &self.options);
        let next = self.insert(source, &before, owner.as_deref(), &line)?;

        let after = Snapshot::take(&next);
        if !after.model().edges.values().any(connects) {
            return Err(PatchError::NotInserted(line.trim().to_string()));
        }
        Ok(next)
    }

    fn reparent(
        &self,
        source: &str,
        node_id: &str,
        to_parent: Option<&str>,
        aliases: &mut IndexMap<String, String>,
    ) -> Result<String, PatchError> {
        let id = resolve(aliases, node_id);
        let to_parent = to_parent.map(|p| resolve(aliases, p));
        let before = Snapshot::take(source);
        let (_, span) = before.locate(&id)?;
        let node = before
            .model()
            .node(&id)
            .ok_or_else(|| PatchError::NodeNotFound(id.clone()))?;
        let snippet = span
            .text(source)
            .map(|s| text::dedent(s, text::line_indent(source, span.start_offset())))
            .ok_or_else(|| PatchError::NoLocation(id.clone()))?;

        let removed = text::remove(source, span);
        let middle = Snapshot::take(&removed);
        let next = self.insert(&removed, &middle, to_parent.as_deref(), &snippet)?;

        let after = Snapshot::take(&next);
        let moved = after
            .model()
            .nodes
            .values()
            .find(|n| n.kind == node.kind && n.name == node.name && n.parent_id == to_parent)
            .ok_or_else(|| PatchError::NotInserted(node.name.clone()))?;
        follow(aliases, before.model(), after.model(), &id, &moved.id);
        Ok(next)
    }

    /// Insert `statement` as the last member of `owner`, or at the end of the
    /// file.
    fn insert(
        &self,
        source: &str,
        snapshot: &Snapshot,
        owner: Option<&str>,
        statement: &str,
    ) -> Result<String, PatchError> {
        let Some(owner) = owner else {
            return Ok(text::append(source, statement));
        };
        let (_, span) = snapshot.locate(owner)?;
        text::insert_member(source, span, statement, &self.options).ok_or_else(|| {
            let name = snapshot
                .model()
                .node(owner)
                .map_or(owner, |n| n.name.as_str());
            PatchError::NoBody(name.to_string())
        })
    }
}

fn remove_node(
    source: &str,
    id: &str,
    removed: &mut FxHashSet<String>,
) -> Result<Option<String>, PatchError> {
    let before = Snapshot::take(source);
    match before.locate(id) {
        Ok((_, span)) => {
            removed.extend(before.subtree(id));
            Ok(Some(text::remove(source, span)))
        }
        // Already gone with an ancestor removed earlier in the batch.
        Err(PatchError::NodeNotFound(_)) if removed.contains(id) => Ok(None),
        Err(error) => Err(error),
    }
}

fn rename_node(
    source: &str,
    id: &str,
    from: &str,
    to: &str,
    aliases: &mut IndexMap<String, String>,
) -> Result<String, PatchError> {
    if to.trim().is_empty() {
        return Err(PatchError::InvalidName(to.to_string()));
    }
    let before = Snapshot::take(source);
    let (kind, span) = before.locate(id)?;
    let snippet = span
        .text(source)
        .ok_or_else(|| PatchError::NoLocation(id.to_string()))?;
    let renamed = rename_in(snippet, kind, from, to).ok_or_else(|| PatchError::RenameNoMatch {
        kind,
        from: from.to_string(),
    })?;
    let next = text::replace(source, span, &renamed);

    let after = Snapshot::take(&next);
    let parent = before.model().node(id).and_then(|n| n.parent_id.clone());
    if let Some(renamed) = after
        .model()
        .nodes
        .values()
        .find(|n| n.kind == kind && n.name == to && n.parent_id == parent)
    {
        follow(aliases, before.model(), after.model(), id, &renamed.id);
    }
    Ok(next)
}

fn relabel(
    source: &str,
    edge: &SemanticEdge,
    from: Option<&str>,
    to: Option<&str>,
    aliases: &mut IndexMap<String, String>,
) -> Result<Option<String>, PatchError> {
    if edge.kind == EdgeKind::Connection {
        return Ok(None);
    }
    let from = from.ok_or(PatchError::UnlabeledRelation(edge.kind))?;
    let to = to.unwrap_or_default();
    let before = Snapshot::take(source);
    let usage = before
        .model()
        .nodes
        .values()
        .find(|n| EdgeKind::for_relation(n.kind) == Some(edge.kind) && n.name == from)
        .ok_or_else(|| PatchError::RelationNotFound {
            kind: edge.kind,
            name: from.to_string(),
        })?;
    rename_node(source, &usage.id, from, to, aliases).map(Some)
}

fn remove_edge(
    source: &str,
    edge: &SemanticEdge,
    aliases: &IndexMap<String, String>,
) -> Result<String, PatchError> {
    let before = Snapshot::take(source);
    let source_id = resolve(aliases, &edge.source_id);
    let target_id = resolve(aliases, &edge.target_id);
    let candidates: Vec<&SemanticEdge> = before
        .model()
        .edges
        .values()
        .filter(|e| e.kind == edge.kind && e.source_id == source_id && e.target_id == target_id)
        .collect();
    if candidates.is_empty() {
        return Err(PatchError::StatementNotFound(edge.kind));
    }
    let origins = &before.built.origins;
    let span = candidates
        .iter()
        .filter(|e| e.label == edge.label)
        .chain(candidates.iter())
        .find_map(|e| origins.get(&e.id).copied())
        .ok_or(PatchError::NotAStatement(edge.kind))?;
    Ok(text::remove(source, span))
}

// ============================================================================
// Snapshots and id tracking
// ============================================================================

/// Parse and model of one version of the text
struct Snapshot {
    parsed: Parse,
    built: BuildResult,
}

impl Snapshot {
    fn take(source: &str) -> Self {
        let parsed = parse(source);
        let built = ModelBuilder::new().build(&parsed.file);
        Self { parsed, built }
    }

    fn model(&self) -> &SemanticModel {
        &self.built.model
    }

    /// `id` and the ids of every node nested under it.
    fn subtree(&self, id: &str) -> FxHashSet<String> {
        let mut ids: FxHashSet<String> = FxHashSet::default();
        ids.insert(id.to_string());
        let nodes = &self.model().nodes;
        for node in nodes.values() {
            let mut chain = FxHashSet::default();
            let mut parent = node.parent_id.as_deref();
            while let Some(current) = parent {
                if current == id {
                    ids.insert(node.id.clone());
                    break;
                }
                if !chain.insert(current) {
                    break;
                }
                parent = nodes.get(current).and_then(|n| n.parent_id.as_deref());
            }
        }
        ids
    }

    /// Kind and full span of the node with `id`.
    fn locate(&self, id: &str) -> Result<(ElementKind, Span), PatchError> {
        let entry = index(&self.parsed.file)
            .into_iter()
            .find(|e| e.id == id)
            .ok_or_else(|| PatchError::NodeNotFound(id.to_string()))?;
        let span = entry
            .node
            .span
            .ok_or_else(|| PatchError::NoLocation(id.to_string()))?;
        Ok((entry.kind, span))
    }
}

fn resolve(aliases: &IndexMap<String, String>, id: &str) -> String {
    aliases.get(id).cloned().unwrap_or_else(|| id.to_string())
}

fn record(aliases: &mut IndexMap<String, String>, from: &str, to: &str) {
    if from == to {
        return;
    }
    for value in aliases.values_mut() {
        if value == from {
            *value = to.to_string();
        }
    }
    aliases.insert(from.to_string(), to.to_string());
}

/// Record new ids for `old_root` and everything below it after the subtree
/// moved to `new_root`.
fn follow(
    aliases: &mut IndexMap<String, String>,
    before: &SemanticModel,
    after: &SemanticModel,
    old_root: &str,
    new_root: &str,
) {
    let (Some(old), Some(new)) = (before.node(old_root), after.node(new_root)) else {
        return;
    };
    for node in before.nodes.values() {
        let Some(rest) = node.sysml_path.strip_prefix(old.sysml_path.as_str()) else {
            continue;
        };
        if !rest.is_empty() && !rest.starts_with('/') {
            continue;
        }
        let moved = node_id(&format!("{}{rest}", new.sysml_path));
        if after.contains_node(&moved) {
            record(aliases, &node.id, &moved);
        }
    }
}
