//! Structural diff of two semantic models.
//!
//! Nodes are matched by id. Authored edges (`contains` is derived and never
//! diffed) are matched by id, then by `(kind, source, target, label)`, then
//! by `(kind, source, target)` alone, which is how a label edit shows up
//! once ids have been recomputed.
//!
//! An unmatched previous edge is an ambiguous removal when the previous
//! model holds more than one edge with its `(kind, source)`. The count is
//! taken over the whole previous model, so two sibling edges removed in the
//! same pass are both ambiguous.

use super::patch::{PatchPayload, Reconnect, Safety, SyncPatch};
use crate::semantic::{EdgeKind, SemanticEdge, SemanticModel, SemanticNode};
use crate::syntax::ElementKind;
use rustc_hash::{FxHashMap, FxHashSet};

type StructuralKey<'a> = (EdgeKind, &'a str, &'a str, Option<&'a str>);
type EndpointKey<'a> = (EdgeKind, &'a str, &'a str);

/// Patches turning `previous` into `next`.
///
/// Order: node additions, renames, moves, reparents, edge additions, edge
/// changes and relabels, edge removals, node removals.
pub fn diff(previous: &SemanticModel, next: &SemanticModel) -> Vec<SyncPatch> {
    let mut adds = Vec::new();
    let mut renames = Vec::new();
    let mut moves = Vec::new();
    let mut reparents = Vec::new();
    let mut removes = Vec::new();

    for node in next.nodes.values() {
        match previous.node(&node.id) {
            None => adds.push(add_node(node, next)),
            Some(before) => {
                if before.name != node.name {
                    renames.push(SyncPatch::new(
                        node_safety(node.kind),
                        node.id.clone(),
                        PatchPayload::RenameNode {
                            from: before.name.clone(),
                            to: node.name.clone(),
                        },
                    ));
                }
                let from = previous.layout.get(&node.id).copied();
                if let Some(to) = next.layout.get(&node.id).copied() {
                    if from != Some(to) {
                        moves.push(SyncPatch::new(
                            Safety::Safe,
                            node.id.clone(),
                            PatchPayload::MoveResize { from, to },
                        ));
                    }
                }
                if before.parent_id != node.parent_id {
                    reparents.push(SyncPatch::new(
                        Safety::ReviewRequired,
                        node.id.clone(),
                        PatchPayload::Reconnect(Reconnect::Reparent {
                            node_id: node.id.clone(),
                            from_parent: before.parent_id.clone(),
                            to_parent: node.parent_id.clone(),
                        }),
                    ));
                }
            }
        }
    }
    for node in previous.nodes.values() {
        if !next.contains_node(&node.id) {
            removes.push(SyncPatch::new(
                node_safety(node.kind),
                node.id.clone(),
                PatchPayload::RemoveNode { node: node.clone() },
            ));
        }
    }

    let edges = diff_edges(previous, next);

    let mut patches = parents_first(adds);
    patches.extend(renames);
    patches.extend(moves);
    patches.extend(reparents);
    patches.extend(edges);
    patches.extend(removes);
    tracing::debug!(patches = patches.len(), "diffed models");
    patches
}

fn node_safety(kind: ElementKind) -> Safety {
    if kind.is_auto_safe() {
        Safety::Safe
    } else {
        Safety::ReviewRequired
    }
}

/// `add_node` for `node`; a usage whose type is only known through a drawn
/// typing edge gets that type inline.
fn add_node(node: &SemanticNode, next: &SemanticModel) -> SyncPatch {
    let mut node = node.clone();
    if node.type_name.is_none() && node.kind.is_usage() {
        node.type_name = next
            .relation_edges()
            .find(|e| e.kind == EdgeKind::Typing && e.source_id == node.id)
            .and_then(|e| next.node(&e.target_id))
            .map(|target| target.name.clone());
    }
    let rect = next.layout.get(&node.id).copied();
    SyncPatch::new(
        node_safety(node.kind),
        node.id.clone(),
        PatchPayload::AddNode { node, rect },
    )
}

/// Reorder additions so a node added inside another new node follows it.
fn parents_first(adds: Vec<SyncPatch>) -> Vec<SyncPatch> {
    let parent_of = |patch: &SyncPatch| match &patch.payload {
        PatchPayload::AddNode { node, .. } => node.parent_id.clone(),
        _ => None,
    };
    let mut pending = adds;
    let mut ordered = Vec::with_capacity(pending.len());
    loop {
        let waiting: FxHashSet<String> = pending.iter().map(|p| p.target_id.clone()).collect();
        let (ready, blocked): (Vec<_>, Vec<_>) = pending
            .into_iter()
            .partition(|p| parent_of(p).is_none_or(|parent| !waiting.contains(&parent)));
        if ready.is_empty() {
            // Containment cycle; keep diagram order.
            ordered.extend(blocked);
            return ordered;
        }
        ordered.extend(ready);
        if blocked.is_empty() {
            return ordered;
        }
        pending = blocked;
    }
}

fn diff_edges(previous: &SemanticModel, next: &SemanticModel) -> Vec<SyncPatch> {
    let prev_edges: Vec<&SemanticEdge> = previous.relation_edges().collect();
    let next_edges: Vec<&SemanticEdge> = next.relation_edges().collect();

    let prev_by_key: FxHashMap<StructuralKey<'_>, &SemanticEdge> =
        prev_edges.iter().map(|e| (e.structural_key(), *e)).collect();
    let mut siblings: FxHashMap<(EdgeKind, &str), usize> = FxHashMap::default();
    for edge in &prev_edges {
        *siblings
            .entry((edge.kind, edge.source_id.as_str()))
            .or_default() += 1;
    }

    let mut matched_prev: FxHashSet<&str> = FxHashSet::default();
    let mut unmatched_next: Vec<&SemanticEdge> = Vec::new();
    let mut changes = Vec::new();

    for &edge in &next_edges {
        if let Some(before) = previous.edge(&edge.id).filter(|e| !e.kind.is_derived()) {
            matched_prev.insert(before.id.as_str());
            if before.source_id != edge.source_id
                || before.target_id != edge.target_id
                || before.kind != edge.kind
            {
                changes.push(SyncPatch::new(
                    Safety::ReviewRequired,
                    edge.id.clone(),
                    PatchPayload::Reconnect(Reconnect::Change {
                        before: before.clone(),
                        after: edge.clone(),
                    }),
                ));
            } else if before.label != edge.label {
                changes.push(relabel(before, edge));
            }
        } else if let Some(before) = prev_by_key.get(&edge.structural_key()) {
            matched_prev.insert(before.id.as_str());
        } else {
            unmatched_next.push(edge);
        }
    }

    // Same endpoints, different label.
    let mut prev_by_endpoints: FxHashMap<EndpointKey<'_>, Vec<&SemanticEdge>> =
        FxHashMap::default();
    for &edge in prev_edges
        .iter()
        .filter(|e| !matched_prev.contains(e.id.as_str()))
    {
        prev_by_endpoints
            .entry((edge.kind, edge.source_id.as_str(), edge.target_id.as_str()))
            .or_default()
            .push(edge);
    }
    let mut additions = Vec::new();
    for edge in unmatched_next {
        let key = (edge.kind, edge.source_id.as_str(), edge.target_id.as_str());
        let candidates = prev_by_endpoints.get_mut(&key);
        match candidates.and_then(|c| (!c.is_empty()).then(|| c.remove(0))) {
            Some(before) => {
                matched_prev.insert(before.id.as_str());
                changes.push(relabel(before, edge));
            }
            None => {
                if skip_addition(edge, previous, next) {
                    continue;
                }
                additions.push(SyncPatch::new(
                    Safety::Safe,
                    edge.id.clone(),
                    PatchPayload::Reconnect(Reconnect::Add {
                        edge: edge.clone(),
                    }),
                ));
            }
        }
    }

    let mut removals = Vec::new();
    for &edge in prev_edges
        .iter()
        .filter(|e| !matched_prev.contains(e.id.as_str()))
    {
        if !next.contains_node(&edge.source_id) || !next.contains_node(&edge.target_id) {
            // Goes away with its node.
            continue;
        }
        let shared = siblings
            .get(&(edge.kind, edge.source_id.as_str()))
            .copied()
            .unwrap_or_default();
        let safety = if shared > 1 {
            Safety::ReviewRequired
        } else {
            Safety::Safe
        };
        removals.push(SyncPatch::new(
            safety,
            edge.id.clone(),
            PatchPayload::Reconnect(Reconnect::Remove { edge: edge.clone() }),
        ));
    }

    let mut patches = additions;
    patches.extend(changes);
    patches.extend(removals);
    patches
}

fn relabel(before: &SemanticEdge, after: &SemanticEdge) -> SyncPatch {
    let safety = if after.kind == EdgeKind::Connection {
        Safety::Safe
    } else {
        Safety::ReviewRequired
    };
    SyncPatch::new(
        safety,
        after.id.clone(),
        PatchPayload::Relabel {
            edge: before.clone(),
            from: before.label.clone(),
            to: after.label.clone(),
        },
    )
}

/// Typing edges of newly added usages are written inline with the node.
fn skip_addition(edge: &SemanticEdge, previous: &SemanticModel, next: &SemanticModel) -> bool {
    edge.kind == EdgeKind::Typing
        && !previous.contains_node(&edge.source_id)
        && next
            .node(&edge.source_id)
            .is_some_and(|n| n.kind.is_usage())
}
