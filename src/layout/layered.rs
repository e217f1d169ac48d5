//! Fresh placement: lanes, BFS layering and the grid fallback.

use super::options::{LayoutOptions, default_size};
use crate::semantic::{LayoutMap, Rect, SemanticModel};
use crate::syntax::ElementKind;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

/// Vertical band a node is drawn in; lanes sit side by side left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lane {
    Main,
    Requirements,
    Verification,
}

impl Lane {
    const ALL: [Lane; 3] = [Lane::Main, Lane::Requirements, Lane::Verification];

    fn of(kind: ElementKind) -> Self {
        if kind.is_requirement() {
            Lane::Requirements
        } else if kind.is_verification() {
            Lane::Verification
        } else {
            Lane::Main
        }
    }
}

type Member<'a> = (&'a str, ElementKind);

/// Place every node of `model` from scratch.
pub(super) fn place(model: &SemanticModel, options: &LayoutOptions) -> LayoutMap {
    let mut positions: FxHashMap<&str, Rect> = FxHashMap::default();
    let mut placed: Vec<Rect> = Vec::with_capacity(model.nodes.len());
    let mut lane_x = options.origin_x;

    for lane in Lane::ALL {
        let members: Vec<Member<'_>> = model
            .nodes
            .values()
            .filter(|n| Lane::of(n.kind) == lane)
            .map(|n| (n.id.as_str(), n.kind))
            .collect();
        if members.is_empty() {
            continue;
        }

        let rects = place_lane(model, &members, lane_x, options);
        let mut right = lane_x;
        for (&(id, _), rect) in members.iter().zip(rects) {
            let rect = nudge(rect, &placed, options);
            right = right.max(rect.right());
            placed.push(rect);
            positions.insert(id, rect);
        }
        tracing::trace!(?lane, nodes = members.len(), x = lane_x, "placed lane");
        lane_x = right + options.lane_gap;
    }

    model
        .nodes
        .keys()
        .filter_map(|id| positions.get(id.as_str()).map(|rect| (id.clone(), *rect)))
        .collect()
}

fn place_lane(
    model: &SemanticModel,
    members: &[Member<'_>],
    lane_x: f64,
    options: &LayoutOptions,
) -> Vec<Rect> {
    let mut graph: DiGraph<usize, ()> = DiGraph::new();
    let mut index_of: FxHashMap<&str, NodeIndex> = FxHashMap::default();
    for (i, &(id, _)) in members.iter().enumerate() {
        index_of.insert(id, graph.add_node(i));
    }
    for edge in model.edges.values() {
        let source = index_of.get(edge.source_id.as_str());
        let target = index_of.get(edge.target_id.as_str());
        if let (Some(&source), Some(&target)) = (source, target) {
            if source != target {
                graph.update_edge(source, target, ());
            }
        }
    }

    if graph.edge_count() == 0 {
        tracing::debug!(nodes = members.len(), "lane has no internal edges, using grid");
        return grid(members, lane_x, options);
    }
    let layers = assign_layers(&graph);
    stack_layers(members, &layers, lane_x, options)
}

/// BFS ranks from the roots (no incoming edges). Nodes only reachable
/// through a cycle start a new BFS at rank 0.
fn assign_layers(graph: &DiGraph<usize, ()>) -> Vec<Vec<usize>> {
    let mut layer_of: Vec<Option<usize>> = vec![None; graph.node_count()];
    let mut queue = VecDeque::new();
    for node in graph.node_indices() {
        if graph
            .neighbors_directed(node, Direction::Incoming)
            .next()
            .is_none()
        {
            layer_of[node.index()] = Some(0);
            queue.push_back(node);
        }
    }

    loop {
        while let Some(node) = queue.pop_front() {
            let next = layer_of[node.index()].unwrap_or_default() + 1;
            for successor in graph.neighbors_directed(node, Direction::Outgoing) {
                if layer_of[successor.index()].is_none() {
                    layer_of[successor.index()] = Some(next);
                    queue.push_back(successor);
                }
            }
        }
        match graph.node_indices().find(|n| layer_of[n.index()].is_none()) {
            Some(node) => {
                layer_of[node.index()] = Some(0);
                queue.push_back(node);
            }
            None => break,
        }
    }

    let depth = layer_of.iter().flatten().max().map_or(0, |deepest| deepest + 1);
    let mut layers = vec![Vec::new(); depth];
    for node in graph.node_indices() {
        if let Some(layer) = layer_of[node.index()] {
            layers[layer].push(graph[node]);
        }
    }
    layers
}

/// Layers top to bottom, nodes of a layer left to right.
fn stack_layers(
    members: &[Member<'_>],
    layers: &[Vec<usize>],
    lane_x: f64,
    options: &LayoutOptions,
) -> Vec<Rect> {
    let mut rects = vec![Rect::default(); members.len()];
    let mut y = options.origin_y;
    for layer in layers {
        let mut x = lane_x;
        let mut height: f64 = 0.0;
        for &member in layer {
            let (width, node_height) = default_size(members[member].1);
            rects[member] = Rect::new(x, y, width, node_height);
            x += width + options.horizontal_gap;
            height = height.max(node_height);
        }
        y += height + options.vertical_gap;
    }
    rects
}

fn grid(members: &[Member<'_>], lane_x: f64, options: &LayoutOptions) -> Vec<Rect> {
    let columns = options.grid_columns.max(1);
    let cell_width = members
        .iter()
        .map(|(_, kind)| default_size(*kind).0)
        .fold(0.0, f64::max);

    let mut rects = Vec::with_capacity(members.len());
    let mut y = options.origin_y;
    for row in members.chunks(columns) {
        let mut row_height: f64 = 0.0;
        for (column, (_, kind)) in row.iter().enumerate() {
            let (width, height) = default_size(*kind);
            let x = lane_x + column as f64 * (cell_width + options.horizontal_gap);
            rects.push(Rect::new(x, y, width, height));
            row_height = row_height.max(height);
        }
        y += row_height + options.vertical_gap;
    }
    rects
}

/// Shift `rect` down until it clears `placed`, at most
/// `max_nudge_attempts` times; after that the overlap is accepted.
pub(super) fn nudge(mut rect: Rect, placed: &[Rect], options: &LayoutOptions) -> Rect {
    let margin = options.nudge_step / 2.0;
    let clear = |rect: &Rect| !placed.iter().any(|other| rect.overlaps(other, margin));
    for _ in 0..options.max_nudge_attempts {
        if clear(&rect) {
            return rect;
        }
        rect.y += options.nudge_step;
    }
    if !clear(&rect) {
        tracing::debug!(
            attempts = options.max_nudge_attempts,
            x = rect.x,
            y = rect.y,
            "accepting overlap"
        );
    }
    rect
}
