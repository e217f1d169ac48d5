//! Diagram geometry for semantic models.
//!
//! Two modes share one engine:
//! - **fresh**: graph-aware layered placement. Nodes are ranked along their
//!   edges, requirement and verification kinds are banded into their own
//!   lanes, and lanes without internal edges fall back to a grid.
//! - **incremental**: every node with a previous rectangle keeps it exactly;
//!   only new nodes are placed, nudged off existing geometry.
//!
//! Overlap nudging is bounded by [`LayoutOptions::max_nudge_attempts`], after
//! which the overlap is accepted.

mod layered;
mod options;

pub use options::{LayoutOptions, default_size};

use crate::semantic::{LayoutMap, LayoutSuggester, Rect, SemanticModel};

/// Layout engine with fixed options
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    options: LayoutOptions,
}

impl LayoutEngine {
    pub fn new(options: LayoutOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// Positions for every node of `model`.
    ///
    /// With a `previous` layout, known nodes keep their rectangles and stale
    /// ids are dropped; otherwise everything is placed fresh.
    pub fn layout(&self, model: &SemanticModel, previous: Option<&LayoutMap>) -> LayoutMap {
        let fresh = layered::place(model, &self.options);
        let Some(previous) = previous.filter(|p| !p.is_empty()) else {
            tracing::trace!(nodes = fresh.len(), "fresh layout");
            return fresh;
        };

        let mut placed: Vec<Rect> = model
            .nodes
            .keys()
            .filter_map(|id| previous.get(id).copied())
            .collect();
        let mut result = LayoutMap::new();
        let mut added = 0usize;
        for (id, node) in &model.nodes {
            if let Some(rect) = previous.get(id) {
                result.insert(id.clone(), *rect);
                continue;
            }
            let start = fresh
                .get(id)
                .copied()
                .unwrap_or_else(|| default_rect(node.kind, &self.options));
            let rect = layered::nudge(start, &placed, &self.options);
            placed.push(rect);
            result.insert(id.clone(), rect);
            added += 1;
        }
        tracing::trace!(kept = result.len() - added, added, "incremental layout");
        result
    }

    /// Fill in rectangles missing from `model.layout` without moving any
    /// existing one.
    pub fn complete(&self, model: &SemanticModel) -> LayoutMap {
        self.layout(model, Some(&model.layout))
    }
}

impl LayoutSuggester for LayoutEngine {
    fn suggest(&self, model: &SemanticModel, previous: Option<&LayoutMap>) -> LayoutMap {
        self.layout(model, previous)
    }
}

fn default_rect(kind: crate::syntax::ElementKind, options: &LayoutOptions) -> Rect {
    let (width, height) = default_size(kind);
    Rect::new(options.origin_x, options.origin_y, width, height)
}

#[cfg(test)]
mod tests;
