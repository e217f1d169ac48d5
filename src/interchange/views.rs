//! Diagram views: which nodes a projection shows.

use crate::semantic::{EdgeKind, SemanticModel};
use crate::syntax::ElementKind;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Subset of the model a diagram shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagramView {
    /// Every node and edge
    #[default]
    All,
    /// Packages, parts, ports, items, attributes and connections
    Structure,
    /// Requirements and verifications, plus the elements tracing to them
    Requirements,
    /// Actions, states, transitions and use cases
    Behavior,
}

impl DiagramView {
    pub const ALL: &'static [DiagramView] = &[
        Self::All,
        Self::Structure,
        Self::Requirements,
        Self::Behavior,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Structure => "structure",
            Self::Requirements => "requirements",
            Self::Behavior => "behavior",
        }
    }

    /// Whether nodes of `kind` belong to the view on their own.
    pub fn includes(&self, kind: ElementKind) -> bool {
        match self {
            Self::All => true,
            Self::Structure => {
                kind.is_package()
                    || !(kind.is_requirement()
                        || kind.is_verification()
                        || kind.is_behavior()
                        || kind == ElementKind::Unknown)
            }
            Self::Requirements => {
                kind.is_package() || kind.is_requirement() || kind.is_verification()
            }
            Self::Behavior => kind.is_package() || kind.is_behavior(),
        }
    }

    /// The part of `model` this view shows. Edges lose nothing but their
    /// dangling members.
    pub fn filter(&self, model: &SemanticModel) -> SemanticModel {
        if *self == Self::All {
            return model.clone();
        }

        let mut keep: FxHashSet<&str> = model
            .nodes
            .values()
            .filter(|n| self.includes(n.kind))
            .map(|n| n.id.as_str())
            .collect();
        if *self == Self::Requirements {
            // Satisfying and verifying elements stay visible.
            for edge in model.edges.values() {
                if matches!(edge.kind, EdgeKind::Satisfy | EdgeKind::Verify)
                    && keep.contains(edge.target_id.as_str())
                {
                    keep.insert(edge.source_id.as_str());
                }
            }
        }

        // Nodes whose container is hidden are shown at top level.
        let nodes = model
            .nodes
            .values()
            .filter(|n| keep.contains(n.id.as_str()))
            .cloned()
            .map(|mut n| {
                if n.parent_id.as_deref().is_some_and(|p| !keep.contains(p)) {
                    n.parent_id = None;
                }
                n
            });
        let edges = model.edges.values().cloned();
        let mut layout = model.layout.clone();
        layout.retain(|id, _| keep.contains(id));
        let mut filtered = SemanticModel::new(nodes, edges, layout);
        filtered.version = model.version.clone();
        tracing::trace!(
            view = self.as_str(),
            nodes = filtered.nodes.len(),
            edges = filtered.edges.len(),
            "filtered view"
        );
        filtered
    }
}

impl fmt::Display for DiagramView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for an unrecognized view name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown diagram view: {0}")]
pub struct UnknownView(pub String);

impl FromStr for DiagramView {
    type Err = UnknownView;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|view| view.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownView(s.to_string()))
    }
}
