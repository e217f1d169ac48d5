//! Kind-agnostic semantic model shared by the text and diagram views.
//!
//! Nodes and edges are keyed by stable content-derived ids and kept in
//! insertion order. The model never holds an edge whose endpoints are not
//! both present: [`SemanticModel::new`], [`SemanticModel::add_edge`] and
//! [`SemanticModel::retain_valid_edges`] all enforce it.

use crate::base::stable_id;
use crate::syntax::ElementKind;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Version tag stamped on models built by this crate
pub const MODEL_VERSION: &str = "sysml-sync/1";

// ============================================================================
// NODES
// ============================================================================

/// A semantic node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticNode {
    pub id: String,
    pub kind: ElementKind,
    pub name: String,
    /// Debug/identity path, `root/Kind:name#occurrence/...`
    pub sysml_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_ref: Option<String>,
}

impl SemanticNode {
    pub fn new(id: impl Into<String>, kind: ElementKind, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            name: name.into(),
            sysml_path: String::new(),
            parent_id: None,
            type_name: None,
            source_ref: None,
            target_ref: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.sysml_path = path.into();
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn with_refs(mut self, source_ref: impl Into<String>, target_ref: impl Into<String>) -> Self {
        self.source_ref = Some(source_ref.into());
        self.target_ref = Some(target_ref.into());
        self
    }
}

// ============================================================================
// EDGES
// ============================================================================

/// Kind of a semantic edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Derived parent/child nesting; never an authored relation.
    Contains,
    Connection,
    Satisfy,
    Verify,
    Typing,
    Flow,
    Binding,
    Transition,
    Dependency,
    Allocation,
}

impl EdgeKind {
    pub const ALL: &'static [EdgeKind] = &[
        Self::Contains,
        Self::Connection,
        Self::Satisfy,
        Self::Verify,
        Self::Typing,
        Self::Flow,
        Self::Binding,
        Self::Transition,
        Self::Dependency,
        Self::Allocation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::Connection => "connection",
            Self::Satisfy => "satisfy",
            Self::Verify => "verify",
            Self::Typing => "typing",
            Self::Flow => "flow",
            Self::Binding => "binding",
            Self::Transition => "transition",
            Self::Dependency => "dependency",
            Self::Allocation => "allocation",
        }
    }

    /// Whether the edge is derived from containment rather than authored.
    pub fn is_derived(&self) -> bool {
        matches!(self, Self::Contains)
    }

    /// Edge kind produced by a relation-shaped element kind.
    pub fn for_relation(kind: ElementKind) -> Option<Self> {
        match kind {
            ElementKind::ConnectionUsage | ElementKind::InterfaceUsage => Some(Self::Connection),
            ElementKind::FlowUsage => Some(Self::Flow),
            ElementKind::BindingUsage => Some(Self::Binding),
            ElementKind::AllocationUsage => Some(Self::Allocation),
            ElementKind::Dependency => Some(Self::Dependency),
            ElementKind::Satisfy => Some(Self::Satisfy),
            ElementKind::Verify => Some(Self::Verify),
            ElementKind::TransitionUsage => Some(Self::Transition),
            _ => None,
        }
    }

    /// Element kind used when an edge of this kind is written as a statement.
    pub fn statement_kind(&self) -> Option<ElementKind> {
        match self {
            Self::Connection => Some(ElementKind::ConnectionUsage),
            Self::Flow => Some(ElementKind::FlowUsage),
            Self::Binding => Some(ElementKind::BindingUsage),
            Self::Allocation => Some(ElementKind::AllocationUsage),
            Self::Dependency => Some(ElementKind::Dependency),
            Self::Satisfy => Some(ElementKind::Satisfy),
            Self::Verify => Some(ElementKind::Verify),
            Self::Transition => Some(ElementKind::TransitionUsage),
            Self::Contains | Self::Typing => None,
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EdgeKind {
    type Err = crate::syntax::UnknownKindTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| crate::syntax::UnknownKindTag(s.to_string()))
    }
}

/// A typed edge between two semantic nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticEdge {
    pub id: String,
    pub kind: EdgeKind,
    pub source_id: String,
    pub target_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl SemanticEdge {
    /// Create an edge whose id is derived from its structural key.
    pub fn new(
        kind: EdgeKind,
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        label: Option<String>,
    ) -> Self {
        let source_id = source_id.into();
        let target_id = target_id.into();
        let id = edge_id(kind, &source_id, &target_id, label.as_deref());
        Self {
            id,
            kind,
            source_id,
            target_id,
            label,
        }
    }

    /// `(kind, source, target, label)`; used to match edges across id churn.
    pub fn structural_key(&self) -> (EdgeKind, &str, &str, Option<&str>) {
        (
            self.kind,
            &self.source_id,
            &self.target_id,
            self.label.as_deref(),
        )
    }
}

/// Stable edge id: hash of `(kind, source, target, label)`.
pub fn edge_id(kind: EdgeKind, source_id: &str, target_id: &str, label: Option<&str>) -> String {
    stable_id(
        "e",
        [kind.as_str(), source_id, target_id, label.unwrap_or_default()],
    )
}

// ============================================================================
// LAYOUT
// ============================================================================

/// Axis-aligned rectangle in diagram coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Whether the rectangles overlap once `gap` is added around `self`.
    pub fn overlaps(&self, other: &Rect, gap: f64) -> bool {
        self.x - gap < other.right()
            && other.x < self.right() + gap
            && self.y - gap < other.bottom()
            && other.y < self.bottom() + gap
    }
}

/// Sparse node id → rectangle map
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayoutMap(IndexMap<String, Rect>);

impl LayoutMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Rect> {
        self.0.get(id)
    }

    pub fn insert(&mut self, id: impl Into<String>, rect: Rect) -> Option<Rect> {
        self.0.insert(id.into(), rect)
    }

    pub fn remove(&mut self, id: &str) -> Option<Rect> {
        self.0.shift_remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Rect)> {
        self.0.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &Rect> {
        self.0.values()
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&str, &Rect) -> bool) {
        self.0.retain(|id, rect| keep(id, rect));
    }

    /// Serialize for host persistence (`{"<id>": {"x":..,"y":..,..}}`).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl FromIterator<(String, Rect)> for LayoutMap {
    fn from_iter<I: IntoIterator<Item = (String, Rect)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ============================================================================
// MODEL
// ============================================================================

/// Nodes + edges + layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticModel {
    pub nodes: IndexMap<String, SemanticNode>,
    pub edges: IndexMap<String, SemanticEdge>,
    #[serde(default)]
    pub layout: LayoutMap,
    pub version: String,
}

impl Default for SemanticModel {
    fn default() -> Self {
        Self {
            nodes: IndexMap::new(),
            edges: IndexMap::new(),
            layout: LayoutMap::new(),
            version: MODEL_VERSION.to_string(),
        }
    }
}

impl SemanticModel {
    /// Build a model; duplicate ids keep their first occurrence and dangling
    /// edges are dropped.
    pub fn new(
        nodes: impl IntoIterator<Item = SemanticNode>,
        edges: impl IntoIterator<Item = SemanticEdge>,
        layout: LayoutMap,
    ) -> Self {
        let mut model = Self {
            layout,
            ..Self::default()
        };
        for node in nodes {
            model.add_node(node);
        }
        for edge in edges {
            model.add_edge(edge);
        }
        model
    }

    pub fn node(&self, id: &str) -> Option<&SemanticNode> {
        self.nodes.get(id)
    }

    pub fn edge(&self, id: &str) -> Option<&SemanticEdge> {
        self.edges.get(id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Insert a node unless its id is taken. Returns whether it was added.
    pub fn add_node(&mut self, node: SemanticNode) -> bool {
        if self.nodes.contains_key(&node.id) {
            tracing::trace!(id = %node.id, "duplicate node id ignored");
            return false;
        }
        self.nodes.insert(node.id.clone(), node);
        true
    }

    /// Insert an edge if both endpoints exist and its id is new.
    pub fn add_edge(&mut self, edge: SemanticEdge) -> bool {
        if !self.contains_node(&edge.source_id) || !self.contains_node(&edge.target_id) {
            tracing::trace!(id = %edge.id, kind = %edge.kind, "dangling edge dropped");
            return false;
        }
        if self.edges.contains_key(&edge.id) {
            return false;
        }
        self.edges.insert(edge.id.clone(), edge);
        true
    }

    /// Remove a node with its layout entry and any edge touching it.
    pub fn remove_node(&mut self, id: &str) -> Option<SemanticNode> {
        let node = self.nodes.shift_remove(id)?;
        self.layout.remove(id);
        self.retain_valid_edges();
        Some(node)
    }

    /// Drop every edge whose endpoints are not both present.
    pub fn retain_valid_edges(&mut self) {
        let nodes = &self.nodes;
        self.edges
            .retain(|_, e| nodes.contains_key(&e.source_id) && nodes.contains_key(&e.target_id));
    }

    /// Authored (non-`contains`) edges
    pub fn relation_edges(&self) -> impl Iterator<Item = &SemanticEdge> {
        self.edges.values().filter(|e| !e.kind.is_derived())
    }

    /// Direct children by `parent_id`, in model order.
    pub fn children_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a SemanticNode> + 'a {
        self.nodes
            .values()
            .filter(move |n| n.parent_id.as_deref() == Some(id))
    }

    /// Nodes without a parent, in model order.
    pub fn roots(&self) -> impl Iterator<Item = &SemanticNode> {
        self.nodes.values().filter(|n| n.parent_id.is_none())
    }
}
