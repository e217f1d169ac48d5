//! Shared fixtures and helpers for integration tests.
#![allow(dead_code)]

pub mod source_fixtures;

use syster_sync::semantic::{EdgeKind, ModelBuilder, SemanticEdge, SemanticModel, SemanticNode};

/// Build a model from text that must be free of diagnostics.
pub fn model(text: &str) -> SemanticModel {
    let result = ModelBuilder::new().build_text(text);
    assert!(
        result.diagnostics.is_empty(),
        "unexpected diagnostics: {:?}",
        result.diagnostics
    );
    result.model
}

pub fn node_named<'a>(model: &'a SemanticModel, name: &str) -> &'a SemanticNode {
    model
        .nodes
        .values()
        .find(|n| n.name == name)
        .unwrap_or_else(|| panic!("no node named {name}"))
}

pub fn edges_of(model: &SemanticModel, kind: EdgeKind) -> Vec<&SemanticEdge> {
    model.edges.values().filter(|e| e.kind == kind).collect()
}

/// Every edge endpoint is a node of the model.
pub fn assert_no_dangling_edges(model: &SemanticModel) {
    for edge in model.edges.values() {
        assert!(
            model.contains_node(&edge.source_id) && model.contains_node(&edge.target_id),
            "dangling {} edge {}",
            edge.kind,
            edge.id
        );
    }
}
