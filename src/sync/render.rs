//! Source text regenerated from a semantic model.
//!
//! Used when a diagram arrives and there is no text to patch. Containment
//! gives the nesting; typing edges become inline types; every other
//! relation edge becomes a statement unless a named relation usage already
//! declares it.

use super::statement::{
    declared_by_usage, edge_statement, reference_to, statement_owner, syntax_node,
};
use crate::semantic::{
    EdgeKind, ReferenceIndex, SemanticModel, SemanticNode, preferred_source, preferred_target,
};
use crate::syntax::{PrintOptions, SourceFile, SyntaxNode, print};
use rustc_hash::{FxHashMap, FxHashSet};

/// Render `model` as source text.
pub fn render_model(model: &SemanticModel, options: &PrintOptions) -> String {
    let renderer = Renderer::new(model);
    let mut visited = FxHashSet::default();
    let mut members: Vec<SyntaxNode> = model
        .nodes
        .values()
        .filter(|n| {
            n.parent_id
                .as_deref()
                .is_none_or(|p| !model.contains_node(p))
        })
        .map(|n| renderer.node(n, &mut visited))
        .collect();
    // Nodes whose parents form a cycle are reachable from no root.
    for node in model.nodes.values() {
        if !visited.contains(&node.id) {
            members.push(renderer.node(node, &mut visited));
        }
    }
    members.extend(renderer.statements_of(None));
    print(&SourceFile::new(members), options)
}

struct Renderer<'a> {
    model: &'a SemanticModel,
    references: ReferenceIndex,
    /// Usage id → type name from a typing edge
    types: FxHashMap<&'a str, &'a str>,
    /// Owner id (`None` = top level) → relation statements
    statements: FxHashMap<Option<String>, Vec<SyntaxNode>>,
}

impl<'a> Renderer<'a> {
    fn new(model: &'a SemanticModel) -> Self {
        let references = ReferenceIndex::from_model(model);
        let mut types = FxHashMap::default();
        let mut statements: FxHashMap<Option<String>, Vec<SyntaxNode>> = FxHashMap::default();

        for edge in model.relation_edges() {
            if edge.kind == EdgeKind::Typing {
                if let Some(target) = model.node(&edge.target_id) {
                    types.entry(edge.source_id.as_str()).or_insert(target.name.as_str());
                }
                continue;
            }
            if declared_by_usage(model, edge.kind, edge.label.as_deref()) {
                continue;
            }
            let owner = statement_owner(model, edge.kind, &edge.source_id, &edge.target_id);
            match edge_statement(
                model,
                &references,
                edge.kind,
                &edge.source_id,
                &edge.target_id,
                edge.label.as_deref(),
                owner.as_deref(),
            ) {
                Ok(statement) => statements.entry(owner).or_default().push(statement),
                Err(error) => tracing::debug!(edge = %edge.id, %error, "edge not rendered"),
            }
        }

        Self {
            model,
            references,
            types,
            statements,
        }
    }

    fn node(&self, node: &SemanticNode, visited: &mut FxHashSet<String>) -> SyntaxNode {
        visited.insert(node.id.clone());
        let mut children: Vec<SyntaxNode> = Vec::new();
        for child in self.model.children_of(&node.id) {
            if !visited.contains(&child.id) {
                children.push(self.node(child, visited));
            }
        }
        children.extend(self.statements_of(Some(&node.id)));
        syntax_node(&self.completed(node)).with_children(children)
    }

    fn statements_of(&self, owner: Option<&str>) -> Vec<SyntaxNode> {
        self.statements
            .get(&owner.map(str::to_string))
            .cloned()
            .unwrap_or_default()
    }

    /// `node` with its type and relation endpoints filled in from edges.
    fn completed(&self, node: &SemanticNode) -> SemanticNode {
        let mut node = node.clone();
        if node.type_name.is_none() && node.kind.is_usage() {
            node.type_name = self.types.get(node.id.as_str()).map(|t| t.to_string());
        }
        let Some(kind) = EdgeKind::for_relation(node.kind) else {
            return node;
        };
        if node.source_ref.is_some() && node.target_ref.is_some() {
            return node;
        }
        let edge = self
            .model
            .relation_edges()
            .find(|e| e.kind == kind && e.label.as_deref() == Some(node.name.as_str()));
        if let Some(edge) = edge {
            let owner = node.parent_id.as_deref();
            let source = reference_to(
                self.model,
                &self.references,
                &edge.source_id,
                owner,
                preferred_source(kind),
            );
            let target = reference_to(
                self.model,
                &self.references,
                &edge.target_id,
                owner,
                preferred_target(kind),
            );
            if let (Some(source), Some(target)) = (source, target) {
                node.source_ref = Some(source);
                node.target_ref = Some(target);
            }
        }
        node
    }
}
