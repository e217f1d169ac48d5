//! Semantic nodes and edges rendered back into syntax.
//!
//! References written into new statements are qualified relative to the
//! element that will hold the statement and are only used when they resolve
//! back to the intended node; otherwise the full qualified name is tried.

use super::error::PatchError;
use crate::semantic::{
    EdgeKind, ReferenceIndex, SemanticModel, SemanticNode, preferred_source, preferred_target,
};
use crate::syntax::{
    DefinitionDetail, ElementKind, NodeDetail, RelationDetail, SyntaxNode, TransitionDetail,
    UnknownDetail, UsageDetail,
};

/// Declaration of `node` without members.
pub(super) fn syntax_node(node: &SemanticNode) -> SyntaxNode {
    let refs = node.source_ref.as_deref().zip(node.target_ref.as_deref());
    let detail = match (node.kind, refs) {
        (ElementKind::Unknown, _) => NodeDetail::Unknown(UnknownDetail {
            raw: format!("{};", node.name),
        }),
        (ElementKind::TransitionUsage, Some((first, then))) => {
            NodeDetail::Transition(TransitionDetail {
                first: first.into(),
                then: then.into(),
                trigger: None,
            })
        }
        (kind, Some((source, target))) if kind.is_relation() => {
            NodeDetail::Relation(RelationDetail {
                source: source.into(),
                target: target.into(),
                via: node.type_name.as_deref().map(Into::into),
            })
        }
        (kind, _) if kind.is_definition() => NodeDetail::Definition(DefinitionDetail::default()),
        (kind, _) if kind.is_usage() => NodeDetail::Usage(UsageDetail {
            type_name: node.type_name.as_deref().map(Into::into),
            ..UsageDetail::default()
        }),
        _ => NodeDetail::None,
    };
    SyntaxNode::new(node.kind, node.name.as_str()).with_detail(detail)
}

/// Element that should hold the statement for an edge between `source` and
/// `target`; `None` means top level.
///
/// `satisfy`/`verify` are written inside their source. Everything else goes
/// into the innermost container enclosing both endpoints.
pub(super) fn statement_owner(
    model: &SemanticModel,
    kind: EdgeKind,
    source: &str,
    target: &str,
) -> Option<String> {
    match kind {
        EdgeKind::Satisfy | EdgeKind::Verify => Some(source.to_string()),
        _ => {
            let source_chain = containers(model, source);
            let target_chain = containers(model, target);
            source_chain
                .into_iter()
                .find(|id| target_chain.contains(id))
        }
    }
}

/// Strict containers of `id`, innermost first.
fn containers(model: &SemanticModel, id: &str) -> Vec<String> {
    let mut chain = Vec::new();
    let mut current = model.node(id).and_then(|n| n.parent_id.clone());
    while let Some(parent) = current {
        if chain.contains(&parent) {
            break;
        }
        current = model.node(&parent).and_then(|n| n.parent_id.clone());
        chain.push(parent);
    }
    chain
}

/// Names from the top-level ancestor down to `id`.
fn name_chain<'a>(model: &'a SemanticModel, id: &str) -> Vec<&'a SemanticNode> {
    let mut chain: Vec<&SemanticNode> = Vec::new();
    let mut current = model.node(id);
    while let Some(node) = current {
        if chain.iter().any(|n| n.id == node.id) {
            break;
        }
        chain.push(node);
        current = node.parent_id.as_deref().and_then(|p| model.node(p));
    }
    chain.reverse();
    chain
}

/// Reference text, written from inside `owner`, that resolves to `target`.
pub(super) fn reference_to(
    model: &SemanticModel,
    references: &ReferenceIndex,
    target: &str,
    owner: Option<&str>,
    preferred: &[ElementKind],
) -> Option<String> {
    let chain = name_chain(model, target);
    if chain.iter().any(|n| n.name.is_empty()) {
        return None;
    }
    let full: Vec<&str> = chain.iter().map(|n| n.name.as_str()).collect();
    // Qualify below the deepest element enclosing both the owner and the
    // target.
    let scope = owner.map(|o| name_chain(model, o)).unwrap_or_default();
    let shared = chain
        .iter()
        .rposition(|n| scope.iter().any(|s| s.id == n.id));
    let relative: Vec<&str> = match shared {
        Some(at) if at + 1 < chain.len() => full[at + 1..].to_vec(),
        _ => full.clone(),
    };

    let mut candidates = vec![relative.join("::")];
    if relative.len() != full.len() {
        candidates.push(full.join("::"));
    }
    candidates.into_iter().find(|text| {
        references
            .resolve(text, preferred, owner, None)
            .is_some_and(|c| c.id == target)
    })
}

/// Statement declaring an edge of `kind` from `source` to `target`, written
/// inside `owner`. A label becomes the name of the relation usage.
pub(super) fn edge_statement(
    model: &SemanticModel,
    references: &ReferenceIndex,
    kind: EdgeKind,
    source: &str,
    target: &str,
    label: Option<&str>,
    owner: Option<&str>,
) -> Result<SyntaxNode, PatchError> {
    let element = kind.statement_kind().ok_or(PatchError::Unsupported(kind))?;
    let target_text = reference_to(model, references, target, owner, preferred_target(kind))
        .ok_or_else(|| PatchError::UnresolvableEndpoint(target.to_string()))?;
    if matches!(kind, EdgeKind::Satisfy | EdgeKind::Verify) {
        return Ok(
            SyntaxNode::new(element, "").with_detail(NodeDetail::Relation(RelationDetail {
                source: "".into(),
                target: target_text.into(),
                via: None,
            })),
        );
    }

    let source_text = reference_to(model, references, source, owner, preferred_source(kind))
        .ok_or_else(|| PatchError::UnresolvableEndpoint(source.to_string()))?;
    let name = label.unwrap_or_default();
    let node = if kind == EdgeKind::Transition {
        SyntaxNode::new(element, name).with_detail(NodeDetail::Transition(
            TransitionDetail {
                first: source_text.into(),
                then: target_text.into(),
                trigger: None,
            },
        ))
    } else {
        SyntaxNode::new(element, name).with_detail(NodeDetail::Relation(RelationDetail {
            source: source_text.into(),
            target: target_text.into(),
            via: None,
        }))
    };
    Ok(node)
}

/// Whether `edge`'s relation is already declared by a named relation
/// usage of the model.
pub(super) fn declared_by_usage(model: &SemanticModel, kind: EdgeKind, label: Option<&str>) -> bool {
    let Some(label) = label else {
        return false;
    };
    model
        .nodes
        .values()
        .any(|n| EdgeKind::for_relation(n.kind) == Some(kind) && n.name == label)
}
