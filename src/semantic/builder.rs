//! Syntax tree → semantic model.
//!
//! Nodes and `contains` edges come straight from the index. Cross-references
//! (typing, satisfy/verify, connection endpoints, flows, bindings,
//! allocations, dependencies, transitions) are collected as pending
//! relations and resolved only once every node exists, because forward
//! references are legal. Unresolvable references become diagnostics and are
//! dropped. Layout runs last.

use super::indexer::{Index, IndexEntry, RelationStatement, index_file};
use super::model::{EdgeKind, LayoutMap, SemanticEdge, SemanticModel, SemanticNode};
use super::reference_index::{DEFINITIONS_FIRST, ReferenceIndex};
use crate::base::Span;
use crate::parser::parse;
use crate::syntax::{ElementKind, SourceFile, SyntaxNode};
use indexmap::IndexMap;

/// Placement capability consumed by the builder (implemented by the layout
/// engine).
pub trait LayoutSuggester {
    /// Positions for every node of `model`; entries of `previous` for nodes
    /// that still exist must be kept as they are.
    fn suggest(&self, model: &SemanticModel, previous: Option<&LayoutMap>) -> LayoutMap;
}

/// Output of a build
#[derive(Debug, Clone, Default)]
pub struct BuildResult {
    pub model: SemanticModel,
    /// Parse errors and unresolved references, human-readable
    pub diagnostics: Vec<String>,
    /// Edge id → span of the relation statement that declares it
    pub origins: IndexMap<String, Span>,
}

/// Configurable model builder
#[derive(Default)]
pub struct ModelBuilder {
    previous_layout: Option<LayoutMap>,
    layout: Option<Box<dyn LayoutSuggester>>,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Positions to keep for nodes that still exist.
    pub fn with_previous_layout(mut self, layout: LayoutMap) -> Self {
        self.previous_layout = Some(layout);
        self
    }

    pub fn with_layout(mut self, layout: impl LayoutSuggester + 'static) -> Self {
        self.layout = Some(Box::new(layout));
        self
    }

    /// Parse `text` and build its model; parse errors become diagnostics.
    pub fn build_text(&self, text: &str) -> BuildResult {
        let parsed = parse(text);
        let mut result = self.build(&parsed.file);
        let mut diagnostics: Vec<String> = parsed.errors.iter().map(|e| e.to_string()).collect();
        diagnostics.append(&mut result.diagnostics);
        result.diagnostics = diagnostics;
        result
    }

    pub fn build(&self, file: &SourceFile) -> BuildResult {
        let index = index_file(file);
        let mut ctx = BuildContext::default();
        ctx.collect_nodes(&index);
        ctx.collect_statements(&index.statements);

        let mut model = SemanticModel::new(ctx.nodes, ctx.contains, LayoutMap::new());
        let references = ReferenceIndex::from_model(&model);
        let mut diagnostics = ctx.diagnostics;
        let mut origins = IndexMap::new();

        for pending in ctx.pending {
            match pending.resolve(&references) {
                Ok(edge) => {
                    if let Some(span) = pending.origin {
                        origins.entry(edge.id.clone()).or_insert(span);
                    }
                    model.add_edge(edge);
                }
                Err(message) => {
                    tracing::debug!("{message}");
                    diagnostics.push(message);
                }
            }
        }

        let mut previous = self.previous_layout.clone();
        if let Some(previous) = previous.as_mut() {
            previous.retain(|id, _| model.contains_node(id));
        }
        model.layout = match &self.layout {
            Some(layout) => layout.suggest(&model, previous.as_ref()),
            None => previous.unwrap_or_default(),
        };

        tracing::debug!(
            nodes = model.nodes.len(),
            edges = model.edges.len(),
            unresolved = diagnostics.len(),
            "built semantic model"
        );
        BuildResult {
            model,
            diagnostics,
            origins,
        }
    }
}

/// Build a model without layout.
pub fn build_model(file: &SourceFile) -> SemanticModel {
    ModelBuilder::new().build(file).model
}

// ============================================================================
// Pending relations
// ============================================================================

#[derive(Debug, Clone)]
enum Endpoint {
    /// Already-known node id
    Id(String),
    /// Textual reference to resolve
    Ref(String),
}

#[derive(Debug, Clone)]
struct PendingRelation {
    kind: EdgeKind,
    source: Endpoint,
    target: String,
    label: Option<String>,
    /// Referencing element, for proximity ranking
    context: Option<String>,
    /// Node that must not resolve to itself
    exclude: Option<String>,
    /// Span of an anonymous relation statement
    origin: Option<Span>,
    location: Option<Span>,
}

impl PendingRelation {
    fn resolve(&self, references: &ReferenceIndex) -> Result<SemanticEdge, String> {
        let context = self.context.as_deref();
        let exclude = self.exclude.as_deref();
        let source_id = match &self.source {
            Endpoint::Id(id) => id.clone(),
            Endpoint::Ref(reference) => references
                .resolve(reference, preferred_source(self.kind), context, exclude)
                .map(|c| c.id.clone())
                .ok_or_else(|| self.unresolved("source", reference))?,
        };
        let target_id = references
            .resolve(&self.target, preferred_target(self.kind), context, exclude)
            .map(|c| c.id.clone())
            .ok_or_else(|| self.unresolved("target", &self.target))?;
        Ok(SemanticEdge::new(
            self.kind,
            source_id,
            target_id,
            self.label.clone(),
        ))
    }

    fn unresolved(&self, end: &str, reference: &str) -> String {
        match self.location {
            Some(span) => format!(
                "unresolved {} {end} '{reference}' at {span}",
                self.kind
            ),
            None => format!("unresolved {} {end} '{reference}'", self.kind),
        }
    }
}

const REQUIREMENTS: &[ElementKind] = &[
    ElementKind::RequirementUsage,
    ElementKind::RequirementDef,
    ElementKind::ConstraintUsage,
    ElementKind::ConstraintDef,
];

const VERIFIERS: &[ElementKind] = &[
    ElementKind::VerificationUsage,
    ElementKind::VerificationDef,
    ElementKind::PartUsage,
    ElementKind::PartDef,
];

const BEHAVIOR: &[ElementKind] = &[
    ElementKind::StateUsage,
    ElementKind::ActionUsage,
    ElementKind::StateDef,
    ElementKind::ActionDef,
];

const ENDPOINTS: &[ElementKind] = &[
    ElementKind::PortUsage,
    ElementKind::PartUsage,
    ElementKind::ItemUsage,
    ElementKind::AttributeUsage,
    ElementKind::ActionUsage,
    ElementKind::InterfaceUsage,
    ElementKind::ConnectionUsage,
    ElementKind::PartDef,
    ElementKind::PortDef,
    ElementKind::ItemDef,
];

/// Kinds a relation source should resolve to, best first.
pub fn preferred_source(kind: EdgeKind) -> &'static [ElementKind] {
    match kind {
        EdgeKind::Verify => VERIFIERS,
        EdgeKind::Transition => BEHAVIOR,
        _ => ENDPOINTS,
    }
}

/// Kinds a relation target should resolve to, best first.
pub fn preferred_target(kind: EdgeKind) -> &'static [ElementKind] {
    match kind {
        EdgeKind::Typing => DEFINITIONS_FIRST,
        EdgeKind::Satisfy | EdgeKind::Verify => REQUIREMENTS,
        EdgeKind::Transition => BEHAVIOR,
        _ => ENDPOINTS,
    }
}

// ============================================================================
// Collection
// ============================================================================

#[derive(Default)]
struct BuildContext {
    nodes: Vec<SemanticNode>,
    contains: Vec<SemanticEdge>,
    pending: Vec<PendingRelation>,
    diagnostics: Vec<String>,
}

impl BuildContext {
    fn collect_nodes(&mut self, index: &Index<'_>) {
        for entry in &index.entries {
            self.nodes.push(semantic_node(entry));
            if let Some(parent) = &entry.parent_id {
                self.contains.push(SemanticEdge::new(
                    EdgeKind::Contains,
                    parent.clone(),
                    entry.id.clone(),
                    None,
                ));
            }

            let node = entry.node;
            if let Some(type_name) = node.type_name() {
                if node.kind.is_usage() {
                    self.pending.push(PendingRelation {
                        kind: EdgeKind::Typing,
                        source: Endpoint::Id(entry.id.clone()),
                        target: type_name.to_string(),
                        label: None,
                        context: Some(entry.id.clone()),
                        exclude: Some(entry.id.clone()),
                        origin: None,
                        location: node.span,
                    });
                }
            }

            // Named relation usages are nodes and edges at once.
            if let Some(pending) = self.relation(
                node,
                entry.parent_id.as_deref(),
                Some(node.name.to_string()),
                Some(&entry.id),
            ) {
                self.pending.push(pending);
            }
        }
    }

    fn collect_statements(&mut self, statements: &[RelationStatement<'_>]) {
        for statement in statements {
            if let Some(mut pending) =
                self.relation(statement.node, statement.owner_id.as_deref(), None, None)
            {
                pending.origin = statement.node.span;
                self.pending.push(pending);
            }
        }
    }

    fn relation(
        &mut self,
        node: &SyntaxNode,
        owner: Option<&str>,
        label: Option<String>,
        self_id: Option<&str>,
    ) -> Option<PendingRelation> {
        let kind = EdgeKind::for_relation(node.kind)?;
        let (source, target) = node.endpoints()?;
        let source = if source.is_empty() {
            // `satisfy R;` traces from the enclosing element.
            match owner {
                Some(owner) => Endpoint::Id(owner.to_string()),
                None => {
                    let message = format!("{kind} of '{target}' has no enclosing element");
                    tracing::debug!("{message}");
                    self.diagnostics.push(message);
                    return None;
                }
            }
        } else {
            Endpoint::Ref(source.to_string())
        };
        Some(PendingRelation {
            kind,
            source,
            target: target.to_string(),
            label: label.filter(|l| !l.is_empty()),
            context: owner.or(self_id).map(str::to_string),
            exclude: self_id.map(str::to_string),
            origin: None,
            location: node.span,
        })
    }
}

fn semantic_node(entry: &IndexEntry<'_>) -> SemanticNode {
    let node = entry.node;
    let mut semantic = SemanticNode::new(entry.id.clone(), entry.kind, node.name.to_string())
        .with_path(entry.path.clone());
    semantic.parent_id = entry.parent_id.clone();
    semantic.type_name = node.type_name().map(str::to_string);
    if let Some((source, target)) = node.endpoints() {
        if !source.is_empty() {
            semantic.source_ref = Some(source.to_string());
        }
        semantic.target_ref = Some(target.to_string());
    }
    semantic
}
