//! Syntax tree produced by the parser.
//!
//! Nodes are a tagged union: the common header (kind, names, visibility,
//! children, span) lives on [`SyntaxNode`], and kind-specific fields live on
//! the matching [`NodeDetail`] variant.

use super::kind::ElementKind;
use crate::base::Span;
use smol_str::SmolStr;

/// Parsed source file: the ordered top-level members.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFile {
    pub members: Vec<SyntaxNode>,
}

impl SourceFile {
    pub fn new(members: Vec<SyntaxNode>) -> Self {
        Self { members }
    }

    /// Pre-order iterator over every node in the file.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.members.iter().rev().collect(),
        }
    }
}

/// Visibility prefix of a member declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Private,
    Protected,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Protected => "protected",
        }
    }
}

/// Feature direction of a usage (`in`, `out`, `inout`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    In,
    Out,
    InOut,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
            Self::InOut => "inout",
        }
    }
}

/// A node in the syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    pub kind: ElementKind,
    /// Declared name; empty for anonymous usages and relation statements.
    pub name: SmolStr,
    pub short_name: Option<SmolStr>,
    pub visibility: Option<Visibility>,
    pub detail: NodeDetail,
    pub children: Vec<SyntaxNode>,
    /// Source text covered by the whole construct, body included.
    pub span: Option<Span>,
}

impl SyntaxNode {
    pub fn new(kind: ElementKind, name: impl Into<SmolStr>) -> Self {
        Self {
            kind,
            name: name.into(),
            short_name: None,
            visibility: None,
            detail: NodeDetail::None,
            children: Vec::new(),
            span: None,
        }
    }

    pub fn with_detail(mut self, detail: NodeDetail) -> Self {
        self.detail = detail;
        self
    }

    pub fn with_children(mut self, children: Vec<SyntaxNode>) -> Self {
        self.children = children;
        self
    }

    /// Whether the node has no declared name.
    pub fn is_anonymous(&self) -> bool {
        self.name.is_empty()
    }

    /// Declared type of a usage (`part e : Engine`).
    pub fn type_name(&self) -> Option<&str> {
        match &self.detail {
            NodeDetail::Usage(usage) => usage.type_name.as_deref(),
            NodeDetail::Relation(relation) => relation.via.as_deref(),
            _ => None,
        }
    }

    /// Source and target references of relation-shaped nodes.
    pub fn endpoints(&self) -> Option<(&str, &str)> {
        match &self.detail {
            NodeDetail::Relation(relation) => Some((&relation.source, &relation.target)),
            NodeDetail::Transition(transition) => Some((&transition.first, &transition.then)),
            _ => None,
        }
    }

    /// Pre-order iterator over this node and its descendants.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }
}

/// Kind-specific payload of a [`SyntaxNode`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NodeDetail {
    #[default]
    None,
    Definition(DefinitionDetail),
    Usage(UsageDetail),
    /// `connect A to B`, `flow from A to B`, `bind A = B`, `allocate A to B`,
    /// `dependency from A to B`, `satisfy X [by Y]`, `verify X`.
    Relation(RelationDetail),
    Transition(TransitionDetail),
    Import(ImportDetail),
    Alias(AliasDetail),
    Doc(DocDetail),
    Unknown(UnknownDetail),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefinitionDetail {
    pub is_abstract: bool,
    /// `:>` / `specializes` targets.
    pub specializes: Vec<SmolStr>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageDetail {
    pub type_name: Option<SmolStr>,
    /// `:>` / `subsets` targets.
    pub specializes: Vec<SmolStr>,
    /// `:>>` / `redefines` targets.
    pub redefines: Vec<SmolStr>,
    /// Raw text between the brackets, e.g. `0..*`.
    pub multiplicity: Option<String>,
    /// Raw expression text after `=` or `default =`.
    pub default_value: Option<String>,
    pub direction: Option<Direction>,
    pub is_abstract: bool,
    pub is_ref: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationDetail {
    /// Source reference; empty for `satisfy`/`verify` without `by`, whose
    /// source is the enclosing element.
    pub source: SmolStr,
    pub target: SmolStr,
    /// Connection/flow definition or flowing item type (`: Conn`, `of Fuel`).
    pub via: Option<SmolStr>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionDetail {
    pub first: SmolStr,
    pub then: SmolStr,
    /// Raw trigger text after `accept`.
    pub trigger: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportDetail {
    pub target: SmolStr,
    /// `::*`
    pub wildcard: bool,
    /// `::**`
    pub recursive: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasDetail {
    pub target: SmolStr,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocDetail {
    /// Comment body without the `/*` `*/` delimiters.
    pub text: String,
    /// `about` targets of a comment.
    pub about: Vec<SmolStr>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnknownDetail {
    /// Verbatim source of the unrecognized construct.
    pub raw: String,
}

/// Pre-order traversal over syntax nodes.
pub struct Descendants<'a> {
    stack: Vec<&'a SyntaxNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a SyntaxNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
