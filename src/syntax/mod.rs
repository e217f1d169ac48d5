//! Syntax tree types and canonical printing
//!
//! - [`ElementKind`] - kinds shared with the semantic model
//! - [`SyntaxNode`] / [`NodeDetail`] - the parsed tree
//! - [`print`] - canonical text rendering

mod ast;
mod kind;
pub mod printer;

pub use ast::{
    AliasDetail, DefinitionDetail, Descendants, Direction, DocDetail, ImportDetail, NodeDetail,
    RelationDetail, SourceFile, SyntaxNode, TransitionDetail, UnknownDetail, UsageDetail,
    Visibility,
};
pub use kind::{ElementKind, UnknownKindTag};
pub use printer::{PrintOptions, print};

// Re-export Position and Span from base for convenience
pub use crate::base::{Position, Span};

#[cfg(test)]
mod tests;
