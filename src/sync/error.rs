//! Error types for patch application.

use crate::semantic::EdgeKind;
use crate::syntax::ElementKind;
use thiserror::Error;

/// Why a patch could not be applied to source text.
///
/// The `Display` text is the diagnostic attached to a patch demoted to
/// review.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    #[error("node {0} not found in source")]
    NodeNotFound(String),

    #[error("node {0} has no source location")]
    NoLocation(String),

    #[error("'{0}' already exists")]
    AlreadyExists(String),

    #[error("cannot add members to '{0}'")]
    NoBody(String),

    #[error("'{0}' is not a valid name")]
    InvalidName(String),

    #[error("no declaration of '{from}' found for {kind}")]
    RenameNoMatch { kind: ElementKind, from: String },

    #[error("unlabeled {0} edge cannot be relabeled")]
    UnlabeledRelation(EdgeKind),

    #[error("no {kind} usage named '{name}'")]
    RelationNotFound { kind: EdgeKind, name: String },

    #[error("{0} edges are not written as statements")]
    Unsupported(EdgeKind),

    #[error("edge endpoint {0} not found in source")]
    EndpointNotFound(String),

    #[error("no reference to {0} resolves back to it")]
    UnresolvableEndpoint(String),

    #[error("no {0} statement found")]
    StatementNotFound(EdgeKind),

    #[error("{0} edge is declared inline, not as a statement")]
    NotAStatement(EdgeKind),

    #[error("inserted '{0}' did not produce the expected element")]
    NotInserted(String),

    #[error("change aborted: {0}")]
    ChangeAborted(Box<PatchError>),
}
