//! # Semantic Model
//!
//! Projects a parsed [`SourceFile`](crate::syntax::SourceFile) into the
//! kind-agnostic graph shared by the text and diagram views:
//!
//! - [`indexer`] - stable path-derived ids for every semantic node
//! - [`ReferenceIndex`] - case-insensitive name lookup with kind preferences
//! - [`ModelBuilder`] - nodes, `contains` edges, resolved relation edges
//! - [`SemanticModel`] - the graph itself, free of dangling edges

mod builder;
pub mod indexer;
mod model;
pub mod reference_index;

pub use builder::{
    BuildResult, LayoutSuggester, ModelBuilder, build_model, preferred_source, preferred_target,
};
pub use indexer::{Index, IndexEntry, RelationStatement, index, index_file};
pub use model::{
    EdgeKind, LayoutMap, MODEL_VERSION, Rect, SemanticEdge, SemanticModel, SemanticNode, edge_id,
};
pub use reference_index::{Candidate, ReferenceIndex};
