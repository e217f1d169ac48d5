//! # syster-sync
//!
//! Round-trip synchronization between SysML v2 textual notation and draw.io
//! diagrams.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! assist      → text-generation boundary, local fallback generator
//!   ↓
//! sync        → diff, patch application, render-from-model, sessions
//!   ↓
//! interchange → draw.io writer/reader, views, validation
//!   ↓
//! layout      → layered / grid placement, incremental geometry
//!   ↓
//! semantic    → indexer, reference resolution, semantic model builder
//!   ↓
//! syntax      → syntax tree, element kinds, canonical printer
//!   ↓
//! parser      → Logos lexer, recursive-descent parser, recovery
//!   ↓
//! base        → Span/Position, LineIndex, stable hashing
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use syster_sync::sync::{SyncOptions, SyncSession};
//!
//! let mut session = SyncSession::with_source(
//!     SyncOptions::default(),
//!     "part def Engine; part def Car { part e : Engine; }",
//! );
//! let xml = session.project()?;
//! // ... the canvas edits the diagram and saves ...
//! let report = session.sync_from_diagram(&edited_xml)?;
//! println!("{}", session.source());
//! ```

// ============================================================================
// MODULES (dependency order: base → parser → syntax → semantic → layout →
// interchange → sync → assist)
// ============================================================================

/// Foundation types: Span/Position, LineIndex, stable hashing
pub mod base;

/// Parser: Logos lexer, recursive-descent parser, error recovery
pub mod parser;

/// Syntax: tree types, element kinds, canonical printer
pub mod syntax;

/// Semantic model: stable ids, reference resolution, typed edges
pub mod semantic;

/// Diagram geometry
pub mod layout;

/// draw.io markup in both directions
pub mod interchange;

/// Text ↔ diagram diff, patching and session state
pub mod sync;

/// External text-generation boundary
pub mod assist;

// Re-export commonly needed items
pub use parser::{Parse, ParseError, parse};

// Re-export foundation types
pub use base::{LineIndex, Position, Span, TextRange, TextSize};

// Re-export the pipeline entry points
pub use interchange::{from_drawio, to_drawio, validate_drawio};
pub use semantic::{ModelBuilder, SemanticModel, build_model};
pub use sync::{PatchApplicator, SyncPatch, SyncSession, diff};
