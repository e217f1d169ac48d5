//! Bidirectional text ↔ diagram synchronization.
//!
//! ```text
//!   previous model ─┐
//!                   ├─ diff ──▶ patches ──▶ PatchApplicator ──▶ new text
//!   diagram model ──┘             │               │
//!                                 └── review ◀────┘ (unsafe or failed)
//! ```
//!
//! - [`diff`] - structural comparison producing [`SyncPatch`]es
//! - [`PatchApplicator`] - surgical text edits, one patch at a time
//! - [`render_model`] - whole-text regeneration when there is no source
//! - [`SyncSession`] - per-document state, conflict detection, review queue

mod apply;
mod diff;
mod error;
mod patch;
mod render;
mod rename;
mod session;
mod statement;
mod text;

pub use apply::{ApplyOutcome, PatchApplicator};
pub use diff::diff;
pub use error::PatchError;
pub use patch::{PatchOp, PatchPayload, Reconnect, Safety, SyncPatch, force_review, patch_id};
pub use render::render_model;
pub use session::{
    CanvasMessage, CanvasReply, SyncOptions, SyncReport, SyncSession, SyncState,
};

#[cfg(test)]
mod tests;
