//! Patch types exchanged between the diff engine, the applicator and the
//! review queue.
//!
//! Serialized shape:
//!
//! ```json
//! { "id": "p_…", "safety": "safe", "targetId": "e_…",
//!   "op": "reconnect",
//!   "payload": { "action": "add",
//!                "edge": { "id": "e_…", "kind": "connection",
//!                          "sourceId": "n_…", "targetId": "n_…" } } }
//! ```

use crate::base::stable_id;
use crate::semantic::{Rect, SemanticEdge, SemanticNode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a patch may be applied without confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Safety {
    Safe,
    ReviewRequired,
}

impl Safety {
    pub fn is_safe(&self) -> bool {
        matches!(self, Self::Safe)
    }
}

/// Operation tag of a patch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatchOp {
    AddNode,
    RemoveNode,
    RenameNode,
    Reconnect,
    Relabel,
    MoveResize,
}

impl PatchOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AddNode => "add_node",
            Self::RemoveNode => "remove_node",
            Self::RenameNode => "rename_node",
            Self::Reconnect => "reconnect",
            Self::Relabel => "relabel",
            Self::MoveResize => "move_resize",
        }
    }
}

impl fmt::Display for PatchOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Edge-level change carried by a `reconnect` patch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Reconnect {
    Add {
        edge: SemanticEdge,
    },
    Remove {
        edge: SemanticEdge,
    },
    /// Same edge id, different endpoints
    Change {
        before: SemanticEdge,
        after: SemanticEdge,
    },
    /// The node moved to another container
    #[serde(rename_all = "camelCase")]
    Reparent {
        node_id: String,
        from_parent: Option<String>,
        to_parent: Option<String>,
    },
}

impl Reconnect {
    pub fn action(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Remove { .. } => "remove",
            Self::Change { .. } => "change",
            Self::Reparent { .. } => "reparent",
        }
    }
}

/// Op-specific data of a patch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "payload", rename_all = "snake_case")]
pub enum PatchPayload {
    AddNode {
        node: SemanticNode,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rect: Option<Rect>,
    },
    RemoveNode {
        node: SemanticNode,
    },
    RenameNode {
        from: String,
        to: String,
    },
    Reconnect(Reconnect),
    Relabel {
        edge: SemanticEdge,
        from: Option<String>,
        to: Option<String>,
    },
    MoveResize {
        from: Option<Rect>,
        to: Rect,
    },
}

impl PatchPayload {
    pub fn op(&self) -> PatchOp {
        match self {
            Self::AddNode { .. } => PatchOp::AddNode,
            Self::RemoveNode { .. } => PatchOp::RemoveNode,
            Self::RenameNode { .. } => PatchOp::RenameNode,
            Self::Reconnect(_) => PatchOp::Reconnect,
            Self::Relabel { .. } => PatchOp::Relabel,
            Self::MoveResize { .. } => PatchOp::MoveResize,
        }
    }
}

/// One edit operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPatch {
    /// Hash of `(op, target_id, payload)`
    pub id: String,
    pub safety: Safety,
    pub target_id: String,
    #[serde(flatten)]
    pub payload: PatchPayload,
}

impl SyncPatch {
    pub fn new(safety: Safety, target_id: impl Into<String>, payload: PatchPayload) -> Self {
        let target_id = target_id.into();
        let id = patch_id(&target_id, &payload);
        Self {
            id,
            safety,
            target_id,
            payload,
        }
    }

    pub fn op(&self) -> PatchOp {
        self.payload.op()
    }

    pub fn is_safe(&self) -> bool {
        self.safety.is_safe()
    }

    /// The same patch with a different safety; the id is unchanged.
    pub fn with_safety(mut self, safety: Safety) -> Self {
        self.safety = safety;
        self
    }
}

/// Stable patch id over the canonical JSON encoding of the payload.
pub fn patch_id(target_id: &str, payload: &PatchPayload) -> String {
    let encoded = serde_json::to_string(payload).unwrap_or_default();
    stable_id("p", [payload.op().as_str(), target_id, encoded.as_str()])
}

/// Tag every patch review-required (sync conflict).
pub fn force_review(patches: &mut [SyncPatch]) {
    for patch in patches {
        patch.safety = Safety::ReviewRequired;
    }
}
