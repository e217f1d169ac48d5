//! Session-level sync: canvas messages, reverse sync, conflicts and the
//! review queue.

#[path = "helpers/mod.rs"]
mod helpers;

use helpers::node_named;
use helpers::source_fixtures::SCENARIO_A;
use rustc_hash::FxHashSet;
use syster_sync::interchange::{from_drawio, to_drawio};
use syster_sync::parse;
use syster_sync::semantic::{SemanticModel, SemanticNode};
use syster_sync::sync::{CanvasMessage, CanvasReply, PatchOp, SyncOptions, SyncSession};
use syster_sync::syntax::ElementKind;

fn session() -> SyncSession {
    SyncSession::with_source(SyncOptions::default(), SCENARIO_A)
}

fn message(json: serde_json::Value) -> CanvasMessage {
    CanvasMessage::from_json(&json.to_string()).expect("valid message")
}

#[test]
fn test_canvas_init_echo_and_save() {
    let mut session = session();

    let reply = session
        .handle_canvas_message(message(serde_json::json!({ "event": "init" })))
        .expect("init");
    let CanvasReply::Load { xml } = reply else {
        panic!("expected load, got {reply:?}");
    };
    assert_eq!(session.last_pushed(), Some(xml.as_str()));

    let echo = message(serde_json::json!({ "event": "autosave", "xml": xml }));
    assert_eq!(
        session.handle_canvas_message(echo).expect("echo"),
        CanvasReply::Ignored
    );
    let unknown = message(serde_json::json!({ "event": "configure" }));
    assert_eq!(
        session.handle_canvas_message(unknown).expect("other"),
        CanvasReply::Ignored
    );

    let mut diagram = from_drawio(&xml).expect("read");
    let e = node_named(&diagram, "e").id.clone();
    let rect = diagram.layout.get(&e).copied().expect("placed");
    if let Some(node) = diagram.nodes.get_mut(&e) {
        node.name = "engine".to_string();
    }
    let save = message(serde_json::json!({
        "event": "save",
        "xml": to_drawio(&diagram).expect("write"),
    }));
    let reply = session.handle_canvas_message(save).expect("save");
    let CanvasReply::Synced(report) = reply else {
        panic!("expected synced, got {reply:?}");
    };

    assert!(report.source_changed);
    assert_eq!(report.applied.len(), 1);
    assert_eq!(report.applied[0].op(), PatchOp::RenameNode);
    assert_eq!(
        session.source(),
        "part def Engine; part def Car { part engine : Engine; }"
    );
    let engine = node_named(session.model(), "engine").id.clone();
    assert_ne!(engine, e);
    assert_eq!(session.layout().get(&engine), Some(&rect));
    assert!(session.state().conflict.is_none());
    assert!(session.state().diagnostics.is_empty());
}

#[test]
fn test_stale_diagram_waits_for_review() {
    let mut session = session();
    let xml = session.project().expect("project");
    let mut diagram = from_drawio(&xml).expect("read");
    diagram.add_node(SemanticNode::new("drawn", ElementKind::PartDef, "Wheel"));
    let edited = to_drawio(&diagram).expect("write");

    session.update_source(format!("{SCENARIO_A}\npart def Frame;\n"));
    let report = session.sync_from_diagram(&edited).expect("sync");
    assert!(report.conflict.is_some());
    assert!(!report.source_changed);
    assert!(!session.source().contains("Wheel"));

    let ops: FxHashSet<PatchOp> = session.pending_review().iter().map(|p| p.op()).collect();
    assert_eq!(
        ops,
        [PatchOp::AddNode, PatchOp::RemoveNode].into_iter().collect()
    );

    let add = session
        .pending_review()
        .iter()
        .find(|p| p.op() == PatchOp::AddNode)
        .map(|p| p.id.clone())
        .expect("add queued");
    let report = session.approve(&[add.as_str()]);
    assert_eq!(report.applied.len(), 1);
    assert!(session.source().contains("part def Wheel;"));
    assert!(session.state().conflict.is_some());

    let remaining: Vec<String> = session.pending_review().iter().map(|p| p.id.clone()).collect();
    let ids: Vec<&str> = remaining.iter().map(String::as_str).collect();
    let rejected = session.reject(&ids);
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].op(), PatchOp::RemoveNode);
    assert!(session.source().contains("part def Frame;"));
    assert!(session.state().conflict.is_none());
    assert_eq!(
        session.state().drawio_snapshot_hash.as_deref(),
        Some(session.state().source_hash.as_str())
    );
}

#[test]
fn test_reprojection_clears_conflict() {
    let mut session = session();
    let xml = session.project().expect("project");
    session.update_source(format!("{SCENARIO_A}\npart def Frame;\n"));
    session.sync_from_diagram(&xml).expect("sync");
    assert!(session.state().conflict.is_some());

    session.project().expect("project");
    assert!(session.state().conflict.is_none());
    assert!(session.state().last_synced_at.is_some());
}

#[test]
fn test_blank_session_adopts_diagram() {
    let drawn: SemanticModel = helpers::model(SCENARIO_A);
    let xml = to_drawio(&drawn).expect("write");

    let mut session = SyncSession::default();
    let report = session.sync_from_diagram(&xml).expect("sync");
    assert!(report.source_changed);
    assert!(parse(session.source()).errors.is_empty());

    let names = |m: &SemanticModel| {
        let mut names: Vec<(ElementKind, String)> =
            m.nodes.values().map(|n| (n.kind, n.name.clone())).collect();
        names.sort_by(|a, b| a.1.cmp(&b.1));
        names
    };
    assert_eq!(names(session.model()), names(&drawn));
    assert!(session.source().contains("part e : Engine;"));
}

#[test]
fn test_state_serializes_camel_case() {
    let mut session = session();
    session.project().expect("project");
    let json = serde_json::to_value(session.state()).expect("serialize");
    assert_eq!(json["isSyncing"], false);
    assert_eq!(json["sourceHash"], json["drawioSnapshotHash"]);
    assert!(json["lastSyncedAt"].is_u64());
    assert!(json["conflict"].is_null());
}
