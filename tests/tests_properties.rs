//! Model-level properties checked over a set of fixtures.

#[path = "helpers/mod.rs"]
mod helpers;

use helpers::source_fixtures::{
    FEATURE_CHAINS, NESTED_PACKAGE, REQUIREMENTS, SCENARIO_A, TAB_INDENTED, VEHICLE,
};
use helpers::{assert_no_dangling_edges, model};
use rstest::rstest;
use rustc_hash::FxHashSet;
use syster_sync::interchange::{DiagramView, DiagramWriter, from_drawio, to_drawio};
use syster_sync::semantic::{SemanticModel, SemanticNode};
use syster_sync::sync::{
    PatchApplicator, PatchPayload, Safety, SyncOptions, SyncPatch, SyncSession, diff,
};
use syster_sync::syntax::ElementKind;

fn node_ids(m: &SemanticModel) -> Vec<String> {
    m.nodes.keys().cloned().collect()
}

fn relation_ids(m: &SemanticModel) -> FxHashSet<String> {
    m.relation_edges().map(|e| e.id.clone()).collect()
}

// ============================================================================
// Identity
// ============================================================================

#[rstest]
#[case(SCENARIO_A)]
#[case(NESTED_PACKAGE)]
#[case(VEHICLE)]
#[case(REQUIREMENTS)]
#[case(FEATURE_CHAINS)]
fn test_identical_text_gives_identical_ids(#[case] source: &str) {
    let first = model(source);
    let second = model(source);
    assert_eq!(node_ids(&first), node_ids(&second));
    let edges = |m: &SemanticModel| m.edges.keys().cloned().collect::<Vec<_>>();
    assert_eq!(edges(&first), edges(&second));
    assert!(diff(&first, &second).is_empty());
}

#[rstest]
#[case(SCENARIO_A)]
#[case(VEHICLE)]
fn test_unrelated_edit_keeps_ids(#[case] source: &str) {
    let original = model(source);
    let edited = model(&format!("{source}\npart def Extra;\n"));
    for id in node_ids(&original) {
        assert!(edited.contains_node(&id), "id {id} changed");
    }
}

// ============================================================================
// Round trip through the diagram
// ============================================================================

#[rstest]
#[case(SCENARIO_A)]
#[case(NESTED_PACKAGE)]
#[case(VEHICLE)]
#[case(REQUIREMENTS)]
#[case(FEATURE_CHAINS)]
fn test_round_trip_keeps_nodes_and_relations(#[case] source: &str) {
    let original = model(source);
    let back = from_drawio(&to_drawio(&original).expect("write")).expect("read");

    let sorted = |m: &SemanticModel| {
        let mut ids = node_ids(m);
        ids.sort();
        ids
    };
    assert_eq!(sorted(&back), sorted(&original));
    assert_eq!(relation_ids(&back), relation_ids(&original));
}

// ============================================================================
// No dangling edges
// ============================================================================

#[rstest]
#[case(SCENARIO_A)]
#[case(VEHICLE)]
#[case(REQUIREMENTS)]
#[case(FEATURE_CHAINS)]
#[case("part a; connect a to missing; part b { part c; }")]
fn test_no_dangling_edges_anywhere(#[case] source: &str) {
    let built = syster_sync::semantic::ModelBuilder::new().build_text(source);
    assert_no_dangling_edges(&built.model);

    for view in [
        DiagramView::All,
        DiagramView::Structure,
        DiagramView::Requirements,
        DiagramView::Behavior,
    ] {
        let shown = view.filter(&built.model);
        assert_no_dangling_edges(&shown);
        let xml = DiagramWriter::new()
            .with_view(view)
            .write(&built.model)
            .expect("write");
        assert_no_dangling_edges(&from_drawio(&xml).expect("read"));
    }
}

#[test]
fn test_deleting_node_drops_its_edges() {
    let original = model(VEHICLE);
    let mut xml = to_drawio(&original).expect("write");
    let engine = helpers::node_named(&original, "engine").id.clone();
    // Drop the vertex but keep its connectors.
    let start = xml.find(&format!("id=\"{engine}\"")).expect("vertex");
    let open = xml[..start].rfind('<').expect("open tag");
    let close = open + xml[open..].find("</mxCell>").expect("close tag") + "</mxCell>".len();
    xml.replace_range(open..close, "");

    let back = from_drawio(&xml).expect("read");
    assert!(!back.contains_node(&engine));
    assert_no_dangling_edges(&back);
}

// ============================================================================
// Conflict forces review
// ============================================================================

#[rstest]
#[case(SCENARIO_A)]
#[case(VEHICLE)]
#[case(NESTED_PACKAGE)]
fn test_conflict_marks_every_patch_for_review(#[case] source: &str) {
    let mut session = SyncSession::with_source(SyncOptions::default(), source);
    let xml = session.project().expect("project");

    let mut diagram = from_drawio(&xml).expect("read");
    diagram.add_node(SemanticNode::new("new-part", ElementKind::PartDef, "Added"));
    if let Some(id) = diagram.nodes.keys().next().cloned() {
        if let Some(node) = diagram.nodes.get_mut(&id) {
            node.name = format!("{}Renamed", node.name);
        }
    }
    let edited = to_drawio(&diagram).expect("write");

    session.update_source(format!("{source}\n// edited\n"));
    let before = session.source().to_string();
    let report = session.sync_from_diagram(&edited).expect("sync");

    assert!(report.conflict.is_some());
    assert!(report.applied.is_empty());
    assert!(!report.needs_review.is_empty());
    assert!(
        report
            .needs_review
            .iter()
            .all(|p| p.safety == Safety::ReviewRequired)
    );
    assert_eq!(session.source(), before);
    assert_eq!(session.pending_review().len(), report.needs_review.len());
}

// ============================================================================
// add_node idempotence
// ============================================================================

#[rstest]
#[case(SCENARIO_A, "Wheel")]
#[case(NESTED_PACKAGE, "Truck")]
#[case(TAB_INDENTED, "Qux")]
fn test_add_node_twice_never_duplicates(#[case] source: &str, #[case] name: &str) {
    let before = model(source);
    let mut after = before.clone();
    after.add_node(SemanticNode::new("drawn", ElementKind::PartDef, name));
    let patches = diff(&before, &after);
    assert_eq!(patches.len(), 1);

    let applicator = PatchApplicator::default();
    let once = applicator.apply(source, patches.clone());
    assert_eq!(once.applied.len(), 1, "{:?}", once.diagnostics);
    let twice = applicator.apply(&once.source, patches);

    assert_eq!(twice.source, once.source);
    assert!(twice.applied.is_empty());
    assert_eq!(twice.needs_review.len(), 1);
    let declared = model(&twice.source)
        .nodes
        .values()
        .filter(|n| n.name == name)
        .count();
    assert_eq!(declared, 1);
}

#[test]
fn test_review_patches_pass_through_untouched() {
    let before = model(SCENARIO_A);
    let mut after = before.clone();
    after.add_node(SemanticNode::new("drawn", ElementKind::PartDef, "Wheel"));
    let patches: Vec<SyncPatch> = diff(&before, &after)
        .into_iter()
        .map(|p| p.with_safety(Safety::ReviewRequired))
        .collect();

    let outcome = PatchApplicator::default().apply(SCENARIO_A, patches.clone());
    assert_eq!(outcome.source, SCENARIO_A);
    assert_eq!(outcome.needs_review, patches);
    assert!(matches!(
        outcome.needs_review[0].payload,
        PatchPayload::AddNode { .. }
    ));
}
