use super::*;
use crate::base::Span;
use crate::interchange::{DiagramView, from_drawio, to_drawio};
use crate::parser::parse;
use crate::semantic::{EdgeKind, ModelBuilder, Rect, SemanticEdge, SemanticModel, SemanticNode};
use crate::syntax::{ElementKind, PrintOptions};

fn model(text: &str) -> SemanticModel {
    let result = ModelBuilder::new().build_text(text);
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    result.model
}

fn named<'a>(model: &'a SemanticModel, name: &str) -> &'a SemanticNode {
    model
        .nodes
        .values()
        .find(|n| n.name == name)
        .unwrap_or_else(|| panic!("no node named {name}"))
}

fn edge_of(model: &SemanticModel, kind: EdgeKind) -> SemanticEdge {
    model
        .edges
        .values()
        .find(|e| e.kind == kind)
        .cloned()
        .unwrap_or_else(|| panic!("no {kind} edge"))
}

fn span_of(text: &str, name: &str) -> Span {
    let parsed = parse(text);
    parsed
        .file
        .descendants()
        .find(|n| n.name == name)
        .and_then(|n| n.span)
        .unwrap_or_else(|| panic!("no span for {name}"))
}

fn apply(source: &str, patches: Vec<SyncPatch>) -> ApplyOutcome {
    PatchApplicator::default().apply(source, patches)
}

fn safe(target: &str, payload: PatchPayload) -> SyncPatch {
    SyncPatch::new(Safety::Safe, target, payload)
}

// ============================================================================
// Text surgery
// ============================================================================

#[test]
fn test_remove_takes_indent_and_line_break() {
    let text = "package P {\n\tpart def Foo;\n\tpart def Bar;\n}\n";
    assert_eq!(
        text::remove(text, span_of(text, "Foo")),
        "package P {\n\tpart def Bar;\n}\n"
    );
}

#[test]
fn test_remove_inline_member_keeps_line() {
    let text = "part def A { part a; part b; }";
    assert_eq!(text::remove(text, span_of(text, "a")), "part def A { part b; }");
}

#[test]
fn test_insert_member_variants() {
    let options = PrintOptions::default();

    let text = "part def A;";
    assert_eq!(
        text::insert_member(text, span_of(text, "A"), "part b;", &options).as_deref(),
        Some("part def A {\n    part b;\n}")
    );

    let text = "package P {\n    part a;\n}\n";
    assert_eq!(
        text::insert_member(text, span_of(text, "P"), "part b;", &options).as_deref(),
        Some("package P {\n    part a;\n    part b;\n}\n")
    );

    let text = "part def B { }";
    assert_eq!(
        text::insert_member(text, span_of(text, "B"), "part c;", &options).as_deref(),
        Some("part def B {\n    part c;\n}")
    );
}

#[test]
fn test_insert_member_needs_own_terminator() {
    let options = PrintOptions::default();

    let text = "package P {\n    part a;";
    assert_eq!(parse(text).errors.len(), 1);
    assert_eq!(
        text::insert_member(text, span_of(text, "P"), "part b;", &options),
        None
    );

    let text = "part def A { /* } */ part 'x;y'; }";
    assert_eq!(
        text::insert_member(text, span_of(text, "A"), "part c;", &options).as_deref(),
        Some("part def A { /* } */ part 'x;y';\n    part c;\n}")
    );
}

#[test]
fn test_add_into_unclosed_body_is_demoted() {
    let source = "package P {\n    part a;";
    let p = ModelBuilder::new().build_text(source).model;
    let p = named(&p, "P").id.clone();
    let node = SemanticNode::new("cell-2", ElementKind::PartUsage, "b").with_parent(p);
    let outcome = apply(source, vec![safe("cell-2", PatchPayload::AddNode { node, rect: None })]);
    assert_eq!(outcome.source, source);
    assert_eq!(outcome.needs_review.len(), 1);
}

#[test]
fn test_append_and_dedent() {
    assert_eq!(text::append("part a;\n\n", "part b;"), "part a;\npart b;\n");
    assert_eq!(text::append("", "part b;"), "part b;\n");
    assert_eq!(
        text::dedent("part def A {\n        part x;\n    }", "    "),
        "part def A {\n    part x;\n}"
    );
}

// ============================================================================
// Rename
// ============================================================================

#[test]
fn test_rename_only_touches_header() {
    assert_eq!(
        rename::rename_in(
            "part def Engine { part engine : Engine; }",
            ElementKind::PartDef,
            "Engine",
            "Motor"
        )
        .as_deref(),
        Some("part def Motor { part engine : Engine; }")
    );
}

#[test]
fn test_rename_quoted_and_redefined_names() {
    assert_eq!(
        rename::rename_in(
            "requirement def 'Top Speed';",
            ElementKind::RequirementDef,
            "Top Speed",
            "Max Speed"
        )
        .as_deref(),
        Some("requirement def 'Max Speed';")
    );
    assert_eq!(
        rename::rename_in(
            "attribute :>> mass = 10;",
            ElementKind::AttributeUsage,
            "mass",
            "weight"
        )
        .as_deref(),
        Some("attribute :>> weight = 10;")
    );
}

#[test]
fn test_rename_without_match() {
    assert_eq!(
        rename::rename_in("part def A;", ElementKind::PartDef, "B", "C"),
        None
    );
    assert_eq!(
        rename::rename_in("widget A;", ElementKind::Unknown, "A", "C"),
        None
    );
    assert_eq!(rename::rename_in("part : T;", ElementKind::PartUsage, "", "x"), None);
}

// ============================================================================
// Diff
// ============================================================================

#[test]
fn test_identical_models_diff_empty() {
    let m = model("package P { part def A; part a : A; part b; connect a to b; }");
    assert!(diff(&m, &m.clone()).is_empty());
}

#[test]
fn test_diff_node_changes() {
    let previous = model("package P { part def A; part def B; }");
    let mut next = previous.clone();
    let a = named(&previous, "A").id.clone();
    let b = named(&previous, "B").id.clone();
    if let Some(node) = next.nodes.get_mut(&a) {
        node.name = "Alpha".into();
    }
    if let Some(node) = next.nodes.get_mut(&b) {
        node.parent_id = Some(a.clone());
    }
    next.layout.insert(a.clone(), Rect::new(1.0, 2.0, 3.0, 4.0));

    let patches = diff(&previous, &next);
    let ops: Vec<_> = patches.iter().map(|p| (p.op(), p.safety)).collect();
    assert_eq!(
        ops,
        vec![
            (PatchOp::RenameNode, Safety::Safe),
            (PatchOp::MoveResize, Safety::Safe),
            (PatchOp::Reconnect, Safety::ReviewRequired),
        ]
    );
}

#[test]
fn test_diff_new_usage_takes_type_from_typing_edge() {
    let previous = model("part def Engine;");
    let engine = named(&previous, "Engine").id.clone();
    let mut next = previous.clone();
    next.add_node(SemanticNode::new("cell-2", ElementKind::PartUsage, "e"));
    next.add_edge(SemanticEdge::new(EdgeKind::Typing, "cell-2", engine, None));

    let patches = diff(&previous, &next);
    assert_eq!(patches.len(), 1);
    let PatchPayload::AddNode { node, .. } = &patches[0].payload else {
        panic!("expected add_node");
    };
    assert_eq!(node.type_name.as_deref(), Some("Engine"));
}

#[test]
fn test_diff_adds_parents_before_children() {
    let previous = model("part def A;");
    let mut next = previous.clone();
    next.add_node(SemanticNode::new("child", ElementKind::PartUsage, "c").with_parent("box"));
    next.add_node(SemanticNode::new("box", ElementKind::Package, "Box"));
    let order: Vec<_> = diff(&previous, &next)
        .into_iter()
        .map(|p| p.target_id)
        .collect();
    assert_eq!(order, vec!["box".to_string(), "child".to_string()]);
}

#[test]
fn test_ambiguous_edge_removal_needs_review() {
    let previous = model("part a; part b; part c; connect a to b; connect a to c;");
    let mut next = previous.clone();
    let c = named(&previous, "c").id.clone();
    next.edges.retain(|_, e| !(e.kind == EdgeKind::Connection && e.target_id == c));

    let patches = diff(&previous, &next);
    assert_eq!(patches.len(), 1);
    assert_eq!(patches[0].safety, Safety::ReviewRequired);
    assert!(matches!(
        patches[0].payload,
        PatchPayload::Reconnect(Reconnect::Remove { .. })
    ));
}

#[test]
fn test_relabel_safety_by_kind() {
    let previous = model("state def M { state s; state t; transition go first s then t; }");
    let mut next = previous.clone();
    let edge = edge_of(&previous, EdgeKind::Transition);
    next.edges.shift_remove(&edge.id);
    next.add_edge(SemanticEdge::new(
        EdgeKind::Transition,
        edge.source_id.clone(),
        edge.target_id.clone(),
        Some("start".into()),
    ));

    let patches = diff(&previous, &next);
    assert_eq!(patches.len(), 1);
    assert_eq!(patches[0].op(), PatchOp::Relabel);
    assert_eq!(patches[0].safety, Safety::ReviewRequired);
}

#[test]
fn test_patch_ids_and_serde_shape() {
    let payload = PatchPayload::RenameNode {
        from: "A".into(),
        to: "B".into(),
    };
    let first = safe("n_1", payload.clone());
    let second = safe("n_1", payload);
    assert_eq!(first.id, second.id);
    assert_eq!(first.clone().with_safety(Safety::ReviewRequired).id, first.id);

    let json = serde_json::to_value(&first).expect("serialize");
    assert_eq!(json["op"], "rename_node");
    assert_eq!(json["targetId"], "n_1");
    assert_eq!(json["payload"]["to"], "B");
    let back: SyncPatch = serde_json::from_value(json).expect("deserialize");
    assert_eq!(back, first);

    let mut patches = vec![first];
    force_review(&mut patches);
    assert!(!patches[0].is_safe());
}

// ============================================================================
// Applicator
// ============================================================================

#[test]
fn test_add_node_inside_parent_and_alias() {
    let source = "package P {\n    part def A;\n}\n";
    let p = named(&model(source), "P").id.clone();
    let node = SemanticNode::new("cell-7", ElementKind::PartDef, "B").with_parent(p);
    let outcome = apply(
        source,
        vec![safe("cell-7", PatchPayload::AddNode { node, rect: None })],
    );
    assert_eq!(outcome.source, "package P {\n    part def A;\n    part def B;\n}\n");
    assert_eq!(outcome.applied.len(), 1);
    let b = named(&model(&outcome.source), "B").id.clone();
    assert_eq!(outcome.aliases.get("cell-7"), Some(&b));
}

#[test]
fn test_add_node_twice_is_rejected() {
    let source = "part def A;\n";
    let node = SemanticNode::new("cell-1", ElementKind::PartUsage, "x").with_type("A");
    let patch = safe("cell-1", PatchPayload::AddNode { node, rect: None });

    let first = apply(source, vec![patch.clone()]);
    assert_eq!(first.source, "part def A;\npart x : A;\n");
    let second = apply(&first.source, vec![patch]);
    assert_eq!(second.source, first.source);
    assert_eq!(second.needs_review.len(), 1);
    assert!(second.diagnostics[0].contains("already exists"));
}

#[test]
fn test_add_child_of_new_node_uses_alias() {
    let source = "package P {\n}\n";
    let p = named(&model(source), "P").id.clone();
    let group = SemanticNode::new("g", ElementKind::PartDef, "Group").with_parent(p);
    let member = SemanticNode::new("m", ElementKind::PartUsage, "member").with_parent("g");
    let outcome = apply(
        source,
        vec![
            safe("g", PatchPayload::AddNode { node: group, rect: None }),
            safe("m", PatchPayload::AddNode { node: member, rect: None }),
        ],
    );
    assert!(outcome.needs_review.is_empty(), "{:?}", outcome.diagnostics);
    let result = model(&outcome.source);
    assert_eq!(
        named(&result, "member").parent_id.as_deref(),
        Some(named(&result, "Group").id.as_str())
    );
}

#[test]
fn test_remove_node_leaves_no_blank_line() {
    let source = "package P {\n\tpart def Foo;\n\tpart def Bar;\n}\n";
    let foo = named(&model(source), "Foo").clone();
    let outcome = apply(
        source,
        vec![safe(&foo.id.clone(), PatchPayload::RemoveNode { node: foo })],
    );
    assert_eq!(outcome.source, "package P {\n\tpart def Bar;\n}\n");
}

#[test]
fn test_remove_missing_node_is_demoted() {
    let source = "part def A;\n";
    let ghost = SemanticNode::new("n_doesnotexist", ElementKind::PartDef, "Ghost");
    let outcome = apply(
        source,
        vec![safe("n_doesnotexist", PatchPayload::RemoveNode { node: ghost })],
    );
    assert!(outcome.applied.is_empty());
    assert_eq!(outcome.needs_review.len(), 1);
    assert_eq!(outcome.needs_review[0].safety, Safety::ReviewRequired);
    assert!(outcome.diagnostics[0].contains("n_doesnotexist"));
    assert_eq!(outcome.source, source);
}

#[test]
fn test_remove_parent_then_child() {
    let source = "part def A;\npart def Car {\n    part e;\n}\n";
    let before = model(source);
    let car = named(&before, "Car").clone();
    let e = named(&before, "e").clone();
    let outcome = apply(
        source,
        vec![
            safe(&car.id.clone(), PatchPayload::RemoveNode { node: car }),
            safe(&e.id.clone(), PatchPayload::RemoveNode { node: e }),
        ],
    );
    assert_eq!(outcome.applied.len(), 2, "{:?}", outcome.diagnostics);
    assert!(outcome.needs_review.is_empty());
    assert_eq!(outcome.source, "part def A;\n");
}

#[test]
fn test_rename_node_patch() {
    let source = "part def Engine;\npart def Car { part e : Engine; }\n";
    let engine = named(&model(source), "Engine").id.clone();
    let outcome = apply(
        source,
        vec![safe(
            &engine,
            PatchPayload::RenameNode {
                from: "Engine".into(),
                to: "Motor".into(),
            },
        )],
    );
    assert_eq!(
        outcome.source,
        "part def Motor;\npart def Car { part e : Engine; }\n"
    );
    let motor = named(&model(&outcome.source), "Motor").id.clone();
    assert_eq!(outcome.aliases.get(&engine), Some(&motor));
}

#[test]
fn test_failed_rename_is_demoted() {
    let source = "part def A;\n";
    let a = named(&model(source), "A").id.clone();
    let outcome = apply(
        source,
        vec![safe(
            &a,
            PatchPayload::RenameNode {
                from: "Zed".into(),
                to: "B".into(),
            },
        )],
    );
    assert_eq!(outcome.source, source);
    assert_eq!(outcome.needs_review[0].safety, Safety::ReviewRequired);
    assert!(outcome.diagnostics[0].contains("no declaration of 'Zed'"));
}

#[test]
fn test_review_and_layout_patches_do_not_touch_text() {
    let source = "part def A;\n";
    let a = named(&model(source), "A").id.clone();
    let review = SyncPatch::new(
        Safety::ReviewRequired,
        &a,
        PatchPayload::RenameNode {
            from: "A".into(),
            to: "B".into(),
        },
    );
    let moved = safe(
        &a,
        PatchPayload::MoveResize {
            from: None,
            to: Rect::new(0.0, 0.0, 10.0, 10.0),
        },
    );
    let outcome = apply(source, vec![review.clone(), moved]);
    assert_eq!(outcome.source, source);
    assert_eq!(outcome.needs_review, vec![review]);
    assert_eq!(outcome.applied.len(), 1);
}

#[test]
fn test_reconnect_add_satisfy() {
    let source = "package P {\n    part car;\n    requirement speed;\n}\n";
    let m = model(source);
    let edge = SemanticEdge::new(
        EdgeKind::Satisfy,
        named(&m, "car").id.clone(),
        named(&m, "speed").id.clone(),
        None,
    );
    let outcome = apply(
        source,
        vec![safe(&edge.id.clone(), PatchPayload::Reconnect(Reconnect::Add { edge }))],
    );
    assert_eq!(
        outcome.source,
        "package P {\n    part car {\n        satisfy speed;\n    }\n    requirement speed;\n}\n"
    );
}

#[test]
fn test_reconnect_add_connection_in_common_container() {
    let source = "package P {\n    part a;\n    part b;\n}\n";
    let m = model(source);
    let edge = SemanticEdge::new(
        EdgeKind::Connection,
        named(&m, "a").id.clone(),
        named(&m, "b").id.clone(),
        None,
    );
    let outcome = apply(
        source,
        vec![safe(&edge.id.clone(), PatchPayload::Reconnect(Reconnect::Add { edge }))],
    );
    assert_eq!(
        outcome.source,
        "package P {\n    part a;\n    part b;\n    connect a to b;\n}\n"
    );
}

#[test]
fn test_reconnect_remove_statement() {
    let source = "package P {\n    part a;\n    part b;\n    connect a to b;\n}\n";
    let edge = edge_of(&model(source), EdgeKind::Connection);
    let outcome = apply(
        source,
        vec![safe(&edge.id.clone(), PatchPayload::Reconnect(Reconnect::Remove { edge }))],
    );
    assert_eq!(outcome.source, "package P {\n    part a;\n    part b;\n}\n");
}

#[test]
fn test_inline_typing_edge_is_not_a_statement() {
    let source = "part def A;\npart a : A;\n";
    let edge = edge_of(&model(source), EdgeKind::Typing);
    let outcome = apply(
        source,
        vec![safe(&edge.id.clone(), PatchPayload::Reconnect(Reconnect::Remove { edge }))],
    );
    assert_eq!(outcome.source, source);
    assert!(outcome.diagnostics[0].contains("declared inline"));
}

#[test]
fn test_failed_change_has_no_partial_effect() {
    let source = "package P {\n    part a;\n    part b;\n    connect a to b;\n}\n";
    let before = edge_of(&model(source), EdgeKind::Connection);
    let after = SemanticEdge::new(EdgeKind::Connection, before.source_id.clone(), "ghost", None);
    let outcome = apply(
        source,
        vec![safe(
            &before.id.clone(),
            PatchPayload::Reconnect(Reconnect::Change { before, after }),
        )],
    );
    assert_eq!(outcome.source, source);
    assert!(outcome.diagnostics[0].contains("change aborted"));
}

#[test]
fn test_relabel() {
    let source = "state def M {\n    state idle;\n    state run;\n    transition go first idle then run;\n}\n";
    let edge = edge_of(&model(source), EdgeKind::Transition);
    let outcome = apply(
        source,
        vec![safe(
            &edge.id.clone(),
            PatchPayload::Relabel {
                edge,
                from: Some("go".into()),
                to: Some("start".into()),
            },
        )],
    );
    assert!(outcome.source.contains("transition start first idle then run;"));

    let source = "part a; part b; connection link connect a to b;";
    let edge = edge_of(&model(source), EdgeKind::Connection);
    let outcome = apply(
        source,
        vec![safe(
            &edge.id.clone(),
            PatchPayload::Relabel {
                edge,
                from: Some("link".into()),
                to: Some("wire".into()),
            },
        )],
    );
    assert_eq!(outcome.source, source);
    assert_eq!(outcome.applied.len(), 1);
}

#[test]
fn test_reparent_moves_snippet() {
    let source = "package P {\n    part def A;\n    part def B;\n}\n";
    let m = model(source);
    let (p, a, b) = (
        named(&m, "P").id.clone(),
        named(&m, "A").id.clone(),
        named(&m, "B").id.clone(),
    );
    let outcome = apply(
        source,
        vec![safe(
            &a,
            PatchPayload::Reconnect(Reconnect::Reparent {
                node_id: a.clone(),
                from_parent: Some(p),
                to_parent: Some(b),
            }),
        )],
    );
    assert_eq!(
        outcome.source,
        "package P {\n    part def B {\n        part def A;\n    }\n}\n"
    );
    assert!(outcome.aliases.contains_key(&a));
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn test_render_model_from_diagram_graph() {
    let m = SemanticModel::new(
        [
            SemanticNode::new("p", ElementKind::Package, "P"),
            SemanticNode::new("e", ElementKind::PartDef, "Engine").with_parent("p"),
            SemanticNode::new("m", ElementKind::PartUsage, "motor").with_parent("p"),
            SemanticNode::new("r", ElementKind::RequirementUsage, "speed").with_parent("p"),
        ],
        [
            SemanticEdge::new(EdgeKind::Typing, "m", "e", None),
            SemanticEdge::new(EdgeKind::Satisfy, "m", "r", None),
        ],
        Default::default(),
    );
    let text = render_model(&m, &PrintOptions::default());
    assert!(text.contains("part motor : Engine {"), "{text}");
    assert!(text.contains("satisfy speed;"), "{text}");

    let rebuilt = model(&text);
    assert_eq!(rebuilt.nodes.len(), 4);
    let satisfy = edge_of(&rebuilt, EdgeKind::Satisfy);
    assert_eq!(satisfy.source_id, named(&rebuilt, "motor").id);
    assert_eq!(satisfy.target_id, named(&rebuilt, "speed").id);
}

#[test]
fn test_render_model_keeps_parent_cycles() {
    let m = SemanticModel::new(
        [
            SemanticNode::new("a", ElementKind::PartDef, "Alpha").with_parent("b"),
            SemanticNode::new("b", ElementKind::PartDef, "Beta").with_parent("a"),
            SemanticNode::new("c", ElementKind::PartDef, "Gamma"),
        ],
        Vec::<SemanticEdge>::new(),
        Default::default(),
    );
    let text = render_model(&m, &PrintOptions::default());
    for name in ["Alpha", "Beta", "Gamma"] {
        assert_eq!(text.matches(name).count(), 1, "{text}");
    }
    assert_eq!(model(&text).nodes.len(), 3);
}

// ============================================================================
// Session
// ============================================================================

const SOURCE: &str = "package P {\n    part def A;\n    part a : A;\n    part b;\n    connect a to b;\n}\n";

fn projected() -> (SyncSession, String) {
    let mut session = SyncSession::with_source(SyncOptions::default(), SOURCE);
    let xml = session.project().expect("project");
    (session, xml)
}

#[test]
fn test_unchanged_diagram_is_a_no_op() {
    let (mut session, xml) = projected();
    let report = session.sync_from_diagram(&xml).expect("sync");
    assert!(report.applied.is_empty());
    assert!(report.needs_review.is_empty());
    assert!(!report.source_changed);
    assert_eq!(session.source(), SOURCE);
}

#[test]
fn test_diagram_addition_reaches_source() {
    let (mut session, xml) = projected();
    let mut diagram = from_drawio(&xml).expect("read");
    let p = named(&diagram, "P").id.clone();
    diagram.add_node(SemanticNode::new("new-1", ElementKind::PartDef, "Wheel").with_parent(&p));
    diagram.add_edge(SemanticEdge::new(EdgeKind::Contains, p, "new-1", None));
    diagram.layout.insert("new-1", Rect::new(500.0, 500.0, 180.0, 70.0));

    let report = session
        .sync_from_diagram(&to_drawio(&diagram).expect("write"))
        .expect("sync");
    assert!(report.source_changed);
    assert!(session.source().contains("    part def Wheel;\n"));
    let wheel = named(session.model(), "Wheel").id.clone();
    assert_eq!(
        session.layout().get(&wheel),
        Some(&Rect::new(500.0, 500.0, 180.0, 70.0))
    );
    assert_eq!(
        session.state().drawio_snapshot_hash.as_deref(),
        Some(session.state().source_hash.as_str())
    );
}

#[test]
fn test_conflict_forces_review_without_mutation() {
    let (mut session, xml) = projected();
    let edited_text = SOURCE.replace("part b;", "part b;\n    part c;");
    session.update_source(edited_text.clone());

    let mut diagram = from_drawio(&xml).expect("read");
    let a = named(&diagram, "A").id.clone();
    if let Some(node) = diagram.nodes.get_mut(&a) {
        node.name = "Alpha".into();
    }
    let report = session
        .sync_from_diagram(&to_drawio(&diagram).expect("write"))
        .expect("sync");

    assert!(report.conflict.is_some());
    assert!(report.applied.is_empty());
    assert!(report.needs_review.iter().all(|p| !p.is_safe()));
    assert_eq!(session.source(), edited_text);
    assert!(session.state().conflict.is_some());
    assert!(!session.pending_review().is_empty());

    session.reject_all();
    assert!(session.state().conflict.is_none());
}

#[test]
fn test_projection_clears_conflict() {
    let (mut session, xml) = projected();
    session.update_source(format!("{SOURCE}part def Extra;\n"));
    let mut diagram = from_drawio(&xml).expect("read");
    diagram.layout.insert(
        named(&diagram, "A").id.clone(),
        Rect::new(900.0, 900.0, 10.0, 10.0),
    );
    session
        .sync_from_diagram(&to_drawio(&diagram).expect("write"))
        .expect("sync");
    assert!(session.state().conflict.is_some());

    session.project().expect("project");
    assert!(session.state().conflict.is_none());
}

#[test]
fn test_approve_applies_queued_patch() {
    let source = "part a; part b; part c; connect a to b; connect a to c;\n";
    let mut session = SyncSession::with_source(SyncOptions::default(), source);
    let xml = session.project().expect("project");
    let mut diagram = from_drawio(&xml).expect("read");
    let c = named(&diagram, "c").id.clone();
    diagram
        .edges
        .retain(|_, e| !(e.kind == EdgeKind::Connection && e.target_id == c));

    let report = session
        .sync_from_diagram(&to_drawio(&diagram).expect("write"))
        .expect("sync");
    assert_eq!(report.needs_review.len(), 1);
    assert_eq!(session.source(), source);

    let id = report.needs_review[0].id.clone();
    let approved = session.approve(&[id.as_str()]);
    assert_eq!(approved.applied.len(), 1);
    assert!(session.pending_review().is_empty());
    assert!(!session.source().contains("connect a to c;"));
    assert!(session.source().contains("connect a to b;"));
}

#[test]
fn test_canvas_messages() {
    let mut session = SyncSession::with_source(SyncOptions::default(), SOURCE);
    let CanvasReply::Load { xml } = session
        .handle_canvas_message(CanvasMessage::Init)
        .expect("init")
    else {
        panic!("expected load");
    };
    assert_eq!(session.last_pushed(), Some(xml.as_str()));

    let echo = session
        .handle_canvas_message(CanvasMessage::Autosave { xml: xml.clone() })
        .expect("autosave");
    assert_eq!(echo, CanvasReply::Ignored);

    let message = CanvasMessage::from_json(r#"{"event":"save","xml":"<x/>"}"#).expect("json");
    assert_eq!(
        message,
        CanvasMessage::Save {
            xml: "<x/>".into()
        }
    );
    assert_eq!(
        CanvasMessage::from_json(r#"{"event":"configure"}"#).expect("json"),
        CanvasMessage::Other
    );
    let reply = serde_json::to_value(CanvasReply::Load { xml: "<m/>".into() }).expect("json");
    assert_eq!(reply["action"], "load");
}

#[test]
fn test_diagram_without_source_regenerates_text() {
    let diagram = model("package P { part def Engine; part def Car { part e : Engine; } }");
    let xml = to_drawio(&diagram).expect("write");
    let mut session = SyncSession::default();
    let report = session.sync_from_diagram(&xml).expect("sync");
    assert!(report.source_changed);
    assert!(session.source().contains("part e : Engine;"));
    assert_eq!(session.model().nodes.len(), 4);
    assert_eq!(session.layout().len(), 4);
}

#[test]
fn test_view_filtered_diagram_keeps_hidden_nodes() {
    let source = "package P {\n    part car {\n        satisfy speed;\n    }\n    requirement speed;\n    state def M;\n}\n";
    let options = SyncOptions::default().with_view(DiagramView::Requirements);
    let mut session = SyncSession::with_source(options, source);
    let xml = session.project().expect("project");
    let report = session.sync_from_diagram(&xml).expect("sync");
    assert!(report.applied.is_empty());
    assert!(report.needs_review.is_empty());
    assert_eq!(session.source(), source);
}
