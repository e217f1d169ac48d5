use super::*;
use crate::syntax::{ElementKind, NodeDetail, SyntaxNode, Visibility};

fn parse_ok(text: &str) -> Vec<SyntaxNode> {
    let parse = parse(text);
    assert!(parse.ok(), "unexpected errors: {:?}", parse.errors);
    parse.file.members
}

// ============================================================================
// Cursor
// ============================================================================

#[test]
fn test_keyword_requires_whole_identifier() {
    let mut cursor = Cursor::new("partition x;");
    assert!(!cursor.at_keyword("part"));
    assert!(cursor.at_keyword("partition"));
}

#[test]
fn test_multi_word_keyword_spans_trivia() {
    let mut cursor = Cursor::new("connection /* c */\n  def C;");
    assert!(cursor.eat_keyword("connection def"));
    assert_eq!(cursor.read_name().as_deref(), Some("C"));
}

#[test]
fn test_read_multiplicity_raw_text() {
    let mut cursor = Cursor::new("[0..*] rest");
    assert_eq!(cursor.read_multiplicity().as_deref(), Some("0..*"));
    assert!(cursor.at_keyword("rest"));
}

#[test]
fn test_read_braced_content_nested_and_lenient() {
    let mut cursor = Cursor::new("{ a { b } c } tail");
    assert_eq!(cursor.read_braced_content().as_deref(), Some("a { b } c"));

    let mut unterminated = Cursor::new("{ a { b }");
    assert_eq!(unterminated.read_braced_content().as_deref(), Some("a { b }"));
    assert!(unterminated.is_eof());
}

#[test]
fn test_read_quoted_name() {
    let mut cursor = Cursor::new("'Fuel Tank'");
    assert_eq!(cursor.read_name().as_deref(), Some("Fuel Tank"));
}

// ============================================================================
// Declarations
// ============================================================================

#[test]
fn test_parse_definition_with_usages() {
    let members = parse_ok(
        "part def Vehicle :> Base {\n    part engine : Engine[1];\n    attribute mass : Real = 1500;\n}",
    );
    assert_eq!(members.len(), 1);
    let vehicle = &members[0];
    assert_eq!(vehicle.kind, ElementKind::PartDef);
    assert_eq!(vehicle.name, "Vehicle");
    let NodeDetail::Definition(def) = &vehicle.detail else {
        panic!("expected definition detail");
    };
    assert_eq!(def.specializes, vec!["Base"]);

    let engine = &vehicle.children[0];
    assert_eq!(engine.kind, ElementKind::PartUsage);
    assert_eq!(engine.type_name(), Some("Engine"));
    let NodeDetail::Usage(usage) = &engine.detail else {
        panic!("expected usage detail");
    };
    assert_eq!(usage.multiplicity.as_deref(), Some("1"));

    let mass = &vehicle.children[1];
    let NodeDetail::Usage(usage) = &mass.detail else {
        panic!("expected usage detail");
    };
    assert_eq!(usage.default_value.as_deref(), Some("1500"));
}

#[test]
fn test_longest_keyword_wins() {
    let members = parse_ok("connection def C;\nconnection c : C connect a to b;\nconnect a to b;");
    let kinds: Vec<_> = members.iter().map(|m| m.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ElementKind::ConnectionDef,
            ElementKind::ConnectionUsage,
            ElementKind::ConnectionUsage,
        ]
    );
    assert_eq!(members[1].name, "c");
    assert_eq!(members[1].endpoints(), Some(("a", "b")));
    assert_eq!(members[1].type_name(), Some("C"));
    assert!(members[2].is_anonymous());
}

#[test]
fn test_calc_usage_after_calc_def() {
    let members = parse_ok("calc def Speed;\ncalc x : Speed;\ncalc y;");
    let kinds: Vec<_> = members.iter().map(|m| m.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ElementKind::CalcDef,
            ElementKind::CalcUsage,
            ElementKind::CalcUsage,
        ]
    );
    assert_eq!(members[1].name, "x");
    assert_eq!(members[1].type_name(), Some("Speed"));
    assert_eq!(members[2].name, "y");
}

#[test]
fn test_quoted_definition_name() {
    let members = parse_ok("part def 'Fuel Tank';");
    assert_eq!(members[0].name, "Fuel Tank");
}

#[test]
fn test_import_with_visibility() {
    let members = parse_ok("private import ISQ::*;\nimport Lib::**;");
    assert_eq!(members[0].visibility, Some(Visibility::Private));
    let NodeDetail::Import(import) = &members[0].detail else {
        panic!("expected import detail");
    };
    assert_eq!(import.target, "ISQ");
    assert!(import.wildcard);
    assert!(!import.recursive);

    let NodeDetail::Import(import) = &members[1].detail else {
        panic!("expected import detail");
    };
    assert!(import.recursive);
}

#[test]
fn test_enum_values() {
    let members = parse_ok("enum def Color { red; green; enum blue; }");
    let names: Vec<_> = members[0].children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["red", "green", "blue"]);
    assert!(
        members[0]
            .children
            .iter()
            .all(|c| c.kind == ElementKind::EnumValue)
    );
}

#[test]
fn test_redefinition_names_anonymous_usage() {
    let members = parse_ok("part def A { attribute :>> mass = 10; }");
    let mass = &members[0].children[0];
    assert_eq!(mass.name, "mass");
    let NodeDetail::Usage(usage) = &mass.detail else {
        panic!("expected usage detail");
    };
    assert_eq!(usage.redefines, vec!["mass"]);
    assert_eq!(usage.default_value.as_deref(), Some("10"));
}

// ============================================================================
// Documentation
// ============================================================================

#[test]
fn test_doc_comment_is_kept() {
    let members = parse_ok("part def A {\n    doc /* The engine */\n}");
    let doc = &members[0].children[0];
    assert_eq!(doc.kind, ElementKind::Doc);
    let NodeDetail::Doc(detail) = &doc.detail else {
        panic!("expected doc detail");
    };
    assert_eq!(detail.text, "The engine");
}

#[test]
fn test_plain_block_comment_is_trivia() {
    let members = parse_ok("/* header */\npart def A;");
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].kind, ElementKind::PartDef);
}

#[test]
fn test_comment_about() {
    let members = parse_ok("comment c1 about Vehicle /* note */");
    let NodeDetail::Doc(detail) = &members[0].detail else {
        panic!("expected doc detail");
    };
    assert_eq!(members[0].name, "c1");
    assert_eq!(detail.about, vec!["Vehicle"]);
    assert_eq!(detail.text, "note");
}

// ============================================================================
// Relations
// ============================================================================

#[test]
fn test_satisfy_by() {
    let members = parse_ok("satisfy requirement R1 by engine;");
    assert_eq!(members[0].kind, ElementKind::Satisfy);
    assert_eq!(members[0].endpoints(), Some(("engine", "R1")));
}

#[test]
fn test_satisfy_without_by_has_empty_source() {
    let members = parse_ok("part e { satisfy R1; }");
    assert_eq!(members[0].children[0].endpoints(), Some(("", "R1")));
}

#[test]
fn test_transition_with_trigger() {
    let members = parse_ok("transition t1 first idle accept start then running;");
    let NodeDetail::Transition(transition) = &members[0].detail else {
        panic!("expected transition detail");
    };
    assert_eq!(members[0].name, "t1");
    assert_eq!(transition.first, "idle");
    assert_eq!(transition.then, "running");
    assert_eq!(transition.trigger.as_deref(), Some("start"));
}

#[test]
fn test_flow_forms() {
    let members = parse_ok("flow fuel of Fuel from tank.out to engine.inlet;\nflow from a to b;");
    assert_eq!(members[0].name, "fuel");
    assert_eq!(members[0].type_name(), Some("Fuel"));
    assert_eq!(members[0].endpoints(), Some(("tank.out", "engine.inlet")));
    assert!(members[1].is_anonymous());
    assert_eq!(members[1].endpoints(), Some(("a", "b")));
}

#[test]
fn test_bind_and_dependency() {
    let members = parse_ok("bind a = b;\ndependency d from x to y;\ndependency p to q;");
    assert_eq!(members[0].kind, ElementKind::BindingUsage);
    assert_eq!(members[0].endpoints(), Some(("a", "b")));
    assert_eq!(members[1].name, "d");
    assert_eq!(members[1].endpoints(), Some(("x", "y")));
    assert!(members[2].is_anonymous());
    assert_eq!(members[2].endpoints(), Some(("p", "q")));
}

// ============================================================================
// Unknown constructs & recovery
// ============================================================================

#[test]
fn test_unknown_keyword_skips_body() {
    let members = parse_ok("perform action drive { x; y; }\npart def A;");
    assert_eq!(members.len(), 2);
    assert_eq!(members[0].kind, ElementKind::Unknown);
    assert_eq!(members[0].name, "perform");
    let NodeDetail::Unknown(unknown) = &members[0].detail else {
        panic!("expected unknown detail");
    };
    assert!(unknown.raw.starts_with("perform action drive"));
    assert_eq!(members[1].name, "A");
}

#[test]
fn test_recovery_skips_to_next_statement() {
    let parse = parse("part def ;\npart def B;");
    assert_eq!(parse.errors.len(), 1);
    assert_eq!(parse.errors[0].code, ErrorCode::E0301);
    assert_eq!(parse.file.members.len(), 1);
    assert_eq!(parse.file.members[0].name, "B");
}

#[test]
fn test_unclosed_body_keeps_children() {
    let parse = parse("package P {\n    part def A;\n");
    assert_eq!(parse.errors.len(), 1);
    assert_eq!(parse.errors[0].code, ErrorCode::E0202);
    let package = &parse.file.members[0];
    assert_eq!(package.children.len(), 1);
    assert_eq!(package.children[0].name, "A");
}

#[test]
fn test_stray_closing_brace() {
    let parse = parse("}\npart def A;");
    assert_eq!(parse.errors[0].code, ErrorCode::E0205);
    assert_eq!(parse.file.members.len(), 1);
}

#[test]
fn test_node_span_covers_construct() {
    let text = "part def A;\npart def B { }";
    let members = parse_ok(text);
    let span = members[1].span.expect("span");
    assert_eq!(span.start.line, 1);
    assert_eq!(span.start.column, 0);
    assert_eq!(span.text(text), Some("part def B { }"));
}
