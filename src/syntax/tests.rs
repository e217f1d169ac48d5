use super::*;
use crate::parser::parse;

/// Kind/name/nesting shape of a tree, ignoring spans and formatting.
fn shape(nodes: &[SyntaxNode]) -> Vec<(ElementKind, String, usize)> {
    let mut out = Vec::new();
    fn walk(nodes: &[SyntaxNode], depth: usize, out: &mut Vec<(ElementKind, String, usize)>) {
        for node in nodes {
            out.push((node.kind, node.name.to_string(), depth));
            walk(&node.children, depth + 1, out);
        }
    }
    walk(nodes, 0, &mut out);
    out
}

#[test]
fn test_kind_tags_round_trip() {
    for kind in ElementKind::ALL {
        assert_eq!(kind.as_str().parse::<ElementKind>(), Ok(*kind));
    }
    assert!("NotAKind".parse::<ElementKind>().is_err());
}

#[test]
fn test_kind_classification() {
    assert!(ElementKind::PartDef.is_definition());
    assert!(ElementKind::Satisfy.is_relation());
    assert!(!ElementKind::Doc.is_semantic());
    assert!(!ElementKind::Unknown.is_auto_safe());
    assert_eq!(ElementKind::UseCaseUsage.name_stem(), "usecase");
    assert_eq!(ElementKind::RequirementDef.name_stem(), "requirement");
}

#[test]
fn test_descendants_pre_order() {
    let parsed = parse("package P { part def A { part x; } part def B; }");
    let names: Vec<_> = parsed.file.descendants().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["P", "A", "x", "B"]);
}

#[test]
fn test_print_reparses_to_same_shape() {
    let text = r#"package Vehicle {
    private import ISQ::*;
    part def Engine :> Component {
        doc /* Produces torque */
        attribute power : Real = 150;
        port fuelIn : FuelPort;
    }
    part def Car {
        part engine : Engine[1];
        part 'fuel tank' : Tank;
        connect engine.fuelIn to 'fuel tank'.out;
    }
    requirement def MaxMass;
    requirement mass : MaxMass;
    satisfy mass by Car;
    state def Modes {
        state idle;
        state running;
        transition start first idle accept go then running;
    }
    enum def Color { red; green; }
}
"#;
    let original = parse(text);
    assert!(original.ok(), "{:?}", original.errors);

    let printed = print(&original.file, &PrintOptions::default());
    let reparsed = parse(&printed);
    assert!(reparsed.ok(), "{:?}\n{printed}", reparsed.errors);
    assert_eq!(shape(&original.file.members), shape(&reparsed.file.members));
}

#[test]
fn test_print_indentation_options() {
    let parsed = parse("package P { part def A; }");
    let printed = print(&parsed.file, &PrintOptions::default().with_tab_size(2));
    assert_eq!(printed, "package P {\n  part def A;\n}\n");

    let tabbed = print(&parsed.file, &PrintOptions::default().with_tabs());
    assert_eq!(tabbed, "package P {\n\tpart def A;\n}\n");
}

#[test]
fn test_declaration_header() {
    let parsed = parse("part wheels : Wheel[4] :> parts;");
    let header = printer::declaration(&parsed.file.members[0]);
    assert_eq!(header, "part wheels : Wheel[4] :> parts");
}
