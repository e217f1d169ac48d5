use super::*;
use text_size::TextSize;

#[test]
fn test_line_index_positions() {
    let text = "package P {\n    part def A;\n}\n";
    let index = LineIndex::new(text);

    let pos = index.position(TextSize::new(16));
    assert_eq!(pos.line, 1);
    assert_eq!(pos.column, 4);

    let eof = index.position(TextSize::of(text) + TextSize::new(10));
    assert_eq!(eof.offset, TextSize::of(text));
    assert_eq!(eof.line, 3);
}

#[test]
fn test_span_text_slices_source() {
    let text = "part def A;";
    let index = LineIndex::new(text);
    let span = index.span(TextRange::new(TextSize::new(9), TextSize::new(10)));
    assert_eq!(span.text(text), Some("A"));
    assert_eq!(span.to_string(), "1:10-1:11");
}

#[test]
fn test_stable_id_is_deterministic() {
    let a = stable_id("n", ["root/PartDef:A#0"]);
    let b = stable_id("n", ["root/PartDef:A#0"]);
    assert_eq!(a, b);
    assert!(a.starts_with("n_"));
    assert_eq!(a.len(), 2 + 16);
}

#[test]
fn test_hash_parts_separates_boundaries() {
    assert_ne!(hash::hash_parts(["ab", "c"]), hash::hash_parts(["a", "bc"]));
}

#[test]
fn test_content_hash_prefix() {
    let h = content_hash("part def A;");
    assert!(h.starts_with("fnv1a64:"));
    assert_ne!(h, content_hash("part def B;"));
}

#[test]
fn test_quote_name() {
    assert_eq!(quote_name("Engine"), "Engine");
    assert_eq!(quote_name("Fuel Tank"), "'Fuel Tank'");
    assert!(!is_plain_identifier("1abc"));
    assert!(is_plain_identifier("_abc1"));
}

#[test]
fn test_quote_reference_segments() {
    assert_eq!(quote_reference("Pkg::Engine"), "Pkg::Engine");
    assert_eq!(quote_reference("tank.out"), "tank.out");
    assert_eq!(quote_reference("Pkg::Fuel Tank"), "Pkg::'Fuel Tank'");
}
