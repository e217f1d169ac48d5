use super::*;
use crate::semantic::{ModelBuilder, SemanticModel};

fn model(text: &str) -> SemanticModel {
    ModelBuilder::new().build_text(text).model
}

fn rect_of(model: &SemanticModel, layout: &LayoutMap, name: &str) -> Rect {
    let id = &model
        .nodes
        .values()
        .find(|n| n.name == name)
        .unwrap_or_else(|| panic!("no node named {name}"))
        .id;
    *layout.get(id).unwrap_or_else(|| panic!("{name} not placed"))
}

fn assert_no_overlap(layout: &LayoutMap) {
    let rects: Vec<_> = layout.values().collect();
    for (i, a) in rects.iter().enumerate() {
        for b in &rects[i + 1..] {
            assert!(!a.overlaps(b, 0.0), "{a:?} overlaps {b:?}");
        }
    }
}

#[test]
fn test_fresh_layout_places_every_node() {
    let model = model("part def Engine; part def Car { part e : Engine; }");
    let layout = LayoutEngine::default().layout(&model, None);
    assert_eq!(layout.len(), model.nodes.len());
    for id in model.nodes.keys() {
        assert!(layout.contains(id));
    }
    assert_no_overlap(&layout);
}

#[test]
fn test_layers_follow_edges() {
    let model = model("part def Engine; part def Car { part e : Engine; }");
    let layout = LayoutEngine::default().layout(&model, None);
    let car = rect_of(&model, &layout, "Car");
    let e = rect_of(&model, &layout, "e");
    let engine = rect_of(&model, &layout, "Engine");
    assert!(car.y < e.y);
    assert!(e.y < engine.y);
}

#[test]
fn test_requirements_get_their_own_lane() {
    let model = model(
        "part def Car { part e; }\n\
         requirement def Speed;\n\
         verification def SpeedTest;",
    );
    let layout = LayoutEngine::default().layout(&model, None);
    let main_right = ["Car", "e"]
        .iter()
        .map(|n| rect_of(&model, &layout, n).right())
        .fold(0.0, f64::max);
    let speed = rect_of(&model, &layout, "Speed");
    let test = rect_of(&model, &layout, "SpeedTest");
    assert!(speed.x > main_right);
    assert!(test.x > speed.right());
}

#[test]
fn test_grid_fallback_without_edges() {
    let model = model("part def A; part def B; part def C; part def D; part def E;");
    let engine = LayoutEngine::new(LayoutOptions::default().with_grid_columns(2));
    let layout = engine.layout(&model, None);

    let a = rect_of(&model, &layout, "A");
    let b = rect_of(&model, &layout, "B");
    let c = rect_of(&model, &layout, "C");
    let e = rect_of(&model, &layout, "E");
    assert_eq!(a.y, b.y);
    assert!(b.x > a.x);
    assert_eq!(c.x, a.x);
    assert!(c.y > a.y);
    assert!(e.y > c.y);
    assert_no_overlap(&layout);
}

#[test]
fn test_cycles_are_layered() {
    let model = model("part a; part b; connect a to b; connect b to a;");
    let layout = LayoutEngine::default().layout(&model, None);
    assert_eq!(layout.len(), 2);
    assert_no_overlap(&layout);
}

#[test]
fn test_incremental_keeps_known_positions() {
    let before = model("part def A; part def B;");
    let mut previous = LayoutEngine::default().layout(&before, None);
    let a_id = before.nodes.values().find(|n| n.name == "A").map(|n| n.id.clone()).unwrap_or_default();
    previous.insert(a_id.clone(), Rect::new(500.0, 500.0, 180.0, 70.0));
    previous.insert("stale", Rect::new(0.0, 0.0, 10.0, 10.0));

    let after = model("part def A; part def B; part def C;");
    let layout = LayoutEngine::default().layout(&after, Some(&previous));

    assert_eq!(layout.get(&a_id), Some(&Rect::new(500.0, 500.0, 180.0, 70.0)));
    assert_eq!(
        rect_of(&after, &layout, "B"),
        rect_of(&before, &previous, "B")
    );
    assert!(!layout.contains("stale"));
    assert_eq!(layout.len(), 3);
    assert_no_overlap(&layout);
}

#[test]
fn test_complete_fills_missing_entries() {
    let mut model = model("part def A; part def B;");
    let a = model.nodes.keys().next().cloned().unwrap_or_default();
    model.layout.insert(a.clone(), Rect::new(7.0, 7.0, 100.0, 50.0));
    let layout = LayoutEngine::default().complete(&model);
    assert_eq!(layout.get(&a), Some(&Rect::new(7.0, 7.0, 100.0, 50.0)));
    assert_eq!(layout.len(), 2);
}

#[test]
fn test_nudge_gives_up_after_max_attempts() {
    let options = LayoutOptions::default().with_max_nudge_attempts(0);
    let placed = [Rect::new(0.0, 0.0, 100.0, 100.0)];
    let start = Rect::new(10.0, 10.0, 50.0, 50.0);
    assert_eq!(layered::nudge(start, &placed, &options), start);

    let options = LayoutOptions::default();
    let moved = layered::nudge(start, &placed, &options);
    assert!(!moved.overlaps(&placed[0], 0.0));
    assert_eq!(moved.x, start.x);
}

#[test]
fn test_builder_uses_engine() {
    let result = ModelBuilder::new()
        .with_layout(LayoutEngine::default())
        .build_text("part def A; part def B { part a : A; }");
    assert_eq!(result.model.layout.len(), 3);
}

#[test]
fn test_default_sizes() {
    use crate::syntax::ElementKind;
    assert_eq!(default_size(ElementKind::PartDef), (180.0, 70.0));
    assert_eq!(default_size(ElementKind::RequirementUsage), (200.0, 90.0));
    assert_eq!(default_size(ElementKind::PortUsage), (120.0, 40.0));
}
