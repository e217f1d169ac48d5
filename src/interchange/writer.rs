//! Semantic model → draw.io markup.

use super::error::DiagramError;
use super::style::{edge_label, edge_style, vertex_label, vertex_style};
use super::views::DiagramView;
use crate::layout::{LayoutEngine, LayoutOptions};
use crate::semantic::{Rect, SemanticEdge, SemanticModel, SemanticNode};
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use std::io::Cursor;

/// Id of the root cell
pub const ROOT_CELL: &str = "0";
/// Id of the default layer; every shape and connector is parented to it
pub const LAYER_CELL: &str = "1";

/// Forward diagram projector
#[derive(Debug, Clone)]
pub struct DiagramWriter {
    view: DiagramView,
    layout: LayoutEngine,
    name: String,
}

impl Default for DiagramWriter {
    fn default() -> Self {
        Self {
            view: DiagramView::All,
            layout: LayoutEngine::default(),
            name: "SysML".to_string(),
        }
    }
}

impl DiagramWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_view(mut self, view: DiagramView) -> Self {
        self.view = view;
        self
    }

    /// Options used to place nodes missing from the model layout.
    pub fn with_layout_options(mut self, options: LayoutOptions) -> Self {
        self.layout = LayoutEngine::new(options);
        self
    }

    /// Name of the diagram page.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Render `model` as uncompressed mxGraph XML.
    ///
    /// Nodes without a rectangle are placed first; known rectangles are used
    /// as they are.
    pub fn write(&self, model: &SemanticModel) -> Result<String, DiagramError> {
        let model = self.view.filter(model);
        let layout = self.layout.complete(&model);

        let mut buffer = Cursor::new(Vec::new());
        let mut writer = Writer::new_with_indent(&mut buffer, b' ', 2);

        let mut file = BytesStart::new("mxfile");
        file.push_attribute(("host", "syster-sync"));
        file.push_attribute(("version", model.version.as_str()));
        start(&mut writer, file)?;

        let mut diagram = BytesStart::new("diagram");
        diagram.push_attribute(("id", self.view.as_str()));
        diagram.push_attribute(("name", self.name.as_str()));
        start(&mut writer, diagram)?;

        let mut graph = BytesStart::new("mxGraphModel");
        for (key, value) in [
            ("grid", "1"),
            ("gridSize", "10"),
            ("guides", "1"),
            ("connect", "1"),
            ("arrows", "1"),
            ("page", "0"),
        ] {
            graph.push_attribute((key, value));
        }
        start(&mut writer, graph)?;
        start(&mut writer, BytesStart::new("root"))?;

        let mut root = BytesStart::new("mxCell");
        root.push_attribute(("id", ROOT_CELL));
        empty(&mut writer, root)?;
        let mut layer = BytesStart::new("mxCell");
        layer.push_attribute(("id", LAYER_CELL));
        layer.push_attribute(("parent", ROOT_CELL));
        empty(&mut writer, layer)?;

        for node in model.nodes.values() {
            let rect = layout.get(&node.id).copied().unwrap_or_default();
            write_vertex(&mut writer, node, rect)?;
        }
        for edge in model.edges.values() {
            write_edge(&mut writer, edge)?;
        }

        for tag in ["root", "mxGraphModel", "diagram", "mxfile"] {
            end(&mut writer, tag)?;
        }

        tracing::debug!(
            view = %self.view,
            vertices = model.nodes.len(),
            edges = model.edges.len(),
            "wrote diagram"
        );
        let mut output = String::from_utf8(buffer.into_inner())
            .map_err(|e| DiagramError::xml(format!("Invalid UTF-8 output: {e}")))?;
        output.push('\n');
        Ok(output)
    }
}

/// Render `model` with default options.
pub fn to_drawio(model: &SemanticModel) -> Result<String, DiagramError> {
    DiagramWriter::new().write(model)
}

fn write_vertex<W: std::io::Write>(
    writer: &mut Writer<W>,
    node: &SemanticNode,
    rect: Rect,
) -> Result<(), DiagramError> {
    let label = vertex_label(node);
    let style = vertex_style(node);
    let mut cell = BytesStart::new("mxCell");
    cell.push_attribute(("id", node.id.as_str()));
    cell.push_attribute(("value", label.as_str()));
    cell.push_attribute(("style", style.as_str()));
    cell.push_attribute(("vertex", "1"));
    cell.push_attribute(("parent", LAYER_CELL));
    start(writer, cell)?;

    let (x, y, width, height) = (
        rect.x.to_string(),
        rect.y.to_string(),
        rect.width.to_string(),
        rect.height.to_string(),
    );
    let mut geometry = BytesStart::new("mxGeometry");
    geometry.push_attribute(("x", x.as_str()));
    geometry.push_attribute(("y", y.as_str()));
    geometry.push_attribute(("width", width.as_str()));
    geometry.push_attribute(("height", height.as_str()));
    geometry.push_attribute(("as", "geometry"));
    empty(writer, geometry)?;
    end(writer, "mxCell")
}

fn write_edge<W: std::io::Write>(
    writer: &mut Writer<W>,
    edge: &SemanticEdge,
) -> Result<(), DiagramError> {
    let label = edge_label(edge.kind, edge.label.as_deref());
    let style = edge_style(edge.kind);
    let mut cell = BytesStart::new("mxCell");
    cell.push_attribute(("id", edge.id.as_str()));
    cell.push_attribute(("value", label.as_str()));
    cell.push_attribute(("style", style.as_str()));
    cell.push_attribute(("edge", "1"));
    cell.push_attribute(("parent", LAYER_CELL));
    cell.push_attribute(("source", edge.source_id.as_str()));
    cell.push_attribute(("target", edge.target_id.as_str()));
    start(writer, cell)?;

    let mut geometry = BytesStart::new("mxGeometry");
    geometry.push_attribute(("relative", "1"));
    geometry.push_attribute(("as", "geometry"));
    empty(writer, geometry)?;
    end(writer, "mxCell")
}

// ── Event helpers ──────────────────────────────────────────────────

fn start<W: std::io::Write>(writer: &mut Writer<W>, tag: BytesStart<'_>) -> Result<(), DiagramError> {
    writer
        .write_event(Event::Start(tag))
        .map_err(|e| DiagramError::xml(format!("Write error: {e}")))
}

fn empty<W: std::io::Write>(writer: &mut Writer<W>, tag: BytesStart<'_>) -> Result<(), DiagramError> {
    writer
        .write_event(Event::Empty(tag))
        .map_err(|e| DiagramError::xml(format!("Write error: {e}")))
}

fn end<W: std::io::Write>(writer: &mut Writer<W>, tag: &str) -> Result<(), DiagramError> {
    writer
        .write_event(Event::End(BytesEnd::new(tag)))
        .map_err(|e| DiagramError::xml(format!("Write error: {e}")))
}
