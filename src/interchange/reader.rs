//! draw.io markup → semantic model.
//!
//! Cells are collected in document order, then turned into nodes and edges.
//! Vertex kinds come from, in order: the `sysmlKind` tag, the keyword that
//! starts the label, the shape, and finally the reader's default kind.
//! Edge kinds come from the tag, then a `«kind»` label stereotype, then
//! default to `connection`.
//!
//! Vertex cell ids become node ids. Edge ids are recomputed from
//! `(kind, source, target, label)` so that the same relation has the same
//! id whichever side produced it.

use super::error::DiagramError;
use super::style::{
    KIND_KEY, PATH_KEY, SOURCE_KEY, Style, TARGET_KEY, clean_html_label, is_placeholder,
    kind_from_label, kind_from_shape, split_stereotype, split_vertex_label,
};
use super::writer::{LAYER_CELL, ROOT_CELL};
use crate::semantic::{EdgeKind, LayoutMap, Rect, SemanticEdge, SemanticModel, SemanticNode};
use crate::syntax::ElementKind;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use rustc_hash::{FxHashMap, FxHashSet};

/// One `mxCell`, merged with its `<object>`/`<UserObject>` wrapper if any
#[derive(Debug, Clone, Default)]
pub(super) struct RawCell {
    pub id: String,
    pub value: String,
    pub style: String,
    pub vertex: bool,
    pub edge: bool,
    pub parent: Option<String>,
    pub source: Option<String>,
    pub target: Option<String>,
    pub geometry: Option<Rect>,
    /// Wrapper attributes other than `id`/`label`
    pub properties: Vec<(String, String)>,
}

impl RawCell {
    fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Reverse diagram projector
#[derive(Debug, Clone)]
pub struct DiagramReader {
    default_kind: ElementKind,
}

impl Default for DiagramReader {
    fn default() -> Self {
        Self {
            default_kind: ElementKind::PartUsage,
        }
    }
}

impl DiagramReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kind used when neither tag, label nor shape identifies a vertex.
    pub fn with_default_kind(mut self, kind: ElementKind) -> Self {
        self.default_kind = kind;
        self
    }

    pub fn read(&self, xml: &str) -> Result<SemanticModel, DiagramError> {
        let cells = read_cells(xml)?;
        Ok(self.build(&cells))
    }

    fn build(&self, cells: &[RawCell]) -> SemanticModel {
        let mut counters: FxHashMap<ElementKind, usize> = FxHashMap::default();
        let mut nodes: Vec<SemanticNode> = Vec::new();
        let mut layout = LayoutMap::new();

        for cell in cells.iter().filter(|c| c.vertex && !is_structural(&c.id)) {
            let style = Style::parse(&cell.style);
            let label = if style.is_html() {
                clean_html_label(&cell.value)
            } else {
                cell.value.trim().to_string()
            };
            let tag = cell.property(KIND_KEY).or_else(|| style.get(KIND_KEY));
            let kind = tag
                .and_then(|t| t.parse::<ElementKind>().ok())
                .or_else(|| kind_from_label(&label))
                .or_else(|| kind_from_shape(&style))
                .unwrap_or(self.default_kind);

            let (mut name, type_name) = split_vertex_label(&label, kind);
            if is_placeholder(&name) {
                let counter = counters.entry(kind).or_default();
                *counter += 1;
                name = format!("{}{}", kind.name_stem(), counter);
            }

            let mut node = SemanticNode::new(cell.id.clone(), kind, name);
            node.type_name = type_name;
            let tag_of = |key: &str| {
                cell.property(key)
                    .or_else(|| style.get(key))
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
            };
            node.sysml_path = tag_of(PATH_KEY).unwrap_or_default();
            node.source_ref = tag_of(SOURCE_KEY);
            node.target_ref = tag_of(TARGET_KEY);
            if let Some(rect) = cell.geometry {
                layout.insert(cell.id.clone(), rect);
            }
            nodes.push(node);
        }

        let vertex_ids: FxHashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        let mut edges: Vec<SemanticEdge> = Vec::new();
        let mut parents: FxHashMap<String, String> = FxHashMap::default();

        for cell in cells.iter().filter(|c| c.edge) {
            let (Some(source), Some(target)) = (cell.source.as_deref(), cell.target.as_deref())
            else {
                tracing::trace!(id = %cell.id, "connector without both ends dropped");
                continue;
            };
            if !vertex_ids.contains(source) || !vertex_ids.contains(target) {
                tracing::trace!(id = %cell.id, "dangling connector dropped");
                continue;
            }
            let style = Style::parse(&cell.style);
            let value = if style.is_html() {
                clean_html_label(&cell.value)
            } else {
                cell.value.trim().to_string()
            };
            let (stereotype, text) = split_stereotype(&value);
            let kind = cell
                .property(KIND_KEY)
                .or_else(|| style.get(KIND_KEY))
                .and_then(|t| t.parse::<EdgeKind>().ok())
                .or_else(|| stereotype.and_then(|s| s.parse::<EdgeKind>().ok()))
                .unwrap_or(EdgeKind::Connection);
            let label = match kind {
                EdgeKind::Contains => None,
                _ => (!text.is_empty()).then(|| text.to_string()),
            };
            if kind == EdgeKind::Contains {
                parents
                    .entry(target.to_string())
                    .or_insert_with(|| source.to_string());
            }
            edges.push(SemanticEdge::new(kind, source, target, label));
        }

        // Shapes grouped inside another shape: the container is the parent.
        for cell in cells.iter().filter(|c| c.vertex) {
            if let Some(parent) = cell.parent.as_deref() {
                if !is_structural(parent)
                    && vertex_ids.contains(parent)
                    && !parents.contains_key(&cell.id)
                {
                    parents.insert(cell.id.clone(), parent.to_string());
                    edges.push(SemanticEdge::new(
                        EdgeKind::Contains,
                        parent,
                        cell.id.as_str(),
                        None,
                    ));
                }
            }
        }

        for node in &mut nodes {
            if let Some(parent) = parents.get(&node.id) {
                if *parent != node.id {
                    node.parent_id = Some(parent.clone());
                }
            }
        }

        let model = SemanticModel::new(nodes, edges, layout);
        tracing::debug!(
            nodes = model.nodes.len(),
            edges = model.edges.len(),
            "read diagram"
        );
        model
    }
}

/// Read a diagram with default options.
pub fn from_drawio(xml: &str) -> Result<SemanticModel, DiagramError> {
    DiagramReader::new().read(xml)
}

fn is_structural(id: &str) -> bool {
    id == ROOT_CELL || id == LAYER_CELL
}

// ============================================================================
// CELL SCANNING
// ============================================================================

/// Collect every cell of the first diagram page.
pub(super) fn read_cells(xml: &str) -> Result<Vec<RawCell>, DiagramError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut cells = Vec::new();
    let mut wrapper: Option<RawCell> = None;
    let mut current: Option<RawCell> = None;
    let mut in_diagram = false;
    let mut saw_graph = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"diagram" => in_diagram = true,
                b"mxGraphModel" => saw_graph = true,
                b"object" | b"UserObject" => wrapper = Some(wrapper_cell(e)?),
                b"mxCell" => current = Some(cell(e, wrapper.as_ref())?),
                b"mxGeometry" => read_geometry(e, current.as_mut())?,
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"mxGraphModel" => saw_graph = true,
                b"mxCell" => cells.push(cell(e, wrapper.as_ref())?),
                b"mxGeometry" => read_geometry(e, current.as_mut())?,
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"diagram" => in_diagram = false,
                b"mxCell" => cells.extend(current.take()),
                b"object" | b"UserObject" => wrapper = None,
                _ => {}
            },
            Ok(Event::Text(ref t)) => {
                let bytes: &[u8] = t;
                if in_diagram && !saw_graph && bytes.iter().any(|b| !b.is_ascii_whitespace()) {
                    return Err(DiagramError::Compressed);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(DiagramError::xml(format!(
                    "XML parse error at position {}: {e}",
                    reader.error_position()
                )));
            }
            _ => {}
        }
    }

    if !saw_graph {
        return Err(DiagramError::missing_element("mxGraphModel"));
    }
    Ok(cells)
}

fn attributes(e: &BytesStart<'_>) -> Result<Vec<(String, String)>, DiagramError> {
    e.attributes()
        .map(|attr| {
            let attr = attr.map_err(|e| DiagramError::xml(format!("Attribute error: {e}")))?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| DiagramError::xml(format!("Attribute key error: {e}")))?
                .to_string();
            let value = attr
                .unescape_value()
                .map_err(|e| DiagramError::xml(format!("Attribute value error: {e}")))?
                .to_string();
            Ok((key, value))
        })
        .collect()
}

fn wrapper_cell(e: &BytesStart<'_>) -> Result<RawCell, DiagramError> {
    let mut wrapper = RawCell::default();
    for (key, value) in attributes(e)? {
        match key.as_str() {
            "id" => wrapper.id = value,
            "label" => wrapper.value = value,
            _ => wrapper.properties.push((key, value)),
        }
    }
    Ok(wrapper)
}

fn cell(e: &BytesStart<'_>, wrapper: Option<&RawCell>) -> Result<RawCell, DiagramError> {
    let mut cell = wrapper.cloned().unwrap_or_default();
    for (key, value) in attributes(e)? {
        match key.as_str() {
            "id" if wrapper.is_none() => cell.id = value,
            "value" if wrapper.is_none() => cell.value = value,
            "style" => cell.style = value,
            "vertex" => cell.vertex = value == "1",
            "edge" => cell.edge = value == "1",
            "parent" => cell.parent = Some(value),
            "source" => cell.source = Some(value),
            "target" => cell.target = Some(value),
            _ => {}
        }
    }
    if cell.id.is_empty() {
        return Err(DiagramError::missing_attribute("id"));
    }
    Ok(cell)
}

fn read_geometry(e: &BytesStart<'_>, cell: Option<&mut RawCell>) -> Result<(), DiagramError> {
    let Some(cell) = cell.filter(|c| c.vertex) else {
        return Ok(());
    };
    let mut rect = Rect::default();
    for (key, value) in attributes(e)? {
        let field = match key.as_str() {
            "x" => &mut rect.x,
            "y" => &mut rect.y,
            "width" => &mut rect.width,
            "height" => &mut rect.height,
            _ => continue,
        };
        *field = value
            .parse()
            .map_err(|_| DiagramError::invalid_attribute(format!("{key}=\"{value}\"")))?;
    }
    cell.geometry = Some(rect);
    Ok(())
}
