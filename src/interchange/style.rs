//! Cell styles, kind tags and label conventions.
//!
//! A style is a `;`-separated list of `key=value` tokens (bare tokens such as
//! `ellipse` are shape names). Metadata rides along as extra tokens:
//!
//! | key          | cell   | value                               |
//! |--------------|--------|-------------------------------------|
//! | `sysmlKind`  | both   | element kind tag / edge kind name   |
//! | `sysmlPath`  | vertex | identity path                       |
//! | `sysmlSource`| vertex | source reference of a relation      |
//! | `sysmlTarget`| vertex | target reference of a relation      |
//!
//! Metadata values are percent-escaped so `;` and `=` survive.

use crate::semantic::{EdgeKind, SemanticNode};
use crate::syntax::ElementKind;
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

pub const KIND_KEY: &str = "sysmlKind";
pub const PATH_KEY: &str = "sysmlPath";
pub const SOURCE_KEY: &str = "sysmlSource";
pub const TARGET_KEY: &str = "sysmlTarget";

/// Names that draw.io gives to freshly drawn shapes
const PLACEHOLDER_NAMES: &[&str] = &["text", "label", "textbox"];

// ============================================================================
// STYLE STRINGS
// ============================================================================

/// Parsed style: ordered `(key, value)` tokens; bare tokens have an empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Style(Vec<(String, String)>);

impl Style {
    pub fn parse(style: &str) -> Self {
        Self(
            style
                .split(';')
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(|token| match token.split_once('=') {
                    Some((key, value)) => (key.trim().to_string(), unescape(value.trim())),
                    None => (token.to_string(), String::new()),
                })
                .collect(),
        )
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether `name` appears as a bare token or as `shape=name`.
    pub fn has_shape(&self, name: &str) -> bool {
        self.0
            .iter()
            .any(|(k, v)| (k == name && v.is_empty()) || (k == "shape" && v == name))
    }

    pub fn is_html(&self) -> bool {
        self.get("html") == Some("1")
    }
}

fn escape(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace(';', "%3B")
        .replace('=', "%3D")
}

fn unescape(value: &str) -> String {
    value
        .replace("%3B", ";")
        .replace("%3D", "=")
        .replace("%25", "%")
}

fn push_tag(style: &mut String, key: &str, value: &str) {
    style.push_str(key);
    style.push('=');
    style.push_str(&escape(value));
    style.push(';');
}

/// Base look of a vertex of `kind`.
fn vertex_base(kind: ElementKind) -> &'static str {
    match kind {
        ElementKind::Package | ElementKind::LibraryPackage => {
            "shape=folder;tabWidth=80;tabHeight=20;tabPosition=left;verticalAlign=top;align=left;spacingLeft=8;fillColor=#f5f5f5;strokeColor=#666666;"
        }
        ElementKind::PortDef | ElementKind::PortUsage => {
            "rounded=0;fillColor=#ffe6cc;strokeColor=#d79b00;"
        }
        ElementKind::ConnectionUsage
        | ElementKind::InterfaceUsage
        | ElementKind::FlowUsage
        | ElementKind::BindingUsage
        | ElementKind::AllocationUsage
        | ElementKind::Dependency
        | ElementKind::TransitionUsage => "rhombus;fillColor=#f8cecc;strokeColor=#b85450;",
        ElementKind::UseCaseDef | ElementKind::UseCaseUsage => {
            "ellipse;fillColor=#e1d5e7;strokeColor=#9673a6;"
        }
        kind if kind.is_verification() => "shape=hexagon;perimeter=hexagonPerimeter2;fillColor=#fff2cc;strokeColor=#d6b656;",
        kind if kind.is_requirement() => "shape=note;size=14;fillColor=#d5e8d4;strokeColor=#82b366;",
        ElementKind::ActionDef
        | ElementKind::ActionUsage
        | ElementKind::StateDef
        | ElementKind::StateUsage
        | ElementKind::CalcDef
        | ElementKind::CalcUsage => "rounded=1;arcSize=40;fillColor=#e1d5e7;strokeColor=#9673a6;",
        kind if kind.is_definition() => "rounded=0;fillColor=#dae8fc;strokeColor=#6c8ebf;",
        ElementKind::Unknown => "rounded=0;dashed=1;fillColor=#ffffff;strokeColor=#999999;",
        _ => "rounded=1;fillColor=#dae8fc;strokeColor=#6c8ebf;",
    }
}

/// Complete style of the vertex for `node`, metadata tags included.
pub fn vertex_style(node: &SemanticNode) -> String {
    let mut style = String::from("whiteSpace=wrap;");
    style.push_str(vertex_base(node.kind));
    push_tag(&mut style, KIND_KEY, node.kind.as_str());
    if !node.sysml_path.is_empty() {
        push_tag(&mut style, PATH_KEY, &node.sysml_path);
    }
    if let Some(source) = &node.source_ref {
        push_tag(&mut style, SOURCE_KEY, source);
    }
    if let Some(target) = &node.target_ref {
        push_tag(&mut style, TARGET_KEY, target);
    }
    style
}

/// Complete style of an edge of `kind`.
pub fn edge_style(kind: EdgeKind) -> String {
    let base = match kind {
        EdgeKind::Contains => "endArrow=none;dashed=1;opacity=15;strokeColor=#999999;",
        EdgeKind::Connection => "endArrow=none;strokeWidth=2;strokeColor=#6c8ebf;",
        EdgeKind::Typing => "endArrow=block;endFill=0;dashed=1;strokeColor=#666666;",
        EdgeKind::Satisfy => "endArrow=open;dashed=1;strokeColor=#82b366;",
        EdgeKind::Verify => "endArrow=open;dashed=1;strokeColor=#d6b656;",
        EdgeKind::Flow => "endArrow=classic;strokeColor=#d79b00;",
        EdgeKind::Binding => "endArrow=none;dashed=1;dashPattern=1 2;strokeColor=#333333;",
        EdgeKind::Transition => "endArrow=classic;curved=1;strokeColor=#9673a6;",
        EdgeKind::Dependency => "endArrow=open;dashed=1;strokeColor=#333333;",
        EdgeKind::Allocation => "endArrow=open;dashed=1;strokeColor=#b85450;",
    };
    let mut style = String::from("edgeStyle=orthogonalEdgeStyle;rounded=0;html=0;");
    style.push_str(base);
    push_tag(&mut style, KIND_KEY, kind.as_str());
    style
}

// ============================================================================
// KIND INFERENCE
// ============================================================================

/// Kinds ordered by descending keyword length, so `part def` wins over `part`.
static KINDS_BY_KEYWORD: LazyLock<Vec<ElementKind>> = LazyLock::new(|| {
    let mut kinds: Vec<ElementKind> = ElementKind::ALL
        .iter()
        .copied()
        .filter(|k| k.is_semantic() && !k.keyword().is_empty())
        .collect();
    kinds.sort_by_key(|k| std::cmp::Reverse(k.keyword().len()));
    kinds
});

/// Kind whose keyword prefixes `label` as whole words.
pub fn kind_from_label(label: &str) -> Option<ElementKind> {
    KINDS_BY_KEYWORD
        .iter()
        .copied()
        .find(|kind| strip_keyword(label, kind.keyword()).is_some())
}

/// Kind guessed from the shape of a style.
pub fn kind_from_shape(style: &Style) -> Option<ElementKind> {
    let shapes: &[(&str, ElementKind)] = &[
        ("rhombus", ElementKind::ConnectionUsage),
        ("ellipse", ElementKind::UseCaseUsage),
        ("folder", ElementKind::Package),
        ("swimlane", ElementKind::Package),
        ("note", ElementKind::RequirementUsage),
        ("document", ElementKind::RequirementUsage),
        ("hexagon", ElementKind::VerificationUsage),
    ];
    shapes
        .iter()
        .find(|(shape, _)| style.has_shape(shape))
        .map(|(_, kind)| *kind)
}

/// Strip `keyword` (whole words, case-insensitive) from the front of `label`.
fn strip_keyword<'a>(label: &'a str, keyword: &str) -> Option<&'a str> {
    let mut rest = label.trim_start();
    for word in keyword.split(' ') {
        let head = rest.get(..word.len())?;
        if !head.eq_ignore_ascii_case(word) {
            return None;
        }
        rest = &rest[word.len()..];
        if rest.chars().next().is_some_and(crate::base::is_word_character) {
            return None;
        }
        rest = rest.trim_start();
    }
    Some(rest)
}

// ============================================================================
// LABELS
// ============================================================================

/// Visible label of a vertex: `keyword name[ : Type]`.
pub fn vertex_label(node: &SemanticNode) -> String {
    let keyword = node.kind.keyword();
    let mut label = if keyword.is_empty() {
        node.name.clone()
    } else {
        format!("{keyword} {}", node.name)
    };
    if let Some(type_name) = &node.type_name {
        label.push_str(" : ");
        label.push_str(type_name);
    }
    label
}

/// Visible label of an edge: the label alone for connections, otherwise a
/// `«kind»` stereotype followed by the label.
pub fn edge_label(kind: EdgeKind, label: Option<&str>) -> String {
    match (kind, label) {
        (EdgeKind::Contains, _) => String::new(),
        (EdgeKind::Connection, label) => label.unwrap_or_default().to_string(),
        (kind, Some(label)) => format!("«{kind}» {label}"),
        (kind, None) => format!("«{kind}»"),
    }
}

/// Name and optional type read back from a vertex label.
pub fn split_vertex_label(label: &str, kind: ElementKind) -> (String, Option<String>) {
    let rest = strip_keyword(label, kind.keyword())
        .filter(|_| !kind.keyword().is_empty())
        .or_else(|| kind_from_label(label).and_then(|k| strip_keyword(label, k.keyword())))
        .unwrap_or(label);
    match rest.split_once(':') {
        Some((name, type_name)) => {
            let type_name = type_name.trim();
            (
                unquote(name.trim()),
                (!type_name.is_empty()).then(|| type_name.to_string()),
            )
        }
        None => (unquote(rest.trim()), None),
    }
}

fn unquote(name: &str) -> String {
    name.strip_prefix('\'')
        .and_then(|n| n.strip_suffix('\''))
        .unwrap_or(name)
        .to_string()
}

static STEREOTYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:«|<<)\s*([A-Za-z_]+)\s*(?:»|>>)\s*").expect("valid pattern"));

/// Split a leading `«kind»` / `<<kind>>` stereotype off an edge label.
pub fn split_stereotype(label: &str) -> (Option<&str>, &str) {
    match STEREOTYPE.captures(label) {
        Some(captures) => {
            let whole = captures.get(0).map_or(0, |m| m.end());
            (captures.get(1).map(|m| m.as_str()), label[whole..].trim())
        }
        None => (None, label.trim()),
    }
}

pub fn is_placeholder(name: &str) -> bool {
    let name = name.trim();
    name.is_empty() || PLACEHOLDER_NAMES.iter().any(|p| p.eq_ignore_ascii_case(name))
}

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>|</?(?:div|p)\b[^>]*>|<[^>]+>").expect("valid pattern"));

/// Plain text of an HTML label: tags dropped, breaks become spaces,
/// entities decoded, whitespace collapsed.
pub fn clean_html_label(label: &str) -> String {
    let text = TAG.replace_all(label, |caps: &regex::Captures<'_>| {
        let tag = caps.get(0).map_or("", |m| m.as_str()).to_ascii_lowercase();
        if tag.starts_with("<br") || tag.starts_with("</div") || tag.starts_with("</p") {
            " "
        } else {
            ""
        }
    });
    let text = text.replace("&nbsp;", "&#160;");
    let decoded = quick_xml::escape::unescape(&text).unwrap_or(Cow::Borrowed(text.as_str()));
    decoded
        .chars()
        .filter(|c| *c != '\u{200b}')
        .map(|c| if c == '\u{a0}' { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
