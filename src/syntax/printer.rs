//! Canonical text rendering of syntax trees.
//!
//! The printer emits one declaration per line with bodies indented per
//! [`PrintOptions`]. Reparsing its output yields a tree with the same kinds,
//! names and nesting. Untouched source formatting is not preserved; callers
//! that need that splice individual statements instead (see the sync
//! applicator).

use super::ast::{NodeDetail, SourceFile, SyntaxNode};
use super::kind::ElementKind;
use crate::base::{quote_name, quote_reference};
use std::fmt::Write;

/// Rendering options
#[derive(Debug, Clone)]
pub struct PrintOptions {
    /// Number of spaces per indentation level (or tab width if using tabs)
    pub tab_size: usize,
    /// Use spaces for indentation (false = use tabs)
    pub insert_spaces: bool,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            tab_size: 4,
            insert_spaces: true,
        }
    }
}

impl PrintOptions {
    pub fn with_tab_size(mut self, tab_size: usize) -> Self {
        self.tab_size = tab_size;
        self
    }

    pub fn with_tabs(mut self) -> Self {
        self.insert_spaces = false;
        self
    }

    /// Generate indentation string for the given level
    pub fn indent(&self, level: usize) -> String {
        if self.insert_spaces {
            " ".repeat(self.tab_size * level)
        } else {
            "\t".repeat(level)
        }
    }
}

/// Render a whole file.
pub fn print(file: &SourceFile, options: &PrintOptions) -> String {
    let mut out = String::new();
    for member in &file.members {
        print_node_into(&mut out, member, 0, options);
    }
    out
}

/// Render one node (and its body) at `level`, terminated by a newline.
pub fn print_node(node: &SyntaxNode, level: usize, options: &PrintOptions) -> String {
    let mut out = String::new();
    print_node_into(&mut out, node, level, options);
    out
}

fn print_node_into(out: &mut String, node: &SyntaxNode, level: usize, options: &PrintOptions) {
    let indent = options.indent(level);
    match &node.detail {
        NodeDetail::Unknown(unknown) => {
            let _ = writeln!(out, "{indent}{}", unknown.raw.trim());
            return;
        }
        NodeDetail::Doc(doc) => {
            let _ = writeln!(out, "{indent}{} /* {} */", declaration(node), doc.text);
            return;
        }
        NodeDetail::Import(_) | NodeDetail::Alias(_) => {
            let _ = writeln!(out, "{indent}{};", declaration(node));
            return;
        }
        _ => {}
    }

    if node.children.is_empty() {
        let _ = writeln!(out, "{indent}{};", declaration(node));
    } else {
        let _ = writeln!(out, "{indent}{} {{", declaration(node));
        for child in &node.children {
            print_node_into(out, child, level + 1, options);
        }
        let _ = writeln!(out, "{indent}}}");
    }
}

/// Declaration header of a node, without terminator or body.
pub fn declaration(node: &SyntaxNode) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(visibility) = node.visibility {
        parts.push(visibility.as_str().to_string());
    }

    match &node.detail {
        NodeDetail::Definition(def) => {
            if def.is_abstract {
                parts.push("abstract".into());
            }
            parts.push(node.kind.keyword().into());
            push_names(&mut parts, node);
            if !def.specializes.is_empty() {
                parts.push(format!(":> {}", reference_list(&def.specializes)));
            }
        }
        NodeDetail::Usage(usage) => {
            if let Some(direction) = usage.direction {
                parts.push(direction.as_str().into());
            }
            if usage.is_abstract {
                parts.push("abstract".into());
            }
            if usage.is_ref {
                parts.push("ref".into());
            }
            parts.push(node.kind.keyword().into());
            push_names(&mut parts, node);
            if let Some(type_name) = &usage.type_name {
                parts.push(format!(": {}", quote_reference(type_name)));
            }
            if let Some(multiplicity) = &usage.multiplicity {
                // Multiplicity binds to the preceding token.
                if let Some(last) = parts.last_mut() {
                    let _ = write!(last, "[{multiplicity}]");
                }
            }
            if !usage.specializes.is_empty() {
                parts.push(format!(":> {}", reference_list(&usage.specializes)));
            }
            if !usage.redefines.is_empty() {
                parts.push(format!(":>> {}", reference_list(&usage.redefines)));
            }
            if let Some(value) = &usage.default_value {
                parts.push(format!("= {value}"));
            }
        }
        NodeDetail::Relation(relation) => {
            let source = quote_reference(&relation.source);
            let target = quote_reference(&relation.target);
            match node.kind {
                ElementKind::Satisfy | ElementKind::Verify => {
                    parts.push(node.kind.keyword().into());
                    parts.push(target);
                    if !relation.source.is_empty() {
                        parts.push(format!("by {source}"));
                    }
                }
                ElementKind::FlowUsage => {
                    parts.push("flow".into());
                    push_names(&mut parts, node);
                    if let Some(via) = &relation.via {
                        parts.push(format!("of {}", quote_reference(via)));
                    }
                    parts.push(format!("from {source} to {target}"));
                }
                ElementKind::Dependency => {
                    parts.push("dependency".into());
                    push_names(&mut parts, node);
                    parts.push(format!("from {source} to {target}"));
                }
                kind => {
                    let (statement, separator) = relation_phrasing(kind);
                    if !node.is_anonymous()
                        || relation.via.is_some()
                        || kind == ElementKind::InterfaceUsage
                    {
                        parts.push(kind.keyword().into());
                        push_names(&mut parts, node);
                        if let Some(via) = &relation.via {
                            parts.push(format!(": {}", quote_reference(via)));
                        }
                    }
                    parts.push(format!("{statement} {source} {separator} {target}"));
                }
            }
        }
        NodeDetail::Transition(transition) => {
            parts.push("transition".into());
            push_names(&mut parts, node);
            parts.push(format!("first {}", quote_reference(&transition.first)));
            if let Some(trigger) = &transition.trigger {
                parts.push(format!("accept {trigger}"));
            }
            parts.push(format!("then {}", quote_reference(&transition.then)));
        }
        NodeDetail::Import(import) => {
            parts.push("import".into());
            let mut target = quote_reference(&import.target);
            if import.recursive {
                target.push_str("::**");
            } else if import.wildcard {
                target.push_str("::*");
            }
            parts.push(target);
        }
        NodeDetail::Alias(alias) => {
            parts.push("alias".into());
            push_names(&mut parts, node);
            parts.push(format!("for {}", quote_reference(&alias.target)));
        }
        NodeDetail::Doc(doc) => {
            parts.push(node.kind.keyword().into());
            push_names(&mut parts, node);
            if !doc.about.is_empty() {
                parts.push(format!("about {}", reference_list(&doc.about)));
            }
        }
        NodeDetail::Unknown(unknown) => parts.push(unknown.raw.trim().to_string()),
        NodeDetail::None => {
            parts.push(node.kind.keyword().into());
            push_names(&mut parts, node);
        }
    }

    parts.retain(|p| !p.is_empty());
    parts.join(" ")
}

/// Statement keyword and endpoint separator of anonymous relation usages.
pub fn relation_phrasing(kind: ElementKind) -> (&'static str, &'static str) {
    match kind {
        ElementKind::BindingUsage => ("bind", "="),
        ElementKind::AllocationUsage => ("allocate", "to"),
        ElementKind::FlowUsage => ("flow from", "to"),
        ElementKind::Dependency => ("dependency from", "to"),
        _ => ("connect", "to"),
    }
}

fn push_names(parts: &mut Vec<String>, node: &SyntaxNode) {
    if let Some(short_name) = &node.short_name {
        parts.push(format!("<{}>", quote_name(short_name)));
    }
    if !node.name.is_empty() {
        parts.push(quote_name(&node.name));
    }
}

fn reference_list(names: &[smol_str::SmolStr]) -> String {
    names
        .iter()
        .map(|n| quote_reference(n))
        .collect::<Vec<_>>()
        .join(", ")
}
