//! Structural validation of diagram markup.

use super::reader::read_cells;
use super::writer::{LAYER_CELL, ROOT_CELL};
use serde::{Deserialize, Serialize};

/// Result of [`validate_drawio`]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiagramValidation {
    pub valid: bool,
    pub issues: Vec<String>,
}

/// Check that `xml` is a complete diagram: root and layer cells present,
/// at least one shape and at least one connector.
///
/// A diagram of shapes without connectors is reported as incomplete.
pub fn validate_drawio(xml: &str) -> DiagramValidation {
    let cells = match read_cells(xml) {
        Ok(cells) => cells,
        Err(error) => {
            return DiagramValidation {
                valid: false,
                issues: vec![error.to_string()],
            };
        }
    };

    let mut issues = Vec::new();
    if !cells.iter().any(|c| c.id == ROOT_CELL) {
        issues.push(format!("missing root cell \"{ROOT_CELL}\""));
    }
    if !cells
        .iter()
        .any(|c| c.id == LAYER_CELL && c.parent.as_deref() == Some(ROOT_CELL))
    {
        issues.push(format!(
            "missing layer cell \"{LAYER_CELL}\" with parent \"{ROOT_CELL}\""
        ));
    }
    if !cells.iter().any(|c| c.vertex) {
        issues.push("no vertex cells".to_string());
    }
    if !cells.iter().any(|c| c.edge) {
        issues.push("no edge cells".to_string());
    }

    if !issues.is_empty() {
        tracing::debug!(?issues, "diagram failed validation");
    }
    DiagramValidation {
        valid: issues.is_empty(),
        issues,
    }
}
