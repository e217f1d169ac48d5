//! Reading the JSON object out of a free-form generator reply.
//!
//! Replies may wrap the object in prose or a fenced block; only the first
//! balanced object outside string literals is parsed.

use serde_json::Value;

/// Source text and remarks pulled out of a generator reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub sysml: String,
    pub notes: Vec<String>,
}

/// Parse the first balanced `{...}` object in `text`.
///
/// Surrounding prose and code fences are ignored. Returns `None` when there
/// is no object, it is not valid JSON, or its `sysml` field is missing or
/// blank. Non-string notes are skipped.
pub fn extract_generation(text: &str) -> Option<Generation> {
    let object = first_object(text)?;
    let value: Value = match serde_json::from_str(object) {
        Ok(value) => value,
        Err(error) => {
            tracing::debug!(%error, "generator reply object is not JSON");
            return None;
        }
    };

    let sysml = value.get("sysml")?.as_str()?;
    if sysml.trim().is_empty() {
        return None;
    }
    let notes = match value.get("notes") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(note)) => vec![note.clone()],
        _ => Vec::new(),
    };
    Some(Generation {
        sysml: sysml.to_string(),
        notes,
    })
}

/// Slice from the first `{` to its matching `}`, skipping braces inside
/// JSON strings.
fn first_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}
