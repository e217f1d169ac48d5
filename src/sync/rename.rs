//! Renaming a declaration inside its own source snippet.
//!
//! Only the declaration header (text before the body or terminator) is
//! searched, so members that mention the old name are left alone. Matching
//! tries, in order: the kind's keyword followed by the name, a `:>>` /
//! `redefines` clause, the name as a whole word, and finally the name in
//! quotes.

use crate::base::{is_plain_identifier, quote_name};
use crate::syntax::ElementKind;
use regex::Regex;
use std::ops::Range;

/// `snippet` with the declared name `from` replaced by `to`.
///
/// `None` when no pattern finds the name, for unknown constructs, and for
/// anonymous declarations.
pub(super) fn rename_in(snippet: &str, kind: ElementKind, from: &str, to: &str) -> Option<String> {
    if from.is_empty() || kind == ElementKind::Unknown {
        return None;
    }
    let header_end = snippet.find(['{', ';']).unwrap_or(snippet.len());
    let header = &snippet[..header_end];

    let range = find_name(header, kind, from)?;
    let mut result = snippet.to_string();
    result.replace_range(range, &quote_name(to));
    Some(result)
}

fn find_name(header: &str, kind: ElementKind, name: &str) -> Option<Range<usize>> {
    let name_pattern = name_pattern(name);
    let keyword = kind
        .keyword()
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");

    let patterns = [
        format!(r"\b{keyword}\s+(?:<[^>]*>\s*)?(?P<name>{name_pattern})"),
        format!(r"(?::>>|\bredefines)\s*(?P<name>{name_pattern})"),
        format!(r"(?P<name>{name_pattern})"),
    ];
    for pattern in &patterns {
        let Ok(regex) = Regex::new(pattern) else {
            continue;
        };
        if let Some(found) = regex.captures(header).and_then(|c| c.name("name")) {
            return Some(found.range());
        }
    }
    tracing::debug!(name, %kind, "declaration name not found");
    None
}

/// Regex for a declared name as it may appear in source: bare (when plain)
/// or quoted.
fn name_pattern(name: &str) -> String {
    let quoted = format!("'{}'", regex::escape(&name.replace('\'', "\\'")));
    if is_plain_identifier(name) {
        format!(r"\b{}\b|{quoted}", regex::escape(name))
    } else {
        quoted
    }
}
