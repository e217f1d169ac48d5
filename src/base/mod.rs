//! Foundation types for the sync engine.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`Position`], [`Span`] - Line/column/offset locations for syntax nodes
//! - [`LineIndex`] - Offset to line/column conversion
//! - Stable FNV-1a hashing for content-derived ids
//!
//! This module has NO dependencies on other crate modules.

pub mod hash;
mod position;

pub use hash::{content_hash, stable_id};
pub use position::{LineIndex, Position, Span};

// Re-export text-size types for convenience
pub use text_size::{TextRange, TextSize};

/// Check if a character can continue an identifier.
#[inline]
pub fn is_word_character(c: char) -> bool {
    c == '_' || unicode_ident::is_xid_continue(c)
}

/// Check if a string lexes as a single plain identifier token.
pub fn is_plain_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {
            chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        }
        _ => false,
    }
}

/// Render a name for source text, quoting it when it is not a plain identifier.
pub fn quote_name(name: &str) -> String {
    if is_plain_identifier(name) {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\'', "\\'"))
    }
}

/// Render a qualified reference (`A::B`, `a.b`), quoting each segment as needed.
pub fn quote_reference(reference: &str) -> String {
    reference
        .split("::")
        .map(|segment| {
            segment
                .split('.')
                .map(quote_name)
                .collect::<Vec<_>>()
                .join(".")
        })
        .collect::<Vec<_>>()
        .join("::")
}

#[cfg(test)]
mod tests;
