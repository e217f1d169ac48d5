//! Error code definitions for parser diagnostics
//!
//! Error codes follow a naming convention: E{category}{number}
//! - E01xx: Lexical errors (invalid tokens)
//! - E02xx: Structural errors (braces, semicolons)
//! - E03xx: Declaration errors (definitions, usages, relations)
//! - E09xx: Generic/fallback errors

use std::fmt;

/// Error codes for parser diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // E01xx: Lexical errors
    // =========================================================================
    /// Invalid or unexpected character in source
    E0101,
    /// Unterminated quoted name or string
    E0102,

    // =========================================================================
    // E02xx: Structural errors
    // =========================================================================
    /// Missing semicolon
    E0201,
    /// Unclosed brace `{`
    E0202,
    /// Unexpected closing delimiter
    E0205,

    // =========================================================================
    // E03xx: Declaration errors
    // =========================================================================
    /// Missing identifier/name
    E0301,
    /// Missing type annotation after `:`
    E0305,
    /// Missing body (neither `;` nor `{`)
    E0307,
    /// Malformed relation statement (`connect`, `flow`, `bind`, ...)
    E0310,

    // =========================================================================
    // E09xx: Generic errors
    // =========================================================================
    /// Unexpected token
    E0901,
}

impl ErrorCode {
    /// Get the string code (e.g., "E0201")
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::E0101 => "E0101",
            Self::E0102 => "E0102",
            Self::E0201 => "E0201",
            Self::E0202 => "E0202",
            Self::E0205 => "E0205",
            Self::E0301 => "E0301",
            Self::E0305 => "E0305",
            Self::E0307 => "E0307",
            Self::E0310 => "E0310",
            Self::E0901 => "E0901",
        }
    }

    /// Default message used when no specific message is supplied
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::E0101 => "invalid character",
            Self::E0102 => "unterminated quoted name",
            Self::E0201 => "expected ';'",
            Self::E0202 => "unclosed '{'",
            Self::E0205 => "unexpected closing delimiter",
            Self::E0301 => "expected a name",
            Self::E0305 => "expected a type after ':'",
            Self::E0307 => "expected ';' or '{'",
            Self::E0310 => "malformed relation statement",
            Self::E0901 => "unexpected token",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
