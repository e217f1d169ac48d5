//! Parse error type
//!
//! Every failure inside the parser is converted into a [`ParseError`]
//! carrying a message, a categorized code, and the source location.

use crate::base::Span;
use thiserror::Error;

use super::codes::ErrorCode;

/// A recovered syntax error with its location.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message} at {span}")]
pub struct ParseError {
    /// Human-readable error message
    pub message: String,
    /// Source location
    pub span: Span,
    /// Categorized error code
    pub code: ErrorCode,
    /// Optional suggestion for fixing the error
    pub hint: Option<String>,
}

impl ParseError {
    /// Create a new parse error
    pub fn new(code: ErrorCode, message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            code,
            hint: None,
        }
    }

    /// Create an error with the code's default message
    pub fn from_code(code: ErrorCode, span: Span) -> Self {
        Self::new(code, code.default_message(), span)
    }

    /// Add a hint to this error
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
