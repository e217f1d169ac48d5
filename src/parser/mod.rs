//! Recursive-descent parser for the SysML-like textual notation
//!
//! ## Architecture
//!
//! ```text
//! Source Text
//!     ↓
//! Lexer (logos) → Tokens, trivia retained
//!     ↓
//! Cursor → keyword lookahead, name/multiplicity/body scanners, recovery
//!     ↓
//! Parser → SourceFile of SyntaxNodes + ParseErrors
//! ```
//!
//! Parsing never fails: every construct-level error is collected and the
//! parser resynchronizes at the next `;` or balanced `}`.

#[allow(clippy::module_inception)]
mod parser;

pub mod errors;
pub mod keywords;
mod lexer;

pub use errors::{ErrorCode, ParseError};
pub use lexer::{Cursor, Lexer, Token, TokenKind, tokenize};
pub use parser::{Parse, parse};

#[cfg(test)]
mod tests;
