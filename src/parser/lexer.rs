//! Logos-based lexer and the parser's scanning cursor
//!
//! The logos tokenizer keeps trivia (whitespace and comments) in the token
//! stream so that every byte of the source maps to exactly one token. The
//! [`Cursor`] layered on top skips trivia on demand and offers the scanning
//! primitives the recursive-descent parser needs.

use crate::base::{LineIndex, Position, Span};
use logos::Logos;
use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

/// A token with its kind, text, and position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub offset: TextSize,
}

impl Token<'_> {
    /// Offset just past the token
    pub fn end(&self) -> TextSize {
        self.offset + TextSize::of(self.text)
    }

    pub fn is_trivia(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Whitespace | TokenKind::LineComment | TokenKind::BlockComment
        )
    }

    /// Whether the token can serve as a (possibly quoted) name
    pub fn is_name(&self) -> bool {
        matches!(self.kind, TokenKind::Ident | TokenKind::QuotedName)
    }

    pub fn is_ident(&self, text: &str) -> bool {
        self.kind == TokenKind::Ident && self.text == text
    }
}

/// Lexer wrapping the logos-generated tokenizer
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, LogosToken>,
    offset: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: LogosToken::lexer(input),
            offset: 0,
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let logos_token = self.inner.next()?;
        let text = self.inner.slice();
        let offset = TextSize::new(self.offset);
        self.offset += text.len() as u32;

        let kind = match logos_token {
            Ok(t) => t.into(),
            Err(()) => TokenKind::Error,
        };

        Some(Token { kind, text, offset })
    }
}

/// Tokenize an entire string into a Vec
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

/// Token kinds seen by the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Whitespace,
    LineComment,
    BlockComment,
    Ident,
    QuotedName,
    Integer,
    Decimal,
    String,
    ColonColonGt,
    ColonGtGt,
    ColonGt,
    ColonColon,
    ColonEq,
    DotDot,
    Arrow,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Semicolon,
    Colon,
    Dot,
    Comma,
    Eq,
    Lt,
    Gt,
    At,
    Hash,
    Star,
    Plus,
    Minus,
    Slash,
    Percent,
    Caret,
    Tilde,
    Question,
    Bang,
    Amp,
    Pipe,
    /// Input logos could not tokenize
    Error,
}

/// Logos token enum - maps to [`TokenKind`]
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
pub enum LogosToken {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[regex(r"/\*[^*]*\*+([^/*][^*]*\*+)*/")]
    BlockComment,

    // =========================================================================
    // LITERALS
    // =========================================================================
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    #[regex(r"'([^'\\]|\\.)*'")]
    QuotedName,

    #[regex(r"[0-9]+")]
    Integer,

    #[regex(r"[0-9]*\.[0-9]+([eE][+-]?[0-9]+)?")]
    Decimal,

    #[regex(r#""([^"\\]|\\.)*""#)]
    String,

    // =========================================================================
    // MULTI-CHARACTER PUNCTUATION (must come before single-char)
    // =========================================================================
    #[token("::>")]
    ColonColonGt,

    #[token(":>>")]
    ColonGtGt,

    #[token(":>")]
    ColonGt,

    #[token("::")]
    ColonColon,

    #[token(":=")]
    ColonEq,

    #[token("..")]
    DotDot,

    #[token("->")]
    Arrow,

    // =========================================================================
    // SINGLE-CHARACTER PUNCTUATION
    // =========================================================================
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("@")]
    At,
    #[token("#")]
    Hash,
    #[token("*")]
    Star,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token("?")]
    Question,
    #[token("!")]
    Bang,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
}

impl From<LogosToken> for TokenKind {
    fn from(token: LogosToken) -> Self {
        match token {
            LogosToken::Whitespace => Self::Whitespace,
            LogosToken::LineComment => Self::LineComment,
            LogosToken::BlockComment => Self::BlockComment,
            LogosToken::Ident => Self::Ident,
            LogosToken::QuotedName => Self::QuotedName,
            LogosToken::Integer => Self::Integer,
            LogosToken::Decimal => Self::Decimal,
            LogosToken::String => Self::String,
            LogosToken::ColonColonGt => Self::ColonColonGt,
            LogosToken::ColonGtGt => Self::ColonGtGt,
            LogosToken::ColonGt => Self::ColonGt,
            LogosToken::ColonColon => Self::ColonColon,
            LogosToken::ColonEq => Self::ColonEq,
            LogosToken::DotDot => Self::DotDot,
            LogosToken::Arrow => Self::Arrow,
            LogosToken::LBrace => Self::LBrace,
            LogosToken::RBrace => Self::RBrace,
            LogosToken::LBracket => Self::LBracket,
            LogosToken::RBracket => Self::RBracket,
            LogosToken::LParen => Self::LParen,
            LogosToken::RParen => Self::RParen,
            LogosToken::Semicolon => Self::Semicolon,
            LogosToken::Colon => Self::Colon,
            LogosToken::Dot => Self::Dot,
            LogosToken::Comma => Self::Comma,
            LogosToken::Eq => Self::Eq,
            LogosToken::Lt => Self::Lt,
            LogosToken::Gt => Self::Gt,
            LogosToken::At => Self::At,
            LogosToken::Hash => Self::Hash,
            LogosToken::Star => Self::Star,
            LogosToken::Plus => Self::Plus,
            LogosToken::Minus => Self::Minus,
            LogosToken::Slash => Self::Slash,
            LogosToken::Percent => Self::Percent,
            LogosToken::Caret => Self::Caret,
            LogosToken::Tilde => Self::Tilde,
            LogosToken::Question => Self::Question,
            LogosToken::Bang => Self::Bang,
            LogosToken::Amp => Self::Amp,
            LogosToken::Pipe => Self::Pipe,
        }
    }
}

// ============================================================================
// CURSOR
// ============================================================================

/// Stateful scanning cursor over an immutable source string.
///
/// Trivia is skipped lazily by [`Cursor::peek`] and [`Cursor::bump`]. A block
/// comment directly after the `doc`/`comment` keyword (optionally after the
/// comment's name) is *not* trivia: it is surfaced as a significant token so
/// the parser can keep documentation text.
pub struct Cursor<'a> {
    source: &'a str,
    tokens: Vec<Token<'a>>,
    pos: usize,
    line_index: LineIndex,
    /// End offset of the last consumed significant token
    last_end: TextSize,
    /// Set after `doc`/`comment` until the comment body is reached
    doc_pending: bool,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: tokenize(source),
            pos: 0,
            line_index: LineIndex::new(source),
            last_end: TextSize::new(0),
            doc_pending: false,
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    // ── Trivia & lookahead ──────────────────────────────────────────

    /// Skip whitespace and comments, honoring the doc-comment exception.
    pub fn skip_trivia(&mut self) {
        while let Some(tok) = self.tokens.get(self.pos) {
            match tok.kind {
                TokenKind::Whitespace | TokenKind::LineComment => self.pos += 1,
                TokenKind::BlockComment if !self.doc_pending => self.pos += 1,
                _ => break,
            }
        }
    }

    /// Next significant token without consuming it.
    pub fn peek(&mut self) -> Option<Token<'a>> {
        self.skip_trivia();
        self.tokens.get(self.pos).copied()
    }

    /// The `n`-th significant token ahead (0 = [`Cursor::peek`]).
    pub fn peek_nth(&mut self, n: usize) -> Option<Token<'a>> {
        self.skip_trivia();
        let mut seen = 0;
        let mut idx = self.pos;
        while let Some(tok) = self.tokens.get(idx) {
            let significant = !tok.is_trivia()
                || (idx == self.pos && tok.kind == TokenKind::BlockComment);
            if significant {
                if seen == n {
                    return Some(*tok);
                }
                seen += 1;
            }
            idx += 1;
        }
        None
    }

    pub fn at(&mut self, kind: TokenKind) -> bool {
        self.peek().is_some_and(|t| t.kind == kind)
    }

    pub fn at_name(&mut self) -> bool {
        self.peek().is_some_and(|t| t.is_name())
    }

    pub fn is_eof(&mut self) -> bool {
        self.peek().is_none()
    }

    /// Consume the next significant token.
    pub fn bump(&mut self) -> Option<Token<'a>> {
        self.skip_trivia();
        let tok = *self.tokens.get(self.pos)?;
        self.pos += 1;
        self.last_end = tok.end();
        self.doc_pending = match tok.kind {
            TokenKind::Ident if tok.text == "doc" || tok.text == "comment" => true,
            TokenKind::Ident
            | TokenKind::QuotedName
            | TokenKind::Lt
            | TokenKind::Gt
            | TokenKind::Comma
            | TokenKind::ColonColon
            | TokenKind::Dot => self.doc_pending,
            _ => false,
        };
        Some(tok)
    }

    /// Stop surfacing block comments once a doc/comment construct is done.
    pub fn end_doc(&mut self) {
        self.doc_pending = false;
    }

    pub fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    // ── Keywords ────────────────────────────────────────────────────

    /// Whether the upcoming tokens spell `keyword`, which may span several
    /// words (`"connection def"`). Each word must be a whole identifier
    /// token, so `partition` never matches `part`.
    pub fn at_keyword(&mut self, keyword: &str) -> bool {
        keyword
            .split_whitespace()
            .enumerate()
            .all(|(i, word)| self.peek_nth(i).is_some_and(|t| t.is_ident(word)))
    }

    /// Consume `keyword` if present.
    pub fn eat_keyword(&mut self, keyword: &str) -> bool {
        if !self.at_keyword(keyword) {
            return false;
        }
        for _ in keyword.split_whitespace() {
            self.bump();
        }
        true
    }

    // ── Names ───────────────────────────────────────────────────────

    /// Read an identifier or a `'quoted name'`.
    pub fn read_name(&mut self) -> Option<SmolStr> {
        let tok = self.peek()?;
        match tok.kind {
            TokenKind::Ident => {
                self.bump();
                Some(SmolStr::new(tok.text))
            }
            TokenKind::QuotedName => {
                self.bump();
                Some(SmolStr::new(unquote(tok.text)))
            }
            _ => None,
        }
    }

    /// Read `A::B::C` or a feature chain `a.b.c`.
    pub fn read_qualified_name(&mut self) -> Option<SmolStr> {
        let mut name = self.read_name()?.to_string();
        loop {
            let Some(sep) = self.peek() else { break };
            let is_separator = matches!(sep.kind, TokenKind::ColonColon | TokenKind::Dot);
            if !is_separator || !self.peek_nth(1).is_some_and(|t| t.is_name()) {
                break;
            }
            self.bump();
            let Some(segment) = self.read_name() else {
                break;
            };
            name.push_str(sep.text);
            name.push_str(&segment);
        }
        Some(SmolStr::new(name))
    }

    /// Read a comma-separated list of qualified names.
    pub fn read_qualified_name_list(&mut self) -> Vec<SmolStr> {
        let mut names = Vec::new();
        while let Some(name) = self.read_qualified_name() {
            names.push(name);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        names
    }

    /// Read a short name `<R1>` / `<'1.1'>`.
    pub fn read_short_name(&mut self) -> Option<SmolStr> {
        if !self.at(TokenKind::Lt) || !self.peek_nth(1).is_some_and(|t| t.is_name()) {
            return None;
        }
        self.bump();
        let name = self.read_name();
        self.eat(TokenKind::Gt);
        name
    }

    // ── Depth-counting scanners ─────────────────────────────────────

    /// Read the raw text of a `[...]` multiplicity, skipping nested brackets.
    ///
    /// Lenient at end of input: returns whatever was scanned.
    pub fn read_multiplicity(&mut self) -> Option<String> {
        self.read_delimited(TokenKind::LBracket, TokenKind::RBracket)
    }

    /// Read the raw text of a `{...}` block, skipping nested braces.
    ///
    /// Lenient at end of input: returns whatever was scanned.
    pub fn read_braced_content(&mut self) -> Option<String> {
        self.read_delimited(TokenKind::LBrace, TokenKind::RBrace)
    }

    fn read_delimited(&mut self, open: TokenKind, close: TokenKind) -> Option<String> {
        let open_tok = self.peek()?;
        if open_tok.kind != open {
            return None;
        }
        self.bump();
        let inner_start = usize::from(open_tok.end());
        let mut inner_end = self.source.len();
        let mut depth = 1usize;
        while let Some(tok) = self.tokens.get(self.pos).copied() {
            self.pos += 1;
            if tok.kind == open {
                depth += 1;
            } else if tok.kind == close {
                depth -= 1;
                if depth == 0 {
                    inner_end = usize::from(tok.offset);
                    self.last_end = tok.end();
                    return Some(self.source[inner_start..inner_end].trim().to_string());
                }
            }
            self.last_end = tok.end();
        }
        Some(self.source[inner_start..inner_end].trim().to_string())
    }

    /// Read raw expression text up to (not including) a depth-0 `;`, `{` or
    /// `}`. Used for default values and triggers.
    pub fn read_raw_until_terminator(&mut self) -> String {
        self.read_raw_until(|_| false)
    }

    /// Like [`Cursor::read_raw_until_terminator`], additionally stopping
    /// before a depth-0 token accepted by `stop`.
    pub fn read_raw_until(&mut self, stop: impl Fn(&Token<'a>) -> bool) -> String {
        let Some(first) = self.peek() else {
            return String::new();
        };
        let start = usize::from(first.offset);
        let mut end = start;
        let mut depth = 0usize;
        while let Some(tok) = self.peek() {
            match tok.kind {
                TokenKind::Semicolon | TokenKind::LBrace | TokenKind::RBrace if depth == 0 => break,
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth = depth.saturating_sub(1)
                }
                _ if depth == 0 && stop(&tok) => break,
                _ => {}
            }
            self.bump();
            end = usize::from(tok.end());
        }
        self.source[start..end].trim().to_string()
    }

    /// Skip to the next statement boundary after a parse failure.
    ///
    /// Stops after a top-level `;`, after the `}` that balances a `{` opened
    /// while skipping, or before an unmatched `}` (which belongs to the
    /// enclosing body).
    pub fn skip_to_recovery_point(&mut self) {
        let mut depth = 0usize;
        while let Some(tok) = self.peek() {
            match tok.kind {
                TokenKind::Semicolon if depth == 0 => {
                    self.bump();
                    return;
                }
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                    if depth == 0 {
                        self.bump();
                        return;
                    }
                }
                _ => {}
            }
            self.bump();
        }
    }

    // ── Positions ───────────────────────────────────────────────────

    /// Offset of the next significant token, or end of input.
    pub fn offset(&mut self) -> TextSize {
        match self.peek() {
            Some(tok) => tok.offset,
            None => TextSize::of(self.source),
        }
    }

    /// End offset of the last consumed token.
    pub fn last_end(&self) -> TextSize {
        self.last_end
    }

    pub fn position(&self, offset: TextSize) -> Position {
        self.line_index.position(offset)
    }

    /// Span from `start` to the end of the last consumed token.
    pub fn span_from(&self, start: TextSize) -> Span {
        let end = self.last_end.max(start);
        self.line_index.span(TextRange::new(start, end))
    }

    /// Zero-width span at the next significant token.
    pub fn here(&mut self) -> Span {
        let offset = self.offset();
        let pos = self.position(offset);
        Span::new(pos, pos)
    }

    /// Span of a single token.
    pub fn token_span(&self, tok: &Token<'_>) -> Span {
        self.line_index.span(TextRange::new(tok.offset, tok.end()))
    }
}

/// Strip the quotes of a `'quoted name'` and resolve `\'` escapes.
pub fn unquote(text: &str) -> String {
    let inner = text
        .strip_prefix('\'')
        .and_then(|t| t.strip_suffix('\''))
        .unwrap_or(text);
    inner.replace("\\'", "'").replace("\\\\", "\\")
}

/// Strip `/*` `*/` delimiters and leading `*` gutters from a block comment.
pub fn comment_body(text: &str) -> String {
    let inner = text
        .strip_prefix("/*")
        .and_then(|t| t.strip_suffix("*/"))
        .unwrap_or(text);
    inner
        .lines()
        .map(|line| {
            let trimmed = line.trim();
            trimmed.strip_prefix('*').map(str::trim_start).unwrap_or(trimmed)
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
