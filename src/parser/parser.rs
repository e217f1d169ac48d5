//! Recursive descent parser for the SysML-like notation
//!
//! Builds a [`SourceFile`] of [`SyntaxNode`]s from the token cursor.
//! Every failure inside a construct is recorded as a [`ParseError`] and
//! parsing resumes at the next statement boundary, so [`parse`] always
//! returns a (possibly partial) tree.

use super::errors::{ErrorCode, ParseError};
use super::keywords::{
    self, DEFINITION_KEYWORDS, IGNORED_PREFIXES, PACKAGE_KEYWORDS, USAGE_KEYWORDS,
    VISIBILITY_KEYWORDS,
};
use super::lexer::{Cursor, Token, TokenKind, comment_body};
use crate::syntax::{
    AliasDetail, DefinitionDetail, Direction, DocDetail, ElementKind, ImportDetail, NodeDetail,
    RelationDetail, SourceFile, SyntaxNode, TransitionDetail, UnknownDetail, UsageDetail,
    Visibility,
};
use smol_str::SmolStr;
use text_size::TextSize;

/// Parse result containing the tree and any recovered errors
#[derive(Debug, Clone, Default)]
pub struct Parse {
    pub file: SourceFile,
    pub errors: Vec<ParseError>,
}

impl Parse {
    /// Check if parsing succeeded without errors
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse source text into a syntax tree.
pub fn parse(input: &str) -> Parse {
    let mut parser = Parser::new(input);
    let members = parser.parse_source_file();
    tracing::trace!(
        members = members.len(),
        errors = parser.errors.len(),
        "parsed source file"
    );
    Parse {
        file: SourceFile::new(members),
        errors: parser.errors,
    }
}

type ParseResult<T> = Result<T, ParseError>;

/// Modifiers collected before the declaration keyword
#[derive(Debug, Clone, Copy, Default)]
struct Prefix {
    visibility: Option<Visibility>,
    is_abstract: bool,
    direction: Option<Direction>,
    is_ref: bool,
}

/// The parser state
struct Parser<'a> {
    cursor: Cursor<'a>,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            cursor: Cursor::new(input),
            errors: Vec::new(),
        }
    }

    // =========================================================================
    // Members & bodies
    // =========================================================================

    fn parse_source_file(&mut self) -> Vec<SyntaxNode> {
        let mut members = Vec::new();
        while let Some(tok) = self.cursor.peek() {
            if tok.kind == TokenKind::RBrace {
                let span = self.cursor.token_span(&tok);
                self.errors
                    .push(ParseError::new(ErrorCode::E0205, "unexpected '}'", span));
                self.cursor.bump();
                continue;
            }
            if let Some(node) = self.parse_member(None) {
                members.push(node);
            }
        }
        members
    }

    /// Parse one member, recovering from any error inside it.
    fn parse_member(&mut self, owner: Option<ElementKind>) -> Option<SyntaxNode> {
        let start = self.cursor.offset();
        match self.parse_element(start, owner) {
            Ok(node) => node,
            Err(err) => {
                tracing::debug!(code = %err.code, at = %err.span, "{}; recovering", err.message);
                self.errors.push(err);
                self.cursor.skip_to_recovery_point();
                None
            }
        }
    }

    fn parse_element(
        &mut self,
        start: TextSize,
        owner: Option<ElementKind>,
    ) -> ParseResult<Option<SyntaxNode>> {
        if self.cursor.eat(TokenKind::Semicolon) {
            return Ok(None);
        }
        let prefix = self.parse_prefix();
        let mut node = self.parse_declaration(start, owner, prefix)?;
        node.visibility = prefix.visibility;
        node.span = Some(self.cursor.span_from(start));
        Ok(Some(node))
    }

    /// `;` or `{ members }`. An unclosed body is reported but its partial
    /// children are kept.
    fn parse_body(&mut self, owner: ElementKind) -> ParseResult<Vec<SyntaxNode>> {
        if self.cursor.eat(TokenKind::Semicolon) {
            return Ok(Vec::new());
        }
        let Some(open) = self.cursor.peek().filter(|t| t.kind == TokenKind::LBrace) else {
            return Err(self.error_here(ErrorCode::E0307));
        };
        self.cursor.bump();

        let mut children = Vec::new();
        loop {
            match self.cursor.peek() {
                None => {
                    let err = ParseError::new(
                        ErrorCode::E0202,
                        format!("unclosed '{{' in {owner} body"),
                        self.cursor.token_span(&open),
                    )
                    .with_hint("add '}' to close the body");
                    tracing::debug!(code = %err.code, at = %err.span, "{}", err.message);
                    self.errors.push(err);
                    break;
                }
                Some(tok) if tok.kind == TokenKind::RBrace => {
                    self.cursor.bump();
                    break;
                }
                Some(_) => {
                    if let Some(child) = self.parse_member(Some(owner)) {
                        children.push(child);
                    }
                }
            }
        }
        Ok(children)
    }

    fn parse_prefix(&mut self) -> Prefix {
        let mut prefix = Prefix::default();
        loop {
            // A modifier is only a modifier when something follows it.
            if !self.cursor.peek_nth(1).is_some_and(|t| t.is_name()) {
                break;
            }
            if let Some(vis) = VISIBILITY_KEYWORDS
                .iter()
                .find(|kw| self.cursor.at_keyword(kw))
            {
                prefix.visibility = match *vis {
                    "private" => Some(Visibility::Private),
                    "protected" => Some(Visibility::Protected),
                    _ => Some(Visibility::Public),
                };
            } else if self.cursor.at_keyword("abstract") {
                prefix.is_abstract = true;
            } else if self.cursor.at_keyword("ref") {
                prefix.is_ref = true;
            } else if self.cursor.at_keyword("in") {
                prefix.direction = Some(Direction::In);
            } else if self.cursor.at_keyword("out") {
                prefix.direction = Some(Direction::Out);
            } else if self.cursor.at_keyword("inout") {
                prefix.direction = Some(Direction::InOut);
            } else if !IGNORED_PREFIXES.iter().any(|kw| self.cursor.at_keyword(kw)) {
                break;
            }
            self.cursor.bump();
        }
        prefix
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    fn parse_declaration(
        &mut self,
        start: TextSize,
        owner: Option<ElementKind>,
        prefix: Prefix,
    ) -> ParseResult<SyntaxNode> {
        let cursor = &mut self.cursor;
        if let Some((kw, kind)) = keywords::lookup(PACKAGE_KEYWORDS, |k| cursor.at_keyword(k)) {
            self.cursor.eat_keyword(kw);
            return self.parse_package(kind);
        }

        if self.cursor.eat_keyword("import") {
            return self.parse_import();
        }
        if self.cursor.eat_keyword("alias") {
            return self.parse_alias();
        }
        if self.cursor.eat_keyword("doc") {
            return Ok(self.parse_doc(ElementKind::Doc));
        }
        if self.cursor.eat_keyword("comment") {
            return Ok(self.parse_doc(ElementKind::Comment));
        }

        let cursor = &mut self.cursor;
        if let Some((kw, kind)) = keywords::lookup(DEFINITION_KEYWORDS, |k| cursor.at_keyword(k)) {
            self.cursor.eat_keyword(kw);
            return self.parse_definition(kind, prefix);
        }

        if self.cursor.eat_keyword("connect") {
            let (source, target) = self.parse_connect_ends()?;
            return self.finish_relation(
                ElementKind::ConnectionUsage,
                SmolStr::default(),
                source,
                target,
                None,
            );
        }
        if self.cursor.eat_keyword("flow") {
            return self.parse_flow();
        }
        if self.cursor.eat_keyword("bind") {
            let (source, target) = self.parse_bind_ends()?;
            return self.finish_relation(
                ElementKind::BindingUsage,
                SmolStr::default(),
                source,
                target,
                None,
            );
        }
        if self.cursor.eat_keyword("binding") {
            return self.parse_binding();
        }
        if self.cursor.eat_keyword("allocate") {
            let (source, target) = self.parse_pair("to")?;
            return self.finish_relation(
                ElementKind::AllocationUsage,
                SmolStr::default(),
                source,
                target,
                None,
            );
        }
        if self.cursor.eat_keyword("dependency") {
            return self.parse_dependency();
        }
        if self.cursor.eat_keyword("satisfy") {
            return self.parse_requirement_relation(ElementKind::Satisfy);
        }
        if self.cursor.eat_keyword("verify") {
            return self.parse_requirement_relation(ElementKind::Verify);
        }
        if self.cursor.eat_keyword("transition") {
            return self.parse_transition();
        }

        let cursor = &mut self.cursor;
        if let Some((kw, kind)) = keywords::lookup(USAGE_KEYWORDS, |k| cursor.at_keyword(k)) {
            self.cursor.eat_keyword(kw);
            return self.parse_usage(kind, prefix);
        }

        if owner == Some(ElementKind::EnumDef) && self.at_bare_enum_value() {
            return self.parse_usage(ElementKind::EnumValue, prefix);
        }

        match self.cursor.peek() {
            Some(tok) if tok.kind == TokenKind::Ident => self.parse_unknown(start),
            Some(tok) if tok.kind == TokenKind::Error => {
                let code = if tok.text.starts_with('\'') || tok.text.starts_with('"') {
                    ErrorCode::E0102
                } else {
                    ErrorCode::E0101
                };
                Err(ParseError::new(
                    code,
                    format!("{} '{}'", code.default_message(), tok.text),
                    self.cursor.token_span(&tok),
                ))
            }
            Some(tok) => Err(ParseError::new(
                ErrorCode::E0901,
                format!("unexpected '{}'", tok.text),
                self.cursor.token_span(&tok),
            )),
            None => Err(self.error_here(ErrorCode::E0901)),
        }
    }

    /// `red;` / `red = 1;` inside an enumeration definition.
    fn at_bare_enum_value(&mut self) -> bool {
        self.cursor.at_name()
            && self.cursor.peek_nth(1).is_some_and(|t| {
                matches!(
                    t.kind,
                    TokenKind::Semicolon | TokenKind::Eq | TokenKind::ColonEq | TokenKind::LBrace
                )
            })
    }

    // =========================================================================
    // Namespaces & declarations
    // =========================================================================

    fn parse_package(&mut self, kind: ElementKind) -> ParseResult<SyntaxNode> {
        let short_name = self.cursor.read_short_name();
        let name = self.expect_name("expected a package name")?;
        let children = self.parse_body(kind)?;
        let mut node = SyntaxNode::new(kind, name).with_children(children);
        node.short_name = short_name;
        Ok(node)
    }

    fn parse_definition(&mut self, kind: ElementKind, prefix: Prefix) -> ParseResult<SyntaxNode> {
        let short_name = self.cursor.read_short_name();
        let name = self.expect_name("expected a definition name")?;
        let mut detail = DefinitionDetail {
            is_abstract: prefix.is_abstract,
            specializes: Vec::new(),
        };
        while self.cursor.eat(TokenKind::ColonGt) || self.cursor.eat_keyword("specializes") {
            detail.specializes.extend(self.expect_name_list()?);
        }
        let children = self.parse_body(kind)?;
        let mut node = SyntaxNode::new(kind, name)
            .with_detail(NodeDetail::Definition(detail))
            .with_children(children);
        node.short_name = short_name;
        Ok(node)
    }

    fn parse_usage(&mut self, kind: ElementKind, prefix: Prefix) -> ParseResult<SyntaxNode> {
        let short_name = self.cursor.read_short_name();
        let mut name = if self.cursor.at_keyword("connect") || self.cursor.at_keyword("allocate") {
            SmolStr::default()
        } else {
            self.cursor.read_name().unwrap_or_default()
        };
        let mut usage = UsageDetail {
            direction: prefix.direction,
            is_abstract: prefix.is_abstract,
            is_ref: prefix.is_ref,
            ..UsageDetail::default()
        };
        self.parse_usage_tail(&mut usage)?;

        let ends = match kind {
            ElementKind::ConnectionUsage | ElementKind::InterfaceUsage
                if self.cursor.eat_keyword("connect") =>
            {
                Some(self.parse_connect_ends()?)
            }
            ElementKind::AllocationUsage if self.cursor.eat_keyword("allocate") => {
                Some(self.parse_pair("to")?)
            }
            _ => None,
        };

        if self.cursor.eat(TokenKind::Eq) || self.cursor.eat(TokenKind::ColonEq) {
            usage.default_value = Some(self.cursor.read_raw_until_terminator());
        } else if self.cursor.eat_keyword("default") {
            let _ = self.cursor.eat(TokenKind::Eq) || self.cursor.eat(TokenKind::ColonEq);
            usage.default_value = Some(self.cursor.read_raw_until_terminator());
        }

        // `attribute :>> mass = 10;` is implicitly named after what it redefines.
        if name.is_empty() {
            if let Some(redefined) = usage.redefines.first() {
                name = last_segment(redefined);
            }
        }

        let children = self.parse_body(kind)?;
        let detail = match ends {
            Some((source, target)) => NodeDetail::Relation(RelationDetail {
                source,
                target,
                via: usage.type_name,
            }),
            None => NodeDetail::Usage(usage),
        };
        let mut node = SyntaxNode::new(kind, name)
            .with_detail(detail)
            .with_children(children);
        node.short_name = short_name;
        Ok(node)
    }

    /// Typing, specialization, redefinition and multiplicity, in any order.
    fn parse_usage_tail(&mut self, usage: &mut UsageDetail) -> ParseResult<()> {
        while let Some(tok) = self.cursor.peek() {
            match tok.kind {
                TokenKind::Colon => {
                    self.cursor.bump();
                    usage.type_name = Some(self.expect_type()?);
                    while self.cursor.eat(TokenKind::Comma) {
                        usage.specializes.push(self.expect_type()?);
                    }
                }
                TokenKind::ColonGt => {
                    self.cursor.bump();
                    usage.specializes.extend(self.expect_name_list()?);
                }
                TokenKind::ColonGtGt => {
                    self.cursor.bump();
                    usage.redefines.extend(self.expect_name_list()?);
                }
                TokenKind::LBracket => {
                    usage.multiplicity = self.cursor.read_multiplicity();
                }
                TokenKind::Ident => {
                    if self.cursor.eat_keyword("defined by") || self.cursor.eat_keyword("typed by") {
                        usage.type_name = Some(self.expect_type()?);
                    } else if self.cursor.eat_keyword("subsets") {
                        usage.specializes.extend(self.expect_name_list()?);
                    } else if self.cursor.eat_keyword("redefines") {
                        usage.redefines.extend(self.expect_name_list()?);
                    } else if !(self.cursor.eat_keyword("ordered")
                        || self.cursor.eat_keyword("nonunique"))
                    {
                        break;
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn parse_import(&mut self) -> ParseResult<SyntaxNode> {
        self.cursor.eat_keyword("all");
        let target = self.expect_name("expected an import target")?;
        let mut detail = ImportDetail {
            target,
            ..ImportDetail::default()
        };
        if self.cursor.eat(TokenKind::ColonColon) {
            if !self.cursor.eat(TokenKind::Star) {
                return Err(self.error_here_msg(ErrorCode::E0301, "expected '*' or '**' after '::'"));
            }
            detail.wildcard = true;
            detail.recursive = self.cursor.eat(TokenKind::Star);
        }
        // Filter conditions are not modeled.
        let _ = self.cursor.read_multiplicity();
        self.expect_semicolon()?;
        Ok(SyntaxNode::new(ElementKind::Import, "").with_detail(NodeDetail::Import(detail)))
    }

    fn parse_alias(&mut self) -> ParseResult<SyntaxNode> {
        let short_name = self.cursor.read_short_name();
        let name = self.expect_name("expected an alias name")?;
        self.expect_keyword("for", ErrorCode::E0901)?;
        let target = self.expect_reference()?;
        self.expect_semicolon()?;
        let mut node = SyntaxNode::new(ElementKind::Alias, name)
            .with_detail(NodeDetail::Alias(AliasDetail { target }));
        node.short_name = short_name;
        Ok(node)
    }

    /// `doc [<id>] [name] /* text */` and `comment [name] [about A, B] /* text */`.
    fn parse_doc(&mut self, kind: ElementKind) -> SyntaxNode {
        let short_name = self.cursor.read_short_name();
        let name = if self.cursor.at_keyword("about") {
            SmolStr::default()
        } else {
            self.cursor.read_name().unwrap_or_default()
        };
        let about = if kind == ElementKind::Comment && self.cursor.eat_keyword("about") {
            self.cursor.read_qualified_name_list()
        } else {
            Vec::new()
        };
        let text = match self.cursor.peek() {
            Some(tok) if tok.kind == TokenKind::BlockComment => {
                self.cursor.bump();
                comment_body(tok.text)
            }
            _ => String::new(),
        };
        self.cursor.end_doc();
        self.cursor.eat(TokenKind::Semicolon);
        let mut node =
            SyntaxNode::new(kind, name).with_detail(NodeDetail::Doc(DocDetail { text, about }));
        node.short_name = short_name;
        node
    }

    /// Any other leading identifier: keep the raw text, skip the body.
    fn parse_unknown(&mut self, start: TextSize) -> ParseResult<SyntaxNode> {
        let keyword = self
            .cursor
            .bump()
            .map(|t| SmolStr::new(t.text))
            .unwrap_or_default();
        let _ = self.cursor.read_raw_until_terminator();
        if self.cursor.at(TokenKind::LBrace) {
            let _ = self.cursor.read_braced_content();
            self.cursor.eat(TokenKind::Semicolon);
        } else if !self.cursor.eat(TokenKind::Semicolon) {
            let err = self.error_here(ErrorCode::E0201);
            self.errors.push(err);
        }
        let source = self.cursor.source();
        let raw = source
            .get(usize::from(start)..usize::from(self.cursor.last_end()))
            .unwrap_or_default()
            .to_string();
        tracing::trace!(keyword = %keyword, "unrecognized construct kept as Unknown");
        Ok(SyntaxNode::new(ElementKind::Unknown, keyword)
            .with_detail(NodeDetail::Unknown(UnknownDetail { raw })))
    }

    // =========================================================================
    // Relation statements
    // =========================================================================

    fn finish_relation(
        &mut self,
        kind: ElementKind,
        name: SmolStr,
        source: SmolStr,
        target: SmolStr,
        via: Option<SmolStr>,
    ) -> ParseResult<SyntaxNode> {
        let children = self.parse_body(kind)?;
        Ok(SyntaxNode::new(kind, name)
            .with_detail(NodeDetail::Relation(RelationDetail { source, target, via }))
            .with_children(children))
    }

    /// `A to B` or `(A, B)`
    fn parse_connect_ends(&mut self) -> ParseResult<(SmolStr, SmolStr)> {
        if self.cursor.eat(TokenKind::LParen) {
            let source = self.expect_reference()?;
            self.expect_token(TokenKind::Comma, "expected ',' between connection ends")?;
            let target = self.expect_reference()?;
            self.expect_token(TokenKind::RParen, "expected ')'")?;
            return Ok((source, target));
        }
        self.parse_pair("to")
    }

    /// `A <separator> B`
    fn parse_pair(&mut self, separator: &str) -> ParseResult<(SmolStr, SmolStr)> {
        let source = self.expect_reference()?;
        self.expect_keyword(separator, ErrorCode::E0310)?;
        let target = self.expect_reference()?;
        Ok((source, target))
    }

    /// `A = B`
    fn parse_bind_ends(&mut self) -> ParseResult<(SmolStr, SmolStr)> {
        let source = self.expect_reference()?;
        self.expect_token(TokenKind::Eq, "expected '=' in binding")?;
        let target = self.expect_reference()?;
        Ok((source, target))
    }

    /// `binding [name] [: T] bind A = B`
    fn parse_binding(&mut self) -> ParseResult<SyntaxNode> {
        let name = if self.cursor.at_keyword("bind") {
            SmolStr::default()
        } else {
            self.cursor.read_name().unwrap_or_default()
        };
        let via = if self.cursor.eat(TokenKind::Colon) {
            Some(self.expect_type()?)
        } else {
            None
        };
        self.expect_keyword("bind", ErrorCode::E0310)?;
        let (source, target) = self.parse_bind_ends()?;
        self.finish_relation(ElementKind::BindingUsage, name, source, target, via)
    }

    /// `flow [name] [: T] [of T] [from] A to B`
    fn parse_flow(&mut self) -> ParseResult<SyntaxNode> {
        let mut name = SmolStr::default();
        let mut source = None;
        if !self.cursor.at_keyword("from")
            && !self.cursor.at_keyword("of")
            && !self.cursor.at(TokenKind::Colon)
        {
            let first = self.expect_reference()?;
            if self.cursor.at_keyword("to") {
                source = Some(first);
            } else {
                name = first;
            }
        }
        let mut via = None;
        let source = match source {
            Some(source) => source,
            None => {
                while self.cursor.eat(TokenKind::Colon) || self.cursor.eat_keyword("of") {
                    via = Some(self.expect_type()?);
                }
                self.cursor.eat_keyword("from");
                self.expect_reference()?
            }
        };
        self.expect_keyword("to", ErrorCode::E0310)?;
        let target = self.expect_reference()?;
        self.finish_relation(ElementKind::FlowUsage, name, source, target, via)
    }

    /// `dependency [name] [from] A to B`
    fn parse_dependency(&mut self) -> ParseResult<SyntaxNode> {
        let mut name = SmolStr::default();
        let source = if self.cursor.eat_keyword("from") {
            self.expect_reference()?
        } else {
            let first = self.expect_reference()?;
            if self.cursor.at_keyword("to") || self.cursor.at(TokenKind::Comma) {
                first
            } else {
                name = first;
                self.cursor.eat_keyword("from");
                self.expect_reference()?
            }
        };
        // Additional clients/suppliers are not modeled.
        while self.cursor.eat(TokenKind::Comma) {
            self.expect_reference()?;
        }
        self.expect_keyword("to", ErrorCode::E0310)?;
        let target = self.expect_reference()?;
        while self.cursor.eat(TokenKind::Comma) {
            self.expect_reference()?;
        }
        self.finish_relation(ElementKind::Dependency, name, source, target, None)
    }

    /// `satisfy [requirement] X [by Y]` / `verify [requirement] X [by Y]`
    fn parse_requirement_relation(&mut self, kind: ElementKind) -> ParseResult<SyntaxNode> {
        self.cursor.eat_keyword("requirement");
        let target = self.expect_reference()?;
        let source = if self.cursor.eat_keyword("by") {
            self.expect_reference()?
        } else {
            SmolStr::default()
        };
        self.finish_relation(kind, SmolStr::default(), source, target, None)
    }

    /// `transition [name] first A [accept T] [if G] [do E] then B`
    fn parse_transition(&mut self) -> ParseResult<SyntaxNode> {
        let name = if self.cursor.at_keyword("first") {
            SmolStr::default()
        } else {
            self.cursor.read_name().unwrap_or_default()
        };
        self.expect_keyword("first", ErrorCode::E0310)?;
        let first = self.expect_reference()?;

        let stop = |t: &Token<'_>| {
            t.is_ident("then") || t.is_ident("if") || t.is_ident("do")
        };
        let mut trigger = None;
        if self.cursor.eat_keyword("accept") {
            trigger = Some(self.cursor.read_raw_until(stop));
        }
        if self.cursor.eat_keyword("if") {
            let _ = self.cursor.read_raw_until(stop);
        }
        if self.cursor.eat_keyword("do") {
            let _ = self.cursor.read_raw_until(stop);
        }

        self.expect_keyword("then", ErrorCode::E0310)?;
        let then = self.expect_reference()?;
        let children = self.parse_body(ElementKind::TransitionUsage)?;
        Ok(SyntaxNode::new(ElementKind::TransitionUsage, name)
            .with_detail(NodeDetail::Transition(TransitionDetail {
                first,
                then,
                trigger,
            }))
            .with_children(children))
    }

    // =========================================================================
    // Expectations
    // =========================================================================

    fn error_here(&mut self, code: ErrorCode) -> ParseError {
        let found = self.cursor.peek().map(|t| t.text).unwrap_or("end of input");
        let message = format!("{}, found '{}'", code.default_message(), found);
        ParseError::new(code, message, self.cursor.here())
    }

    fn error_here_msg(&mut self, code: ErrorCode, message: &str) -> ParseError {
        ParseError::new(code, message, self.cursor.here())
    }

    fn expect_name(&mut self, message: &str) -> ParseResult<SmolStr> {
        match self.cursor.read_qualified_name() {
            Some(name) => Ok(name),
            None => Err(self.error_here_msg(ErrorCode::E0301, message)),
        }
    }

    fn expect_type(&mut self) -> ParseResult<SmolStr> {
        match self.cursor.read_qualified_name() {
            Some(name) => Ok(name),
            None => Err(self.error_here(ErrorCode::E0305)),
        }
    }

    fn expect_reference(&mut self) -> ParseResult<SmolStr> {
        match self.cursor.read_qualified_name() {
            Some(name) => Ok(name),
            None => Err(self.error_here_msg(ErrorCode::E0310, "expected an element reference")),
        }
    }

    fn expect_name_list(&mut self) -> ParseResult<Vec<SmolStr>> {
        let names = self.cursor.read_qualified_name_list();
        if names.is_empty() {
            return Err(self.error_here_msg(ErrorCode::E0301, "expected a name"));
        }
        Ok(names)
    }

    fn expect_keyword(&mut self, keyword: &str, code: ErrorCode) -> ParseResult<()> {
        if self.cursor.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(self.error_here_msg(code, &format!("expected '{keyword}'")))
        }
    }

    fn expect_token(&mut self, kind: TokenKind, message: &str) -> ParseResult<()> {
        if self.cursor.eat(kind) {
            Ok(())
        } else {
            Err(self.error_here_msg(ErrorCode::E0310, message))
        }
    }

    fn expect_semicolon(&mut self) -> ParseResult<()> {
        if self.cursor.eat(TokenKind::Semicolon) {
            Ok(())
        } else {
            Err(self.error_here(ErrorCode::E0201))
        }
    }
}

/// Last segment of a qualified name or feature chain.
fn last_segment(name: &str) -> SmolStr {
    SmolStr::new(name.rsplit([':', '.']).next().unwrap_or(name))
}
