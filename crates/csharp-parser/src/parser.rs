//! Recursive descent parser for the C# subset.
//!
//! The parser never gives up on a file. Statements and members it cannot make
//! sense of are skipped up to a synchronization point and kept as `Unknown`
//! nodes, so the rest of the file still produces a usable tree.

use crate::ast::*;
use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::{interpolation_holes, Lexer, Token, TokenKind};
use crate::{ParseOptions, ParseResult};
use offset_map::{ByteOffset, Span};
use smol_str::SmolStr;
use text_size::TextSize;

/// Parser state that can be rolled back after a failed speculative parse.
#[derive(Debug, Clone, Copy)]
struct Checkpoint {
    pos: usize,
    errors: usize,
    last_end: ByteOffset,
}

/// The C# parser.
pub struct Parser<'src> {
    /// The source being parsed.
    source: &'src str,
    /// The token stream (swapped out while parsing interpolation holes).
    tokens: Vec<Token>,
    /// Current position in the token stream.
    pos: usize,
    /// Parse errors collected during parsing.
    errors: Vec<ParseError>,
    /// EOF token for when we're past the end.
    eof_token: Token,
    /// End of the last consumed token.
    last_end: ByteOffset,
    /// Next node id to hand out.
    next_id: u32,
}

impl<'src> Parser<'src> {
    /// Creates a new parser.
    pub fn new(source: &'src str, options: &ParseOptions) -> Self {
        let mut lexer = Lexer::new(source, &options.defines);
        let tokens: Vec<Token> = lexer.by_ref().collect();
        let errors = lexer.take_errors();
        let eof_token = Token {
            kind: TokenKind::Eof,
            span: Span::empty(TextSize::from(source.len() as u32)),
        };
        Self {
            source,
            tokens,
            pos: 0,
            errors,
            eof_token,
            last_end: TextSize::from(0),
            next_id: 0,
        }
    }

    /// Parses the source into a compilation unit.
    pub fn parse(mut self) -> ParseResult {
        let members = self.parse_members(false, None);
        let unit = CompilationUnit {
            members,
            span: Span::from_usize(0, self.source.len()),
        };
        ParseResult {
            unit,
            errors: self.errors,
        }
    }

    // === Token helpers ===

    /// Returns the current token.
    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof_token)
    }

    /// Returns the current token kind.
    fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    /// Returns the kind of the token `n` positions ahead.
    fn peek_kind(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map_or(TokenKind::Eof, |token| token.kind)
    }

    fn text(&self, span: Span) -> &'src str {
        &self.source[span.start_usize()..span.end_usize()]
    }

    /// Returns the text of the current token.
    fn current_text(&self) -> &'src str {
        self.text(self.current().span)
    }

    /// Checks for a contextual keyword such as `yield` or `where`.
    fn check_contextual(&self, word: &str) -> bool {
        self.check(TokenKind::Ident) && self.current_text() == word
    }

    /// Returns true if the token `n` ahead touches the one after it (`?.`, `>>`).
    fn adjacent(&self, n: usize) -> bool {
        match (self.tokens.get(self.pos + n), self.tokens.get(self.pos + n + 1)) {
            (Some(a), Some(b)) => a.span.end == b.span.start,
            _ => false,
        }
    }

    /// Start offset of the current token.
    fn start(&self) -> ByteOffset {
        self.current().span.start
    }

    /// Advances to the next token. Never moves past EOF.
    fn advance(&mut self) {
        if let Some(token) = self.tokens.get(self.pos) {
            if token.kind != TokenKind::Eof {
                self.last_end = token.span.end;
                self.pos += 1;
            }
        }
    }

    /// Checks if the current token matches the given kind.
    fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    /// Advances if the current token matches, returns true if matched.
    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expects the current token to be the given kind, reports error if not.
    fn expect(&mut self, kind: TokenKind) -> bool {
        if self.eat(kind) {
            true
        } else {
            self.error_expected(kind.name());
            false
        }
    }

    /// Reports an error at the current position.
    fn error(&mut self, kind: ParseErrorKind) {
        self.errors.push(ParseError::new(kind, self.current().span));
    }

    fn error_expected(&mut self, expected: &str) {
        let kind = if self.check(TokenKind::Eof) {
            ParseErrorKind::UnexpectedEof {
                expected: expected.to_string(),
            }
        } else {
            ParseErrorKind::UnexpectedToken {
                expected: expected.to_string(),
                found: format!("`{}`", self.current_text()),
            }
        };
        self.error(kind);
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            pos: self.pos,
            errors: self.errors.len(),
            last_end: self.last_end,
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.pos = checkpoint.pos;
        self.errors.truncate(checkpoint.errors);
        self.last_end = checkpoint.last_end;
    }

    /// Runs `f`, rolling the parser back if it returns `None`.
    fn speculate<T>(&mut self, f: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        let checkpoint = self.checkpoint();
        let result = f(self);
        if result.is_none() {
            self.restore(checkpoint);
        }
        result
    }

    /// Span from `start` to the end of the last consumed token.
    fn span_from(&self, start: ByteOffset) -> Span {
        Span::new(start, self.last_end.max(start))
    }

    fn alloc_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    fn make_expr(&mut self, kind: ExprKind, start: ByteOffset) -> Expr {
        Expr {
            id: self.alloc_id(),
            kind,
            span: self.span_from(start),
        }
    }

    fn parse_ident(&mut self) -> Option<Ident> {
        if !self.check(TokenKind::Ident) {
            self.error_expected("identifier");
            return None;
        }
        let span = self.current().span;
        let name = SmolStr::new(self.text(span).trim_start_matches('@'));
        self.advance();
        Some(Ident { name, span })
    }

    /// Skips a balanced `(...)`, `[...]` or `{...}` group starting at the current token.
    fn skip_group(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.current_kind() {
                TokenKind::Eof => return,
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.advance();
                        return;
                    }
                }
                _ => {}
            }
            self.advance();
        }
    }

    /// Skips tokens (and whole groups) until one of `stops` at the current nesting level.
    fn skip_until_any(&mut self, stops: &[TokenKind]) {
        loop {
            let kind = self.current_kind();
            if kind == TokenKind::Eof || stops.contains(&kind) {
                return;
            }
            match kind {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => self.skip_group(),
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => return,
                _ => self.advance(),
            }
        }
    }

    fn skip_attributes(&mut self) {
        while self.check(TokenKind::LBracket) {
            self.skip_group();
        }
    }

    /// Index of the `)` matching the `(` at token index `open`.
    fn matching_paren(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        for (index, token) in self.tokens.iter().enumerate().skip(open) {
            match token.kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth = depth.checked_sub(1)?;
                    if depth == 0 {
                        return Some(index);
                    }
                }
                TokenKind::Eof => return None,
                _ => {}
            }
        }
        None
    }

    // === Members ===

    fn parse_members(&mut self, in_braces: bool, enclosing: Option<&SmolStr>) -> Vec<Member> {
        let mut members = Vec::new();
        loop {
            if self.check(TokenKind::Eof) || (in_braces && self.check(TokenKind::RBrace)) {
                break;
            }
            match self.parse_member(enclosing) {
                Some(member) => members.push(member),
                None => {
                    let span = self.current().span;
                    self.error_expected("member declaration");
                    self.advance();
                    members.push(Member::Unknown(span));
                }
            }
        }
        members
    }

    /// Parses one member. Returns `None` without consuming anything if the
    /// current token cannot start a member.
    fn parse_member(&mut self, enclosing: Option<&SmolStr>) -> Option<Member> {
        let start = self.start();
        let start_pos = self.pos;
        self.skip_attributes();

        match self.current_kind() {
            TokenKind::Using if enclosing.is_none() => return Some(self.parse_using_directive(start)),
            TokenKind::Namespace => return Some(self.parse_namespace(start)),
            TokenKind::Semicolon => {
                self.advance();
                return Some(Member::Unknown(self.span_from(start)));
            }
            _ => {}
        }

        let mut is_static = false;
        loop {
            let kind = self.current_kind();
            if kind.is_modifier() {
                is_static |= matches!(kind, TokenKind::Static | TokenKind::Const);
                self.advance();
            } else if (self.check_contextual("partial") || self.check_contextual("async"))
                && matches!(
                    self.peek_kind(1),
                    TokenKind::Class
                        | TokenKind::Struct
                        | TokenKind::Interface
                        | TokenKind::PredefinedType
                        | TokenKind::Ident
                )
            {
                self.advance();
            } else {
                break;
            }
        }

        match self.current_kind() {
            TokenKind::Class | TokenKind::Struct | TokenKind::Interface => {
                return Some(self.parse_type_decl(start));
            }
            TokenKind::Enum | TokenKind::Delegate => return Some(self.skip_member(start)),
            TokenKind::Event => return Some(self.parse_event(start, is_static)),
            TokenKind::Implicit | TokenKind::Explicit => {
                return Some(self.parse_conversion_operator(start, is_static));
            }
            TokenKind::Tilde => return Some(self.parse_finalizer(start)),
            TokenKind::Ident
                if self.current_text() == "record" && self.peek_kind(1) == TokenKind::Ident =>
            {
                return Some(self.skip_unsupported(start, "record declaration"));
            }
            _ => {}
        }

        if let Some(name) = enclosing {
            if self.check(TokenKind::Ident)
                && self.current_text() == name.as_str()
                && self.peek_kind(1) == TokenKind::LParen
            {
                return Some(self.parse_constructor(start));
            }
        }

        if !matches!(self.current_kind(), TokenKind::Ident | TokenKind::PredefinedType) {
            if self.pos == start_pos {
                return None;
            }
            self.error_expected("member declaration");
            return Some(self.skip_member(start));
        }

        let Some(ty) = self.speculate(Self::parse_type) else {
            self.error_expected("type");
            return Some(self.skip_member(start));
        };

        self.skip_interface_qualifier();
        match self.current_kind() {
            TokenKind::Operator => return Some(self.parse_operator(start, ty, is_static)),
            TokenKind::This => return Some(self.parse_indexer(start, ty)),
            TokenKind::Ident => {}
            _ => {
                self.error_expected("member name");
                return Some(self.skip_member(start));
            }
        }

        let name = self.parse_ident()?;
        let member = match self.current_kind() {
            TokenKind::LParen | TokenKind::Lt => {
                Member::Method(self.parse_method_rest(start, ty, name, is_static))
            }
            TokenKind::LBrace | TokenKind::FatArrow => {
                Member::Property(self.parse_property_rest(start, ty, name, is_static))
            }
            _ => {
                let errors_before = self.errors.len();
                let declaration = self.parse_declarators(ty, name);
                if !self.end_statement(errors_before) {
                    return Some(self.skip_member(start));
                }
                Member::Field(FieldDecl {
                    declaration,
                    is_static,
                    span: self.span_from(start),
                })
            }
        };
        Some(member)
    }

    /// Skips a member the tree does not model, up to its `;` or closing `}`.
    fn skip_member(&mut self, start: ByteOffset) -> Member {
        loop {
            match self.current_kind() {
                TokenKind::Eof | TokenKind::RBrace => break,
                TokenKind::Semicolon => {
                    self.advance();
                    break;
                }
                TokenKind::LBrace => {
                    self.skip_group();
                    break;
                }
                TokenKind::LParen | TokenKind::LBracket => self.skip_group(),
                _ => self.advance(),
            }
        }
        Member::Unknown(self.span_from(start))
    }

    /// Skips a member whose body the tree does not model and reports it when
    /// the body holds code.
    fn skip_unsupported(&mut self, start: ByteOffset, construct: &str) -> Member {
        let span = self.current().span;
        let member = self.skip_member(start);
        let has_body = self
            .pos
            .checked_sub(1)
            .and_then(|index| self.tokens.get(index))
            .is_some_and(|token| token.kind == TokenKind::RBrace);
        if has_body {
            self.errors.push(ParseError::new(
                ParseErrorKind::Unsupported {
                    construct: construct.to_string(),
                },
                span,
            ));
        }
        member
    }

    /// Consumes the `IFoo.` or `IFoo<T>.` prefix of an explicit interface member.
    fn skip_interface_qualifier(&mut self) {
        loop {
            let checkpoint = self.checkpoint();
            if !self.check(TokenKind::Ident) {
                return;
            }
            self.advance();
            let qualified = (!self.check(TokenKind::Lt)
                || self.parse_type_argument_list().is_some())
                && self.eat(TokenKind::Dot);
            if !qualified {
                self.restore(checkpoint);
                return;
            }
        }
    }

    /// Parses `operator +(...)` after the return type.
    fn parse_operator(
        &mut self,
        start: ByteOffset,
        return_type: TypeSyntax,
        is_static: bool,
    ) -> Member {
        let name_start = self.start();
        self.advance();
        while !matches!(
            self.current_kind(),
            TokenKind::LParen | TokenKind::LBrace | TokenKind::Semicolon | TokenKind::Eof
        ) {
            self.advance();
        }
        if !self.check(TokenKind::LParen) {
            self.error_expected("'('");
            return self.skip_member(start);
        }
        let span = self.span_from(name_start);
        let name = Ident {
            name: SmolStr::new(self.text(span)),
            span,
        };
        Member::Method(self.parse_method_rest(start, return_type, name, is_static))
    }

    /// Parses `implicit operator T(...)` or `explicit operator T(...)`.
    fn parse_conversion_operator(&mut self, start: ByteOffset, is_static: bool) -> Member {
        let name_start = self.start();
        self.advance();
        if !self.expect(TokenKind::Operator) {
            return self.skip_member(start);
        }
        let span = self.span_from(name_start);
        let Some(return_type) = self.speculate(Self::parse_type) else {
            self.error_expected("type");
            return self.skip_member(start);
        };
        let name = Ident {
            name: SmolStr::new(self.text(span)),
            span,
        };
        Member::Method(self.parse_method_rest(start, return_type, name, is_static))
    }

    fn parse_indexer(&mut self, start: ByteOffset, ty: TypeSyntax) -> Member {
        self.advance();
        let params = self.parse_parameter_list(TokenKind::LBracket, TokenKind::RBracket);
        if !matches!(self.current_kind(), TokenKind::LBrace | TokenKind::FatArrow) {
            self.error_expected("'{' or '=>'");
            return self.skip_member(start);
        }
        let (accessors, expression_body) = self.parse_accessors();
        Member::Indexer(IndexerDecl {
            ty,
            params,
            accessors,
            expression_body,
            span: self.span_from(start),
        })
    }

    fn parse_finalizer(&mut self, start: ByteOffset) -> Member {
        self.advance();
        let Some(name) = self.parse_ident() else {
            return self.skip_member(start);
        };
        self.expect(TokenKind::LParen);
        self.expect(TokenKind::RParen);
        let body = self.parse_body();
        Member::Finalizer(FinalizerDecl {
            name,
            body,
            span: self.span_from(start),
        })
    }

    /// Events with `add`/`remove` accessors parse as properties; field-like
    /// events are stepped over.
    fn parse_event(&mut self, start: ByteOffset, is_static: bool) -> Member {
        self.advance();
        let header = self.speculate(|p| {
            let ty = p.parse_type()?;
            p.skip_interface_qualifier();
            let name = p.parse_ident()?;
            p.check(TokenKind::LBrace).then_some((ty, name))
        });
        match header {
            Some((ty, name)) => {
                Member::Property(self.parse_property_rest(start, ty, name, is_static))
            }
            None => self.skip_member(start),
        }
    }

    fn parse_using_directive(&mut self, start: ByteOffset) -> Member {
        self.skip_until_any(&[TokenKind::Semicolon]);
        self.expect(TokenKind::Semicolon);
        Member::Using(self.span_from(start))
    }

    fn parse_namespace(&mut self, start: ByteOffset) -> Member {
        self.advance();
        let name_start = self.start();
        while matches!(self.current_kind(), TokenKind::Ident | TokenKind::Dot) {
            self.advance();
        }
        let name = SmolStr::new(self.text(self.span_from(name_start)));

        let members = if self.eat(TokenKind::Semicolon) {
            self.parse_members(false, None)
        } else if self.expect(TokenKind::LBrace) {
            let members = self.parse_members(true, None);
            self.expect(TokenKind::RBrace);
            members
        } else {
            return self.skip_member(start);
        };

        Member::Namespace(NamespaceDecl {
            name,
            members,
            span: self.span_from(start),
        })
    }

    fn parse_type_decl(&mut self, start: ByteOffset) -> Member {
        let kind = match self.current_kind() {
            TokenKind::Class => TypeDeclKind::Class,
            TokenKind::Struct => TypeDeclKind::Struct,
            _ => TypeDeclKind::Interface,
        };
        self.advance();
        let Some(name) = self.parse_ident() else {
            return self.skip_member(start);
        };

        // type parameters, base list and constraints
        self.skip_until_any(&[TokenKind::LBrace, TokenKind::Semicolon]);
        if !self.expect(TokenKind::LBrace) {
            return self.skip_member(start);
        }
        let members = self.parse_members(true, Some(&name.name));
        self.expect(TokenKind::RBrace);
        self.eat(TokenKind::Semicolon);

        Member::Type(TypeDecl {
            kind,
            name,
            members,
            span: self.span_from(start),
        })
    }

    fn parse_method_rest(
        &mut self,
        start: ByteOffset,
        return_type: TypeSyntax,
        name: Ident,
        is_static: bool,
    ) -> MethodDecl {
        let type_params = if self.check(TokenKind::Lt) {
            self.parse_type_parameters()
        } else {
            Vec::new()
        };
        let params = self.parse_parameters();
        if self.check_contextual("where") {
            self.skip_until_any(&[TokenKind::LBrace, TokenKind::FatArrow, TokenKind::Semicolon]);
        }
        let body = self.parse_body();

        MethodDecl {
            return_type,
            name,
            type_params,
            params,
            body,
            is_static,
            span: self.span_from(start),
        }
    }

    fn parse_type_parameters(&mut self) -> Vec<Ident> {
        self.advance();
        let mut params = Vec::new();
        loop {
            self.skip_attributes();
            if matches!(self.current_kind(), TokenKind::In | TokenKind::Out) {
                self.advance();
            }
            match self.parse_ident() {
                Some(ident) => params.push(ident),
                None => break,
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::Gt);
        params
    }

    fn parse_ref_kind(&mut self, in_parameter: bool) -> Option<RefKind> {
        let kind = match self.current_kind() {
            TokenKind::Ref => RefKind::Ref,
            TokenKind::Out => RefKind::Out,
            TokenKind::In => RefKind::In,
            TokenKind::Params if in_parameter => RefKind::Params,
            TokenKind::This if in_parameter => RefKind::This,
            _ => return None,
        };
        self.advance();
        Some(kind)
    }

    fn parse_parameters(&mut self) -> Vec<Parameter> {
        self.parse_parameter_list(TokenKind::LParen, TokenKind::RParen)
    }

    fn parse_parameter_list(&mut self, open: TokenKind, close: TokenKind) -> Vec<Parameter> {
        let mut params = Vec::new();
        if !self.expect(open) {
            return params;
        }

        while !self.check(close) && !self.check(TokenKind::Eof) {
            let start = self.start();
            self.skip_attributes();
            let modifier = self.parse_ref_kind(true);
            let parsed = self
                .speculate(Self::parse_type)
                .and_then(|ty| self.parse_ident().map(|name| (ty, name)));
            let Some((ty, name)) = parsed else {
                self.skip_until_any(&[TokenKind::Comma, close]);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
                continue;
            };
            let default = if self.eat(TokenKind::Eq) {
                Some(self.parse_expression())
            } else {
                None
            };
            params.push(Parameter {
                modifier,
                ty,
                name,
                default,
                span: self.span_from(start),
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        self.expect(close);
        params
    }

    fn parse_body(&mut self) -> Option<Body> {
        match self.current_kind() {
            TokenKind::LBrace => Some(Body::Block(self.parse_block())),
            TokenKind::FatArrow => {
                self.advance();
                let expr = self.parse_expression();
                self.expect(TokenKind::Semicolon);
                Some(Body::Expression(expr))
            }
            _ => {
                self.expect(TokenKind::Semicolon);
                None
            }
        }
    }

    fn parse_constructor(&mut self, start: ByteOffset) -> Member {
        let Some(name) = self.parse_ident() else {
            return self.skip_member(start);
        };
        let params = self.parse_parameters();

        let mut initializer_args = Vec::new();
        if self.eat(TokenKind::Colon) {
            if matches!(self.current_kind(), TokenKind::Base | TokenKind::This) {
                self.advance();
                if self.expect(TokenKind::LParen) {
                    initializer_args = self.parse_arguments(TokenKind::RParen);
                }
            } else {
                self.error_expected("'base' or 'this'");
            }
        }
        let body = self.parse_body();

        Member::Constructor(ConstructorDecl {
            name,
            params,
            initializer_args,
            body,
            span: self.span_from(start),
        })
    }

    fn parse_property_rest(
        &mut self,
        start: ByteOffset,
        ty: TypeSyntax,
        name: Ident,
        is_static: bool,
    ) -> PropertyDecl {
        let is_block = self.check(TokenKind::LBrace);
        let (accessors, expression_body) = self.parse_accessors();
        let mut initializer = None;
        if is_block && self.eat(TokenKind::Eq) {
            initializer = Some(self.parse_variable_initializer());
            self.expect(TokenKind::Semicolon);
        }

        PropertyDecl {
            ty,
            name,
            accessors,
            expression_body,
            initializer,
            is_static,
            span: self.span_from(start),
        }
    }

    /// Parses `=> expr;` or an accessor block such as `{ get; set => x = value; }`.
    fn parse_accessors(&mut self) -> (Vec<Body>, Option<Expr>) {
        let mut accessors = Vec::new();
        if self.eat(TokenKind::FatArrow) {
            let expr = self.parse_expression();
            self.expect(TokenKind::Semicolon);
            return (accessors, Some(expr));
        }

        self.advance();
        while !self.check(TokenKind::RBrace) && !self.check(TokenKind::Eof) {
            self.skip_attributes();
            while matches!(
                self.current_kind(),
                TokenKind::Private | TokenKind::Protected | TokenKind::Internal | TokenKind::Public | TokenKind::Readonly
            ) {
                self.advance();
            }
            if !self.check(TokenKind::Ident) {
                self.error_expected("accessor");
                self.skip_until_any(&[TokenKind::RBrace, TokenKind::Semicolon]);
                self.eat(TokenKind::Semicolon);
                continue;
            }
            self.advance();
            if self.check(TokenKind::Semicolon) {
                self.advance();
            } else if let Some(body) = self.parse_body() {
                accessors.push(body);
            }
        }
        self.expect(TokenKind::RBrace);
        (accessors, None)
    }

    /// Parses declarators after the type and first name have been read.
    fn parse_declarators(&mut self, ty: TypeSyntax, first: Ident) -> VariableDeclaration {
        let start = ty.span.start;
        let mut declarators = Vec::new();
        let mut name = first;
        loop {
            let initializer = if self.eat(TokenKind::Eq) {
                Some(self.parse_variable_initializer())
            } else {
                None
            };
            let span = self.span_from(name.span.start);
            declarators.push(VariableDeclarator {
                name,
                initializer,
                span,
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
            match self.parse_ident() {
                Some(next) => name = next,
                None => break,
            }
        }

        VariableDeclaration {
            id: self.alloc_id(),
            ty,
            declarators,
            span: self.span_from(start),
        }
    }

    fn parse_variable_initializer(&mut self) -> Expr {
        if self.check(TokenKind::LBrace) {
            self.parse_initializer_list()
        } else {
            self.parse_expression()
        }
    }

    /// Speculatively parses `Type name [= init], ...` (no terminator).
    fn try_parse_declaration(&mut self) -> Option<VariableDeclaration> {
        if !matches!(self.current_kind(), TokenKind::Ident | TokenKind::PredefinedType) {
            return None;
        }
        let (ty, name) = self.speculate(|p| {
            let ty = p.parse_type()?;
            let declares = p.check(TokenKind::Ident)
                && matches!(
                    p.peek_kind(1),
                    TokenKind::Eq | TokenKind::Semicolon | TokenKind::Comma
                );
            if !declares {
                return None;
            }
            let name = p.parse_ident()?;
            Some((ty, name))
        })?;
        Some(self.parse_declarators(ty, name))
    }

    // === Statements ===

    fn parse_block(&mut self) -> Block {
        let start = self.start();
        self.expect(TokenKind::LBrace);
        let mut stmts = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.check(TokenKind::Eof) {
            let before = self.pos;
            stmts.push(self.parse_statement());
            if self.pos == before {
                self.advance();
            }
        }
        self.expect(TokenKind::RBrace);
        Block {
            stmts,
            span: self.span_from(start),
        }
    }

    fn parse_statement(&mut self) -> Stmt {
        let start = self.start();
        let errors_before = self.errors.len();

        match self.current_kind() {
            TokenKind::LBrace => Stmt::Block(self.parse_block()),
            TokenKind::Semicolon => {
                self.advance();
                Stmt::Simple(self.span_from(start))
            }
            TokenKind::If => self.parse_if(start),
            TokenKind::While => {
                self.advance();
                let condition = self.parse_parenthesized();
                let body = Box::new(self.parse_statement());
                Stmt::While(WhileStmt {
                    condition,
                    body,
                    span: self.span_from(start),
                })
            }
            TokenKind::Do => self.parse_do(start),
            TokenKind::For => self.parse_for(start),
            TokenKind::Foreach => self.parse_foreach(start),
            TokenKind::Switch => self.parse_switch(start),
            TokenKind::Try => self.parse_try(start),
            TokenKind::Lock => {
                self.advance();
                let target = self.parse_parenthesized();
                let body = Box::new(self.parse_statement());
                Stmt::Lock(LockStmt {
                    target,
                    body,
                    span: self.span_from(start),
                })
            }
            TokenKind::Using if self.peek_kind(1) == TokenKind::LParen => self.parse_using(start),
            TokenKind::Using => {
                self.advance();
                self.parse_local(start, errors_before, false, true)
            }
            TokenKind::Const => {
                self.advance();
                self.parse_local(start, errors_before, true, false)
            }
            TokenKind::Return | TokenKind::Throw => {
                self.advance();
                self.parse_jump(start, errors_before)
            }
            TokenKind::Ident
                if self.current_text() == "yield"
                    && matches!(self.peek_kind(1), TokenKind::Return | TokenKind::Break) =>
            {
                self.advance();
                if self.eat(TokenKind::Return) {
                    self.parse_jump(start, errors_before)
                } else {
                    self.parse_simple(start)
                }
            }
            TokenKind::Break | TokenKind::Continue | TokenKind::Goto => self.parse_simple(start),
            TokenKind::Checked | TokenKind::Unchecked | TokenKind::Unsafe
                if self.peek_kind(1) == TokenKind::LBrace =>
            {
                self.advance();
                Stmt::Block(self.parse_block())
            }
            TokenKind::Fixed => self.recover_statement(start),
            TokenKind::Static => {
                self.advance();
                match self.try_parse_local_function(start) {
                    Some(stmt) => stmt,
                    None => {
                        self.error_expected("local function");
                        self.recover_statement(start)
                    }
                }
            }
            // labeled statement
            TokenKind::Ident if self.peek_kind(1) == TokenKind::Colon => {
                self.advance();
                self.advance();
                self.parse_statement()
            }
            _ => self.parse_declaration_or_expression(start, errors_before),
        }
    }

    /// Consumes the `;` of a simple statement. Returns false if the statement
    /// produced errors and must be recovered as unknown.
    fn end_statement(&mut self, errors_before: usize) -> bool {
        self.errors.len() == errors_before && self.expect(TokenKind::Semicolon)
    }

    /// Skips to the end of a broken statement and returns it as unknown.
    fn recover_statement(&mut self, start: ByteOffset) -> Stmt {
        let mut depth = 0usize;
        loop {
            match self.current_kind() {
                TokenKind::Eof => break,
                TokenKind::Semicolon if depth == 0 => {
                    self.advance();
                    break;
                }
                TokenKind::RBrace if depth == 0 => break,
                TokenKind::RBrace => {
                    depth -= 1;
                    self.advance();
                    if depth == 0 {
                        break;
                    }
                    continue;
                }
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket => depth = depth.saturating_sub(1),
                _ => {}
            }
            self.advance();
        }
        Stmt::Unknown(self.span_from(start))
    }

    fn parse_declaration_or_expression(&mut self, start: ByteOffset, errors_before: usize) -> Stmt {
        if let Some(declaration) = self.try_parse_declaration() {
            return self.finish_local(start, errors_before, declaration, false, false);
        }
        if let Some(stmt) = self.try_parse_local_function(start) {
            return stmt;
        }

        let expr = self.parse_expression();
        if !self.end_statement(errors_before) {
            return self.recover_statement(start);
        }
        Stmt::Expr(ExprStmt {
            expr,
            span: self.span_from(start),
        })
    }

    fn parse_local(&mut self, start: ByteOffset, errors_before: usize, is_const: bool, is_using: bool) -> Stmt {
        let parsed = self
            .speculate(Self::parse_type)
            .and_then(|ty| self.parse_ident().map(|name| (ty, name)));
        let Some((ty, name)) = parsed else {
            if self.errors.len() == errors_before {
                self.error_expected("local declaration");
            }
            return self.recover_statement(start);
        };
        let declaration = self.parse_declarators(ty, name);
        self.finish_local(start, errors_before, declaration, is_const, is_using)
    }

    fn finish_local(
        &mut self,
        start: ByteOffset,
        errors_before: usize,
        declaration: VariableDeclaration,
        is_const: bool,
        is_using: bool,
    ) -> Stmt {
        if !self.end_statement(errors_before) {
            return self.recover_statement(start);
        }
        Stmt::Local(LocalDecl {
            declaration,
            is_const,
            is_using,
            span: self.span_from(start),
        })
    }

    fn try_parse_local_function(&mut self, start: ByteOffset) -> Option<Stmt> {
        if !matches!(self.current_kind(), TokenKind::Ident | TokenKind::PredefinedType) {
            return None;
        }
        let (ty, name) = self.speculate(|p| {
            let ty = p.parse_type()?;
            let is_function = p.check(TokenKind::Ident)
                && matches!(p.peek_kind(1), TokenKind::LParen | TokenKind::Lt);
            if !is_function {
                return None;
            }
            let name = p.parse_ident()?;
            Some((ty, name))
        })?;
        Some(Stmt::LocalFunction(self.parse_method_rest(start, ty, name, false)))
    }

    fn parse_parenthesized(&mut self) -> Expr {
        self.expect(TokenKind::LParen);
        let expr = self.parse_expression();
        self.expect(TokenKind::RParen);
        expr
    }

    fn parse_if(&mut self, start: ByteOffset) -> Stmt {
        self.advance();
        let condition = self.parse_parenthesized();
        let then_branch = Box::new(self.parse_statement());
        let else_branch = if self.eat(TokenKind::Else) {
            Some(Box::new(self.parse_statement()))
        } else {
            None
        };
        Stmt::If(IfStmt {
            condition,
            then_branch,
            else_branch,
            span: self.span_from(start),
        })
    }

    fn parse_do(&mut self, start: ByteOffset) -> Stmt {
        self.advance();
        let body = Box::new(self.parse_statement());
        let body_errors = self.errors.len();
        self.expect(TokenKind::While);
        let condition = self.parse_parenthesized();
        if !self.end_statement(body_errors) {
            return self.recover_statement(start);
        }
        Stmt::DoWhile(WhileStmt {
            condition,
            body,
            span: self.span_from(start),
        })
    }

    fn parse_for(&mut self, start: ByteOffset) -> Stmt {
        self.advance();
        self.expect(TokenKind::LParen);

        let init = if self.check(TokenKind::Semicolon) {
            None
        } else if let Some(declaration) = self.try_parse_declaration() {
            Some(ForInit::Declaration(declaration))
        } else {
            Some(ForInit::Expressions(self.parse_expression_list()))
        };
        self.expect(TokenKind::Semicolon);

        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression())
        };
        self.expect(TokenKind::Semicolon);

        let iterators = if self.check(TokenKind::RParen) {
            Vec::new()
        } else {
            self.parse_expression_list()
        };
        self.expect(TokenKind::RParen);

        let body = Box::new(self.parse_statement());
        Stmt::For(ForStmt {
            init,
            condition,
            iterators,
            body,
            span: self.span_from(start),
        })
    }

    fn parse_foreach(&mut self, start: ByteOffset) -> Stmt {
        self.advance();
        self.expect(TokenKind::LParen);
        let header = self
            .speculate(Self::parse_type)
            .and_then(|ty| self.parse_ident().map(|name| (ty, name)));
        let Some((ty, name)) = header else {
            return self.recover_statement(start);
        };
        self.expect(TokenKind::In);
        let collection = self.parse_expression();
        self.expect(TokenKind::RParen);
        let body = Box::new(self.parse_statement());

        Stmt::Foreach(ForeachStmt {
            ty,
            name,
            collection,
            body,
            span: self.span_from(start),
        })
    }

    fn at_switch_label(&self) -> bool {
        self.check(TokenKind::Case)
            || (self.check(TokenKind::Default) && self.peek_kind(1) == TokenKind::Colon)
    }

    fn parse_switch(&mut self, start: ByteOffset) -> Stmt {
        self.advance();
        let subject = self.parse_parenthesized();
        if !self.expect(TokenKind::LBrace) {
            return self.recover_statement(start);
        }

        let mut sections = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.check(TokenKind::Eof) {
            let mut labels = Vec::new();
            while self.at_switch_label() {
                if self.eat(TokenKind::Default) {
                    self.advance();
                    labels.push(None);
                } else {
                    self.advance();
                    labels.push(self.parse_case_label());
                }
            }
            if labels.is_empty() {
                self.error_expected("'case' or 'default'");
                self.advance();
                continue;
            }

            let mut stmts = Vec::new();
            while !self.at_switch_label()
                && !self.check(TokenKind::RBrace)
                && !self.check(TokenKind::Eof)
            {
                let before = self.pos;
                stmts.push(self.parse_statement());
                if self.pos == before {
                    self.advance();
                }
            }
            sections.push(SwitchSection { labels, stmts });
        }
        self.expect(TokenKind::RBrace);

        Stmt::Switch(SwitchStmt {
            subject,
            sections,
            span: self.span_from(start),
        })
    }

    /// Parses a constant `case` label; patterns are skipped.
    fn parse_case_label(&mut self) -> Option<Expr> {
        let value = self.speculate(|p| {
            let errors_before = p.errors.len();
            let expr = p.parse_expression();
            (p.errors.len() == errors_before && p.eat(TokenKind::Colon)).then_some(expr)
        });
        if value.is_none() {
            self.skip_until_any(&[TokenKind::Colon]);
            self.expect(TokenKind::Colon);
        }
        value
    }

    fn parse_try(&mut self, start: ByteOffset) -> Stmt {
        self.advance();
        let block = self.parse_block();

        let mut catches = Vec::new();
        while self.eat(TokenKind::Catch) {
            let mut ty = None;
            let mut name = None;
            if self.eat(TokenKind::LParen) {
                ty = self.speculate(Self::parse_type);
                if self.check(TokenKind::Ident) {
                    name = self.parse_ident();
                }
                self.expect(TokenKind::RParen);
            }
            let filter = if self.check_contextual("when") {
                self.advance();
                Some(self.parse_parenthesized())
            } else {
                None
            };
            let block = self.parse_block();
            catches.push(CatchClause {
                ty,
                name,
                filter,
                block,
            });
        }

        let finally = if self.eat(TokenKind::Finally) {
            Some(self.parse_block())
        } else {
            None
        };

        Stmt::Try(TryStmt {
            block,
            catches,
            finally,
            span: self.span_from(start),
        })
    }

    fn parse_using(&mut self, start: ByteOffset) -> Stmt {
        self.advance();
        self.expect(TokenKind::LParen);
        let resource = match self.try_parse_declaration() {
            Some(declaration) => UsingResource::Declaration(declaration),
            None => UsingResource::Expr(self.parse_expression()),
        };
        self.expect(TokenKind::RParen);
        let body = Box::new(self.parse_statement());
        Stmt::Using(UsingStmt {
            resource,
            body,
            span: self.span_from(start),
        })
    }

    fn parse_jump(&mut self, start: ByteOffset, errors_before: usize) -> Stmt {
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression())
        };
        if !self.end_statement(errors_before) {
            return self.recover_statement(start);
        }
        Stmt::Jump(JumpStmt {
            value,
            span: self.span_from(start),
        })
    }

    /// `break;`, `continue;`, `goto x;`, `yield break;`
    fn parse_simple(&mut self, start: ByteOffset) -> Stmt {
        self.skip_until_any(&[TokenKind::Semicolon]);
        if !self.expect(TokenKind::Semicolon) {
            return self.recover_statement(start);
        }
        Stmt::Simple(self.span_from(start))
    }

    // === Expressions ===

    /// Parses a full expression, including assignments and lambdas.
    fn parse_expression(&mut self) -> Expr {
        if let Some(lambda) = self.try_parse_lambda() {
            return lambda;
        }

        let start = self.start();
        let left = self.parse_conditional();
        let op = match self.current_kind() {
            TokenKind::Eq => AssignOp::Assign,
            kind if kind.is_assignment_operator() => AssignOp::Compound,
            // `>>=` arrives as `>` followed by `>=`
            TokenKind::Gt if self.peek_kind(1) == TokenKind::GtEq && self.adjacent(0) => {
                self.advance();
                AssignOp::Compound
            }
            _ => return left,
        };
        self.advance();

        let right = if self.check(TokenKind::LBrace) {
            self.parse_initializer_list()
        } else {
            self.parse_expression()
        };
        self.make_expr(
            ExprKind::Assignment(Assignment {
                op,
                left: Box::new(left),
                right: Box::new(right),
            }),
            start,
        )
    }

    fn parse_expression_list(&mut self) -> Vec<Expr> {
        let mut exprs = vec![self.parse_expression()];
        while self.eat(TokenKind::Comma) {
            exprs.push(self.parse_expression());
        }
        exprs
    }

    fn try_parse_lambda(&mut self) -> Option<Expr> {
        let start = self.start();
        match self.current_kind() {
            TokenKind::Ident if self.peek_kind(1) == TokenKind::FatArrow => {
                let name = self.parse_ident()?;
                self.advance();
                let params = vec![LambdaParam { ty: None, name }];
                Some(self.finish_lambda(start, params))
            }
            TokenKind::LParen => {
                let close = self.matching_paren(self.pos)?;
                if self.tokens.get(close + 1)?.kind != TokenKind::FatArrow {
                    return None;
                }
                let params = self.speculate(|p| {
                    p.advance();
                    let mut params = Vec::new();
                    while !p.check(TokenKind::RParen) {
                        p.parse_ref_kind(false);
                        let implicit = p.check(TokenKind::Ident)
                            && matches!(p.peek_kind(1), TokenKind::Comma | TokenKind::RParen);
                        let ty = if implicit { None } else { Some(p.parse_type()?) };
                        if !p.check(TokenKind::Ident) {
                            return None;
                        }
                        let name = p.parse_ident()?;
                        params.push(LambdaParam { ty, name });
                        if !p.eat(TokenKind::Comma) {
                            break;
                        }
                    }
                    (p.eat(TokenKind::RParen) && p.eat(TokenKind::FatArrow)).then_some(params)
                })?;
                Some(self.finish_lambda(start, params))
            }
            _ => None,
        }
    }

    fn finish_lambda(&mut self, start: ByteOffset, params: Vec<LambdaParam>) -> Expr {
        let body = if self.check(TokenKind::LBrace) {
            LambdaBody::Block(self.parse_block())
        } else {
            LambdaBody::Expr(Box::new(self.parse_expression()))
        };
        self.make_expr(ExprKind::Lambda(Lambda { params, body }), start)
    }

    fn parse_conditional(&mut self) -> Expr {
        let start = self.start();
        let condition = self.parse_coalesce();
        if !self.eat(TokenKind::Question) {
            return condition;
        }
        let when_true = self.parse_expression();
        self.expect(TokenKind::Colon);
        let when_false = self.parse_expression();
        self.make_expr(
            ExprKind::Conditional(Conditional {
                condition: Box::new(condition),
                when_true: Box::new(when_true),
                when_false: Box::new(when_false),
            }),
            start,
        )
    }

    fn parse_coalesce(&mut self) -> Expr {
        let start = self.start();
        let left = self.parse_binary(0);
        if !self.eat(TokenKind::QuestionQuestion) {
            return left;
        }
        let right = self.parse_coalesce();
        self.make_expr(
            ExprKind::Binary(Binary {
                op: BinaryOp::Coalesce,
                left: Box::new(left),
                right: Box::new(right),
            }),
            start,
        )
    }

    /// Returns the binary operator at the current token, its precedence and
    /// how many tokens it spans.
    fn binary_op(&self) -> Option<(BinaryOp, u8, usize)> {
        let (op, precedence) = match self.current_kind() {
            TokenKind::PipePipe => (BinaryOp::Or, 1),
            TokenKind::AmpAmp => (BinaryOp::And, 2),
            TokenKind::Pipe => (BinaryOp::BitOr, 3),
            TokenKind::Caret => (BinaryOp::BitXor, 4),
            TokenKind::Amp => (BinaryOp::BitAnd, 5),
            TokenKind::EqEq => (BinaryOp::Eq, 6),
            TokenKind::BangEq => (BinaryOp::NotEq, 6),
            TokenKind::Lt => (BinaryOp::Lt, 7),
            TokenKind::LtEq => (BinaryOp::LtEq, 7),
            TokenKind::GtEq => (BinaryOp::GtEq, 7),
            TokenKind::Gt if self.adjacent(0) && self.peek_kind(1) == TokenKind::Gt => {
                return Some((BinaryOp::Shr, 8, 2));
            }
            TokenKind::Gt if self.adjacent(0) && self.peek_kind(1) == TokenKind::GtEq => {
                return None;
            }
            TokenKind::Gt => (BinaryOp::Gt, 7),
            TokenKind::Shl => (BinaryOp::Shl, 8),
            TokenKind::Plus => (BinaryOp::Add, 9),
            TokenKind::Minus => (BinaryOp::Sub, 9),
            TokenKind::Star => (BinaryOp::Mul, 10),
            TokenKind::Slash => (BinaryOp::Div, 10),
            TokenKind::Percent => (BinaryOp::Rem, 10),
            _ => return None,
        };
        Some((op, precedence, 1))
    }

    fn parse_binary(&mut self, min_precedence: u8) -> Expr {
        let start = self.start();
        let mut left = self.parse_unary();
        loop {
            if matches!(self.current_kind(), TokenKind::Is | TokenKind::As) && min_precedence <= 7 {
                left = self.parse_type_test(start, left);
                continue;
            }
            let Some((op, precedence, width)) = self.binary_op() else {
                break;
            };
            if precedence < min_precedence {
                break;
            }
            for _ in 0..width {
                self.advance();
            }
            let right = self.parse_binary(precedence + 1);
            left = self.make_expr(
                ExprKind::Binary(Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                }),
                start,
            );
        }
        left
    }

    /// Parses the `is ...` or `as T` that follows `operand`.
    fn parse_type_test(&mut self, start: ByteOffset, operand: Expr) -> Expr {
        let operand = Box::new(operand);
        if self.eat(TokenKind::As) {
            return match self.speculate(Self::parse_type_in_expression) {
                Some(ty) => self.make_expr(ExprKind::As(Cast { ty, operand }), start),
                None => {
                    self.error_expected("type");
                    self.make_expr(ExprKind::Unknown, start)
                }
            };
        }

        self.advance();
        if self.check_contextual("not") {
            self.advance();
        }
        let mut pattern = IsPattern {
            operand,
            ty: None,
            designation: None,
            constant: None,
        };
        if self.current_kind().is_literal() || self.check(TokenKind::Minus) {
            pattern.constant = Some(Box::new(self.parse_unary()));
        } else if let Some(ty) = self.speculate(Self::parse_type_in_expression) {
            pattern.ty = Some(ty);
            let combinator = ["and", "or", "when"].contains(&self.current_text());
            if self.check(TokenKind::Ident) && !combinator {
                pattern.designation = self.parse_ident();
            }
        } else {
            self.error_expected("pattern");
        }
        self.make_expr(ExprKind::Is(pattern), start)
    }

    fn parse_unary(&mut self) -> Expr {
        let start = self.start();
        let op = match self.current_kind() {
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Minus => Some(UnaryOp::Minus),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            TokenKind::PlusPlus => Some(UnaryOp::PreIncrement),
            TokenKind::MinusMinus => Some(UnaryOp::PreDecrement),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = Box::new(self.parse_unary());
            return self.make_expr(ExprKind::Unary(Unary { op, operand }), start);
        }

        if self.check(TokenKind::LParen) {
            if let Some(cast) = self.try_parse_cast(start) {
                return cast;
            }
        }

        let primary = self.parse_primary();
        self.parse_postfix(start, primary)
    }

    fn try_parse_cast(&mut self, start: ByteOffset) -> Option<Expr> {
        let ty = self.speculate(|p| {
            p.advance();
            let ty = p.parse_type_in_expression()?;
            (p.check(TokenKind::RParen) && p.cast_follows(&ty)).then_some(ty)
        })?;
        self.advance();
        let operand = Box::new(self.parse_unary());
        Some(self.make_expr(ExprKind::Cast(Cast { ty, operand }), start))
    }

    /// Decides whether `(T)` at the current `)` is a cast, from the token after it.
    fn cast_follows(&self, ty: &TypeSyntax) -> bool {
        let next = self.peek_kind(1);
        let starts_operand = next.is_literal()
            || matches!(
                next,
                TokenKind::Ident
                    | TokenKind::PredefinedType
                    | TokenKind::LParen
                    | TokenKind::This
                    | TokenKind::Base
                    | TokenKind::New
                    | TokenKind::Typeof
                    | TokenKind::Sizeof
                    | TokenKind::Default
                    | TokenKind::Checked
                    | TokenKind::Unchecked
                    | TokenKind::Delegate
                    | TokenKind::Bang
                    | TokenKind::Tilde
            );
        if matches!(ty.kind, TypeKind::Named(_)) {
            return starts_operand;
        }
        // `(int)-x` is a cast, `(x)-y` is a subtraction
        starts_operand
            || matches!(
                next,
                TokenKind::Plus | TokenKind::Minus | TokenKind::PlusPlus | TokenKind::MinusMinus
            )
    }

    fn parse_postfix(&mut self, start: ByteOffset, mut expr: Expr) -> Expr {
        loop {
            match self.current_kind() {
                TokenKind::Dot => {
                    self.advance();
                    expr = self.parse_member_access(start, expr, false);
                }
                TokenKind::Question
                    if self.adjacent(0)
                        && matches!(self.peek_kind(1), TokenKind::Dot | TokenKind::LBracket) =>
                {
                    self.advance();
                    expr = if self.eat(TokenKind::Dot) {
                        self.parse_member_access(start, expr, true)
                    } else {
                        self.advance();
                        self.parse_element_access(start, expr, true)
                    };
                }
                TokenKind::LBracket => {
                    self.advance();
                    expr = self.parse_element_access(start, expr, false);
                }
                TokenKind::LParen => {
                    self.advance();
                    let args = self.parse_arguments(TokenKind::RParen);
                    expr = self.make_expr(
                        ExprKind::Invocation(Invocation {
                            callee: Box::new(expr),
                            args,
                        }),
                        start,
                    );
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    let op = if self.check(TokenKind::PlusPlus) {
                        UnaryOp::PostIncrement
                    } else {
                        UnaryOp::PostDecrement
                    };
                    self.advance();
                    expr = self.make_expr(
                        ExprKind::Unary(Unary {
                            op,
                            operand: Box::new(expr),
                        }),
                        start,
                    );
                }
                _ => return expr,
            }
        }
    }

    fn parse_member_access(&mut self, start: ByteOffset, target: Expr, conditional: bool) -> Expr {
        let Some(name) = self.parse_ident() else {
            return target;
        };
        let type_args = if self.check(TokenKind::Lt) {
            self.try_parse_generic_args().unwrap_or_default()
        } else {
            Vec::new()
        };
        self.make_expr(
            ExprKind::MemberAccess(MemberAccess {
                target: Box::new(target),
                name,
                type_args,
                conditional,
            }),
            start,
        )
    }

    /// Parses the arguments after `[` (already consumed).
    fn parse_element_access(&mut self, start: ByteOffset, target: Expr, conditional: bool) -> Expr {
        let args = self.parse_arguments(TokenKind::RBracket);
        self.make_expr(
            ExprKind::ElementAccess(ElementAccess {
                target: Box::new(target),
                args,
                conditional,
            }),
            start,
        )
    }

    /// Parses generic arguments in expression context, where `<` may also be
    /// a comparison. Accepted only if the token after `>` disambiguates.
    fn try_parse_generic_args(&mut self) -> Option<Vec<TypeSyntax>> {
        self.speculate(|p| {
            let args = p.parse_type_argument_list()?;
            matches!(
                p.current_kind(),
                TokenKind::LParen
                    | TokenKind::RParen
                    | TokenKind::RBracket
                    | TokenKind::RBrace
                    | TokenKind::Colon
                    | TokenKind::Semicolon
                    | TokenKind::Comma
                    | TokenKind::Dot
                    | TokenKind::Question
                    | TokenKind::EqEq
                    | TokenKind::BangEq
                    | TokenKind::Pipe
                    | TokenKind::Caret
                    | TokenKind::AmpAmp
                    | TokenKind::PipePipe
                    | TokenKind::Amp
                    | TokenKind::LBracket
                    | TokenKind::Eof
            )
            .then_some(args)
        })
    }

    /// Parses arguments up to and including `close`; the opener is already consumed.
    fn parse_arguments(&mut self, close: TokenKind) -> Vec<Argument> {
        let mut args = Vec::new();
        while !self.check(close) && !self.check(TokenKind::Eof) {
            let name = if self.check(TokenKind::Ident) && self.peek_kind(1) == TokenKind::Colon {
                let name = self.parse_ident();
                self.advance();
                name
            } else {
                None
            };
            let modifier = self.parse_ref_kind(false);
            let expr = match modifier {
                Some(RefKind::Out) | Some(RefKind::Ref) => self
                    .try_parse_declaration_expression()
                    .unwrap_or_else(|| self.parse_expression()),
                _ => self.parse_expression(),
            };
            args.push(Argument {
                name,
                modifier,
                expr,
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(close);
        args
    }

    /// `out int x`, `out var x`
    fn try_parse_declaration_expression(&mut self) -> Option<Expr> {
        let start = self.start();
        let (ty, name) = self.speculate(|p| {
            let ty = p.parse_type()?;
            let declares = p.check(TokenKind::Ident)
                && matches!(p.peek_kind(1), TokenKind::Comma | TokenKind::RParen);
            if !declares {
                return None;
            }
            Some((ty, p.parse_ident()?))
        })?;
        Some(self.make_expr(ExprKind::Declaration(DeclarationExpr { ty, name }), start))
    }

    /// `(x)` or a tuple literal `(a, b)`, `(name: a, b)`.
    fn parse_parenthesized_or_tuple(&mut self, start: ByteOffset) -> Expr {
        self.advance();
        if self.check(TokenKind::Ident) && self.peek_kind(1) == TokenKind::Colon {
            let elements = self.parse_arguments(TokenKind::RParen);
            return self.make_expr(ExprKind::Tuple(elements), start);
        }
        let first = self.parse_expression();
        if !self.eat(TokenKind::Comma) {
            self.expect(TokenKind::RParen);
            return self.make_expr(ExprKind::Parenthesized(Box::new(first)), start);
        }
        let mut elements = vec![Argument {
            name: None,
            modifier: None,
            expr: first,
        }];
        elements.extend(self.parse_arguments(TokenKind::RParen));
        self.make_expr(ExprKind::Tuple(elements), start)
    }

    fn parse_primary(&mut self) -> Expr {
        let start = self.start();
        let literal = match self.current_kind() {
            TokenKind::Number => Some(number_literal_kind(self.current_text())),
            TokenKind::String => Some(LiteralKind::String),
            TokenKind::Char => Some(LiteralKind::Char),
            TokenKind::True | TokenKind::False => Some(LiteralKind::Bool),
            TokenKind::Null => Some(LiteralKind::Null),
            _ => None,
        };
        if let Some(literal) = literal {
            self.advance();
            return self.make_expr(ExprKind::Literal(literal), start);
        }

        match self.current_kind() {
            TokenKind::InterpolatedString => self.parse_interpolated_string(start),
            TokenKind::Ident => {
                if self.peek_kind(1) == TokenKind::ColonColon {
                    self.advance();
                    self.advance();
                }
                let Some(name) = self.parse_ident() else {
                    return self.make_expr(ExprKind::Unknown, start);
                };
                let type_args = if self.check(TokenKind::Lt) {
                    self.try_parse_generic_args().unwrap_or_default()
                } else {
                    Vec::new()
                };
                self.make_expr(ExprKind::Name(SimpleName { name, type_args }), start)
            }
            TokenKind::PredefinedType => {
                let name = SmolStr::new(self.current_text());
                self.advance();
                let ty = TypeSyntax {
                    id: self.alloc_id(),
                    kind: TypeKind::Predefined(name),
                    span: self.span_from(start),
                };
                self.make_expr(ExprKind::PredefinedType(ty), start)
            }
            TokenKind::This => {
                self.advance();
                self.make_expr(ExprKind::This, start)
            }
            TokenKind::Base => {
                self.advance();
                self.make_expr(ExprKind::Base, start)
            }
            TokenKind::New => self.parse_new(start),
            TokenKind::Typeof | TokenKind::Sizeof => {
                let is_typeof = self.check(TokenKind::Typeof);
                self.advance();
                self.expect(TokenKind::LParen);
                match self.speculate(Self::parse_type) {
                    Some(ty) if self.eat(TokenKind::RParen) => {
                        let kind = if is_typeof {
                            ExprKind::TypeOf(ty)
                        } else {
                            ExprKind::SizeOf(ty)
                        };
                        self.make_expr(kind, start)
                    }
                    _ => {
                        self.error(ParseErrorKind::Unsupported {
                            construct: "type operand".to_string(),
                        });
                        self.skip_until_any(&[TokenKind::RParen]);
                        self.eat(TokenKind::RParen);
                        self.make_expr(ExprKind::Unknown, start)
                    }
                }
            }
            TokenKind::Default => {
                self.advance();
                let ty = if self.eat(TokenKind::LParen) {
                    let ty = self.speculate(Self::parse_type);
                    if ty.is_none() {
                        self.error_expected("type");
                    }
                    self.expect(TokenKind::RParen);
                    ty
                } else {
                    None
                };
                self.make_expr(ExprKind::Default(ty), start)
            }
            TokenKind::LParen => self.parse_parenthesized_or_tuple(start),
            TokenKind::Checked | TokenKind::Unchecked => {
                self.advance();
                self.expect(TokenKind::LParen);
                let inner = self.parse_expression();
                self.expect(TokenKind::RParen);
                self.make_expr(ExprKind::Parenthesized(Box::new(inner)), start)
            }
            TokenKind::Delegate => {
                self.advance();
                let params = if self.check(TokenKind::LParen) {
                    self.parse_parameters()
                        .into_iter()
                        .map(|param| LambdaParam {
                            ty: Some(param.ty),
                            name: param.name,
                        })
                        .collect()
                } else {
                    Vec::new()
                };
                let body = LambdaBody::Block(self.parse_block());
                self.make_expr(ExprKind::Lambda(Lambda { params, body }), start)
            }
            TokenKind::Throw => {
                self.advance();
                let value = self.parse_expression();
                self.make_expr(ExprKind::Throw(Box::new(value)), start)
            }
            TokenKind::Ref => {
                self.advance();
                self.parse_unary()
            }
            _ => {
                self.error_expected("expression");
                Expr {
                    id: self.alloc_id(),
                    kind: ExprKind::Unknown,
                    span: Span::empty(start),
                }
            }
        }
    }

    fn parse_interpolated_string(&mut self, start: ByteOffset) -> Expr {
        let token = *self.current();
        self.advance();
        let holes = interpolation_holes(self.text(token.span), token.span.start_usize());
        let parts = holes
            .into_iter()
            .filter_map(|hole| self.parse_hole(hole))
            .collect();
        self.make_expr(ExprKind::InterpolatedString(parts), start)
    }

    /// Parses the expression in one `{...}` hole. Format and alignment
    /// specifiers after the expression are left unparsed.
    fn parse_hole(&mut self, hole: Span) -> Option<Expr> {
        let tokens: Vec<Token> =
            Lexer::new_in_range(self.source, hole.start_usize()..hole.end_usize()).collect();
        let saved_tokens = std::mem::replace(&mut self.tokens, tokens);
        let saved_eof = std::mem::replace(
            &mut self.eof_token,
            Token {
                kind: TokenKind::Eof,
                span: Span::empty(hole.end),
            },
        );
        let checkpoint = self.checkpoint();
        self.pos = 0;

        let expr = self.parse_expression();
        let clean = self.errors.len() == checkpoint.errors;

        self.restore(checkpoint);
        self.tokens = saved_tokens;
        self.eof_token = saved_eof;
        clean.then_some(expr)
    }

    fn parse_new(&mut self, start: ByteOffset) -> Expr {
        self.advance();

        match self.current_kind() {
            // new[] { ... }
            TokenKind::LBracket => {
                let rank = self.parse_rank_specifiers();
                let initializer = self.parse_optional_initializer();
                if initializer.is_none() {
                    self.error_expected("array initializer");
                }
                return self.make_expr(
                    ExprKind::ArrayCreation(ArrayCreation {
                        element: None,
                        sizes: Vec::new(),
                        rank,
                        initializer,
                    }),
                    start,
                );
            }
            // target-typed `new(...)` and anonymous objects
            TokenKind::LParen | TokenKind::LBrace => {
                let args = if self.eat(TokenKind::LParen) {
                    Some(self.parse_arguments(TokenKind::RParen))
                } else {
                    None
                };
                let initializer = self.parse_optional_initializer();
                return self.make_expr(
                    ExprKind::ObjectCreation(ObjectCreation {
                        ty: None,
                        args,
                        initializer,
                    }),
                    start,
                );
            }
            _ => {}
        }

        let Some(ty) = self.speculate(|p| p.parse_type_with(false, false)) else {
            self.error_expected("type");
            return self.make_expr(ExprKind::Unknown, start);
        };

        if self.check(TokenKind::LBracket) {
            let mut sizes = Vec::new();
            let mut rank = 0;
            if !matches!(self.peek_kind(1), TokenKind::RBracket | TokenKind::Comma) {
                self.advance();
                sizes = self.parse_expression_list();
                self.expect(TokenKind::RBracket);
                rank = 1;
            }
            rank += self.parse_rank_specifiers();
            let initializer = self.parse_optional_initializer();
            return self.make_expr(
                ExprKind::ArrayCreation(ArrayCreation {
                    element: Some(ty),
                    sizes,
                    rank,
                    initializer,
                }),
                start,
            );
        }

        let args = if self.eat(TokenKind::LParen) {
            Some(self.parse_arguments(TokenKind::RParen))
        } else {
            None
        };
        let initializer = self.parse_optional_initializer();
        if args.is_none() && initializer.is_none() {
            self.error_expected("'('");
        }
        self.make_expr(
            ExprKind::ObjectCreation(ObjectCreation {
                ty: Some(ty),
                args,
                initializer,
            }),
            start,
        )
    }

    /// Consumes `[]`, `[,]`, ... and returns how many there were.
    fn parse_rank_specifiers(&mut self) -> u32 {
        let mut count = 0;
        while self.check(TokenKind::LBracket)
            && matches!(self.peek_kind(1), TokenKind::RBracket | TokenKind::Comma)
        {
            self.advance();
            while self.eat(TokenKind::Comma) {}
            self.expect(TokenKind::RBracket);
            count += 1;
        }
        count
    }

    fn parse_optional_initializer(&mut self) -> Option<Vec<Expr>> {
        self.check(TokenKind::LBrace)
            .then(|| self.parse_initializer_elements())
    }

    fn parse_initializer_elements(&mut self) -> Vec<Expr> {
        self.advance();
        let mut elements = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.check(TokenKind::Eof) {
            elements.push(self.parse_variable_initializer());
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace);
        elements
    }

    fn parse_initializer_list(&mut self) -> Expr {
        let start = self.start();
        let elements = self.parse_initializer_elements();
        self.make_expr(ExprKind::InitializerList(elements), start)
    }

    // === Types ===

    /// Parses a type in declaration context. Never reports errors; callers
    /// run it under [`Parser::speculate`].
    fn parse_type(&mut self) -> Option<TypeSyntax> {
        self.parse_type_with(false, true)
    }

    /// Parses a type where a following `?` may start a conditional expression.
    fn parse_type_in_expression(&mut self) -> Option<TypeSyntax> {
        self.parse_type_with(true, true)
    }

    fn parse_type_with(&mut self, in_expression: bool, allow_array: bool) -> Option<TypeSyntax> {
        let start = self.start();
        let kind = match self.current_kind() {
            TokenKind::PredefinedType => {
                let name = SmolStr::new(self.current_text());
                self.advance();
                TypeKind::Predefined(name)
            }
            TokenKind::Ident => TypeKind::Named(self.parse_name_segments()?),
            _ => return None,
        };
        let mut ty = TypeSyntax {
            id: self.alloc_id(),
            kind,
            span: self.span_from(start),
        };

        loop {
            let kind = if self.check(TokenKind::Question) && self.nullable_suffix_ok(in_expression) {
                self.advance();
                TypeKind::Nullable(Box::new(ty))
            } else if allow_array
                && self.check(TokenKind::LBracket)
                && matches!(self.peek_kind(1), TokenKind::RBracket | TokenKind::Comma)
            {
                self.advance();
                let mut rank = 1;
                while self.eat(TokenKind::Comma) {
                    rank += 1;
                }
                if !self.eat(TokenKind::RBracket) {
                    return None;
                }
                TypeKind::Array {
                    element: Box::new(ty),
                    rank,
                }
            } else {
                break;
            };
            ty = TypeSyntax {
                id: self.alloc_id(),
                kind,
                span: self.span_from(start),
            };
        }
        Some(ty)
    }

    /// Decides whether the `?` at the current token is a nullable suffix.
    fn nullable_suffix_ok(&self, in_expression: bool) -> bool {
        match self.peek_kind(1) {
            TokenKind::Ident => !in_expression,
            TokenKind::RParen
            | TokenKind::RBracket
            | TokenKind::RBrace
            | TokenKind::Comma
            | TokenKind::Semicolon
            | TokenKind::Gt
            | TokenKind::LBracket
            | TokenKind::QuestionQuestion
            | TokenKind::Eof => true,
            _ => false,
        }
    }

    fn parse_name_segments(&mut self) -> Option<Vec<NameSegment>> {
        // global::
        if self.peek_kind(1) == TokenKind::ColonColon {
            self.advance();
            self.advance();
        }
        let mut segments = Vec::new();
        loop {
            if !self.check(TokenKind::Ident) {
                return None;
            }
            let name = self.parse_ident()?;
            let args = if self.check(TokenKind::Lt) {
                self.parse_type_argument_list()?
            } else {
                Vec::new()
            };
            segments.push(NameSegment { name, args });
            if self.check(TokenKind::Dot) && self.peek_kind(1) == TokenKind::Ident {
                self.advance();
            } else {
                break;
            }
        }
        Some(segments)
    }

    /// Parses `<T, U>`; the current token is `<`.
    fn parse_type_argument_list(&mut self) -> Option<Vec<TypeSyntax>> {
        self.advance();
        let mut args = Vec::new();
        loop {
            args.push(self.parse_type()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.eat(TokenKind::Gt).then_some(args)
    }
}

/// Decides the type of a numeric literal from its suffix and shape.
fn number_literal_kind(text: &str) -> LiteralKind {
    let lower = text.to_ascii_lowercase();
    let radix_prefixed = lower.starts_with("0x") || lower.starts_with("0b");
    let suffix_chars: &[char] = if radix_prefixed {
        &['u', 'l']
    } else {
        &['u', 'l', 'f', 'd', 'm']
    };
    let body = lower.trim_end_matches(suffix_chars);
    let suffix = &lower[body.len()..];

    if suffix.contains('f') {
        LiteralKind::Float
    } else if suffix.contains('d') {
        LiteralKind::Double
    } else if suffix.contains('m') {
        LiteralKind::Decimal
    } else if !radix_prefixed && (body.contains('.') || body.contains('e')) {
        LiteralKind::Double
    } else {
        match (suffix.contains('u'), suffix.contains('l')) {
            (true, true) => LiteralKind::ULong,
            (true, false) => LiteralKind::UInt,
            (false, true) => LiteralKind::Long,
            (false, false) => LiteralKind::Int,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> ParseResult {
        Parser::new(source, &ParseOptions::default()).parse()
    }

    fn parse_body(source: &str) -> (Vec<Stmt>, Vec<ParseError>) {
        let wrapped = format!("class C {{ void M() {{ {source} }} }}");
        let result = parse(&wrapped);
        let Some(Member::Type(class)) = result.unit.members.into_iter().next() else {
            panic!("Expected class");
        };
        let Some(Member::Method(method)) = class.members.into_iter().next() else {
            panic!("Expected method");
        };
        let Some(Body::Block(block)) = method.body else {
            panic!("Expected block body");
        };
        (block.stmts, result.errors)
    }

    fn single_expr(source: &str) -> Expr {
        let (mut stmts, errors) = parse_body(source);
        assert!(errors.is_empty(), "Expected no errors, got: {errors:?}");
        match stmts.remove(0) {
            Stmt::Expr(stmt) => stmt.expr,
            other => panic!("Expected expression statement, got {other:?}"),
        }
    }

    #[test]
    fn test_number_literal_kinds() {
        assert_eq!(number_literal_kind("1"), LiteralKind::Int);
        assert_eq!(number_literal_kind("1.5"), LiteralKind::Double);
        assert_eq!(number_literal_kind("1.5f"), LiteralKind::Float);
        assert_eq!(number_literal_kind("2d"), LiteralKind::Double);
        assert_eq!(number_literal_kind("10m"), LiteralKind::Decimal);
        assert_eq!(number_literal_kind("10UL"), LiteralKind::ULong);
        assert_eq!(number_literal_kind("10L"), LiteralKind::Long);
        assert_eq!(number_literal_kind("10u"), LiteralKind::UInt);
        assert_eq!(number_literal_kind("0xFF"), LiteralKind::Int);
        assert_eq!(number_literal_kind("1e3"), LiteralKind::Double);
    }

    #[test]
    fn test_generic_local_declaration() {
        let (stmts, errors) = parse_body("List<int> nums = new List<int>();");
        assert!(errors.is_empty(), "{errors:?}");
        let Stmt::Local(local) = &stmts[0] else {
            panic!("Expected local declaration");
        };
        let segment = local.declaration.ty.last_segment().expect("named type");
        assert_eq!(segment.name.name.as_str(), "List");
        assert_eq!(segment.args.len(), 1);
        assert!(matches!(
            local.declaration.declarators[0].initializer.as_ref().map(|e| &e.kind),
            Some(ExprKind::ObjectCreation(_))
        ));
    }

    #[test]
    fn test_declaration_span_excludes_semicolon() {
        let source = "class C { void M() { List<int> a, b; } }";
        let result = parse(source);
        let Member::Type(class) = &result.unit.members[0] else {
            panic!("Expected class");
        };
        let Member::Method(method) = &class.members[0] else {
            panic!("Expected method");
        };
        let Some(Body::Block(block)) = &method.body else {
            panic!("Expected body");
        };
        let Stmt::Local(local) = &block.stmts[0] else {
            panic!("Expected local");
        };
        let span = local.declaration.span;
        assert_eq!(&source[span.start_usize()..span.end_usize()], "List<int> a, b");
        let ty = local.declaration.ty.span;
        assert_eq!(&source[ty.start_usize()..ty.end_usize()], "List<int>");
    }

    #[test]
    fn test_assignment_is_not_a_declaration() {
        let expr = single_expr("nums = new List<int>();");
        let ExprKind::Assignment(assignment) = expr.kind else {
            panic!("Expected assignment");
        };
        assert_eq!(assignment.op, AssignOp::Assign);
        assert!(matches!(assignment.left.kind, ExprKind::Name(_)));
    }

    #[test]
    fn test_comparison_is_not_generic() {
        let (stmts, errors) = parse_body("if (i < n && n > 0) { }");
        assert!(errors.is_empty(), "{errors:?}");
        let Stmt::If(stmt) = &stmts[0] else {
            panic!("Expected if");
        };
        let ExprKind::Binary(binary) = &stmt.condition.kind else {
            panic!("Expected binary");
        };
        assert_eq!(binary.op, BinaryOp::And);
    }

    #[test]
    fn test_generic_method_call() {
        let expr = single_expr("GetComponent<Foo>().Run();");
        let ExprKind::Invocation(call) = expr.kind else {
            panic!("Expected invocation");
        };
        let ExprKind::MemberAccess(access) = call.callee.kind else {
            panic!("Expected member access");
        };
        let ExprKind::Invocation(inner) = access.target.kind else {
            panic!("Expected inner invocation");
        };
        let ExprKind::Name(name) = inner.callee.kind else {
            panic!("Expected name");
        };
        assert_eq!(name.type_args.len(), 1);
    }

    #[test]
    fn test_shift_right_is_two_tokens() {
        let expr = single_expr("x = a >> 2;");
        let ExprKind::Assignment(assignment) = expr.kind else {
            panic!("Expected assignment");
        };
        let ExprKind::Binary(binary) = assignment.right.kind else {
            panic!("Expected binary");
        };
        assert_eq!(binary.op, BinaryOp::Shr);
    }

    #[test]
    fn test_tuple_literals() {
        let expr = single_expr("t = (xs[0], xs[1]);");
        let ExprKind::Assignment(assignment) = expr.kind else {
            panic!("Expected assignment");
        };
        let ExprKind::Tuple(elements) = &assignment.right.kind else {
            panic!("Expected tuple");
        };
        assert_eq!(elements.len(), 2);
        assert!(elements
            .iter()
            .all(|element| matches!(element.expr.kind, ExprKind::ElementAccess(_))));

        let expr = single_expr("t = (count: n, GetComponent<Foo>());");
        let ExprKind::Assignment(assignment) = expr.kind else {
            panic!("Expected assignment");
        };
        let ExprKind::Tuple(elements) = &assignment.right.kind else {
            panic!("Expected tuple");
        };
        assert_eq!(
            elements[0].name.as_ref().map(|name| name.name.as_str()),
            Some("count")
        );
        assert!(matches!(elements[1].expr.kind, ExprKind::Invocation(_)));

        let expr = single_expr("x = (a + b);");
        let ExprKind::Assignment(assignment) = expr.kind else {
            panic!("Expected assignment");
        };
        assert!(matches!(assignment.right.kind, ExprKind::Parenthesized(_)));
    }

    #[test]
    fn test_cast_versus_parenthesized() {
        let expr = single_expr("x = (Foo)(bar);");
        let ExprKind::Assignment(assignment) = expr.kind else {
            panic!("Expected assignment");
        };
        assert!(matches!(assignment.right.kind, ExprKind::Cast(_)));

        let expr = single_expr("x = (a) - b;");
        let ExprKind::Assignment(assignment) = expr.kind else {
            panic!("Expected assignment");
        };
        assert!(matches!(assignment.right.kind, ExprKind::Binary(_)));

        let expr = single_expr("x = (int)-b;");
        let ExprKind::Assignment(assignment) = expr.kind else {
            panic!("Expected assignment");
        };
        assert!(matches!(assignment.right.kind, ExprKind::Cast(_)));
    }

    #[test]
    fn test_nested_element_access_spans() {
        let source = "class C { void M() { x = a[b[0]]; } }";
        let result = parse(source);
        assert!(result.errors.is_empty());
        let mut spans = Vec::new();
        fn collect(expr: &Expr, out: &mut Vec<Span>) {
            match &expr.kind {
                ExprKind::ElementAccess(access) => {
                    out.push(expr.span);
                    collect(&access.target, out);
                    for arg in &access.args {
                        collect(&arg.expr, out);
                    }
                }
                ExprKind::Assignment(assignment) => {
                    collect(&assignment.left, out);
                    collect(&assignment.right, out);
                }
                _ => {}
            }
        }
        let Member::Type(class) = &result.unit.members[0] else {
            panic!()
        };
        let Member::Method(method) = &class.members[0] else {
            panic!()
        };
        let Some(Body::Block(block)) = &method.body else {
            panic!()
        };
        let Stmt::Expr(stmt) = &block.stmts[0] else {
            panic!()
        };
        collect(&stmt.expr, &mut spans);
        let texts: Vec<&str> = spans
            .iter()
            .map(|s| &source[s.start_usize()..s.end_usize()])
            .collect();
        assert_eq!(texts, vec!["a[b[0]]", "b[0]"]);
    }

    #[test]
    fn test_conditional_access_and_coalesce() {
        let expr = single_expr("x = a?[0] ?? b?.c;");
        let ExprKind::Assignment(assignment) = expr.kind else {
            panic!("Expected assignment");
        };
        let ExprKind::Binary(binary) = assignment.right.kind else {
            panic!("Expected coalesce");
        };
        assert_eq!(binary.op, BinaryOp::Coalesce);
        assert!(matches!(
            &binary.left.kind,
            ExprKind::ElementAccess(access) if access.conditional
        ));
        assert!(matches!(
            &binary.right.kind,
            ExprKind::MemberAccess(access) if access.conditional
        ));
    }

    #[test]
    fn test_lambda_forms() {
        let expr = single_expr("items.ForEach(x => Log(x));");
        let ExprKind::Invocation(call) = expr.kind else {
            panic!("Expected invocation");
        };
        assert!(matches!(call.args[0].expr.kind, ExprKind::Lambda(_)));

        let expr = single_expr("Run((int a, b) => { return; });");
        let ExprKind::Invocation(call) = expr.kind else {
            panic!("Expected invocation");
        };
        let ExprKind::Lambda(lambda) = &call.args[0].expr.kind else {
            panic!("Expected lambda");
        };
        assert_eq!(lambda.params.len(), 2);
        assert!(lambda.params[0].ty.is_some());
    }

    #[test]
    fn test_is_pattern_with_designation() {
        let (stmts, errors) = parse_body("if (o is List<int> l && l.Count > 0) { }");
        assert!(errors.is_empty(), "{errors:?}");
        let Stmt::If(stmt) = &stmts[0] else {
            panic!("Expected if");
        };
        let ExprKind::Binary(binary) = &stmt.condition.kind else {
            panic!("Expected binary");
        };
        let ExprKind::Is(pattern) = &binary.left.kind else {
            panic!("Expected is pattern");
        };
        assert_eq!(pattern.designation.as_ref().map(|d| d.name.as_str()), Some("l"));
    }

    #[test]
    fn test_conditional_is_not_nullable_type() {
        let expr = single_expr("x = flag ? a : b;");
        let ExprKind::Assignment(assignment) = expr.kind else {
            panic!("Expected assignment");
        };
        assert!(matches!(assignment.right.kind, ExprKind::Conditional(_)));
    }

    #[test]
    fn test_nullable_local() {
        let (stmts, errors) = parse_body("int? count = null;");
        assert!(errors.is_empty(), "{errors:?}");
        let Stmt::Local(local) = &stmts[0] else {
            panic!("Expected local");
        };
        assert!(matches!(local.declaration.ty.kind, TypeKind::Nullable(_)));
    }

    #[test]
    fn test_array_creation_forms() {
        let expr = single_expr("x = new int[3];");
        let ExprKind::Assignment(assignment) = expr.kind else {
            panic!("Expected assignment");
        };
        let ExprKind::ArrayCreation(creation) = assignment.right.kind else {
            panic!("Expected array creation");
        };
        assert_eq!(creation.sizes.len(), 1);
        assert_eq!(creation.rank, 1);

        let (stmts, errors) = parse_body("int[] values = { 1, 2 };");
        assert!(errors.is_empty(), "{errors:?}");
        assert!(matches!(stmts[0], Stmt::Local(_)));
    }

    #[test]
    fn test_object_and_collection_initializers() {
        let expr = single_expr("x = new List<int> { 1, 2, 3 };");
        let ExprKind::Assignment(assignment) = expr.kind else {
            panic!("Expected assignment");
        };
        let ExprKind::ObjectCreation(creation) = assignment.right.kind else {
            panic!("Expected object creation");
        };
        assert!(creation.args.is_none());
        assert_eq!(creation.initializer.map(|i| i.len()), Some(3));
    }

    #[test]
    fn test_out_var_argument() {
        let expr = single_expr("map.TryGetValue(key, out var value);");
        let ExprKind::Invocation(call) = expr.kind else {
            panic!("Expected invocation");
        };
        assert_eq!(call.args[1].modifier, Some(RefKind::Out));
        assert!(matches!(call.args[1].expr.kind, ExprKind::Declaration(_)));
    }

    #[test]
    fn test_interpolated_string_holes_are_parsed() {
        let expr = single_expr(r#"Log($"first={nums[0]:D2} total={nums.Count}");"#);
        let ExprKind::Invocation(call) = expr.kind else {
            panic!("Expected invocation");
        };
        let ExprKind::InterpolatedString(parts) = &call.args[0].expr.kind else {
            panic!("Expected interpolated string");
        };
        assert_eq!(parts.len(), 2);
        assert!(matches!(parts[0].kind, ExprKind::ElementAccess(_)));
    }

    #[test]
    fn test_statement_forms() {
        let source = r#"
            for (int i = 0; i < n; i++) { }
            foreach (var item in items) { }
            while (ok) x++;
            do { } while (ok);
            switch (k) { case 1: break; case Foo.Bar: return; default: break; }
            try { } catch (Exception e) when (e != null) { } finally { }
            using (var s = Open()) { }
            lock (gate) { }
            yield return 1;
            yield break;
            label: x = 1;
            const int Max = 4;
            int Local(int a) => a * 2;
        "#;
        let (stmts, errors) = parse_body(source);
        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(stmts.len(), 13);
        assert!(matches!(stmts[0], Stmt::For(_)));
        assert!(matches!(stmts[1], Stmt::Foreach(_)));
        assert!(matches!(stmts[4], Stmt::Switch(_)));
        assert!(matches!(stmts[5], Stmt::Try(_)));
        assert!(matches!(stmts[11], Stmt::Local(ref l) if l.is_const));
        assert!(matches!(stmts[12], Stmt::LocalFunction(_)));
    }

    #[test]
    fn test_broken_statement_becomes_unknown() {
        let (stmts, errors) = parse_body("x = ;\nList<int> ok = null;");
        assert!(!errors.is_empty());
        assert!(matches!(stmts[0], Stmt::Unknown(_)));
        assert!(matches!(stmts[1], Stmt::Local(_)));
    }

    #[test]
    fn test_members_and_skipped_members() {
        let source = r#"
            using System;
            using System.Collections.Generic;
            namespace Game {
                public enum Mode { A, B }
                public class Player : UdonSharpBehaviour {
                    [SerializeField] private List<int> scores = new List<int>();
                    public int Count { get; private set; } = 0;
                    public int Total => scores.Count;
                    public Player(int x) : base() { }
                    public int this[int i] { get { return i; } }
                    public static Player operator +(Player a, Player b) => a;
                    public event Action Changed;
                    void Start() { }
                }
            }
        "#;
        let result = parse(source);
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        assert_eq!(result.unit.members.len(), 3);
        let Member::Namespace(ns) = &result.unit.members[2] else {
            panic!("Expected namespace");
        };
        assert_eq!(ns.name.as_str(), "Game");
        assert!(matches!(ns.members[0], Member::Unknown(_)));
        let Member::Type(class) = &ns.members[1] else {
            panic!("Expected class");
        };
        assert_eq!(class.name.name.as_str(), "Player");
        assert!(matches!(class.members[0], Member::Field(_)));
        assert!(matches!(class.members[1], Member::Property(_)));
        assert!(matches!(class.members[2], Member::Property(_)));
        assert!(matches!(class.members[3], Member::Constructor(_)));
        assert!(matches!(class.members[4], Member::Indexer(_)));
        assert!(matches!(class.members[5], Member::Method(_)));
        assert!(matches!(class.members[6], Member::Unknown(_)));
        assert!(matches!(class.members[7], Member::Method(_)));
    }

    #[test]
    fn test_members_with_special_headers() {
        let source = r#"
            class C : IFoo, IList {
                ~C() { Release(); }
                void IFoo.Bar(int x) { }
                int IList<int>.Count => 0;
                int this[int i, string key] => i;
                object IList.this[int i] { get { return null; } set { } }
                public static implicit operator int(C c) => 0;
                public static bool operator ==(C a, C b) => true;
                event Action Changed { add { } remove { } }
            }
        "#;
        let result = parse(source);
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        let Member::Type(class) = &result.unit.members[0] else {
            panic!("Expected class");
        };

        let Member::Finalizer(finalizer) = &class.members[0] else {
            panic!("Expected finalizer");
        };
        assert_eq!(finalizer.name.name.as_str(), "C");
        assert!(matches!(finalizer.body, Some(Body::Block(_))));

        let Member::Method(bar) = &class.members[1] else {
            panic!("Expected method");
        };
        assert_eq!(bar.name.name.as_str(), "Bar");
        assert_eq!(bar.params.len(), 1);

        let Member::Property(count) = &class.members[2] else {
            panic!("Expected property");
        };
        assert_eq!(count.name.name.as_str(), "Count");

        let Member::Indexer(indexer) = &class.members[3] else {
            panic!("Expected indexer");
        };
        assert_eq!(indexer.params.len(), 2);
        assert!(indexer.expression_body.is_some());

        let Member::Indexer(explicit) = &class.members[4] else {
            panic!("Expected indexer");
        };
        assert_eq!(explicit.accessors.len(), 2);

        let Member::Method(conversion) = &class.members[5] else {
            panic!("Expected conversion operator");
        };
        assert_eq!(conversion.name.name.as_str(), "implicit operator");
        assert_eq!(conversion.params.len(), 1);

        let Member::Method(equals) = &class.members[6] else {
            panic!("Expected operator");
        };
        assert_eq!(equals.name.name.as_str(), "operator ==");
        assert_eq!(equals.params.len(), 2);

        let Member::Property(changed) = &class.members[7] else {
            panic!("Expected event accessors");
        };
        assert_eq!(changed.accessors.len(), 2);
    }

    #[test]
    fn test_skipped_record_body_is_reported() {
        let result = parse("record Point(int X) { int Twice() { return X * 2; } }
class C { }");
        assert_eq!(result.errors.len(), 1);
        assert!(matches!(
            &result.errors[0].kind,
            ParseErrorKind::Unsupported { construct } if construct == "record declaration"
        ));
        assert!(matches!(result.unit.members[0], Member::Unknown(_)));
        assert!(matches!(result.unit.members[1], Member::Type(_)));

        let result = parse("record Point(int X);");
        assert!(result.errors.is_empty(), "{:?}", result.errors);
    }

    #[test]
    fn test_file_scoped_namespace() {
        let result = parse("namespace Game;\nclass A { }\nclass B { }");
        assert!(result.errors.is_empty());
        let Member::Namespace(ns) = &result.unit.members[0] else {
            panic!("Expected namespace");
        };
        assert_eq!(ns.members.len(), 2);
    }

    #[test]
    fn test_node_ids_are_unique() {
        let (stmts, _) = parse_body("List<int> a = new List<int>(); a[0] = a[1] + 2;");
        let mut ids = Vec::new();
        fn collect(expr: &Expr, ids: &mut Vec<NodeId>) {
            ids.push(expr.id);
            match &expr.kind {
                ExprKind::Assignment(a) => {
                    collect(&a.left, ids);
                    collect(&a.right, ids);
                }
                ExprKind::Binary(b) => {
                    collect(&b.left, ids);
                    collect(&b.right, ids);
                }
                ExprKind::ElementAccess(e) => {
                    collect(&e.target, ids);
                    for arg in &e.args {
                        collect(&arg.expr, ids);
                    }
                }
                _ => {}
            }
        }
        let Stmt::Local(local) = &stmts[0] else {
            panic!()
        };
        ids.push(local.declaration.id);
        ids.push(local.declaration.ty.id);
        let Stmt::Expr(stmt) = &stmts[1] else {
            panic!()
        };
        collect(&stmt.expr, &mut ids);
        let count = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), count);
    }
}
