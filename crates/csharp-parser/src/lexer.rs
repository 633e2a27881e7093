//! C# lexer using logos.
//!
//! Whitespace and comments are skipped as trivia, so every token span points
//! at real source text. Preprocessor directives never reach the parser: the
//! [`Lexer`] evaluates them and steps over disabled regions as raw text.

use crate::error::{ParseError, ParseErrorKind};
use crate::preprocessor::{disabled_region_end, DirectiveEffect, Preprocessor};
use logos::Logos;
use offset_map::Span;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use std::ops::Range;

/// A token produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The span of the token in the source.
    pub span: Span,
}

/// Token kinds for the C# subset understood by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Logos, Default)]
#[logos(skip(r"(?:[ \t\r\n\f]+|//[^\r\n]*|/\*(?:[^*]|\*+[^*/])*\*+/)", allow_greedy = true))]
pub enum TokenKind {
    // === Punctuation ===
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token(":")]
    Colon,
    #[token("::")]
    ColonColon,
    #[token("?")]
    Question,
    #[token("??")]
    QuestionQuestion,
    #[token("??=")]
    QuestionQuestionEq,
    #[token("=>")]
    FatArrow,
    #[token("->")]
    Arrow,

    // === Operators ===
    #[token("=")]
    Eq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    /// `>` is never merged into `>>`, so generic argument lists close cleanly.
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    #[token("<<")]
    Shl,
    #[token("<<=")]
    ShlEq,
    #[token("+")]
    Plus,
    #[token("+=")]
    PlusEq,
    #[token("++")]
    PlusPlus,
    #[token("-")]
    Minus,
    #[token("-=")]
    MinusEq,
    #[token("--")]
    MinusMinus,
    #[token("*")]
    Star,
    #[token("*=")]
    StarEq,
    #[token("/")]
    Slash,
    #[token("/=")]
    SlashEq,
    #[token("%")]
    Percent,
    #[token("%=")]
    PercentEq,
    #[token("&")]
    Amp,
    #[token("&=")]
    AmpEq,
    #[token("&&")]
    AmpAmp,
    #[token("|")]
    Pipe,
    #[token("|=")]
    PipeEq,
    #[token("||")]
    PipePipe,
    #[token("^")]
    Caret,
    #[token("^=")]
    CaretEq,
    #[token("!")]
    Bang,
    #[token("~")]
    Tilde,

    // === Keywords ===
    #[token("abstract")]
    Abstract,
    #[token("as")]
    As,
    #[token("base")]
    Base,
    #[token("break")]
    Break,
    #[token("case")]
    Case,
    #[token("catch")]
    Catch,
    #[token("checked")]
    Checked,
    #[token("class")]
    Class,
    #[token("const")]
    Const,
    #[token("continue")]
    Continue,
    #[token("default")]
    Default,
    #[token("delegate")]
    Delegate,
    #[token("do")]
    Do,
    #[token("else")]
    Else,
    #[token("enum")]
    Enum,
    #[token("event")]
    Event,
    #[token("explicit")]
    Explicit,
    #[token("extern")]
    Extern,
    #[token("false")]
    False,
    #[token("finally")]
    Finally,
    #[token("fixed")]
    Fixed,
    #[token("for")]
    For,
    #[token("foreach")]
    Foreach,
    #[token("goto")]
    Goto,
    #[token("if")]
    If,
    #[token("implicit")]
    Implicit,
    #[token("in")]
    In,
    #[token("interface")]
    Interface,
    #[token("internal")]
    Internal,
    #[token("is")]
    Is,
    #[token("lock")]
    Lock,
    #[token("namespace")]
    Namespace,
    #[token("new")]
    New,
    #[token("null")]
    Null,
    #[token("operator")]
    Operator,
    #[token("out")]
    Out,
    #[token("override")]
    Override,
    #[token("params")]
    Params,
    #[token("private")]
    Private,
    #[token("protected")]
    Protected,
    #[token("public")]
    Public,
    #[token("readonly")]
    Readonly,
    #[token("ref")]
    Ref,
    #[token("return")]
    Return,
    #[token("sealed")]
    Sealed,
    #[token("sizeof")]
    Sizeof,
    #[token("stackalloc")]
    Stackalloc,
    #[token("static")]
    Static,
    #[token("struct")]
    Struct,
    #[token("switch")]
    Switch,
    #[token("this")]
    This,
    #[token("throw")]
    Throw,
    #[token("true")]
    True,
    #[token("try")]
    Try,
    #[token("typeof")]
    Typeof,
    #[token("unchecked")]
    Unchecked,
    #[token("unsafe")]
    Unsafe,
    #[token("using")]
    Using,
    #[token("virtual")]
    Virtual,
    #[token("volatile")]
    Volatile,
    #[token("while")]
    While,

    /// A predefined type keyword such as `int` or `string`.
    #[token("bool")]
    #[token("byte")]
    #[token("char")]
    #[token("decimal")]
    #[token("double")]
    #[token("float")]
    #[token("int")]
    #[token("long")]
    #[token("object")]
    #[token("sbyte")]
    #[token("short")]
    #[token("string")]
    #[token("uint")]
    #[token("ulong")]
    #[token("ushort")]
    #[token("void")]
    PredefinedType,

    // === Literals ===
    /// An identifier, including contextual keywords and `@`-escaped names.
    #[regex(r"@?[_\p{L}][_\p{L}\p{N}]*")]
    Ident,

    /// An integer or real literal.
    #[regex(r"[0-9][0-9_]*(?:\.[0-9][0-9_]*)?(?:[eE][+-]?[0-9]+)?[fFdDmMuUlL]*")]
    #[regex(r"\.[0-9][0-9_]*(?:[eE][+-]?[0-9]+)?[fFdDmM]?")]
    #[regex(r"0[xX][0-9a-fA-F_]+[uUlL]*")]
    #[regex(r"0[bB][01_]+[uUlL]*")]
    Number,

    /// A regular or verbatim string literal.
    #[regex(r#""(?:[^"\\\r\n]|\\.)*""#)]
    #[regex(r#"@"(?:[^"]|"")*""#)]
    String,

    /// An interpolated string literal; holes are located with [`interpolation_holes`].
    #[token("$\"", lex_interpolated)]
    #[token("$@\"", lex_interpolated)]
    #[token("@$\"", lex_interpolated)]
    InterpolatedString,

    /// A character literal.
    #[regex(r"'(?:[^'\\\r\n]|\\.)+'")]
    Char,

    /// A preprocessor directive line; consumed by the [`Lexer`].
    #[regex(r"#[^\r\n]*", allow_greedy = true)]
    Directive,

    /// End of file
    Eof,

    /// Invalid/unknown token
    #[default]
    Error,
}

impl TokenKind {
    /// Returns true for `true`, `false`, `null`, numbers, strings and chars.
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::True
                | TokenKind::False
                | TokenKind::Null
                | TokenKind::Number
                | TokenKind::String
                | TokenKind::InterpolatedString
                | TokenKind::Char
        )
    }

    /// Returns true for declaration modifiers (`public`, `static`, ...).
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            TokenKind::Abstract
                | TokenKind::Const
                | TokenKind::Extern
                | TokenKind::Internal
                | TokenKind::New
                | TokenKind::Override
                | TokenKind::Private
                | TokenKind::Protected
                | TokenKind::Public
                | TokenKind::Readonly
                | TokenKind::Sealed
                | TokenKind::Static
                | TokenKind::Unsafe
                | TokenKind::Virtual
                | TokenKind::Volatile
        )
    }

    /// Returns true for assignment operators (`=`, `+=`, `??=`, ...).
    pub fn is_assignment_operator(self) -> bool {
        matches!(
            self,
            TokenKind::Eq
                | TokenKind::PlusEq
                | TokenKind::MinusEq
                | TokenKind::StarEq
                | TokenKind::SlashEq
                | TokenKind::PercentEq
                | TokenKind::AmpEq
                | TokenKind::PipeEq
                | TokenKind::CaretEq
                | TokenKind::ShlEq
                | TokenKind::QuestionQuestionEq
        )
    }

    /// Returns a human-readable name for this token kind.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Semicolon => "';'",
            TokenKind::Comma => "','",
            TokenKind::Dot => "'.'",
            TokenKind::Colon => "':'",
            TokenKind::Eq => "'='",
            TokenKind::Lt => "'<'",
            TokenKind::Gt => "'>'",
            TokenKind::FatArrow => "'=>'",
            TokenKind::Ident => "identifier",
            TokenKind::PredefinedType => "type keyword",
            TokenKind::Number => "number",
            TokenKind::String | TokenKind::InterpolatedString => "string",
            TokenKind::Char => "character literal",
            TokenKind::Directive => "preprocessor directive",
            TokenKind::Eof => "end of file",
            TokenKind::Error => "invalid token",
            kind if kind.is_assignment_operator() => "assignment operator",
            _ => "token",
        }
    }
}

fn lex_interpolated(lex: &mut logos::Lexer<TokenKind>) -> bool {
    let verbatim = lex.slice().contains('@');
    match scan_interpolated(lex.remainder().as_bytes(), verbatim, &mut Vec::new()) {
        Some(len) => {
            lex.bump(len);
            true
        }
        None => false,
    }
}

/// Scans the body of an interpolated string (after the opening quote).
///
/// Returns the number of bytes up to and including the closing quote, and
/// pushes the byte range of every `{...}` hole (relative to `body`).
fn scan_interpolated(body: &[u8], verbatim: bool, holes: &mut Vec<Range<usize>>) -> Option<usize> {
    let mut i = 0;
    while i < body.len() {
        match body[i] {
            b'\\' if !verbatim => i += 2,
            b'"' if verbatim && body.get(i + 1) == Some(&b'"') => i += 2,
            b'"' => return Some(i + 1),
            b'\n' if !verbatim => return None,
            b'{' if body.get(i + 1) == Some(&b'{') => i += 2,
            b'}' if body.get(i + 1) == Some(&b'}') => i += 2,
            b'{' => {
                let start = i + 1;
                let end = scan_hole(body, start)?;
                holes.push(start..end);
                i = end + 1;
            }
            _ => i += 1,
        }
    }
    None
}

/// Finds the `}` closing a hole that starts at `start`, skipping nested literals.
fn scan_hole(body: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = start;
    while i < body.len() {
        match body[i] {
            b'{' => depth += 1,
            b'}' if depth == 0 => return Some(i),
            b'}' => depth -= 1,
            b'\'' => {
                i += 1;
                while i < body.len() && body[i] != b'\'' {
                    if body[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            b'"' => i = skip_nested_string(body, i + 1, false, false)?,
            b'@' if body.get(i + 1) == Some(&b'"') => {
                i = skip_nested_string(body, i + 2, true, false)?;
            }
            b'$' | b'@' => {
                let rest = &body[i..];
                let (prefix, verbatim) = if rest.starts_with(b"$@\"") || rest.starts_with(b"@$\"") {
                    (3, true)
                } else if rest.starts_with(b"$\"") {
                    (2, false)
                } else {
                    i += 1;
                    continue;
                };
                i = skip_nested_string(body, i + prefix, verbatim, true)?;
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Returns the index of the closing quote of a string literal nested in a hole.
fn skip_nested_string(body: &[u8], from: usize, verbatim: bool, interpolated: bool) -> Option<usize> {
    if interpolated {
        let len = scan_interpolated(&body[from..], verbatim, &mut Vec::new())?;
        return Some(from + len - 1);
    }
    let mut i = from;
    while i < body.len() {
        match body[i] {
            b'\\' if !verbatim => i += 2,
            b'"' if verbatim && body.get(i + 1) == Some(&b'"') => i += 2,
            b'"' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

/// Returns the spans of the `{...}` holes of an interpolated string token.
pub fn interpolation_holes(token_text: &str, token_start: usize) -> Vec<Span> {
    let prefix = token_text
        .bytes()
        .position(|b| b == b'"')
        .map(|p| p + 1)
        .unwrap_or(token_text.len());
    let verbatim = token_text[..prefix].contains('@');
    let mut holes = Vec::new();
    scan_interpolated(&token_text.as_bytes()[prefix..], verbatim, &mut holes);
    holes
        .into_iter()
        .map(|hole| Span::from_usize(token_start + prefix + hole.start, token_start + prefix + hole.end))
        .collect()
}

/// A lexer for C# source code that applies `#if` conditional compilation.
pub struct Lexer<'src> {
    inner: logos::Lexer<'src, TokenKind>,
    source: &'src str,
    /// Offset of `inner`'s input within `source`.
    base: usize,
    /// End of the lexed window; tokens never extend past it.
    limit: usize,
    preprocessor: Preprocessor,
    errors: Vec<ParseError>,
    finished: bool,
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer for the given source with the given active symbols.
    pub fn new(source: &'src str, defines: &FxHashSet<SmolStr>) -> Self {
        let base = if source.starts_with('\u{FEFF}') { 3 } else { 0 };
        Self::window(source, base..source.len(), Preprocessor::new(defines.clone()))
    }

    /// Lexes only `range` of `source`, with spans still relative to `source`.
    ///
    /// Used for the holes of interpolated strings.
    pub fn new_in_range(source: &'src str, range: Range<usize>) -> Self {
        Self::window(source, range, Preprocessor::new(FxHashSet::default()))
    }

    fn window(source: &'src str, range: Range<usize>, preprocessor: Preprocessor) -> Self {
        Self {
            inner: TokenKind::lexer(&source[range.clone()]),
            source,
            base: range.start,
            limit: range.end,
            preprocessor,
            errors: Vec::new(),
            finished: false,
        }
    }

    /// Returns the source string being lexed.
    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Takes the directive errors collected so far.
    pub fn take_errors(&mut self) -> Vec<ParseError> {
        std::mem::take(&mut self.errors)
    }

    fn current_span(&self) -> Span {
        let span = self.inner.span();
        Span::from_usize(self.base + span.start, self.base + span.end)
    }

    fn restart_at(&mut self, offset: usize) {
        self.inner = TokenKind::lexer(&self.source[offset..self.limit]);
        self.base = offset;
    }

    fn handle_directive(&mut self, span: Span) {
        let text = &self.source[span.start_usize()..span.end_usize()];
        match self.preprocessor.apply(text) {
            Ok(DirectiveEffect::Active) => {}
            Ok(DirectiveEffect::SkipBranch) => {
                let resume = disabled_region_end(self.source, span.end_usize(), self.limit);
                self.restart_at(resume);
            }
            Err(kind) => self.errors.push(ParseError::new(kind, span)),
        }
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.finished {
                return None;
            }

            match self.inner.next() {
                Some(Ok(TokenKind::Directive)) => {
                    let span = self.current_span();
                    self.handle_directive(span);
                }
                Some(Ok(kind)) => {
                    return Some(Token {
                        kind,
                        span: self.current_span(),
                    });
                }
                Some(Err(())) => {
                    return Some(Token {
                        kind: TokenKind::Error,
                        span: self.current_span(),
                    });
                }
                None => {
                    self.finished = true;
                    if self.preprocessor.has_open_conditional() {
                        let end = Span::from_usize(self.limit, self.limit);
                        self.errors.push(ParseError::new(
                            ParseErrorKind::InvalidDirective {
                                message: "missing #endif".to_string(),
                            },
                            end,
                        ));
                    }
                    return Some(Token {
                        kind: TokenKind::Eof,
                        span: Span::from_usize(self.limit, self.limit),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tokenize_with(source: &str, defines: &[&str]) -> Vec<TokenKind> {
        let defines = defines.iter().map(|d| SmolStr::new(d)).collect();
        Lexer::new(source, &defines)
            .map(|t| t.kind)
            .filter(|k| *k != TokenKind::Eof)
            .collect()
    }

    fn tokenize(source: &str) -> Vec<TokenKind> {
        tokenize_with(source, &[])
    }

    #[test]
    fn test_generic_declaration() {
        assert_eq!(
            tokenize("List<int> nums;"),
            vec![
                TokenKind::Ident,
                TokenKind::Lt,
                TokenKind::PredefinedType,
                TokenKind::Gt,
                TokenKind::Ident,
                TokenKind::Semicolon
            ]
        );
    }

    #[test]
    fn test_nested_generic_closers_are_single() {
        assert_eq!(
            tokenize("List<List<int>>"),
            vec![
                TokenKind::Ident,
                TokenKind::Lt,
                TokenKind::Ident,
                TokenKind::Lt,
                TokenKind::PredefinedType,
                TokenKind::Gt,
                TokenKind::Gt
            ]
        );
    }

    #[test]
    fn test_comments_are_trivia() {
        assert_eq!(
            tokenize("a /* List<int> */ = // x[0]\n b;"),
            vec![
                TokenKind::Ident,
                TokenKind::Eq,
                TokenKind::Ident,
                TokenKind::Semicolon
            ]
        );
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            tokenize("new var @class this"),
            vec![
                TokenKind::New,
                TokenKind::Ident,
                TokenKind::Ident,
                TokenKind::This
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            tokenize("1 2.5f 0xFF .5 1e10 10UL"),
            vec![TokenKind::Number; 6]
        );
    }

    #[test]
    fn test_member_access_on_integer() {
        assert_eq!(
            tokenize("1.ToString()"),
            vec![
                TokenKind::Number,
                TokenKind::Dot,
                TokenKind::Ident,
                TokenKind::LParen,
                TokenKind::RParen
            ]
        );
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            tokenize(r#""a\"b" @"c""d" 'x' '\n'"#),
            vec![
                TokenKind::String,
                TokenKind::String,
                TokenKind::Char,
                TokenKind::Char
            ]
        );
    }

    #[test]
    fn test_interpolated_string_with_nested_quotes() {
        let source = r#"$"{map["k"]} and {x}" ;"#;
        assert_eq!(
            tokenize(source),
            vec![TokenKind::InterpolatedString, TokenKind::Semicolon]
        );
    }

    #[test]
    fn test_interpolation_holes() {
        let text = r#"$"a{nums[0]}b{{c}}{x:F2}""#;
        let holes: Vec<&str> = interpolation_holes(text, 0)
            .into_iter()
            .map(|span| &text[span.start_usize()..span.end_usize()])
            .collect();
        assert_eq!(holes, vec!["nums[0]", "x:F2"]);
    }

    #[test]
    fn test_inactive_branch_is_skipped() {
        let source = "#if EDITOR\nfoo;\n#else\nbar;\n#endif\nbaz;";
        assert_eq!(
            tokenize(source),
            vec![
                TokenKind::Ident,
                TokenKind::Semicolon,
                TokenKind::Ident,
                TokenKind::Semicolon
            ]
        );
    }

    #[test]
    fn test_active_branch_uses_defines() {
        let source = "#if EDITOR\nfoo;\n#else\nbar;\n#endif";
        let spans: Vec<Span> = {
            let defines = [SmolStr::new("EDITOR")].into_iter().collect();
            Lexer::new(source, &defines)
                .filter(|t| t.kind == TokenKind::Ident)
                .map(|t| t.span)
                .collect()
        };
        assert_eq!(spans, vec![Span::from_usize(11, 14)]);
    }

    #[test]
    fn test_disabled_text_may_be_malformed() {
        let source = "#if false\nit's \"broken\n#endif\nok;";
        assert_eq!(
            tokenize(source),
            vec![TokenKind::Ident, TokenKind::Semicolon]
        );
    }

    #[test]
    fn test_missing_endif_is_reported() {
        let defines = FxHashSet::default();
        let mut lexer = Lexer::new("#if A\nx;", &defines);
        while lexer.next().is_some() {}
        assert_eq!(lexer.take_errors().len(), 1);
    }

    #[test]
    fn test_bom_is_skipped() {
        assert_eq!(tokenize("\u{FEFF}x"), vec![TokenKind::Ident]);
    }
}
