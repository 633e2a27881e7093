//! Conditional compilation (`#if` / `#elif` / `#else` / `#endif`).
//!
//! The preprocessor only decides which regions are live; it never rewrites
//! text. Disabled regions are stepped over line by line so that unbalanced
//! quotes or braces inside them cannot confuse the lexer.

use crate::error::ParseErrorKind;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;

/// What the lexer should do after a directive line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DirectiveEffect {
    /// Keep lexing the following lines.
    Active,
    /// The following lines up to the next sibling directive are disabled.
    SkipBranch,
}

#[derive(Debug, Clone, Copy)]
struct Conditional {
    /// Whether some branch of this `#if` chain has already been taken.
    taken: bool,
    seen_else: bool,
}

/// Tracks defined symbols and the stack of open conditionals.
#[derive(Debug, Clone, Default)]
pub(crate) struct Preprocessor {
    symbols: FxHashSet<SmolStr>,
    stack: Vec<Conditional>,
}

impl Preprocessor {
    pub(crate) fn new(symbols: FxHashSet<SmolStr>) -> Self {
        Self {
            symbols,
            stack: Vec::new(),
        }
    }

    pub(crate) fn has_open_conditional(&self) -> bool {
        !self.stack.is_empty()
    }

    /// Applies one directive line (including the leading `#`).
    pub(crate) fn apply(&mut self, line: &str) -> Result<DirectiveEffect, ParseErrorKind> {
        let (keyword, rest) = split_directive(line);

        match keyword {
            "if" => {
                // A malformed condition still opens a conditional (lexed as
                // active) so that its #endif stays balanced.
                let condition = self.evaluate(rest);
                let taken = *condition.as_ref().unwrap_or(&true);
                self.stack.push(Conditional {
                    taken,
                    seen_else: false,
                });
                condition.map(branch_effect)
            }
            "elif" => {
                let symbols = &self.symbols;
                let top = self
                    .stack
                    .last_mut()
                    .ok_or_else(|| invalid("#elif without matching #if"))?;
                if top.seen_else {
                    return Err(invalid("#elif after #else"));
                }
                if top.taken {
                    return Ok(DirectiveEffect::SkipBranch);
                }
                top.taken = evaluate(rest, symbols)?;
                Ok(branch_effect(top.taken))
            }
            "else" => {
                let top = self
                    .stack
                    .last_mut()
                    .ok_or_else(|| invalid("#else without matching #if"))?;
                if top.seen_else {
                    return Err(invalid("duplicate #else"));
                }
                top.seen_else = true;
                let take = !top.taken;
                top.taken = true;
                Ok(branch_effect(take))
            }
            "endif" => {
                self.stack
                    .pop()
                    .ok_or_else(|| invalid("#endif without matching #if"))?;
                Ok(DirectiveEffect::Active)
            }
            "define" => {
                self.symbols.insert(SmolStr::new(rest));
                Ok(DirectiveEffect::Active)
            }
            "undef" => {
                self.symbols.remove(rest);
                Ok(DirectiveEffect::Active)
            }
            // #region, #endregion, #pragma, #nullable, #warning, #error, #line
            _ => Ok(DirectiveEffect::Active),
        }
    }

    fn evaluate(&self, expr: &str) -> Result<bool, ParseErrorKind> {
        evaluate(expr, &self.symbols)
    }
}

fn branch_effect(taken: bool) -> DirectiveEffect {
    if taken {
        DirectiveEffect::Active
    } else {
        DirectiveEffect::SkipBranch
    }
}

fn invalid(message: &str) -> ParseErrorKind {
    ParseErrorKind::InvalidDirective {
        message: message.to_string(),
    }
}

/// Splits `#  if  A && B // note` into (`if`, `A && B`).
fn split_directive(line: &str) -> (&str, &str) {
    let body = line.trim_start().trim_start_matches('#').trim_start();
    let keyword_len = body
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(body.len());
    let (keyword, rest) = body.split_at(keyword_len);
    let rest = rest.split("//").next().unwrap_or("").trim();
    (keyword, rest)
}

/// Returns the offset at which lexing resumes after a disabled branch.
///
/// `from` is the end of the directive line that disabled the branch. The scan
/// stops at the start of the line holding the `#elif`, `#else` or `#endif`
/// that belongs to the same conditional, or at `limit`.
pub(crate) fn disabled_region_end(source: &str, from: usize, limit: usize) -> usize {
    let mut depth = 0usize;
    let Some(newline) = source[from..limit].find('\n') else {
        return limit;
    };
    let mut line_start = from + newline + 1;

    while line_start < limit {
        let line_end = source[line_start..limit]
            .find('\n')
            .map(|n| line_start + n)
            .unwrap_or(limit);
        let line = source[line_start..line_end].trim_start();

        if line.starts_with('#') {
            match split_directive(line).0 {
                "if" => depth += 1,
                "endif" if depth == 0 => return line_start,
                "endif" => depth -= 1,
                "elif" | "else" if depth == 0 => return line_start,
                _ => {}
            }
        }

        line_start = line_end + 1;
    }

    limit
}

/// Evaluates a conditional expression over the defined symbols.
pub fn evaluate(expr: &str, symbols: &FxHashSet<SmolStr>) -> Result<bool, ParseErrorKind> {
    let mut parser = ConditionParser {
        input: expr.as_bytes(),
        pos: 0,
        symbols,
    };
    let value = parser.parse_or()?;
    parser.skip_ws();
    if parser.pos != parser.input.len() {
        return Err(invalid(&format!("unexpected input in condition `{expr}`")));
    }
    Ok(value)
}

struct ConditionParser<'a> {
    input: &'a [u8],
    pos: usize,
    symbols: &'a FxHashSet<SmolStr>,
}

impl ConditionParser<'_> {
    fn skip_ws(&mut self) {
        while self.input.get(self.pos).is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, op: &str) -> bool {
        self.skip_ws();
        if self.input[self.pos..].starts_with(op.as_bytes()) {
            self.pos += op.len();
            true
        } else {
            false
        }
    }

    fn parse_or(&mut self) -> Result<bool, ParseErrorKind> {
        let mut value = self.parse_and()?;
        while self.eat("||") {
            let rhs = self.parse_and()?;
            value = value || rhs;
        }
        Ok(value)
    }

    fn parse_and(&mut self) -> Result<bool, ParseErrorKind> {
        let mut value = self.parse_equality()?;
        while self.eat("&&") {
            let rhs = self.parse_equality()?;
            value = value && rhs;
        }
        Ok(value)
    }

    fn parse_equality(&mut self) -> Result<bool, ParseErrorKind> {
        let mut value = self.parse_unary()?;
        loop {
            if self.eat("==") {
                value = value == self.parse_unary()?;
            } else if self.eat("!=") {
                value = value != self.parse_unary()?;
            } else {
                return Ok(value);
            }
        }
    }

    fn parse_unary(&mut self) -> Result<bool, ParseErrorKind> {
        if self.eat("!") {
            return Ok(!self.parse_unary()?);
        }
        if self.eat("(") {
            let value = self.parse_or()?;
            if !self.eat(")") {
                return Err(invalid("expected `)` in condition"));
            }
            return Ok(value);
        }

        self.skip_ws();
        let start = self.pos;
        while self
            .input
            .get(self.pos)
            .is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'_')
        {
            self.pos += 1;
        }
        match std::str::from_utf8(&self.input[start..self.pos]).unwrap_or("") {
            "" => Err(invalid("expected symbol in condition")),
            "true" => Ok(true),
            "false" => Ok(false),
            symbol => Ok(self.symbols.contains(symbol)),
        }
    }
}
