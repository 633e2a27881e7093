//! C# parser for UdonSharp sources.
//!
//! This crate provides a parser for the subset of C# that UdonSharp scripts
//! use:
//! - Lexer (tokenizer) using `logos`, with `#if` conditional compilation
//! - Recursive descent parser with speculative disambiguation
//! - AST types whose nodes carry original-source spans and stable ids
//! - A read-only [`visit::Visit`] traversal
//! - Error recovery: unparseable statements and members become `Unknown` nodes
//!
//! # Example
//!
//! ```
//! use csharp_parser::{parse, Member};
//!
//! let source = r#"
//! public class Counter : UdonSharpBehaviour {
//!     private List<int> values = new List<int>();
//! }
//! "#;
//!
//! let result = parse(source);
//! assert!(result.errors.is_empty());
//! assert!(matches!(result.unit.members[0], Member::Type(_)));
//! ```

mod ast;
mod error;
mod lexer;
mod parser;
mod preprocessor;
pub mod visit;

pub use ast::*;
pub use error::{ParseError, ParseErrorKind};
pub use lexer::{Lexer, Token, TokenKind};
pub use offset_map::Span;
pub use preprocessor::evaluate as evaluate_condition;

use rustc_hash::FxHashSet;
use smol_str::SmolStr;

/// Options for parsing C# files.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Preprocessor symbols considered defined for `#if` evaluation.
    pub defines: FxHashSet<SmolStr>,
}

impl ParseOptions {
    /// Creates options with the given preprocessor symbols defined.
    pub fn with_defines<I, S>(defines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            defines: defines
                .into_iter()
                .map(|define| SmolStr::new(define.as_ref()))
                .collect(),
        }
    }
}

/// The result of parsing a C# file.
#[derive(Debug)]
pub struct ParseResult {
    /// The parsed compilation unit.
    pub unit: CompilationUnit,
    /// Any errors encountered during parsing.
    pub errors: Vec<ParseError>,
}

/// Parses a C# source file into an AST with no preprocessor symbols defined.
///
/// This function will attempt to parse the entire file and recover from errors
/// where possible, returning both the AST and any errors encountered.
pub fn parse(source: &str) -> ParseResult {
    parse_with_options(source, &ParseOptions::default())
}

/// Parses a C# source file with custom options.
pub fn parse_with_options(source: &str, options: &ParseOptions) -> ParseResult {
    parser::Parser::new(source, options).parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty() {
        let result = parse("");
        assert!(result.errors.is_empty());
        assert!(result.unit.members.is_empty());
    }

    #[test]
    fn test_defines_select_branch() {
        let source = "#if UDONSHARP\nclass A { }\n#else\nclass B { }\n#endif";
        let result = parse_with_options(source, &ParseOptions::with_defines(["UDONSHARP"]));
        assert!(result.errors.is_empty());
        let Member::Type(decl) = &result.unit.members[0] else {
            panic!("Expected type");
        };
        assert_eq!(decl.name.name.as_str(), "A");

        let result = parse(source);
        let Member::Type(decl) = &result.unit.members[0] else {
            panic!("Expected type");
        };
        assert_eq!(decl.name.name.as_str(), "B");
    }

    #[test]
    fn test_directive_errors_are_reported() {
        let result = parse("class A { }\n#endif");
        assert_eq!(result.errors.len(), 1);
        assert!(matches!(
            result.errors[0].kind,
            ParseErrorKind::InvalidDirective { .. }
        ));
    }
}
