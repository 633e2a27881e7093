//! Parse error types.

use offset_map::Span;
use thiserror::Error;

/// An error that occurred during parsing.
#[derive(Debug, Clone, Error)]
#[error("{kind}")]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// The location in the source where the error occurred.
    pub span: Span,
}

impl ParseError {
    /// Creates a new parse error.
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The kind of parse error.
#[derive(Debug, Clone, Error)]
pub enum ParseErrorKind {
    /// An unexpected token was encountered.
    #[error("unexpected token: expected {expected}, found {found}")]
    UnexpectedToken {
        /// What was expected.
        expected: String,
        /// What was found.
        found: String,
    },

    /// An unexpected end of file was encountered.
    #[error("unexpected end of file: expected {expected}")]
    UnexpectedEof {
        /// What was expected.
        expected: String,
    },

    /// A malformed or unbalanced preprocessor directive.
    #[error("invalid preprocessor directive: {message}")]
    InvalidDirective {
        /// A description of the problem.
        message: String,
    },

    /// A construct the parser does not model; it is kept as an opaque node.
    #[error("unsupported {construct}")]
    Unsupported {
        /// What was skipped.
        construct: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ParseError::new(
            ParseErrorKind::UnexpectedToken {
                expected: "';'".to_string(),
                found: "}".to_string(),
            },
            Span::from_usize(0, 1),
        );
        assert_eq!(error.to_string(), "unexpected token: expected ';', found }");
    }

    #[test]
    fn test_directive_error_display() {
        let error = ParseError::new(
            ParseErrorKind::InvalidDirective {
                message: "missing #endif".to_string(),
            },
            Span::from_usize(4, 4),
        );
        assert_eq!(
            error.to_string(),
            "invalid preprocessor directive: missing #endif"
        );
    }
}
