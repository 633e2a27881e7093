//! Error types for rewriting.

use offset_map::{LineCol, Span};
use smol_str::SmolStr;
use thiserror::Error;

/// Why a resolved position could not be used to edit the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DesyncReason {
    /// The resolved range lies outside the current buffer.
    #[error("resolved range is outside the buffer")]
    OutOfBounds,
    /// The resolved range splits a UTF-8 character.
    #[error("resolved range splits a character")]
    NotCharBoundary,
    /// The buffer no longer holds the node's original text at the resolved range.
    #[error("buffer text no longer matches the original node")]
    TextMismatch,
}

/// A hard failure of a rewrite pass.
///
/// Any of these rejects the whole file: callers should keep the original text
/// rather than a partially rewritten buffer.
#[derive(Debug, Error)]
pub enum RewriteError {
    /// The offset ledger and the edit buffer disagree.
    #[error("buffer desync while rewriting {node} at {location}: {reason}")]
    BufferDesync {
        /// The kind of node being rewritten.
        node: &'static str,
        /// The node's span in the original text.
        span: Span,
        /// The node's position in the original text.
        location: LineCol,
        /// What went wrong.
        reason: DesyncReason,
    },

    /// A configured type or field name is not a valid C# identifier.
    #[error("invalid {option} `{value}`: expected a C# identifier")]
    InvalidOption {
        /// The option name.
        option: &'static str,
        /// The rejected value.
        value: SmolStr,
    },

    /// The declaration pattern built from the options failed to compile.
    #[error("invalid declaration pattern: {0}")]
    Pattern(#[from] regex::Error),
}
