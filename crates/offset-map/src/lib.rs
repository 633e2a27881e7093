//! Source position tracking for in-place rewriting.
//!
//! This crate provides the position vocabulary shared by the parser and the
//! rewriter: byte [`Span`]s over the original text, a [`LineIndex`] for
//! human-readable locations, and the [`OffsetLedger`] that maps original
//! positions into a buffer that has already been edited.

mod ledger;
mod line_index;
mod span;

pub use ledger::{OffsetLedger, OffsetRecord};
pub use line_index::{LineCol, LineIndex};
pub use span::{ByteOffset, Span};
