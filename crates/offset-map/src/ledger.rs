//! Offset ledger for mapping original positions into an edited buffer.
//!
//! A rewrite pass reads every position from the original parse but applies its
//! edits to a live copy of the text. Each applied edit leaves behind an
//! [`OffsetRecord`] describing how much the buffer grew or shrank at an original
//! anchor; the current position of any original offset is that offset plus the
//! sum of all deltas anchored at or before it.

use crate::ByteOffset;
use text_size::TextSize;

/// The length change introduced by one edit, anchored in original coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OffsetRecord {
    /// Original position at which the edit starts.
    pub anchor: ByteOffset,
    /// Signed change in buffer length caused by the edit.
    pub delta: i64,
}

/// Prefix sums of edit deltas, ordered by original anchor.
///
/// The ledger only grows: records are appended and the list is re-sorted
/// (stably) by anchor, so records sharing an anchor keep insertion order.
#[derive(Debug, Clone, Default)]
pub struct OffsetLedger {
    records: Vec<OffsetRecord>,
}

impl OffsetLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the delta of an edit that started at `anchor`.
    pub fn record(&mut self, anchor: ByteOffset, delta: i64) {
        self.records.push(OffsetRecord { anchor, delta });
        self.records.sort_by_key(|record| record.anchor);
    }

    /// Maps an original position to its position in the current buffer.
    ///
    /// Returns `None` when the accumulated deltas would move the position
    /// before the start of the buffer, which only happens when edits were
    /// recorded out of order or overlap.
    pub fn resolve(&self, original: ByteOffset) -> Option<ByteOffset> {
        let mut current = i64::from(u32::from(original));
        for record in &self.records {
            if record.anchor > original {
                break;
            }
            current += record.delta;
        }

        u32::try_from(current).ok().map(TextSize::from)
    }

    /// Sum of every recorded delta; the buffer length minus the original length.
    pub fn net_delta(&self) -> i64 {
        self.records.iter().map(|record| record.delta).sum()
    }

    /// Returns the number of records.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no edit has been recorded.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates over the records in ascending anchor order.
    pub fn records(&self) -> impl Iterator<Item = &OffsetRecord> {
        self.records.iter()
    }
}
