//! The mutable text buffer of one rewrite pass.

use crate::error::{DesyncReason, RewriteError};
use offset_map::{ByteOffset, LineIndex, OffsetLedger, Span};

/// A working copy of the source plus the ledger that maps original
/// positions into it.
///
/// Every edit is addressed by a span of the original text. The span is
/// resolved through the ledger, checked against the buffer, applied, and its
/// length change recorded before the next edit can be made.
#[derive(Debug)]
pub struct EditBuffer<'a> {
    original: &'a str,
    text: String,
    ledger: OffsetLedger,
    lines: LineIndex,
}

impl<'a> EditBuffer<'a> {
    /// Starts a buffer over the original text.
    pub fn new(original: &'a str) -> Self {
        Self {
            original,
            text: original.to_string(),
            ledger: OffsetLedger::new(),
            lines: LineIndex::new(original),
        }
    }

    /// The current text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The ledger of applied edits.
    pub fn ledger(&self) -> &OffsetLedger {
        &self.ledger
    }

    /// Consumes the buffer, returning the current text.
    pub fn into_text(self) -> String {
        self.text
    }

    fn desync(&self, node: &'static str, span: Span, reason: DesyncReason) -> RewriteError {
        RewriteError::BufferDesync {
            node,
            span,
            location: self.lines.line_col(span.start).unwrap_or_default(),
            reason,
        }
    }

    /// Resolves an original position to a checked index into the buffer.
    fn resolve(
        &self,
        position: ByteOffset,
        node: &'static str,
        span: Span,
    ) -> Result<usize, RewriteError> {
        let resolved = self
            .ledger
            .resolve(position)
            .map(|offset| u32::from(offset) as usize)
            .filter(|&offset| offset <= self.text.len())
            .ok_or_else(|| self.desync(node, span, DesyncReason::OutOfBounds))?;
        if !self.text.is_char_boundary(resolved) {
            return Err(self.desync(node, span, DesyncReason::NotCharBoundary));
        }
        Ok(resolved)
    }

    /// Returns the buffer range currently holding `span`, after checking that
    /// it still contains the span's original text.
    fn current_range(
        &self,
        span: Span,
        node: &'static str,
    ) -> Result<std::ops::Range<usize>, RewriteError> {
        let original = span
            .slice(self.original)
            .ok_or_else(|| self.desync(node, span, DesyncReason::OutOfBounds))?;
        let start = self.resolve(span.start, node, span)?;
        let end = start + original.len();
        let current = self
            .text
            .get(start..end)
            .ok_or_else(|| self.desync(node, span, DesyncReason::OutOfBounds))?;
        if current != original {
            return Err(self.desync(node, span, DesyncReason::TextMismatch));
        }
        Ok(start..end)
    }

    /// Returns the current text of an original span.
    pub fn current_text(&self, span: Span, node: &'static str) -> Result<&str, RewriteError> {
        let range = self.current_range(span, node)?;
        Ok(&self.text[range])
    }

    /// Replaces the text of an original span.
    pub fn replace(
        &mut self,
        span: Span,
        replacement: &str,
        node: &'static str,
    ) -> Result<(), RewriteError> {
        let range = self.current_range(span, node)?;
        let delta = replacement.len() as i64 - range.len() as i64;
        self.text.replace_range(range, replacement);
        self.ledger.record(span.start, delta);
        Ok(())
    }

    /// Inserts text immediately before an original span.
    pub fn insert_before(
        &mut self,
        span: Span,
        insertion: &str,
        node: &'static str,
    ) -> Result<(), RewriteError> {
        self.current_range(span, node)?;
        self.insert_at(span.start, span, insertion, node)
    }

    /// Inserts text immediately after an original span.
    pub fn insert_after(
        &mut self,
        span: Span,
        insertion: &str,
        node: &'static str,
    ) -> Result<(), RewriteError> {
        self.insert_at(span.end, span, insertion, node)
    }

    fn insert_at(
        &mut self,
        position: ByteOffset,
        span: Span,
        insertion: &str,
        node: &'static str,
    ) -> Result<(), RewriteError> {
        let at = self.resolve(position, node, span)?;
        self.text.insert_str(at, insertion);
        self.ledger.record(position, insertion.len() as i64);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn span_of(source: &str, needle: &str) -> Span {
        let start = source.find(needle).expect("needle");
        Span::from_usize(start, start + needle.len())
    }

    #[test]
    fn test_three_edits_in_order() {
        let source = "List<int> a; List<int> b; x = a[0];";
        let mut buffer = EditBuffer::new(source);

        buffer
            .replace(Span::from_usize(0, 9), "DataList", "declaration")
            .unwrap();
        buffer
            .replace(Span::from_usize(13, 22), "DataList", "declaration")
            .unwrap();
        buffer
            .insert_after(span_of(source, "a[0]"), ".Int", "element access")
            .unwrap();

        assert_eq!(buffer.text(), "DataList a; DataList b; x = a[0].Int;");
        assert_eq!(buffer.ledger().net_delta(), 2);
    }

    #[test]
    fn test_wrap_keeps_inner_spans_resolvable() {
        let source = "f(a[b[0]]);";
        let mut buffer = EditBuffer::new(source);
        let outer = span_of(source, "a[b[0]]");
        let inner = span_of(source, "b[0]");

        buffer.insert_before(outer, "((Foo)(", "element access").unwrap();
        buffer.insert_after(outer, ").Reference)", "element access").unwrap();
        assert_eq!(buffer.current_text(inner, "element access").unwrap(), "b[0]");

        buffer.insert_after(inner, ".Int", "element access").unwrap();
        assert_eq!(buffer.text(), "f(((Foo)(a[b[0].Int]).Reference));");
    }

    #[test]
    fn test_text_mismatch_is_desync() {
        let source = "List<int> a;\nList<int> b;";
        let mut buffer = EditBuffer::new(source);
        buffer
            .replace(Span::from_usize(0, 12), "x;", "declaration")
            .unwrap();

        // Overlaps the edit above.
        let err = buffer
            .replace(Span::from_usize(5, 9), "float", "declaration")
            .unwrap_err();
        assert!(matches!(
            err,
            RewriteError::BufferDesync {
                reason: DesyncReason::TextMismatch | DesyncReason::OutOfBounds,
                ..
            }
        ));
    }

    #[test]
    fn test_out_of_bounds_reports_location() {
        let source = "a\nbc";
        let buffer = EditBuffer::new(source);
        let err = buffer
            .current_text(Span::from_usize(3, 10), "assignment")
            .unwrap_err();
        let RewriteError::BufferDesync {
            node,
            location,
            reason,
            ..
        } = err
        else {
            panic!("Expected desync");
        };
        assert_eq!(node, "assignment");
        assert_eq!(location.to_string(), "2:2");
        assert_eq!(reason, DesyncReason::OutOfBounds);
    }
}
