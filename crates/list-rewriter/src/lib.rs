//! Rewrites UdonSharp sources from `List<T>` to VRChat `DataList`.
//!
//! Each pass parses the source once, resolves types once, then walks the tree
//! top-down and edits a copy of the text where one of these shapes matches:
//! - declarations of a `List<T>` variable: the type becomes `DataList`
//! - `new List<T>()` assigned to, or initializing, such a variable
//! - `xs[i]` on such a variable: the element is read back through the
//!   `DataToken` field for `T`, or cast from its `Reference` payload
//!
//! Positions always come from the original parse; an offset ledger maps them
//! into the edited buffer. Everything that does not match is left
//! byte-for-byte intact.
//!
//! # Example
//!
//! ```
//! use list_rewriter::{rewrite, RewriteOptions};
//!
//! let source = r#"
//! class Counter {
//!     List<int> values = new List<int>();
//!     int First() { return values[0]; }
//! }
//! "#;
//!
//! let result = rewrite(source, &RewriteOptions::default()).unwrap();
//! assert!(result.text.contains("DataList values = new DataList();"));
//! assert!(result.text.contains("return values[0].Int;"));
//! ```

mod buffer;
mod classify;
mod error;
mod options;
mod rewrite;

pub use buffer::EditBuffer;
pub use classify::{classify, Classification, NativeKind};
pub use error::{DesyncReason, RewriteError};
pub use options::RewriteOptions;
pub use rewrite::{Edit, Rule};

use csharp_parser::{parse_with_options, CompilationUnit, ParseError, ParseOptions};
use csharp_semantics::{bind, TypeOracle};
use tracing::warn;

/// The outcome of a successful pass.
#[derive(Debug)]
pub struct RewriteResult {
    /// The rewritten text; equal to the input when nothing matched.
    pub text: String,
    /// The applied edits in traversal order.
    pub edits: Vec<Edit>,
    /// Problems the parser recovered from. Unparsed regions are left as is.
    pub parse_errors: Vec<ParseError>,
}

impl RewriteResult {
    /// Returns true if at least one edit was applied.
    pub fn changed(&self) -> bool {
        !self.edits.is_empty()
    }
}

/// Parses, binds and rewrites one source file.
pub fn rewrite(source: &str, options: &RewriteOptions) -> Result<RewriteResult, RewriteError> {
    options.validate()?;
    let parse_options = ParseOptions {
        defines: options.defines.iter().cloned().collect(),
    };
    let parsed = parse_with_options(source, &parse_options);
    let model = bind(&parsed.unit);

    let mut result = rewrite_with_oracle(source, &parsed.unit, &model, options)?;
    result.parse_errors = parsed.errors;
    Ok(result)
}

/// Rewrites an already parsed file using the given type oracle.
///
/// `unit` must be the parse of `source`.
pub fn rewrite_with_oracle<O: TypeOracle + ?Sized>(
    source: &str,
    unit: &CompilationUnit,
    oracle: &O,
    options: &RewriteOptions,
) -> Result<RewriteResult, RewriteError> {
    let (text, edits) = rewrite::Rewriter::new(source, oracle, options)?.run(unit)?;
    Ok(RewriteResult {
        text,
        edits,
        parse_errors: Vec::new(),
    })
}

/// Like [`rewrite`], but returns the original text on any hard failure.
pub fn rewrite_or_original(source: &str, options: &RewriteOptions) -> String {
    match rewrite(source, options) {
        Ok(result) => result.text,
        Err(err) => {
            warn!("keeping original text: {err}");
            source.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_options_fail_before_parsing() {
        let options = RewriteOptions {
            source_type: "List<int>".into(),
            ..RewriteOptions::default()
        };
        assert!(matches!(
            rewrite("class C { }", &options),
            Err(RewriteError::InvalidOption { .. })
        ));
        assert_eq!(rewrite_or_original("class C { }", &options), "class C { }");
    }

    #[test]
    fn test_parse_errors_are_reported_not_fatal() {
        let source = "class C { List<int> xs; void M() { xs[0] = = 1; var y = xs[1]; } }";
        let result = rewrite(source, &RewriteOptions::default()).unwrap();
        assert!(!result.parse_errors.is_empty());
        assert_eq!(
            result.text,
            "class C { DataList xs; void M() { xs[0] = = 1; var y = xs[1].Int; } }"
        );
    }
}
