//! Per-invocation rewrite configuration.

use crate::error::RewriteError;
use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;
use smol_str::SmolStr;

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^@?[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern must compile")
});

/// Options for one rewrite pass.
#[derive(Debug, Clone)]
pub struct RewriteOptions {
    /// Preprocessor symbols considered defined while parsing.
    pub defines: IndexSet<SmolStr>,
    /// The generic collection type to rewrite (bare name).
    pub source_type: SmolStr,
    /// The container type it is rewritten into.
    pub target_type: SmolStr,
    /// The field of a container element that holds non-native values.
    pub reference_field: SmolStr,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            defines: IndexSet::new(),
            source_type: SmolStr::new_static("List"),
            target_type: SmolStr::new_static("DataList"),
            reference_field: SmolStr::new_static("Reference"),
        }
    }
}

impl RewriteOptions {
    /// Creates default options with the given preprocessor symbols defined.
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
            ..Self::default()
        }
    }

    /// Checks that the configured names are identifiers.
    pub fn validate(&self) -> Result<(), RewriteError> {
        for (option, value) in [
            ("source type", &self.source_type),
            ("target type", &self.target_type),
            ("reference field", &self.reference_field),
        ] {
            if !IDENTIFIER.is_match(value) {
                return Err(RewriteError::InvalidOption {
                    option,
                    value: value.clone(),
                });
            }
        }
        Ok(())
    }

    /// Builds the pattern that locates the generic source type inside the
    /// text of a declared type: an optional dotted qualifier, the source type
    /// name and one bracketed argument list, which may nest generics and
    /// array brackets.
    pub(crate) fn declaration_pattern(&self) -> Result<Regex, RewriteError> {
        let pattern = format!(
            r"(?:[A-Za-z_][A-Za-z0-9_]*\s*\.\s*)*\b{}\s*<[A-Za-z0-9_<>,.?\[\]\s]+>",
            regex::escape(&self.source_type)
        );
        Ok(Regex::new(&pattern)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches<'t>(pattern: &Regex, text: &'t str) -> Vec<&'t str> {
        pattern.find_iter(text).map(|m| m.as_str()).collect()
    }

    #[test]
    fn test_defaults_validate() {
        let options = RewriteOptions::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.target_type, "DataList");
    }

    #[test]
    fn test_invalid_names_rejected() {
        let options = RewriteOptions {
            target_type: "Data List".into(),
            ..RewriteOptions::default()
        };
        let Err(RewriteError::InvalidOption { option, value }) = options.validate() else {
            panic!("Expected invalid option");
        };
        assert_eq!(option, "target type");
        assert_eq!(value, "Data List");
    }

    #[test]
    fn test_declaration_pattern() {
        let pattern = RewriteOptions::default().declaration_pattern().unwrap();
        assert_eq!(matches(&pattern, "List<int>"), vec!["List<int>"]);
        assert_eq!(matches(&pattern, "List<List<int>>"), vec!["List<List<int>>"]);
        assert_eq!(matches(&pattern, "List<int[]>"), vec!["List<int[]>"]);
        assert_eq!(
            matches(&pattern, "System.Collections.Generic.List<string>"),
            vec!["System.Collections.Generic.List<string>"]
        );
        assert_eq!(matches(&pattern, "List < float >"), vec!["List < float >"]);
        assert!(matches(&pattern, "var").is_empty());
        assert!(matches(&pattern, "IList<int>").is_empty());
        assert!(matches(&pattern, "List").is_empty());
    }
}
