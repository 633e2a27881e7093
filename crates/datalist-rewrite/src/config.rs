//! Configuration loading.

use crate::cli::Args;
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexSet;
use list_rewriter::RewriteOptions;
use serde::Deserialize;
use smol_str::SmolStr;
use std::fs;
use thiserror::Error;

/// The config file looked up in the working directory.
pub const CONFIG_FILE: &str = "datalist-rewrite.json";

/// Always defined while rewriting, as when UdonSharp compiles the file.
const COMPILER_DEFINE: &str = "COMPILER_UDONSHARP";

/// Editor-only symbols are never defined for UdonSharp.
const EDITOR_DEFINE_PREFIX: &str = "UNITY_EDITOR";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON for the config schema.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Contents of `datalist-rewrite.json`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct RewriteConfig {
    /// Project scripting define symbols.
    pub defines: Vec<String>,

    /// Generic collection type to rewrite.
    pub source_type: Option<String>,

    /// Container type to rewrite into.
    pub target_type: Option<String>,

    /// Element field that holds non-native values.
    pub reference_field: Option<String>,

    /// Glob patterns to skip.
    pub exclude: Vec<String>,
}

impl RewriteConfig {
    /// Loads configuration from a JSON file. Comments are allowed.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        let content = remove_json_comments(&content);
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    /// Finds and loads the config file in a directory, if there is one.
    pub fn find(dir: &Utf8Path) -> Result<Option<(Utf8PathBuf, Self)>, ConfigError> {
        let path = dir.join(CONFIG_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        let config = Self::load(&path)?;
        Ok(Some((path, config)))
    }

    /// Builds the rewrite options; command-line values take precedence.
    pub fn rewrite_options(&self, args: &Args) -> RewriteOptions {
        let defaults = RewriteOptions::default();
        let pick = |flag: &Option<String>, file: &Option<String>, default: SmolStr| {
            flag.as_deref()
                .or(file.as_deref())
                .map(SmolStr::new)
                .unwrap_or(default)
        };

        RewriteOptions {
            defines: collect_defines(
                self.defines
                    .iter()
                    .chain(&args.defines)
                    .map(String::as_str),
            ),
            source_type: pick(&args.source_type, &self.source_type, defaults.source_type),
            target_type: pick(&args.target_type, &self.target_type, defaults.target_type),
            reference_field: pick(
                &args.reference_field,
                &self.reference_field,
                defaults.reference_field,
            ),
        }
    }
}

/// Turns project define symbols into the set seen by UdonSharp: editor
/// symbols are dropped and the compiler symbol is added.
pub fn collect_defines<'a>(defines: impl IntoIterator<Item = &'a str>) -> IndexSet<SmolStr> {
    defines
        .into_iter()
        .map(str::trim)
        .filter(|define| !define.is_empty() && !define.starts_with(EDITOR_DEFINE_PREFIX))
        .chain(std::iter::once(COMPILER_DEFINE))
        .map(SmolStr::new)
        .collect()
}

/// Removes single-line and multi-line comments from JSON.
fn remove_json_comments(json: &str) -> String {
    let mut result = String::with_capacity(json.len());
    let mut chars = json.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            result.push(c);
            if c == '"' {
                in_string = false;
            } else if c == '\\' {
                if let Some(next) = chars.next() {
                    result.push(next);
                }
            }
        } else if c == '"' {
            result.push(c);
            in_string = true;
        } else if c == '/' {
            match chars.peek() {
                Some('/') => {
                    while chars.next_if(|&next| next != '\n').is_some() {}
                }
                Some('*') => {
                    chars.next();
                    while let Some(next) = chars.next() {
                        if next == '*' && chars.peek() == Some(&'/') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => result.push(c),
            }
        } else {
            result.push(c);
        }
    }

    result
}
