//! Main orchestration logic.

use crate::cli::{Args, WriteMode};
use crate::config::{ConfigError, RewriteConfig};
use crate::output::{render, FileReport, FileStatus, RunSummary};
use camino::{Utf8Path, Utf8PathBuf};
use globset::{Glob, GlobSet, GlobSetBuilder};
use indexmap::{IndexMap, IndexSet};
use list_rewriter::{rewrite, RewriteError, RewriteOptions};
use miette::Diagnostic;
use offset_map::LineIndex;
use rayon::prelude::*;
use std::fs;
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Directories Unity and the .NET toolchain fill with generated files.
const DEFAULT_IGNORES: [&str; 4] = ["**/Library/**", "**/Temp/**", "**/obj/**", "**/bin/**"];

/// Orchestration errors.
#[derive(Debug, Error, Diagnostic)]
pub enum OrchestratorError {
    /// Invalid glob pattern.
    #[error("invalid glob pattern: {0}")]
    #[diagnostic(code(datalist_rewrite::invalid_glob))]
    InvalidGlob(String),

    /// Config file problem.
    #[error(transparent)]
    #[diagnostic(code(datalist_rewrite::config))]
    Config(#[from] ConfigError),

    /// Unusable rewrite options.
    #[error(transparent)]
    #[diagnostic(
        code(datalist_rewrite::options),
        help("type and field names must be plain C# identifiers")
    )]
    Options(#[from] RewriteError),

    /// A path argument does not exist.
    #[error("path not found: {0}")]
    #[diagnostic(code(datalist_rewrite::missing_path))]
    MissingPath(Utf8PathBuf),

    /// The working directory is unusable.
    #[error("cannot resolve the working directory")]
    #[diagnostic(code(datalist_rewrite::workspace))]
    WorkingDirectory,
}

/// A discovered source file.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SourceFile {
    /// Absolute path.
    path: Utf8PathBuf,
    /// Path below the argument it was found under; used for display and
    /// `--out-dir`.
    relative: Utf8PathBuf,
}

/// Rewrites all files named by the arguments.
pub fn run(args: &Args) -> Result<RunSummary, OrchestratorError> {
    let cwd = std::env::current_dir()
        .ok()
        .and_then(|dir| Utf8PathBuf::try_from(dir).ok())
        .ok_or(OrchestratorError::WorkingDirectory)?;

    let config = match &args.config {
        Some(path) => RewriteConfig::load(&absolute(&cwd, path))?,
        None => match RewriteConfig::find(&cwd)? {
            Some((path, config)) => {
                info!("using {path}");
                config
            }
            None => RewriteConfig::default(),
        },
    };
    let options = config.rewrite_options(args);
    options.validate()?;
    debug!(defines = ?options.defines, "rewrite options ready");

    let ignore_set = build_ignore_set(args.ignore.iter().chain(&config.exclude))?;
    let files = discover(&args.paths, &cwd, &ignore_set)?;
    info!("found {} source files", files.len());

    let mode = args.write_mode();
    let collisions = match &mode {
        WriteMode::OutDir(_) => colliding_targets(&files),
        _ => IndexSet::new(),
    };
    let reports: Vec<FileReport> = files
        .par_iter()
        .map(|file| {
            if collisions.contains(file.relative.as_path()) {
                collision_report(file)
            } else {
                process_file(file, &options, &mode)
            }
        })
        .collect();

    let summary = RunSummary::from_reports(&reports, args.check);
    print!("{}", render(args.output, &reports, &summary));
    Ok(summary)
}

fn absolute(cwd: &Utf8Path, path: &Utf8Path) -> Utf8PathBuf {
    if path.is_relative() {
        cwd.join(path)
    } else {
        path.to_owned()
    }
}

/// Builds the ignore set from user patterns plus the defaults.
fn build_ignore_set<'a>(
    patterns: impl IntoIterator<Item = &'a String>,
) -> Result<GlobSet, OrchestratorError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| OrchestratorError::InvalidGlob(e.to_string()))?;
        builder.add(glob);
    }
    for pattern in DEFAULT_IGNORES {
        if let Ok(glob) = Glob::new(pattern) {
            builder.add(glob);
        }
    }
    builder
        .build()
        .map_err(|e| OrchestratorError::InvalidGlob(e.to_string()))
}

/// Expands the path arguments into `.cs` files. Files named directly are
/// always included; directories are walked and filtered by the ignore set.
fn discover(
    roots: &[Utf8PathBuf],
    cwd: &Utf8Path,
    ignore_set: &GlobSet,
) -> Result<Vec<SourceFile>, OrchestratorError> {
    let mut files = Vec::new();
    for root in roots {
        let root = absolute(cwd, root);
        if root.is_file() {
            let relative = root
                .file_name()
                .map(Utf8PathBuf::from)
                .unwrap_or_else(|| root.clone());
            files.push(SourceFile {
                path: root,
                relative,
            });
            continue;
        }
        if !root.is_dir() {
            return Err(OrchestratorError::MissingPath(root));
        }

        let found = WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| Utf8PathBuf::try_from(e.into_path()).ok())
            .filter(|p| p.extension() == Some("cs"))
            .filter_map(|path| {
                let relative = path.strip_prefix(&root).ok()?.to_owned();
                if ignore_set.is_match(relative.as_str()) {
                    debug!("ignoring {relative}");
                    return None;
                }
                Some(SourceFile { path, relative })
            });
        files.extend(found);
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    files.dedup_by(|a, b| a.path == b.path);
    Ok(files)
}

/// Relative paths shared by files from different roots. Under `--out-dir`
/// they map to the same output file.
fn colliding_targets(files: &[SourceFile]) -> IndexSet<&Utf8Path> {
    let mut counts: IndexMap<&Utf8Path, usize> = IndexMap::new();
    for file in files {
        *counts.entry(file.relative.as_path()).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|&(_, count)| count > 1)
        .map(|(relative, _)| relative)
        .collect()
}

fn collision_report(file: &SourceFile) -> FileReport {
    warn!("{}: several inputs map to this output path", file.path);
    FileReport {
        path: file.relative.clone(),
        status: FileStatus::Failed,
        edits: 0,
        parse_errors: 0,
        error: Some(format!(
            "output path is shared with another input; {} was not written",
            file.path
        )),
    }
}

/// Rewrites one file and writes the result according to the mode.
fn process_file(file: &SourceFile, options: &RewriteOptions, mode: &WriteMode) -> FileReport {
    let mut report = FileReport {
        path: file.relative.clone(),
        status: FileStatus::Unchanged,
        edits: 0,
        parse_errors: 0,
        error: None,
    };

    let source = match fs::read_to_string(&file.path) {
        Ok(source) => source,
        Err(err) => {
            warn!("failed to read {}: {err}", file.path);
            report.status = FileStatus::Failed;
            report.error = Some(format!("failed to read file: {err}"));
            return report;
        }
    };

    let text = match rewrite(&source, options) {
        Ok(result) => {
            if !result.parse_errors.is_empty() {
                let lines = LineIndex::new(&source);
                for error in &result.parse_errors {
                    let location = lines.line_col(error.span.start).unwrap_or_default();
                    warn!("{}:{location}: {error}", file.relative);
                }
            }
            report.parse_errors = result.parse_errors.len();
            report.edits = result.edits.len();
            if result.changed() {
                report.status = FileStatus::Changed;
            }
            result.text
        }
        Err(err) => {
            warn!("{}: keeping original text: {err}", file.relative);
            report.status = FileStatus::Failed;
            report.error = Some(err.to_string());
            source
        }
    };

    let target = match mode {
        WriteMode::Report => None,
        WriteMode::InPlace => (report.status == FileStatus::Changed).then(|| file.path.clone()),
        WriteMode::OutDir(dir) => Some(dir.join(&file.relative)),
    };
    if let Some(target) = target {
        if let Err(err) = write_file(&target, &text) {
            warn!("failed to write {target}: {err}");
            report.status = FileStatus::Failed;
            report.error = Some(format!("failed to write {target}: {err}"));
        }
    }
    report
}

fn write_file(path: &Utf8Path, text: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, text)
}
