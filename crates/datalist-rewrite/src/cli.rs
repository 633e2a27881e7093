//! CLI argument parsing.

use camino::Utf8PathBuf;
use clap::{ArgAction, Parser, ValueEnum};

/// Rewrites UdonSharp `List<T>` usage into VRChat `DataList`.
///
/// Without `--in-place` or `--out-dir` nothing is written; the run only
/// reports which files would change.
#[derive(Debug, Parser)]
#[command(name = "datalist-rewrite")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Files or directories to rewrite
    #[arg(default_value = ".")]
    pub paths: Vec<Utf8PathBuf>,

    /// Preprocessor symbol to define (repeatable)
    #[arg(short = 'D', long = "define", value_name = "SYMBOL")]
    pub defines: Vec<String>,

    /// Path to datalist-rewrite.json (default: looked up in the working directory)
    #[arg(long)]
    pub config: Option<Utf8PathBuf>,

    /// Generic collection type to rewrite
    #[arg(long = "source-type")]
    pub source_type: Option<String>,

    /// Container type to rewrite into
    #[arg(long = "target-type")]
    pub target_type: Option<String>,

    /// Element field that holds non-native values
    #[arg(long = "reference-field")]
    pub reference_field: Option<String>,

    /// Overwrite changed files
    #[arg(long = "in-place", conflicts_with_all = ["out_dir", "check"])]
    pub in_place: bool,

    /// Write every processed file under this directory, keeping relative paths
    #[arg(long = "out-dir", conflicts_with = "check")]
    pub out_dir: Option<Utf8PathBuf>,

    /// Exit with an error if any file would change
    #[arg(long)]
    pub check: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "human")]
    pub output: OutputFormat,

    /// Glob patterns to ignore, relative to each directory argument
    #[arg(long)]
    pub ignore: Vec<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Output format options.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON report
    Json,
}

/// Where rewritten text goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteMode {
    /// Nothing is written.
    Report,
    /// Changed files are overwritten.
    InPlace,
    /// Every file is written below the directory.
    OutDir(Utf8PathBuf),
}

impl Args {
    /// Returns the write mode selected by the flags.
    pub fn write_mode(&self) -> WriteMode {
        match (&self.out_dir, self.in_place) {
            (Some(dir), _) => WriteMode::OutDir(dir.clone()),
            (None, true) => WriteMode::InPlace,
            (None, false) => WriteMode::Report,
        }
    }
}
