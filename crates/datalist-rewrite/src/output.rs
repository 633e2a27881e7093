//! Output formatting.

use crate::cli::OutputFormat;
use camino::Utf8PathBuf;
use serde::Serialize;

/// What happened to one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// Nothing matched.
    Unchanged,
    /// At least one edit was applied.
    Changed,
    /// The pass failed; the original text was kept.
    Failed,
}

/// The result of rewriting one file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReport {
    /// Path as given or discovered.
    pub path: Utf8PathBuf,
    pub status: FileStatus,
    /// Number of applied edits.
    pub edits: usize,
    /// Number of recovered parse errors.
    pub parse_errors: usize,
    /// Why the file failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary of a run.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// Number of files processed.
    pub file_count: usize,
    /// Number of files with edits.
    pub changed_count: usize,
    /// Number of files that failed.
    pub failed_count: usize,
    /// Whether changes count as failure.
    #[serde(skip)]
    pub check: bool,
}

impl RunSummary {
    /// Tallies the per-file reports.
    pub fn from_reports(reports: &[FileReport], check: bool) -> Self {
        let count = |status| reports.iter().filter(|r| r.status == status).count();
        Self {
            file_count: reports.len(),
            changed_count: count(FileStatus::Changed),
            failed_count: count(FileStatus::Failed),
            check,
        }
    }

    /// Returns true if the process should exit with an error.
    pub fn failed(&self) -> bool {
        self.failed_count > 0 || (self.check && self.changed_count > 0)
    }

    /// Formats the summary line.
    pub fn format(&self) -> String {
        let plural = |n: usize, word: &str| {
            if n == 1 {
                format!("{n} {word}")
            } else {
                format!("{n} {word}s")
            }
        };
        let verb = if self.check { "would change" } else { "changed" };
        format!(
            "datalist-rewrite: {} {verb} of {}, {} failed",
            plural(self.changed_count, "file"),
            plural(self.file_count, "file"),
            self.failed_count
        )
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    files: &'a [FileReport],
    summary: &'a RunSummary,
}

/// Renders per-file reports and the summary.
pub fn render(format: OutputFormat, reports: &[FileReport], summary: &RunSummary) -> String {
    match format {
        OutputFormat::Human => render_human(reports, summary),
        OutputFormat::Json => {
            let report = JsonReport {
                files: reports,
                summary,
            };
            serde_json::to_string_pretty(&report).unwrap_or_default()
        }
    }
}

fn render_human(reports: &[FileReport], summary: &RunSummary) -> String {
    let mut output = String::new();
    for report in reports {
        match report.status {
            FileStatus::Unchanged => {}
            FileStatus::Changed => {
                let verb = if summary.check { "would rewrite" } else { "rewrote" };
                output.push_str(&format!("{verb} {} ({} edits)\n", report.path, report.edits));
            }
            FileStatus::Failed => {
                output.push_str(&format!(
                    "failed {}: {}\n",
                    report.path,
                    report.error.as_deref().unwrap_or("unknown error")
                ));
            }
        }
    }
    output.push_str(&summary.format());
    output.push('\n');
    output
}
