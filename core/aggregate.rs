use crate::error::{AppError, Result};
use crate::filter::ExclusionRules;
use log;
#[cfg(feature = "serde_support")]
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

pub const SEPARATOR_WIDTH: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize))]
#[cfg_attr(feature = "serde_support", serde(rename_all = "snake_case"))]
pub enum SkipReason {
    Binary,
    Read(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Binary => f.write_str("not valid UTF-8 text"),
            SkipReason::Read(message) => f.write_str(message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize))]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: SkipReason,
}

impl SkippedFile {
    /// One-line message for the diagnostic channel.
    pub fn diagnostic(&self) -> String {
        match &self.reason {
            SkipReason::Binary => format!("Skipped binary file: {}", self.path.display()),
            SkipReason::Read(message) => {
                format!("Error processing file {}: {}", self.path.display(), message)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize))]
pub struct AggregateReport {
    pub files_written: usize,
    pub bytes_written: u64,
    pub skipped: Vec<SkippedFile>,
}

#[derive(Debug)]
struct Candidate {
    absolute: PathBuf,
    relative: PathBuf,
}

/// Header written before every file body.
pub fn banner(relative_path: &Path) -> String {
    let rule = "=".repeat(SEPARATOR_WIDTH);
    format!("\n{}\nFile: {}\n{}\n\n", rule, relative_path.display(), rule)
}

/// Relative paths of every file [`aggregate_files`] would try to read, in order.
pub fn plan_files(root: &Path, rules: &ExclusionRules, skip: Option<&Path>) -> Vec<PathBuf> {
    collect_candidates(root, rules, skip)
        .into_iter()
        .map(|c| c.relative)
        .collect()
}

/// Appends a banner and the text of every non-excluded file under `root` to `writer`.
///
/// Files that cannot be read or are not UTF-8 are left out of the stream and
/// listed in the returned report. Only failures of `writer` abort the run.
pub fn aggregate_files<W: Write>(
    root: &Path,
    rules: &ExclusionRules,
    skip: Option<&Path>,
    writer: &mut W,
) -> Result<AggregateReport> {
    let candidates = collect_candidates(root, rules, skip);
    log::info!("Aggregating content of {} files...", candidates.len());

    let mut report = AggregateReport::default();
    for candidate in candidates {
        match read_text(&candidate.absolute) {
            Ok(content) => {
                write_section(writer, &candidate.relative, &content)
                    .map_err(AppError::OutputWrite)?;
                report.files_written += 1;
                report.bytes_written += content.len() as u64;
                log::trace!("Wrote section for: {}", candidate.relative.display());
            }
            Err(reason) => {
                let skipped = SkippedFile {
                    path: candidate.relative,
                    reason,
                };
                log::debug!("{}", skipped.diagnostic());
                report.skipped.push(skipped);
            }
        }
    }

    log::info!(
        "Aggregation complete: {} written, {} skipped.",
        report.files_written,
        report.skipped.len()
    );
    Ok(report)
}

fn write_section<W: Write>(writer: &mut W, relative: &Path, content: &str) -> std::io::Result<()> {
    writer.write_all(banner(relative).as_bytes())?;
    writer.write_all(content.as_bytes())?;
    writer.write_all(b"\n")
}

fn read_text(path: &Path) -> std::result::Result<String, SkipReason> {
    let bytes = fs::read(path).map_err(|e| SkipReason::Read(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| {
        log::debug!("Skipping non-UTF-8 file: {} ({})", path.display(), e);
        SkipReason::Binary
    })
}

fn collect_candidates(root: &Path, rules: &ExclusionRules, skip: Option<&Path>) -> Vec<Candidate> {
    log::debug!("Walking directory for aggregation: {}", root.display());
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by(files_before_dirs)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_pruned_dir(entry, rules));

    let mut candidates = Vec::new();
    for entry_result in walker {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Error walking directory: {}", e);
                continue;
            }
        };
        if !is_file_like(&entry) {
            continue;
        }
        if rules.is_file_excluded(entry.file_name()) {
            continue;
        }

        let relative = pathdiff::diff_paths(entry.path(), root)
            .unwrap_or_else(|| entry.path().to_path_buf());
        if skip.is_some_and(|s| s == relative) {
            log::trace!("Skipping output file: {}", relative.display());
            continue;
        }
        candidates.push(Candidate {
            absolute: entry.into_path(),
            relative,
        });
    }
    candidates
}

fn is_pruned_dir(entry: &DirEntry, rules: &ExclusionRules) -> bool {
    entry.file_type().is_dir() && rules.is_dir_excluded(entry.file_name())
}

/// Regular files and symlinks that do not point at a directory.
fn is_file_like(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    if file_type.is_dir() {
        return false;
    }
    if file_type.is_symlink() {
        return !entry.path().is_dir();
    }
    true
}

/// Files of a directory are emitted before anything found in its subdirectories.
fn files_before_dirs(a: &DirEntry, b: &DirEntry) -> Ordering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}
