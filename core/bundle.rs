use crate::aggregate::{self, AggregateReport, SEPARATOR_WIDTH, SkippedFile};
use crate::config::BundleConfig;
use crate::error::{AppError, Result};
use crate::filter::ExclusionRules;
use crate::tree::{self, DirectoryTree};
use log;
#[cfg(feature = "serde_support")]
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const TREE_HEADING: &str = "Directory Tree:";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize))]
pub struct BundleReport {
    /// Rendered tree lines, root included; zero when the tree header is off.
    pub tree_lines: usize,
    pub files_written: usize,
    pub bytes_written: u64,
    pub skipped: Vec<SkippedFile>,
}

impl BundleReport {
    fn new(tree_lines: usize, aggregate: AggregateReport) -> Self {
        Self {
            tree_lines,
            files_written: aggregate.files_written,
            bytes_written: aggregate.bytes_written,
            skipped: aggregate.skipped,
        }
    }
}

/// Writes the whole document to `config.output_file`, truncating any previous run.
///
/// When the output file lies inside the root it is left out of both the tree
/// and the file sections.
pub fn run_bundle(config: &BundleConfig) -> Result<BundleReport> {
    let rules = config.exclusion_rules()?;
    let output_path = &config.output_file;

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| AppError::DirCreation {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let skip = config.output_path_in_root();

    log::info!("Writing bundle to: {}", output_path.display());
    let file = File::create(output_path).map_err(|source| file_write_error(output_path, source))?;
    let mut writer = BufWriter::new(file);

    let report = write_document(config, &rules, skip.as_deref(), &mut writer).map_err(|e| match e {
        AppError::OutputWrite(source) => file_write_error(output_path, source),
        other => other,
    })?;
    writer
        .flush()
        .map_err(|source| file_write_error(output_path, source))?;

    log::info!(
        "Bundle written: {} files, {} bytes of content.",
        report.files_written,
        report.bytes_written
    );
    Ok(report)
}

/// Writes the whole document to an arbitrary sink, such as stdout or a buffer.
///
/// `config.output_file` is not touched here, so a file at that path inside the
/// root is bundled like any other.
pub fn write_bundle<W: Write>(config: &BundleConfig, writer: &mut W) -> Result<BundleReport> {
    let rules = config.exclusion_rules()?;
    write_document(config, &rules, None, writer)
}

pub fn render_tree_for(config: &BundleConfig) -> Result<DirectoryTree> {
    let rules = config.exclusion_rules()?;
    tree::render_tree(&config.root_dir, &rules)
}

/// Relative paths the aggregator would read for `config`, in output order.
pub fn plan_files_for(config: &BundleConfig) -> Result<Vec<PathBuf>> {
    let rules = config.exclusion_rules()?;
    Ok(aggregate::plan_files(&config.root_dir, &rules, None))
}

pub fn tree_section(tree: &DirectoryTree) -> String {
    format!(
        "{}\n{}\n\n{}\n\n",
        TREE_HEADING,
        tree,
        "=".repeat(SEPARATOR_WIDTH)
    )
}

fn write_document<W: Write>(
    config: &BundleConfig,
    rules: &ExclusionRules,
    skip: Option<&Path>,
    writer: &mut W,
) -> Result<BundleReport> {
    let mut tree_lines = 0;
    if config.emit_tree {
        let tree = tree::render_tree_excluding(&config.root_dir, rules, skip)?;
        writer
            .write_all(tree_section(&tree).as_bytes())
            .map_err(AppError::OutputWrite)?;
        tree_lines = tree.lines().len();
    } else {
        log::debug!("Tree header disabled; writing file sections only.");
    }

    let aggregate = aggregate::aggregate_files(&config.root_dir, rules, skip, writer)?;
    Ok(BundleReport::new(tree_lines, aggregate))
}

fn file_write_error(path: &Path, source: std::io::Error) -> AppError {
    AppError::FileWrite {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn tree_section_is_framed_by_heading_and_rule() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("demo");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("x.txt"), "x").unwrap();

        let config = BundleConfig::new(&root, tmp.path().join("out.txt"));
        let tree = render_tree_for(&config).unwrap();
        let rule = "=".repeat(40);
        assert_eq!(
            tree_section(&tree),
            format!("Directory Tree:\ndemo/\n└── x.txt\n\n{rule}\n\n")
        );
    }

    #[test]
    fn invalid_pattern_fails_before_output_is_created() {
        let tmp = TempDir::new().unwrap();
        let output = tmp.path().join("out").join("bundle.txt");
        let config = BundleConfig::new(tmp.path(), &output).with_exclude_files(["[z-a]"]);

        let err = run_bundle(&config).unwrap_err();
        assert!(matches!(err, AppError::Glob(_)));
        assert!(!output.exists());
    }

    #[test]
    fn disabled_tree_writes_sections_only() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("demo");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("x.txt"), "x").unwrap();

        let config = BundleConfig::new(&root, tmp.path().join("out.txt")).with_tree(false);
        let mut buffer = Vec::new();
        let report = write_bundle(&config, &mut buffer).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        assert!(!output.contains(TREE_HEADING));
        assert!(output.starts_with(&aggregate::banner(Path::new("x.txt"))));
        assert_eq!(report.tree_lines, 0);
        assert_eq!(report.files_written, 1);
    }

    #[test]
    fn sink_and_tree_modes_keep_a_file_named_like_the_output() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("demo");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("a.txt"), "a").unwrap();
        fs::write(root.join("giveAi.txt"), "user notes").unwrap();
        let config = BundleConfig::new(&root, root.join("giveAi.txt"));

        let tree = render_tree_for(&config).unwrap();
        assert_eq!(tree.lines(), &["demo/", "├── a.txt", "└── giveAi.txt"]);

        let planned = plan_files_for(&config).unwrap();
        assert_eq!(planned, vec![PathBuf::from("a.txt"), PathBuf::from("giveAi.txt")]);

        let mut buffer = Vec::new();
        let report = write_bundle(&config, &mut buffer).unwrap();
        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains("File: giveAi.txt\n"));
        assert!(output.contains("user notes"));
        assert_eq!(report.files_written, 2);
    }
}
