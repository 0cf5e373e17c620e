use crate::error::{AppError, Result};
use crate::filter::ExclusionRules;
use log;
#[cfg(feature = "serde_support")]
use serde::Serialize;
use std::env;
use std::path::{Path, PathBuf};

pub const DEFAULT_ROOT_DIR: &str = ".";
pub const DEFAULT_OUTPUT_FILE: &str = "giveAi.txt";
pub const ROOT_DIR_ENV: &str = "DIRBUNDLE_ROOT";

pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &[".git", ".idea", "__pycache__"];
pub const DEFAULT_EXCLUDE_FILES: &[&str] = &[".DS_Store", "*.log", "*.bin", "*.pyc", ".gitignore"];

/// Settings for a single bundling run.
///
/// Built once by the caller and handed to the pipeline by reference; nothing in
/// the core crate mutates it. `exclude_files` holds globs matched against whole
/// file names, so `*.log` and `Cargo.lock` are both valid entries.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde_support", derive(Serialize))]
#[cfg_attr(feature = "serde_support", serde(rename_all = "snake_case"))]
pub struct BundleConfig {
    pub root_dir: PathBuf,
    pub output_file: PathBuf,
    pub exclude_dirs: Vec<String>,
    pub exclude_files: Vec<String>,
    pub emit_tree: bool,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT_DIR, DEFAULT_OUTPUT_FILE)
    }
}

impl BundleConfig {
    /// A config with the built-in exclusions and the tree header enabled.
    pub fn new(root_dir: impl Into<PathBuf>, output_file: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            output_file: output_file.into(),
            exclude_dirs: to_owned_patterns(DEFAULT_EXCLUDE_DIRS),
            exclude_files: to_owned_patterns(DEFAULT_EXCLUDE_FILES),
            emit_tree: true,
        }
    }

    pub fn without_default_excludes(mut self) -> Self {
        self.exclude_dirs.clear();
        self.exclude_files.clear();
        self
    }

    pub fn with_exclude_dirs<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_dirs.extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn with_exclude_files<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_files.extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn with_tree(mut self, emit_tree: bool) -> Self {
        self.emit_tree = emit_tree;
        self
    }

    pub fn exclusion_rules(&self) -> Result<ExclusionRules> {
        ExclusionRules::new(&self.exclude_dirs, &self.exclude_files)
    }

    pub fn determine_root_dir(cli_root_dir: Option<&PathBuf>) -> Result<PathBuf> {
        let path_str_opt = cli_root_dir
            .map(|p| p.to_string_lossy().to_string())
            .or_else(|| env::var(ROOT_DIR_ENV).ok().filter(|s| !s.is_empty()));

        let path_to_resolve = match path_str_opt {
            Some(p_str) => PathBuf::from(shellexpand::tilde(&p_str).as_ref()),
            None => PathBuf::from(DEFAULT_ROOT_DIR),
        };

        let resolved = path_to_resolve.canonicalize().map_err(|e| {
            AppError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to canonicalize root directory '{}': {}",
                    path_to_resolve.display(),
                    e
                ),
            ))
        })?;

        if !resolved.is_dir() {
            return Err(AppError::InvalidArgument(format!(
                "Root path '{}' is not a directory",
                resolved.display()
            )));
        }
        log::debug!("Resolved root directory: {}", resolved.display());
        Ok(resolved)
    }

    pub fn resolve_output_path(cli_output: Option<&PathBuf>) -> Result<PathBuf> {
        let raw = cli_output
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_else(|| DEFAULT_OUTPUT_FILE.to_string());

        if raw.trim().is_empty() || raw.ends_with(['/', '\\']) {
            return Err(AppError::Config(format!(
                "Output path '{}' does not name a file",
                raw
            )));
        }

        let expanded = PathBuf::from(shellexpand::tilde(&raw).as_ref());
        if expanded.file_name().is_none() {
            return Err(AppError::Config(format!(
                "Output path '{}' does not name a file",
                expanded.display()
            )));
        }

        let resolved = if expanded.is_absolute() {
            expanded
        } else {
            env::current_dir().map_err(AppError::Io)?.join(expanded)
        };
        log::debug!("Resolved output path: {}", resolved.display());
        Ok(resolved)
    }

    /// Location of the output file relative to `root_dir`, when it lies inside it.
    ///
    /// Both sides are canonicalized, so the parent directory of the output file
    /// must already exist for a match to be found.
    pub fn output_path_in_root(&self) -> Option<PathBuf> {
        let file_name = self.output_file.file_name()?;
        let parent = match self.output_file.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new(DEFAULT_ROOT_DIR),
        };
        let parent = parent.canonicalize().ok()?;
        let root = self.root_dir.canonicalize().ok()?;
        let relative = parent.join(file_name).strip_prefix(&root).ok()?.to_path_buf();
        log::trace!(
            "Output file lies inside the root as '{}'",
            relative.display()
        );
        Some(relative)
    }
}

fn to_owned_patterns(patterns: &[&str]) -> Vec<String> {
    patterns.iter().map(|p| p.to_string()).collect()
}
