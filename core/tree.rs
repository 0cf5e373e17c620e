use crate::error::{AppError, Result};
use crate::filter::ExclusionRules;
use log;
#[cfg(feature = "serde_support")]
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE_EXTENSION: &str = "│   ";
const BLANK_EXTENSION: &str = "    ";
const DIR_MARKER: &str = "/";

/// Rendered directory hierarchy, one entry per line, root label first.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize))]
pub struct DirectoryTree {
    root_name: String,
    lines: Vec<String>,
}

impl DirectoryTree {
    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl fmt::Display for DirectoryTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines.join("\n"))
    }
}

#[derive(Debug)]
struct TreeEntry {
    name: String,
    is_dir: bool,
}

/// Walk state shared across levels. `ancestors` holds the canonical path of
/// every directory on the current branch, so a link back into one of them
/// is listed but not entered again.
struct TreeWalk<'a> {
    rules: &'a ExclusionRules,
    skip: Option<&'a Path>,
    lines: Vec<String>,
    ancestors: Vec<PathBuf>,
}

pub fn render_tree(root: &Path, rules: &ExclusionRules) -> Result<DirectoryTree> {
    render_tree_excluding(root, rules, None)
}

/// Like [`render_tree`], but also hides the file at `skip` (relative to `root`).
pub fn render_tree_excluding(
    root: &Path,
    rules: &ExclusionRules,
    skip: Option<&Path>,
) -> Result<DirectoryTree> {
    let absolute_root = root.canonicalize().map_err(|e| {
        AppError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to resolve tree root '{}': {}", root.display(), e),
        ))
    })?;
    let root_name = absolute_root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    log::debug!("Rendering directory tree for: {}", absolute_root.display());

    let mut walk = TreeWalk {
        rules,
        skip,
        lines: vec![format!("{}{}", root_name, DIR_MARKER)],
        ancestors: vec![absolute_root],
    };
    walk.walk_level(root, Path::new(""), "");

    log::debug!("Directory tree rendered with {} lines.", walk.lines.len());
    Ok(DirectoryTree {
        root_name,
        lines: walk.lines,
    })
}

impl TreeWalk<'_> {
    fn walk_level(&mut self, dir: &Path, relative_dir: &Path, prefix: &str) {
        let entries = match self.list_entries(dir, relative_dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::debug!("Cannot list directory {}: {}", dir.display(), e);
                return;
            }
        };

        let count = entries.len();
        for (index, entry) in entries.iter().enumerate() {
            let is_last = index + 1 == count;
            let connector = if is_last { LAST_BRANCH } else { BRANCH };
            let marker = if entry.is_dir { DIR_MARKER } else { "" };
            self.lines
                .push(format!("{}{}{}{}", prefix, connector, entry.name, marker));

            if entry.is_dir {
                let extension = if is_last { BLANK_EXTENSION } else { PIPE_EXTENSION };
                self.descend(
                    &dir.join(&entry.name),
                    &relative_dir.join(&entry.name),
                    &format!("{}{}", prefix, extension),
                );
            }
        }
    }

    /// Enters `dir` (following symlinks) unless it resolves to a directory
    /// already open on this branch.
    fn descend(&mut self, dir: &Path, relative_dir: &Path, prefix: &str) {
        let canonical = match dir.canonicalize() {
            Ok(canonical) => canonical,
            Err(e) => {
                log::debug!("Cannot resolve directory {}: {}", dir.display(), e);
                return;
            }
        };
        if self.ancestors.contains(&canonical) {
            log::debug!(
                "Not descending into {}: links back to {}",
                dir.display(),
                canonical.display()
            );
            return;
        }

        self.ancestors.push(canonical);
        self.walk_level(dir, relative_dir, prefix);
        self.ancestors.pop();
    }

    /// Subdirectories first, then files, each group sorted by name.
    fn list_entries(&self, dir: &Path, relative_dir: &Path) -> std::io::Result<Vec<TreeEntry>> {
        let mut dirs = Vec::new();
        let mut files = Vec::new();

        for entry_result in fs::read_dir(dir)? {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(e) => {
                    log::debug!("Error reading entry in {}: {}", dir.display(), e);
                    continue;
                }
            };
            let name = entry.file_name();
            let path = entry.path();

            if path.is_dir() {
                if self.rules.is_dir_excluded(&name) {
                    continue;
                }
                dirs.push(TreeEntry {
                    name: name.to_string_lossy().into_owned(),
                    is_dir: true,
                });
            } else if path.is_file() {
                if self.rules.is_file_excluded(&name) {
                    continue;
                }
                if self.skip.is_some_and(|s| s == relative_dir.join(&name)) {
                    log::trace!("Hiding output file from tree: {}", path.display());
                    continue;
                }
                files.push(TreeEntry {
                    name: name.to_string_lossy().into_owned(),
                    is_dir: false,
                });
            } else {
                log::trace!("Skipping special or dangling entry: {}", path.display());
            }
        }

        dirs.sort_by(|a, b| a.name.cmp(&b.name));
        files.sort_by(|a, b| a.name.cmp(&b.name));
        dirs.extend(files);
        Ok(dirs)
    }
}
