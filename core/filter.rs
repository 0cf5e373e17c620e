use crate::error::{AppError, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use log;
use std::path::Path;

/// Compiled directory and file exclusion globs.
///
/// Both sets are matched against a bare entry name, never a path, so a pattern
/// such as `build` prunes every directory called `build` at any depth.
#[derive(Debug, Clone)]
pub struct ExclusionRules {
    dirs: GlobSet,
    files: GlobSet,
}

impl ExclusionRules {
    pub fn new(dir_patterns: &[String], file_patterns: &[String]) -> Result<Self> {
        log::trace!("Building glob sets for exclusion rules...");
        Ok(Self {
            dirs: build_name_glob_set(dir_patterns, true)?,
            files: build_name_glob_set(file_patterns, false)?,
        })
    }

    pub fn empty() -> Self {
        Self {
            dirs: GlobSet::empty(),
            files: GlobSet::empty(),
        }
    }

    pub fn is_dir_excluded<N: AsRef<Path>>(&self, name: N) -> bool {
        let excluded = self.dirs.is_match(name.as_ref());
        if excluded {
            log::trace!("Directory excluded: {}", name.as_ref().display());
        }
        excluded
    }

    pub fn is_file_excluded<N: AsRef<Path>>(&self, name: N) -> bool {
        let excluded = self.files.is_match(name.as_ref());
        if excluded {
            log::trace!("File excluded: {}", name.as_ref().display());
        }
        excluded
    }
}

fn build_name_glob_set(patterns: &[String], for_dirs: bool) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern_str in patterns {
        let mut processed_pattern = pattern_str.as_str();
        // `node_modules/` names a directory; the slash never occurs in a bare name.
        if for_dirs && processed_pattern.len() > 1 {
            processed_pattern = processed_pattern.trim_end_matches(['/', '\\']);
        }
        if processed_pattern.is_empty() {
            log::trace!("Ignoring empty exclusion pattern");
            continue;
        }

        let glob_source = shell_pattern_to_glob(processed_pattern);
        let glob = GlobBuilder::new(&glob_source)
            .literal_separator(false)
            .backslash_escape(false)
            .build()
            .map_err(|e| {
                log::error!("Invalid glob pattern \"{}\": {}", pattern_str, e);
                AppError::Glob(format!(
                    "Invalid glob pattern \"{}\" (processed as \"{}\"): {}",
                    pattern_str, glob_source, e
                ))
            })?;
        log::trace!(
            "Adding glob pattern: {} (processed as {})",
            pattern_str,
            glob_source
        );
        builder.add(glob);
    }
    builder.build().map_err(|e| {
        log::error!("Error building glob set: {}", e);
        AppError::from(e)
    })
}

/// Rewrites a shell name pattern (`*`, `?`, `[seq]`, `[!seq]`) into globset
/// syntax. Braces, stray `]` and a `[` with no closing bracket stay literal.
fn shell_pattern_to_glob(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut glob = String::with_capacity(pattern.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    glob.extend(&chars[i..=end]);
                    i = end;
                }
                None => glob.push_str("[[]"),
            },
            c @ ('{' | '}' | ']') => {
                glob.push('[');
                glob.push(c);
                glob.push(']');
            }
            c => glob.push(c),
        }
        i += 1;
    }
    glob
}

/// Index of the `]` closing the class opened at `start`. A `]` right after
/// `[` or `[!` belongs to the class.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start + 1;
    if chars.get(j) == Some(&'!') {
        j += 1;
    }
    if chars.get(j) == Some(&']') {
        j += 1;
    }
    (j..chars.len()).find(|&k| chars[k] == ']')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(dirs: &[&str], files: &[&str]) -> ExclusionRules {
        let dirs: Vec<String> = dirs.iter().map(|s| s.to_string()).collect();
        let files: Vec<String> = files.iter().map(|s| s.to_string()).collect();
        ExclusionRules::new(&dirs, &files).expect("Patterns should compile")
    }

    #[test]
    fn matches_whole_names_not_suffixes() {
        let rules = rules(&[], &["*.log", ".gitignore", "code2ai.py"]);
        assert!(rules.is_file_excluded("server.log"));
        assert!(rules.is_file_excluded(".gitignore"));
        assert!(rules.is_file_excluded("code2ai.py"));
        assert!(!rules.is_file_excluded("server.log.txt"));
        assert!(!rules.is_file_excluded("main.py"));
    }

    #[test]
    fn directory_and_file_sets_are_independent() {
        let rules = rules(&["target"], &["*.rs"]);
        assert!(rules.is_dir_excluded("target"));
        assert!(!rules.is_file_excluded("target"));
        assert!(rules.is_file_excluded("lib.rs"));
        assert!(!rules.is_dir_excluded("lib.rs"));
    }

    #[test]
    fn trailing_slash_on_directory_pattern_is_dropped() {
        let rules = rules(&["node_modules/", "__pycache__"], &[]);
        assert!(rules.is_dir_excluded("node_modules"));
        assert!(rules.is_dir_excluded("__pycache__"));
    }

    #[test]
    fn character_classes_and_wildcards() {
        let rules = rules(&[".*"], &["file[0-9].txt", "?.md"]);
        assert!(rules.is_dir_excluded(".git"));
        assert!(rules.is_dir_excluded(".idea"));
        assert!(!rules.is_dir_excluded("src"));
        assert!(rules.is_file_excluded("file7.txt"));
        assert!(!rules.is_file_excluded("fileA.txt"));
        assert!(rules.is_file_excluded("a.md"));
        assert!(!rules.is_file_excluded("ab.md"));
    }

    #[test]
    fn empty_rules_exclude_nothing() {
        let rules = ExclusionRules::empty();
        assert!(!rules.is_dir_excluded(".git"));
        assert!(!rules.is_file_excluded("anything"));
    }

    #[test]
    fn invalid_range_is_reported() {
        let err = ExclusionRules::new(&["[z-a]".to_string()], &[]).unwrap_err();
        assert!(matches!(err, AppError::Glob(_)));
    }

    #[test]
    fn unclosed_bracket_and_braces_match_literally() {
        let rules = rules(&["[draft"], &["{a,b}.txt", "notes]"]);
        assert!(rules.is_dir_excluded("[draft"));
        assert!(!rules.is_dir_excluded("draft"));
        assert!(rules.is_file_excluded("{a,b}.txt"));
        assert!(!rules.is_file_excluded("a.txt"));
        assert!(!rules.is_file_excluded("b.txt"));
        assert!(rules.is_file_excluded("notes]"));
    }

    #[test]
    fn negated_class_and_leading_bracket_member() {
        let rules = rules(&[], &["[!a]*.md", "[]x].cfg"]);
        assert!(rules.is_file_excluded("b1.md"));
        assert!(!rules.is_file_excluded("a1.md"));
        assert!(rules.is_file_excluded("].cfg"));
        assert!(rules.is_file_excluded("x.cfg"));
    }

    #[test]
    fn surrounding_whitespace_is_part_of_the_pattern() {
        let rules = rules(&[], &[" spaced.txt"]);
        assert!(rules.is_file_excluded(" spaced.txt"));
        assert!(!rules.is_file_excluded("spaced.txt"));
    }

    #[test]
    fn translation_keeps_wildcards_and_closed_classes() {
        assert_eq!(shell_pattern_to_glob("*.py[co]"), "*.py[co]");
        assert_eq!(shell_pattern_to_glob("[draft"), "[[]draft");
        assert_eq!(shell_pattern_to_glob("{x}"), "[{]x[}]");
    }
}
