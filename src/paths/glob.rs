//! Glob matching and source scanning.
//!
//! Globs use gitignore syntax (`**`, `{a,b}`, `!` exclusion) and are always
//! anchored at the source root, so `*.html` only matches top-level files.

use std::path::{Path, PathBuf};

use ignore::overrides::{Override, OverrideBuilder};
use jwalk::WalkDir;

use crate::config::ConfigError;

/// Characters that start a glob segment.
const GLOB_META: &[char] = &['*', '?', '[', '{'];

/// Compiled include/exclude globs, matched against root-relative paths.
#[derive(Clone)]
pub struct Matcher {
    globs: Override,
}

impl Matcher {
    /// Compile include globs and exclusions. Later globs win, so exclusions
    /// are added last.
    pub fn new(root: &Path, include: &[String], exclude: &[String]) -> Result<Self, ConfigError> {
        let mut builder = OverrideBuilder::new(root);

        let patterns = include
            .iter()
            .map(|glob| (glob, anchor(glob)))
            .chain(exclude.iter().map(|glob| (glob, format!("!{}", anchor(glob)))));

        for (glob, pattern) in patterns {
            builder
                .add(&pattern)
                .map_err(|source| ConfigError::Glob {
                    pattern: glob.clone(),
                    source,
                })?;
        }

        let globs = builder.build().map_err(|source| ConfigError::Glob {
            pattern: include.join(", "),
            source,
        })?;

        Ok(Self { globs })
    }

    /// Check a path relative to the source root.
    pub fn is_match(&self, relative: &Path) -> bool {
        self.globs.matched(relative, false).is_whitelist()
    }
}

/// A matched source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute path.
    pub path: PathBuf,
    /// Path relative to the glob base (preserved under the destination).
    pub relative: PathBuf,
}

/// Walk `root` and collect files accepted by `matcher`, sorted by path.
///
/// A missing root yields no files.
pub fn scan(root: &Path, matcher: &Matcher, base: &Path) -> Vec<SourceFile> {
    if !root.is_dir() {
        return Vec::new();
    }

    let mut files: Vec<_> = WalkDir::new(root)
        .sort(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            let path = e.path();
            let from_root = path.strip_prefix(root).ok()?.to_path_buf();
            if !matcher.is_match(&from_root) {
                return None;
            }
            let relative = from_root
                .strip_prefix(base)
                .map(Path::to_path_buf)
                .unwrap_or(from_root);
            Some(SourceFile { path, relative })
        })
        .collect();

    files.sort_by(|a, b| a.path.cmp(&b.path));
    files
}

/// Directory part of a glob before the first segment containing a wildcard.
///
/// A literal path (no wildcard) has its parent directory as base.
pub fn glob_base(pattern: &str) -> PathBuf {
    let segments: Vec<&str> = pattern.trim_start_matches('/').split('/').collect();

    match segments.iter().position(|s| s.contains(GLOB_META)) {
        Some(index) => segments[..index].iter().collect(),
        None => segments[..segments.len().saturating_sub(1)].iter().collect(),
    }
}

/// Anchor a glob at the override root.
fn anchor(glob: &str) -> String {
    if glob.starts_with('/') {
        glob.to_string()
    } else {
        format!("/{glob}")
    }
}
