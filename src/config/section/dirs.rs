//! `[dirs]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [dirs]
//! source = "src"          # Asset sources
//! destination = "build"   # Generated tree (deleted by `clean`)
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Source and destination roots, fixed for the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirsConfig {
    /// Source root (relative to project root).
    pub source: PathBuf,

    /// Destination root (relative to project root).
    pub destination: PathBuf,
}

impl Default for DirsConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("src"),
            destination: PathBuf::from("build"),
        }
    }
}

impl DirsConfig {
    /// Resolve both roots against the project root.
    pub fn normalize(&mut self, root: &Path) {
        self.source = crate::utils::path::normalize_path(&root.join(&self.source));
        self.destination = crate::utils::path::normalize_path(&root.join(&self.destination));
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::config::test_parse_config;

    #[test]
    fn test_dirs_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.dirs.source, PathBuf::from("src"));
        assert_eq!(config.dirs.destination, PathBuf::from("build"));
    }

    #[test]
    fn test_dirs_override() {
        let config = test_parse_config("[dirs]\nsource = \"assets\"\ndestination = \"dist\"");
        assert_eq!(config.dirs.source, PathBuf::from("assets"));
        assert_eq!(config.dirs.destination, PathBuf::from("dist"));
    }

    #[test]
    fn test_dirs_normalize_joins_root() {
        let mut dirs = super::DirsConfig::default();
        dirs.normalize(std::path::Path::new("/project"));
        assert!(dirs.source.ends_with("src"));
        assert!(dirs.destination.ends_with("build"));
        assert!(dirs.source.is_absolute());
    }
}
