//! Destination removal.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};

/// Recursively delete the destination root.
///
/// Returns whether anything was removed; an absent root is not an error.
pub fn clean(dest_root: &Path) -> Result<bool> {
    match fs::remove_dir_all(dest_root) {
        Ok(()) => {
            crate::debug!("clean"; "removed {}", dest_root.display());
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e)
            .with_context(|| format!("Failed to clear output directory: {}", dest_root.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_clean_removes_tree() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("build");
        fs::create_dir_all(dest.join("css")).unwrap();
        fs::write(dest.join("css/style.min.css"), "a{}").unwrap();

        assert!(clean(&dest).unwrap());
        assert!(!dest.exists());
    }

    #[test]
    fn test_clean_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("build");
        fs::create_dir_all(&dest).unwrap();

        assert!(clean(&dest).unwrap());
        assert!(!clean(&dest).unwrap());
        assert!(!dest.exists());
    }
}
