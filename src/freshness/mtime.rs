//! Mtime-based freshness detection.
//!
//! An output is up to date when it exists and its source is not newer
//! (the skip-if-not-newer rule of incremental tasks).

use std::path::Path;
use std::time::SystemTime;

/// Get the modification time of a file
///
/// Returns `None` if the file doesn't exist or mtime cannot be read
pub fn get_mtime(path: &Path) -> Option<SystemTime> {
    path.metadata().and_then(|m| m.modified()).ok()
}

/// Check if file A is newer than file B
///
/// Returns `true` if A exists and is newer than B
/// Returns `false` if either file doesn't exist or times can't be compared
pub fn is_newer_than(a: &Path, b: &Path) -> bool {
    let (Some(a_time), Some(b_time)) = (get_mtime(a), get_mtime(b)) else {
        return false;
    };
    a_time > b_time
}

/// Check whether `output` can be kept as-is for `source`.
pub fn is_up_to_date(source: &Path, output: &Path) -> bool {
    output.exists() && !is_newer_than(source, output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_missing_output_is_stale() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("a.png");
        fs::write(&source, "x").unwrap();
        assert!(!is_up_to_date(&source, &dir.path().join("out.png")));
    }

    #[test]
    fn test_newer_output_is_fresh() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("a.png");
        let output = dir.path().join("b.png");
        fs::write(&source, "x").unwrap();
        std::thread::sleep(Duration::from_millis(20));
        fs::write(&output, "y").unwrap();

        assert!(is_up_to_date(&source, &output));
        assert!(is_newer_than(&output, &source));
    }

    #[test]
    fn test_touched_source_is_stale() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("a.png");
        let output = dir.path().join("b.png");
        fs::write(&output, "y").unwrap();
        std::thread::sleep(Duration::from_millis(20));
        fs::write(&source, "x").unwrap();

        assert!(!is_up_to_date(&source, &output));
    }
}
