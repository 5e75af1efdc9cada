use std::path::PathBuf;

use super::Outcome;

/// A source file that failed in a per-file task.
#[derive(Debug, Clone)]
pub struct FileFailure {
    pub path: PathBuf,
    pub message: String,
}

/// What a task run produced.
#[derive(Debug, Default)]
pub struct TaskReport {
    /// Output files written (absolute paths).
    pub written: Vec<PathBuf>,
    /// Sources skipped because their outputs were up to date.
    pub skipped: usize,
    /// Non-fatal failures (scripts, images).
    pub failures: Vec<FileFailure>,
}

impl TaskReport {
    pub(super) fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Written(paths) => self.written.extend(paths),
            Outcome::Skipped => self.skipped += 1,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// One-line summary, e.g. `3 written, 1 skipped, 1 failed`.
    pub fn summary(&self) -> String {
        let mut parts = vec![format!("{} written", self.written.len())];
        if self.skipped > 0 {
            parts.push(format!("{} skipped", self.skipped));
        }
        if !self.failures.is_empty() {
            parts.push(format!("{} failed", self.failures.len()));
        }
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary() {
        let mut report = TaskReport::default();
        assert_eq!(report.summary(), "0 written");

        report.record(Outcome::Written(vec!["a".into(), "b".into()]));
        report.record(Outcome::Skipped);
        report.failures.push(FileFailure {
            path: "c".into(),
            message: "bad".into(),
        });
        assert_eq!(report.summary(), "2 written, 1 skipped, 1 failed");
        assert!(!report.is_clean());
    }
}
