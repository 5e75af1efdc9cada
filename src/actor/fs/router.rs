use std::path::{Path, PathBuf};

use super::types::ChangeKind;
use crate::paths::Subscription;
use crate::task::TaskName;

pub(super) fn log_batch(batch: &[(PathBuf, ChangeKind)]) {
    for (path, kind) in batch {
        crate::debug!("watch"; "{}: {}", kind.label(), path.display());
    }
}

/// Tasks scheduled by a batch, in subscription order, each at most once.
///
/// Paths outside the source root never match.
pub(super) fn route(
    batch: &[(PathBuf, ChangeKind)],
    source_root: &Path,
    subscriptions: &[Subscription],
) -> Vec<TaskName> {
    let relative: Vec<&Path> = batch
        .iter()
        .filter_map(|(path, _)| path.strip_prefix(source_root).ok())
        .collect();

    subscriptions
        .iter()
        .filter(|sub| relative.iter().any(|path| sub.matcher.is_match(path)))
        .map(|sub| TaskName::for_kind(sub.kind))
        .collect()
}
