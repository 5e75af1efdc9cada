//! Byte copy for misc files and fonts.

use std::fs;

use anyhow::{Context, Result};

use super::{Outcome, TaskContext, TaskReport, process_all};
use crate::paths::AssetKind;

pub(super) fn run(ctx: &TaskContext, kind: AssetKind) -> Result<TaskReport> {
    let files = ctx.table.scan(kind)?;

    process_all(&files, |file| {
        let output = ctx.table.output_path(kind, &file.relative);
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&file.path, &output)
            .with_context(|| format!("failed to copy to {}", output.display()))?;
        Ok(Outcome::Written(vec![output]))
    })
}
