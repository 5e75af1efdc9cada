//! Vector images outside the sprite folder, optimized one by one.

use std::fs;

use anyhow::Result;

use super::{Outcome, TaskContext, TaskReport, process_all, write_output};
use crate::image::svg::{OptimizeOptions, optimize_svg};
use crate::paths::AssetKind;

pub(super) fn run(ctx: &TaskContext) -> Result<TaskReport> {
    let files = ctx.table.scan(AssetKind::Svg)?;
    let options = OptimizeOptions::default();

    process_all(&files, |file| {
        let content = fs::read(&file.path)?;
        let optimized = optimize_svg(&content, &options)?;
        let output = ctx.table.output_path(AssetKind::Svg, &file.relative);
        write_output(&output, optimized.data)?;
        Ok(Outcome::Written(vec![output]))
    })
}
