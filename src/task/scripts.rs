//! Scripts: minify each file to `name.min.js`.
//!
//! A file that fails to parse is reported and skipped; the others are still
//! written.

use anyhow::Result;

use super::{Outcome, TaskContext, TaskReport, process_each, read_text, write_output};
use crate::asset::minify_js;
use crate::paths::AssetKind;

/// Notification title for script failures.
const TITLE: &str = "JS";

pub(super) fn run(ctx: &TaskContext) -> Result<TaskReport> {
    let files = ctx.table.scan(AssetKind::Scripts)?;
    let mangle = ctx.config.scripts.mangle;

    Ok(process_each(&files, TITLE, |file| {
        let source = read_text(&file.path)?;
        let minified = minify_js(&source, mangle)?;
        let output = ctx.table.output_path(AssetKind::Scripts, &file.relative);
        write_output(&output, minified)?;
        Ok(Outcome::Written(vec![output]))
    }))
}
