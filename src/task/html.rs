//! Markup: `@img/` rewrite, then write.

use anyhow::Result;

use super::{Outcome, TaskContext, TaskReport, process_all, read_text, write_output};
use crate::asset::{MARKUP_IMG_PATH, rewrite_img_token};
use crate::paths::AssetKind;

pub(super) fn run(ctx: &TaskContext) -> Result<TaskReport> {
    let files = ctx.table.scan(AssetKind::Markup)?;

    process_all(&files, |file| {
        let html = read_text(&file.path)?;
        let output = ctx.table.output_path(AssetKind::Markup, &file.relative);
        write_output(&output, rewrite_img_token(&html, MARKUP_IMG_PATH).as_bytes())?;
        Ok(Outcome::Written(vec![output]))
    })
}
