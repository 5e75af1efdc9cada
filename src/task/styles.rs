//! Stylesheets: SCSS entry point to a prefixed, minified `style.min.css`.
//!
//! ```text
//! style.scss ─► @img/ rewrite ─► grass ─► @img/ rewrite ─► lightningcss ─► style.min.css
//! ```
//!
//! The second rewrite covers tokens that came in through partials.

use anyhow::{Context, Result};

use super::{Outcome, TaskContext, TaskReport, process_all, read_text, write_output};
use crate::asset::{STYLES_IMG_PATH, compile_scss, minify_css, rewrite_img_token};
use crate::paths::AssetKind;

pub(super) fn run(ctx: &TaskContext) -> Result<TaskReport> {
    let files = ctx.table.scan(AssetKind::Styles)?;

    process_all(&files, |file| {
        let source = read_text(&file.path)?;
        let source = rewrite_img_token(&source, STYLES_IMG_PATH);

        let load_dir = file.path.parent().unwrap_or(ctx.table.source_root());
        let css = compile_scss(&source, load_dir).context("scss compilation failed")?;
        let css = rewrite_img_token(&css, STYLES_IMG_PATH);
        let css = minify_css(&css)?;

        let output = ctx.table.output_path(AssetKind::Styles, &file.relative);
        write_output(&output, css)?;
        Ok(Outcome::Written(vec![output]))
    })
}
