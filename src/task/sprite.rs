//! Sprite sheet: every `img/sprite/*.svg` as a `<symbol>` in one document.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rayon::prelude::*;

use super::{TaskContext, TaskReport, write_output};
use crate::image::svg::{OptimizeOptions, SpriteSymbol, build_sprite, optimize_svg};
use crate::paths::{AssetKind, SourceFile};

pub(super) fn run(ctx: &TaskContext) -> Result<TaskReport> {
    let files = ctx.table.scan(AssetKind::Sprite)?;
    if files.is_empty() {
        return Ok(TaskReport::default());
    }

    let symbols = files
        .par_iter()
        .map(|file| to_symbol(file).with_context(|| format!("{}", file.path.display())))
        .collect::<Result<Vec<_>>>()?;

    let sprite = build_sprite(&symbols)?;
    let output = ctx
        .table
        .output_path(AssetKind::Sprite, Path::new(crate::paths::SPRITE_NAME));
    write_output(&output, sprite)?;

    Ok(TaskReport {
        written: vec![output],
        ..TaskReport::default()
    })
}

fn to_symbol(file: &SourceFile) -> Result<SpriteSymbol> {
    let id = file
        .path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let options = OptimizeOptions {
        id_prefix: Some(format!("{id}-")),
        ..OptimizeOptions::default()
    };
    let optimized = optimize_svg(&fs::read(&file.path)?, &options)?;

    Ok(SpriteSymbol {
        id,
        svg: String::from_utf8(optimized.data)?,
    })
}
