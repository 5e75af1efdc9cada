//! Raster images: lossless WebP sibling plus recompressed original.
//!
//! Incremental: a source whose output exists and is not older is skipped.
//! The WebP sibling is written first, so an interrupted run leaves the
//! original output missing and the file is retried next time.
//!
//! Sources differing only by extension (`a.png`, `a.jpg`) share one WebP
//! sibling. The first in path order owns it and the others fail.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow, bail};
use rustc_hash::FxHashMap;

use super::{Outcome, TaskContext, TaskReport, process_each, write_output};
use crate::freshness::is_up_to_date;
use crate::image::raster::{self, RasterFormat};
use crate::paths::{AssetKind, SourceFile};

/// Notification title for image failures.
const TITLE: &str = "IMAGES";

pub(super) fn run(ctx: &TaskContext) -> Result<TaskReport> {
    let files = ctx.table.scan(AssetKind::Images)?;
    let settings = &ctx.config.images;
    let owners = sibling_owners(&files);

    Ok(process_each(&files, TITLE, |file| {
        if settings.webp
            && let Some(&owner) = owners.get(&file.relative.with_extension("webp"))
            && owner != file.relative
        {
            bail!("webp sibling already produced by {}", owner.display());
        }

        let output = ctx.table.output_path(AssetKind::Images, &file.relative);
        if is_up_to_date(&file.path, &output) {
            return Ok(Outcome::Skipped);
        }

        let format = RasterFormat::from_path(&file.path)
            .ok_or_else(|| anyhow!("unsupported image format"))?;
        let bytes = fs::read(&file.path)?;
        let mut written = Vec::with_capacity(2);

        if settings.webp {
            let webp = raster::to_webp(&bytes, format)?;
            let sibling = output.with_extension("webp");
            write_output(&sibling, webp)?;
            written.push(sibling);
        }

        let optimized = raster::optimize(&bytes, format, settings.jpeg_quality)?;
        write_output(&output, optimized)?;
        written.push(output);

        Ok(Outcome::Written(written))
    }))
}

/// First source (in path order) for each WebP sibling path.
fn sibling_owners(files: &[SourceFile]) -> FxHashMap<PathBuf, &Path> {
    let mut owners = FxHashMap::default();
    for file in files {
        owners
            .entry(file.relative.with_extension("webp"))
            .or_insert(file.relative.as_path());
    }
    owners
}
