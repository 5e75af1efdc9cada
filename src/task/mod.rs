//! Transform tasks.
//!
//! Every task reads the files currently matching its asset kind, runs them
//! through its transformation chain in parallel and writes the results under
//! the destination root, preserving sub-paths relative to the glob base.
//!
//! # Error tiers
//!
//! - **Fatal** (copy, fonts, html, styles, svg, sprite): the first failing
//!   file aborts the task with path context.
//! - **Per file** (scripts, images): failures are recorded in the report and
//!   raised as notifications; sibling files still produce output.
//!
//! # Modules
//!
//! - `clean` - destination removal
//! - `copy` - byte copy (misc files, fonts)
//! - `html` - markup with the `@img/` rewrite
//! - `styles` - SCSS entry point to `style.min.css`
//! - `scripts` - per-file minification
//! - `images` - WebP siblings and recompression
//! - `svg` / `sprite` - vector optimization and the symbol sheet
//! - `sort` - SCSS declaration sorting (lint)

pub mod clean;
mod copy;
mod html;
mod images;
mod report;
mod scripts;
pub mod sort;
mod sprite;
mod styles;
mod svg;


pub use report::{FileFailure, TaskReport};

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use rayon::prelude::*;

use crate::config::PipelineConfig;
use crate::paths::{AssetKind, PathTable, SourceFile};
use crate::reload::{ReloadHandle, ReloadMessage, url_of};

/// Named transform task, one per asset kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskName {
    Copy,
    Fonts,
    Html,
    Styles,
    Scripts,
    Images,
    Sprite,
    Svg,
}

impl TaskName {
    /// All transforms, in the order the build stage lists them.
    pub const TRANSFORMS: [Self; 8] = [
        Self::Copy,
        Self::Fonts,
        Self::Html,
        Self::Styles,
        Self::Scripts,
        Self::Images,
        Self::Sprite,
        Self::Svg,
    ];

    pub const fn kind(self) -> AssetKind {
        match self {
            Self::Copy => AssetKind::Files,
            Self::Fonts => AssetKind::Fonts,
            Self::Html => AssetKind::Markup,
            Self::Styles => AssetKind::Styles,
            Self::Scripts => AssetKind::Scripts,
            Self::Images => AssetKind::Images,
            Self::Sprite => AssetKind::Sprite,
            Self::Svg => AssetKind::Svg,
        }
    }

    pub const fn for_kind(kind: AssetKind) -> Self {
        match kind {
            AssetKind::Files => Self::Copy,
            AssetKind::Fonts => Self::Fonts,
            AssetKind::Markup => Self::Html,
            AssetKind::Styles => Self::Styles,
            AssetKind::Scripts => Self::Scripts,
            AssetKind::Images => Self::Images,
            AssetKind::Sprite => Self::Sprite,
            AssetKind::Svg => Self::Svg,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Copy => "copy",
            Self::Fonts => "fonts",
            Self::Html => "html",
            Self::Styles => "styles",
            Self::Scripts => "scripts",
            Self::Images => "images",
            Self::Sprite => "sprite",
            Self::Svg => "svg",
        }
    }

    /// Whether completion is announced on the live-reload channel.
    pub const fn streams(self) -> bool {
        matches!(self, Self::Html | Self::Styles | Self::Scripts | Self::Images)
    }
}

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything a task needs. Cheap to clone.
#[derive(Debug, Clone)]
pub struct TaskContext {
    pub config: Arc<PipelineConfig>,
    pub table: Arc<PathTable>,
    pub reload: ReloadHandle,
}

impl TaskContext {
    pub fn new(config: Arc<PipelineConfig>, table: Arc<PathTable>, reload: ReloadHandle) -> Self {
        Self {
            config,
            table,
            reload,
        }
    }
}

/// Run one transform task and announce its outputs.
pub fn run_task(name: TaskName, ctx: &TaskContext) -> Result<TaskReport> {
    let report = match name {
        TaskName::Copy => copy::run(ctx, AssetKind::Files),
        TaskName::Fonts => copy::run(ctx, AssetKind::Fonts),
        TaskName::Html => html::run(ctx),
        TaskName::Styles => styles::run(ctx),
        TaskName::Scripts => scripts::run(ctx),
        TaskName::Images => images::run(ctx),
        TaskName::Sprite => sprite::run(ctx),
        TaskName::Svg => svg::run(ctx),
    }
    .with_context(|| format!("{name} task failed"))?;

    crate::debug!(name.label(); "{}", report.summary());
    announce(name, &report, ctx);
    Ok(report)
}

/// Push reload events for a finished task.
fn announce(name: TaskName, report: &TaskReport, ctx: &TaskContext) {
    if !name.streams() || report.written.is_empty() || !ctx.reload.is_enabled() {
        return;
    }

    let dest_root = ctx.table.dest_root();
    match (name, report.written.as_slice()) {
        (TaskName::Styles, written) => {
            for path in written {
                ctx.reload.send(ReloadMessage::css(url_of(dest_root, path)));
            }
        }
        (_, [single]) => ctx.reload.send(ReloadMessage::reload(Some(url_of(dest_root, single)))),
        _ => ctx.reload.send(ReloadMessage::reload(None)),
    }
}

// ============================================================================
// per-file helpers
// ============================================================================

/// Result of processing one source file.
enum Outcome {
    Written(Vec<PathBuf>),
    Skipped,
}

/// Process files in parallel; the first error aborts the task.
fn process_all<F>(files: &[SourceFile], process: F) -> Result<TaskReport>
where
    F: Fn(&SourceFile) -> Result<Outcome> + Sync,
{
    let outcomes = files
        .par_iter()
        .map(|file| process(file).with_context(|| format!("{}", file.path.display())))
        .collect::<Result<Vec<_>>>()?;

    let mut report = TaskReport::default();
    for outcome in outcomes {
        report.record(outcome);
    }
    Ok(report)
}

/// Process files in parallel; failures become notifications titled `title`.
fn process_each<F>(files: &[SourceFile], title: &str, process: F) -> TaskReport
where
    F: Fn(&SourceFile) -> Result<Outcome> + Sync,
{
    let results: Vec<_> = files.par_iter().map(|file| (file, process(file))).collect();

    let mut report = TaskReport::default();
    for (file, result) in results {
        match result {
            Ok(outcome) => report.record(outcome),
            Err(e) => {
                let message = format!("{}: {:#}", file.relative.display(), e);
                crate::logger::notify(title, &message);
                report.failures.push(FileFailure {
                    path: file.path.clone(),
                    message,
                });
            }
        }
    }
    report
}

/// Write bytes, creating parent directories.
fn write_output(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
