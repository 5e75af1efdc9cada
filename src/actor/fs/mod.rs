//! FileSystem Actor
//!
//! Watches the source root and re-runs the tasks whose watch globs match the
//! changed paths.
//!
//! ```text
//! Watcher → Debouncer (timing, dedup) → route (subscriptions) → run_task
//! ```
//!
//! The watcher is created before the actor runs, so changes made while the
//! caller is still busy are buffered rather than lost.

// Pure timing and deduplication.
mod debouncer;
// Changed paths -> scheduled tasks.
mod router;
// Shared fs event types.
mod types;


use std::path::PathBuf;

use anyhow::{Context, Result};
use crossbeam::channel::Receiver;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};

use crate::paths::Subscription;
use crate::task::{TaskContext, TaskName, run_task};
use debouncer::Debouncer;
use router::{log_batch, route};

/// Interval between shutdown checks.
const SHUTDOWN_POLL_MS: u64 = 100;

/// FileSystem Actor - watches the source root and re-runs tasks
pub struct WatchActor {
    /// Channel to receive notify events (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    _watcher: RecommendedWatcher,
    debouncer: Debouncer,
    subscriptions: Vec<Subscription>,
    ctx: TaskContext,
    shutdown_rx: Receiver<()>,
}

impl WatchActor {
    /// Start watching immediately; events buffer until [`run`](Self::run).
    pub fn new(ctx: TaskContext, shutdown_rx: Receiver<()>) -> Result<Self> {
        let subscriptions = ctx.table.subscriptions()?;
        let root = ctx.table.source_root().to_path_buf();

        let (notify_tx, notify_rx) = std::sync::mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })
        .context("failed to create file watcher")?;

        watcher
            .watch(&root, RecursiveMode::Recursive)
            .with_context(|| format!("failed to watch {}", root.display()))?;
        crate::debug!("watch"; "{} ({} subscriptions)", root.display(), subscriptions.len());

        Ok(Self {
            notify_rx,
            _watcher: watcher,
            debouncer: Debouncer::new(),
            subscriptions,
            ctx,
            shutdown_rx,
        })
    }

    /// Run until the shutdown signal arrives.
    pub async fn run(self) {
        let Self {
            notify_rx,
            _watcher,
            mut debouncer,
            subscriptions,
            ctx,
            shutdown_rx,
        } = self;

        let (async_tx, mut async_rx) = tokio::sync::mpsc::channel::<notify::Event>(64);

        // notify is sync-only; forward on a plain thread
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        crate::log!("watch"; "watching {}", ctx.table.source_root().display());

        loop {
            let wait = debouncer
                .sleep_duration()
                .min(std::time::Duration::from_millis(SHUTDOWN_POLL_MS));

            tokio::select! {
                biased;
                Some(event) = async_rx.recv() => debouncer.add_event(&event),
                _ = tokio::time::sleep(wait) => {
                    if shutdown_rx.try_recv().is_ok() || crate::core::is_shutdown() {
                        crate::debug!("watch"; "shutdown");
                        break;
                    }
                    let Some(batch) = debouncer.take_if_ready() else {
                        continue;
                    };
                    log_batch(&batch);

                    let tasks = route(&batch, ctx.table.source_root(), &subscriptions);
                    if !tasks.is_empty() {
                        run_batch(tasks, batch.into_iter().map(|(p, _)| p).collect(), &ctx).await;
                    }
                }
            }
        }
    }
}

/// Run scheduled tasks one at a time on the blocking pool.
async fn run_batch(tasks: Vec<TaskName>, changed: Vec<PathBuf>, ctx: &TaskContext) {
    let started = std::time::Instant::now();
    let mut failed = false;

    for name in &tasks {
        let name = *name;
        let task_ctx = ctx.clone();
        let result = tokio::task::spawn_blocking(move || run_task(name, &task_ctx)).await;

        match result {
            Ok(Ok(report)) if report.is_clean() => {}
            Ok(Ok(report)) => {
                failed = true;
                crate::log!(name.label(); "{}", report.summary());
            }
            Ok(Err(e)) => {
                failed = true;
                crate::logger::status_error(&format!("{name} failed"), &format!("{e:#}"));
            }
            Err(e) => {
                failed = true;
                crate::logger::status_error(&format!("{name} panicked"), &e.to_string());
            }
        }
    }

    if !failed {
        let names: Vec<_> = tasks.iter().map(|t| t.label()).collect();
        crate::logger::status_success(&format!(
            "{} ({} changed, {:.0?})",
            names.join(", "),
            changed.len(),
            started.elapsed()
        ));
    }
}
