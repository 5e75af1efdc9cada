//! Scenario runner: binds graph steps to tasks.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::actor::WatchActor;
use crate::actor::messages::WsMsg;
use crate::config::PipelineConfig;
use crate::core::{Scenario, Step, StepRunner, execute};
use crate::paths::PathTable;
use crate::reload::ReloadHandle;
use crate::task::{self, TaskContext};
use crate::{debug, log};

use super::Commands;

/// Production [`StepRunner`].
pub struct Pipeline {
    ctx: TaskContext,
    /// Taken by the serve step.
    ws_rx: Mutex<Option<UnboundedReceiver<WsMsg>>>,
}

impl Pipeline {
    /// Runner without live reload.
    pub fn new(config: Arc<PipelineConfig>, table: Arc<PathTable>) -> Self {
        Self {
            ctx: TaskContext::new(config, table, ReloadHandle::disabled()),
            ws_rx: Mutex::new(None),
        }
    }

    /// Runner whose tasks announce their outputs to the reload server.
    pub fn with_reload(config: Arc<PipelineConfig>, table: Arc<PathTable>) -> Self {
        let (reload, ws_rx) = ReloadHandle::channel();
        Self {
            ctx: TaskContext::new(config, table, reload),
            ws_rx: Mutex::new(Some(ws_rx)),
        }
    }

    fn watch(&self) -> Result<()> {
        let actor = WatchActor::new(self.ctx.clone(), crate::core::subscribe_shutdown())?;
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .context("failed to create tokio runtime")?;
        rt.block_on(actor.run());
        Ok(())
    }
}

impl StepRunner for Pipeline {
    fn run_step(&self, step: Step) -> Result<()> {
        match step {
            Step::Clean => {
                let dest = self.ctx.table.dest_root();
                if task::clean::clean(dest)? {
                    log!("clean"; "{}", self.ctx.config.root_relative(dest).display());
                }
            }
            Step::Task(name) => {
                let started = Instant::now();
                let report = task::run_task(name, &self.ctx)?;
                log!(name.label(); "{} ({:.0?})", report.summary(), started.elapsed());
            }
            Step::SortStyles => {
                let report = task::sort::run(&self.ctx.table)?;
                for path in &report.written {
                    log!("sort"; "{}", self.ctx.config.root_relative(path).display());
                }
                log!("sort"; "{} rewritten, {} unchanged", report.written.len(), report.skipped);
            }
            Step::Watch => self.watch()?,
            Step::Serve => {
                let ws_rx = self.ws_rx.lock().take();
                super::serve::serve(&self.ctx, ws_rx)?;
            }
        }
        Ok(())
    }
}

/// Run the scenario selected on the command line.
pub fn run(command: &Commands, config: PipelineConfig) -> Result<()> {
    let table = PathTable::from_config(&config)?;
    let (config, table) = (Arc::new(config), Arc::new(table));

    let (scenario, runner) = match command {
        Commands::Dev { .. } => (Scenario::dev(), Pipeline::with_reload(config, table)),
        Commands::Build => (Scenario::build(), Pipeline::new(config, table)),
        Commands::Clean => (Scenario::clean(), Pipeline::new(config, table)),
        Commands::ScssSort => (Scenario::scss_sort(), Pipeline::new(config, table)),
    };

    debug!("scenario"; "{}", scenario.name);
    let started = Instant::now();
    execute(&scenario, &runner).with_context(|| format!("{} failed", scenario.name))?;

    let failures = crate::logger::notification_count();
    if failures > 0 {
        log!(scenario.name; "finished with {} file error(s) in {:.1?}", failures, started.elapsed());
    } else {
        log!(scenario.name; "done in {:.1?}", started.elapsed());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config_at;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_build_scenario_end_to_end() {
        let dir = TempDir::new().unwrap();
        let config = test_config_at(dir.path());
        let src = config.dirs.source.clone();
        let build = config.dirs.destination.clone();

        fs::create_dir_all(src.join("js")).unwrap();
        fs::create_dir_all(src.join("scss")).unwrap();
        fs::write(src.join("index.html"), "<p>@img/a.png</p>").unwrap();
        fs::write(src.join("js/app.js"), "console.log(1 + 2);").unwrap();
        fs::write(src.join("scss/style.scss"), ".a { color: red; }").unwrap();
        fs::create_dir_all(build.join("stale")).unwrap();
        fs::write(build.join("stale/old.txt"), "x").unwrap();

        run(&Commands::Build, config).unwrap();

        assert!(!build.join("stale").exists());
        assert_eq!(fs::read_to_string(build.join("index.html")).unwrap(), "<p>img/a.png</p>");
        assert!(build.join("js/app.min.js").is_file());
        assert!(build.join("css/style.min.css").is_file());
    }

    #[test]
    fn test_build_fails_on_fatal_task() {
        let dir = TempDir::new().unwrap();
        let config = test_config_at(dir.path());
        let src = config.dirs.source.clone();
        fs::create_dir_all(src.join("scss")).unwrap();
        fs::write(src.join("scss/style.scss"), ".a { color: $nope; }").unwrap();

        let err = run(&Commands::Build, config).unwrap_err();
        assert!(format!("{err:#}").contains("build failed"));
    }

    #[test]
    fn test_clean_scenario() {
        let dir = TempDir::new().unwrap();
        let config = test_config_at(dir.path());
        let build = config.dirs.destination.clone();
        fs::create_dir_all(build.join("css")).unwrap();

        run(&Commands::Clean, config.clone()).unwrap();
        assert!(!build.exists());
        run(&Commands::Clean, config).unwrap();
    }

    #[test]
    fn test_scss_sort_scenario() {
        let dir = TempDir::new().unwrap();
        let config = test_config_at(dir.path());
        let scss = config.dirs.source.join("scss");
        fs::create_dir_all(&scss).unwrap();
        fs::write(scss.join("_a.scss"), ".a { z: 1; a: 2; }").unwrap();

        run(&Commands::ScssSort, config).unwrap();
        assert_eq!(fs::read_to_string(scss.join("_a.scss")).unwrap(), ".a { a: 2; z: 1; }");
    }
}
