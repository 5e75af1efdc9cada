//! Scenario graphs.
//!
//! A scenario is an ordered list of stages. Steps inside a stage run
//! concurrently on scoped threads; the next stage starts only after every
//! step of the current one has finished (join barrier). A failed step fails
//! its stage, and a failed stage stops the scenario.
//!
//! ```text
//! build:     [clean] -> [copy fonts html styles scripts images sprite svg]
//! dev:       ...build... -> [watch serve]
//! clean:     [clean]
//! scss-sort: [sort]
//! ```

use std::fmt;

use anyhow::{Result, anyhow, bail};

use crate::task::TaskName;

/// One unit of work in a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Clean,
    Task(TaskName),
    SortStyles,
    /// Long-lived; returns on shutdown.
    Watch,
    /// Long-lived; returns on shutdown.
    Serve,
}

impl Step {
    pub const fn is_long_lived(self) -> bool {
        matches!(self, Self::Watch | Self::Serve)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clean => f.write_str("clean"),
            Self::Task(name) => write!(f, "{name}"),
            Self::SortStyles => f.write_str("scss-sort"),
            Self::Watch => f.write_str("watch"),
            Self::Serve => f.write_str("serve"),
        }
    }
}

/// Steps run concurrently behind a barrier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub steps: Vec<Step>,
}

impl Stage {
    fn of(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
        }
    }
}

/// A named, ordered list of stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub name: &'static str,
    pub stages: Vec<Stage>,
}

impl Scenario {
    pub fn build() -> Self {
        Self {
            name: "build",
            stages: vec![
                Stage::of([Step::Clean]),
                Stage::of(TaskName::TRANSFORMS.map(Step::Task)),
            ],
        }
    }

    pub fn dev() -> Self {
        let mut stages = Self::build().stages;
        stages.push(Stage::of([Step::Watch, Step::Serve]));
        Self {
            name: "dev",
            stages,
        }
    }

    pub fn clean() -> Self {
        Self {
            name: "clean",
            stages: vec![Stage::of([Step::Clean])],
        }
    }

    pub fn scss_sort() -> Self {
        Self {
            name: "scss-sort",
            stages: vec![Stage::of([Step::SortStyles])],
        }
    }
}

/// Executes individual steps.
pub trait StepRunner: Sync {
    fn run_step(&self, step: Step) -> Result<()>;
}

/// Run a scenario stage by stage, stopping at the first failed stage.
pub fn execute(scenario: &Scenario, runner: &dyn StepRunner) -> Result<()> {
    for (index, stage) in scenario.stages.iter().enumerate() {
        crate::debug!("graph"; "{} stage {}: {:?}", scenario.name, index + 1, stage.steps);
        run_stage(stage, runner)?;
    }
    Ok(())
}

fn run_stage(stage: &Stage, runner: &dyn StepRunner) -> Result<()> {
    let results: Vec<(Step, Result<()>)> = std::thread::scope(|scope| {
        let handles: Vec<_> = stage
            .steps
            .iter()
            .map(|&step| {
                let handle = scope.spawn(move || {
                    let result = runner.run_step(step);
                    // A dead long-lived step must not keep its siblings alive.
                    if result.is_err() && step.is_long_lived() {
                        super::request_shutdown();
                    }
                    result
                });
                (step, handle)
            })
            .collect();

        handles
            .into_iter()
            .map(|(step, handle)| {
                let result = handle
                    .join()
                    .unwrap_or_else(|_| Err(anyhow!("{step} panicked")));
                (step, result)
            })
            .collect()
    });

    let mut failed = Vec::new();
    for (step, result) in results {
        if let Err(e) = result {
            crate::log!("error"; "{:#}", e);
            failed.push(step.to_string());
        }
    }

    if !failed.is_empty() {
        bail!("failed: {}", failed.join(", "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::time::Duration;

    /// Records start/finish order; fails the listed steps.
    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
        fail: Vec<Step>,
    }

    impl StepRunner for Recorder {
        fn run_step(&self, step: Step) -> Result<()> {
            self.events.lock().push(format!("start {step}"));
            if step == Step::Clean {
                std::thread::sleep(Duration::from_millis(20));
            }
            self.events.lock().push(format!("end {step}"));
            if self.fail.contains(&step) {
                bail!("{step} broke");
            }
            Ok(())
        }
    }

    #[test]
    fn test_scenario_shapes() {
        let build = Scenario::build();
        assert_eq!(build.stages.len(), 2);
        assert_eq!(build.stages[0].steps, vec![Step::Clean]);
        assert_eq!(build.stages[1].steps.len(), 8);

        let dev = Scenario::dev();
        assert_eq!(dev.stages[..2], build.stages[..]);
        assert_eq!(dev.stages[2].steps, vec![Step::Watch, Step::Serve]);

        assert_eq!(Scenario::clean().stages, vec![Stage::of([Step::Clean])]);
        assert_eq!(
            Scenario::scss_sort().stages,
            vec![Stage::of([Step::SortStyles])]
        );
    }

    #[test]
    fn test_clean_finishes_before_transforms_start() {
        let recorder = Recorder::default();
        execute(&Scenario::build(), &recorder).unwrap();

        let events = recorder.events.lock();
        assert_eq!(events.len(), 18);
        assert_eq!(events[0], "start clean");
        assert_eq!(events[1], "end clean");
        for name in TaskName::TRANSFORMS {
            assert!(events.contains(&format!("end {name}")));
        }
    }

    #[test]
    fn test_failed_stage_stops_scenario() {
        let recorder = Recorder {
            fail: vec![Step::Task(TaskName::Styles)],
            ..Default::default()
        };
        let err = execute(&Scenario::dev(), &recorder).unwrap_err();
        assert!(err.to_string().contains("styles"));

        let events = recorder.events.lock();
        // Siblings still complete
        assert!(events.contains(&"end scripts".to_string()));
        assert!(!events.iter().any(|e| e.contains("watch") || e.contains("serve")));
    }

    #[test]
    fn test_failed_clean_skips_transforms() {
        let recorder = Recorder {
            fail: vec![Step::Clean],
            ..Default::default()
        };
        assert!(execute(&Scenario::build(), &recorder).is_err());
        assert_eq!(recorder.events.lock().len(), 2);
    }

    #[test]
    fn test_panic_becomes_error() {
        struct Panics;
        impl StepRunner for Panics {
            fn run_step(&self, _: Step) -> Result<()> {
                panic!("boom");
            }
        }
        let err = execute(&Scenario::clean(), &Panics).unwrap_err();
        assert!(err.to_string().contains("clean"));
    }
}
