//! Per-unit build orchestration.
//!
//! [`Orchestrator::build_unit`] turns one unit into exactly one outcome:
//! install, inspect, select a strategy, run it. Anything that goes wrong,
//! including a panic, is folded into a `Failure` at the unit boundary.
//!
//! [`Orchestrator::run`] drives a whole unit list either sequentially or on a
//! bounded pool of concurrent units. Both modes return outcomes in discovery
//! order, joined back by unit index rather than completion order.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use futures::{stream, FutureExt, StreamExt};
use tracing::{info, warn};

use samplecheck_core::{
    BuildOutcome, BuildUnit, EcosystemLayout, FailureKind, HarnessConfig, ToolCommands,
    UnitProbe,
};

use crate::artifact;
use crate::console::Console;
use crate::report;
use crate::runner::{CommandRunner, CommandSpec};
use crate::strategy::{select_strategy, StrategyPlan, StrategyRule, DEFAULT_RULES};

/// How units are scheduled. Both modes yield identical aggregate results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// One unit at a time, in discovery order.
    Sequential,

    /// Up to `jobs` units in flight at once.
    Parallel { jobs: usize },
}

impl ExecutionMode {
    pub fn from_jobs(jobs: usize) -> Self {
        if jobs <= 1 {
            ExecutionMode::Sequential
        } else {
            ExecutionMode::Parallel { jobs }
        }
    }
}

/// Builds units and records one outcome per unit.
pub struct Orchestrator {
    runner: Arc<dyn CommandRunner>,
    console: Arc<dyn Console>,
    layout: EcosystemLayout,
    commands: ToolCommands,
    rules: Vec<StrategyRule>,
    timeout_secs: u64,
    diagnostic_lines: usize,
    artifacts_dir: Option<PathBuf>,
}

impl Orchestrator {
    pub fn new(
        config: &HarnessConfig,
        runner: Arc<dyn CommandRunner>,
        console: Arc<dyn Console>,
    ) -> Self {
        Self {
            runner,
            console,
            layout: config.layout.clone(),
            commands: config.commands.clone(),
            rules: DEFAULT_RULES.to_vec(),
            timeout_secs: config.timeout_secs,
            diagnostic_lines: config.diagnostic_lines,
            artifacts_dir: config.artifacts_dir.clone(),
        }
    }

    /// Replace the strategy rules.
    pub fn with_rules(mut self, rules: Vec<StrategyRule>) -> Self {
        self.rules = rules;
        self
    }

    /// Build every unit and return outcomes in the order of `units`.
    pub async fn run(&self, units: &[BuildUnit], mode: ExecutionMode) -> Vec<BuildOutcome> {
        info!(units = units.len(), mode = ?mode, "Starting build orchestration");

        match mode {
            ExecutionMode::Sequential => {
                let mut outcomes = Vec::with_capacity(units.len());
                for unit in units {
                    outcomes.push(self.build_unit(unit).await);
                }
                outcomes
            }
            ExecutionMode::Parallel { jobs } => {
                let mut indexed: Vec<(usize, BuildOutcome)> =
                    stream::iter(units.iter().enumerate())
                        .map(move |(index, unit)| async move {
                            (index, self.build_unit(unit).await)
                        })
                        .buffer_unordered(jobs.max(1))
                        .collect()
                        .await;
                indexed.sort_by_key(|(index, _)| *index);
                indexed.into_iter().map(|(_, outcome)| outcome).collect()
            }
        }
    }

    /// Build one unit. Never fails; every error becomes a `Failure` outcome.
    pub async fn build_unit(&self, unit: &BuildUnit) -> BuildOutcome {
        let start = Instant::now();

        let outcome = match AssertUnwindSafe(self.attempt(unit, start)).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                warn!(unit = %unit, panic = %message, "Unit processing panicked");
                BuildOutcome::failure(
                    unit,
                    FailureKind::Build,
                    None,
                    format!("unit processing panicked: {}", message),
                    elapsed_ms(start),
                )
            }
        };

        self.console
            .lines(&report::render_unit_result(&outcome, self.diagnostic_lines));

        if let Some(dir) = &self.artifacts_dir {
            if let Err(e) = artifact::write_outcome(dir, &outcome) {
                warn!(unit = %unit, error = %e, "Failed to write result artifact");
            }
        }

        outcome
    }

    async fn attempt(&self, unit: &BuildUnit, start: Instant) -> BuildOutcome {
        self.console.lines(&report::render_unit_banner(unit));
        info!(unit = %unit, "Building unit");

        // Install
        self.console.line(&report::render_install(unit));
        let Some(install) =
            CommandSpec::from_argv(&self.commands.install, unit.dir(), self.timeout_secs)
        else {
            return BuildOutcome::failure(
                unit,
                FailureKind::Install,
                None,
                "install command is empty",
                elapsed_ms(start),
            );
        };

        let output = self.runner.run(&install).await;
        if !output.passed() {
            warn!(unit = %unit, exit_code = output.exit_code, "Dependency installation failed");
            return BuildOutcome::failure(
                unit,
                FailureKind::Install,
                None,
                output.combined(),
                elapsed_ms(start),
            );
        }

        // Inspect. The source scan walks the unit tree, keep it off the runtime.
        let dir = unit.dir().to_path_buf();
        let layout = self.layout.clone();
        let inspected = tokio::task::spawn_blocking(move || UnitProbe::inspect(&dir, &layout))
            .await
            .map_err(|e| format!("unit inspection aborted: {}", e))
            .and_then(|result| result.map_err(|e| e.to_string()));

        let probe = match inspected {
            Ok(probe) => probe,
            Err(reason) => {
                warn!(unit = %unit, error = %reason, "Failed to inspect unit");
                return BuildOutcome::failure(
                    unit,
                    FailureKind::Manifest,
                    None,
                    reason,
                    elapsed_ms(start),
                );
            }
        };

        // Strategy
        let strategy = select_strategy(&probe, &self.rules);
        self.console.line(&report::render_strategy(unit, strategy));
        info!(unit = %unit, strategy = %strategy, "Selected strategy");

        let plan = StrategyPlan::resolve(
            strategy,
            &probe,
            unit.dir(),
            &self.commands,
            self.timeout_secs,
        );

        let Some(command) = plan.command else {
            if strategy.requires_command() {
                return BuildOutcome::failure(
                    unit,
                    FailureKind::Build,
                    Some(strategy),
                    format!("no command configured for strategy {}", strategy),
                    elapsed_ms(start),
                );
            }
            return BuildOutcome::success(unit, strategy, elapsed_ms(start));
        };

        let output = self.runner.run(&command).await;
        if output.passed() {
            info!(unit = %unit, duration_ms = output.duration_ms, "Unit succeeded");
            BuildOutcome::success(unit, strategy, elapsed_ms(start))
        } else {
            warn!(
                unit = %unit,
                strategy = %strategy,
                exit_code = output.exit_code,
                "Unit failed"
            );
            BuildOutcome::failure(
                unit,
                FailureKind::Build,
                Some(strategy),
                output.combined(),
                elapsed_ms(start),
            )
        }
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
