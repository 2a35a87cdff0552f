//! Top-level harness runs.
//!
//! Discovery → orchestration → summary. Run-level errors (bad root, no
//! units, bad configuration) propagate before any unit is attempted and
//! before any summary is printed.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use samplecheck_core::{
    discover_units, BuildOutcome, BuildUnit, HarnessConfig, HarnessError, Result, RunSummary,
};

use crate::artifact;
use crate::console::{Console, StdoutConsole};
use crate::orchestrator::{ExecutionMode, Orchestrator};
use crate::report;
use crate::runner::{CommandRunner, ProcessRunner};

/// Discovers, builds and reports sample units.
pub struct Harness {
    config: HarnessConfig,
    runner: Arc<dyn CommandRunner>,
    console: Arc<dyn Console>,
}

impl Harness {
    pub fn new(
        config: HarnessConfig,
        runner: Arc<dyn CommandRunner>,
        console: Arc<dyn Console>,
    ) -> Self {
        Self {
            config,
            runner,
            console,
        }
    }

    /// Harness running real subprocesses and printing to stdout.
    pub fn with_process_runner(config: HarnessConfig) -> Self {
        Self::new(config, Arc::new(ProcessRunner::new()), Arc::new(StdoutConsole))
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Discover units, failing when the root is invalid or holds none.
    pub fn discover(&self) -> Result<Vec<BuildUnit>> {
        self.config.validate()?;
        let units = discover_units(&self.config.root, &self.config.layout)?;
        info!(root = %self.config.root.display(), units = units.len(), "Discovered units");
        Ok(units)
    }

    /// Build every discovered unit and print the summary.
    pub async fn run(&self) -> Result<RunSummary> {
        let units = self.discover()?;
        self.console
            .lines(&report::render_discovery(&self.config.root, &units));

        let mode = ExecutionMode::from_jobs(self.config.jobs);
        let outcomes = self.orchestrator().run(&units, mode).await;

        let summary = RunSummary::from_outcomes(&units, outcomes);
        report::publish_summary(self.console.as_ref(), &summary);
        log_failures(&summary);
        info!(
            total = summary.total(),
            succeeded = summary.success_count(),
            failed = summary.failure_count(),
            "Harness run finished"
        );
        Ok(summary)
    }

    /// Build a single discovered unit, identified by name or by its path
    /// relative to the root.
    pub async fn check_unit(&self, name: &str) -> Result<BuildOutcome> {
        let units = self.discover()?;
        let unit = find_unit(&units, name)
            .ok_or_else(|| HarnessError::UnknownUnit(name.to_string()))?;
        Ok(self.orchestrator().build_unit(unit).await)
    }

    /// Join result artifacts in `dir` to the discovered units and print the summary.
    pub fn aggregate(&self, dir: &Path) -> Result<RunSummary> {
        let units = self.discover()?;
        let summary = artifact::collect_summary(&units, dir)?;
        report::publish_summary(self.console.as_ref(), &summary);
        log_failures(&summary);
        Ok(summary)
    }

    fn orchestrator(&self) -> Orchestrator {
        Orchestrator::new(&self.config, self.runner.clone(), self.console.clone())
    }
}

fn log_failures(summary: &RunSummary) {
    for entry in summary.failures() {
        warn!(
            unit = %entry.unit,
            kind = ?entry.outcome.failure,
            strategy = ?entry.outcome.strategy,
            "Unit failed"
        );
    }
}

fn find_unit<'a>(units: &'a [BuildUnit], name: &str) -> Option<&'a BuildUnit> {
    let wanted = name.trim_end_matches('/');
    units
        .iter()
        .find(|u| u.name() == wanted || u.relative == PathBuf::from(wanted))
}
