//! Per-unit build outcomes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::unit::BuildUnit;

/// Terminal status of one unit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    Failure,
}

impl Status {
    pub fn is_success(&self) -> bool {
        matches!(self, Status::Success)
    }

    /// Console marker for this status.
    pub fn marker(&self) -> &'static str {
        match self {
            Status::Success => "✓",
            Status::Failure => "✗",
        }
    }
}

/// Fallback strategy that decided a unit's outcome, in priority order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Manifest declares a build script.
    BuildScript,

    /// Strict compiler configuration drives a type-check-only pass.
    ProjectTypeCheck,

    /// Relaxed type-check over the typed source files found on disk.
    LenientTypeCheck,

    /// Nothing to check; counts as success.
    NoTypedSources,
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::BuildScript => "build_script",
            Strategy::ProjectTypeCheck => "project_type_check",
            Strategy::LenientTypeCheck => "lenient_type_check",
            Strategy::NoTypedSources => "no_typed_sources",
        }
    }

    /// Whether this strategy has a command to run.
    pub fn requires_command(&self) -> bool {
        !matches!(self, Strategy::NoTypedSources)
    }

    /// Human-readable announcement printed when the strategy fires.
    pub fn description(&self) -> &'static str {
        match self {
            Strategy::BuildScript => "running build script",
            Strategy::ProjectTypeCheck => "type-checking with project config",
            Strategy::LenientTypeCheck => "type-checking typed source files",
            Strategy::NoTypedSources => "no typed files found, skipping check",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a unit failed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Dependency installation failed; no strategy was attempted.
    Install,

    /// The selected strategy's command exited non-zero, timed out, or could not start.
    Build,

    /// Manifest could not be read or parsed.
    Manifest,

    /// No outcome was recorded for the unit (aggregation only).
    MissingResult,
}

/// Result of attempting to build one unit. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuildOutcome {
    /// Identity of the unit this outcome belongs to (its name).
    pub unit: String,

    pub status: Status,

    /// Strategy that fired, if the unit got that far.
    pub strategy: Option<Strategy>,

    /// Set on failure.
    pub failure: Option<FailureKind>,

    /// Captured output or error text for triage.
    pub diagnostics: Option<String>,

    /// Wall-clock time spent on the unit.
    pub duration_ms: u64,

    pub finished_at: DateTime<Utc>,
}

impl BuildOutcome {
    /// Successful outcome.
    pub fn success(unit: &BuildUnit, strategy: Strategy, duration_ms: u64) -> Self {
        Self {
            unit: unit.name(),
            status: Status::Success,
            strategy: Some(strategy),
            failure: None,
            diagnostics: None,
            duration_ms,
            finished_at: Utc::now(),
        }
    }

    /// Failed outcome.
    pub fn failure(
        unit: &BuildUnit,
        kind: FailureKind,
        strategy: Option<Strategy>,
        diagnostics: impl Into<String>,
        duration_ms: u64,
    ) -> Self {
        let diagnostics = diagnostics.into();
        Self {
            unit: unit.name(),
            status: Status::Failure,
            strategy,
            failure: Some(kind),
            diagnostics: (!diagnostics.is_empty()).then_some(diagnostics),
            duration_ms,
            finished_at: Utc::now(),
        }
    }

    /// Placeholder for a unit whose outcome never arrived.
    pub fn missing(unit: &BuildUnit) -> Self {
        Self::failure(
            unit,
            FailureKind::MissingResult,
            None,
            "no outcome recorded for unit",
            0,
        )
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Last `lines` lines of the diagnostics, if any.
    pub fn diagnostics_tail(&self, lines: usize) -> Vec<&str> {
        let Some(text) = self.diagnostics.as_deref() else {
            return Vec::new();
        };
        let all: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
        let skip = all.len().saturating_sub(lines);
        all[skip..].to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn unit() -> BuildUnit {
        BuildUnit::new(Path::new("samples"), Path::new("samples/search"))
    }

    #[test]
    fn test_success_outcome() {
        let outcome = BuildOutcome::success(&unit(), Strategy::BuildScript, 120);
        assert!(outcome.is_success());
        assert_eq!(outcome.unit, "samples/search");
        assert_eq!(outcome.strategy, Some(Strategy::BuildScript));
        assert!(outcome.failure.is_none());
        assert!(outcome.diagnostics.is_none());
    }

    #[test]
    fn test_failure_outcome() {
        let outcome = BuildOutcome::failure(
            &unit(),
            FailureKind::Install,
            None,
            "npm ERR! code E404",
            30,
        );
        assert!(!outcome.is_success());
        assert_eq!(outcome.failure, Some(FailureKind::Install));
        assert_eq!(outcome.diagnostics.as_deref(), Some("npm ERR! code E404"));
    }

    #[test]
    fn test_empty_diagnostics_are_dropped() {
        let outcome = BuildOutcome::failure(&unit(), FailureKind::Build, None, "", 0);
        assert!(outcome.diagnostics.is_none());
    }

    #[test]
    fn test_missing_outcome_is_failure() {
        let outcome = BuildOutcome::missing(&unit());
        assert_eq!(outcome.status, Status::Failure);
        assert_eq!(outcome.failure, Some(FailureKind::MissingResult));
    }

    #[test]
    fn test_diagnostics_tail() {
        let outcome = BuildOutcome::failure(
            &unit(),
            FailureKind::Build,
            Some(Strategy::ProjectTypeCheck),
            "line1\n\nline2\nline3\nline4\n",
            0,
        );
        assert_eq!(outcome.diagnostics_tail(2), vec!["line3", "line4"]);
        assert_eq!(outcome.diagnostics_tail(10).len(), 4);
        assert!(outcome.diagnostics_tail(0).is_empty());
    }

    #[test]
    fn test_strategy_serializes_snake_case() {
        let json = serde_json::to_string(&Strategy::LenientTypeCheck).unwrap();
        assert_eq!(json, "\"lenient_type_check\"");
        assert_eq!(Strategy::LenientTypeCheck.to_string(), "lenient_type_check");
    }

    #[test]
    fn test_status_markers() {
        assert_eq!(Status::Success.marker(), "✓");
        assert_eq!(Status::Failure.marker(), "✗");
    }
}
