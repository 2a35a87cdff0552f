//! Aggregate run summary.
//!
//! A [`RunSummary`] is built once, after every unit was attempted, from the
//! discovered unit list and the completed outcomes. Outcomes are joined back
//! to units by identity, so entries always follow discovery order regardless
//! of the order workers finished in.

use std::collections::HashMap;

use serde::Serialize;
use tracing::warn;

use crate::outcome::{BuildOutcome, Status};
use crate::unit::BuildUnit;

/// One row of the summary: a unit and its outcome.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SummaryEntry {
    pub unit: BuildUnit,
    pub outcome: BuildOutcome,
}

impl SummaryEntry {
    pub fn status(&self) -> Status {
        self.outcome.status
    }
}

/// Counts plus per-unit status in discovery order.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RunSummary {
    total: usize,
    success_count: usize,
    failure_count: usize,
    entries: Vec<SummaryEntry>,
}

impl RunSummary {
    /// Join `outcomes` to `units` by identity.
    ///
    /// A unit without an outcome gets a `MissingResult` failure. Duplicate
    /// outcomes keep the first one; outcomes for unknown units are dropped.
    pub fn from_outcomes(units: &[BuildUnit], outcomes: Vec<BuildOutcome>) -> Self {
        let mut by_unit: HashMap<String, BuildOutcome> = HashMap::with_capacity(outcomes.len());
        for outcome in outcomes {
            if by_unit.contains_key(&outcome.unit) {
                warn!(unit = %outcome.unit, "Ignoring duplicate outcome");
                continue;
            }
            by_unit.insert(outcome.unit.clone(), outcome);
        }

        let entries: Vec<SummaryEntry> = units
            .iter()
            .map(|unit| {
                let outcome = by_unit
                    .remove(&unit.name())
                    .unwrap_or_else(|| BuildOutcome::missing(unit));
                SummaryEntry {
                    unit: unit.clone(),
                    outcome,
                }
            })
            .collect();

        for stray in by_unit.keys() {
            warn!(unit = %stray, "Ignoring outcome for undiscovered unit");
        }

        let success_count = entries.iter().filter(|e| e.outcome.is_success()).count();
        let total = entries.len();

        Self {
            total,
            success_count,
            failure_count: total - success_count,
            entries,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn success_count(&self) -> usize {
        self.success_count
    }

    pub fn failure_count(&self) -> usize {
        self.failure_count
    }

    /// Entries in discovery order.
    pub fn entries(&self) -> &[SummaryEntry] {
        &self.entries
    }

    /// Failed entries in discovery order.
    pub fn failures(&self) -> impl Iterator<Item = &SummaryEntry> {
        self.entries.iter().filter(|e| !e.outcome.is_success())
    }

    /// Whether every unit succeeded.
    pub fn success(&self) -> bool {
        self.failure_count == 0
    }

    /// Process exit status: 0 iff no unit failed.
    pub fn exit_code(&self) -> i32 {
        if self.success() {
            0
        } else {
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::{FailureKind, Strategy};
    use std::path::Path;

    fn units(names: &[&str]) -> Vec<BuildUnit> {
        names
            .iter()
            .map(|n| BuildUnit::new(Path::new("samples"), &Path::new("samples").join(n)))
            .collect()
    }

    #[test]
    fn test_all_successful() {
        let units = units(&["a", "b", "c"]);
        let outcomes = units
            .iter()
            .map(|u| BuildOutcome::success(u, Strategy::BuildScript, 10))
            .collect();

        let summary = RunSummary::from_outcomes(&units, outcomes);
        assert_eq!(summary.total(), 3);
        assert_eq!(summary.success_count(), 3);
        assert_eq!(summary.failure_count(), 0);
        assert!(summary.success());
        assert_eq!(summary.exit_code(), 0);
    }

    #[test]
    fn test_one_failure_sets_exit_code() {
        let units = units(&["a", "b", "c", "d"]);
        let outcomes = units
            .iter()
            .enumerate()
            .map(|(i, u)| {
                if i == 1 {
                    BuildOutcome::failure(u, FailureKind::Install, None, "boom", 5)
                } else {
                    BuildOutcome::success(u, Strategy::BuildScript, 5)
                }
            })
            .collect();

        let summary = RunSummary::from_outcomes(&units, outcomes);
        assert_eq!(summary.total(), 4);
        assert_eq!(summary.success_count(), 3);
        assert_eq!(summary.failure_count(), 1);
        assert_eq!(summary.exit_code(), 1);
        let failed: Vec<_> = summary.failures().map(|e| e.unit.name()).collect();
        assert_eq!(failed, vec!["samples/b"]);
    }

    #[test]
    fn test_entries_follow_discovery_order_not_arrival_order() {
        let units = units(&["a", "b", "c"]);
        let mut outcomes: Vec<_> = units
            .iter()
            .map(|u| BuildOutcome::success(u, Strategy::NoTypedSources, 1))
            .collect();
        outcomes.reverse();

        let summary = RunSummary::from_outcomes(&units, outcomes);
        let names: Vec<_> = summary.entries().iter().map(|e| e.unit.name()).collect();
        assert_eq!(names, vec!["samples/a", "samples/b", "samples/c"]);
    }

    #[test]
    fn test_missing_outcome_counts_as_failure() {
        let units = units(&["a", "b"]);
        let outcomes = vec![BuildOutcome::success(&units[0], Strategy::BuildScript, 1)];

        let summary = RunSummary::from_outcomes(&units, outcomes);
        assert_eq!(summary.total(), 2);
        assert_eq!(summary.failure_count(), 1);
        assert_eq!(
            summary.entries()[1].outcome.failure,
            Some(FailureKind::MissingResult)
        );
    }

    #[test]
    fn test_duplicates_and_strays_are_not_double_counted() {
        let units = units(&["a"]);
        let stray = BuildUnit::new(Path::new("samples"), Path::new("samples/zzz"));
        let outcomes = vec![
            BuildOutcome::success(&units[0], Strategy::BuildScript, 1),
            BuildOutcome::failure(&units[0], FailureKind::Build, None, "late", 1),
            BuildOutcome::success(&stray, Strategy::BuildScript, 1),
        ];

        let summary = RunSummary::from_outcomes(&units, outcomes);
        assert_eq!(summary.total(), 1);
        assert_eq!(summary.success_count(), 1);
        assert_eq!(
            summary.total(),
            summary.success_count() + summary.failure_count()
        );
    }
}
