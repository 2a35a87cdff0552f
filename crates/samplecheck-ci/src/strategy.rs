//! Build strategy selection.
//!
//! Strategies are an ordered list of predicate rules over a [`UnitProbe`];
//! the first rule that applies wins. The last default rule always applies.

use std::path::Path;

use samplecheck_core::{Strategy, ToolCommands, UnitProbe};

use crate::runner::CommandSpec;

/// Predicate deciding whether a strategy applies to a unit.
#[derive(Debug, Clone, Copy)]
pub struct StrategyRule {
    pub strategy: Strategy,
    pub applies: fn(&UnitProbe) -> bool,
}

/// Rules in priority order.
pub const DEFAULT_RULES: [StrategyRule; 4] = [
    StrategyRule {
        strategy: Strategy::BuildScript,
        applies: UnitProbe::has_build_script,
    },
    StrategyRule {
        strategy: Strategy::ProjectTypeCheck,
        applies: has_strict_config,
    },
    StrategyRule {
        strategy: Strategy::LenientTypeCheck,
        applies: UnitProbe::has_typed_files,
    },
    StrategyRule {
        strategy: Strategy::NoTypedSources,
        applies: always,
    },
];

fn has_strict_config(probe: &UnitProbe) -> bool {
    probe.strict_config
}

fn always(_: &UnitProbe) -> bool {
    true
}

/// First strategy in `rules` that applies, or `NoTypedSources` if none do.
pub fn select_strategy(probe: &UnitProbe, rules: &[StrategyRule]) -> Strategy {
    rules
        .iter()
        .find(|rule| (rule.applies)(probe))
        .map(|rule| rule.strategy)
        .unwrap_or(Strategy::NoTypedSources)
}

/// A selected strategy plus the command that carries it out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyPlan {
    pub strategy: Strategy,

    /// `None` when nothing needs to run.
    pub command: Option<CommandSpec>,
}

impl StrategyPlan {
    /// Resolve the command for `strategy` in the unit directory `dir`.
    pub fn resolve(
        strategy: Strategy,
        probe: &UnitProbe,
        dir: &Path,
        commands: &ToolCommands,
        timeout_secs: u64,
    ) -> Self {
        let command = match strategy {
            Strategy::BuildScript => CommandSpec::from_argv(&commands.build, dir, timeout_secs),
            Strategy::ProjectTypeCheck => {
                CommandSpec::from_argv(&commands.project_check, dir, timeout_secs)
            }
            Strategy::LenientTypeCheck => {
                CommandSpec::from_argv(&commands.lenient_check, dir, timeout_secs).map(|spec| {
                    spec.with_args(
                        probe
                            .typed_files
                            .iter()
                            .map(|f| f.to_string_lossy().replace('\\', "/")),
                    )
                })
            }
            Strategy::NoTypedSources => None,
        };

        Self { strategy, command }
    }
}
