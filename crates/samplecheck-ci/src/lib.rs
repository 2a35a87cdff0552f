//! samplecheck CI - build orchestration for sample projects
//!
//! Provides the harness that:
//! - Installs and builds or type-checks every discovered unit
//! - Isolates per-unit failures and records one outcome per unit
//! - Runs units sequentially or on a bounded worker pool
//! - Persists per-unit result artifacts for split execution/aggregation
//! - Reports the aggregate summary and overall exit status

pub mod artifact;
pub mod console;
pub mod fakes;
pub mod harness;
pub mod orchestrator;
pub mod report;
pub mod runner;
pub mod strategy;

// Re-export key types
pub use console::{Console, StdoutConsole};
pub use harness::Harness;
pub use orchestrator::{ExecutionMode, Orchestrator};
pub use runner::{CommandOutput, CommandRunner, CommandSpec, ProcessRunner};
pub use strategy::{select_strategy, StrategyPlan, StrategyRule};
