//! samplecheck core - domain model for the sample build harness
//!
//! Provides the pieces every harness stage shares:
//! - Discovery of buildable units under a samples root
//! - Manifest probing (build script, strict compiler config, typed sources)
//! - Per-unit outcomes and the aggregate run summary
//! - Configuration and tracing initialisation

pub mod config;
pub mod discovery;
pub mod error;
pub mod manifest;
pub mod outcome;
pub mod summary;
pub mod telemetry;
pub mod unit;

// Re-export key types
pub use config::{EcosystemLayout, HarnessConfig, ToolCommands};
pub use discovery::{discover, discover_units};
pub use error::{HarnessError, Result};
pub use manifest::{Manifest, UnitProbe};
pub use outcome::{BuildOutcome, FailureKind, Status, Strategy};
pub use summary::{RunSummary, SummaryEntry};
pub use telemetry::init_tracing;
pub use unit::BuildUnit;
