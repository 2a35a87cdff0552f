//! Error taxonomy for the harness.
//!
//! Only run-level problems surface as [`HarnessError`] to the caller.
//! Per-unit problems are folded into a [`crate::BuildOutcome`] instead.

use std::path::PathBuf;

/// Harness errors.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// Samples root is missing, not a directory, or unreadable.
    #[error("invalid samples root {}: {reason}", .path.display())]
    Configuration { path: PathBuf, reason: String },

    /// Discovery succeeded but nothing matched the manifest name.
    #[error("no sample units found under {} (looking for {manifest})", .root.display())]
    NoUnitsFound { root: PathBuf, manifest: String },

    /// Config file could not be parsed.
    #[error("invalid config file {}: {reason}", .path.display())]
    InvalidConfig { path: PathBuf, reason: String },

    /// Effective configuration is unusable (empty command, zero jobs).
    #[error("invalid setting: {0}")]
    InvalidSetting(String),

    /// Unit manifest exists but could not be parsed.
    #[error("invalid manifest {}: {reason}", .path.display())]
    Manifest { path: PathBuf, reason: String },

    /// Requested unit is not part of the discovered set.
    #[error("unknown unit: {0}")]
    UnknownUnit(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for harness operations.
pub type Result<T> = std::result::Result<T, HarnessError>;
