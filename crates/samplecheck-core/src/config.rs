//! Harness configuration.
//!
//! Every field has a default matching the npm/TypeScript samples tree, so an
//! empty (or absent) config file is valid. The binary layers CLI flags and
//! `SAMPLECHECK_*` environment variables on top of the loaded file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{HarnessError, Result};

/// Default samples root, relative to the working directory.
pub const DEFAULT_ROOT: &str = "samples";

/// Top-level harness configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HarnessConfig {
    /// Directory scanned for units.
    pub root: PathBuf,

    /// File names that define what a unit looks like on disk.
    pub layout: EcosystemLayout,

    /// Commands run for install and each strategy.
    pub commands: ToolCommands,

    /// Per-command timeout in seconds (0 = no timeout).
    pub timeout_secs: u64,

    /// Units processed concurrently (1 = sequential).
    pub jobs: usize,

    /// Trailing output lines shown under a failed unit.
    pub diagnostic_lines: usize,

    /// Where per-unit result artifacts are written, if anywhere.
    pub artifacts_dir: Option<PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            layout: EcosystemLayout::default(),
            commands: ToolCommands::default(),
            timeout_secs: 0,
            jobs: 1,
            diagnostic_lines: 20,
            artifacts_dir: None,
        }
    }
}

impl HarnessConfig {
    /// Load a TOML config file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| HarnessError::InvalidConfig {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let config: HarnessConfig =
            toml::from_str(&content).map_err(|e| HarnessError::InvalidConfig {
                path: path.to_path_buf(),
                reason: e.message().to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the orchestrator cannot act on.
    pub fn validate(&self) -> Result<()> {
        if self.jobs == 0 {
            return Err(HarnessError::InvalidSetting(
                "jobs must be at least 1".to_string(),
            ));
        }
        if self.layout.manifest.trim().is_empty() {
            return Err(HarnessError::InvalidSetting(
                "layout.manifest must not be empty".to_string(),
            ));
        }
        for (name, command) in self.commands.named() {
            if command.is_empty() {
                return Err(HarnessError::InvalidSetting(format!(
                    "commands.{} must not be empty",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// On-disk conventions of the sample ecosystem.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EcosystemLayout {
    /// Manifest file that marks a unit directory.
    pub manifest: String,

    /// Local package store; never descended into.
    pub dependency_cache: String,

    /// Strict compiler configuration enabling a project-wide type-check.
    pub strict_config: String,

    /// Extensions of statically-typed source files.
    pub typed_extensions: Vec<String>,
}

impl Default for EcosystemLayout {
    fn default() -> Self {
        Self {
            manifest: "package.json".to_string(),
            dependency_cache: "node_modules".to_string(),
            strict_config: "tsconfig.json".to_string(),
            typed_extensions: vec!["ts".to_string(), "tsx".to_string()],
        }
    }
}

impl EcosystemLayout {
    /// Whether a file name carries one of the typed source extensions.
    pub fn is_typed_source(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.typed_extensions.iter().any(|t| t == ext))
            .unwrap_or(false)
    }
}

/// Commands for each step. The first element is the executable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ToolCommands {
    /// Dependency installation, run in the unit directory.
    pub install: Vec<String>,

    /// Runs the manifest's build script.
    pub build: Vec<String>,

    /// Type-check driven by the strict compiler configuration.
    pub project_check: Vec<String>,

    /// Relaxed type-check; the typed files are appended as arguments.
    pub lenient_check: Vec<String>,
}

impl Default for ToolCommands {
    fn default() -> Self {
        Self {
            install: argv(&["npm", "install"]),
            build: argv(&["npm", "run", "build"]),
            project_check: argv(&["npx", "tsc", "--noEmit"]),
            lenient_check: argv(&[
                "npx",
                "tsc",
                "--noEmit",
                "--skipLibCheck",
                "--esModuleInterop",
            ]),
        }
    }
}

impl ToolCommands {
    fn named(&self) -> [(&'static str, &Vec<String>); 4] {
        [
            ("install", &self.install),
            ("build", &self.build),
            ("project_check", &self.project_check),
            ("lenient_check", &self.lenient_check),
        ]
    }
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}
