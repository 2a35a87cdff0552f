//! Buildable unit identity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// One independently buildable sample: a directory holding a manifest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct BuildUnit {
    /// Unit directory as reached from the samples root (e.g. `samples/search`).
    pub path: PathBuf,

    /// Unit directory relative to the samples root (e.g. `search`).
    pub relative: PathBuf,
}

impl BuildUnit {
    /// Create a unit from the samples root and the unit directory below it.
    pub fn new(root: &Path, dir: &Path) -> Self {
        let relative = dir.strip_prefix(root).unwrap_or(dir).to_path_buf();
        Self {
            path: dir.to_path_buf(),
            relative,
        }
    }

    /// Display label, also the unit's identity key in outcomes and artifacts.
    pub fn name(&self) -> String {
        self.path.to_string_lossy().replace('\\', "/")
    }

    /// Directory that commands for this unit run in.
    pub fn dir(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for BuildUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}
