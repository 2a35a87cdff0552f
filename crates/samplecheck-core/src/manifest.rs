//! Manifest parsing and unit probing.
//!
//! The orchestrator only needs three facts about a unit: whether the manifest
//! declares a build script, whether a strict compiler configuration exists,
//! and which typed source files are on disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;
use walkdir::WalkDir;

use crate::config::EcosystemLayout;
use crate::discovery::is_dependency_cache;
use crate::error::{HarnessError, Result};

/// The subset of a package manifest the harness reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Manifest {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub scripts: BTreeMap<String, serde_json::Value>,
}

impl Manifest {
    /// Parse manifest content.
    pub fn parse(content: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Read and parse the manifest of the unit at `dir`.
    pub fn load(dir: &Path, layout: &EcosystemLayout) -> Result<Self> {
        let path = dir.join(&layout.manifest);
        let content = std::fs::read_to_string(&path)?;
        Self::parse(&content).map_err(|e| HarnessError::Manifest {
            path,
            reason: e.to_string(),
        })
    }

    /// The `build` script, if declared and not blank.
    pub fn build_script(&self) -> Option<&str> {
        self.scripts
            .get("build")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// What the strategy rules can see of a unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitProbe {
    /// Build script declared by the manifest.
    pub build_script: Option<String>,

    /// Whether the strict compiler configuration exists in the unit directory.
    pub strict_config: bool,

    /// Typed source files, relative to the unit directory, in walk order.
    pub typed_files: Vec<PathBuf>,
}

impl UnitProbe {
    /// Inspect the unit at `dir`.
    pub fn inspect(dir: &Path, layout: &EcosystemLayout) -> Result<Self> {
        let manifest = Manifest::load(dir, layout)?;
        Ok(Self {
            build_script: manifest.build_script().map(str::to_string),
            strict_config: dir.join(&layout.strict_config).is_file(),
            typed_files: typed_sources(dir, layout),
        })
    }

    pub fn has_build_script(&self) -> bool {
        self.build_script.is_some()
    }

    pub fn has_typed_files(&self) -> bool {
        !self.typed_files.is_empty()
    }
}

/// Typed source files below `dir`, skipping the dependency cache.
pub fn typed_sources(dir: &Path, layout: &EcosystemLayout) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_dependency_cache(e, layout))
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(error = %err, "Skipping unreadable entry while scanning sources");
                continue;
            }
        };

        if entry.file_type().is_file() && layout.is_typed_source(entry.path()) {
            let rel = entry
                .path()
                .strip_prefix(dir)
                .unwrap_or(entry.path())
                .to_path_buf();
            files.push(rel);
        }
    }

    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_build_script_present() {
        let manifest =
            Manifest::parse(r#"{"name":"search","scripts":{"build":"tsc","start":"node ."}}"#)
                .unwrap();
        assert_eq!(manifest.name.as_deref(), Some("search"));
        assert_eq!(manifest.build_script(), Some("tsc"));
    }

    #[test]
    fn test_build_script_absent_or_blank() {
        let no_scripts = Manifest::parse(r#"{"name":"a"}"#).unwrap();
        assert_eq!(no_scripts.build_script(), None);

        let blank = Manifest::parse(r#"{"scripts":{"build":"   "}}"#).unwrap();
        assert_eq!(blank.build_script(), None);

        let other = Manifest::parse(r#"{"scripts":{"start":"node index.js"}}"#).unwrap();
        assert_eq!(other.build_script(), None);
    }

    #[test]
    fn test_non_string_build_entry_is_ignored() {
        let manifest = Manifest::parse(r#"{"scripts":{"build":42}}"#).unwrap();
        assert_eq!(manifest.build_script(), None);
    }

    #[test]
    fn test_load_invalid_manifest() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "package.json", "{ not json");

        let err = Manifest::load(dir.path(), &EcosystemLayout::default()).unwrap_err();
        assert!(matches!(err, HarnessError::Manifest { .. }));
    }

    #[test]
    fn test_probe_full_unit() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "package.json",
            r#"{"scripts":{"build":"tsc -p ."}}"#,
        );
        write(dir.path(), "tsconfig.json", "{}");
        write(dir.path(), "src/index.ts", "export {};");
        write(dir.path(), "src/view.tsx", "export {};");
        write(dir.path(), "src/legacy.js", "");
        write(dir.path(), "node_modules/pkg/index.d.ts", "");

        let probe = UnitProbe::inspect(dir.path(), &EcosystemLayout::default()).unwrap();
        assert_eq!(probe.build_script.as_deref(), Some("tsc -p ."));
        assert!(probe.strict_config);
        assert_eq!(
            probe.typed_files,
            vec![PathBuf::from("src/index.ts"), PathBuf::from("src/view.tsx")]
        );
    }

    #[test]
    fn test_probe_bare_unit() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "package.json", r#"{"name":"blob-listing"}"#);
        write(dir.path(), "index.js", "console.log('hi')");

        let probe = UnitProbe::inspect(dir.path(), &EcosystemLayout::default()).unwrap();
        assert!(!probe.has_build_script());
        assert!(!probe.strict_config);
        assert!(!probe.has_typed_files());
    }
}
