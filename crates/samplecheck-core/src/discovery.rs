//! Unit discovery.
//!
//! Walks the samples root in file-name order and reports every directory
//! holding the manifest. Dependency-cache directories are pruned from the
//! walk, so nothing installed under them is ever reported as a unit.

use std::path::Path;

use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::config::EcosystemLayout;
use crate::error::{HarnessError, Result};
use crate::unit::BuildUnit;

/// Discover units under `root`, parents before nested units.
///
/// Fails with [`HarnessError::Configuration`] when the root is missing, not a
/// directory, or unreadable. An empty result is not an error here; see
/// [`discover_units`].
pub fn discover(root: &Path, layout: &EcosystemLayout) -> Result<Vec<BuildUnit>> {
    check_root(root)?;

    let mut units = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_dependency_cache(entry, layout));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => {
                return Err(HarnessError::Configuration {
                    path: root.to_path_buf(),
                    reason: err.to_string(),
                });
            }
            Err(err) => {
                warn!(error = %err, "Skipping unreadable entry during discovery");
                continue;
            }
        };

        if !entry.file_type().is_dir() {
            continue;
        }

        if entry.path().join(&layout.manifest).is_file() {
            let unit = BuildUnit::new(root, entry.path());
            debug!(unit = %unit, "Discovered unit");
            units.push(unit);
        }
    }

    Ok(units)
}

/// Discover units, failing with [`HarnessError::NoUnitsFound`] when none exist.
pub fn discover_units(root: &Path, layout: &EcosystemLayout) -> Result<Vec<BuildUnit>> {
    let units = discover(root, layout)?;
    if units.is_empty() {
        return Err(HarnessError::NoUnitsFound {
            root: root.to_path_buf(),
            manifest: layout.manifest.clone(),
        });
    }
    Ok(units)
}

fn check_root(root: &Path) -> Result<()> {
    let metadata = std::fs::metadata(root).map_err(|e| HarnessError::Configuration {
        path: root.to_path_buf(),
        reason: e.to_string(),
    })?;

    if !metadata.is_dir() {
        return Err(HarnessError::Configuration {
            path: root.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }

    std::fs::read_dir(root).map_err(|e| HarnessError::Configuration {
        path: root.to_path_buf(),
        reason: e.to_string(),
    })?;

    Ok(())
}

/// Whether `entry` is a dependency-cache directory below the root.
pub(crate) fn is_dependency_cache(entry: &DirEntry, layout: &EcosystemLayout) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry.file_name().to_str() == Some(layout.dependency_cache.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "{}").unwrap();
    }

    fn relatives(units: &[BuildUnit]) -> Vec<PathBuf> {
        units.iter().map(|u| u.relative.clone()).collect()
    }

    #[test]
    fn test_discovers_units_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "search/package.json");
        touch(dir.path(), "agents/package.json");
        touch(dir.path(), "blob-listing/package.json");
        touch(dir.path(), "docs/README.md");

        let units = discover(dir.path(), &EcosystemLayout::default()).unwrap();
        assert_eq!(
            relatives(&units),
            vec![
                PathBuf::from("agents"),
                PathBuf::from("blob-listing"),
                PathBuf::from("search"),
            ]
        );
    }

    #[test]
    fn test_nested_units_follow_their_parent() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "agents/package.json");
        touch(dir.path(), "agents/basic/package.json");
        touch(dir.path(), "agents/streaming/package.json");

        let units = discover(dir.path(), &EcosystemLayout::default()).unwrap();
        assert_eq!(
            relatives(&units),
            vec![
                PathBuf::from("agents"),
                PathBuf::from("agents/basic"),
                PathBuf::from("agents/streaming"),
            ]
        );
    }

    #[test]
    fn test_dependency_cache_is_pruned() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "search/package.json");
        touch(dir.path(), "search/node_modules/typescript/package.json");
        touch(dir.path(), "search/node_modules/@azure/search/package.json");
        touch(dir.path(), "node_modules/left-pad/package.json");

        let units = discover(dir.path(), &EcosystemLayout::default()).unwrap();
        assert_eq!(relatives(&units), vec![PathBuf::from("search")]);
    }

    #[test]
    fn test_root_with_manifest_is_a_unit() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "package.json");

        let units = discover(dir.path(), &EcosystemLayout::default()).unwrap();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].path, dir.path());
    }

    #[test]
    fn test_discovery_order_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["zeta", "alpha", "mu", "beta"] {
            touch(dir.path(), &format!("{}/package.json", name));
        }

        let first = discover(dir.path(), &EcosystemLayout::default()).unwrap();
        let second = discover(dir.path(), &EcosystemLayout::default()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_custom_manifest_name() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "py-sample/pyproject.toml");
        touch(dir.path(), "ts-sample/package.json");

        let layout = EcosystemLayout {
            manifest: "pyproject.toml".to_string(),
            dependency_cache: ".venv".to_string(),
            ..Default::default()
        };
        let units = discover(dir.path(), &layout).unwrap();
        assert_eq!(relatives(&units), vec![PathBuf::from("py-sample")]);
    }

    #[test]
    fn test_missing_root_is_configuration_error() {
        let err = discover(Path::new("/nonexistent/samples"), &EcosystemLayout::default())
            .unwrap_err();
        assert!(matches!(err, HarnessError::Configuration { .. }));
    }

    #[test]
    fn test_root_file_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("samples");
        fs::write(&file, "not a dir").unwrap();

        let err = discover(&file, &EcosystemLayout::default()).unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn test_empty_root_is_no_units_found() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover(dir.path(), &EcosystemLayout::default())
            .unwrap()
            .is_empty());

        let err = discover_units(dir.path(), &EcosystemLayout::default()).unwrap_err();
        assert!(matches!(err, HarnessError::NoUnitsFound { .. }));
    }
}
