//! Per-unit result artifacts.
//!
//! When units run as separate CI jobs, each job writes its outcome to
//! `<dir>/<sha256(unit)>.json` and a later aggregation stage joins the
//! artifacts back to the discovered units by identity.
//!
//! Writes go through a temporary file that is synced to disk before it is
//! renamed into place, so a reader never sees a partially written artifact
//! and a finished job's result survives the runner going away.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use samplecheck_core::{BuildOutcome, BuildUnit, HarnessError, Result, RunSummary};

const ARTIFACT_EXTENSION: &str = "json";

/// Artifact file name for a unit: hex SHA-256 of its name.
pub fn artifact_file_name(unit_name: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(unit_name.as_bytes());
    format!("{}.{}", hex::encode(hasher.finalize()), ARTIFACT_EXTENSION)
}

/// Write `outcome` into `dir`, replacing any previous artifact for the unit.
///
/// Returns the artifact path.
pub fn write_outcome(dir: &Path, outcome: &BuildOutcome) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;

    let path = dir.join(artifact_file_name(&outcome.unit));
    let tmp = path.with_extension("json.tmp");

    let json = serde_json::to_vec_pretty(outcome)?;
    let mut file = File::create(&tmp)?;
    file.write_all(&json)?;
    file.sync_all()?;
    drop(file);
    std::fs::rename(&tmp, &path)?;

    debug!(unit = %outcome.unit, path = %path.display(), "Wrote result artifact");
    Ok(path)
}

/// Read every artifact in `dir`.
///
/// A missing directory yields no outcomes. Unparsable artifacts are skipped
/// with a warning; their units then surface as missing results.
pub fn read_outcomes(dir: &Path) -> Result<Vec<BuildOutcome>> {
    let read_dir = match std::fs::read_dir(dir) {
        Ok(rd) => rd,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(dir = %dir.display(), "Artifacts directory does not exist");
            return Ok(Vec::new());
        }
        Err(e) => return Err(HarnessError::Io(e)),
    };

    let mut paths = Vec::new();
    for entry in read_dir {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) == Some(ARTIFACT_EXTENSION) {
            paths.push(path);
        }
    }
    paths.sort();

    let mut outcomes = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = std::fs::read(&path)?;
        match serde_json::from_slice::<BuildOutcome>(&bytes) {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable artifact"),
        }
    }

    Ok(outcomes)
}

/// Build the run summary for `units` from the artifacts in `dir`.
pub fn collect_summary(units: &[BuildUnit], dir: &Path) -> Result<RunSummary> {
    let outcomes = read_outcomes(dir)?;
    Ok(RunSummary::from_outcomes(units, outcomes))
}
