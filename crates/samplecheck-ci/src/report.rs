//! Console report formatting.
//!
//! Every line of the console contract is produced here: the discovery banner,
//! per-unit banners, strategy announcements, SUCCESS/FAILED markers and the
//! final summary block. Log scrapers depend on these exact shapes.

use std::path::Path;

use samplecheck_core::{BuildOutcome, BuildUnit, RunSummary, Strategy};

use crate::console::Console;

const SEPARATOR: &str = "==========================================";

/// `Found N sample(s) in <root>:` followed by one line per unit.
pub fn render_discovery(root: &Path, units: &[BuildUnit]) -> Vec<String> {
    let mut lines = Vec::with_capacity(units.len() + 1);
    lines.push(format!(
        "Found {} sample(s) in {}:",
        units.len(),
        root.display()
    ));
    lines.extend(units.iter().map(|u| format!("  - {}", u)));
    lines
}

/// Banner printed when a unit starts.
pub fn render_unit_banner(unit: &BuildUnit) -> Vec<String> {
    vec![
        String::new(),
        SEPARATOR.to_string(),
        format!("Building: {}", unit),
        SEPARATOR.to_string(),
    ]
}

pub fn render_install(unit: &BuildUnit) -> String {
    format!("  [{}] Installing dependencies...", unit)
}

/// Which fallback strategy fired for a unit.
pub fn render_strategy(unit: &BuildUnit, strategy: Strategy) -> String {
    format!("  [{}] Strategy: {}", unit, strategy.description())
}

/// SUCCESS/FAILED marker, plus the tail of the diagnostics on failure.
pub fn render_unit_result(outcome: &BuildOutcome, diagnostic_lines: usize) -> Vec<String> {
    if outcome.is_success() {
        return vec![format!("✓ SUCCESS: {}", outcome.unit)];
    }

    let mut lines = vec![format!("✗ FAILED: {}", outcome.unit)];
    lines.extend(
        outcome
            .diagnostics_tail(diagnostic_lines)
            .into_iter()
            .map(|l| format!("    | {}", l)),
    );
    lines
}

/// Summary block: counts, per-unit status in discovery order, final verdict.
pub fn render_summary(summary: &RunSummary) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        SEPARATOR.to_string(),
        "BUILD SUMMARY".to_string(),
        SEPARATOR.to_string(),
        format!("Total: {}", summary.total()),
        format!("Successful: {}", summary.success_count()),
        format!("Failed: {}", summary.failure_count()),
        String::new(),
        "Results:".to_string(),
    ];

    for entry in summary.entries() {
        lines.push(format!("  {} {}", entry.status().marker(), entry.unit));
    }

    lines.push(String::new());
    if summary.success() {
        lines.push("🎉 All samples built successfully!".to_string());
    } else {
        lines.push(format!(
            "⚠️  Some samples failed to build ({} of {})",
            summary.failure_count(),
            summary.total()
        ));
    }
    lines
}

/// Unit names as a single-line JSON array, the CI matrix input.
///
/// Names keep their spaces; the output must be usable as-is in a
/// `key=value` line.
pub fn render_unit_list(units: &[BuildUnit]) -> serde_json::Result<String> {
    let names: Vec<String> = units.iter().map(|u| u.name()).collect();
    serde_json::to_string(&names)
}

/// Print the summary block.
pub fn publish_summary(console: &dyn Console, summary: &RunSummary) {
    console.lines(&render_summary(summary));
}
