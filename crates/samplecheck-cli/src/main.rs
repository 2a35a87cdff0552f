//! samplecheck - build validation for the samples tree
//!
//! Running `samplecheck` with no subcommand discovers every sample under the
//! root, installs and builds or type-checks each one, prints a summary and
//! exits 0 only if every sample succeeded.
//!
//! ## Commands
//!
//! - `discover`: print discovered units as JSON (CI matrix input)
//! - `check`: build a single unit and write its result artifact
//! - `aggregate`: summarise result artifacts from separate `check` jobs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, Level};

use samplecheck_ci::{report, Harness};
use samplecheck_core::{init_tracing, HarnessConfig, RunSummary};

/// Config file picked up from the working directory when `--config` is absent.
const DEFAULT_CONFIG_FILE: &str = "samplecheck.toml";

#[derive(Parser)]
#[command(name = "samplecheck")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Install, build and type-check every sample project", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Samples root directory (default: samples)
    #[arg(long, global = true, env = "SAMPLECHECK_ROOT")]
    root: Option<PathBuf>,

    /// TOML config file (default: ./samplecheck.toml if present)
    #[arg(long, global = true, env = "SAMPLECHECK_CONFIG")]
    config: Option<PathBuf>,

    /// Units built concurrently (1 = sequential)
    #[arg(short, long, global = true, env = "SAMPLECHECK_JOBS")]
    jobs: Option<usize>,

    /// Per-command timeout in seconds (0 = none)
    #[arg(long, global = true, env = "SAMPLECHECK_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Directory for per-unit result artifacts
    #[arg(long, global = true, env = "SAMPLECHECK_ARTIFACTS_DIR")]
    artifacts_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print discovered units as a JSON array
    Discover,

    /// Build a single unit
    Check {
        /// Unit name (e.g. samples/search) or path relative to the root
        unit: String,
    },

    /// Summarise result artifacts written by `check` jobs
    Aggregate,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    let config = resolve_config(&cli)?;
    let harness = Harness::with_process_runner(config);

    match cli.command {
        None => cmd_run(&harness).await,
        Some(Commands::Discover) => cmd_discover(&harness),
        Some(Commands::Check { unit }) => cmd_check(&harness, &unit).await,
        Some(Commands::Aggregate) => cmd_aggregate(&harness),
    }
}

/// Load the config file (if any) and apply flag/env overrides.
fn resolve_config(cli: &Cli) -> Result<HarnessConfig> {
    let mut config = match &cli.config {
        Some(path) => HarnessConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
            HarnessConfig::load(Path::new(DEFAULT_CONFIG_FILE))
                .with_context(|| format!("Failed to load {}", DEFAULT_CONFIG_FILE))?
        }
        None => HarnessConfig::default(),
    };

    if let Some(root) = &cli.root {
        config.root = root.clone();
    }
    if let Some(jobs) = cli.jobs {
        config.jobs = jobs;
    }
    if let Some(timeout_secs) = cli.timeout_secs {
        config.timeout_secs = timeout_secs;
    }
    if let Some(dir) = &cli.artifacts_dir {
        config.artifacts_dir = Some(dir.clone());
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Build every sample and print the summary
async fn cmd_run(harness: &Harness) -> Result<ExitCode> {
    info!(root = %harness.config().root.display(), "Discovering samples");

    let summary = harness
        .run()
        .await
        .context("Sample build validation aborted")?;

    Ok(exit_code(&summary))
}

/// Print discovered units as JSON
fn cmd_discover(harness: &Harness) -> Result<ExitCode> {
    let units = harness.discover().context("Discovery failed")?;
    println!("{}", report::render_unit_list(&units)?);
    Ok(ExitCode::SUCCESS)
}

/// Build one unit
async fn cmd_check(harness: &Harness, unit: &str) -> Result<ExitCode> {
    if harness.config().artifacts_dir.is_none() {
        info!("No artifacts directory set; the result will only be printed");
    }

    let outcome = harness
        .check_unit(unit)
        .await
        .with_context(|| format!("Failed to check unit {}", unit))?;

    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Summarise artifacts from separate check jobs
fn cmd_aggregate(harness: &Harness) -> Result<ExitCode> {
    let dir = harness
        .config()
        .artifacts_dir
        .clone()
        .context("aggregate requires --artifacts-dir")?;

    let summary = harness
        .aggregate(&dir)
        .with_context(|| format!("Failed to aggregate artifacts in {}", dir.display()))?;

    Ok(exit_code(&summary))
}

fn exit_code(summary: &RunSummary) -> ExitCode {
    ExitCode::from(summary.exit_code() as u8)
}
