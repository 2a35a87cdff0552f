//! Subprocess execution capability.
//!
//! Every install, build and type-check step goes through [`CommandRunner`].
//! A runner never returns an error: spawn failures and timeouts come back as
//! a failed [`CommandOutput`] so callers classify results by exit status only.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::debug;

/// One command to run in a unit directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Executable.
    pub program: String,

    /// Arguments.
    pub args: Vec<String>,

    /// Working directory.
    pub workdir: PathBuf,

    /// Timeout in seconds (0 = none).
    pub timeout_secs: u64,
}

impl CommandSpec {
    /// Build a spec from an argv list whose first element is the executable.
    ///
    /// Returns `None` for an empty argv.
    pub fn from_argv(
        argv: &[String],
        workdir: impl Into<PathBuf>,
        timeout_secs: u64,
    ) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
            workdir: workdir.into(),
            timeout_secs,
        })
    }

    /// Append extra arguments.
    pub fn with_args<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(extra.into_iter().map(Into::into));
        self
    }

    /// Command line as a single display string.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Result of running a command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code (0 = success, -1 when the process never exited normally).
    pub exit_code: i32,

    /// Captured stdout.
    pub stdout: String,

    /// Captured stderr.
    pub stderr: String,

    /// Duration in milliseconds.
    pub duration_ms: u64,

    /// Spawn or timeout error, if the command did not run to completion.
    pub error: Option<String>,
}

impl CommandOutput {
    /// Completed with exit code 0.
    pub fn ok() -> Self {
        Self::default()
    }

    /// Completed with the given exit code and stderr.
    pub fn exited(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stderr: stderr.into(),
            ..Default::default()
        }
    }

    /// Did not run to completion.
    pub fn errored(error: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            exit_code: -1,
            duration_ms,
            error: Some(error.into()),
            ..Default::default()
        }
    }

    /// Whether this command passed (exit code 0, no error).
    pub fn passed(&self) -> bool {
        self.error.is_none() && self.exit_code == 0
    }

    /// Everything captured, for diagnostics.
    pub fn combined(&self) -> String {
        let mut out = String::new();
        for part in [self.stdout.as_str(), self.stderr.as_str()] {
            if !part.trim().is_empty() {
                out.push_str(part.trim_end());
                out.push('\n');
            }
        }
        if let Some(error) = &self.error {
            out.push_str(error);
            out.push('\n');
        }
        out
    }
}

/// Capability to run a command in a directory.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, spec: &CommandSpec) -> CommandOutput;
}

/// Runs commands as real subprocesses via `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, spec: &CommandSpec) -> CommandOutput {
        let start = Instant::now();
        debug!(command = %spec.display(), workdir = %spec.workdir.display(), "Spawning command");

        let child = match Command::new(&spec.program)
            .args(&spec.args)
            .current_dir(&spec.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                return CommandOutput::errored(
                    format!("failed to start `{}`: {}", spec.display(), e),
                    start.elapsed().as_millis() as u64,
                );
            }
        };

        let output = if spec.timeout_secs > 0 {
            match tokio::time::timeout(
                Duration::from_secs(spec.timeout_secs),
                child.wait_with_output(),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => {
                    return CommandOutput::errored(
                        format!(
                            "`{}` timed out after {} seconds",
                            spec.display(),
                            spec.timeout_secs
                        ),
                        start.elapsed().as_millis() as u64,
                    );
                }
            }
        } else {
            child.wait_with_output().await
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        match output {
            Ok(output) => CommandOutput {
                exit_code: output.status.code().unwrap_or(-1),
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                duration_ms,
                error: None,
            },
            Err(e) => CommandOutput::errored(
                format!("failed waiting on `{}`: {}", spec.display(), e),
                duration_ms,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(argv: &[&str], timeout_secs: u64) -> CommandSpec {
        let argv: Vec<String> = argv.iter().map(|s| s.to_string()).collect();
        CommandSpec::from_argv(&argv, std::env::temp_dir(), timeout_secs).unwrap()
    }

    #[test]
    fn test_from_argv() {
        let spec = spec(&["npx", "tsc", "--noEmit"], 30).with_args(["src/index.ts"]);
        assert_eq!(spec.program, "npx");
        assert_eq!(spec.args, vec!["tsc", "--noEmit", "src/index.ts"]);
        assert_eq!(spec.display(), "npx tsc --noEmit src/index.ts");
    }

    #[test]
    fn test_from_empty_argv() {
        assert!(CommandSpec::from_argv(&[], ".", 0).is_none());
    }

    #[test]
    fn test_output_passed() {
        assert!(CommandOutput::ok().passed());
        assert!(!CommandOutput::exited(2, "error TS2304").passed());
        assert!(!CommandOutput::errored("timed out", 10).passed());
    }

    #[test]
    fn test_combined_output() {
        let output = CommandOutput {
            exit_code: 1,
            stdout: "compiling\n".to_string(),
            stderr: "error TS2307\n".to_string(),
            duration_ms: 5,
            error: None,
        };
        assert_eq!(output.combined(), "compiling\nerror TS2307\n");
    }

    #[tokio::test]
    async fn test_run_simple_command() {
        let output = ProcessRunner.run(&spec(&["echo", "hello"], 60)).await;
        assert!(output.passed());
        assert_eq!(output.exit_code, 0);
        assert!(output.stdout.contains("hello"));
    }

    #[tokio::test]
    async fn test_run_failing_command() {
        let output = ProcessRunner.run(&spec(&["false"], 60)).await;
        assert!(!output.passed());
        assert_ne!(output.exit_code, 0);
        assert!(output.error.is_none());
    }

    #[tokio::test]
    async fn test_run_missing_program() {
        let output = ProcessRunner
            .run(&spec(&["samplecheck-definitely-not-installed"], 60))
            .await;
        assert!(!output.passed());
        assert_eq!(output.exit_code, -1);
        assert!(output.error.unwrap().contains("failed to start"));
    }

    #[tokio::test]
    async fn test_run_timeout() {
        let output = ProcessRunner.run(&spec(&["sleep", "5"], 1)).await;
        assert!(!output.passed());
        assert!(output.error.unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_run_in_workdir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "x").unwrap();
        let argv = vec!["ls".to_string()];
        let spec = CommandSpec::from_argv(&argv, dir.path(), 60).unwrap();

        let output = ProcessRunner.run(&spec).await;
        assert!(output.passed());
        assert!(output.stdout.contains("marker.txt"));
    }
}
