//! In-memory fakes for the runner and console (testing only)
//!
//! `ScriptedRunner` answers commands from a script instead of spawning
//! processes and records every call; `MemoryConsole` captures output lines.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::console::Console;
use crate::runner::{CommandOutput, CommandRunner, CommandSpec};

// ---------------------------------------------------------------------------
// MemoryConsole
// ---------------------------------------------------------------------------

/// Console that keeps every line in memory.
#[derive(Debug, Default)]
pub struct MemoryConsole {
    lines: Mutex<Vec<String>>,
}

impl MemoryConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// All lines written so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    /// Whole output joined with newlines.
    pub fn output(&self) -> String {
        self.lines().join("\n")
    }

    /// Whether any line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|l| l.contains(needle))
    }
}

impl Console for MemoryConsole {
    fn line(&self, text: &str) {
        self.lines.lock().unwrap().push(text.to_string());
    }
}

// ---------------------------------------------------------------------------
// ScriptedRunner
// ---------------------------------------------------------------------------

/// A command observed by [`ScriptedRunner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub workdir: PathBuf,
    pub command: String,
}

#[derive(Debug)]
struct Response {
    workdir: PathBuf,
    prefix: String,
    output: Option<CommandOutput>,
}

/// Runner that succeeds by default and answers from scripted responses.
///
/// A response matches when the working directory is equal and the command
/// line starts with the given prefix. The first matching response wins.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    responses: Vec<Response>,
    delays: HashMap<PathBuf, Duration>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer matching commands with `output`.
    pub fn respond(
        mut self,
        workdir: impl Into<PathBuf>,
        prefix: impl Into<String>,
        output: CommandOutput,
    ) -> Self {
        self.responses.push(Response {
            workdir: workdir.into(),
            prefix: prefix.into(),
            output: Some(output),
        });
        self
    }

    /// Fail matching commands with exit code 1.
    pub fn fail(self, workdir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let stderr = format!("scripted failure: {}", prefix);
        self.respond(workdir, prefix, CommandOutput::exited(1, stderr))
    }

    /// Panic on matching commands.
    pub fn panic_on(mut self, workdir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        self.responses.push(Response {
            workdir: workdir.into(),
            prefix: prefix.into(),
            output: None,
        });
        self
    }

    /// Sleep before answering any command in `workdir`.
    pub fn delay(mut self, workdir: impl Into<PathBuf>, delay: Duration) -> Self {
        self.delays.insert(workdir.into(), delay);
        self
    }

    /// Every call in arrival order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Command lines run in `workdir`, in arrival order.
    pub fn commands_in(&self, workdir: &Path) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.workdir == workdir)
            .map(|c| c.command)
            .collect()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, spec: &CommandSpec) -> CommandOutput {
        let command = spec.display();
        self.calls.lock().unwrap().push(RecordedCall {
            workdir: spec.workdir.clone(),
            command: command.clone(),
        });

        if let Some(delay) = self.delays.get(&spec.workdir) {
            tokio::time::sleep(*delay).await;
        }

        let response = self
            .responses
            .iter()
            .find(|r| r.workdir == spec.workdir && command.starts_with(&r.prefix));

        match response {
            Some(Response {
                output: Some(output),
                ..
            }) => output.clone(),
            Some(Response { output: None, .. }) => {
                panic!("scripted panic running `{}`", command)
            }
            None => CommandOutput::ok(),
        }
    }
}
