//! Abstraction over external command execution for testability.
//!
//! Every external program emuctl touches (`systemctl`, `dbus-send`, the
//! style checker) is invoked through the [`CommandRunner`] trait so the
//! installer and the style-check runner can be exercised in-process.
//!
//! # Production Usage
//!
//! [`RealCommandRunner`] delegates to [`std::process::Command`].
//!
//! # Testing Usage
//!
//! [`MockCommandRunner`] records all calls and returns canned responses, enabling
//! fast, deterministic unit tests without external dependencies.

use anyhow::{Context, Result, anyhow};
use std::collections::HashMap;
use std::os::unix::process::ExitStatusExt;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Output};
use std::sync::Mutex;

/// Trait for abstracting external command execution.
///
/// - [`run_output`](CommandRunner::run_output): captures stdout + stderr + exit status
/// - [`run_status`](CommandRunner::run_status): inherits stdio, returns only exit status
pub trait CommandRunner: Send + Sync {
    /// Run a command and capture its full output (stdout + stderr + exit status).
    fn run_output(&self, program: &str, args: &[&str], options: &CommandOptions) -> Result<Output>;

    /// Run a command and return only its exit status (inherits stdio).
    fn run_status(
        &self,
        program: &str,
        args: &[&str],
        options: &CommandOptions,
    ) -> Result<ExitStatus>;
}

/// Options for command execution.
#[derive(Debug, Default, Clone)]
pub struct CommandOptions {
    /// Working directory for the command.
    pub cwd: Option<PathBuf>,
}

impl CommandOptions {
    /// Create options with a working directory.
    pub fn with_cwd(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: Some(cwd.into()),
        }
    }
}

/// Production implementation that delegates to [`std::process::Command`].
pub struct RealCommandRunner;

impl RealCommandRunner {
    fn command(program: &str, args: &[&str], options: &CommandOptions) -> Command {
        let mut cmd = Command::new(program);
        cmd.args(args);
        if let Some(cwd) = &options.cwd {
            cmd.current_dir(cwd);
        }
        cmd
    }
}

impl CommandRunner for RealCommandRunner {
    fn run_output(&self, program: &str, args: &[&str], options: &CommandOptions) -> Result<Output> {
        tracing::debug!(program, ?args, "Running command (captured)");
        Self::command(program, args, options)
            .output()
            .with_context(|| format!("Failed to run '{program}'"))
    }

    fn run_status(
        &self,
        program: &str,
        args: &[&str],
        options: &CommandOptions,
    ) -> Result<ExitStatus> {
        tracing::debug!(program, ?args, "Running command");
        Self::command(program, args, options)
            .status()
            .with_context(|| format!("Failed to run '{program}'"))
    }
}

/// A recorded invocation: program plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub program: String,
    pub args: Vec<String>,
}

impl RecordedCall {
    /// Render as a single command line, e.g. `systemctl enable foo.service`.
    pub fn command_line(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Canned response for [`MockCommandRunner`].
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// The program ran and exited with `code`, printing `stdout`.
    Exit { code: i32, stdout: String },
    /// The program could not be spawned at all.
    SpawnError(String),
}

impl MockResponse {
    pub fn success(stdout: impl Into<String>) -> Self {
        MockResponse::Exit {
            code: 0,
            stdout: stdout.into(),
        }
    }

    pub fn exit(code: i32) -> Self {
        MockResponse::Exit {
            code,
            stdout: String::new(),
        }
    }
}

/// Test double that records calls and replays canned responses.
///
/// Responses are looked up by `"program arg0"` first, then by `"program"`.
/// Unmatched calls succeed with empty output.
#[derive(Default)]
pub struct MockCommandRunner {
    calls: Mutex<Vec<RecordedCall>>,
    responses: Mutex<HashMap<String, MockResponse>>,
}

impl MockCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a response for `key` (`"program"` or `"program arg0"`).
    pub fn respond(self, key: &str, response: MockResponse) -> Self {
        self.responses
            .lock()
            .expect("mock responses poisoned")
            .insert(key.to_string(), response);
        self
    }

    /// All calls recorded so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("mock calls poisoned").clone()
    }

    /// Recorded calls rendered as command lines.
    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(RecordedCall::command_line).collect()
    }

    fn record(&self, program: &str, args: &[&str]) -> MockResponse {
        self.calls
            .lock()
            .expect("mock calls poisoned")
            .push(RecordedCall {
                program: program.to_string(),
                args: args.iter().map(|a| a.to_string()).collect(),
            });

        let responses = self.responses.lock().expect("mock responses poisoned");
        let keyed = args
            .first()
            .and_then(|first| responses.get(&format!("{program} {first}")));
        keyed
            .or_else(|| responses.get(program))
            .cloned()
            .unwrap_or_else(|| MockResponse::success(""))
    }
}

impl CommandRunner for MockCommandRunner {
    fn run_output(&self, program: &str, args: &[&str], _options: &CommandOptions) -> Result<Output> {
        match self.record(program, args) {
            MockResponse::Exit { code, stdout } => Ok(Output {
                status: ExitStatus::from_raw(code << 8),
                stdout: stdout.into_bytes(),
                stderr: Vec::new(),
            }),
            MockResponse::SpawnError(msg) => Err(anyhow!("Failed to run '{program}': {msg}")),
        }
    }

    fn run_status(
        &self,
        program: &str,
        args: &[&str],
        _options: &CommandOptions,
    ) -> Result<ExitStatus> {
        match self.record(program, args) {
            MockResponse::Exit { code, .. } => Ok(ExitStatus::from_raw(code << 8)),
            MockResponse::SpawnError(msg) => Err(anyhow!("Failed to run '{program}': {msg}")),
        }
    }
}
