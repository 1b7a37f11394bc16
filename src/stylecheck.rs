//! Style-check runner.
//!
//! Resolves a Python style checker on `PATH` (first configured candidate
//! wins), runs it over the repository's sources and hands back its exit code
//! untouched.

use anyhow::{Context, Result};
use std::ffi::OsStr;
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use crate::command_runner::{CommandOptions, CommandRunner};
use crate::config::StyleCheckConfig;
use crate::error::EmuctlError;

/// Find an executable named `name` in a `PATH`-style list of directories.
///
/// Empty entries are skipped rather than treated as `cwd`.
pub fn resolve_in_path(name: &str, path_var: &OsStr, cwd: &Path) -> Option<PathBuf> {
    let dirs = std::env::split_paths(path_var).filter(|dir| !dir.as_os_str().is_empty());
    let search = std::env::join_paths(dirs).ok()?;
    if search.is_empty() {
        return None;
    }
    which::which_in(name, Some(search), cwd).ok()
}

/// Map a finished process to a shell-style exit code.
///
/// Signal deaths become `128 + signal`.
pub fn exit_code(status: ExitStatus) -> i32 {
    match (status.code(), status.signal()) {
        (Some(code), _) => code,
        (None, Some(signal)) => 128 + signal,
        (None, None) => 1,
    }
}

pub struct StyleCheck<'a> {
    config: &'a StyleCheckConfig,
}

impl<'a> StyleCheck<'a> {
    pub fn new(config: &'a StyleCheckConfig) -> Self {
        Self { config }
    }

    /// Resolve the first available candidate.
    pub fn resolve(&self, path_var: &OsStr, cwd: &Path) -> Result<PathBuf, EmuctlError> {
        self.config
            .candidates
            .iter()
            .find_map(|name| {
                let found = resolve_in_path(name, path_var, cwd);
                tracing::debug!(candidate = %name, found = ?found, "Looking up style checker");
                found
            })
            .ok_or_else(|| EmuctlError::LinterNotFound {
                candidates: self.config.candidates.clone(),
            })
    }

    /// Source files to check, relative to `dir`.
    ///
    /// Top-level matches come first, then recursive matches under each
    /// configured subdirectory in order. Dot-files and anything under a
    /// dot-directory are skipped, as a shell glob would.
    pub fn targets(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let extension = &self.config.extension;
        let mut targets = self.glob(dir, &format!("*.{extension}"))?;
        for sub in &self.config.recursive_dirs {
            let pattern = format!("{}/**/*.{extension}", sub.display());
            targets.extend(self.glob(dir, &pattern)?);
        }
        Ok(targets)
    }

    fn glob(&self, dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
        let escaped = glob::Pattern::escape(&dir.to_string_lossy());
        let full = format!("{}/{}", escaped.trim_end_matches('/'), pattern);
        let options = glob::MatchOptions {
            require_literal_leading_dot: true,
            ..Default::default()
        };
        let mut matches = Vec::new();
        for entry in glob::glob_with(&full, options).with_context(|| format!("Invalid pattern '{pattern}'"))? {
            let path = entry.context("Failed to read directory while collecting sources")?;
            if !path.is_file() {
                continue;
            }
            let relative = path.strip_prefix(dir).map(Path::to_path_buf).unwrap_or(path);
            matches.push(relative);
        }
        matches.sort();
        Ok(matches)
    }

    /// Arguments passed to the checker: options first, then the targets.
    pub fn arguments(&self, targets: &[PathBuf]) -> Vec<String> {
        let mut args = vec![
            format!("--max-line-length={}", self.config.max_line_length),
            format!("--ignore={}", self.config.ignore.join(",")),
        ];
        args.extend(targets.iter().map(|t| t.to_string_lossy().into_owned()));
        args
    }

    /// Resolve the checker and build the full invocation without running it.
    pub fn command(&self, path_var: &OsStr, dir: &Path) -> Result<(PathBuf, Vec<String>)> {
        let program = self.resolve(path_var, dir)?;
        let targets = self.targets(dir)?;
        tracing::debug!(program = %program.display(), targets = targets.len(), "Style check resolved");
        Ok((program, self.arguments(&targets)))
    }

    /// Run the checker in `dir` and return its exit code.
    pub fn run(&self, runner: &dyn CommandRunner, path_var: &OsStr, dir: &Path) -> Result<i32> {
        let (program, args) = self.command(path_var, dir)?;
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let status = runner.run_status(
            &program.to_string_lossy(),
            &args,
            &CommandOptions::with_cwd(dir),
        )?;
        let code = exit_code(status);
        tracing::info!(code, "Style checker finished");
        Ok(code)
    }
}
