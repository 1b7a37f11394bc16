//! Execution plan shared by all commands.

use anyhow::Result;
use std::sync::Arc;

use crate::Cli;
use crate::command_runner::{CommandRunner, RealCommandRunner};
use crate::config::Config;

/// Execution plan for an emuctl command.
///
/// Captures the global options and the loaded configuration.
#[derive(Clone)]
pub struct ExecutionPlan {
    /// The effective configuration
    pub config: Config,
    /// Whether to perform a dry run
    pub dry_run: bool,
    /// Command runner for external processes
    runner: Arc<dyn CommandRunner>,
}

impl ExecutionPlan {
    /// Create an execution plan from CLI arguments, loading configuration.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let config = Config::load(cli.config.as_deref())?;
        Ok(Self::new(config, cli.dry_run, Arc::new(RealCommandRunner)))
    }

    pub fn new(config: Config, dry_run: bool, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            config,
            dry_run,
            runner,
        }
    }

    /// Get the command runner.
    pub fn runner(&self) -> Arc<dyn CommandRunner> {
        Arc::clone(&self.runner)
    }
}

impl std::fmt::Debug for ExecutionPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionPlan")
            .field("config", &self.config)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}
