//! CLI argument definitions for emuctl.
//!
//! Separated from `main.rs` so that library code (`pipeline::ExecutionPlan::from_cli`)
//! and shell completion generation can reference these types.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands;

#[derive(Debug, Parser)]
#[command(name = "emuctl")]
#[command(about = "Install the TPM emulator service stack and run repository style checks")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file
    ///
    /// Defaults to $EMUCTL_CONFIG, then /etc/emuctl/config.json if present.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Show what would be done without making changes
    #[arg(long, short = 'n', global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Install the D-Bus policy and emulator units, then start the IMA emulator
    ///
    /// Must run as root on a systemd host. Copies the policy file and unit
    /// files into place, enables every unit and starts the IMA emulator.
    Install(commands::install::InstallArgs),

    /// Show enablement and activity of the configured units
    Status(commands::status::StatusArgs),

    /// Run the Python style checker over the repository
    ///
    /// Looks for pycodestyle-3, then pep8, on PATH and exits with the
    /// checker's own status.
    #[command(alias = "pep8")]
    Stylecheck,

    /// Inspect the effective configuration
    Config(commands::config::ConfigArgs),

    /// Generate shell completions
    Completions(commands::completions::CompletionsArgs),
}
