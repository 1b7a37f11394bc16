//! `emuctl install` - stage and start the emulator service stack.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::config::{Backend, InstallConfig};
use crate::error::EmuctlError;
use crate::installer::Installer;
use crate::output::Output;
use crate::pipeline::ExecutionPlan;
use crate::privilege::Privilege;
use crate::service_manager;

#[derive(Debug, Args)]
pub struct InstallArgs {
    /// Install into this root instead of / (like DESTDIR)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Directory containing the policy file and unit files
    #[arg(long, value_name = "DIR")]
    pub source_dir: Option<PathBuf>,

    /// Stop at the first failing step instead of attempting every step
    #[arg(long)]
    pub fail_fast: bool,

    /// Service manager backend
    #[arg(long, value_enum)]
    pub backend: Option<Backend>,
}

impl InstallArgs {
    /// Apply command-line overrides on top of the configured values.
    pub fn apply(&self, config: &InstallConfig) -> InstallConfig {
        let mut config = config.clone();
        if let Some(root) = &self.root {
            config.root = root.clone();
        }
        if let Some(source_dir) = &self.source_dir {
            config.source_dir = source_dir.clone();
        }
        if self.fail_fast {
            config.fail_fast = true;
        }
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        config
    }
}

pub fn run(args: InstallArgs, plan: &ExecutionPlan) -> Result<i32> {
    let config = args.apply(&plan.config.install);
    let manager = service_manager::for_backend(config.backend, &config, plan.runner());
    let installer = Installer::new(&config, manager.as_ref());

    let report = installer.run(Privilege::current(), plan.dry_run)?;

    if plan.dry_run {
        return Ok(0);
    }
    if !report.is_success() {
        return Err(EmuctlError::InstallIncomplete {
            failures: report.failures,
        }
        .into());
    }

    Output::success(format!(
        "Installed {} unit(s), started {}",
        config.units.len(),
        config.start_units.join(", ")
    ));
    Ok(0)
}
