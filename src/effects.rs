//! Effect system for dry-run support and failure policy.
//!
//! An installation is a flat list of [`Effect`]s. The [`Executor`] either
//! performs them in order or reports what would happen.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::EmuctlError;
use crate::output::Output;
use crate::service_manager::ServiceManager;

/// Represents a side effect the installer can perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    CopyFile {
        source: PathBuf,
        destination: PathBuf,
        mode: Option<u32>,
    },
    DaemonReload,
    ReloadBus,
    Enable {
        unit: String,
    },
    Start {
        unit: String,
    },
}

impl Effect {
    /// Human-readable description for dry-run output and failure reports.
    pub fn describe(&self) -> String {
        match self {
            Effect::CopyFile {
                source,
                destination,
                mode: Some(mode),
            } => format!(
                "Install {} to {} (mode {:o})",
                source.display(),
                destination.display(),
                mode
            ),
            Effect::CopyFile {
                source,
                destination,
                mode: None,
            } => format!("Install {} to {}", source.display(), destination.display()),
            Effect::DaemonReload => "Reload systemd unit files".to_string(),
            Effect::ReloadBus => "Reload D-Bus configuration".to_string(),
            Effect::Enable { unit } => format!("Enable {}", unit),
            Effect::Start { unit } => format!("Start {}", unit),
        }
    }
}

/// What to do when a step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Keep going; every step is attempted and failures are collected.
    #[default]
    BestEffort,
    /// Stop at the first failing step.
    FailFast,
}

impl FailurePolicy {
    pub fn from_fail_fast(fail_fast: bool) -> Self {
        if fail_fast {
            FailurePolicy::FailFast
        } else {
            FailurePolicy::BestEffort
        }
    }
}

/// Outcome of applying a list of effects.
#[derive(Debug, Default)]
pub struct Report {
    /// Effects that were performed (or, in dry-run mode, announced).
    pub applied: Vec<Effect>,
    /// Descriptions of failed steps with their reasons.
    pub failures: Vec<String>,
}

impl Report {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Performs effects against the filesystem and a service manager.
pub struct Executor<'a> {
    manager: &'a dyn ServiceManager,
    dry_run: bool,
    policy: FailurePolicy,
}

impl<'a> Executor<'a> {
    pub fn new(manager: &'a dyn ServiceManager, dry_run: bool, policy: FailurePolicy) -> Self {
        Self {
            manager,
            dry_run,
            policy,
        }
    }

    /// Apply effects in order according to the failure policy.
    pub fn apply(&self, effects: &[Effect]) -> Result<Report> {
        let mut report = Report::default();

        for effect in effects {
            if self.dry_run {
                Output::dry_run(format!("Would {}", lowercase_first(&effect.describe())));
                report.applied.push(effect.clone());
                continue;
            }

            Output::step(effect.describe());
            match self.perform(effect) {
                Ok(()) => {
                    info!(effect = %effect.describe(), "Applied");
                    report.applied.push(effect.clone());
                }
                Err(e) => match self.policy {
                    FailurePolicy::FailFast => {
                        return Err(EmuctlError::StepFailed {
                            step: effect.describe(),
                            reason: format!("{:#}", e),
                        }
                        .into());
                    }
                    FailurePolicy::BestEffort => {
                        warn!(effect = %effect.describe(), error = %e, "Step failed, continuing");
                        Output::warning(format!("{} failed: {:#}", effect.describe(), e));
                        report
                            .failures
                            .push(format!("{}: {:#}", effect.describe(), e));
                    }
                },
            }
        }

        Ok(report)
    }

    fn perform(&self, effect: &Effect) -> Result<()> {
        match effect {
            Effect::CopyFile {
                source,
                destination,
                mode,
            } => install_file(source, destination, *mode),
            Effect::DaemonReload => self.manager.daemon_reload(),
            Effect::ReloadBus => self.manager.reload_bus(),
            Effect::Enable { unit } => self.manager.enable(unit),
            Effect::Start { unit } => self.manager.start(unit),
        }
    }
}

/// Copy `source` over `destination`, creating the parent directory if needed.
///
/// With `mode`, the permission bits are set absolutely afterwards. Without it,
/// an existing destination keeps its own mode and only its contents change.
pub fn install_file(source: &Path, destination: &Path, mode: Option<u32>) -> Result<()> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    debug!(source = %source.display(), destination = %destination.display(), "Copying file");
    let copy_context = || {
        format!(
            "Failed to copy {} to {}",
            source.display(),
            destination.display()
        )
    };
    if mode.is_none() && destination.exists() {
        let mut reader = File::open(source).with_context(copy_context)?;
        let mut writer = File::create(destination).with_context(copy_context)?;
        io::copy(&mut reader, &mut writer).with_context(copy_context)?;
    } else {
        fs::copy(source, destination).with_context(copy_context)?;
    }
    if let Some(mode) = mode {
        fs::set_permissions(destination, fs::Permissions::from_mode(mode))
            .with_context(|| format!("Failed to set mode {:o} on {}", mode, destination.display()))?;
    }
    Ok(())
}

fn lowercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
