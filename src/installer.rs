//! Service installer for the emulator stack.
//!
//! Stages the D-Bus policy file and the unit files, registers the units with
//! the service manager and starts the configured subset. Preconditions (root,
//! a reachable service manager) are checked before anything is touched.

use anyhow::Result;

use crate::config::InstallConfig;
use crate::effects::{Effect, Executor, FailurePolicy, Report};
use crate::error::EmuctlError;
use crate::output::Output;
use crate::privilege::Privilege;
use crate::service_manager::ServiceManager;

pub struct Installer<'a> {
    config: &'a InstallConfig,
    manager: &'a dyn ServiceManager,
}

impl<'a> Installer<'a> {
    pub fn new(config: &'a InstallConfig, manager: &'a dyn ServiceManager) -> Self {
        Self { config, manager }
    }

    /// The ordered effect list for a full installation.
    pub fn plan(&self) -> Vec<Effect> {
        let config = self.config;
        let mut effects = vec![
            Effect::CopyFile {
                source: config.policy_source(),
                destination: config.policy_destination(),
                mode: None,
            },
            Effect::DaemonReload,
            Effect::ReloadBus,
        ];

        for unit in &config.units {
            effects.push(Effect::CopyFile {
                source: config.unit_source(unit),
                destination: config.unit_destination(unit),
                mode: Some(config.unit_mode),
            });
            effects.push(Effect::Enable { unit: unit.clone() });
        }

        effects.push(Effect::DaemonReload);
        effects.extend(
            config
                .start_units
                .iter()
                .map(|unit| Effect::Start { unit: unit.clone() }),
        );
        effects
    }

    /// Check preconditions in order: root first, then the service manager.
    pub fn check_preconditions(&self, privilege: Privilege) -> Result<(), EmuctlError> {
        if !privilege.is_root() {
            tracing::debug!(euid = privilege.euid(), "Refusing to install without root");
            return Err(EmuctlError::NotRoot);
        }
        match self.manager.probe() {
            Ok(true) => Ok(()),
            Ok(false) => Err(EmuctlError::NoServiceManager),
            Err(e) => {
                tracing::debug!(error = %e, "Service manager probe failed");
                Err(EmuctlError::NoServiceManager)
            }
        }
    }

    /// Run the installation.
    ///
    /// In dry-run mode precondition failures are reported as warnings and the
    /// plan is printed without side effects.
    pub fn run(&self, privilege: Privilege, dry_run: bool) -> Result<Report> {
        if let Err(e) = self.check_preconditions(privilege) {
            if !dry_run {
                return Err(e.into());
            }
            Output::warning(format!("{} (ignored for dry run)", e));
        }

        let policy = FailurePolicy::from_fail_fast(self.config.fail_fast);
        tracing::debug!(?policy, dry_run, root = %self.config.root.display(), "Installing");

        let executor = Executor::new(self.manager, dry_run, policy);
        executor.apply(&self.plan())
    }
}
