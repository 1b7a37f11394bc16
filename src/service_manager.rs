//! Service manager seam used by the installer and `emuctl status`.
//!
//! Two backends implement [`ServiceManager`]:
//! - [`SystemctlManager`]: shells out to `systemctl` and the configured bus
//!   reload command through a [`CommandRunner`]
//! - [`DbusManager`](crate::dbus::DbusManager): talks to systemd and the bus
//!   broker directly over the system bus

use anyhow::{Result, bail};
use std::sync::Arc;

use crate::command_runner::{CommandOptions, CommandRunner};
use crate::config::{Backend, InstallConfig};
use crate::output::command_line;

/// Operations the installer needs from the system service manager.
pub trait ServiceManager {
    /// Whether a usable service manager is present.
    fn probe(&self) -> Result<bool>;

    /// Reload unit files (`systemctl daemon-reload`).
    fn daemon_reload(&self) -> Result<()>;

    /// Ask the message bus broker to reload its configuration.
    fn reload_bus(&self) -> Result<()>;

    /// Enable a unit.
    fn enable(&self, unit: &str) -> Result<()>;

    /// Start a unit.
    fn start(&self, unit: &str) -> Result<()>;

    /// Query enablement and activity of a unit.
    fn status(&self, unit: &str) -> Result<UnitStatus>;
}

/// Status information for a systemd unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitStatus {
    /// Unit name (e.g., "tpm2-abrmd.service")
    pub name: String,
    /// Unit file state: enabled, disabled, static, masked
    pub unit_file_state: String,
    /// Active state: active, inactive, activating, deactivating, failed
    pub active_state: String,
}

impl UnitStatus {
    /// Check if the unit is currently running.
    pub fn is_active(&self) -> bool {
        self.active_state == "active"
    }

    /// Check if the unit is enabled to start at boot.
    pub fn is_enabled(&self) -> bool {
        matches!(self.unit_file_state.as_str(), "enabled" | "static")
    }
}

/// Build the configured backend.
pub fn for_backend(
    backend: Backend,
    config: &InstallConfig,
    runner: Arc<dyn CommandRunner>,
) -> Box<dyn ServiceManager> {
    match backend {
        Backend::Systemctl => Box::new(SystemctlManager::new(config, runner)),
        Backend::Dbus => Box::new(crate::dbus::DbusManager::connect()),
    }
}

/// `systemctl`-driven backend.
pub struct SystemctlManager {
    runner: Arc<dyn CommandRunner>,
    systemctl: String,
    bus_reload_command: Vec<String>,
}

impl SystemctlManager {
    pub fn new(config: &InstallConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            systemctl: config.systemctl.clone(),
            bus_reload_command: config.bus_reload_command.clone(),
        }
    }

    fn run(&self, program: &str, args: &[&str]) -> Result<()> {
        let status = self
            .runner
            .run_status(program, args, &CommandOptions::default())?;
        if !status.success() {
            bail!("`{}` exited with {}", command_line(program, args), status);
        }
        Ok(())
    }

    fn systemctl(&self, args: &[&str]) -> Result<()> {
        self.run(&self.systemctl, args)
    }

    fn query(&self, args: &[&str]) -> Result<String> {
        let output = self
            .runner
            .run_output(&self.systemctl, args, &CommandOptions::default())?;
        // is-enabled / is-active exit non-zero for "disabled"/"inactive" but still answer on stdout
        let answer = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if answer.is_empty() {
            Ok("unknown".to_string())
        } else {
            Ok(answer)
        }
    }
}

impl ServiceManager for SystemctlManager {
    fn probe(&self) -> Result<bool> {
        let output = match self.runner.run_output(
            &self.systemctl,
            &["--version"],
            &CommandOptions::default(),
        ) {
            Ok(output) => output,
            Err(e) => {
                tracing::debug!(error = %e, "systemctl probe could not run");
                return Ok(false);
            }
        };
        let present = output.status.success() && !output.stdout.trim_ascii().is_empty();
        tracing::debug!(present, status = %output.status, "systemctl probe");
        Ok(present)
    }

    fn daemon_reload(&self) -> Result<()> {
        self.systemctl(&["daemon-reload"])
    }

    fn reload_bus(&self) -> Result<()> {
        let Some((program, args)) = self.bus_reload_command.split_first() else {
            bail!("No bus reload command configured");
        };
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.run(program, &args)
    }

    fn enable(&self, unit: &str) -> Result<()> {
        self.systemctl(&["enable", unit])
    }

    fn start(&self, unit: &str) -> Result<()> {
        self.systemctl(&["start", unit])
    }

    fn status(&self, unit: &str) -> Result<UnitStatus> {
        Ok(UnitStatus {
            name: unit.to_string(),
            unit_file_state: self.query(&["is-enabled", unit])?,
            active_state: self.query(&["is-active", unit])?,
        })
    }
}
