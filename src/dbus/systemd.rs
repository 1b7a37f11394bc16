//! Systemd D-Bus integration.
//!
//! ## D-Bus Interfaces
//!
//! - **Bus**: System bus
//! - `org.freedesktop.systemd1.Manager` at `/org/freedesktop/systemd1`
//! - `org.freedesktop.DBus` at `/org/freedesktop/DBus` (config reload)

use anyhow::{Context, Result, anyhow};
use tracing::warn;
use zbus::blocking::Connection;
use zbus::zvariant::OwnedObjectPath;

use crate::service_manager::{ServiceManager, UnitStatus};

/// Proxy for the systemd Manager interface.
#[zbus::proxy(
    interface = "org.freedesktop.systemd1.Manager",
    default_service = "org.freedesktop.systemd1",
    default_path = "/org/freedesktop/systemd1"
)]
trait Systemd1Manager {
    /// Start a unit.
    fn start_unit(&self, name: &str, mode: &str) -> zbus::Result<OwnedObjectPath>;

    /// Enable unit files.
    /// Returns (carries_install_info, Vec<(type, symlink_name, destination)>)
    fn enable_unit_files(
        &self,
        files: &[&str],
        runtime: bool,
        force: bool,
    ) -> zbus::Result<(bool, Vec<(String, String, String)>)>;

    /// Reload systemd daemon configuration.
    fn reload(&self) -> zbus::Result<()>;

    /// Load a unit (creates it if not loaded).
    fn load_unit(&self, name: &str) -> zbus::Result<OwnedObjectPath>;

    /// The systemd version string.
    #[zbus(property)]
    fn version(&self) -> zbus::Result<String>;
}

/// Proxy for individual systemd Unit properties.
#[zbus::proxy(
    interface = "org.freedesktop.systemd1.Unit",
    default_service = "org.freedesktop.systemd1"
)]
trait Systemd1Unit {
    /// The current active state (active, inactive, activating, deactivating, failed).
    #[zbus(property)]
    fn active_state(&self) -> zbus::Result<String>;

    /// Whether the unit is enabled (enabled, disabled, static, masked).
    #[zbus(property)]
    fn unit_file_state(&self) -> zbus::Result<String>;
}

/// Proxy for the bus broker itself.
#[zbus::proxy(
    interface = "org.freedesktop.DBus",
    default_service = "org.freedesktop.DBus",
    default_path = "/org/freedesktop/DBus"
)]
trait BusDaemon {
    /// Re-read policy files such as the one in `/etc/dbus-1/system.d`.
    fn reload_config(&self) -> zbus::Result<()>;
}

/// Service manager backed by the system bus.
///
/// Connecting is deferred to [`DbusManager::connect`], which never fails: a
/// missing bus surfaces as a negative [`probe`](ServiceManager::probe).
pub struct DbusManager {
    connection: Option<Connection>,
}

impl DbusManager {
    /// Connect to the system bus, remembering a failure instead of returning it.
    pub fn connect() -> Self {
        let connection = match Connection::system() {
            Ok(connection) => Some(connection),
            Err(e) => {
                warn!("Failed to connect to system D-Bus: {}", e);
                None
            }
        };
        Self { connection }
    }

    fn connection(&self) -> Result<&Connection> {
        self.connection
            .as_ref()
            .ok_or_else(|| anyhow!("Not connected to the system D-Bus"))
    }

    fn manager(&self) -> Result<Systemd1ManagerProxyBlocking<'_>> {
        Systemd1ManagerProxyBlocking::new(self.connection()?)
            .context("Failed to create systemd Manager proxy")
    }

    fn unit_proxy(&self, path: &OwnedObjectPath) -> Result<Systemd1UnitProxyBlocking<'_>> {
        Systemd1UnitProxyBlocking::builder(self.connection()?)
            .path(path.clone())
            .context("Invalid unit path")?
            .build()
            .context("Failed to create Unit proxy")
    }
}

impl ServiceManager for DbusManager {
    fn probe(&self) -> Result<bool> {
        if self.connection.is_none() {
            return Ok(false);
        }
        match self.manager()?.version() {
            Ok(version) => {
                tracing::debug!(%version, "systemd reachable over D-Bus");
                Ok(!version.is_empty())
            }
            Err(e) => {
                tracing::debug!(error = %e, "systemd not reachable over D-Bus");
                Ok(false)
            }
        }
    }

    fn daemon_reload(&self) -> Result<()> {
        self.manager()?
            .reload()
            .context("Failed to reload systemd daemon")
    }

    fn reload_bus(&self) -> Result<()> {
        BusDaemonProxyBlocking::new(self.connection()?)
            .context("Failed to create D-Bus proxy")?
            .reload_config()
            .context("Failed to reload D-Bus configuration")
    }

    fn enable(&self, unit: &str) -> Result<()> {
        self.manager()?
            .enable_unit_files(&[unit], false, true)
            .with_context(|| format!("Failed to enable unit: {}", unit))?;
        Ok(())
    }

    fn start(&self, unit: &str) -> Result<()> {
        self.manager()?
            .start_unit(unit, "replace")
            .with_context(|| format!("Failed to start unit: {}", unit))?;
        Ok(())
    }

    fn status(&self, unit: &str) -> Result<UnitStatus> {
        let path = self
            .manager()?
            .load_unit(unit)
            .with_context(|| format!("Failed to load unit: {}", unit))?;
        let proxy = self.unit_proxy(&path)?;

        Ok(UnitStatus {
            name: unit.to_string(),
            unit_file_state: proxy.unit_file_state().unwrap_or_else(|e| {
                warn!("Failed to read unit_file_state for '{}': {}", unit, e);
                "unknown".to_string()
            }),
            active_state: proxy.active_state().unwrap_or_else(|e| {
                warn!("Failed to read active_state for '{}': {}", unit, e);
                "unknown".to_string()
            }),
        })
    }
}
