//! Configuration for the installer and the style-check runner.
//!
//! Every path, unit name and permission bit the tools use lives here as data.
//! The defaults reproduce the stock layout of the emulator stack; a JSON file
//! can override any subset of fields.
//!
//! Lookup order:
//! 1. `--config PATH`
//! 2. `$EMUCTL_CONFIG`
//! 3. `/etc/emuctl/config.json` (only if present)
//! 4. built-in defaults

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::EmuctlError;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "EMUCTL_CONFIG";

/// System-wide config location, read only when it exists.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/emuctl/config.json";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Service installer settings
    pub install: InstallConfig,
    /// Style-check runner settings
    pub stylecheck: StyleCheckConfig,
}

/// How the installer talks to the service manager.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Shell out to `systemctl` and the bus reload command
    #[default]
    Systemctl,
    /// Talk to systemd and the bus broker directly over the system bus
    Dbus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct InstallConfig {
    /// Directory containing the policy file and unit files to install
    pub source_dir: PathBuf,
    /// Destination prefix; absolute destination paths are placed under it
    pub root: PathBuf,
    /// D-Bus policy file name
    pub policy_file: String,
    /// D-Bus system policy directory
    pub policy_dir: PathBuf,
    /// systemd system unit directory
    pub unit_dir: PathBuf,
    /// Units to copy and enable, in order
    pub units: Vec<String>,
    /// Units started immediately after installation
    pub start_units: Vec<String>,
    /// Permission bits applied to each installed unit file
    pub unit_mode: u32,
    /// Service manager backend
    pub backend: Backend,
    /// `systemctl` program name or path
    pub systemctl: String,
    /// Command asking the bus broker to reload its configuration
    pub bus_reload_command: Vec<String>,
    /// Abort on the first failing step instead of continuing
    pub fail_fast: bool,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("."),
            root: PathBuf::from("/"),
            policy_file: "tpm2-abrmd.conf".to_string(),
            policy_dir: PathBuf::from("/etc/dbus-1/system.d"),
            unit_dir: PathBuf::from("/etc/systemd/system"),
            units: vec![
                "tpm_emulator.service".to_string(),
                "tpm2-abrmd.service".to_string(),
                "keylime_ima_emulator.service".to_string(),
            ],
            start_units: vec!["keylime_ima_emulator.service".to_string()],
            unit_mode: 0o644,
            backend: Backend::Systemctl,
            systemctl: "systemctl".to_string(),
            bus_reload_command: [
                "dbus-send",
                "--system",
                "--type=method_call",
                "--dest=org.freedesktop.DBus",
                "/org/freedesktop/DBus",
                "org.freedesktop.DBus.ReloadConfig",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            fail_fast: false,
        }
    }
}

impl InstallConfig {
    /// Place an absolute destination path under `root`.
    pub fn rooted(&self, path: &Path) -> PathBuf {
        let relative = path.strip_prefix("/").unwrap_or(path);
        self.root.join(relative)
    }

    /// Source path of the D-Bus policy file.
    pub fn policy_source(&self) -> PathBuf {
        self.source_dir.join(&self.policy_file)
    }

    /// Installed path of the D-Bus policy file.
    pub fn policy_destination(&self) -> PathBuf {
        self.rooted(&self.policy_dir).join(&self.policy_file)
    }

    /// Source path of a unit file.
    pub fn unit_source(&self, unit: &str) -> PathBuf {
        self.source_dir.join(unit)
    }

    /// Installed path of a unit file.
    pub fn unit_destination(&self, unit: &str) -> PathBuf {
        self.rooted(&self.unit_dir).join(unit)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct StyleCheckConfig {
    /// Style checker executables to look for on PATH, in order of preference
    pub candidates: Vec<String>,
    /// Value passed as `--max-line-length`
    pub max_line_length: u32,
    /// Diagnostic codes passed as `--ignore`
    pub ignore: Vec<String>,
    /// Source file extension to check (without the dot)
    pub extension: String,
    /// Subdirectories searched recursively for sources
    pub recursive_dirs: Vec<PathBuf>,
}

impl Default for StyleCheckConfig {
    fn default() -> Self {
        Self {
            candidates: vec!["pycodestyle-3".to_string(), "pep8".to_string()],
            max_line_length: 2000,
            // E741: ambiguous variable name, W503: line break before binary operator
            ignore: vec!["E741".to_string(), "W503".to_string()],
            extension: "py".to_string(),
            recursive_dirs: vec![PathBuf::from("keylime"), PathBuf::from("test")],
        }
    }
}

impl Config {
    /// Load configuration following the documented lookup order.
    pub fn load(explicit: Option<&Path>) -> Result<Self, EmuctlError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
            return Self::from_file(Path::new(&path));
        }
        let system = Path::new(SYSTEM_CONFIG_PATH);
        if system.exists() {
            return Self::from_file(system);
        }
        tracing::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read and validate a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self, EmuctlError> {
        let content = std::fs::read_to_string(path).map_err(|e| EmuctlError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config: Config = serde_json::from_str(&content).map_err(|e| EmuctlError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Reject configurations that could never do anything useful.
    pub fn validate(&self) -> Result<(), EmuctlError> {
        let install = &self.install;
        if install.units.is_empty() {
            return Err(EmuctlError::InvalidConfig(
                "install.units must list at least one unit".into(),
            ));
        }
        if let Some(unit) = install
            .start_units
            .iter()
            .find(|u| !install.units.contains(u))
        {
            return Err(EmuctlError::InvalidConfig(format!(
                "install.start_units entry '{unit}' is not listed in install.units"
            )));
        }
        if install.unit_mode > 0o7777 {
            return Err(EmuctlError::InvalidConfig(format!(
                "install.unit_mode {:o} is not a permission mode",
                install.unit_mode
            )));
        }
        if install.bus_reload_command.is_empty() {
            return Err(EmuctlError::InvalidConfig(
                "install.bus_reload_command must not be empty".into(),
            ));
        }
        if self.stylecheck.candidates.is_empty() {
            return Err(EmuctlError::InvalidConfig(
                "stylecheck.candidates must name at least one executable".into(),
            ));
        }
        if self.stylecheck.extension.is_empty() {
            return Err(EmuctlError::InvalidConfig(
                "stylecheck.extension must not be empty".into(),
            ));
        }
        Ok(())
    }
}
