//! emuctl - deployment and developer tooling for the TPM emulator stack.
//!
//! Two independent utilities share this crate:
//!
//! - **install**: stages the D-Bus policy and systemd units of the emulator
//!   stack (TPM emulator, resource manager, IMA emulator), enables them and
//!   starts the IMA emulator. Root and a running systemd are required.
//! - **stylecheck**: finds `pycodestyle-3` (or the legacy `pep8`) on `PATH`
//!   and runs it over the repository, exiting with the checker's status.
//!
//! All paths, unit names and tool names come from [`config::Config`], and
//! every external process goes through [`command_runner::CommandRunner`].

pub mod cli;
pub mod command_runner;
pub mod commands;
pub mod config;
pub mod dbus;
pub mod effects;
pub mod error;
pub mod installer;
pub mod output;
pub mod pipeline;
pub mod privilege;
pub mod service_manager;
pub mod stylecheck;

pub use cli::{Cli, Commands};
pub use error::EmuctlError;
