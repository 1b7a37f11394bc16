//! CLI command implementations.

pub mod completions;
pub mod config;
pub mod install;
pub mod status;
pub mod stylecheck;
