//! `emuctl config` - inspect the effective configuration.

use anyhow::Result;
use clap::{Args, Subcommand};
use schemars::schema_for;

use crate::config::Config;
use crate::pipeline::ExecutionPlan;

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration as JSON
    Show,
    /// Print the JSON schema for configuration files
    Schema,
}

pub fn run(args: ConfigArgs, plan: &ExecutionPlan) -> Result<i32> {
    let rendered = match args.action {
        ConfigAction::Show => serde_json::to_string_pretty(&plan.config)?,
        ConfigAction::Schema => serde_json::to_string_pretty(&schema_for!(Config))?,
    };
    println!("{}", rendered);
    Ok(0)
}
