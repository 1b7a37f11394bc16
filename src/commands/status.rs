//! `emuctl status` - show the state of the configured units.

use anyhow::Result;
use clap::Args;
use is_terminal::IsTerminal;
use owo_colors::OwoColorize;

use crate::config::Backend;
use crate::output::Output;
use crate::pipeline::ExecutionPlan;
use crate::service_manager::{self, UnitStatus};

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Service manager backend
    #[arg(long, value_enum)]
    pub backend: Option<Backend>,
}

pub fn run(args: StatusArgs, plan: &ExecutionPlan) -> Result<i32> {
    let config = &plan.config.install;
    let backend = args.backend.unwrap_or(config.backend);

    if plan.dry_run {
        for unit in &config.units {
            Output::dry_run(format!("Would show status of: {}", unit));
        }
        return Ok(0);
    }

    let manager = service_manager::for_backend(backend, config, plan.runner());
    let use_color = std::io::stdout().is_terminal();

    for unit in &config.units {
        let status = manager.status(unit)?;
        let starts = config.start_units.contains(unit);
        print_status(&status, starts, use_color);
    }

    Ok(0)
}

fn print_status(status: &UnitStatus, starts: bool, use_color: bool) {
    let active = if use_color {
        match status.active_state.as_str() {
            "active" => status.active_state.green().to_string(),
            "inactive" => status.active_state.dimmed().to_string(),
            "failed" => status.active_state.red().to_string(),
            _ => status.active_state.yellow().to_string(),
        }
    } else {
        status.active_state.clone()
    };

    let enabled = if use_color {
        match status.unit_file_state.as_str() {
            "enabled" | "static" => status.unit_file_state.green().to_string(),
            "disabled" => status.unit_file_state.dimmed().to_string(),
            "masked" => status.unit_file_state.red().to_string(),
            _ => status.unit_file_state.yellow().to_string(),
        }
    } else {
        status.unit_file_state.clone()
    };

    if use_color {
        println!("● {}", status.name.bold());
    } else {
        println!("● {}", status.name);
    }
    Output::kv("Enabled", enabled);
    Output::kv("Active", active);
    if starts {
        Output::kv("Started by", "emuctl install");
    }
}
