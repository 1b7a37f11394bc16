use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use emuctl::commands;
use emuctl::pipeline::ExecutionPlan;
use emuctl::{Cli, Commands, EmuctlError};

fn dispatch(cli: Cli) -> Result<i32> {
    let plan = ExecutionPlan::from_cli(&cli)?;
    tracing::debug!(dry_run = plan.dry_run, "Execution plan created");

    match cli.command {
        Commands::Install(args) => commands::install::run(args, &plan),
        Commands::Status(args) => commands::status::run(args, &plan),
        Commands::Stylecheck => commands::stylecheck::run(&plan),
        Commands::Config(args) => commands::config::run(args, &plan),
        Commands::Completions(args) => commands::completions::run(args),
    }
}

fn main() {
    // Initialize tracing with RUST_LOG env filter
    // e.g., RUST_LOG=emuctl=debug
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match dispatch(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            match err.downcast_ref::<EmuctlError>() {
                // Precondition failures keep their exact wording
                Some(e) if e.is_precondition() => eprintln!("{}", e),
                _ => eprintln!("error: {:#}", err),
            }
            std::process::exit(1);
        }
    }
}
