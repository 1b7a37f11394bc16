//! `emuctl stylecheck` - run the Python style checker over the repository.

use anyhow::Result;
use std::path::Path;

use crate::output::{Output, command_line};
use crate::pipeline::ExecutionPlan;
use crate::stylecheck::StyleCheck;

/// Run in the current directory and return the checker's exit code.
pub fn run(plan: &ExecutionPlan) -> Result<i32> {
    let path_var = std::env::var_os("PATH").unwrap_or_default();
    let dir = Path::new(".");
    let check = StyleCheck::new(&plan.config.stylecheck);

    if plan.dry_run {
        let (program, args) = check.command(&path_var, dir)?;
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        Output::dry_run(format!(
            "Would run: {}",
            command_line(&program.to_string_lossy(), &args)
        ));
        return Ok(0);
    }

    let runner = plan.runner();
    check.run(runner.as_ref(), &path_var, dir)
}
