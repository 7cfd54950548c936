use anyhow::{Context, Result};
use clap::Parser;
use krun_core::{InvocationRequest, ModuleResponse, Runner, RunnerConfig};

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Name of the krun script to run (e.g. install-docker.sh)
    name: String,

    /// Only report the command that would run
    #[arg(long)]
    check: bool,

    /// Arguments to pass to the script
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    script_args: Vec<String>,
}

pub fn run(args: RunArgs) -> Result<i32> {
    let request = match InvocationRequest::new(args.name, args.script_args) {
        Ok(request) => request,
        Err(err) => return super::emit(&ModuleResponse::from_error(&err)),
    };

    let config = RunnerConfig::load().context("Failed to load krun-module configuration")?;
    let runner = Runner::new(config);

    let response = match runner.run(&request, args.check) {
        Ok(outcome) => ModuleResponse::from(outcome),
        Err(err) => ModuleResponse::from_error(&err),
    };
    super::emit(&response)
}
