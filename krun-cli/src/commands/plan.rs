use anyhow::{Context, Result};
use clap::Parser;
use krun_core::{InvocationRequest, Runner, RunnerConfig};

#[derive(Parser, Debug)]
pub struct PlanArgs {
    /// Name of the krun script
    name: String,

    /// Arguments that would be passed to the script
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    script_args: Vec<String>,

    /// Print one token per line instead of a single command line
    #[arg(long)]
    tokens: bool,
}

pub fn run(args: PlanArgs) -> Result<i32> {
    let request = InvocationRequest::new(args.name, args.script_args)?;
    let config = RunnerConfig::load().context("Failed to load krun-module configuration")?;
    let plan = Runner::new(config).build_execution_plan(&request);

    if args.tokens {
        for token in plan.tokens() {
            println!("{}", token);
        }
    } else {
        println!("{}", plan);
    }

    Ok(0)
}
