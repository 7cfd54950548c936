//! krun-module - Ansible binary module that installs and runs krun scripts
//!
//! Invoked by Ansible as `krun-module <ARGS_FILE>`: reads the module
//! parameters, ensures `~/.krun/bin/krun` exists, runs the named script and
//! prints one JSON result object. Operators can also drive the same workflow
//! directly with the `run`, `plan` and `config` subcommands.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "krun-module",
    author,
    version,
    about = "Install krun on demand and run its scripts, reporting results as Ansible JSON",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    /// Path to the JSON module arguments file written by Ansible
    #[arg(value_name = "ARGS_FILE")]
    args_file: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a krun script now (installs krun first if missing)
    Run(commands::run::RunArgs),
    /// Print the command a script would run, without side effects
    Plan(commands::plan::PlanArgs),
    /// Show resolved krun-module configuration
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let tracing_config = tracing_setup::TracingConfig { debug: cli.debug };
    tracing_setup::init(&tracing_config)?;

    let code = match cli.command {
        Some(Commands::Run(args)) => commands::run::run(args)?,
        Some(Commands::Plan(args)) => commands::plan::run(args)?,
        Some(Commands::Config(args)) => commands::config::run(args)?,
        None => match cli.args_file {
            Some(path) => commands::module::run(&path)?,
            None => {
                anyhow::bail!("missing ARGS_FILE\n\nUsage: krun-module <ARGS_FILE> | krun-module --help")
            }
        },
    };

    std::process::exit(code)
}
