use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use krun_core::RunnerConfig;

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the resolved configuration as TOML
    Show,
    /// Show config file path
    Path,
}

pub fn run(args: ConfigArgs) -> Result<i32> {
    match args.command {
        ConfigCommands::Show => run_show()?,
        ConfigCommands::Path => run_path()?,
    }
    Ok(0)
}

fn run_show() -> Result<()> {
    let config = RunnerConfig::load().context("Failed to load krun-module configuration")?;
    let rendered = toml::to_string_pretty(&config).context("Failed to render config as TOML")?;

    print!("{}", rendered);
    println!("# helper: {}", config.helper_path().display());
    Ok(())
}

fn run_path() -> Result<()> {
    let path = RunnerConfig::config_path().context("Could not determine home directory")?;
    let state = if path.exists() { "" } else { " (not present, using defaults)" };
    println!("{}{}", path.display(), state);
    Ok(())
}
