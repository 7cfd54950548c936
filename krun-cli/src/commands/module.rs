//! Ansible binary-module entry point
//!
//! Ansible copies the binary to the target and runs it with the path of a
//! JSON file holding the task parameters. Every outcome, including an
//! unreadable args file, is reported as a JSON object on stdout.

use std::fs;
use std::path::Path;

use anyhow::Result;
use krun_core::{ModuleResponse, Runner, RunnerConfig};
use tracing::debug;

pub fn run(args_file: &Path) -> Result<i32> {
    let response = respond(args_file);
    super::emit(&response)
}

fn respond(args_file: &Path) -> ModuleResponse {
    debug!(path = %args_file.display(), "reading module arguments");
    let raw = match fs::read_to_string(args_file) {
        Ok(raw) => raw,
        Err(e) => {
            return ModuleResponse::failure(format!(
                "Failed to read module arguments from {}: {}",
                args_file.display(),
                e
            ))
        }
    };

    let config = match RunnerConfig::load() {
        Ok(config) => config,
        Err(err) => return ModuleResponse::from_error(&err),
    };

    krun_core::run_module(&Runner::new(config), &raw)
}
