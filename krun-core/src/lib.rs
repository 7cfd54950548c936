//! krun runner library
//!
//! Ensures the `krun` helper is installed on the local host, then invokes it
//! with a named script and arguments, reporting exit code and captured output.
//! The `krun-module` binary wraps this as an Ansible binary module.

pub mod config;
pub mod error;
pub mod install;
pub mod plan;
pub mod process;
pub mod request;
pub mod response;
pub mod runner;

pub use config::RunnerConfig;
pub use error::{KrunError, Result};
pub use install::{ensure_installed, InstallStatus};
pub use plan::{build_execution_plan, ExecutionPlan};
pub use process::{InvocationResult, MockProcessRunner, ProcessRunner, SystemProcessRunner};
pub use request::{InvocationRequest, ModuleParams};
pub use response::ModuleResponse;
pub use runner::{Outcome, Runner};

/// Validate parameters and run the workflow, folding every outcome into a response.
///
/// Validation errors return before the marker is checked or anything is spawned.
pub fn run_module<P: ProcessRunner>(runner: &Runner<P>, raw_params: &str) -> ModuleResponse {
    let params = match ModuleParams::from_json_str(raw_params) {
        Ok(params) => params,
        Err(err) => return ModuleResponse::from_error(&err),
    };

    match runner.run(&params.request, params.check_mode) {
        Ok(outcome) => ModuleResponse::from(outcome),
        Err(err) => ModuleResponse::from_error(&err),
    }
}
