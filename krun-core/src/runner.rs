//! The install-then-execute workflow
//!
//! ```text
//! Start ─┬─ check mode ──────────────▶ Reported
//!        └─ ensure_installed ─┬─ ok ─▶ execute ─┬─ rc == 0 ─▶ Succeeded
//!                             │                 └─ rc != 0 ─▶ Failed
//!                             └─ err ─▶ InstallationFailed
//! ```
//!
//! Every path runs once, synchronously, with no retry.

use tracing::debug;

use crate::config::RunnerConfig;
use crate::error::{KrunError, Result};
use crate::install::{self, InstallStatus};
use crate::plan::{build_execution_plan, ExecutionPlan};
use crate::process::{InvocationResult, ProcessRunner, SystemProcessRunner};
use crate::request::InvocationRequest;

/// Terminal state of one workflow run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Check mode: nothing installed, nothing spawned
    Reported { plan: ExecutionPlan },
    /// Helper exited 0
    Succeeded(InvocationResult),
    /// Helper ran but exited non-zero
    Failed(InvocationResult),
}

impl Outcome {
    /// Whether the run changed the host. Only a successful execution does.
    pub fn changed(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }
}

/// Ensures the helper is present, then drives it
pub struct Runner<P = SystemProcessRunner> {
    config: RunnerConfig,
    processes: P,
}

impl Runner<SystemProcessRunner> {
    /// Runner that starts real child processes
    pub fn new(config: RunnerConfig) -> Self {
        Self::with_process_runner(config, SystemProcessRunner)
    }
}

impl<P: ProcessRunner> Runner<P> {
    pub fn with_process_runner(config: RunnerConfig, processes: P) -> Self {
        Self { config, processes }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn process_runner(&self) -> &P {
        &self.processes
    }

    pub fn build_execution_plan(&self, request: &InvocationRequest) -> ExecutionPlan {
        build_execution_plan(&self.config, request)
    }

    pub fn ensure_installed(&self) -> Result<InstallStatus> {
        install::ensure_installed(&self.config, &self.processes)
    }

    /// Run the helper for `request` and capture its result.
    ///
    /// Assumes the helper is installed. A non-zero exit is returned as `Ok`;
    /// only a failure to start the process is an error.
    pub fn execute(&self, request: &InvocationRequest) -> Result<InvocationResult> {
        let plan = self.build_execution_plan(request);
        self.execute_plan(&plan)
    }

    fn execute_plan(&self, plan: &ExecutionPlan) -> Result<InvocationResult> {
        debug!(command = %plan, "running krun");
        let result = self
            .processes
            .run_captured(plan)
            .map_err(|e| KrunError::spawn(plan.program(), e))?;
        debug!(rc = result.exit_code, "krun finished");
        Ok(result)
    }

    /// Full workflow: report in check mode, otherwise install if needed and execute.
    pub fn run(&self, request: &InvocationRequest, check_mode: bool) -> Result<Outcome> {
        let plan = self.build_execution_plan(request);

        if check_mode {
            debug!(command = %plan, "check mode, not running krun");
            return Ok(Outcome::Reported { plan });
        }

        self.ensure_installed()?;

        let result = self.execute_plan(&plan)?;
        if result.success() {
            Ok(Outcome::Succeeded(result))
        } else {
            Ok(Outcome::Failed(result))
        }
    }
}
