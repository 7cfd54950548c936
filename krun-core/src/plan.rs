use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::RunnerConfig;
use crate::request::InvocationRequest;

/// The exact command a request resolves to: helper, script name, then arguments.
///
/// Check-mode reports and real execution both read from the same plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    program: PathBuf,
    args: Vec<String>,
}

impl ExecutionPlan {
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Everything after the program: script name first
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// All tokens in order, program included
    pub fn tokens(&self) -> Vec<String> {
        std::iter::once(self.program.to_string_lossy().into_owned())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

/// Space-joined tokens, as shown in check mode
impl fmt::Display for ExecutionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tokens().join(" "))
    }
}

/// Resolve a request against the configured helper location. No I/O.
pub fn build_execution_plan(config: &RunnerConfig, request: &InvocationRequest) -> ExecutionPlan {
    let mut args = Vec::with_capacity(request.arguments().len() + 1);
    args.push(request.script_name().to_string());
    args.extend(request.arguments().iter().cloned());

    ExecutionPlan {
        program: config.helper_path(),
        args,
    }
}
