//! Process execution seam
//!
//! Provides a trait for the two kinds of child process the runner starts:
//! - the opaque install pipeline (exit status only)
//! - the helper invocation (stdout/stderr captured)
//!
//! with a real implementation on `std::process` and a recording mock for tests.

use std::io;
use std::process::{Command, ExitStatus, Stdio};
use std::sync::Mutex;

use serde::Serialize;

use crate::plan::ExecutionPlan;

/// Captured outcome of one helper invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvocationResult {
    #[serde(rename = "rc")]
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl InvocationResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Starts child processes on behalf of the runner (testable)
pub trait ProcessRunner {
    /// Run `script` with `sh -c` and report its exit code.
    ///
    /// Output is not captured.
    fn run_shell(&self, script: &str) -> io::Result<i32>;

    /// Run the plan to completion and capture both streams.
    ///
    /// A non-zero exit is returned as data, never as `Err`.
    fn run_captured(&self, plan: &ExecutionPlan) -> io::Result<InvocationResult>;
}

/// Real runner using `std::process`, blocking with no timeout
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn run_shell(&self, script: &str) -> io::Result<i32> {
        // stdout belongs to the module's JSON response, so the pipeline's
        // output is sent to stderr instead
        let status = Command::new("sh")
            .arg("-c")
            .arg(script)
            .stdin(Stdio::null())
            .stdout(Stdio::from(io::stderr()))
            .stderr(Stdio::inherit())
            .status()?;

        Ok(exit_code(status))
    }

    fn run_captured(&self, plan: &ExecutionPlan) -> io::Result<InvocationResult> {
        let output = Command::new(plan.program())
            .args(plan.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()?;

        Ok(InvocationResult {
            exit_code: exit_code(output.status),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Exit code of a finished child; signals are reported as the negated signal number
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }

    -1
}

/// A call seen by [`MockProcessRunner`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    Shell(String),
    Captured(Vec<String>),
}

type ShellHook = Box<dyn Fn(&str) + Send + Sync>;

/// Mock runner for testing: records calls and replays scripted results
pub struct MockProcessRunner {
    calls: Mutex<Vec<RecordedCall>>,
    shell_codes: Mutex<Vec<i32>>,
    results: Mutex<Vec<InvocationResult>>,
    on_shell: Option<ShellHook>,
}

impl Default for MockProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProcessRunner {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            shell_codes: Mutex::new(Vec::new()),
            results: Mutex::new(Vec::new()),
            on_shell: None,
        }
    }

    /// Run `hook` whenever a shell pipeline is "executed", e.g. to create the marker
    pub fn with_shell_hook(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_shell = Some(Box::new(hook));
        self
    }

    /// Exit code for the next shell pipeline (defaults to 0)
    pub fn add_shell_code(&self, code: i32) {
        self.shell_codes.lock().unwrap().push(code);
    }

    /// Result for the next captured invocation (defaults to a silent success)
    pub fn add_result(&self, result: InvocationResult) {
        self.results.lock().unwrap().push(result);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn shell_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, RecordedCall::Shell(_)))
            .count()
    }

    pub fn captured_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, RecordedCall::Captured(_)))
            .count()
    }
}

impl ProcessRunner for MockProcessRunner {
    fn run_shell(&self, script: &str) -> io::Result<i32> {
        self.calls
            .lock()
            .unwrap()
            .push(RecordedCall::Shell(script.to_string()));

        let mut codes = self.shell_codes.lock().unwrap();
        let code = if codes.is_empty() { 0 } else { codes.remove(0) };
        if code == 0 {
            if let Some(hook) = &self.on_shell {
                hook(script);
            }
        }
        Ok(code)
    }

    fn run_captured(&self, plan: &ExecutionPlan) -> io::Result<InvocationResult> {
        self.calls
            .lock()
            .unwrap()
            .push(RecordedCall::Captured(plan.tokens()));

        let mut results = self.results.lock().unwrap();
        if results.is_empty() {
            Ok(InvocationResult {
                exit_code: 0,
                stdout: String::new(),
                stderr: String::new(),
            })
        } else {
            Ok(results.remove(0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunnerConfig;
    use crate::plan::build_execution_plan;
    use crate::request::InvocationRequest;

    #[test]
    fn mock_returns_scripted_result() {
        let mock = MockProcessRunner::new();
        mock.add_result(InvocationResult {
            exit_code: 2,
            stdout: "partial".into(),
            stderr: "boom".into(),
        });

        let config = RunnerConfig::with_install_dir("/opt/krun");
        let request = InvocationRequest::new("install-docker.sh", Vec::<String>::new()).unwrap();
        let plan = build_execution_plan(&config, &request);

        let result = mock.run_captured(&plan).unwrap();
        assert_eq!(result.exit_code, 2);
        assert_eq!(result.stdout, "partial");
        assert_eq!(result.stderr, "boom");
        assert_eq!(
            mock.calls(),
            vec![RecordedCall::Captured(plan.tokens())]
        );
    }

    #[test]
    fn mock_defaults_to_success() {
        let mock = MockProcessRunner::new();
        assert_eq!(mock.run_shell("true").unwrap(), 0);
        assert_eq!(mock.shell_calls(), 1);
        assert_eq!(mock.captured_calls(), 0);
    }

    #[test]
    fn result_serializes_exit_code_as_rc() {
        let result = InvocationResult {
            exit_code: 0,
            stdout: "done".into(),
            stderr: String::new(),
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["rc"], 0);
        assert_eq!(value["stdout"], "done");
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_reports_shell_exit_code() {
        let runner = SystemProcessRunner;
        assert_eq!(runner.run_shell("exit 0").unwrap(), 0);
        assert_eq!(runner.run_shell("exit 7").unwrap(), 7);
    }

    #[cfg(unix)]
    #[test]
    fn signalled_child_reports_negative_signal() {
        let runner = SystemProcessRunner;
        assert_eq!(runner.run_shell("kill -TERM $$").unwrap(), -15);
    }
}
