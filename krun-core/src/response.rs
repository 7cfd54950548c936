//! JSON response returned to the orchestrator
//!
//! Mirrors Ansible's `exit_json` / `fail_json`: one object on stdout, with
//! `failed: true` only when the task failed.

use serde::Serialize;

use crate::error::KrunError;
use crate::process::InvocationResult;
use crate::runner::Outcome;

/// Prefix of the check-mode message
pub const CHECK_MODE_PREFIX: &str = "[CHECK_MODE] Would run: ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleResponse {
    pub changed: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub failed: bool,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub would_run: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rc: Option<i32>,
}

/// Composite summary used for both success and failure
pub fn result_message(result: &InvocationResult) -> String {
    format!(
        "krun return code: {}\nstdout:\n{}\nstderr:\n{}",
        result.exit_code, result.stdout, result.stderr
    )
}

impl ModuleResponse {
    fn with_result(changed: bool, failed: bool, result: InvocationResult) -> Self {
        Self {
            changed,
            failed,
            msg: result_message(&result),
            would_run: None,
            stdout: Some(result.stdout),
            stderr: Some(result.stderr),
            rc: Some(result.exit_code),
        }
    }

    /// Failure with only a message, e.g. a rejected request or failed install
    pub fn from_error(err: &KrunError) -> Self {
        Self::failure(err.to_string())
    }

    pub fn failure(msg: impl Into<String>) -> Self {
        Self {
            changed: false,
            failed: true,
            msg: msg.into(),
            would_run: None,
            stdout: None,
            stderr: None,
            rc: None,
        }
    }

    /// Process exit status for the module binary: 1 when failed
    pub fn exit_code(&self) -> i32 {
        if self.failed {
            1
        } else {
            0
        }
    }
}

impl From<Outcome> for ModuleResponse {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Reported { plan } => {
                let would_run = plan.to_string();
                Self {
                    changed: false,
                    failed: false,
                    msg: format!("{}{}", CHECK_MODE_PREFIX, would_run),
                    would_run: Some(would_run),
                    stdout: None,
                    stderr: None,
                    rc: None,
                }
            }
            Outcome::Succeeded(result) => Self::with_result(true, false, result),
            Outcome::Failed(result) => Self::with_result(false, true, result),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunnerConfig;
    use crate::plan::build_execution_plan;
    use crate::request::InvocationRequest;
    use serde_json::json;

    #[test]
    fn check_mode_response_shape() {
        let config = RunnerConfig::with_install_dir("/home/ops/.krun/bin");
        let request = InvocationRequest::new("install-docker.sh", ["--force"]).unwrap();
        let plan = build_execution_plan(&config, &request);

        let response = ModuleResponse::from(Outcome::Reported { plan });
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "changed": false,
                "would_run": "/home/ops/.krun/bin/krun install-docker.sh --force",
                "msg": "[CHECK_MODE] Would run: /home/ops/.krun/bin/krun install-docker.sh --force",
            })
        );
        assert_eq!(response.exit_code(), 0);
    }

    #[test]
    fn success_response_carries_streams() {
        let response = ModuleResponse::from(Outcome::Succeeded(InvocationResult {
            exit_code: 0,
            stdout: "done".into(),
            stderr: String::new(),
        }));

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "changed": true,
                "msg": "krun return code: 0\nstdout:\ndone\nstderr:\n",
                "stdout": "done",
                "stderr": "",
                "rc": 0,
            })
        );
    }

    #[test]
    fn failure_response_is_marked_failed() {
        let response = ModuleResponse::from(Outcome::Failed(InvocationResult {
            exit_code: 2,
            stdout: "partial".into(),
            stderr: "boom".into(),
        }));

        assert!(response.failed);
        assert!(!response.changed);
        assert_eq!(response.exit_code(), 1);
        assert_eq!(response.msg, "krun return code: 2\nstdout:\npartial\nstderr:\nboom");
        assert_eq!(response.rc, Some(2));
    }

    #[test]
    fn install_failure_has_only_a_message() {
        let response = ModuleResponse::from_error(&KrunError::InstallationFailed);
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "changed": false,
                "failed": true,
                "msg": "Failed to install krun",
            })
        );
    }
}
