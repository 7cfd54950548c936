//! Smoke tests for the krun-module binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Command isolated from the user's real config and install dir
fn module_cmd(temp: &Path) -> Command {
    let mut cmd = Command::cargo_bin("krun-module").unwrap();
    cmd.env("KRUN_CONFIG", temp.join("config.toml"))
        .env("KRUN_INSTALL_DIR", temp.join("bin"))
        .env("KRUN_STAGING_PATH", temp.join("krun.download"))
        .env_remove("RUST_LOG");
    cmd
}

fn write_args(temp: &Path, body: &str) -> std::path::PathBuf {
    let path = temp.join("args.json");
    fs::write(&path, body).unwrap();
    path
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is a single JSON object")
}

// === Help ===

#[test]
fn test_help_mentions_args_file() {
    let mut cmd = Command::cargo_bin("krun-module").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("ARGS_FILE"));
}

#[test]
fn test_run_help() {
    let mut cmd = Command::cargo_bin("krun-module").unwrap();
    cmd.arg("run").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Name of the krun script"));
}

// === Module mode ===

#[test]
fn test_check_mode_reports_without_installing() {
    let temp = TempDir::new().unwrap();
    let args = write_args(
        temp.path(),
        r#"{"name": "install-docker.sh", "script_args": ["--force", "--debug"], "_ansible_check_mode": true}"#,
    );

    let output = module_cmd(temp.path()).arg(&args).output().unwrap();
    assert!(output.status.success());

    let json = stdout_json(&output);
    let helper = temp.path().join("bin").join("krun");
    let expected = format!("{} install-docker.sh --force --debug", helper.display());
    assert_eq!(json["changed"], false);
    assert_eq!(json["would_run"], expected);
    assert_eq!(json["msg"], format!("[CHECK_MODE] Would run: {}", expected));
    assert!(!temp.path().join("bin").exists());
}

#[test]
fn test_missing_name_fails_with_json() {
    let temp = TempDir::new().unwrap();
    let args = write_args(temp.path(), r#"{"script_args": ["--force"]}"#);

    let output = module_cmd(temp.path()).arg(&args).output().unwrap();
    assert_eq!(output.status.code(), Some(1));

    let json = stdout_json(&output);
    assert_eq!(json["failed"], true);
    assert_eq!(json["msg"], "missing required arguments: name");
    assert!(!temp.path().join("bin").exists());
}

#[test]
fn test_unreadable_args_file_fails_with_json() {
    let temp = TempDir::new().unwrap();

    let output = module_cmd(temp.path())
        .arg(temp.path().join("absent.json"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let json = stdout_json(&output);
    assert_eq!(json["failed"], true);
    assert!(json["msg"]
        .as_str()
        .unwrap()
        .contains("Failed to read module arguments"));
}

#[cfg(unix)]
mod with_fake_helper {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn install_fake_helper(temp: &Path, body: &str) {
        let dir = temp.join("bin");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("krun");
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
    }

    #[test]
    fn test_successful_script_reports_changed() {
        let temp = TempDir::new().unwrap();
        install_fake_helper(temp.path(), "printf done");
        let args = write_args(temp.path(), r#"{"name": "install-docker.sh", "script_args": []}"#);

        let output = module_cmd(temp.path()).arg(&args).output().unwrap();
        assert!(output.status.success());

        let json = stdout_json(&output);
        assert_eq!(json["changed"], true);
        assert_eq!(json["rc"], 0);
        assert_eq!(json["stdout"], "done");
        assert!(json.get("failed").is_none());
    }

    #[test]
    fn test_failing_script_reports_diagnostics() {
        let temp = TempDir::new().unwrap();
        install_fake_helper(temp.path(), "printf partial; printf boom >&2; exit 2");
        let args = write_args(temp.path(), r#"{"name": "install-docker.sh"}"#);

        let output = module_cmd(temp.path()).arg(&args).output().unwrap();
        assert_eq!(output.status.code(), Some(1));

        let json = stdout_json(&output);
        assert_eq!(json["failed"], true);
        assert_eq!(json["rc"], 2);
        assert_eq!(json["stdout"], "partial");
        assert_eq!(json["stderr"], "boom");
        assert_eq!(
            json["msg"],
            "krun return code: 2\nstdout:\npartial\nstderr:\nboom"
        );
    }

    #[test]
    fn test_run_subcommand_passes_arguments() {
        let temp = TempDir::new().unwrap();
        install_fake_helper(temp.path(), r#"printf '%s ' "$@""#);

        let output = module_cmd(temp.path())
            .args(["run", "install-docker.sh", "--", "--force", "--debug"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let json = stdout_json(&output);
        assert_eq!(json["stdout"], "install-docker.sh --force --debug ");
    }
}

// === Plan and config ===

#[test]
fn test_plan_prints_command() {
    let temp = TempDir::new().unwrap();
    let helper = temp.path().join("bin").join("krun");

    module_cmd(temp.path())
        .args(["plan", "install-go.sh", "1.22"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "{} install-go.sh 1.22",
            helper.display()
        )));

    assert!(!temp.path().join("bin").exists());
}

#[test]
fn test_config_show_uses_env_overrides() {
    let temp = TempDir::new().unwrap();

    module_cmd(temp.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("download_url"))
        .stdout(predicate::str::contains(
            temp.path().join("bin").display().to_string(),
        ));
}
