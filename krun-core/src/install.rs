//! Idempotent helper installation
//!
//! The helper's presence is decided purely by whether its path exists. When it
//! is missing, a single shell pipeline downloads, places and marks it
//! executable. The pipeline is not inspected step by step, not retried and not
//! locked against a concurrent install on the same host.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::RunnerConfig;
use crate::error::{KrunError, Result};
use crate::process::ProcessRunner;

/// What `ensure_installed` had to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStatus {
    /// Marker already present; nothing was spawned or written
    AlreadyInstalled,
    /// The install pipeline ran and exited 0
    Installed,
}

/// Compose the install pipeline for `config`.
///
/// `curl -fsSL -o <staging> <url> && mkdir -p <dir> && mv <staging> <helper> && chmod +x <helper>`
pub fn install_script(config: &RunnerConfig) -> Result<String> {
    let helper = config.helper_path();
    let staging = quote_path(&config.staging_path)?;
    let dir = quote_path(&config.install_dir)?;
    let helper = quote_path(&helper)?;
    let url = quote(&config.download_url)?;

    Ok(format!(
        "curl -fsSL -o {staging} {url} && mkdir -p {dir} && mv {staging} {helper} && chmod +x {helper}"
    ))
}

/// Make sure the helper exists, installing it if the marker is absent.
///
/// Any failure of the pipeline, including failure to start `sh`, is reported
/// as [`KrunError::InstallationFailed`] without the pipeline's output.
pub fn ensure_installed<R>(config: &RunnerConfig, runner: &R) -> Result<InstallStatus>
where
    R: ProcessRunner + ?Sized,
{
    let marker = config.helper_path();
    if marker.exists() {
        debug!(path = %marker.display(), "krun already installed");
        return Ok(InstallStatus::AlreadyInstalled);
    }

    let script = install_script(config)?;
    info!(
        path = %marker.display(),
        url = %config.download_url,
        "krun not found, installing"
    );

    match runner.run_shell(&script) {
        Ok(0) => {
            if !marker.exists() {
                debug!(path = %marker.display(), "install pipeline succeeded but marker is not visible");
            }
            Ok(InstallStatus::Installed)
        }
        Ok(code) => {
            warn!(code, "krun install pipeline failed");
            Err(KrunError::InstallationFailed)
        }
        Err(err) => {
            warn!(error = %err, "could not start krun install pipeline");
            Err(KrunError::InstallationFailed)
        }
    }
}

fn quote(value: &str) -> Result<String> {
    shlex::try_quote(value)
        .map(|quoted| quoted.into_owned())
        .map_err(|e| KrunError::config(format!("cannot quote {:?} for the shell: {}", value, e)))
}

fn quote_path(path: &Path) -> Result<String> {
    let value = path
        .to_str()
        .ok_or_else(|| KrunError::config(format!("path is not valid UTF-8: {}", path.display())))?;
    quote(value)
}
