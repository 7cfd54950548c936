use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{KrunError, Result};

/// Where the helper artifact is downloaded from
pub const DEFAULT_DOWNLOAD_URL: &str =
    "https://raw.githubusercontent.com/kevin197011/krun/main/bin/krun";

/// Temporary download location used by the install pipeline
pub const DEFAULT_STAGING_PATH: &str = "/tmp/krun";

/// File name of the helper inside the install directory
pub const DEFAULT_BINARY_NAME: &str = "krun";

/// Environment variable naming an alternative config file
pub const ENV_CONFIG: &str = "KRUN_CONFIG";
pub const ENV_INSTALL_DIR: &str = "KRUN_INSTALL_DIR";
pub const ENV_DOWNLOAD_URL: &str = "KRUN_DOWNLOAD_URL";
pub const ENV_STAGING_PATH: &str = "KRUN_STAGING_PATH";

/// Deploy-time settings threaded into the runner at construction.
///
/// Nothing in a module request can change these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Directory holding the helper (default `~/.krun/bin`)
    pub install_dir: PathBuf,
    /// Helper file name inside `install_dir`
    pub binary_name: String,
    /// Source URL for the helper artifact
    pub download_url: String,
    /// Temporary path the artifact is downloaded to before being moved
    pub staging_path: PathBuf,
}

/// On-disk shape of `~/.krun/config.toml`; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    install_dir: Option<PathBuf>,
    binary_name: Option<String>,
    download_url: Option<String>,
    staging_path: Option<PathBuf>,
}

impl RunnerConfig {
    /// Config with the built-in source and staging path, installing into `install_dir`
    pub fn with_install_dir(install_dir: impl Into<PathBuf>) -> Self {
        Self {
            install_dir: install_dir.into(),
            binary_name: DEFAULT_BINARY_NAME.to_string(),
            download_url: DEFAULT_DOWNLOAD_URL.to_string(),
            staging_path: PathBuf::from(DEFAULT_STAGING_PATH),
        }
    }

    /// Built-in defaults rooted at the invoking user's home directory
    pub fn from_home() -> Result<Self> {
        Ok(Self::with_install_dir(default_install_dir()?))
    }

    /// Full path of the helper, which doubles as the install marker
    pub fn helper_path(&self) -> PathBuf {
        self.install_dir.join(&self.binary_name)
    }

    /// Config file location: `$KRUN_CONFIG`, else `~/.krun/config.toml`
    pub fn config_path() -> Option<PathBuf> {
        match env::var(ENV_CONFIG) {
            Ok(path) if !path.is_empty() => Some(PathBuf::from(path)),
            _ => dirs::home_dir().map(|home| home.join(".krun").join("config.toml")),
        }
    }

    /// Load defaults, then the config file (if present), then environment overrides
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        Self::load_layered(path.as_deref(), |key| env::var(key).ok())
    }

    /// Layered load with an injectable environment lookup.
    ///
    /// A missing file is not an error; an unreadable or malformed one is.
    pub fn load_layered<F>(path: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = match path {
            Some(path) if path.exists() => {
                debug!(path = %path.display(), "reading krun config file");
                let content = fs::read_to_string(path).map_err(|e| {
                    KrunError::config(format!("failed to read {}: {}", path.display(), e))
                })?;
                toml::from_str::<ConfigFile>(&content).map_err(|e| {
                    KrunError::config(format!("invalid TOML in {}: {}", path.display(), e))
                })?
            }
            _ => ConfigFile::default(),
        };

        let lookup = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let install_dir = match lookup(ENV_INSTALL_DIR)
            .map(PathBuf::from)
            .or(file.install_dir)
        {
            Some(dir) => expand_home(&dir)?,
            None => default_install_dir()?,
        };

        let binary_name = file
            .binary_name
            .unwrap_or_else(|| DEFAULT_BINARY_NAME.to_string());
        if binary_name.is_empty() || binary_name.contains('/') {
            return Err(KrunError::config(format!(
                "binary_name must be a plain file name, got {:?}",
                binary_name
            )));
        }

        let download_url = lookup(ENV_DOWNLOAD_URL)
            .or(file.download_url)
            .unwrap_or_else(|| DEFAULT_DOWNLOAD_URL.to_string());

        let staging_path = match lookup(ENV_STAGING_PATH)
            .map(PathBuf::from)
            .or(file.staging_path)
        {
            Some(path) => expand_home(&path)?,
            None => PathBuf::from(DEFAULT_STAGING_PATH),
        };

        Ok(Self {
            install_dir,
            binary_name,
            download_url,
            staging_path,
        })
    }
}

fn default_install_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or(KrunError::HomeDirUnavailable)?;
    Ok(home.join(".krun").join("bin"))
}

/// Expand a leading `~` the way a shell would
fn expand_home(path: &Path) -> Result<PathBuf> {
    match path.strip_prefix("~") {
        Ok(rest) => {
            let home = dirs::home_dir().ok_or(KrunError::HomeDirUnavailable)?;
            Ok(home.join(rest))
        }
        Err(_) => Ok(path.to_path_buf()),
    }
}
