/// Structured error types for the krun runner library.
///
/// Library consumers get typed, matchable errors; the `krun-module` binary
/// wraps them with `anyhow` where it only needs to report.
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Message reported when the install pipeline does not succeed.
pub const INSTALL_FAILED_MESSAGE: &str = "Failed to install krun";

/// Main error type for krun-core operations
#[derive(Error, Debug)]
pub enum KrunError {
    /// The install pipeline exited non-zero or could not be started.
    ///
    /// The pipeline's own output is not attached.
    #[error("Failed to install krun")]
    InstallationFailed,

    /// A required module parameter was absent
    #[error("missing required arguments: {field}")]
    MissingRequiredField { field: String },

    /// A module parameter had the wrong shape or an unusable value
    #[error("argument '{field}' is invalid: {reason}")]
    InvalidParameter { field: String, reason: String },

    /// Parameters not declared by the module were supplied
    #[error("Unsupported parameters for (krun) module: {}", names.join(", "))]
    UnsupportedParameters { names: Vec<String> },

    /// The helper process could not be started at all
    #[error("Failed to execute {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    /// `~` could not be resolved for the default install location
    #[error("Could not determine home directory")]
    HomeDirUnavailable,

    /// Configuration file or override could not be used
    #[error("Configuration error: {reason}")]
    Config { reason: String },

    /// I/O operation failed
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// JSON parsing or serialization failed
    #[error("JSON error at {context}: {source}")]
    Json {
        context: String,
        source: serde_json::Error,
    },
}

/// Result type alias for krun-core operations
pub type Result<T> = std::result::Result<T, KrunError>;

impl KrunError {
    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingRequiredField {
            field: field.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a spawn error for the given program
    pub fn spawn(program: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source,
        }
    }

    /// Create a config error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Create a JSON error with context
    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    /// True for errors raised while validating the request, before any
    /// marker check or process spawn.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingRequiredField { .. }
                | Self::InvalidParameter { .. }
                | Self::UnsupportedParameters { .. }
        )
    }
}
