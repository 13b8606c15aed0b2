//! Domain-specific error types for the provisioner.
//!
//! Internal modules return typed errors ([`ProvisionError`], [`ConfigError`])
//! while the command handler at the CLI boundary converts them to
//! [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error taxonomy
//!
//! ```text
//! ProvisionError
//! ├── ToolMissing        runtime, package manager or git absent (terminal)
//! ├── ResourceCorrupt    checkout fails its integrity probe (re-cloned)
//! ├── ResourceMissing    manifest or source files absent (terminal)
//! ├── CloneFailed        clone left no checkout behind (terminal)
//! └── ActivationFailure  venv activation failed (manual fallback)
//! ConfigError
//! ├── Io / Parse         configuration file unreadable or malformed
//! └── Invalid            configuration value out of range
//! ```

use std::fmt::Write as _;
use std::path::PathBuf;

use thiserror::Error;

/// Failures of individual provisioning steps.
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// A required external tool is not installed and could not be installed.
    #[error("{tool} is not available")]
    ToolMissing {
        /// Name of the missing tool.
        tool: String,
        /// Operator-facing instructions for installing it manually.
        remediation: String,
    },

    /// A resource exists but failed its integrity check.
    #[error("{resource} is corrupt: {reason}")]
    ResourceCorrupt {
        /// Description of the resource.
        resource: String,
        /// What the integrity probe reported.
        reason: String,
    },

    /// A required input file is absent.
    #[error("{resource} not found in {}", .location.display())]
    ResourceMissing {
        /// Description of the missing input.
        resource: String,
        /// Directory that was searched.
        location: PathBuf,
        /// Names found in `location`, for diagnosis.
        listing: Vec<String>,
    },

    /// Cloning finished without producing a checkout directory.
    #[error("cloning {url} did not create {}", .path.display())]
    CloneFailed {
        /// Repository URL.
        url: String,
        /// Expected checkout path.
        path: PathBuf,
    },

    /// The environment's own activation mechanism failed.
    #[error("activation failed: {0}")]
    ActivationFailure(String),
}

impl ProvisionError {
    /// Whether this error halts the pipeline.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::ToolMissing { .. } | Self::ResourceMissing { .. } | Self::CloneFailed { .. }
        )
    }

    /// Operator-actionable guidance, one instruction per line.
    #[must_use]
    pub fn remediation(&self) -> String {
        match self {
            Self::ToolMissing { remediation, .. } => remediation.clone(),
            Self::ResourceCorrupt { resource, .. } => {
                format!("{resource} will be removed and recreated")
            }
            Self::ResourceMissing {
                resource,
                location,
                listing,
            } => {
                let mut out = format!("expected {resource} in {}", location.display());
                if listing.is_empty() {
                    out.push_str("\ndirectory is empty");
                } else {
                    out.push_str("\ndirectory contents:");
                    for name in listing {
                        let _ = write!(out, "\n  {name}");
                    }
                }
                out
            }
            Self::CloneFailed { url, .. } => format!(
                "check network access and that {url} is reachable\nthen run the bootstrap again"
            ),
            Self::ActivationFailure(_) => {
                "the environment's executable directory is prepended to PATH instead".to_string()
            }
        }
    }
}

/// Errors that arise from configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An I/O error occurred while reading the config file.
    #[error("IO error reading config file {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML for the expected schema.
    #[error("invalid config file {path}: {message}")]
    Parse {
        /// Path to the malformed file.
        path: String,
        /// Parser diagnostic.
        message: String,
    },

    /// A config value is out of range.
    #[error("invalid value for {key}: {reason}")]
    Invalid {
        /// Dotted key of the offending value.
        key: String,
        /// Why it was rejected.
        reason: String,
    },
}
