//! Dependency manifest in the checkout root.
use anyhow::Result;
use std::path::{Path, PathBuf};

use super::fs::list_dir_names;
use crate::error::ProvisionError;
use crate::exec::{ExecResult, Executor};

/// A `requirements.txt`-style manifest installed with `pip install -r`.
#[derive(Debug, Clone)]
pub struct DependencyManifest {
    /// Directory the manifest must live in.
    pub root: PathBuf,
    /// Manifest file name.
    pub file_name: String,
}

impl DependencyManifest {
    /// Manifest `file_name` in `root`.
    #[must_use]
    pub fn new(root: &Path, file_name: &str) -> Self {
        Self {
            root: root.to_path_buf(),
            file_name: file_name.to_string(),
        }
    }

    /// Full manifest path.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.root.join(&self.file_name)
    }

    /// Fail unless the manifest exists.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::ResourceMissing`] listing the root directory
    /// when the manifest is absent.
    pub fn require(&self) -> Result<(), ProvisionError> {
        if self.path().is_file() {
            return Ok(());
        }
        Err(ProvisionError::ResourceMissing {
            resource: self.file_name.clone(),
            location: self.root.clone(),
            listing: list_dir_names(&self.root),
        })
    }

    /// Install the manifest with `python`, run from the checkout root.
    ///
    /// # Errors
    ///
    /// Returns an error only if the installer cannot be spawned; a failing
    /// install is reported through the returned result.
    pub fn install(&self, executor: &dyn Executor, python: &Path) -> Result<ExecResult> {
        executor.run_in_unchecked(
            &self.root,
            &python.to_string_lossy(),
            &["-m", "pip", "install", "-r", &self.file_name],
        )
    }
}
