//! Virtual environment resource.
use anyhow::Result;
use std::path::{Path, PathBuf};

use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::exec::Executor;

/// A virtual environment created by `<python> -m venv`.
#[derive(Debug)]
pub struct VenvResource<'a> {
    /// Base interpreter that creates the environment.
    pub python: PathBuf,
    /// Environment directory.
    pub path: PathBuf,
    /// Executor used to run commands.
    pub executor: &'a dyn Executor,
}

impl<'a> VenvResource<'a> {
    /// Create a venv resource at `path` built by `python`.
    #[must_use]
    pub fn new(python: &Path, path: &Path, executor: &'a dyn Executor) -> Self {
        Self {
            python: python.to_path_buf(),
            path: path.to_path_buf(),
            executor,
        }
    }
}

impl Applicable for VenvResource<'_> {
    fn description(&self) -> String {
        format!("virtual environment {}", self.path.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        let target = self.path.to_string_lossy();
        self.executor
            .run(&self.python.to_string_lossy(), &["-m", "venv", &target])?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for VenvResource<'_> {
    /// An existing directory is reused as-is.
    fn current_state(&self) -> Result<ResourceState> {
        if self.path.is_dir() {
            Ok(ResourceState::Correct)
        } else if self.path.exists() {
            Ok(ResourceState::Invalid {
                reason: "path exists but is not a directory".to_string(),
            })
        } else {
            Ok(ResourceState::Missing)
        }
    }
}
