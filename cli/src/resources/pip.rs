//! Package-installer availability for an interpreter.
use anyhow::Result;
use std::path::{Path, PathBuf};

use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::exec::Executor;

/// `pip` as a module of a given interpreter.
#[derive(Debug)]
pub struct PipResource<'a> {
    /// Interpreter whose `pip` module is checked.
    pub python: PathBuf,
    /// Executor used to run commands.
    pub executor: &'a dyn Executor,
}

impl<'a> PipResource<'a> {
    /// Create a pip resource for `python`.
    #[must_use]
    pub fn new(python: &Path, executor: &'a dyn Executor) -> Self {
        Self {
            python: python.to_path_buf(),
            executor,
        }
    }

    fn python(&self) -> std::borrow::Cow<'_, str> {
        self.python.to_string_lossy()
    }
}

impl Applicable for PipResource<'_> {
    fn description(&self) -> String {
        format!("pip for {}", self.python.display())
    }

    /// Repair with `ensurepip --upgrade`.
    fn apply(&self) -> Result<ResourceChange> {
        let result = self
            .executor
            .run_unchecked(&self.python(), &["-m", "ensurepip", "--upgrade"])?;
        if result.success {
            Ok(ResourceChange::Applied)
        } else {
            Ok(ResourceChange::Skipped {
                reason: format!("ensurepip failed: {}", result.combined_output().trim()),
            })
        }
    }
}

impl Resource for PipResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        let result = self
            .executor
            .run_unchecked(&self.python(), &["-m", "pip", "--version"])?;
        Ok(if result.success {
            ResourceState::Correct
        } else {
            ResourceState::Missing
        })
    }
}
