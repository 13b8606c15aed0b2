//! Git repository checkout: probe, pull, clone, and re-clone.
use anyhow::Result;
use std::path::{Path, PathBuf};

use super::fs::remove_dir_force;
use crate::error::ProvisionError;
use crate::exec::{ExecResult, Executor};

/// Line prefix git prints when a directory is not a usable repository.
const FATAL_MARKER: &str = "fatal:";

fn is_fatal_line(line: &str) -> bool {
    line.trim_start().starts_with(FATAL_MARKER)
}

/// Observed state of the checkout directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutState {
    /// No directory at the checkout path.
    Absent,
    /// A working repository.
    Valid,
    /// A directory that fails the integrity probe.
    Corrupt {
        /// What the probe reported.
        reason: String,
    },
}

/// A repository cloned into a fixed directory.
#[derive(Debug)]
pub struct RepositoryCheckout<'a> {
    /// Clone URL.
    pub url: String,
    /// Checkout directory.
    pub path: PathBuf,
    /// Git program name or resolved path.
    pub git: String,
    /// Executor used to run git.
    pub executor: &'a dyn Executor,
}

impl<'a> RepositoryCheckout<'a> {
    /// Create a checkout of `url` at `path`.
    #[must_use]
    pub fn new(url: &str, path: &Path, executor: &'a dyn Executor) -> Self {
        Self {
            url: url.to_string(),
            path: path.to_path_buf(),
            git: "git".to_string(),
            executor,
        }
    }

    /// Run git from `git` instead of looking it up by name.
    #[must_use]
    pub fn with_git(mut self, git: &Path) -> Self {
        self.git = git.display().to_string();
        self
    }

    /// Classify the checkout directory.
    ///
    /// A directory without its own `.git`, a failing `git status`, or a
    /// status output with a line starting `fatal:` is corrupt.
    ///
    /// # Errors
    ///
    /// Returns an error if git cannot be spawned.
    pub fn probe(&self) -> Result<CheckoutState> {
        if !self.path.exists() {
            return Ok(CheckoutState::Absent);
        }
        if !self.path.join(".git").exists() {
            return Ok(CheckoutState::Corrupt {
                reason: "no .git directory".to_string(),
            });
        }
        let status = self.executor.run_in_unchecked(&self.path, &self.git, &["status"])?;
        let output = status.combined_output();
        if !status.success || output.lines().any(is_fatal_line) {
            let reason = output
                .lines()
                .find(|l| is_fatal_line(l))
                .unwrap_or("git status failed")
                .trim()
                .to_string();
            return Ok(CheckoutState::Corrupt { reason });
        }
        Ok(CheckoutState::Valid)
    }

    /// Fast-forward the checkout from its upstream.
    ///
    /// # Errors
    ///
    /// Returns an error if git cannot be spawned.
    pub fn pull(&self) -> Result<ExecResult> {
        self.executor
            .run_in_unchecked(&self.path, &self.git, &["pull", "--ff-only"])
    }

    /// Clone into the checkout path.
    ///
    /// Success is judged by whether the directory exists afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::CloneFailed`] if no directory was created, or
    /// an error if git cannot be spawned.
    pub fn clone_fresh(&self) -> Result<()> {
        let target = self.path.to_string_lossy();
        let result = self
            .executor
            .run_unchecked(&self.git, &["clone", &self.url, &target])?;
        if !self.path.is_dir() {
            if !result.success {
                tracing::debug!("git clone: {}", result.combined_output().trim());
            }
            return Err(ProvisionError::CloneFailed {
                url: self.url.clone(),
                path: self.path.clone(),
            }
            .into());
        }
        Ok(())
    }

    /// Delete the checkout directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be removed.
    pub fn remove(&self) -> Result<()> {
        remove_dir_force(&self.path)
    }
}
