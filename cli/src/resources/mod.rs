//! Idempotent resource primitives (check + apply pattern).
pub mod activation;
pub mod checkout;
pub mod directory;
pub mod entry_point;
pub mod fs;
pub mod launcher;
pub mod manifest;
pub mod pip;
pub mod runtime;
pub mod shortcut;
pub mod venv;

use anyhow::Result;

/// Minimal interface for resources that can be described and applied.
pub trait Applicable {
    /// Human-readable description of this resource.
    fn description(&self) -> String;

    /// Bring the resource into its desired state.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be applied due to I/O failures,
    /// a failing external tool, or other system errors.
    fn apply(&self) -> Result<ResourceChange>;
}

/// State of a resource (directory, environment, profile entry, ...).
///
/// # Examples
///
/// ```
/// use dashboard_bootstrap::resources::ResourceState;
///
/// let missing = ResourceState::Missing;
/// let correct = ResourceState::Correct;
/// let skip = ResourceState::Invalid { reason: "path is a file".into() };
///
/// assert_ne!(missing, correct);
/// assert_eq!(correct, ResourceState::Correct);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Resource does not exist or is not present.
    Missing,
    /// Resource exists and matches the desired state.
    Correct,
    /// Resource cannot be applied (e.g. a file sits where a directory belongs).
    Invalid {
        /// Reason why the resource cannot be applied.
        reason: String,
    },
}

/// Result of applying a resource change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// Resource was created or updated.
    Applied,
    /// Resource was already correct (no change needed).
    AlreadyCorrect,
    /// Resource was skipped.
    Skipped {
        /// Reason why the resource was skipped.
        reason: String,
    },
}

/// Unified interface for resources that can be checked and applied.
///
/// # Examples
///
/// ```ignore
/// // All resources follow the same check-then-apply pattern:
/// match resource.ensure()? {
///     ResourceChange::Applied => log.info("created"),
///     ResourceChange::AlreadyCorrect => log.info("already present"),
///     ResourceChange::Skipped { reason } => log.warn(&reason),
/// }
/// ```
pub trait Resource: Applicable {
    /// Check the current state of the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource state cannot be determined.
    fn current_state(&self) -> Result<ResourceState>;

    /// Apply only if the resource is [`ResourceState::Missing`].
    ///
    /// # Errors
    ///
    /// Returns an error if the state check or the apply fails, or if the
    /// resource is [`ResourceState::Invalid`].
    fn ensure(&self) -> Result<ResourceChange> {
        match self.current_state()? {
            ResourceState::Correct => Ok(ResourceChange::AlreadyCorrect),
            ResourceState::Invalid { reason } => {
                anyhow::bail!("{}: {reason}", self.description())
            }
            ResourceState::Missing => self.apply(),
        }
    }
}
