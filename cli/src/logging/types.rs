//! Core logging types: task entries, status, and the [`Log`] trait.

/// Step execution result for summary reporting.
#[derive(Debug, Clone)]
pub struct TaskEntry {
    /// Human-readable step name.
    pub name: String,
    /// Final status of the step.
    pub status: TaskStatus,
    /// Optional detail message (e.g., skip reason or error description).
    pub message: Option<String>,
}

/// Status of a completed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Step completed successfully.
    Ok,
    /// Step does not apply to this invocation (e.g. `--no-launch`).
    NotApplicable,
    /// Step was skipped (e.g. shortcut disabled, no entry point to launch).
    Skipped,
    /// Step ran in dry-run mode; no changes were applied.
    DryRun,
    /// Step encountered an error and halted the pipeline.
    Failed,
}

impl TaskStatus {
    /// Short label used in the summary totals.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::NotApplicable => "n/a",
            Self::Skipped => "skipped",
            Self::DryRun => "dry-run",
            Self::Failed => "failed",
        }
    }
}

/// Abstraction over logging backends.
///
/// Steps and resources log through this trait so tests can substitute a
/// logger that is not wired to the global subscriber.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Record a step result for the summary.
    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels() {
        assert_eq!(TaskStatus::Ok.label(), "ok");
        assert_eq!(TaskStatus::NotApplicable.label(), "n/a");
        assert_eq!(TaskStatus::Skipped.label(), "skipped");
        assert_eq!(TaskStatus::DryRun.label(), "dry-run");
        assert_eq!(TaskStatus::Failed.label(), "failed");
    }
}
