use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{Config, Settings};
use crate::env::LaunchEnv;
use crate::exec::Executor;
use crate::logging::Log;
use crate::platform::Platform;
use crate::resources::entry_point::EntryPointSelection;
use crate::resources::launcher::InterruptWatch;

/// Shared, read-only context for step execution.
pub struct Context {
    /// Resolved configuration.
    pub config: Arc<Config>,
    /// Platform being provisioned.
    pub platform: Platform,
    /// Logger for output and step recording.
    pub log: Arc<dyn Log>,
    /// Whether to perform a dry run (preview changes without applying).
    pub dry_run: bool,
    /// Whether the final launch step runs.
    pub launch: bool,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
    /// Interrupt tracking for the launched dashboard.
    pub interrupt: Arc<dyn InterruptWatch>,
    /// Path of this executable, written into the shell shortcut.
    pub self_exe: PathBuf,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("platform", &self.platform)
            .field("log", &"<dyn Log>")
            .field("dry_run", &self.dry_run)
            .field("launch", &self.launch)
            .field("executor", &"<dyn Executor>")
            .field("interrupt", &self.interrupt)
            .field("self_exe", &self.self_exe)
            .finish()
    }
}

impl Context {
    /// Loaded settings.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.config.settings
    }

    /// Interpreter inside the virtual environment.
    #[must_use]
    pub fn venv_python(&self) -> PathBuf {
        self.platform.venv_python(&self.config.venv)
    }
}

/// How a run ended when no step failed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Outcome {
    /// Everything up to the launch step completed; nothing was launched.
    #[default]
    Prepared,
    /// The dashboard ran and exited.
    Launched {
        /// Entry-point file that was served.
        entry: String,
        /// Whether the operator stopped it with an interrupt.
        interrupted: bool,
    },
    /// No entry point qualified; the operator was shown how to launch by hand.
    ManualLaunch {
        /// Every candidate file that was considered.
        candidates: Vec<String>,
    },
}

/// Mutable state threaded through the steps of one run.
///
/// Each step reads what earlier steps produced and records its own results
/// here; nothing is written to the process environment.
#[derive(Debug, Clone, Default)]
pub struct RunState {
    /// Environment handed to every later child process.
    pub env: LaunchEnv,
    /// Base interpreter resolved by the runtime step.
    pub python: Option<PathBuf>,
    /// Result of entry-point discovery.
    pub selection: Option<EntryPointSelection>,
    /// How the run ended.
    pub outcome: Outcome,
}

impl RunState {
    /// Start a run from `env`.
    #[must_use]
    pub fn new(env: LaunchEnv) -> Self {
        Self {
            env,
            ..Self::default()
        }
    }
}
