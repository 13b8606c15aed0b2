//! Named, ordered provisioning steps that orchestrate resource changes.
//!
//! Steps run strictly in the order of [`all_provision_tasks`]; a step that
//! returns an error halts the run.  Recoverable problems are logged as
//! warnings inside the step and never surface as errors.
pub mod activation;
mod context;
pub mod dependencies;
pub mod entry_point;
pub mod launch;
pub mod pip;
pub mod repository;
pub mod runtime;
pub mod shortcut;
pub mod venv;
pub mod workdir;

pub use context::{Context, Outcome, RunState};

use anyhow::Result;

use crate::error::ProvisionError;
use crate::logging::TaskStatus;

/// Result of a single step execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskResult {
    /// Step completed (changes applied or already correct).
    Ok,
    /// Step was skipped with a reason.
    Skipped(String),
    /// Step ran in dry-run mode.
    DryRun,
}

/// A named, executable provisioning step.
pub trait Task: Send + Sync {
    /// Human-readable step name.
    fn name(&self) -> &str;

    /// Whether this step applies to the current invocation.
    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    /// Execute the step, reading and updating the run state.
    ///
    /// # Errors
    ///
    /// Returns an error when the step cannot reach its goal and the run
    /// must stop, such as a missing tool or input file.
    fn run(&self, ctx: &Context, state: &mut RunState) -> Result<TaskResult>;
}

/// The complete, ordered set of steps run by the provision command.
#[must_use]
pub fn all_provision_tasks() -> Vec<Box<dyn Task>> {
    vec![
        Box::new(workdir::EnsureWorkingDirectory),
        Box::new(runtime::EnsureRuntime),
        Box::new(pip::BootstrapPip),
        Box::new(venv::EnsureVirtualEnv),
        Box::new(shortcut::RegisterShortcut),
        Box::new(activation::ActivateEnvironment),
        Box::new(repository::SyncRepository),
        Box::new(dependencies::InstallDependencies),
        Box::new(entry_point::DiscoverEntryPoint),
        Box::new(launch::LaunchDashboard),
    ]
}

/// Execute a step, recording the result in the logger.
///
/// A failing step is recorded, its error and any remediation lines are
/// logged, and the error is returned so the caller stops the run.
///
/// # Errors
///
/// Returns the step's error unchanged.
pub fn execute(task: &dyn Task, ctx: &Context, state: &mut RunState) -> Result<()> {
    if !task.should_run(ctx) {
        ctx.log
            .debug(&format!("skipping step: {} (not applicable)", task.name()));
        ctx.log
            .record_task(task.name(), TaskStatus::NotApplicable, None);
        return Ok(());
    }

    ctx.log.stage(task.name());

    match task.run(ctx, state) {
        Ok(TaskResult::Ok) => {
            ctx.log.record_task(task.name(), TaskStatus::Ok, None);
            Ok(())
        }
        Ok(TaskResult::Skipped(reason)) => {
            ctx.log.info(&format!("skipped: {reason}"));
            ctx.log
                .record_task(task.name(), TaskStatus::Skipped, Some(&reason));
            Ok(())
        }
        Ok(TaskResult::DryRun) => {
            ctx.log.record_task(task.name(), TaskStatus::DryRun, None);
            Ok(())
        }
        Err(e) => {
            ctx.log.error(&format!("{}: {e:#}", task.name()));
            if let Some(provision) = e.downcast_ref::<ProvisionError>() {
                for line in provision.remediation().lines() {
                    ctx.log.info(line);
                }
            }
            ctx.log
                .record_task(task.name(), TaskStatus::Failed, Some(&format!("{e:#}")));
            Err(e)
        }
    }
}

/// Run every step in order, stopping at the first failure.
///
/// # Errors
///
/// Returns the error of the first failing step.
pub fn run_all<'a>(
    tasks: impl IntoIterator<Item = &'a dyn Task>,
    ctx: &Context,
    state: &mut RunState,
) -> Result<()> {
    for task in tasks {
        execute(task, ctx, state)?;
    }
    Ok(())
}

/// Shared helpers for step unit tests.
///
/// Builds a [`Context`] around a temporary profile root, a
/// [`ScriptedExecutor`](crate::resources::test_helpers::ScriptedExecutor)
/// and a logger the test can inspect.
#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub mod test_helpers {
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use crate::config::{Config, Settings};
    use crate::env::LaunchEnv;
    use crate::logging::{Log, Logger, TaskStatus};
    use crate::platform::{Os, Platform};
    use crate::resources::launcher::InterruptWatch;
    use crate::resources::test_helpers::ScriptedExecutor;

    use super::{Context, RunState};

    /// Interrupt watch whose state is set by the test.
    #[derive(Debug, Default)]
    pub struct FakeInterrupt {
        /// Whether [`InterruptWatch::arm`] was called.
        pub armed: AtomicBool,
        /// Value reported by [`InterruptWatch::interrupted`].
        pub fired: AtomicBool,
    }

    impl FakeInterrupt {
        /// A watch that reports an interrupt.
        #[must_use]
        pub fn fired() -> Self {
            Self {
                armed: AtomicBool::new(false),
                fired: AtomicBool::new(true),
            }
        }
    }

    impl InterruptWatch for FakeInterrupt {
        fn arm(&self) -> anyhow::Result<()> {
            self.armed.store(true, Ordering::SeqCst);
            Ok(())
        }

        fn interrupted(&self) -> bool {
            self.fired.load(Ordering::SeqCst)
        }
    }

    /// Everything a step test needs, rooted in a temporary directory.
    pub struct Harness {
        /// Temporary profile root; removed on drop.
        pub tmp: tempfile::TempDir,
        /// Context handed to steps.
        pub ctx: Context,
        /// Logger behind `ctx.log`.
        pub log: Arc<Logger>,
        /// Executor behind `ctx.executor`.
        pub exec: Arc<ScriptedExecutor>,
        /// Interrupt watch behind `ctx.interrupt`.
        pub interrupt: Arc<FakeInterrupt>,
    }

    impl Harness {
        /// Linux harness with default settings.
        #[must_use]
        pub fn new(exec: ScriptedExecutor) -> Self {
            Self::with(exec, Settings::default(), FakeInterrupt::default())
        }

        /// Linux harness with explicit settings and interrupt watch.
        #[must_use]
        pub fn with(exec: ScriptedExecutor, settings: Settings, interrupt: FakeInterrupt) -> Self {
            let tmp = tempfile::tempdir().unwrap();
            let config = Config::resolve(settings, tmp.path().to_path_buf(), None);
            let log = Arc::new(Logger::with_log_file(None));
            let exec = Arc::new(exec);
            let interrupt = Arc::new(interrupt);
            let ctx = Context {
                config: Arc::new(config),
                platform: Platform::new(Os::Linux),
                log: Arc::clone(&log) as Arc<dyn Log>,
                dry_run: false,
                launch: true,
                executor: Arc::clone(&exec) as Arc<dyn crate::exec::Executor>,
                interrupt: Arc::clone(&interrupt) as Arc<dyn InterruptWatch>,
                self_exe: PathBuf::from("/opt/bin/dashboard-bootstrap"),
            };
            Self {
                tmp,
                ctx,
                log,
                exec,
                interrupt,
            }
        }

        /// Switch the context to dry-run mode.
        #[must_use]
        pub fn dry_run(mut self) -> Self {
            self.ctx.dry_run = true;
            self
        }

        /// Run state seeded with a minimal environment rooted in the harness.
        #[must_use]
        pub fn state(&self) -> RunState {
            RunState::new(
                LaunchEnv::default()
                    .with_var("PATH", "/usr/bin:/bin")
                    .with_var("HOME", &self.tmp.path().display().to_string()),
            )
        }

        /// Create the venv layout with its interpreter path present.
        pub fn make_venv(&self) {
            let bin = self.ctx.platform.venv_bin_dir(&self.ctx.config.venv);
            std::fs::create_dir_all(&bin).unwrap();
            std::fs::write(self.ctx.venv_python(), "").unwrap();
        }

        /// Create a valid-looking checkout holding `files`.
        pub fn make_checkout(&self, files: &[(&str, &str)]) {
            let root = &self.ctx.config.checkout;
            std::fs::create_dir_all(root.join(".git")).unwrap();
            for (name, content) in files {
                std::fs::write(root.join(name), content).unwrap();
            }
        }

        /// Statuses recorded so far, in order.
        #[must_use]
        pub fn statuses(&self) -> Vec<TaskStatus> {
            self.log.task_entries().iter().map(|e| e.status).collect()
        }
    }
}
