use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::config::Config;
use crate::env::LaunchEnv;
use crate::exec::Executor;
use crate::logging::{Log, Logger};
use crate::platform::Platform;
use crate::resources::launcher::InterruptWatch;
use crate::tasks::{self, Context, Outcome, RunState};

/// Process-level inputs to a provisioning run.
///
/// `main` builds this from the real process; tests substitute a scripted
/// executor and a synthetic environment.
#[derive(Debug)]
pub struct Host {
    /// Environment snapshot taken at start-up.
    pub env: LaunchEnv,
    /// Platform being provisioned.
    pub platform: Platform,
    /// Command executor.
    pub executor: Arc<dyn Executor>,
    /// Interrupt tracking for the launch step.
    pub interrupt: Arc<dyn InterruptWatch>,
    /// Path of this executable.
    pub self_exe: PathBuf,
}

/// Run the provision command.
///
/// The run summary is printed whether or not a step fails.  Every error
/// returned has already been logged, so callers only map it to an exit
/// status.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded or a step fails.
pub fn run(global: &GlobalOpts, host: Host, log: &Arc<Logger>) -> Result<Outcome> {
    log.info(&format!("dashboard-bootstrap {}", super::version::current()));

    log.stage("Loading configuration");
    let mut config = Config::load(global.config.as_deref(), &host.env, &host.platform)
        .inspect_err(|e| log.error(&format!("configuration: {e}")))?;
    if let Some(port) = global.port {
        config.settings.dashboard.port = port;
    }
    match &config.source {
        Some(path) => log.info(&format!("config: {}", path.display())),
        None => log.info("no config file found, using defaults"),
    }
    log.debug(&format!("platform: {}", host.platform.os));
    log.debug(&format!("working directory: {}", config.workdir.display()));
    log.debug(&format!("virtual environment: {}", config.venv.display()));
    log.debug(&format!(
        "checkout: {} ({})",
        config.checkout.display(),
        config.settings.repository.url
    ));

    let ctx = Context {
        config: Arc::new(config),
        platform: host.platform,
        log: Arc::clone(log) as Arc<dyn Log>,
        dry_run: global.dry_run,
        launch: !global.no_launch,
        executor: host.executor,
        interrupt: host.interrupt,
        self_exe: host.self_exe,
    };
    let mut state = RunState::new(host.env);

    let all_tasks = tasks::all_provision_tasks();
    let result = tasks::run_all(
        all_tasks.iter().map(std::convert::AsRef::as_ref),
        &ctx,
        &mut state,
    );

    log.print_summary();
    result?;

    if state.outcome == Outcome::Prepared && !ctx.launch && !ctx.dry_run {
        log.info("environment ready; run again without --no-launch to start the dashboard");
    }
    Ok(state.outcome)
}
