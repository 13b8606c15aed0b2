use anyhow::Result;

use super::{Context, Outcome, RunState, Task, TaskResult};
use crate::resources::launcher::{DashboardLauncher, manual_launch_instructions};

/// Start the dashboard server in the foreground.
///
/// Blocks until the server exits.  An operator interrupt ends the run
/// normally; any other non-zero exit is an error.  Without a selected entry
/// point the operator is told how to launch by hand instead.
#[derive(Debug)]
pub struct LaunchDashboard;

impl Task for LaunchDashboard {
    fn name(&self) -> &'static str {
        "Launch dashboard"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.launch
    }

    fn run(&self, ctx: &Context, state: &mut RunState) -> Result<TaskResult> {
        let Some(selection) = state.selection.clone() else {
            if ctx.dry_run {
                ctx.log.dry_run("would launch the discovered entry point");
                return Ok(TaskResult::DryRun);
            }
            anyhow::bail!("entry-point discovery did not run");
        };

        let python = ctx.venv_python();
        let port = ctx.settings().dashboard.port;
        let Some((entry, _)) = selection.selected else {
            for line in
                manual_launch_instructions(&python, &selection.root, &selection.candidates, port)
            {
                ctx.log.info(&line);
            }
            state.outcome = Outcome::ManualLaunch {
                candidates: selection.candidates,
            };
            return Ok(TaskResult::Skipped("no entry point found".to_string()));
        };

        let launcher = DashboardLauncher {
            python,
            root: selection.root,
            entry,
            port,
        };

        if ctx.dry_run {
            ctx.log
                .dry_run(&format!("would run {}", launcher.command_line()));
            return Ok(TaskResult::DryRun);
        }

        ctx.interrupt.arm()?;
        ctx.log.info(&format!("starting {}", launcher.command_line()));
        ctx.log
            .info(&format!("dashboard at http://localhost:{port}, press Ctrl-C to stop"));
        let exit = launcher.launch(ctx.executor.as_ref(), &state.env)?;
        let interrupted = ctx.interrupt.interrupted();

        if !exit.success && !interrupted {
            anyhow::bail!(
                "dashboard exited with code {}",
                exit.code.map_or_else(|| "unknown".to_string(), |c| c.to_string())
            );
        }
        if interrupted {
            ctx.log.info("dashboard stopped by interrupt");
        }
        state.outcome = Outcome::Launched {
            entry: launcher.entry,
            interrupted,
        };
        Ok(TaskResult::Ok)
    }
}
