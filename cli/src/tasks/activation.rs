use anyhow::Result;

use super::{Context, RunState, Task, TaskResult};
use crate::resources::activation::{ActivationMethod, activate};

/// Activate the virtual environment for every later child process.
///
/// The activated variables live in the run state; this process's own
/// environment is never modified.  When the activation script fails the
/// environment is activated by hand and the failure is only a warning.
#[derive(Debug)]
pub struct ActivateEnvironment;

impl Task for ActivateEnvironment {
    fn name(&self) -> &'static str {
        "Activate virtual environment"
    }

    fn run(&self, ctx: &Context, state: &mut RunState) -> Result<TaskResult> {
        let venv = &ctx.config.venv;
        if ctx.dry_run {
            ctx.log
                .dry_run(&format!("would activate {}", venv.display()));
            return Ok(TaskResult::DryRun);
        }

        let (env, method, failure) =
            activate(ctx.executor.as_ref(), &ctx.platform, venv, &state.env);
        if let Some(err) = failure {
            ctx.log.warn(&err.to_string());
            ctx.log.info(&err.remediation());
        }
        state.env = env;

        match method {
            ActivationMethod::Script => ctx.log.info(&format!("activated {}", venv.display())),
            ActivationMethod::Manual => ctx
                .log
                .info(&format!("activated {} by hand", venv.display())),
        }
        ctx.log.debug(&format!("PATH={}", state.env.search_path()));
        Ok(TaskResult::Ok)
    }
}
