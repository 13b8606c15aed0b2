use anyhow::Result;

use super::{Context, RunState, Task, TaskResult};
use crate::resources::venv::VenvResource;
use crate::resources::{Applicable as _, Resource as _, ResourceState};

/// Create the virtual environment in the working directory, reusing an
/// existing one.
#[derive(Debug)]
pub struct EnsureVirtualEnv;

impl Task for EnsureVirtualEnv {
    fn name(&self) -> &'static str {
        "Ensure virtual environment"
    }

    fn run(&self, ctx: &Context, state: &mut RunState) -> Result<TaskResult> {
        let path = &ctx.config.venv;
        let python = state.python.clone().unwrap_or_default();
        let venv = VenvResource::new(&python, path, ctx.executor.as_ref());

        match venv.current_state()? {
            ResourceState::Correct => {
                ctx.log.info(&format!("reusing {}", venv.description()));
                Ok(TaskResult::Ok)
            }
            ResourceState::Invalid { reason } => {
                anyhow::bail!("{}: {reason}", venv.description())
            }
            ResourceState::Missing => {
                if ctx.dry_run {
                    ctx.log
                        .dry_run(&format!("would create {}", venv.description()));
                    return Ok(TaskResult::DryRun);
                }
                if state.python.is_none() {
                    anyhow::bail!("no interpreter was resolved");
                }
                venv.apply()?;
                ctx.log.info(&format!("created {}", venv.description()));
                Ok(TaskResult::Ok)
            }
        }
    }
}
