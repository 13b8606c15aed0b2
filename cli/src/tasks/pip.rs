use anyhow::{Context as _, Result};

use super::{Context, RunState, Task, TaskResult};
use crate::resources::pip::PipResource;
use crate::resources::{Applicable as _, Resource as _, ResourceChange, ResourceState};

/// Make sure the base interpreter has a working `pip`, repairing it with
/// `ensurepip` when it does not.
#[derive(Debug)]
pub struct BootstrapPip;

impl Task for BootstrapPip {
    fn name(&self) -> &'static str {
        "Bootstrap pip"
    }

    fn run(&self, ctx: &Context, state: &mut RunState) -> Result<TaskResult> {
        let Some(python) = state.python.as_deref() else {
            if ctx.dry_run {
                ctx.log
                    .dry_run("would check pip once the interpreter is installed");
                return Ok(TaskResult::DryRun);
            }
            anyhow::bail!("no interpreter was resolved");
        };

        let pip = PipResource::new(python, ctx.executor.as_ref());
        if pip.current_state()? == ResourceState::Correct {
            ctx.log.info("pip is available");
            return Ok(TaskResult::Ok);
        }

        if ctx.dry_run {
            ctx.log.dry_run(&format!(
                "would run {} -m ensurepip --upgrade",
                python.display()
            ));
            return Ok(TaskResult::DryRun);
        }

        ctx.log.warn(&format!("{} is missing, repairing", pip.description()));
        match pip.apply().context("running ensurepip")? {
            ResourceChange::Skipped { reason } => {
                ctx.log.warn(&reason);
                Ok(TaskResult::Skipped("pip could not be repaired".to_string()))
            }
            ResourceChange::Applied | ResourceChange::AlreadyCorrect => {
                ctx.log.info("pip installed with ensurepip");
                Ok(TaskResult::Ok)
            }
        }
    }
}
