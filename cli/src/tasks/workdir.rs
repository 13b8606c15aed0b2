use anyhow::Result;

use super::{Context, RunState, Task, TaskResult};
use crate::resources::directory::DirectoryResource;
use crate::resources::{Applicable as _, Resource as _, ResourceChange, ResourceState};

/// Create the working directory under the profile root.
#[derive(Debug)]
pub struct EnsureWorkingDirectory;

impl Task for EnsureWorkingDirectory {
    fn name(&self) -> &'static str {
        "Ensure working directory"
    }

    fn run(&self, ctx: &Context, _state: &mut RunState) -> Result<TaskResult> {
        let dir = DirectoryResource::new(&ctx.config.workdir);
        if ctx.dry_run && dir.current_state()? == ResourceState::Missing {
            ctx.log
                .dry_run(&format!("would create {}", dir.description()));
            return Ok(TaskResult::DryRun);
        }
        match dir.ensure()? {
            ResourceChange::AlreadyCorrect => {
                ctx.log.info(&format!("{} already exists", dir.description()));
            }
            ResourceChange::Applied => {
                ctx.log.info(&format!("created {}", dir.description()));
            }
            ResourceChange::Skipped { reason } => return Ok(TaskResult::Skipped(reason)),
        }
        Ok(TaskResult::Ok)
    }
}
