use anyhow::Result;

use super::{Context, RunState, Task, TaskResult};
use crate::resources::shortcut::{ShortcutResource, profile_path, render_block};
use crate::resources::{Applicable as _, Resource as _, ResourceState};

/// Register a shell shortcut that re-runs the bootstrap from the working
/// directory.
///
/// An existing definition of the same name is never duplicated or replaced.
/// Failure to read or write the profile is a warning.
#[derive(Debug)]
pub struct RegisterShortcut;

impl Task for RegisterShortcut {
    fn name(&self) -> &'static str {
        "Register shell shortcut"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.settings().shortcut.enabled
    }

    fn run(&self, ctx: &Context, state: &mut RunState) -> Result<TaskResult> {
        let (profile, flavor) = profile_path(&ctx.platform, &state.env, &ctx.config.profile_root);
        let name = &ctx.settings().shortcut.name;
        let shortcut = ShortcutResource::new(
            profile,
            name.clone(),
            render_block(flavor, name, &ctx.config.workdir, &ctx.self_exe),
        );

        let current = match shortcut.current_state() {
            Ok(state) => state,
            Err(e) => {
                ctx.log.warn(&format!("cannot read shell profile: {e:#}"));
                return Ok(TaskResult::Skipped("shell profile unreadable".to_string()));
            }
        };

        if current == ResourceState::Correct {
            ctx.log
                .info(&format!("{} already registered", shortcut.description()));
            return Ok(TaskResult::Ok);
        }

        if ctx.dry_run {
            ctx.log
                .dry_run(&format!("would register {}", shortcut.description()));
            return Ok(TaskResult::DryRun);
        }

        match shortcut.apply() {
            Ok(_) => {
                ctx.log
                    .info(&format!("registered {}", shortcut.description()));
                ctx.log
                    .info("open a new shell (or source the profile) to use it");
                Ok(TaskResult::Ok)
            }
            Err(e) => {
                ctx.log.warn(&format!("cannot update shell profile: {e:#}"));
                Ok(TaskResult::Skipped("shell profile not writable".to_string()))
            }
        }
    }
}
