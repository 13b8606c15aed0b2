use anyhow::Result;

use super::{Context, RunState, Task, TaskResult};
use crate::resources::entry_point::{EntryPointRules, SelectionReason};

/// Pick the dashboard entry point among the checkout's top-level sources.
#[derive(Debug)]
pub struct DiscoverEntryPoint;

impl Task for DiscoverEntryPoint {
    fn name(&self) -> &'static str {
        "Discover entry point"
    }

    fn run(&self, ctx: &Context, state: &mut RunState) -> Result<TaskResult> {
        let checkout = &ctx.config.checkout;
        if ctx.dry_run && !checkout.exists() {
            ctx.log
                .dry_run("would search the checkout for an entry point once it is cloned");
            return Ok(TaskResult::DryRun);
        }

        let dashboard = &ctx.settings().dashboard;
        let rules = EntryPointRules {
            extension: &dashboard.extension,
            priority_names: &dashboard.entry_points,
            import_signatures: &dashboard.import_signatures,
        };
        let selection = rules.discover(checkout)?;
        ctx.log.debug(&format!(
            "candidates: {}",
            selection.candidates.join(", ")
        ));
        if let Some(path) = selection.selected_path() {
            ctx.log.debug(&format!("entry point: {}", path.display()));
        }

        match &selection.selected {
            Some((name, SelectionReason::ConventionalName)) => {
                ctx.log.info(&format!("selected {name} (conventional name)"));
            }
            Some((name, SelectionReason::FrameworkImport)) => {
                ctx.log.info(&format!("selected {name} (imports the framework)"));
            }
            None => ctx.log.warn(&format!(
                "none of {} file(s) looks like a dashboard entry point",
                selection.candidates.len()
            )),
        }
        state.selection = Some(selection);
        Ok(TaskResult::Ok)
    }
}
