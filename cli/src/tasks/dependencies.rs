use anyhow::Result;

use super::{Context, RunState, Task, TaskResult};
use crate::resources::manifest::DependencyManifest;

/// Install the checkout's dependency manifest into the virtual environment.
///
/// A missing manifest halts the run; a failing install is only a warning.
#[derive(Debug)]
pub struct InstallDependencies;

impl Task for InstallDependencies {
    fn name(&self) -> &'static str {
        "Install dependencies"
    }

    fn run(&self, ctx: &Context, _state: &mut RunState) -> Result<TaskResult> {
        let checkout = &ctx.config.checkout;
        let manifest = DependencyManifest::new(checkout, &ctx.settings().dependencies.manifest);

        if ctx.dry_run && !checkout.exists() {
            ctx.log.dry_run(&format!(
                "would install {} once the repository is cloned",
                manifest.file_name
            ));
            return Ok(TaskResult::DryRun);
        }

        manifest.require()?;

        let python = ctx.venv_python();
        if ctx.dry_run {
            ctx.log.dry_run(&format!(
                "would run {} -m pip install -r {}",
                python.display(),
                manifest.file_name
            ));
            return Ok(TaskResult::DryRun);
        }

        ctx.log
            .info(&format!("installing {}", manifest.path().display()));
        let result = manifest.install(ctx.executor.as_ref(), &python)?;
        ctx.log
            .debug(&format!("pip output: {}", result.combined_output().trim()));
        if !result.success {
            ctx.log.warn(&format!(
                "dependency installation failed (exit {}): {}",
                result.code.unwrap_or(-1),
                result.stderr.trim()
            ));
            ctx.log.warn("the dashboard may fail to start");
            return Ok(TaskResult::Skipped("pip install failed".to_string()));
        }
        ctx.log.info("dependencies installed");
        Ok(TaskResult::Ok)
    }
}
