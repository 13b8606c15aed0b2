use anyhow::Result;

use super::{Context, RunState, Task, TaskResult};
use crate::error::ProvisionError;
use crate::resources::runtime::{PackageManager, PythonRuntime, refresh_search_path};

/// Resolve the pinned interpreter, installing it through the platform's
/// package manager when it is missing.
#[derive(Debug)]
pub struct EnsureRuntime;

impl Task for EnsureRuntime {
    fn name(&self) -> &'static str {
        "Ensure Python runtime"
    }

    fn run(&self, ctx: &Context, state: &mut RunState) -> Result<TaskResult> {
        let settings = &ctx.settings().runtime;
        let runtime = PythonRuntime {
            command: ctx.settings().python_command(&ctx.platform),
            version: settings.version.clone(),
            package_id: settings.package_id.clone(),
            platform: ctx.platform,
            executor: ctx.executor.as_ref(),
        };

        if let Some(probe) = runtime.probe(&state.env)? {
            ctx.log
                .info(&format!("{} at {}", probe.version, probe.path.display()));
            state.python = Some(probe.path);
            return Ok(TaskResult::Ok);
        }

        let Some(manager) =
            PackageManager::detect(ctx.executor.as_ref(), &state.env, &ctx.platform)
        else {
            return Err(ProvisionError::ToolMissing {
                tool: format!("Python {}", runtime.version),
                remediation: runtime.manual_instructions(),
            }
            .into());
        };

        let (program, args) = runtime.install_command(manager, &state.env);
        let command_line = std::iter::once(program)
            .chain(args)
            .collect::<Vec<_>>()
            .join(" ");

        if ctx.dry_run {
            ctx.log.dry_run(&format!(
                "would install Python {} with {manager}: {command_line}",
                runtime.version
            ));
            return Ok(TaskResult::DryRun);
        }

        ctx.log.warn(&format!(
            "{} not found, installing Python {} with {manager}",
            runtime.command, runtime.version
        ));
        ctx.log.debug(&format!("running: {command_line}"));
        let exit = runtime.install(manager, &state.env)?;
        if !exit.success {
            ctx.log.warn(&format!(
                "{manager} exited with code {}",
                exit.code.unwrap_or(-1)
            ));
        }

        state.env = refresh_search_path(&state.env);
        match runtime.probe(&state.env)? {
            Some(probe) => {
                ctx.log.info(&format!(
                    "installed {} at {}",
                    probe.version,
                    probe.path.display()
                ));
                state.python = Some(probe.path);
                Ok(TaskResult::Ok)
            }
            None => Err(ProvisionError::ToolMissing {
                tool: format!("Python {}", runtime.version),
                remediation: format!(
                    "the installer finished but none of {} is on PATH\n\
                     open a new terminal so the updated PATH takes effect, then run the bootstrap again",
                    runtime.candidate_commands().join(", ")
                ),
            }
            .into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::resources::test_helpers::{Reply, ScriptedExecutor};
    use crate::tasks::test_helpers::Harness;
    use std::path::PathBuf;

    #[test]
    fn present_runtime_is_recorded() {
        let exec = ScriptedExecutor::new()
            .with_tool("python3")
            .on("--version", Reply::ok("Python 3.11.9\n"));
        let h = Harness::new(exec);
        let mut state = h.state();
        let result = EnsureRuntime.run(&h.ctx, &mut state).unwrap();
        assert_eq!(result, TaskResult::Ok);
        assert_eq!(state.python, Some(PathBuf::from("/usr/bin/python3")));
        assert!(!h.exec.called("install"));
    }

    #[test]
    fn missing_runtime_without_manager_is_terminal() {
        let h = Harness::new(ScriptedExecutor::new());
        let mut state = h.state();
        let err = EnsureRuntime.run(&h.ctx, &mut state).unwrap_err();
        let provision = err.downcast_ref::<ProvisionError>().expect("typed error");
        assert!(matches!(provision, ProvisionError::ToolMissing { .. }));
        assert!(provision.remediation().contains("3.11"));
        assert!(h.exec.lines().is_empty());
    }

    #[test]
    fn missing_runtime_is_installed_then_reprobed() {
        let exec = ScriptedExecutor::new().with_tool("apt-get");
        let tools = exec.tools();
        let exec = exec
            .on_with("apt-get install", move |_| {
                tools
                    .lock()
                    .unwrap()
                    .insert("python3".to_string(), PathBuf::from("/usr/bin/python3"));
                Reply::ok("")
            })
            .on("--version", Reply::ok("Python 3.11.2\n"));
        let h = Harness::new(exec);
        let mut state = h.state();
        let result = EnsureRuntime.run(&h.ctx, &mut state).unwrap();
        assert_eq!(result, TaskResult::Ok);
        assert_eq!(state.python, Some(PathBuf::from("/usr/bin/python3")));
        assert!(h.exec.called("apt-get install"));
    }

    #[test]
    fn versioned_interpreter_from_install_is_used() {
        let exec = ScriptedExecutor::new().with_tool("apt-get");
        let tools = exec.tools();
        let exec = exec
            .on_with("apt-get install", move |_| {
                tools
                    .lock()
                    .unwrap()
                    .insert("python3.11".to_string(), PathBuf::from("/usr/bin/python3.11"));
                Reply::ok("")
            })
            .on("--version", Reply::ok("Python 3.11.2\n"));
        let h = Harness::new(exec);
        let mut state = h.state();
        let result = EnsureRuntime.run(&h.ctx, &mut state).unwrap();
        assert_eq!(result, TaskResult::Ok);
        assert_eq!(state.python, Some(PathBuf::from("/usr/bin/python3.11")));
        assert!(h.exec.called("apt-get install -y python3.11 python3.11-venv"));
    }

    #[test]
    fn still_missing_after_install_is_terminal() {
        let h = Harness::new(ScriptedExecutor::new().with_tool("apt-get"));
        let mut state = h.state();
        let err = EnsureRuntime.run(&h.ctx, &mut state).unwrap_err();
        let provision = err.downcast_ref::<ProvisionError>().expect("typed error");
        assert!(provision.remediation().contains("new terminal"));
        assert!(state.python.is_none());
    }

    #[test]
    fn dry_run_names_installer_without_running_it() {
        let h = Harness::new(ScriptedExecutor::new().with_tool("apt-get")).dry_run();
        let mut state = h.state();
        let result = EnsureRuntime.run(&h.ctx, &mut state).unwrap();
        assert_eq!(result, TaskResult::DryRun);
        assert!(!h.exec.called("install"));
    }
}
