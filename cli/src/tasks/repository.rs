use anyhow::Result;

use super::{Context, RunState, Task, TaskResult};
use crate::error::ProvisionError;
use crate::platform::Os;
use crate::resources::checkout::{CheckoutState, RepositoryCheckout};

/// Clone the dashboard repository, or bring an existing checkout up to date.
///
/// A checkout that fails its integrity probe is removed and cloned again; a
/// failing pull keeps the existing checkout.
#[derive(Debug)]
pub struct SyncRepository;

impl Task for SyncRepository {
    fn name(&self) -> &'static str {
        "Sync repository"
    }

    fn run(&self, ctx: &Context, state: &mut RunState) -> Result<TaskResult> {
        let Some(git) = ctx.executor.which("git", &state.env) else {
            return Err(ProvisionError::ToolMissing {
                tool: "git".to_string(),
                remediation: git_instructions(ctx.platform.os).to_string(),
            }
            .into());
        };

        let url = &ctx.settings().repository.url;
        let path = &ctx.config.checkout;
        let checkout = RepositoryCheckout::new(url, path, ctx.executor.as_ref()).with_git(&git);

        match checkout.probe()? {
            CheckoutState::Absent => {
                if ctx.dry_run {
                    ctx.log
                        .dry_run(&format!("would clone {url} into {}", path.display()));
                    return Ok(TaskResult::DryRun);
                }
                ctx.log.info(&format!("cloning {url}"));
                checkout.clone_fresh()?;
                ctx.log.info(&format!("cloned into {}", path.display()));
                Ok(TaskResult::Ok)
            }
            CheckoutState::Valid => {
                if ctx.dry_run {
                    ctx.log
                        .dry_run(&format!("would pull {}", path.display()));
                    return Ok(TaskResult::DryRun);
                }
                let result = checkout.pull()?;
                let output = result.combined_output();
                ctx.log.debug(&format!("git pull output: {}", output.trim()));
                if !result.success {
                    ctx.log.warn(&format!(
                        "git pull failed, keeping existing checkout: {}",
                        output.trim()
                    ));
                    return Ok(TaskResult::Skipped("git pull failed".to_string()));
                }
                if output.contains("Already up to date") {
                    ctx.log.info("already up to date");
                } else {
                    ctx.log.info("repository updated");
                }
                Ok(TaskResult::Ok)
            }
            CheckoutState::Corrupt { reason } => {
                let corrupt = ProvisionError::ResourceCorrupt {
                    resource: format!("checkout {}", path.display()),
                    reason,
                };
                ctx.log.warn(&corrupt.to_string());
                if ctx.dry_run {
                    ctx.log.dry_run(&format!(
                        "would remove {} and clone {url} again",
                        path.display()
                    ));
                    return Ok(TaskResult::DryRun);
                }
                ctx.log.info(&corrupt.remediation());
                checkout.remove()?;
                checkout.clone_fresh()?;
                ctx.log.info(&format!("re-cloned into {}", path.display()));
                Ok(TaskResult::Ok)
            }
        }
    }
}

const fn git_instructions(os: Os) -> &'static str {
    match os {
        Os::Windows => {
            "install Git from https://git-scm.com/download/win or run: winget install --id Git.Git\n\
             then open a new terminal and run the bootstrap again"
        }
        Os::MacOs => "install the Xcode command line tools with: xcode-select --install",
        Os::Linux => "install git with your distribution's package manager",
    }
}
