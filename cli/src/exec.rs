//! External process execution behind an injectable [`Executor`].
use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use crate::env::LaunchEnv;

/// Result of a command execution.
#[derive(Debug, Clone)]
pub struct ExecResult {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit code, `None` when the process was killed by a signal.
    pub code: Option<i32>,
}

impl ExecResult {
    /// Standard output and standard error joined, for marker scanning.
    #[must_use]
    pub fn combined_output(&self) -> String {
        format!("{}{}", self.stdout, self.stderr)
    }
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Exit information of a process that ran with inherited stdio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitInfo {
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit code, `None` when the process was killed by a signal.
    pub code: Option<i32>,
}

/// Abstraction over process execution so tasks and resources can be tested
/// without spawning real tools.
pub trait Executor: Send + Sync + std::fmt::Debug {
    /// Run a command and return its output. Fails if the command exits non-zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be spawned or exits non-zero.
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run a command, allowing failure (returns result without bailing).
    ///
    /// # Errors
    ///
    /// Returns an error only if the program cannot be spawned.
    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run a command in a specific directory, allowing failure.
    ///
    /// # Errors
    ///
    /// Returns an error only if the program cannot be spawned.
    fn run_in_unchecked(&self, dir: &Path, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run a command with exactly the variables in `env`, capturing output and
    /// allowing failure.
    ///
    /// # Errors
    ///
    /// Returns an error only if the program cannot be spawned.
    fn capture_with_env(
        &self,
        program: &str,
        args: &[&str],
        env: &LaunchEnv,
    ) -> Result<ExecResult>;

    /// Run a command with inherited stdio and exactly the variables in `env`,
    /// blocking until it exits.
    ///
    /// # Errors
    ///
    /// Returns an error only if the program cannot be spawned.
    fn run_interactive(
        &self,
        dir: Option<&Path>,
        program: &str,
        args: &[&str],
        env: &LaunchEnv,
    ) -> Result<ExitInfo>;

    /// Resolve `program` against the search path held in `env`.
    fn which(&self, program: &str, env: &LaunchEnv) -> Option<PathBuf>;
}

/// Production [`Executor`] that spawns real processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

/// Execute a command and return the result, bailing on non-zero exit.
fn execute_checked(mut cmd: Command, label: &str) -> Result<ExecResult> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to execute: {label}"))?;
    let result = ExecResult::from(output);
    if !result.success {
        bail!(
            "{label} failed (exit {}): {}",
            result.code.unwrap_or(-1),
            result.stderr.trim()
        );
    }
    Ok(result)
}

/// Execute a command and return the result regardless of exit status.
fn execute_unchecked(mut cmd: Command, label: &str) -> Result<ExecResult> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to execute: {label}"))?;
    Ok(ExecResult::from(output))
}

impl Executor for SystemExecutor {
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        execute_checked(cmd, program)
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        execute_unchecked(cmd, program)
    }

    fn run_in_unchecked(&self, dir: &Path, program: &str, args: &[&str]) -> Result<ExecResult> {
        let mut cmd = Command::new(program);
        cmd.args(args).current_dir(dir);
        execute_unchecked(cmd, &format!("{program} in {}", dir.display()))
    }

    fn capture_with_env(
        &self,
        program: &str,
        args: &[&str],
        env: &LaunchEnv,
    ) -> Result<ExecResult> {
        let mut cmd = Command::new(program);
        cmd.args(args).env_clear().envs(env.iter());
        execute_unchecked(cmd, program)
    }

    fn run_interactive(
        &self,
        dir: Option<&Path>,
        program: &str,
        args: &[&str],
        env: &LaunchEnv,
    ) -> Result<ExitInfo> {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .env_clear()
            .envs(env.iter())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if let Some(dir) = dir {
            cmd.current_dir(dir);
        }
        let status = cmd
            .status()
            .with_context(|| format!("failed to execute: {program}"))?;
        Ok(ExitInfo {
            success: status.success(),
            code: status.code(),
        })
    }

    fn which(&self, program: &str, env: &LaunchEnv) -> Option<PathBuf> {
        let cwd = std::env::current_dir().ok()?;
        which::which_in(program, Some(env.search_path()), cwd).ok()
    }
}
