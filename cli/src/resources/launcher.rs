//! Dashboard launch and operator-interrupt tracking.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::env::LaunchEnv;
use crate::exec::{Executor, ExitInfo};

/// Runs the dashboard server against a selected entry point.
#[derive(Debug, Clone)]
pub struct DashboardLauncher {
    /// Environment interpreter.
    pub python: PathBuf,
    /// Checkout root the server runs in.
    pub root: PathBuf,
    /// Entry-point file name, relative to `root`.
    pub entry: String,
    /// Server port.
    pub port: u16,
}

impl DashboardLauncher {
    /// Arguments passed to the interpreter.
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        run_args(&self.entry, self.port)
    }

    /// Human-readable command line.
    #[must_use]
    pub fn command_line(&self) -> String {
        command_line(&self.python, &self.entry, self.port)
    }

    /// Run the server with inherited stdio, blocking until it exits.
    ///
    /// # Errors
    ///
    /// Returns an error if the interpreter cannot be spawned.
    pub fn launch(&self, executor: &dyn Executor, env: &LaunchEnv) -> Result<ExitInfo> {
        let args = self.args();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        executor.run_interactive(Some(&self.root), &self.python.to_string_lossy(), &args, env)
    }
}

fn run_args(entry: &str, port: u16) -> Vec<String> {
    vec![
        "-m".to_string(),
        "streamlit".to_string(),
        "run".to_string(),
        entry.to_string(),
        "--server.port".to_string(),
        port.to_string(),
    ]
}

fn command_line(python: &Path, entry: &str, port: u16) -> String {
    std::iter::once(python.display().to_string())
        .chain(run_args(entry, port))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Guidance shown when no entry point could be selected.
#[must_use]
pub fn manual_launch_instructions(
    python: &Path,
    root: &Path,
    candidates: &[String],
    port: u16,
) -> Vec<String> {
    let mut lines = vec![format!(
        "no entry point found among {} candidate file(s) in {}:",
        candidates.len(),
        root.display()
    )];
    lines.extend(candidates.iter().map(|c| format!("  {c}")));
    lines.push("start the dashboard manually from that directory with:".to_string());
    lines.push(format!("  {}", command_line(python, "<file>", port)));
    lines
}

/// Tracks whether the operator interrupted the launched process.
pub trait InterruptWatch: Send + Sync + std::fmt::Debug {
    /// Start watching for interrupts.  Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the watcher cannot be installed.
    fn arm(&self) -> Result<()>;

    /// Whether an interrupt arrived since [`arm`](Self::arm).
    fn interrupted(&self) -> bool;
}

/// [`InterruptWatch`] backed by a process-wide Ctrl-C handler.
///
/// Once armed, Ctrl-C no longer terminates this process; it reaches the
/// foreground child (which shares the console) and is recorded here.
#[derive(Debug, Default)]
pub struct CtrlCWatch {
    flag: Arc<AtomicBool>,
    armed: AtomicBool,
}

impl InterruptWatch for CtrlCWatch {
    fn arm(&self) -> Result<()> {
        if self.armed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let flag = Arc::clone(&self.flag);
        ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
            .context("installing interrupt handler")
    }

    fn interrupted(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
