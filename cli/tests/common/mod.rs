// Shared helpers for integration tests.
//
// Provides a temporary profile root, a fake system that plays the part of
// Python, pip, git and the dashboard server, and a fluent builder so each
// integration test can set up an isolated run without repeating filesystem
// boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use dashboard_bootstrap::cli::GlobalOpts;
use dashboard_bootstrap::commands::provision::{self, Host};
use dashboard_bootstrap::env::LaunchEnv;
use dashboard_bootstrap::exec::{ExecResult, Executor, ExitInfo};
use dashboard_bootstrap::logging::Logger;
use dashboard_bootstrap::platform::{Os, Platform};
use dashboard_bootstrap::resources::launcher::InterruptWatch;
use dashboard_bootstrap::tasks::Outcome;

/// Name of the checkout directory for the default repository URL.
pub const CHECKOUT: &str = "ai-headcount-tracker";

/// Executor standing in for the tools the bootstrapper drives.
///
/// `git clone` materialises the configured repository files, `-m venv`
/// creates the environment layout, and everything else succeeds unless a
/// reply override matches the command line.
#[derive(Debug, Default)]
pub struct FakeSystem {
    tools: BTreeSet<String>,
    repo_files: Vec<(String, String)>,
    replies: Vec<(String, bool, String)>,
    calls: Mutex<Vec<String>>,
}

impl FakeSystem {
    /// Every command line issued so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        self.calls.lock().expect("calls lock").clear();
    }

    /// Whether any command line contains `pattern`.
    pub fn called(&self, pattern: &str) -> bool {
        self.calls().iter().any(|c| c.contains(pattern))
    }

    fn respond(&self, program: &str, args: &[&str]) -> (bool, String) {
        let line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.calls.lock().expect("calls lock").push(line.clone());

        if let Some((_, ok, out)) = self.replies.iter().find(|(p, _, _)| line.contains(p.as_str())) {
            return (*ok, out.clone());
        }

        match args {
            ["--version"] => (true, "Python 3.11.9\n".to_string()),
            ["-m", "venv", path] => {
                let bin = Path::new(path).join("bin");
                std::fs::create_dir_all(&bin).expect("create venv bin");
                std::fs::write(bin.join("python"), "").expect("write venv python");
                (true, String::new())
            }
            ["clone", _, path] => {
                let root = Path::new(path);
                std::fs::create_dir_all(root.join(".git")).expect("create .git");
                for (name, content) in &self.repo_files {
                    std::fs::write(root.join(name), content).expect("write repo file");
                }
                (true, String::new())
            }
            ["status"] => (true, "On branch main\nnothing to commit\n".to_string()),
            ["pull", ..] => (true, "Already up to date.\n".to_string()),
            _ => (true, String::new()),
        }
    }

    fn result(&self, program: &str, args: &[&str]) -> ExecResult {
        let (success, stdout) = self.respond(program, args);
        ExecResult {
            stdout: if success { stdout.clone() } else { String::new() },
            stderr: if success { String::new() } else { stdout },
            success,
            code: Some(i32::from(!success)),
        }
    }
}

impl Executor for FakeSystem {
    fn run(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        let result = self.result(program, args);
        if !result.success {
            anyhow::bail!("{program} failed: {}", result.stderr.trim());
        }
        Ok(result)
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        Ok(self.result(program, args))
    }

    fn run_in_unchecked(
        &self,
        _dir: &Path,
        program: &str,
        args: &[&str],
    ) -> anyhow::Result<ExecResult> {
        Ok(self.result(program, args))
    }

    fn capture_with_env(
        &self,
        program: &str,
        args: &[&str],
        _env: &LaunchEnv,
    ) -> anyhow::Result<ExecResult> {
        Ok(self.result(program, args))
    }

    fn run_interactive(
        &self,
        _dir: Option<&Path>,
        program: &str,
        args: &[&str],
        _env: &LaunchEnv,
    ) -> anyhow::Result<ExitInfo> {
        let (success, _) = self.respond(program, args);
        Ok(ExitInfo {
            success,
            code: Some(i32::from(!success)),
        })
    }

    fn which(&self, program: &str, _env: &LaunchEnv) -> Option<PathBuf> {
        self.tools
            .contains(program)
            .then(|| PathBuf::from("/usr/bin").join(program))
    }
}

/// Interrupt watch that never fires.
#[derive(Debug, Default)]
pub struct NoInterrupt {
    armed: AtomicBool,
}

impl InterruptWatch for NoInterrupt {
    fn arm(&self) -> anyhow::Result<()> {
        self.armed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn interrupted(&self) -> bool {
        false
    }
}

/// An isolated profile root backed by a [`tempfile::TempDir`].
pub struct IntegrationTestContext {
    /// Temporary directory holding `home/` and `config/`.
    pub root: tempfile::TempDir,
    /// The fake system all commands go to.
    pub system: Arc<FakeSystem>,
}

impl IntegrationTestContext {
    /// Profile root handed to the bootstrapper.
    pub fn home(&self) -> PathBuf {
        self.root.path().join("home")
    }

    /// Working directory inside the profile root.
    pub fn workdir(&self) -> PathBuf {
        self.home().join("AIProjects")
    }

    /// Repository checkout directory.
    pub fn checkout(&self) -> PathBuf {
        self.workdir().join(CHECKOUT)
    }

    /// Environment snapshot for a run.
    pub fn env(&self) -> LaunchEnv {
        LaunchEnv::default()
            .with_var("PATH", "/usr/bin:/bin")
            .with_var("HOME", &self.home().display().to_string())
            .with_var(
                "XDG_CONFIG_HOME",
                &self.root.path().join("config").display().to_string(),
            )
    }

    /// Run the provision command with `global` options.
    pub fn run(&self, global: &GlobalOpts) -> (anyhow::Result<Outcome>, Arc<Logger>) {
        let log = Arc::new(Logger::with_log_file(None));
        let host = Host {
            env: self.env(),
            platform: Platform::new(Os::Linux),
            executor: Arc::clone(&self.system) as Arc<dyn Executor>,
            interrupt: Arc::new(NoInterrupt::default()),
            self_exe: PathBuf::from("/opt/bin/dashboard-bootstrap"),
        };
        (provision::run(global, host, &log), log)
    }

    /// Run with default options.
    pub fn run_default(&self) -> (anyhow::Result<Outcome>, Arc<Logger>) {
        self.run(&GlobalOpts::default())
    }

    /// Every file and directory under the profile root with file contents,
    /// sorted by relative path.
    pub fn tree(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        walk(&self.home(), &self.home(), &mut out);
        out.sort();
        out
    }
}

fn walk(base: &Path, dir: &Path, out: &mut Vec<(String, String)>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let rel = path
            .strip_prefix(base)
            .expect("under base")
            .display()
            .to_string();
        if path.is_dir() {
            out.push((rel, "<dir>".to_string()));
            walk(base, &path, out);
        } else {
            out.push((rel, std::fs::read_to_string(&path).unwrap_or_default()));
        }
    }
}

/// Fluent builder for [`IntegrationTestContext`].
pub struct TestContextBuilder {
    root: tempfile::TempDir,
    system: FakeSystem,
}

impl TestContextBuilder {
    /// Begin with an empty profile root and Python and git on the search path.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        std::fs::create_dir_all(root.path().join("home")).expect("create home");
        let mut system = FakeSystem::default();
        system.tools.insert("python3".to_string());
        system.tools.insert("git".to_string());
        Self { root, system }
    }

    /// Add a file the repository contains when cloned.
    pub fn with_repo_file(mut self, name: &str, content: &str) -> Self {
        self.system
            .repo_files
            .push((name.to_string(), content.to_string()));
        self
    }

    /// The standard dashboard repository: a manifest and `app.py`.
    pub fn with_dashboard_repo(self) -> Self {
        self.with_repo_file("requirements.txt", "streamlit==1.38.0\n")
            .with_repo_file("app.py", "import streamlit as st\n\nst.title(\"Headcount\")\n")
    }

    /// Write a file relative to the profile root before the run.
    pub fn with_home_file(self, rel: &str, content: &str) -> Self {
        let path = self.root.path().join("home").join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(path, content).expect("write home file");
        self
    }

    /// Write the default-location config file.
    pub fn with_config(self, content: &str) -> Self {
        let dir = self.root.path().join("config").join("dashboard-bootstrap");
        std::fs::create_dir_all(&dir).expect("create config dir");
        std::fs::write(dir.join("config.toml"), content).expect("write config");
        self
    }

    /// Reply to command lines containing `pattern`.
    pub fn with_reply(mut self, pattern: &str, success: bool, output: &str) -> Self {
        self.system
            .replies
            .push((pattern.to_string(), success, output.to_string()));
        self
    }

    /// Remove `tool` from the search path.
    pub fn without_tool(mut self, tool: &str) -> Self {
        self.system.tools.remove(tool);
        self
    }

    /// Finish building and return the configured context.
    pub fn build(self) -> IntegrationTestContext {
        IntegrationTestContext {
            root: self.root,
            system: Arc::new(self.system),
        }
    }
}
