//! Interpreter probing and installation through a system package manager.
use anyhow::Result;
use std::path::PathBuf;

use crate::env::LaunchEnv;
use crate::exec::{Executor, ExitInfo};
use crate::platform::{Os, Platform};

/// System package managers able to install the interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    /// Windows Package Manager.
    Winget,
    /// Homebrew.
    Brew,
    /// Debian/Ubuntu APT.
    AptGet,
    /// Fedora/RHEL DNF.
    Dnf,
    /// Arch Linux pacman.
    Pacman,
}

impl std::fmt::Display for PackageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.program())
    }
}

impl PackageManager {
    /// Executable name of the manager.
    #[must_use]
    pub const fn program(self) -> &'static str {
        match self {
            Self::Winget => "winget",
            Self::Brew => "brew",
            Self::AptGet => "apt-get",
            Self::Dnf => "dnf",
            Self::Pacman => "pacman",
        }
    }

    /// Managers tried on `platform`, in preference order.
    #[must_use]
    pub const fn candidates(platform: &Platform) -> &'static [Self] {
        match platform.os {
            Os::Windows => &[Self::Winget],
            Os::MacOs => &[Self::Brew],
            Os::Linux => &[Self::AptGet, Self::Dnf, Self::Pacman],
        }
    }

    /// First candidate manager resolvable on the search path in `env`.
    #[must_use]
    pub fn detect(executor: &dyn Executor, env: &LaunchEnv, platform: &Platform) -> Option<Self> {
        Self::candidates(platform)
            .iter()
            .copied()
            .find(|m| executor.which(m.program(), env).is_some())
    }

    /// Whether installs through this manager need root privileges.
    #[must_use]
    pub const fn needs_root(self) -> bool {
        matches!(self, Self::AptGet | Self::Dnf | Self::Pacman)
    }

    /// Arguments (after the program name) installing `version`.
    ///
    /// `package_id` overrides the winget identifier; other managers derive
    /// their package name from `version`.
    #[must_use]
    pub fn install_args(self, version: &str, package_id: Option<&str>) -> Vec<String> {
        match self {
            Self::Winget => {
                let id = package_id.map_or_else(|| format!("Python.Python.{version}"), String::from);
                vec![
                    "install".into(),
                    "--id".into(),
                    id,
                    "--exact".into(),
                    "--source".into(),
                    "winget".into(),
                    "--accept-source-agreements".into(),
                    "--accept-package-agreements".into(),
                ]
            }
            Self::Brew => vec!["install".into(), format!("python@{version}")],
            Self::AptGet => vec![
                "install".into(),
                "-y".into(),
                format!("python{version}"),
                format!("python{version}-venv"),
            ],
            Self::Dnf => vec!["install".into(), "-y".into(), format!("python{version}")],
            Self::Pacman => vec![
                "-S".into(),
                "--needed".into(),
                "--noconfirm".into(),
                "python".into(),
            ],
        }
    }
}

/// A resolved, working interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeProbe {
    /// Absolute path of the interpreter.
    pub path: PathBuf,
    /// Version banner printed by `--version`.
    pub version: String,
}

/// Interpreter to probe and, when missing, install.
#[derive(Debug)]
pub struct PythonRuntime<'a> {
    /// Command name looked up on the search path.
    pub command: String,
    /// Pinned `major.minor` version.
    pub version: String,
    /// Optional winget identifier override.
    pub package_id: Option<String>,
    /// Platform being provisioned.
    pub platform: Platform,
    /// Executor used to run commands.
    pub executor: &'a dyn Executor,
}

impl PythonRuntime<'_> {
    /// Resolve the interpreter in `env` and check that it runs.
    ///
    /// The first of [`Self::candidate_commands`] that runs wins.
    ///
    /// A command that resolves but fails `--version` (such as the Windows
    /// store alias stub) counts as absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the resolved interpreter cannot be spawned.
    pub fn probe(&self, env: &LaunchEnv) -> Result<Option<RuntimeProbe>> {
        for command in self.candidate_commands() {
            if let Some(found) = self.probe_command(&command, env)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// Commands probed in order: the configured one, then on Unix the
    /// version-suffixed name the distribution packages install.
    #[must_use]
    pub fn candidate_commands(&self) -> Vec<String> {
        let mut commands = vec![self.command.clone()];
        let versioned = format!("python{}", self.version);
        if self.platform.os != Os::Windows && versioned != self.command {
            commands.push(versioned);
        }
        commands
    }

    fn probe_command(&self, command: &str, env: &LaunchEnv) -> Result<Option<RuntimeProbe>> {
        let Some(path) = self.executor.which(command, env) else {
            return Ok(None);
        };
        let program = path.to_string_lossy();
        let result = self.executor.run_unchecked(&program, &["--version"])?;
        let version = result.combined_output().trim().to_string();
        if !result.success || version.is_empty() {
            return Ok(None);
        }
        Ok(Some(RuntimeProbe { path, version }))
    }

    /// Program and arguments that install the pinned version through `manager`.
    ///
    /// Root-requiring managers are wrapped in `sudo` when it is available.
    #[must_use]
    pub fn install_command(&self, manager: PackageManager, env: &LaunchEnv) -> (String, Vec<String>) {
        let args = manager.install_args(&self.version, self.package_id.as_deref());
        if manager.needs_root() && self.executor.which("sudo", env).is_some() {
            let mut wrapped = vec![manager.program().to_string()];
            wrapped.extend(args);
            ("sudo".to_string(), wrapped)
        } else {
            (manager.program().to_string(), args)
        }
    }

    /// Run the installer interactively so the operator sees its prompts.
    ///
    /// # Errors
    ///
    /// Returns an error if the installer cannot be spawned.
    pub fn install(&self, manager: PackageManager, env: &LaunchEnv) -> Result<ExitInfo> {
        let (program, args) = self.install_command(manager, env);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.executor.run_interactive(None, &program, &args, env)
    }

    /// Operator instructions when no package manager is available.
    #[must_use]
    pub fn manual_instructions(&self) -> String {
        let version = &self.version;
        match self.platform.os {
            Os::Windows => format!(
                "install Python {version} from https://www.python.org/downloads/windows/\n\
                 tick \"Add python.exe to PATH\" during setup, then open a new terminal"
            ),
            Os::MacOs => format!(
                "install Homebrew from https://brew.sh and run: brew install python@{version}\n\
                 or install Python {version} from https://www.python.org/downloads/macos/"
            ),
            Os::Linux => format!(
                "install Python {version} with your distribution's package manager\n\
                 make sure `{}` is on PATH, then run the bootstrap again",
                self.command
            ),
        }
    }
}

/// Re-read the search path after an installation.
///
/// On Windows installers update the machine and user `Path` in the registry,
/// which running processes never see; the returned environment carries the
/// fresh value.  Elsewhere the environment is returned unchanged.
#[must_use]
pub fn refresh_search_path(env: &LaunchEnv) -> LaunchEnv {
    #[cfg(windows)]
    {
        if let Some(path) = registry_search_path(env) {
            let key = env.path_key().to_string();
            return env.with_var(&key, &path);
        }
    }
    env.clone()
}

#[cfg(windows)]
fn registry_search_path(env: &LaunchEnv) -> Option<String> {
    use winreg::RegKey;
    use winreg::enums::{HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE};

    let machine: String = RegKey::predef(HKEY_LOCAL_MACHINE)
        .open_subkey(r"SYSTEM\CurrentControlSet\Control\Session Manager\Environment")
        .ok()?
        .get_value("Path")
        .ok()?;
    let user: Option<String> = RegKey::predef(HKEY_CURRENT_USER)
        .open_subkey("Environment")
        .ok()
        .and_then(|key| key.get_value("Path").ok());

    let combined = match user {
        Some(user) if !user.is_empty() => format!("{machine};{user}"),
        _ => machine,
    };
    Some(expand_percent_vars(&combined, env))
}

/// Expand `%NAME%` references using `env`; unknown names are left verbatim.
#[must_use]
pub fn expand_percent_vars(value: &str, env: &LaunchEnv) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some((before, after)) = rest.split_once('%') {
        out.push_str(before);
        if let Some((name, tail)) = after.split_once('%') {
            match env.get(name).filter(|_| !name.is_empty()) {
                Some(v) => out.push_str(v),
                None => {
                    out.push('%');
                    out.push_str(name);
                    out.push('%');
                }
            }
            rest = tail;
        } else {
            out.push('%');
            rest = after;
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::resources::test_helpers::{Reply, ScriptedExecutor};

    fn runtime(exec: &ScriptedExecutor, os: Os) -> PythonRuntime<'_> {
        PythonRuntime {
            command: "python3".to_string(),
            version: "3.11".to_string(),
            package_id: None,
            platform: Platform::new(os),
            executor: exec,
        }
    }

    #[test]
    fn probe_absent_when_not_on_path() {
        let exec = ScriptedExecutor::new();
        let probe = runtime(&exec, Os::Linux).probe(&LaunchEnv::default()).unwrap();
        assert!(probe.is_none());
        assert!(exec.lines().is_empty(), "nothing to run when unresolved");
    }

    #[test]
    fn probe_reads_version_banner() {
        let exec = ScriptedExecutor::new()
            .with_tool("python3")
            .on("--version", Reply::ok("Python 3.11.9\n"));
        let probe = runtime(&exec, Os::Linux)
            .probe(&LaunchEnv::default())
            .unwrap()
            .expect("runtime should be found");
        assert_eq!(probe.version, "Python 3.11.9");
        assert_eq!(probe.path, PathBuf::from("/usr/bin/python3"));
    }

    #[test]
    fn probe_treats_failing_stub_as_absent() {
        let exec = ScriptedExecutor::new()
            .with_tool("python3")
            .on("--version", Reply::fail("not installed"));
        assert!(runtime(&exec, Os::Linux).probe(&LaunchEnv::default()).unwrap().is_none());
    }

    #[test]
    fn versioned_command_found_when_default_is_absent() {
        let exec = ScriptedExecutor::new()
            .with_tool("python3.11")
            .on("--version", Reply::ok("Python 3.11.2\n"));
        let probe = runtime(&exec, Os::Linux)
            .probe(&LaunchEnv::default())
            .unwrap()
            .expect("versioned interpreter should be found");
        assert_eq!(probe.path, PathBuf::from("/usr/bin/python3.11"));
    }

    #[test]
    fn versioned_command_is_not_tried_on_windows() {
        let exec = ScriptedExecutor::new();
        let mut rt = runtime(&exec, Os::Windows);
        rt.command = "python".to_string();
        assert_eq!(rt.candidate_commands(), vec!["python".to_string()]);
        assert_eq!(
            runtime(&exec, Os::Linux).candidate_commands(),
            vec!["python3".to_string(), "python3.11".to_string()]
        );
    }

    #[test]
    fn detect_prefers_first_available_manager() {
        let exec = ScriptedExecutor::new().with_tool("dnf").with_tool("pacman");
        let found = PackageManager::detect(&exec, &LaunchEnv::default(), &Platform::new(Os::Linux));
        assert_eq!(found, Some(PackageManager::Dnf));
    }

    #[test]
    fn detect_none_without_manager() {
        let exec = ScriptedExecutor::new().with_tool("apt-get");
        let found =
            PackageManager::detect(&exec, &LaunchEnv::default(), &Platform::new(Os::Windows));
        assert_eq!(found, None);
    }

    #[test]
    fn winget_install_pins_version() {
        let args = PackageManager::Winget.install_args("3.11", None);
        assert!(args.contains(&"Python.Python.3.11".to_string()));
        let custom = PackageManager::Winget.install_args("3.11", Some("Custom.Python"));
        assert!(custom.contains(&"Custom.Python".to_string()));
    }

    #[test]
    fn root_managers_use_sudo_when_present() {
        let exec = ScriptedExecutor::new().with_tool("sudo");
        let (program, args) =
            runtime(&exec, Os::Linux).install_command(PackageManager::AptGet, &LaunchEnv::default());
        assert_eq!(program, "sudo");
        assert_eq!(args[0], "apt-get");
        assert!(args.contains(&"python3.11".to_string()));

        let bare = ScriptedExecutor::new();
        let (program, _) =
            runtime(&bare, Os::Linux).install_command(PackageManager::AptGet, &LaunchEnv::default());
        assert_eq!(program, "apt-get");
    }

    #[test]
    fn install_runs_interactively() {
        let exec = ScriptedExecutor::new();
        let info = runtime(&exec, Os::MacOs)
            .install(PackageManager::Brew, &LaunchEnv::default())
            .unwrap();
        assert!(info.success);
        assert_eq!(exec.lines(), vec!["brew install python@3.11"]);
        assert_eq!(exec.envs().len(), 1, "interactive calls carry the launch env");
    }

    #[test]
    fn manual_instructions_mention_version() {
        let exec = ScriptedExecutor::new();
        for os in [Os::Windows, Os::MacOs, Os::Linux] {
            assert!(runtime(&exec, os).manual_instructions().contains("3.11"));
        }
    }

    #[test]
    fn expand_percent_vars_substitutes_known_names() {
        let env = LaunchEnv::default().with_var("SystemRoot", r"C:\Windows");
        assert_eq!(
            expand_percent_vars(r"%SystemRoot%\system32;%UNKNOWN%\x;50%", &env),
            r"C:\Windows\system32;%UNKNOWN%\x;50%"
        );
    }

    #[test]
    fn refresh_keeps_env_off_windows() {
        let env = LaunchEnv::default().with_var("PATH", "/usr/bin");
        if !cfg!(windows) {
            assert_eq!(refresh_search_path(&env), env);
        }
    }
}
