//! Configuration: optional TOML settings plus the paths derived from them.
pub mod toml_loader;

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::env::LaunchEnv;
use crate::error::ConfigError;
use crate::platform::{Os, Platform};

/// Variable that overrides the config file location.
pub const CONFIG_ENV_VAR: &str = "DASHBOARD_BOOTSTRAP_CONFIG";

/// Application directory name used under config and cache roots.
pub const APP_DIR: &str = "dashboard-bootstrap";

const DEFAULT_REPOSITORY_URL: &str =
    "https://github.com/ai-headcount-tracker/ai-headcount-tracker.git";

/// Settings read from `config.toml`.  Every field has a default.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// `[workspace]` section.
    pub workspace: WorkspaceSettings,
    /// `[runtime]` section.
    pub runtime: RuntimeSettings,
    /// `[environment]` section.
    pub environment: EnvironmentSettings,
    /// `[repository]` section.
    pub repository: RepositorySettings,
    /// `[dependencies]` section.
    pub dependencies: DependencySettings,
    /// `[dashboard]` section.
    pub dashboard: DashboardSettings,
    /// `[shortcut]` section.
    pub shortcut: ShortcutSettings,
}

/// Working directory under the user profile root.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct WorkspaceSettings {
    /// Directory name created under the profile root.
    pub dir_name: String,
}

impl Default for WorkspaceSettings {
    fn default() -> Self {
        Self {
            dir_name: "AIProjects".to_string(),
        }
    }
}

/// Interpreter probing and installation.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeSettings {
    /// Interpreter command; `None` uses the platform default.
    pub command: Option<String>,
    /// Pinned `major.minor` version installed when the interpreter is missing.
    pub version: String,
    /// winget package identifier; `None` derives it from `version`.
    pub package_id: Option<String>,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            command: None,
            version: "3.11".to_string(),
            package_id: None,
        }
    }
}

/// Virtual environment location.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct EnvironmentSettings {
    /// Directory name of the virtual environment inside the working directory.
    pub name: String,
}

impl Default for EnvironmentSettings {
    fn default() -> Self {
        Self {
            name: "venv".to_string(),
        }
    }
}

/// Repository to check out.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RepositorySettings {
    /// Clone URL.
    pub url: String,
    /// Checkout directory name; `None` derives it from the URL.
    pub name: Option<String>,
}

impl Default for RepositorySettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_REPOSITORY_URL.to_string(),
            name: None,
        }
    }
}

/// Dependency manifest.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DependencySettings {
    /// Manifest file name in the checkout root.
    pub manifest: String,
}

impl Default for DependencySettings {
    fn default() -> Self {
        Self {
            manifest: "requirements.txt".to_string(),
        }
    }
}

/// Entry-point discovery and launch.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardSettings {
    /// Source file extension, without the dot.
    pub extension: String,
    /// Conventional entry-point names in priority order (case-sensitive).
    pub entry_points: Vec<String>,
    /// Substrings identifying a file that imports the dashboard framework.
    pub import_signatures: Vec<String>,
    /// Port passed to the dashboard server.
    pub port: u16,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            extension: "py".to_string(),
            entry_points: ["app.py", "main.py", "streamlit_app.py", "dashboard.py", "Home.py"]
                .map(String::from)
                .to_vec(),
            import_signatures: vec!["import streamlit".to_string(), "from streamlit".to_string()],
            port: 8501,
        }
    }
}

/// Shell shortcut registration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ShortcutSettings {
    /// Function name registered in the shell profile.
    pub name: String,
    /// Whether to register the shortcut at all.
    pub enabled: bool,
}

impl Default for ShortcutSettings {
    fn default() -> Self {
        Self {
            name: "headcount".to_string(),
            enabled: true,
        }
    }
}

impl Settings {
    /// Reject values the pipeline cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for the first offending value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_name("workspace.dir_name", &self.workspace.dir_name)?;
        check_name("environment.name", &self.environment.name)?;
        check_name("dependencies.manifest", &self.dependencies.manifest)?;
        check_name("shortcut.name", &self.shortcut.name)?;
        if let Some(name) = &self.repository.name {
            check_name("repository.name", name)?;
        }
        if self.repository.url.trim().is_empty() {
            return Err(invalid("repository.url", "must not be empty"));
        }
        if self.dashboard.port == 0 {
            return Err(invalid("dashboard.port", "must be non-zero"));
        }
        let ext = &self.dashboard.extension;
        if ext.is_empty() || ext.contains('.') {
            return Err(invalid(
                "dashboard.extension",
                "must be a bare extension such as \"py\"",
            ));
        }
        if !self
            .shortcut
            .name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(invalid(
                "shortcut.name",
                "may only contain letters, digits, '_' and '-'",
            ));
        }
        Ok(())
    }

    /// Checkout directory name, explicit or derived from the URL.
    #[must_use]
    pub fn repository_name(&self) -> String {
        self.repository
            .name
            .clone()
            .unwrap_or_else(|| repo_name_from_url(&self.repository.url))
    }

    /// Interpreter command for `platform`.
    #[must_use]
    pub fn python_command(&self, platform: &Platform) -> String {
        self.runtime
            .command
            .clone()
            .unwrap_or_else(|| platform.default_python().to_string())
    }
}

fn invalid(key: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn check_name(key: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(invalid(key, "must not be empty"));
    }
    if value.contains(['/', '\\']) || value == "." || value == ".." {
        return Err(invalid(key, "must be a single path component"));
    }
    Ok(())
}

/// Derive a checkout directory name from a clone URL.
///
/// Takes the last path segment and strips a trailing `.git`, so both
/// `https://host/org/repo.git` and `git@host:org/repo` yield `repo`.
#[must_use]
pub fn repo_name_from_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    let last = trimmed
        .rsplit(['/', ':', '\\'])
        .next()
        .unwrap_or(trimmed);
    let name = last.strip_suffix(".git").unwrap_or(last);
    if name.is_empty() {
        "repository".to_string()
    } else {
        name.to_string()
    }
}

/// Resolved configuration: settings plus every path the pipeline touches.
#[derive(Debug, Clone)]
pub struct Config {
    /// Settings as loaded (or defaulted).
    pub settings: Settings,
    /// Config file that was read, if one existed.
    pub source: Option<PathBuf>,
    /// User profile root (`HOME` / `USERPROFILE`).
    pub profile_root: PathBuf,
    /// Working directory `<profile-root>/<dir_name>`.
    pub workdir: PathBuf,
    /// Virtual environment directory.
    pub venv: PathBuf,
    /// Repository checkout directory.
    pub checkout: PathBuf,
}

impl Config {
    /// Resolve paths for already-loaded settings.
    #[must_use]
    pub fn resolve(settings: Settings, profile_root: PathBuf, source: Option<PathBuf>) -> Self {
        let workdir = profile_root.join(&settings.workspace.dir_name);
        let venv = workdir.join(&settings.environment.name);
        let checkout = workdir.join(settings.repository_name());
        Self {
            settings,
            source,
            profile_root,
            workdir,
            venv,
            checkout,
        }
    }

    /// Load settings from the first config file found and resolve paths.
    ///
    /// Lookup order: `explicit`, then `$DASHBOARD_BOOTSTRAP_CONFIG`, then the
    /// per-user config directory.  An explicitly named file must exist; the
    /// default location may be absent, in which case defaults apply.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile root cannot be determined, or a config
    /// file cannot be read, parsed or validated.
    pub fn load(
        explicit: Option<&Path>,
        env: &LaunchEnv,
        platform: &Platform,
    ) -> Result<Self, ConfigError> {
        let profile_root = profile_root(env, platform)?;
        let named = explicit
            .map(Path::to_path_buf)
            .or_else(|| env.get(CONFIG_ENV_VAR).map(PathBuf::from));

        let path = match named {
            Some(path) if !path.exists() => {
                return Err(ConfigError::Io {
                    path: path.display().to_string(),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                });
            }
            Some(path) => path,
            None => default_config_path(env, platform, &profile_root),
        };

        let settings: Settings = toml_loader::load_config(&path)?;
        settings.validate()?;
        let source = path.exists().then_some(path);
        Ok(Self::resolve(settings, profile_root, source))
    }
}

/// Determine the user profile root from `env`.
///
/// # Errors
///
/// Returns an error if neither the platform's profile variable nor `HOME` is set.
pub fn profile_root(env: &LaunchEnv, platform: &Platform) -> Result<PathBuf, ConfigError> {
    env.get(platform.home_var())
        .or_else(|| env.get("HOME"))
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| {
            invalid(
                platform.home_var(),
                "environment variable is not set; cannot locate the profile root",
            )
        })
}

/// Default config file location for `platform`.
#[must_use]
pub fn default_config_path(env: &LaunchEnv, platform: &Platform, profile_root: &Path) -> PathBuf {
    let base = match platform.os {
        Os::Windows => env
            .get("APPDATA")
            .map_or_else(|| profile_root.join("AppData").join("Roaming"), PathBuf::from),
        Os::Linux | Os::MacOs => env
            .get("XDG_CONFIG_HOME")
            .filter(|v| !v.is_empty())
            .map_or_else(|| profile_root.join(".config"), PathBuf::from),
    };
    base.join(APP_DIR).join("config.toml")
}
