//! Shell-profile shortcut that re-runs the bootstrap from the working directory.
//!
//! The profile is parsed into [`Registration`] records keyed by name, so an
//! existing function or alias with the shortcut's name (whoever wrote it)
//! prevents a second registration.
use anyhow::{Context as _, Result};
use std::io::Write as _;
use std::path::{Path, PathBuf};

use super::{Applicable, Resource, ResourceChange, ResourceState, fs};
use crate::env::LaunchEnv;
use crate::platform::Platform;

/// First line of the block this tool appends.
pub const BLOCK_START: &str = "# >>> dashboard-bootstrap >>>";
/// Last line of the block this tool appends.
pub const BLOCK_END: &str = "# <<< dashboard-bootstrap <<<";

/// Syntax family of a shell profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellFlavor {
    /// bash / zsh.
    Posix,
    /// Windows PowerShell.
    PowerShell,
}

/// How a name is registered in a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationKind {
    /// `function NAME`, `NAME()`.
    Function,
    /// `alias NAME=`, `Set-Alias NAME`.
    Alias,
}

/// One function or alias definition found in a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Registered name.
    pub name: String,
    /// Definition form.
    pub kind: RegistrationKind,
    /// 1-based line number.
    pub line: usize,
}

/// Parse every function and alias definition in `content`.
///
/// Recognised forms: `function NAME`, `NAME()` / `NAME ()`, `alias NAME=`,
/// `Set-Alias NAME` and `Set-Alias -Name NAME`.  Comment lines are ignored.
#[must_use]
pub fn parse_registrations(content: &str) -> Vec<Registration> {
    content
        .lines()
        .enumerate()
        .filter_map(|(idx, raw)| {
            let (name, kind) = parse_line(raw.trim())?;
            Some(Registration {
                name,
                kind,
                line: idx + 1,
            })
        })
        .collect()
}

fn parse_line(line: &str) -> Option<(String, RegistrationKind)> {
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let (first, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(f, r)| (f, r.trim_start()));

    if first.eq_ignore_ascii_case("function") {
        let name = take_name(rest, &['(', '{']);
        return (!name.is_empty()).then(|| (name, RegistrationKind::Function));
    }
    if first == "alias" {
        let (name, _) = rest.split_once('=')?;
        let name = unquote(name.trim());
        return (!name.is_empty()).then(|| (name, RegistrationKind::Alias));
    }
    if first.eq_ignore_ascii_case("set-alias") {
        let mut tokens = rest.split_whitespace();
        let mut token = tokens.next()?;
        if token.eq_ignore_ascii_case("-name") {
            token = tokens.next()?;
        }
        let name = unquote(token);
        return (!name.is_empty()).then(|| (name, RegistrationKind::Alias));
    }
    // POSIX `NAME()` or `NAME ()`.
    let (head, tail) = line.split_once('(')?;
    let head = head.trim_end();
    let valid = !head.is_empty() && head.chars().all(is_name_char);
    (valid && tail.trim_start().starts_with(')'))
        .then(|| (head.to_string(), RegistrationKind::Function))
}

fn take_name(s: &str, terminators: &[char]) -> String {
    let end = s
        .find(|c: char| c.is_whitespace() || terminators.contains(&c))
        .unwrap_or(s.len());
    s.get(..end).map(unquote).unwrap_or_default()
}

fn unquote(s: &str) -> String {
    s.trim_matches(['\'', '"']).to_string()
}

const fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')
}

/// Profile file the shortcut is written to, and its syntax.
///
/// Windows uses the Windows PowerShell profile under `Documents`; elsewhere
/// `~/.zshrc` when `$SHELL` is zsh, otherwise `~/.bashrc`.
#[must_use]
pub fn profile_path(platform: &Platform, env: &LaunchEnv, home: &Path) -> (PathBuf, ShellFlavor) {
    if platform.is_windows() {
        let path = home
            .join("Documents")
            .join("WindowsPowerShell")
            .join("Microsoft.PowerShell_profile.ps1");
        return (path, ShellFlavor::PowerShell);
    }
    let zsh = env.get("SHELL").is_some_and(|s| s.ends_with("zsh"));
    let file = if zsh { ".zshrc" } else { ".bashrc" };
    (home.join(file), ShellFlavor::Posix)
}

/// Render the fenced profile block defining `name`.
///
/// The function changes into `workdir` and re-runs `exe`, forwarding its
/// arguments.
#[must_use]
pub fn render_block(flavor: ShellFlavor, name: &str, workdir: &Path, exe: &Path) -> String {
    let workdir = workdir.display().to_string();
    let exe = exe.display().to_string();
    match flavor {
        ShellFlavor::Posix => format!(
            "{BLOCK_START}\n\
             {name}() {{\n    cd {} && {} \"$@\"\n}}\n\
             {BLOCK_END}\n",
            posix_quote(&workdir),
            posix_quote(&exe),
        ),
        ShellFlavor::PowerShell => format!(
            "{BLOCK_START}\n\
             function {name} {{\n    Set-Location -LiteralPath {}\n    & {} @args\n}}\n\
             {BLOCK_END}\n",
            powershell_quote(&workdir),
            powershell_quote(&exe),
        ),
    }
}

fn posix_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

fn powershell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// A named shortcut registered in a shell profile.
#[derive(Debug, Clone)]
pub struct ShortcutResource {
    /// Profile file path.
    pub profile: PathBuf,
    /// Shortcut name.
    pub name: String,
    /// Block appended when the name is not yet registered.
    pub block: String,
}

impl ShortcutResource {
    /// Create a shortcut resource.
    #[must_use]
    pub const fn new(profile: PathBuf, name: String, block: String) -> Self {
        Self {
            profile,
            name,
            block,
        }
    }

    /// Registrations currently present in the profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile exists but cannot be read.
    pub fn registrations(&self) -> Result<Vec<Registration>> {
        if !self.profile.exists() {
            return Ok(Vec::new());
        }
        let bytes = std::fs::read(&self.profile)
            .with_context(|| format!("reading {}", self.profile.display()))?;
        Ok(parse_registrations(&String::from_utf8_lossy(&bytes)))
    }
}

impl Applicable for ShortcutResource {
    fn description(&self) -> String {
        format!("{} in {}", self.name, self.profile.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        fs::ensure_parent_dir(&self.profile)?;
        let needs_newline = std::fs::read(&self.profile)
            .ok()
            .is_some_and(|b| b.last().is_some_and(|&c| c != b'\n'));
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.profile)
            .with_context(|| format!("opening {}", self.profile.display()))?;
        let prefix = if needs_newline { "\n" } else { "" };
        write!(file, "{prefix}\n{}", self.block)
            .with_context(|| format!("writing {}", self.profile.display()))?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for ShortcutResource {
    fn current_state(&self) -> Result<ResourceState> {
        let registrations = self.registrations()?;
        Ok(if registrations.iter().any(|r| r.name == self.name) {
            ResourceState::Correct
        } else {
            ResourceState::Missing
        })
    }
}
