//! Explicit process environment handed to launched tools.
//!
//! The provisioner never mutates its own environment.  A [`LaunchEnv`] is
//! snapshotted once at startup and every later adjustment (activation,
//! search-path refresh) produces a new value derived from the previous one.

use std::collections::BTreeMap;
use std::path::Path;

/// Name of the variable marking an active virtual environment.
pub const VIRTUAL_ENV: &str = "VIRTUAL_ENV";

/// Ordered mapping of environment variable names to values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchEnv {
    vars: BTreeMap<String, String>,
}

impl LaunchEnv {
    /// Snapshot the current process environment.
    ///
    /// Variables whose name or value is not valid Unicode are dropped.
    #[must_use]
    pub fn from_process() -> Self {
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }

    /// Build an environment from a dump printed by `env -0`, `env` or `set`.
    ///
    /// A dump containing NUL bytes is split on NUL, so values spanning
    /// several lines (exported shell functions) survive intact.  Otherwise
    /// it is read line by line and continuation lines of multi-line values
    /// are dropped.  Entries without `=`, or whose key is empty or contains
    /// whitespace, are ignored.
    #[must_use]
    pub fn parse_dump(dump: &str) -> Self {
        let separator = if dump.contains('\0') { '\0' } else { '\n' };
        dump.split(separator)
            .map(|entry| entry.trim_end_matches('\r'))
            .filter_map(|entry| {
                let (key, value) = entry.split_once('=')?;
                let valid = !key.is_empty() && !key.chars().any(char::is_whitespace);
                valid.then(|| (key.to_string(), value.to_string()))
            })
            .collect()
    }

    /// Look up a variable.
    ///
    /// On Windows names compare case-insensitively, as the OS does.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.resolve_key(name)
            .and_then(|key| self.vars.get(key))
            .map(String::as_str)
    }

    /// Return a copy with `name` set to `value`.
    #[must_use]
    pub fn with_var(&self, name: &str, value: &str) -> Self {
        let mut next = self.clone();
        let key = next
            .resolve_key(name)
            .map_or_else(|| name.to_string(), str::to_string);
        next.vars.insert(key, value.to_string());
        next
    }

    /// Return a copy without `name`.
    #[must_use]
    pub fn without_var(&self, name: &str) -> Self {
        let mut next = self.clone();
        if let Some(key) = self.resolve_key(name) {
            next.vars.remove(key);
        }
        next
    }

    /// Name under which the search path is stored (`PATH`, or `Path` on Windows).
    #[must_use]
    pub fn path_key(&self) -> &str {
        self.resolve_key("PATH").unwrap_or("PATH")
    }

    /// Current search path value, empty if unset.
    #[must_use]
    pub fn search_path(&self) -> &str {
        self.get("PATH").unwrap_or_default()
    }

    /// Return a copy whose search path starts with `dir`.
    ///
    /// If `dir` is already the first entry the copy is identical.
    #[must_use]
    pub fn with_path_prepended(&self, dir: &Path) -> Self {
        let dir = dir.to_string_lossy();
        let current = self.search_path();
        let first = std::env::split_paths(current).next();
        if first.is_some_and(|p| p == Path::new(dir.as_ref())) {
            return self.clone();
        }
        let value = if current.is_empty() {
            dir.into_owned()
        } else {
            format!("{dir}{}{current}", path_separator())
        };
        let key = self.path_key().to_string();
        self.with_var(&key, &value)
    }

    /// Iterate over all variables in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether no variables are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    fn resolve_key(&self, name: &str) -> Option<&str> {
        if let Some((key, _)) = self.vars.get_key_value(name) {
            return Some(key.as_str());
        }
        if cfg!(windows) {
            return self
                .vars
                .keys()
                .find(|k| k.eq_ignore_ascii_case(name))
                .map(String::as_str);
        }
        None
    }
}

impl FromIterator<(String, String)> for LaunchEnv {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().collect(),
        }
    }
}

/// Separator between search-path entries on this platform.
#[must_use]
pub const fn path_separator() -> char {
    if cfg!(windows) { ';' } else { ':' }
}
