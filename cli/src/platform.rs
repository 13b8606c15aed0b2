use std::fmt;
use std::path::{Path, PathBuf};

/// Detected operating system platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    /// Linux and other Unix-likes without a dedicated variant.
    Linux,
    /// macOS.
    MacOs,
    /// Windows.
    Windows,
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linux => write!(f, "linux"),
            Self::MacOs => write!(f, "macos"),
            Self::Windows => write!(f, "windows"),
        }
    }
}

/// Platform information for the current system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    /// Operating system family.
    pub os: Os,
}

impl Platform {
    /// Detect the current platform.
    #[must_use]
    pub const fn detect() -> Self {
        let os = if cfg!(target_os = "windows") {
            Os::Windows
        } else if cfg!(target_os = "macos") {
            Os::MacOs
        } else {
            Os::Linux
        };
        Self { os }
    }

    /// Create a platform with an explicit OS (for testing and cross-platform rendering).
    #[must_use]
    pub const fn new(os: Os) -> Self {
        Self { os }
    }

    /// Whether this is Windows.
    #[must_use]
    pub const fn is_windows(&self) -> bool {
        matches!(self.os, Os::Windows)
    }

    /// Default interpreter command probed on this platform.
    #[must_use]
    pub const fn default_python(&self) -> &'static str {
        if self.is_windows() { "python" } else { "python3" }
    }

    /// Directory inside a virtual environment that holds its executables.
    #[must_use]
    pub fn venv_bin_dir(&self, venv: &Path) -> PathBuf {
        if self.is_windows() {
            venv.join("Scripts")
        } else {
            venv.join("bin")
        }
    }

    /// Interpreter executable inside a virtual environment.
    #[must_use]
    pub fn venv_python(&self, venv: &Path) -> PathBuf {
        let exe = if self.is_windows() { "python.exe" } else { "python" };
        self.venv_bin_dir(venv).join(exe)
    }

    /// Name of the user-profile-root variable.
    #[must_use]
    pub const fn home_var(&self) -> &'static str {
        if self.is_windows() { "USERPROFILE" } else { "HOME" }
    }
}
