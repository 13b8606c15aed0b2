//! Virtual-environment activation into an explicit [`LaunchEnv`].
//!
//! The activation script runs in a child shell whose resulting environment
//! is captured; nothing in this process changes.  When that fails, the same
//! effect is reproduced by hand.
use std::path::{Path, PathBuf};

use crate::env::{LaunchEnv, VIRTUAL_ENV};
use crate::error::ProvisionError;
use crate::exec::Executor;
use crate::platform::Platform;

/// How the activated environment was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationMethod {
    /// The environment's own activation script.
    Script,
    /// Search-path prepend and `VIRTUAL_ENV` set by hand.
    Manual,
}

/// Activation script shipped inside the environment.
#[must_use]
pub fn activation_script(platform: &Platform, venv: &Path) -> PathBuf {
    let script = if platform.is_windows() {
        "activate.bat"
    } else {
        "activate"
    };
    platform.venv_bin_dir(venv).join(script)
}

/// Program and arguments that source the activation script and dump the
/// resulting environment.
///
/// On Unix the dump is NUL-separated (`env -0`) when the `env` in use
/// supports it, so multi-line values stay whole.
#[must_use]
pub fn capture_command(platform: &Platform, venv: &Path) -> (String, Vec<String>) {
    let script = activation_script(platform, venv);
    if platform.is_windows() {
        (
            "cmd".to_string(),
            vec![
                "/C".to_string(),
                "call".to_string(),
                script.display().to_string(),
                "&&".to_string(),
                "set".to_string(),
            ],
        )
    } else {
        (
            "sh".to_string(),
            vec![
                "-c".to_string(),
                ". \"$1\" && (env -0 2>/dev/null || env)".to_string(),
                "sh".to_string(),
                script.display().to_string(),
            ],
        )
    }
}

/// Run the activation script and capture the environment it produces.
///
/// # Errors
///
/// Returns [`ProvisionError::ActivationFailure`] if the script is missing,
/// the shell fails, or the captured environment does not mark the
/// environment as active.
pub fn activate_with_script(
    executor: &dyn Executor,
    platform: &Platform,
    venv: &Path,
    base: &LaunchEnv,
) -> Result<LaunchEnv, ProvisionError> {
    if !activation_script(platform, venv).exists() {
        return Err(ProvisionError::ActivationFailure(format!(
            "activation script not found in {}",
            platform.venv_bin_dir(venv).display()
        )));
    }

    let (program, args) = capture_command(platform, venv);
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let result = executor
        .capture_with_env(&program, &args, base)
        .map_err(|e| ProvisionError::ActivationFailure(format!("{e:#}")))?;
    if !result.success {
        return Err(ProvisionError::ActivationFailure(format!(
            "{program} exited with {}: {}",
            result.code.unwrap_or(-1),
            result.stderr.trim()
        )));
    }

    let captured = LaunchEnv::parse_dump(&result.stdout);
    if captured.get(VIRTUAL_ENV).is_none() {
        return Err(ProvisionError::ActivationFailure(format!(
            "{VIRTUAL_ENV} was not set by the activation script"
        )));
    }
    Ok(captured)
}

/// Reproduce activation by hand: prepend the executable directory to the
/// search path, set `VIRTUAL_ENV`, and drop `PYTHONHOME`.
#[must_use]
pub fn activate_manually(platform: &Platform, venv: &Path, base: &LaunchEnv) -> LaunchEnv {
    base.with_path_prepended(&platform.venv_bin_dir(venv))
        .with_var(VIRTUAL_ENV, &venv.display().to_string())
        .without_var("PYTHONHOME")
}

/// Activate `venv`, falling back to [`activate_manually`] on failure.
///
/// Returns the activated environment, the method used, and the failure that
/// triggered the fallback, if any.
#[must_use]
pub fn activate(
    executor: &dyn Executor,
    platform: &Platform,
    venv: &Path,
    base: &LaunchEnv,
) -> (LaunchEnv, ActivationMethod, Option<ProvisionError>) {
    match activate_with_script(executor, platform, venv, base) {
        Ok(env) => (env, ActivationMethod::Script, None),
        Err(e) => (
            activate_manually(platform, venv, base),
            ActivationMethod::Manual,
            Some(e),
        ),
    }
}
