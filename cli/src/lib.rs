//! Idempotent bootstrapper for a Python web dashboard.
//!
//! Provisions a working directory under the user profile, the pinned Python
//! runtime, a virtual environment and a checkout of the dashboard repository,
//! installs its dependencies, then discovers the entry point and launches it.
//! Every step inspects existing state first, so re-running is safe.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]**: load the optional TOML settings and resolve paths
//! - **[`resources`]**: idempotent `check + apply` primitives (venv, checkout, …)
//! - **[`tasks`]**: the named, ordered steps wired to resources
//! - **[`commands`]**: top-level subcommand orchestration (`provision`, `version`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod env;
pub mod error;
pub mod exec;
pub mod logging;
pub mod platform;
pub mod resources;
pub mod tasks;
