use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use dashboard_bootstrap::commands::provision::{self, Host};
use dashboard_bootstrap::{cli, commands, env, exec, logging, platform, resources};

fn main() -> ExitCode {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();

    match args.resolved_command() {
        cli::Command::Version => {
            commands::version::run();
            ExitCode::SUCCESS
        }
        cli::Command::Provision => {
            let env = env::LaunchEnv::from_process();
            logging::init_subscriber(args.verbose, &env, "provision");
            let log = Arc::new(logging::Logger::new(&env, "provision"));
            let host = Host {
                env,
                platform: platform::Platform::detect(),
                executor: Arc::new(exec::SystemExecutor),
                interrupt: Arc::new(resources::launcher::CtrlCWatch::default()),
                self_exe: self_exe(),
            };
            // Failures are logged where they happen; only the status remains.
            match provision::run(&args.global, host, &log) {
                Ok(_) => ExitCode::SUCCESS,
                Err(_) => ExitCode::FAILURE,
            }
        }
    }
}

/// Canonical path of this executable, or its bare name if that fails.
fn self_exe() -> PathBuf {
    std::env::current_exe()
        .and_then(dunce::canonicalize)
        .unwrap_or_else(|_| PathBuf::from(env!("CARGO_PKG_NAME")))
}
