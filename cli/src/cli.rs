use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the dashboard bootstrapper.
#[derive(Parser, Debug)]
#[command(
    name = "dashboard-bootstrap",
    about = "Provision a Python environment for the headcount dashboard and launch it",
    version
)]
pub struct Cli {
    /// Subcommand; provisions and launches when omitted
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub global: GlobalOpts,
}

impl Cli {
    /// The subcommand to run, defaulting to [`Command::Provision`].
    #[must_use]
    pub fn resolved_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Provision)
    }
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Read settings from this TOML file
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Stop after entry-point discovery instead of launching the dashboard
    #[arg(long, global = true)]
    pub no_launch: bool,

    /// Serve the dashboard on this port
    #[arg(long, global = true, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Provision the environment and launch the dashboard (default)
    Provision,
    /// Print version information
    Version,
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        <Cli as CommandFactory>::command().debug_assert();
    }

    #[test]
    fn bare_invocation_provisions() {
        let cli = Cli::parse_from(["dashboard-bootstrap"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.resolved_command(), Command::Provision);
        assert!(!cli.global.dry_run);
        assert!(!cli.global.no_launch);
    }

    #[test]
    fn parse_dry_run_short() {
        let cli = Cli::parse_from(["dashboard-bootstrap", "-d"]);
        assert!(cli.global.dry_run);
    }

    #[test]
    fn parse_config_path() {
        let cli = Cli::parse_from(["dashboard-bootstrap", "-c", "/tmp/board.toml"]);
        assert_eq!(cli.global.config, Some(PathBuf::from("/tmp/board.toml")));
    }

    #[test]
    fn parse_no_launch_and_port() {
        let cli = Cli::parse_from(["dashboard-bootstrap", "--no-launch", "--port", "9000"]);
        assert!(cli.global.no_launch);
        assert_eq!(cli.global.port, Some(9000));
    }

    #[test]
    fn port_zero_is_rejected() {
        assert!(Cli::try_parse_from(["dashboard-bootstrap", "--port", "0"]).is_err());
    }

    #[test]
    fn parse_version() {
        let cli = Cli::parse_from(["dashboard-bootstrap", "version"]);
        assert_eq!(cli.resolved_command(), Command::Version);
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::parse_from(["dashboard-bootstrap", "provision", "-v", "--dry-run"]);
        assert_eq!(cli.resolved_command(), Command::Provision);
        assert!(cli.verbose);
        assert!(cli.global.dry_run);
    }
}
