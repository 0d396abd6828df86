// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of VoltGuard.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "voltguard")]
#[command(author, version, about = "VoltGuard dashboard CLI")]
#[command(
    long_about = "Command line access to a VoltGuard installation.\n    \nExamples:\n      voltguard watch --url http://localhost:3000        # Follow live dashboard data\n      voltguard terminal list                            # Show whitelisted commands\n      voltguard terminal run system uptime               # Run a remote command"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Follow a running dashboard and print a summary on every change
    Watch(WatchArgs),

    /// List or run whitelisted remote commands through the backend
    Terminal(TerminalArgs),
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Base URL of a running voltguard-web
    #[arg(long, env = "VOLTGUARD_URL", default_value = "http://localhost:3000")]
    pub url: String,

    /// Polling interval in seconds
    #[arg(long, default_value_t = 10, help = "Seconds between refreshes (must be > 0)")]
    pub interval: u64,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,
}

#[derive(Debug, Args)]
pub struct TerminalArgs {
    /// Backend API base URL
    #[arg(long, env = "API_URL")]
    pub api_url: String,

    #[arg(long, env = "VOLTGUARD_USERNAME")]
    pub username: String,

    #[arg(long, env = "VOLTGUARD_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Print the outcome as `{success, value}` / `{success, error}` JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[command(subcommand)]
    pub action: TerminalAction,
}

#[derive(Debug, Subcommand)]
pub enum TerminalAction {
    /// Show the available command categories
    List,

    /// Execute one command
    Run {
        category: String,
        command: String,
        /// Arguments passed to the command
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_keeps_hyphenated_args() {
        let cli = Cli::try_parse_from([
            "voltguard",
            "terminal",
            "--api-url",
            "http://backend",
            "--username",
            "operator",
            "--password",
            "secret",
            "run",
            "network",
            "ping",
            "-c",
            "4",
            "8.8.8.8",
        ])
        .unwrap();

        let Commands::Terminal(args) = cli.command else {
            panic!("expected terminal command");
        };
        let TerminalAction::Run {
            category,
            command,
            args,
        } = args.action
        else {
            panic!("expected run");
        };
        assert_eq!(category, "network");
        assert_eq!(command, "ping");
        assert_eq!(args, vec!["-c", "4", "8.8.8.8"]);
    }

    #[test]
    fn test_watch_defaults() {
        let cli = Cli::try_parse_from(["voltguard", "watch", "--url", "http://dash:3000"]).unwrap();
        let Commands::Watch(args) = cli.command else {
            panic!("expected watch command");
        };
        assert_eq!(args.url, "http://dash:3000");
        assert_eq!(args.interval, 10);
    }
}
