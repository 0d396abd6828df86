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

//! CLI entry point for VoltGuard

use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use voltguard_backend::BackendClient;
use voltguard_cli::cli::{
    Cli, Commands, TerminalAction, TerminalArgs, WatchArgs, format_command_result,
    format_commands, format_summary,
};
use voltguard_core::{ApiFeed, DashboardController, DashboardFeed};
use voltguard_types::{
    ActionResult, AvailableCommands, CommandRequest, CommandResponse, Credentials, MetricsSnapshot,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("voltguard_cli=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Watch(args) => watch_command(args).await,
        Commands::Terminal(args) => terminal_command(args).await,
    }
}

async fn watch_command(args: WatchArgs) -> Result<()> {
    if args.interval == 0 {
        bail!("--interval must be greater than zero");
    }

    let feed = ApiFeed::new(args.url.clone(), Duration::from_secs(args.timeout))
        .context("Invalid dashboard URL")?;
    let initial = match feed.metrics().await {
        Ok(metrics) => metrics,
        Err(e) => {
            warn!(error = %e, "Initial metrics unavailable");
            MetricsSnapshot::default()
        }
    };

    let controller = DashboardController::new(feed, initial, Duration::from_secs(args.interval));
    let mut updates = controller.subscribe();
    controller.start().context("Failed to start polling")?;
    info!(url = %args.url, interval = args.interval, "Watching dashboard");

    println!("{}", format_summary(&updates.borrow_and_update()));
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let line = format_summary(&updates.borrow_and_update());
                println!("{} {line}", chrono::Local::now().format("%H:%M:%S"));
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    controller.stop();
    Ok(())
}

async fn terminal_command(args: TerminalArgs) -> Result<()> {
    let json = args.json;
    let outcome = run_terminal(args).await;

    if json {
        let success = outcome.as_ref().is_ok_and(TerminalOutput::succeeded);
        let value = match outcome {
            Ok(TerminalOutput::Commands(available)) => {
                serde_json::to_value(ActionResult::ok(available))?
            }
            Ok(TerminalOutput::Executed(response)) => {
                serde_json::to_value(ActionResult::ok(response))?
            }
            Err(e) => serde_json::to_value(ActionResult::<()>::failed(format!("{e:#}")))?,
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
        if !success {
            std::process::exit(1);
        }
        return Ok(());
    }

    match outcome? {
        TerminalOutput::Commands(available) => print!("{}", format_commands(&available)),
        TerminalOutput::Executed(response) => {
            println!("{}", format_command_result(&response));
            if !response.success {
                std::process::exit(1);
            }
        }
    }
    Ok(())
}

enum TerminalOutput {
    Commands(AvailableCommands),
    Executed(CommandResponse),
}

impl TerminalOutput {
    fn succeeded(&self) -> bool {
        match self {
            Self::Commands(_) => true,
            Self::Executed(response) => response.success,
        }
    }
}

async fn run_terminal(args: TerminalArgs) -> Result<TerminalOutput> {
    let client = BackendClient::new(args.api_url.clone(), Duration::from_secs(args.timeout))?;
    let login = client
        .login(&Credentials::new(args.username.clone(), args.password.clone()))
        .await
        .context("Login failed")?;
    let session = client.session(login.access_token);
    let available = session
        .available_commands()
        .await
        .context("Failed to load available commands")?;

    match args.action {
        TerminalAction::List => Ok(TerminalOutput::Commands(available)),
        TerminalAction::Run {
            category,
            command,
            args,
        } => {
            if !available.allows(&category, &command) {
                bail!("{category}:{command} is not an available command (see 'terminal list')");
            }
            let request = CommandRequest::new(category, command, &args.join(" "));
            let response = session
                .execute_command(&request)
                .await
                .with_context(|| format!("Failed to execute {}", request.display()))?;
            Ok(TerminalOutput::Executed(response))
        }
    }
}
