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

//! Remote command terminal. History lives in the operator's session.

use askama::Template;
use axum::Form;
use axum::extract::State;
use axum::response::{Html, IntoResponse, Redirect, Response};
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};
use voltguard_types::{AvailableCommands, CommandRequest, CommandResponse, SecurityInfo};

use crate::AppState;
use crate::error::{WebResult, render};
use crate::sessions::Operator;

/// One executed command as shown in the output pane.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub command: String,
    pub output: String,
    pub error: Option<String>,
    pub timestamp: String,
    /// e.g. "0.42s"
    pub execution_time: String,
    pub success: bool,
    pub command_executed: String,
}

impl HistoryEntry {
    pub fn new(request: &CommandRequest, response: CommandResponse, timestamp: String) -> Self {
        Self {
            command: request.display(),
            output: response.output,
            error: response.error.filter(|e| !e.is_empty()),
            timestamp,
            execution_time: format!("{:.2}s", response.execution_time),
            success: response.success,
            command_executed: response.command_executed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommandOption {
    /// `category:command`
    pub value: String,
    pub label: String,
    pub allowed_args: String,
    pub selected: bool,
}

#[derive(Debug, Clone)]
pub struct CommandGroup {
    pub category: String,
    pub commands: Vec<CommandOption>,
}

fn command_groups(available: &AvailableCommands, selected: &str) -> Vec<CommandGroup> {
    available
        .categories
        .iter()
        .map(|(category, commands)| CommandGroup {
            category: category.clone(),
            commands: commands
                .iter()
                .map(|(command, args)| {
                    let value = format!("{category}:{command}");
                    CommandOption {
                        selected: value == selected,
                        value,
                        label: command.clone(),
                        allowed_args: args.join(" "),
                    }
                })
                .collect(),
        })
        .collect()
}

#[derive(Debug, Template)]
#[template(path = "terminal.html")]
pub struct TerminalTemplate {
    pub operator: String,
    pub groups: Vec<CommandGroup>,
    pub total_commands: u32,
    pub security: SecurityInfo,
    pub history: Vec<HistoryEntry>,
    pub args: String,
    pub error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExecuteForm {
    /// `category:command`
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub args: String,
}

impl ExecuteForm {
    pub fn request(&self) -> Option<CommandRequest> {
        let (category, command) = self.target.split_once(':')?;
        if category.is_empty() || command.is_empty() {
            return None;
        }
        Some(CommandRequest::new(category, command, &self.args))
    }
}

async fn page(
    operator: Operator,
    form: &ExecuteForm,
    error: Option<String>,
) -> WebResult<Response> {
    let (available, error) = match operator.backend.available_commands().await {
        Ok(available) => (available, error),
        Err(e) if e.is_auth_failure() => return Err(operator.fail(e)),
        Err(e) => {
            warn!(error = %e, "Could not load available commands");
            (AvailableCommands::default(), error.or_else(|| Some(e.to_string())))
        }
    };

    let history = operator.sessions().history(operator.id);
    let page = render(&TerminalTemplate {
        operator: operator.name,
        groups: command_groups(&available, &form.target),
        total_commands: available.total_commands,
        security: available.security_info,
        history,
        args: form.args.clone(),
        error,
    })?;
    Ok(page.into_response())
}

pub async fn terminal_page(operator: Operator) -> WebResult<Response> {
    page(operator, &ExecuteForm::default(), None).await
}

/// Runs a command and appends the result to the session history.
///
/// A command that ran but failed is still recorded. A request the backend refused is only
/// reported.
pub async fn execute_handler(
    State(state): State<AppState>,
    operator: Operator,
    Form(form): Form<ExecuteForm>,
) -> WebResult<Response> {
    let Some(request) = form.request() else {
        return page(operator, &form, Some("Select a command to execute".to_owned())).await;
    };

    match operator.backend.execute_command(&request).await {
        Ok(response) => {
            info!(command = %request.display(), success = response.success, "Command finished");
            let timestamp = Utc::now()
                .with_timezone(&state.display.timezone)
                .format("%H:%M:%S")
                .to_string();
            operator
                .sessions()
                .push_history(operator.id, HistoryEntry::new(&request, response, timestamp));
            Ok(Redirect::to("/terminal").into_response())
        }
        Err(e) if e.is_auth_failure() => Err(operator.fail(e)),
        Err(e) => {
            warn!(command = %request.display(), error = %e, "Command execution failed");
            page(operator, &form, Some(e.to_string())).await
        }
    }
}

pub async fn clear_handler(operator: Operator) -> Redirect {
    operator.sessions().clear_history(operator.id);
    Redirect::to("/terminal")
}
