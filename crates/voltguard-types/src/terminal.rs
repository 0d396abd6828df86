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

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A whitelisted command invocation for `POST /terminal/execute`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRequest {
    pub category: String,
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandRequest {
    /// Splits a free-form argument line on whitespace, dropping empty pieces.
    pub fn new(category: impl Into<String>, command: impl Into<String>, args_line: &str) -> Self {
        Self {
            category: category.into(),
            command: command.into(),
            args: args_line.split_whitespace().map(str::to_owned).collect(),
        }
    }

    /// `category:command args` as shown in the terminal history.
    pub fn display(&self) -> String {
        let mut line = format!("{}:{}", self.category, self.command);
        if !self.args.is_empty() {
            line.push(' ');
            line.push_str(&self.args.join(" "));
        }
        line
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub error: Option<String>,
    /// Seconds
    #[serde(default)]
    pub execution_time: f64,
    #[serde(default)]
    pub command_executed: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecurityInfo {
    /// Human readable, e.g. "30 seconds"
    #[serde(default)]
    pub timeout: String,
    #[serde(default)]
    pub working_directory: String,
    #[serde(default)]
    pub shell_disabled: bool,
    #[serde(default)]
    pub argument_validation: bool,
}

/// category -> command -> allowed arguments
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AvailableCommands {
    #[serde(default)]
    pub categories: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    #[serde(default)]
    pub total_commands: u32,
    #[serde(default)]
    pub security_info: SecurityInfo,
}

impl AvailableCommands {
    pub fn allows(&self, category: &str, command: &str) -> bool {
        self.categories
            .get(category)
            .is_some_and(|commands| commands.contains_key(command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_split_on_any_whitespace() {
        let request = CommandRequest::new("network", "ping", "  -c 4\t8.8.8.8  ");
        assert_eq!(request.args, vec!["-c", "4", "8.8.8.8"]);
        assert_eq!(request.display(), "network:ping -c 4 8.8.8.8");
    }

    #[test]
    fn test_display_without_args() {
        let request = CommandRequest::new("system", "uptime", "");
        assert!(request.args.is_empty());
        assert_eq!(request.display(), "system:uptime");
    }
}
