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

use reqwest::StatusCode;
use thiserror::Error;
use voltguard_core::ValidationIssue;

/// Backend API error types
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// `message` is already suitable for display.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Validation failed on server: {}", summarize(.0))]
    Validation(Vec<ValidationIssue>),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type BackendResult<T> = Result<T, BackendError>;

impl BackendError {
    /// The access token was rejected; the caller should log the operator out.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::AuthenticationFailed)
    }

    /// Builds an [`BackendError::Api`] from a non-success response body.
    ///
    /// The body's `detail` wins over `message`; without either the status line is used.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
        let message = parsed
            .as_ref()
            .and_then(|json| {
                ["detail", "message"]
                    .iter()
                    .find_map(|key| json.get(key).and_then(serde_json::Value::as_str))
            })
            .filter(|m| !m.is_empty())
            .map_or_else(
                || {
                    format!(
                        "Error {}: {}",
                        status.as_u16(),
                        status.canonical_reason().unwrap_or_default()
                    )
                },
                str::to_owned,
            );

        Self::Api {
            status: status.as_u16(),
            message,
        }
    }
}

fn summarize(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|issue| issue.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
