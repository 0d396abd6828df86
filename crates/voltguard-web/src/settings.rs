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

//! Device configuration page.

use askama::Template;
use axum::Form;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;
use tracing::{info, warn};
use voltguard_backend::BackendError;
use voltguard_core::ValidationIssue;
use voltguard_core::validation::{SettingsForm, message_for, validate_settings_form};
use voltguard_types::DeviceSettings;

use crate::AppState;
use crate::error::{WebResult, render};
use crate::sessions::Operator;

pub const SAVED_MESSAGE: &str = "Configurations updated successfully.";

#[derive(Debug, Default, Clone)]
pub struct SettingsErrors {
    pub device_id: Option<String>,
    pub min_voltage: Option<String>,
    pub relay1_time: Option<String>,
    pub relay2_time: Option<String>,
}

impl From<&[ValidationIssue]> for SettingsErrors {
    fn from(issues: &[ValidationIssue]) -> Self {
        let field = |name: &str| message_for(issues, name).map(str::to_owned);
        Self {
            device_id: field("device_id"),
            min_voltage: field("min_voltage"),
            relay1_time: field("relay1_time"),
            relay2_time: field("relay2_time"),
        }
    }
}

#[derive(Debug, Template)]
#[template(path = "settings.html")]
pub struct SettingsTemplate {
    pub operator: String,
    pub form: SettingsForm,
    pub errors: SettingsErrors,
    pub error: Option<String>,
    pub notice: Option<&'static str>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SettingsQuery {
    #[serde(default)]
    pub saved: Option<u8>,
}

/// Shows the form seeded from the latest device metrics.
pub async fn settings_page(
    State(state): State<AppState>,
    operator: Operator,
    Query(query): Query<SettingsQuery>,
) -> WebResult<Html<String>> {
    let current = DeviceSettings::from(&state.controller.snapshot().metrics.device());
    render(&SettingsTemplate {
        operator: operator.name,
        form: SettingsForm::from(&current),
        errors: SettingsErrors::default(),
        error: None,
        notice: query.saved.map(|_| SAVED_MESSAGE),
    })
}

pub async fn settings_handler(
    State(state): State<AppState>,
    operator: Operator,
    Form(form): Form<SettingsForm>,
) -> WebResult<Response> {
    let settings = match validate_settings_form(&form) {
        Ok(settings) => settings,
        Err(issues) => {
            info!(issues = issues.len(), "Settings form rejected");
            return rejected(operator.name, form, &issues, None);
        }
    };

    match operator.backend.configure(&settings).await {
        Ok(()) => {
            state.controller.refresh_all().await;
            Ok(Redirect::to("/settings?saved=1").into_response())
        }
        Err(BackendError::Validation(issues)) => rejected(operator.name, form, &issues, None),
        Err(e) if e.is_auth_failure() => Err(operator.fail(e)),
        Err(e) => {
            warn!(error = %e, "Device configuration failed");
            rejected(operator.name, form, &[], Some(e.to_string()))
        }
    }
}

fn rejected(
    operator: String,
    form: SettingsForm,
    issues: &[ValidationIssue],
    error: Option<String>,
) -> WebResult<Response> {
    let page = render(&SettingsTemplate {
        operator,
        form,
        errors: SettingsErrors::from(issues),
        error,
        notice: None,
    })?;
    Ok(page.into_response())
}
