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

//! Camera add, edit, delete and enable/disable actions.
//!
//! Every successful change refreshes the controller's camera status before redirecting back
//! to the dashboard.

use askama::Template;
use axum::Form;
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;
use tracing::{info, warn};
use voltguard_core::ValidationIssue;
use voltguard_core::validation::{CameraForm, ValidCamera, message_for, validate_camera_form};
use voltguard_types::{AlertType, CameraUpdate, NewCamera};

use crate::AppState;
use crate::error::{WebError, WebResult, render};
use crate::sessions::Operator;

const DEFAULT_PORT: u16 = 80;

/// Camera form fields plus the checked alert codes.
///
/// Parsed from raw pairs since `enabled_alerts` repeats once per checkbox.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CameraSubmission {
    pub form: CameraForm,
    pub enabled_alerts: Vec<String>,
}

impl CameraSubmission {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut submission = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "name" => submission.form.name = value,
                "ip_address" => submission.form.ip_address = value,
                "port" => submission.form.port = value,
                "enabled_alerts" if !value.is_empty() => submission.enabled_alerts.push(value),
                _ => {}
            }
        }
        submission
    }
}

#[derive(Debug, Default, Clone)]
pub struct CameraErrors {
    pub name: Option<String>,
    pub ip_address: Option<String>,
    pub port: Option<String>,
}

impl From<&[ValidationIssue]> for CameraErrors {
    fn from(issues: &[ValidationIssue]) -> Self {
        let field = |name: &str| message_for(issues, name).map(str::to_owned);
        Self {
            name: field("name"),
            ip_address: field("ip_address"),
            port: field("port"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AlertOption {
    pub code: String,
    pub name: String,
    pub checked: bool,
}

fn alert_options(types: &[AlertType], checked: &[String]) -> Vec<AlertOption> {
    types
        .iter()
        .filter(|t| t.is_active)
        .map(|t| AlertOption {
            code: t.code.clone(),
            name: t.name.clone(),
            checked: checked.contains(&t.code),
        })
        .collect()
}

#[derive(Debug, Template)]
#[template(path = "camera_form.html")]
pub struct CameraFormTemplate {
    pub operator: String,
    pub title: &'static str,
    pub action: String,
    pub form: CameraForm,
    pub errors: CameraErrors,
    pub error: Option<String>,
    /// Only offered when adding a camera
    pub alert_options: Option<Vec<AlertOption>>,
}

#[derive(Debug, Template)]
#[template(path = "camera_delete.html")]
pub struct CameraDeleteTemplate {
    pub operator: String,
    pub camera_id: i64,
    pub camera_name: String,
}

#[derive(Debug, Deserialize)]
pub struct ActiveForm {
    pub is_active: bool,
}

async fn load_alert_options(operator: &Operator, checked: &[String]) -> WebResult<Vec<AlertOption>> {
    match operator.backend.alert_types().await {
        Ok(types) => Ok(alert_options(&types, checked)),
        Err(e) if e.is_auth_failure() => Err(operator.fail(e)),
        Err(e) => {
            warn!(error = %e, "Could not load alert types");
            Ok(Vec::new())
        }
    }
}

pub async fn new_camera_page(operator: Operator) -> WebResult<Html<String>> {
    let options = load_alert_options(&operator, &[]).await?;
    render(&CameraFormTemplate {
        operator: operator.name,
        title: "Add Camera",
        action: "/cameras".to_owned(),
        form: CameraForm::default(),
        errors: CameraErrors::default(),
        error: None,
        alert_options: Some(options),
    })
}

pub async fn create_camera_handler(
    State(state): State<AppState>,
    operator: Operator,
    Form(pairs): Form<Vec<(String, String)>>,
) -> WebResult<Response> {
    let submission = CameraSubmission::from_pairs(pairs);

    let (issues, error) = match validate_camera_form(&submission.form) {
        Ok(ValidCamera {
            name,
            ip_address,
            port,
        }) => {
            let camera = NewCamera {
                name,
                ip_address,
                port,
                enabled_alerts: submission.enabled_alerts.clone(),
            };
            match operator.backend.create_camera(&camera).await {
                Ok(created) => {
                    info!(camera_id = created.id, "Camera created");
                    state.controller.refresh_camera_status().await;
                    return Ok(Redirect::to("/").into_response());
                }
                Err(e) if e.is_auth_failure() => return Err(operator.fail(e)),
                Err(e) => (Vec::new(), Some(e.to_string())),
            }
        }
        Err(issues) => (issues, None),
    };

    let options = load_alert_options(&operator, &submission.enabled_alerts).await?;
    let page = render(&CameraFormTemplate {
        operator: operator.name,
        title: "Add Camera",
        action: "/cameras".to_owned(),
        form: submission.form,
        errors: CameraErrors::from(issues.as_slice()),
        error,
        alert_options: Some(options),
    })?;
    Ok(page.into_response())
}

/// Edit form prefilled from the latest camera status.
pub async fn edit_camera_page(
    State(state): State<AppState>,
    operator: Operator,
    Path(camera_id): Path<i64>,
) -> WebResult<Html<String>> {
    let snapshot = state.controller.snapshot();
    let camera = snapshot
        .camera_status
        .find(camera_id)
        .ok_or_else(|| not_found(camera_id))?;

    render(&CameraFormTemplate {
        operator: operator.name,
        title: "Edit Camera",
        action: format!("/cameras/{camera_id}"),
        form: CameraForm {
            name: camera.camera_name.clone(),
            ip_address: camera.camera_ip.clone(),
            port: camera.camera_port.unwrap_or(DEFAULT_PORT).to_string(),
        },
        errors: CameraErrors::default(),
        error: None,
        alert_options: None,
    })
}

pub async fn update_camera_handler(
    State(state): State<AppState>,
    operator: Operator,
    Path(camera_id): Path<i64>,
    Form(form): Form<CameraForm>,
) -> WebResult<Response> {
    let (issues, error) = match validate_camera_form(&form) {
        Ok(valid) => {
            let update = CameraUpdate {
                name: Some(valid.name),
                ip_address: Some(valid.ip_address),
                port: Some(valid.port),
                ..CameraUpdate::default()
            };
            match operator.backend.update_camera(camera_id, &update).await {
                Ok(_) => {
                    state.controller.refresh_camera_status().await;
                    return Ok(Redirect::to("/").into_response());
                }
                Err(e) if e.is_auth_failure() => return Err(operator.fail(e)),
                Err(e) => (Vec::new(), Some(e.to_string())),
            }
        }
        Err(issues) => (issues, None),
    };

    let page = render(&CameraFormTemplate {
        operator: operator.name,
        title: "Edit Camera",
        action: format!("/cameras/{camera_id}"),
        form,
        errors: CameraErrors::from(issues.as_slice()),
        error,
        alert_options: None,
    })?;
    Ok(page.into_response())
}

pub async fn delete_camera_page(
    State(state): State<AppState>,
    operator: Operator,
    Path(camera_id): Path<i64>,
) -> WebResult<Html<String>> {
    let snapshot = state.controller.snapshot();
    let camera = snapshot
        .camera_status
        .find(camera_id)
        .ok_or_else(|| not_found(camera_id))?;

    render(&CameraDeleteTemplate {
        operator: operator.name,
        camera_id,
        camera_name: camera.camera_name.clone(),
    })
}

pub async fn delete_camera_handler(
    State(state): State<AppState>,
    operator: Operator,
    Path(camera_id): Path<i64>,
) -> WebResult<Redirect> {
    operator
        .backend
        .delete_camera(camera_id)
        .await
        .map_err(|e| operator.fail(e))?;
    state.controller.refresh_camera_status().await;
    Ok(Redirect::to("/"))
}

pub async fn set_active_handler(
    State(state): State<AppState>,
    operator: Operator,
    Path(camera_id): Path<i64>,
    Form(form): Form<ActiveForm>,
) -> WebResult<Redirect> {
    operator
        .backend
        .set_camera_active(camera_id, form.is_active)
        .await
        .map_err(|e| operator.fail(e))?;
    state.controller.refresh_camera_status().await;
    Ok(Redirect::to("/"))
}

fn not_found(camera_id: i64) -> WebError {
    WebError::NotFound(format!("Camera {camera_id} not found"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_submission_collects_repeated_alerts() {
        let submission = CameraSubmission::from_pairs(pairs(&[
            ("name", "Cabin"),
            ("ip_address", "192.168.1.20"),
            ("port", "8080"),
            ("enabled_alerts", "phone"),
            ("enabled_alerts", "smoking"),
            ("enabled_alerts", ""),
        ]));

        assert_eq!(submission.form.name, "Cabin");
        assert_eq!(submission.form.port, "8080");
        assert_eq!(submission.enabled_alerts, vec!["phone", "smoking"]);
    }

    #[test]
    fn test_submission_port_defaults() {
        let submission = CameraSubmission::from_pairs(pairs(&[("name", "Cabin")]));
        assert_eq!(submission.form.port, "80");
        assert!(submission.enabled_alerts.is_empty());
    }

    #[test]
    fn test_only_active_alert_types_offered() {
        let types = vec![
            AlertType {
                id: 1,
                code: "phone".to_owned(),
                name: "Phone usage".to_owned(),
                description: String::new(),
                icon: None,
                color: None,
                is_active: true,
                created_at: String::new(),
            },
            AlertType {
                id: 2,
                code: "legacy".to_owned(),
                name: "Legacy".to_owned(),
                description: String::new(),
                icon: None,
                color: None,
                is_active: false,
                created_at: String::new(),
            },
        ];

        let options = alert_options(&types, &["phone".to_owned()]);
        assert_eq!(options.len(), 1);
        assert!(options[0].checked);
    }

    #[test]
    fn test_form_template_renders_errors() {
        let issues = validate_camera_form(&CameraForm {
            name: "ab".to_owned(),
            ip_address: "999.1.1.1".to_owned(),
            port: "80".to_owned(),
        })
        .unwrap_err();

        let html = CameraFormTemplate {
            operator: "Operator".to_owned(),
            title: "Add Camera",
            action: "/cameras".to_owned(),
            form: CameraForm::default(),
            errors: CameraErrors::from(issues.as_slice()),
            error: None,
            alert_options: Some(Vec::new()),
        }
        .render()
        .unwrap();

        assert!(html.contains("Name must be at least 3 characters long"));
        assert!(html.contains("Invalid IP address format"));
    }
}
