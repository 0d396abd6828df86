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

use askama::Template;
use axum::Form;
use axum::extract::{Path, Query, State};
use axum::response::{Html, Redirect};
use chrono_tz::Tz;
use serde::Deserialize;
use tracing::warn;
use voltguard_core::derived::{AlertStats, SEVERITY_LEVELS, filter_by_severity};
use voltguard_types::{AlertQuery, AlertType, CameraAlert, parse_timestamp};

use crate::AppState;
use crate::error::{WebResult, render};
use crate::sessions::Operator;

const ALERT_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Resolved,
}

impl StatusFilter {
    fn resolved(self) -> Option<bool> {
        match self {
            Self::All => None,
            Self::Active => Some(false),
            Self::Resolved => Some(true),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Resolved => "resolved",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertFilters {
    #[serde(default)]
    pub status: StatusFilter,
    #[serde(default, rename = "type")]
    pub alert_type: String,
    #[serde(default)]
    pub severity: String,
}

impl AlertFilters {
    pub fn query(&self, camera_id: i64) -> AlertQuery {
        AlertQuery {
            camera_id: Some(camera_id),
            alert_type_code: Some(self.alert_type.clone()).filter(|c| !c.is_empty()),
            resolved: self.status.resolved(),
            limit: Some(ALERT_LIMIT),
            offset: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AlertRow {
    pub id: i64,
    pub type_name: String,
    pub severity: String,
    pub resolved: bool,
    pub triggered_at: String,
    pub resolved_at: Option<String>,
}

impl AlertRow {
    fn new(alert: CameraAlert, tz: Tz) -> Self {
        Self {
            id: alert.id,
            type_name: alert.alert_type_name,
            severity: alert.severity.unwrap_or_default(),
            resolved: alert.resolved,
            triggered_at: local_time(&alert.triggered_at, tz),
            resolved_at: alert.resolved_at.as_deref().map(|ts| local_time(ts, tz)),
        }
    }
}

fn local_time(value: &str, tz: Tz) -> String {
    parse_timestamp(value).map_or_else(
        || value.to_owned(),
        |ts| ts.with_timezone(&tz).format("%d/%m/%Y %H:%M:%S").to_string(),
    )
}

/// An entry of one of the filter dropdowns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl FilterOption {
    fn new(value: &str, label: &str, current: &str) -> Self {
        Self {
            value: value.to_owned(),
            label: label.to_owned(),
            selected: value == current,
        }
    }
}

impl AlertFilters {
    fn status_options(&self) -> Vec<FilterOption> {
        [
            (StatusFilter::All, "All"),
            (StatusFilter::Active, "Active"),
            (StatusFilter::Resolved, "Resolved"),
        ]
        .into_iter()
        .map(|(status, label)| FilterOption::new(status.as_str(), label, self.status.as_str()))
        .collect()
    }

    fn type_options(&self, types: &[AlertType]) -> Vec<FilterOption> {
        std::iter::once(FilterOption::new("", "All types", &self.alert_type))
            .chain(
                types
                    .iter()
                    .map(|t| FilterOption::new(&t.code, &t.name, &self.alert_type)),
            )
            .collect()
    }

    fn severity_options(&self) -> Vec<FilterOption> {
        std::iter::once(FilterOption::new("", "All severities", &self.severity))
            .chain(
                SEVERITY_LEVELS
                    .iter()
                    .map(|level| FilterOption::new(level, level, &self.severity)),
            )
            .collect()
    }
}

#[derive(Debug, Template)]
#[template(path = "alerts.html")]
pub struct AlertsTemplate {
    pub operator: String,
    pub camera_id: i64,
    pub camera_name: String,
    pub status_options: Vec<FilterOption>,
    pub type_options: Vec<FilterOption>,
    pub severity_options: Vec<FilterOption>,
    pub stats: AlertStats,
    pub alerts: Vec<AlertRow>,
    pub error: Option<String>,
}

/// Alert history for one camera. Severity is filtered locally.
pub async fn alerts_page(
    State(state): State<AppState>,
    operator: Operator,
    Path(camera_id): Path<i64>,
    Query(filters): Query<AlertFilters>,
) -> WebResult<Html<String>> {
    let camera_name = state
        .controller
        .snapshot()
        .camera_status
        .find(camera_id)
        .map_or_else(|| format!("Camera {camera_id}"), |c| c.camera_name.clone());

    let alert_types = match operator.backend.alert_types().await {
        Ok(types) => types,
        Err(e) if e.is_auth_failure() => return Err(operator.fail(e)),
        Err(e) => {
            warn!(error = %e, "Could not load alert types");
            Vec::new()
        }
    };

    let (alerts, error) = match operator.backend.camera_alerts(&filters.query(camera_id)).await {
        Ok(list) => (
            filter_by_severity(list.alerts, Some(filters.severity.as_str())),
            None,
        ),
        Err(e) if e.is_auth_failure() => return Err(operator.fail(e)),
        Err(e) => {
            warn!(camera_id, error = %e, "Could not load camera alerts");
            (Vec::new(), Some(e.to_string()))
        }
    };

    let stats = AlertStats::from_alerts(&alerts);
    let tz = state.display.timezone;
    render(&AlertsTemplate {
        operator: operator.name,
        camera_id,
        camera_name,
        status_options: filters.status_options(),
        type_options: filters.type_options(&alert_types),
        severity_options: filters.severity_options(),
        stats,
        alerts: alerts.into_iter().map(|a| AlertRow::new(a, tz)).collect(),
        error,
    })
}

#[derive(Debug, Deserialize)]
pub struct ResolveForm {
    pub camera_id: i64,
}

pub async fn resolve_alert_handler(
    State(state): State<AppState>,
    operator: Operator,
    Path(alert_id): Path<i64>,
    Form(form): Form<ResolveForm>,
) -> WebResult<Redirect> {
    operator
        .backend
        .resolve_alert(alert_id)
        .await
        .map_err(|e| operator.fail(e))?;
    state.controller.refresh_camera_status().await;
    Ok(Redirect::to(&format!("/cameras/{}/alerts", form.camera_id)))
}
