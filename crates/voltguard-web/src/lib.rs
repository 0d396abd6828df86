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

//! VoltGuard web dashboard: server-rendered pages, live updates over SSE and the JSON
//! routes the dashboard controller polls.

pub mod alerts;
pub mod api;
pub mod auth;
pub mod cameras;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod service;
pub mod sessions;
pub mod settings;
pub mod terminal;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::extract::FromRef;
use axum::routing::{get, post};
use chrono_tz::Tz;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use voltguard_backend::BackendClient;
use voltguard_core::DashboardController;

use crate::config::{DashboardSettings, ServerConfig};
use crate::service::ServiceFeed;
use crate::sessions::SessionStore;

pub type Controller = DashboardController<Arc<ServiceFeed>>;

/// Presentation settings shared by the page handlers.
#[derive(Debug, Clone)]
pub struct DisplaySettings {
    pub camera_portal_port: u16,
    pub timezone: Tz,
}

impl From<&DashboardSettings> for DisplaySettings {
    fn from(settings: &DashboardSettings) -> Self {
        Self {
            camera_portal_port: settings.camera_portal_port,
            timezone: settings.tz(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub controller: Controller,
    pub service: Arc<ServiceFeed>,
    pub backend: BackendClient,
    pub sessions: Arc<SessionStore>,
    pub display: Arc<DisplaySettings>,
}

impl AppState {
    /// Wires the backend client, service feed and controller from configuration.
    ///
    /// The controller is seeded with one metrics fetch but not started.
    pub async fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        let backend = BackendClient::new(config.backend.api_url.clone(), config.backend.timeout())
            .context("Failed to create backend client")?;
        let service = Arc::new(ServiceFeed::new(
            backend.clone(),
            config.backend.credentials(),
        ));

        let initial_metrics = match service.device_status().await {
            Ok(metrics) => metrics,
            Err(e) => {
                warn!(error = %e, "Initial metrics unavailable, starting empty");
                voltguard_types::MetricsSnapshot::default()
            }
        };

        let controller = DashboardController::new(
            Arc::clone(&service),
            initial_metrics,
            config.dashboard.poll_interval(),
        );
        info!(
            api_url = %config.backend.api_url,
            poll_interval_secs = config.dashboard.poll_interval_secs,
            "Dashboard controller ready"
        );

        Ok(Self {
            controller,
            service,
            backend,
            sessions: Arc::new(SessionStore::new(config.auth.session_ttl())),
            display: Arc::new(DisplaySettings::from(&config.dashboard)),
        })
    }
}

impl FromRef<AppState> for Arc<SessionStore> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.sessions)
    }
}

pub fn static_dir() -> PathBuf {
    std::env::var("VOLTGUARD_STATIC_DIR").map_or_else(
        |_| PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/static")),
        PathBuf::from,
    )
}

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard::index_handler))
        .route("/stream", get(dashboard::stream_handler))
        .route("/health", get(dashboard::health_handler))
        .route("/api/metrics", get(api::metrics_handler))
        .route("/api/cameras/status", get(api::camera_status_handler))
        .route("/api/locations/today", get(api::locations_handler))
        .route("/login", get(auth::login_page).post(auth::login_handler))
        .route("/logout", post(auth::logout_handler))
        .route("/users", get(auth::users_page))
        .route(
            "/settings",
            get(settings::settings_page).post(settings::settings_handler),
        )
        .route("/cameras", post(cameras::create_camera_handler))
        .route("/cameras/new", get(cameras::new_camera_page))
        .route("/cameras/{id}", post(cameras::update_camera_handler))
        .route("/cameras/{id}/edit", get(cameras::edit_camera_page))
        .route(
            "/cameras/{id}/delete",
            get(cameras::delete_camera_page).post(cameras::delete_camera_handler),
        )
        .route("/cameras/{id}/active", post(cameras::set_active_handler))
        .route("/cameras/{id}/alerts", get(alerts::alerts_page))
        .route("/alerts/{id}/resolve", post(alerts::resolve_alert_handler))
        .route(
            "/terminal",
            get(terminal::terminal_page).post(terminal::execute_handler),
        )
        .route("/terminal/clear", post(terminal::clear_handler))
        .nest_service("/static", ServeDir::new(static_dir()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
