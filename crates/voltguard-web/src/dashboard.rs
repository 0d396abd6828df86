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

use std::convert::Infallible;

use askama::Template;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{Html, IntoResponse};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tokio_stream::wrappers::WatchStream;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, trace};
use voltguard_core::DashboardState;
use voltguard_core::derived::{
    camera_link, format_minutes, format_response_time, is_fast_response, latest_location,
    metric_status, portal_link, sorted_track,
};
use voltguard_types::{CameraStatus, HostMetric, LocationData};

use crate::error::{WebResult, render};
use crate::sessions::Operator;
use crate::{AppState, DisplaySettings};

#[derive(Debug, Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub operator: String,
    pub view: DashboardView,
}

/// The part of the page replaced on every SSE update.
#[derive(Debug, Template)]
#[template(path = "dashboard_live.html")]
pub struct LiveTemplate {
    pub view: DashboardView,
}

#[derive(Debug, Clone)]
pub struct DashboardView {
    pub device_id: String,
    pub sync_time: String,
    pub sync_date: String,
    pub battery_voltage: String,
    pub min_voltage: String,
    pub battery_low: bool,
    pub gps_active: bool,
    pub ignition: String,
    pub ignition_on: bool,
    pub camera_relay: RelayView,
    pub computer_relay: RelayView,
    pub host: HostView,
    pub cameras: Vec<CameraRow>,
    pub camera_count: u32,
    pub portal_link: Option<String>,
    pub map: MapView,
}

#[derive(Debug, Clone)]
pub struct RelayView {
    pub status: String,
    pub on: bool,
    pub timer: String,
}

#[derive(Debug, Clone)]
pub struct HostView {
    pub online: bool,
    pub host_ip: String,
    /// Public address, or "Offline"
    pub public_label: String,
    pub readings: Vec<Reading>,
}

#[derive(Debug, Clone)]
pub struct Reading {
    pub label: &'static str,
    pub value: String,
    pub level: &'static str,
}

#[derive(Debug, Clone)]
pub struct CameraRow {
    pub id: i64,
    pub name: String,
    pub ip: String,
    pub connected: bool,
    pub active: bool,
    pub link: Option<String>,
    pub response_time: Option<String>,
    pub response_fast: bool,
}

#[derive(Debug, Clone)]
pub struct MapView {
    /// `[[lat, lng], ...]` oldest first
    pub points_json: String,
    pub latest: Option<LatestFix>,
}

#[derive(Debug, Clone)]
pub struct LatestFix {
    pub latitude: f64,
    pub longitude: f64,
    pub speed: String,
    pub sats: u32,
    pub hdop: String,
    pub last_update: String,
}

impl DashboardView {
    pub fn build(state: &DashboardState, display: &DisplaySettings, now: DateTime<Utc>) -> Self {
        let device = state.metrics.device();
        let host = state.metrics.host();
        let tz = display.timezone;
        let local_now = now.with_timezone(&tz);

        let public_ip = host.public_ip.as_deref().filter(|ip| !ip.is_empty());
        let cameras = state
            .camera_status
            .statuses
            .iter()
            .map(|camera| camera_row(camera, public_ip, display.camera_portal_port))
            .collect();

        Self {
            device_id: device.device_id_or_default().to_owned(),
            sync_time: local_now.format("%H:%M:%S").to_string(),
            sync_date: local_now.format("%m/%d/%Y").to_string(),
            battery_voltage: format!("{} V", device.battery_voltage_or_default()),
            min_voltage: format!("Min. Voltage: {} V", device.min_voltage_or_default()),
            battery_low: device.is_battery_low(),
            gps_active: device.is_gps_active(),
            ignition: device.ignition_or_default().to_owned(),
            ignition_on: device.is_ignition_on(),
            camera_relay: RelayView {
                status: device.relay1_status_or_default().to_owned(),
                on: device.is_relay1_on(),
                timer: format_minutes(device.relay1_time_or_default()),
            },
            computer_relay: RelayView {
                status: device.relay2_status_or_default().to_owned(),
                on: device.is_relay2_on(),
                timer: format_minutes(device.relay2_time_or_default()),
            },
            host: host_view(&host),
            cameras,
            camera_count: state.camera_status.total_count,
            portal_link: public_ip.map(|ip| portal_link(ip, display.camera_portal_port)),
            map: map_view(&state.locations, tz),
        }
    }
}

fn host_view(host: &HostMetric) -> HostView {
    let reading = |label: &'static str, kind: &str, value: f64, unit: &str| Reading {
        label,
        value: format!("{value:.1}{unit}"),
        level: metric_status(kind, value).as_str(),
    };

    HostView {
        online: host.is_online(),
        host_ip: host.host_ip_or_default().to_owned(),
        public_label: if host.is_online() {
            host.public_ip_or_default().to_owned()
        } else {
            "Offline".to_owned()
        },
        readings: vec![
            reading("CPU", "cpu", host.cpu_usage_or_default(), "%"),
            reading("RAM", "ram", host.ram_usage_or_default(), "%"),
            reading("DISK", "disk", host.disk_usage_or_default(), "%"),
            reading("Temp", "temperature", host.temperature_or_default(), " ºC"),
        ],
    }
}

fn camera_row(camera: &CameraStatus, public_ip: Option<&str>, portal_port: u16) -> CameraRow {
    CameraRow {
        id: camera.camera_id,
        name: camera.camera_name.clone(),
        ip: camera.camera_ip.clone(),
        connected: camera.is_connected,
        active: camera.is_active_or_default(),
        link: public_ip
            .filter(|_| camera.is_connected)
            .map(|ip| camera_link(ip, portal_port, camera.camera_id)),
        response_time: format_response_time(camera.response_time_ms),
        response_fast: camera.response_time_ms.is_some_and(is_fast_response),
    }
}

fn map_view(locations: &[LocationData], tz: Tz) -> MapView {
    let points: Vec<[f64; 2]> = sorted_track(locations)
        .iter()
        .map(|fix| [fix.latitude, fix.longitude])
        .collect();

    let latest = latest_location(locations).map(|fix| LatestFix {
        latitude: fix.latitude,
        longitude: fix.longitude,
        speed: format!("{} km/h", fix.speed.floor()),
        sats: fix.sats,
        hdop: format!("{:.1}", fix.hdop),
        last_update: fix.recorded_at().map_or_else(
            || fix.timestamp.clone(),
            |ts| ts.with_timezone(&tz).format("%d/%m/%Y %H:%M:%S").to_string(),
        ),
    });

    MapView {
        points_json: serde_json::to_string(&points).unwrap_or_else(|_| "[]".to_owned()),
        latest,
    }
}

/// Main dashboard page
pub async fn index_handler(
    State(state): State<AppState>,
    operator: Operator,
) -> WebResult<Html<String>> {
    debug!(user = %operator.name, "Dashboard page requested");
    let view = DashboardView::build(&state.controller.snapshot(), &state.display, Utc::now());
    render(&DashboardTemplate {
        operator: operator.name,
        view,
    })
}

/// Pushes a freshly rendered live section whenever the controller state changes.
pub async fn stream_handler(
    State(state): State<AppState>,
    _operator: Operator,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    trace!("SSE stream connected");

    let display = state.display;
    let stream = WatchStream::new(state.controller.subscribe()).map(move |snapshot| {
        let view = DashboardView::build(&snapshot, &display, Utc::now());
        let html = LiveTemplate { view }
            .render()
            .unwrap_or_else(|e| format!("<div class='error'>Template error: {e}</div>"));
        Ok::<_, Infallible>(Event::default().event("update").data(html))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Health check endpoint
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    if state.controller.is_running() {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "STOPPED")
    }
}
