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

//! JSON routes polled by the dashboard controller (and by `voltguard-cli watch`).
//!
//! Each one forwards a single backend call made with the service account.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;
use tracing::error;
use voltguard_backend::BackendResult;

use crate::AppState;

fn forward<T: Serialize>(route: &str, result: BackendResult<T>) -> Response {
    match result {
        Ok(body) => Json(body).into_response(),
        Err(e) => {
            error!(route, error = %e, "Backend proxy request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

pub async fn metrics_handler(State(state): State<AppState>) -> Response {
    forward("/api/metrics", state.service.device_status().await)
}

pub async fn camera_status_handler(State(state): State<AppState>) -> Response {
    forward("/api/cameras/status", state.service.camera_status().await)
}

pub async fn locations_handler(State(state): State<AppState>) -> Response {
    forward("/api/locations/today", state.service.today_locations().await)
}
