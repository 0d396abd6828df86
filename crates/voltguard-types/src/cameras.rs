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

use serde::{Deserialize, Serialize};

/// Connectivity report for every configured camera.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraStatusSnapshot {
    #[serde(default)]
    pub statuses: Vec<CameraStatus>,
    #[serde(default)]
    pub total_count: u32,
}

impl CameraStatusSnapshot {
    /// The state shown when no status could be fetched.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    pub fn find(&self, camera_id: i64) -> Option<&CameraStatus> {
        self.statuses.iter().find(|s| s.camera_id == camera_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraStatus {
    pub camera_id: i64,
    pub camera_name: String,
    pub camera_ip: String,
    #[serde(default)]
    pub camera_port: Option<u16>,
    #[serde(default)]
    pub is_connected: bool,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub response_time_ms: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl CameraStatus {
    /// Cameras without an explicit flag are treated as active.
    pub fn is_active_or_default(&self) -> bool {
        self.is_active.unwrap_or(true)
    }
}

/// Camera definition as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub id: i64,
    pub name: String,
    pub ip_address: String,
    pub port: u16,
    #[serde(default)]
    pub enabled_alerts: Vec<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Body of `POST /cameras`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCamera {
    pub name: String,
    pub ip_address: String,
    pub port: u16,
    pub enabled_alerts: Vec<String>,
}

/// Body of `PUT /cameras/{id}`. Only present fields are changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled_alerts: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl CameraUpdate {
    pub fn active(is_active: bool) -> Self {
        Self {
            is_active: Some(is_active),
            ..Self::default()
        }
    }
}
