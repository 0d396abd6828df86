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

//! Wire types shared between the backend client, the dashboard controller and the web UI.

pub mod action;
pub mod alerts;
pub mod auth;
pub mod cameras;
pub mod locations;
pub mod metrics;
pub mod settings;
pub mod terminal;

pub use action::ActionResult;
pub use alerts::{AlertQuery, AlertType, AlertTypesResponse, CameraAlert, CameraAlertList};
pub use auth::{Credentials, LoginResponse};
pub use cameras::{Camera, CameraStatus, CameraStatusSnapshot, CameraUpdate, NewCamera};
pub use locations::{LocationData, LocationResponse, parse_timestamp};
pub use metrics::{DeviceMetric, HostMetric, MetricsSnapshot};
pub use settings::DeviceSettings;
pub use terminal::{AvailableCommands, CommandRequest, CommandResponse, SecurityInfo};
