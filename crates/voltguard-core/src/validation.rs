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

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};
use voltguard_types::DeviceSettings;

const DEVICE_ID_MAX_LEN: usize = 32;
const MIN_VOLTAGE_RANGE: (f64, f64) = (9.0, 15.0);
const RELAY_TIME_RANGE: (u32, u32) = (1, 300);

/// A single rejected form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Form field name (e.g. "min_voltage")
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_owned(),
            message: message.into(),
        }
    }
}

/// Looks up the first message reported for `field`.
pub fn message_for<'a>(issues: &'a [ValidationIssue], field: &str) -> Option<&'a str> {
    issues
        .iter()
        .find(|issue| issue.field == field)
        .map(|issue| issue.message.as_str())
}

/// Settings form exactly as submitted by the browser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SettingsForm {
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub min_voltage: String,
    #[serde(default)]
    pub relay1_time: String,
    #[serde(default)]
    pub relay2_time: String,
}

impl From<&DeviceSettings> for SettingsForm {
    fn from(settings: &DeviceSettings) -> Self {
        Self {
            device_id: settings.device_id.clone(),
            min_voltage: format!("{:.1}", settings.min_voltage),
            relay1_time: settings.relay1_time.to_string(),
            relay2_time: settings.relay2_time.to_string(),
        }
    }
}

struct RelayLabels {
    field: &'static str,
    /// Capitalised form used by the type checks ("Camera Time")
    title: &'static str,
    /// Sentence form used by the range checks ("Camera time")
    sentence: &'static str,
}

const CAMERA_TIME: RelayLabels = RelayLabels {
    field: "relay1_time",
    title: "Camera Time",
    sentence: "Camera time",
};

const SYSTEM_TIME: RelayLabels = RelayLabels {
    field: "relay2_time",
    title: "System Time",
    sentence: "System time",
};

/// Parses and validates the settings form.
pub fn validate_settings_form(form: &SettingsForm) -> Result<DeviceSettings, Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    let device_id = form.device_id.clone();
    check_device_id(&device_id, &mut issues);

    let min_voltage = match form.min_voltage.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => {
            check_min_voltage(v, &mut issues);
            Some(v)
        }
        _ => {
            issues.push(ValidationIssue::new(
                "min_voltage",
                "Minimum Voltage must be a number",
            ));
            None
        }
    };

    let relay1_time = parse_relay_time(&form.relay1_time, &CAMERA_TIME, &mut issues);
    let relay2_time = parse_relay_time(&form.relay2_time, &SYSTEM_TIME, &mut issues);

    match (min_voltage, relay1_time, relay2_time) {
        (Some(min_voltage), Some(relay1_time), Some(relay2_time)) if issues.is_empty() => {
            Ok(DeviceSettings {
                device_id,
                min_voltage,
                relay1_time,
                relay2_time,
            })
        }
        _ => Err(issues),
    }
}

/// Validates already-typed settings, as done again right before they are sent.
pub fn validate_device_settings(settings: &DeviceSettings) -> Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();
    check_device_id(&settings.device_id, &mut issues);
    if settings.min_voltage.is_finite() {
        check_min_voltage(settings.min_voltage, &mut issues);
    } else {
        issues.push(ValidationIssue::new(
            "min_voltage",
            "Minimum Voltage must be a number",
        ));
    }
    check_relay_time(settings.relay1_time, &CAMERA_TIME, &mut issues);
    check_relay_time(settings.relay2_time, &SYSTEM_TIME, &mut issues);

    if issues.is_empty() { Ok(()) } else { Err(issues) }
}

fn check_device_id(device_id: &str, issues: &mut Vec<ValidationIssue>) {
    if device_id.chars().count() > DEVICE_ID_MAX_LEN {
        issues.push(ValidationIssue::new(
            "device_id",
            "Device ID must be at most 32 characters",
        ));
    }
}

fn check_min_voltage(value: f64, issues: &mut Vec<ValidationIssue>) {
    let (min, max) = MIN_VOLTAGE_RANGE;
    if value < min {
        issues.push(ValidationIssue::new(
            "min_voltage",
            "Minimum voltage must be at least 9.0 Volts",
        ));
    } else if value > max {
        issues.push(ValidationIssue::new(
            "min_voltage",
            "Minimum voltage must be at most 15.0 Volts",
        ));
    } else if !has_one_decimal_place(value) {
        issues.push(ValidationIssue::new(
            "min_voltage",
            "Minimum voltage must have one decimal place",
        ));
    }
}

// Matches the browser check: value * 10 must be a whole number.
#[expect(clippy::float_cmp)]
fn has_one_decimal_place(value: f64) -> bool {
    (value * 10.0).fract() == 0.0
}

fn parse_relay_time(
    raw: &str,
    labels: &RelayLabels,
    issues: &mut Vec<ValidationIssue>,
) -> Option<u32> {
    let raw = raw.trim();
    let Ok(number) = raw.parse::<f64>() else {
        issues.push(ValidationIssue::new(
            labels.field,
            format!("{} must be a number", labels.title),
        ));
        return None;
    };
    if !number.is_finite() {
        issues.push(ValidationIssue::new(
            labels.field,
            format!("{} must be a number", labels.title),
        ));
        return None;
    }
    if !is_whole(number) {
        issues.push(ValidationIssue::new(
            labels.field,
            format!("{} must be an integer", labels.title),
        ));
        return None;
    }

    let (min, max) = RELAY_TIME_RANGE;
    if number < f64::from(min) {
        issues.push(below_range(labels));
        return None;
    }
    if number > f64::from(max) {
        issues.push(above_range(labels));
        return None;
    }
    Some(whole_minutes(number))
}

#[expect(clippy::float_cmp)]
fn is_whole(value: f64) -> bool {
    value.fract() == 0.0
}

// Only called with whole numbers inside the relay range.
#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_minutes(value: f64) -> u32 {
    value as u32
}

fn check_relay_time(value: u32, labels: &RelayLabels, issues: &mut Vec<ValidationIssue>) {
    let (min, max) = RELAY_TIME_RANGE;
    if value < min {
        issues.push(below_range(labels));
    } else if value > max {
        issues.push(above_range(labels));
    }
}

fn below_range(labels: &RelayLabels) -> ValidationIssue {
    ValidationIssue::new(
        labels.field,
        format!("{} must be at least 1 minute", labels.sentence),
    )
}

fn above_range(labels: &RelayLabels) -> ValidationIssue {
    ValidationIssue::new(
        labels.field,
        format!("{} must be at most 300 minutes (5 hours)", labels.sentence),
    )
}

/// Camera add/edit form exactly as submitted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CameraForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ip_address: String,
    #[serde(default = "default_port_field")]
    pub port: String,
}

impl Default for CameraForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            ip_address: String::new(),
            port: default_port_field(),
        }
    }
}

fn default_port_field() -> String {
    "80".to_owned()
}

/// A camera form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidCamera {
    pub name: String,
    pub ip_address: String,
    pub port: u16,
}

pub fn validate_camera_form(form: &CameraForm) -> Result<ValidCamera, Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    if form.name.trim().is_empty() {
        issues.push(ValidationIssue::new("name", "Camera name is required"));
    } else if form.name.chars().count() < 3 {
        issues.push(ValidationIssue::new(
            "name",
            "Name must be at least 3 characters long",
        ));
    }

    let ip_address = form.ip_address.trim();
    if ip_address.is_empty() {
        issues.push(ValidationIssue::new("ip_address", "IP address is required"));
    } else if ip_address.parse::<Ipv4Addr>().is_err() {
        issues.push(ValidationIssue::new(
            "ip_address",
            "Invalid IP address format",
        ));
    }

    let port = form.port.trim();
    let parsed_port = if port.is_empty() {
        issues.push(ValidationIssue::new("port", "Port is required"));
        None
    } else {
        match port.parse::<u16>() {
            Ok(p) if p >= 1 => Some(p),
            _ => {
                issues.push(ValidationIssue::new(
                    "port",
                    "Port must be between 1 and 65535",
                ));
                None
            }
        }
    };

    match parsed_port {
        Some(port) if issues.is_empty() => Ok(ValidCamera {
            name: form.name.clone(),
            ip_address: ip_address.to_owned(),
            port,
        }),
        _ => Err(issues),
    }
}
