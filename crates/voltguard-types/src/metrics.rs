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

const ON: &str = "On";
const OFF: &str = "Off";
const GPS_VALID: &str = "Valid";

/// Device and host status as reported by the backend `/status` endpoint.
///
/// Always replaced as a whole; the two halves are never merged across fetches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    #[serde(default)]
    pub device_status: Option<DeviceMetric>,
    #[serde(default)]
    pub host_status: Option<HostMetric>,
}

impl MetricsSnapshot {
    pub fn device(&self) -> DeviceMetric {
        self.device_status.clone().unwrap_or_default()
    }

    pub fn host(&self) -> HostMetric {
        self.host_status.clone().unwrap_or_default()
    }
}

/// Power-management board state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceMetric {
    #[serde(default)]
    pub device_id: Option<String>,
    /// "On" / "Off"
    #[serde(default)]
    pub ignition: Option<String>,
    #[serde(default)]
    pub battery_voltage: Option<f64>,
    #[serde(default)]
    pub min_voltage: Option<f64>,
    /// Camera relay
    #[serde(default)]
    pub relay1_status: Option<String>,
    /// Computer relay
    #[serde(default)]
    pub relay2_status: Option<String>,
    /// Minutes the camera relay stays powered after ignition off
    #[serde(default)]
    pub relay1_time: Option<u32>,
    /// Minutes the computer relay stays powered after ignition off
    #[serde(default)]
    pub relay2_time: Option<u32>,
    #[serde(default)]
    pub gps_status: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl DeviceMetric {
    pub fn device_id_or_default(&self) -> &str {
        self.device_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .unwrap_or("Not Configured")
    }

    pub fn ignition_or_default(&self) -> &str {
        self.ignition.as_deref().unwrap_or(OFF)
    }

    pub fn is_ignition_on(&self) -> bool {
        self.ignition.as_deref() == Some(ON)
    }

    pub fn relay1_status_or_default(&self) -> &str {
        self.relay1_status.as_deref().unwrap_or(OFF)
    }

    pub fn relay2_status_or_default(&self) -> &str {
        self.relay2_status.as_deref().unwrap_or(OFF)
    }

    pub fn is_relay1_on(&self) -> bool {
        self.relay1_status.as_deref() == Some(ON)
    }

    pub fn is_relay2_on(&self) -> bool {
        self.relay2_status.as_deref() == Some(ON)
    }

    pub fn relay1_time_or_default(&self) -> u32 {
        self.relay1_time.unwrap_or(0)
    }

    pub fn relay2_time_or_default(&self) -> u32 {
        self.relay2_time.unwrap_or(0)
    }

    pub fn battery_voltage_or_default(&self) -> f64 {
        self.battery_voltage.unwrap_or(0.0)
    }

    pub fn min_voltage_or_default(&self) -> f64 {
        self.min_voltage.unwrap_or(0.0)
    }

    /// Only a fully reported pair of readings can flag a low battery.
    pub fn is_battery_low(&self) -> bool {
        match (self.battery_voltage, self.min_voltage) {
            (Some(voltage), Some(min)) => voltage <= min,
            _ => false,
        }
    }

    pub fn is_gps_active(&self) -> bool {
        self.gps_status.as_deref() == Some(GPS_VALID)
    }
}

/// On-board computer resources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostMetric {
    #[serde(default)]
    pub host_ip: Option<String>,
    #[serde(default)]
    pub public_ip: Option<String>,
    #[serde(default)]
    pub cpu_usage: Option<f64>,
    #[serde(default)]
    pub ram_usage: Option<f64>,
    #[serde(default)]
    pub disk_usage: Option<f64>,
    /// Degrees Celsius
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub online: Option<bool>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl HostMetric {
    pub fn cpu_usage_or_default(&self) -> f64 {
        self.cpu_usage.unwrap_or(0.0)
    }

    pub fn ram_usage_or_default(&self) -> f64 {
        self.ram_usage.unwrap_or(0.0)
    }

    pub fn disk_usage_or_default(&self) -> f64 {
        self.disk_usage.unwrap_or(0.0)
    }

    pub fn temperature_or_default(&self) -> f64 {
        self.temperature.unwrap_or(0.0)
    }

    pub fn is_online(&self) -> bool {
        self.online.unwrap_or(false)
    }

    pub fn host_ip_or_default(&self) -> &str {
        self.host_ip.as_deref().unwrap_or("-")
    }

    pub fn public_ip_or_default(&self) -> &str {
        self.public_ip.as_deref().unwrap_or("")
    }
}
