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

use crate::DeviceMetric;

/// Body of `POST /configure`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceSettings {
    pub device_id: String,
    pub min_voltage: f64,
    /// Camera relay hold time in minutes
    pub relay1_time: u32,
    /// Computer relay hold time in minutes
    pub relay2_time: u32,
}

impl From<&DeviceMetric> for DeviceSettings {
    fn from(device: &DeviceMetric) -> Self {
        Self {
            device_id: device.device_id.clone().unwrap_or_default(),
            min_voltage: device.min_voltage_or_default(),
            relay1_time: device.relay1_time_or_default(),
            relay2_time: device.relay2_time_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_from_device_metric() {
        let device = DeviceMetric {
            device_id: Some("VAN-07".to_owned()),
            min_voltage: Some(11.5),
            relay1_time: Some(30),
            ..DeviceMetric::default()
        };

        let settings = DeviceSettings::from(&device);
        assert_eq!(settings.device_id, "VAN-07");
        assert!((settings.min_voltage - 11.5).abs() < f64::EPSILON);
        assert_eq!(settings.relay1_time, 30);
        assert_eq!(settings.relay2_time, 0);
    }
}
