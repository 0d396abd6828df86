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

//! Values computed from controller state for display.

use std::collections::BTreeMap;

use serde::Serialize;
use voltguard_types::{CameraAlert, LocationData};

/// Colour class of a host metric reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    Success,
    Warning,
    Error,
}

impl StatusLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// (warning, error) thresholds by metric kind
fn thresholds(kind: &str) -> Option<(f64, f64)> {
    match kind {
        "cpu" => Some((70.0, 85.0)),
        "ram" => Some((80.0, 90.0)),
        "disk" => Some((85.0, 95.0)),
        "temperature" => Some((60.0, 70.0)),
        _ => None,
    }
}

/// Classifies a reading of `kind` ("cpu", "ram", "disk" or "temperature").
pub fn metric_status(kind: &str, value: f64) -> StatusLevel {
    let Some((warning, error)) = thresholds(kind) else {
        return StatusLevel::Success;
    };
    if value >= error {
        StatusLevel::Error
    } else if value >= warning {
        StatusLevel::Warning
    } else {
        StatusLevel::Success
    }
}

/// Renders a relay hold time, e.g. `90` -> `"1h 30m"`.
pub fn format_minutes(minutes: u32) -> String {
    format!("{}h {}m", minutes.div_euclid(60), minutes.rem_euclid(60))
}

/// Camera ping as `"340ms"` or `"1.2s"`. Missing and zero readings show nothing.
pub fn format_response_time(ms: Option<f64>) -> Option<String> {
    let ms = ms.filter(|v| *v > 0.0)?;
    if ms < 1000.0 {
        Some(format!("{ms}ms"))
    } else {
        Some(format!("{:.1}s", ms / 1000.0))
    }
}

pub fn is_fast_response(ms: f64) -> bool {
    ms < 500.0
}

/// Today's track ordered oldest first.
///
/// Fixes whose timestamp cannot be parsed keep their relative order and sort first.
pub fn sorted_track(locations: &[LocationData]) -> Vec<LocationData> {
    let mut track = locations.to_vec();
    track.sort_by_key(LocationData::recorded_at);
    track
}

pub fn latest_location(locations: &[LocationData]) -> Option<LocationData> {
    sorted_track(locations).pop()
}

/// Deep link into the on-board camera portal.
pub fn camera_link(public_ip: &str, portal_port: u16, camera_id: i64) -> String {
    format!("http://{public_ip}:{portal_port}/#camera_{camera_id}")
}

pub fn portal_link(public_ip: &str, portal_port: u16) -> String {
    format!("http://{public_ip}:{portal_port}")
}

pub const SEVERITY_LEVELS: [&str; 4] = ["low", "medium", "high", "critical"];

/// Counters shown above the alert list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AlertStats {
    pub total: usize,
    pub active: usize,
    pub resolved: usize,
    pub by_severity: BTreeMap<String, usize>,
}

impl AlertStats {
    pub fn from_alerts(alerts: &[CameraAlert]) -> Self {
        let mut stats = Self {
            total: alerts.len(),
            ..Self::default()
        };
        for alert in alerts {
            if alert.resolved {
                stats.resolved += 1;
            } else {
                stats.active += 1;
            }
            if let Some(severity) = &alert.severity {
                *stats.by_severity.entry(severity.clone()).or_default() += 1;
            }
        }
        stats
    }
}

/// Severity filtering happens locally after the backend query.
pub fn filter_by_severity(alerts: Vec<CameraAlert>, severity: Option<&str>) -> Vec<CameraAlert> {
    match severity.filter(|s| !s.is_empty()) {
        Some(severity) => alerts
            .into_iter()
            .filter(|alert| alert.severity.as_deref() == Some(severity))
            .collect(),
        None => alerts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix(timestamp: &str, speed: f64) -> LocationData {
        LocationData {
            device_id: "D1".to_owned(),
            latitude: 50.08,
            longitude: 14.43,
            speed,
            hdop: 1.1,
            sats: 7,
            timestamp: timestamp.to_owned(),
        }
    }

    fn alert(id: i64, resolved: bool, severity: Option<&str>) -> CameraAlert {
        CameraAlert {
            id,
            camera_id: 1,
            camera_name: "Cabin".to_owned(),
            alert_type_id: 2,
            alert_type_name: "Phone usage".to_owned(),
            alert_type_code: "phone".to_owned(),
            resolved,
            triggered_at: "2025-03-01T08:00:00Z".to_owned(),
            resolved_at: None,
            severity: severity.map(str::to_owned),
        }
    }

    #[test]
    fn test_metric_thresholds() {
        assert_eq!(metric_status("cpu", 69.9), StatusLevel::Success);
        assert_eq!(metric_status("cpu", 70.0), StatusLevel::Warning);
        assert_eq!(metric_status("cpu", 85.0), StatusLevel::Error);
        assert_eq!(metric_status("ram", 89.0), StatusLevel::Warning);
        assert_eq!(metric_status("disk", 95.5), StatusLevel::Error);
        assert_eq!(metric_status("temperature", 61.0), StatusLevel::Warning);
        assert_eq!(metric_status("fan", 100.0), StatusLevel::Success);
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(0), "0h 0m");
        assert_eq!(format_minutes(45), "0h 45m");
        assert_eq!(format_minutes(300), "5h 0m");
    }

    #[test]
    fn test_format_response_time() {
        assert_eq!(format_response_time(Some(340.0)).as_deref(), Some("340ms"));
        assert_eq!(format_response_time(Some(1340.0)).as_deref(), Some("1.3s"));
        assert_eq!(format_response_time(Some(0.0)), None);
        assert_eq!(format_response_time(None), None);
        assert!(is_fast_response(499.0));
        assert!(!is_fast_response(500.0));
    }

    #[test]
    fn test_track_sorted_oldest_first() {
        let locations = vec![
            fix("2025-03-01T10:05:00Z", 3.0),
            fix("garbage", 9.0),
            fix("2025-03-01T09:55:00Z", 1.0),
            fix("2025-03-01T10:00:00", 2.0),
        ];

        let speeds: Vec<f64> = sorted_track(&locations).iter().map(|l| l.speed).collect();
        assert_eq!(speeds, vec![9.0, 1.0, 2.0, 3.0]);

        let latest = latest_location(&locations).unwrap();
        assert_eq!(latest.timestamp, "2025-03-01T10:05:00Z");
        assert!(latest_location(&[]).is_none());
    }

    #[test]
    fn test_camera_links() {
        assert_eq!(
            camera_link("203.0.113.9", 5000, 4),
            "http://203.0.113.9:5000/#camera_4"
        );
        assert_eq!(portal_link("203.0.113.9", 5000), "http://203.0.113.9:5000");
    }

    #[test]
    fn test_alert_stats_and_severity_filter() {
        let alerts = vec![
            alert(1, false, Some("high")),
            alert(2, true, Some("high")),
            alert(3, false, Some("low")),
            alert(4, false, None),
        ];

        let stats = AlertStats::from_alerts(&alerts);
        assert_eq!((stats.total, stats.active, stats.resolved), (4, 3, 1));
        assert_eq!(stats.by_severity.get("high"), Some(&2));
        assert_eq!(stats.by_severity.get("low"), Some(&1));

        let high = filter_by_severity(alerts.clone(), Some("high"));
        assert_eq!(high.len(), 2);
        assert_eq!(filter_by_severity(alerts, Some("")).len(), 4);
    }
}
