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

/// A kind of event a camera can raise (e.g. phone usage, smoking).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertType {
    pub id: i64,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertTypesResponse {
    #[serde(default)]
    pub alert_types: Option<Vec<AlertType>>,
    #[serde(default)]
    pub total_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraAlert {
    pub id: i64,
    pub camera_id: i64,
    pub camera_name: String,
    pub alert_type_id: i64,
    pub alert_type_name: String,
    pub alert_type_code: String,
    pub resolved: bool,
    pub triggered_at: String,
    #[serde(default)]
    pub resolved_at: Option<String>,
    /// low / medium / high / critical
    #[serde(default)]
    pub severity: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraAlertList {
    #[serde(default)]
    pub alerts: Vec<CameraAlert>,
    #[serde(default)]
    pub total_count: u32,
}

/// Filters for `GET /alerts/cameras`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertQuery {
    pub camera_id: Option<i64>,
    pub alert_type_code: Option<String>,
    pub resolved: Option<bool>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl AlertQuery {
    /// Query string pairs. Zero ids, limits and offsets and empty codes are left out.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(camera_id) = self.camera_id.filter(|id| *id != 0) {
            pairs.push(("camera_id", camera_id.to_string()));
        }
        if let Some(code) = self.alert_type_code.as_deref().filter(|c| !c.is_empty()) {
            pairs.push(("alert_type_code", code.to_owned()));
        }
        if let Some(resolved) = self.resolved {
            pairs.push(("resolved", resolved.to_string()));
        }
        if let Some(limit) = self.limit.filter(|l| *l != 0) {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset.filter(|o| *o != 0) {
            pairs.push(("offset", offset.to_string()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_pairs_skip_empty_filters() {
        let query = AlertQuery {
            camera_id: Some(7),
            alert_type_code: Some(String::new()),
            resolved: Some(false),
            limit: Some(100),
            offset: Some(0),
        };

        assert_eq!(
            query.to_query_pairs(),
            vec![
                ("camera_id", "7".to_owned()),
                ("resolved", "false".to_owned()),
                ("limit", "100".to_owned()),
            ]
        );
    }

    #[test]
    fn test_default_query_is_empty() {
        assert!(AlertQuery::default().to_query_pairs().is_empty());
    }
}
