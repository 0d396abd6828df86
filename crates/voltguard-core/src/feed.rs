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

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;
use voltguard_types::{CameraStatusSnapshot, LocationData, LocationResponse, MetricsSnapshot};

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("{endpoint} returned status {status}")]
    Status { endpoint: String, status: u16 },

    #[error("invalid {endpoint} payload: {message}")]
    Decode { endpoint: String, message: String },
}

pub type FeedResult<T> = Result<T, FeedError>;

/// Source of the three dashboard data streams.
///
/// The controller only sees success or failure; the reason is logged and discarded.
#[async_trait]
pub trait DashboardFeed: Send + Sync + 'static {
    async fn metrics(&self) -> FeedResult<MetricsSnapshot>;

    async fn camera_status(&self) -> FeedResult<CameraStatusSnapshot>;

    async fn today_locations(&self) -> FeedResult<Vec<LocationData>>;

    /// Name used in log lines
    fn name(&self) -> &str;
}

#[async_trait]
impl<F: DashboardFeed + ?Sized> DashboardFeed for Arc<F> {
    async fn metrics(&self) -> FeedResult<MetricsSnapshot> {
        (**self).metrics().await
    }

    async fn camera_status(&self) -> FeedResult<CameraStatusSnapshot> {
        (**self).camera_status().await
    }

    async fn today_locations(&self) -> FeedResult<Vec<LocationData>> {
        (**self).today_locations().await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Reads the `/api/*` JSON routes of a running dashboard.
#[derive(Debug, Clone)]
pub struct ApiFeed {
    base_url: String,
    client: Client,
}

impl ApiFeed {
    pub const METRICS_PATH: &'static str = "/api/metrics";
    pub const CAMERA_STATUS_PATH: &'static str = "/api/cameras/status";
    pub const LOCATIONS_PATH: &'static str = "/api/locations/today";

    pub fn new(base_url: impl Into<String>, timeout: Duration) -> FeedResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FeedError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> FeedResult<T> {
        let url = format!("{}{path}", self.base_url);
        debug!(url = %url, "Polling dashboard route");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FeedError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                endpoint: path.to_owned(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FeedError::Transport(e.to_string()))?;
        serde_json::from_slice(&body).map_err(|e| FeedError::Decode {
            endpoint: path.to_owned(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl DashboardFeed for ApiFeed {
    async fn metrics(&self) -> FeedResult<MetricsSnapshot> {
        self.get_json(Self::METRICS_PATH).await
    }

    async fn camera_status(&self) -> FeedResult<CameraStatusSnapshot> {
        self.get_json(Self::CAMERA_STATUS_PATH).await
    }

    async fn today_locations(&self) -> FeedResult<Vec<LocationData>> {
        let envelope: LocationResponse = self.get_json(Self::LOCATIONS_PATH).await?;
        Ok(envelope.locations)
    }

    fn name(&self) -> &str {
        "dashboard-api"
    }
}
