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

use std::fmt;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info, warn};
use voltguard_core::validation::validate_device_settings;
use voltguard_types::{
    AlertQuery, AlertType, AlertTypesResponse, AvailableCommands, Camera, CameraAlertList,
    CameraStatusSnapshot, CameraUpdate, CommandRequest, CommandResponse, Credentials,
    DeviceSettings, LocationResponse, LoginResponse, MetricsSnapshot, NewCamera,
};

use crate::errors::{BackendError, BackendResult};

/// Unauthenticated entry point: holds the base URL and the shared connection pool.
#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: String,
    client: Client,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> BackendResult<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            return Err(BackendError::Config("backend URL is empty".to_owned()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Exchanges credentials for an access token.
    ///
    /// Empty fields are rejected without contacting the backend.
    pub async fn login(&self, credentials: &Credentials) -> BackendResult<LoginResponse> {
        if !credentials.is_complete() {
            return Err(BackendError::InvalidCredentials);
        }

        debug!(username = %credentials.username, "Logging in to backend");
        let response = self
            .client
            .post(self.url("/login"))
            .json(credentials)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let login = response.json::<LoginResponse>().await?;
                info!(user = %login.name, "Backend login succeeded");
                Ok(login)
            }
            StatusCode::BAD_REQUEST
            | StatusCode::UNAUTHORIZED
            | StatusCode::FORBIDDEN
            | StatusCode::NOT_FOUND
            | StatusCode::UNPROCESSABLE_ENTITY => {
                warn!(
                    username = %credentials.username,
                    status = %response.status(),
                    "Backend rejected login"
                );
                Err(BackendError::InvalidCredentials)
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(BackendError::from_response(status, &body))
            }
        }
    }

    /// A client that authenticates every request with `token`.
    pub fn session(&self, token: impl Into<String>) -> BackendSession {
        BackendSession {
            client: self.clone(),
            token: token.into(),
        }
    }
}

/// Authenticated backend access. One request per call, no retries.
#[derive(Clone)]
pub struct BackendSession {
    client: BackendClient,
    token: String,
}

impl fmt::Debug for BackendSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendSession")
            .field("base_url", &self.client.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl BackendSession {
    pub fn token(&self) -> &str {
        &self.token
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .bearer_auth(&self.token)
            .header(CONTENT_TYPE, "application/json")
    }

    async fn send(&self, builder: RequestBuilder) -> BackendResult<Response> {
        let response = self.request(builder).send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!(url = %response.url(), status = %status, "Backend rejected access token");
            return Err(BackendError::AuthenticationFailed);
        }

        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        let err = BackendError::from_response(status, &body);
        warn!(url = %url, status = %status, error = %err, "Backend request failed");
        Err(err)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> BackendResult<T> {
        let url = self.client.url(path);
        debug!(url = %url, "GET");
        let response = self.send(self.client.client.get(url)).await?;
        Ok(response.json::<T>().await?)
    }

    async fn send_json<B, T>(&self, builder: RequestBuilder, body: &B) -> BackendResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(builder.json(body)).await?;
        Ok(response.json::<T>().await?)
    }

    pub async fn device_status(&self) -> BackendResult<MetricsSnapshot> {
        self.get_json("/status").await
    }

    pub async fn camera_status(&self) -> BackendResult<CameraStatusSnapshot> {
        self.get_json("/cameras/status").await
    }

    pub async fn today_locations(&self) -> BackendResult<LocationResponse> {
        self.get_json("/locations/today").await
    }

    pub async fn create_camera(&self, camera: &NewCamera) -> BackendResult<Camera> {
        info!(name = %camera.name, ip = %camera.ip_address, "Creating camera");
        let builder = self.client.client.post(self.client.url("/cameras"));
        self.send_json(builder, camera).await
    }

    pub async fn update_camera(
        &self,
        camera_id: i64,
        update: &CameraUpdate,
    ) -> BackendResult<Camera> {
        info!(camera_id, "Updating camera");
        let builder = self
            .client
            .client
            .put(self.client.url(&format!("/cameras/{camera_id}")));
        self.send_json(builder, update).await
    }

    pub async fn set_camera_active(
        &self,
        camera_id: i64,
        is_active: bool,
    ) -> BackendResult<Camera> {
        self.update_camera(camera_id, &CameraUpdate::active(is_active))
            .await
    }

    pub async fn delete_camera(&self, camera_id: i64) -> BackendResult<()> {
        info!(camera_id, "Deleting camera");
        let url = self.client.url(&format!("/cameras/{camera_id}"));
        self.send(self.client.client.delete(url)).await?;
        Ok(())
    }

    /// A missing list in the response is treated as no alert types.
    pub async fn alert_types(&self) -> BackendResult<Vec<AlertType>> {
        let response: AlertTypesResponse = self.get_json("/alerts/types").await?;
        Ok(response.alert_types.unwrap_or_default())
    }

    pub async fn camera_alerts(&self, query: &AlertQuery) -> BackendResult<CameraAlertList> {
        let url = self.client.url("/alerts/cameras");
        debug!(url = %url, query = ?query, "GET");
        let builder = self.client.client.get(url).query(&query.to_query_pairs());
        let response = self.send(builder).await?;
        Ok(response.json::<CameraAlertList>().await?)
    }

    pub async fn resolve_alert(&self, alert_id: i64) -> BackendResult<Value> {
        info!(alert_id, "Resolving alert");
        let builder = self
            .client
            .client
            .put(self.client.url(&format!("/alerts/cameras/{alert_id}/resolve")));
        self.send_json(builder, &json!({ "resolved": true })).await
    }

    /// Pushes device settings. They are validated again before anything is sent.
    pub async fn configure(&self, settings: &DeviceSettings) -> BackendResult<()> {
        validate_device_settings(settings).map_err(BackendError::Validation)?;

        info!(
            device_id = %settings.device_id,
            min_voltage = settings.min_voltage,
            relay1_time = settings.relay1_time,
            relay2_time = settings.relay2_time,
            "Sending device configuration"
        );
        let builder = self.client.client.post(self.client.url("/configure"));
        self.send(builder.json(settings)).await?;
        Ok(())
    }

    pub async fn available_commands(&self) -> BackendResult<AvailableCommands> {
        self.get_json("/terminal/commands").await
    }

    pub async fn execute_command(
        &self,
        request: &CommandRequest,
    ) -> BackendResult<CommandResponse> {
        info!(command = %request.display(), "Executing remote command");
        let builder = self.client.client.post(self.client.url("/terminal/execute"));
        self.send_json(builder, request).await
    }
}
