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
use std::future::Future;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use voltguard_backend::{BackendClient, BackendError, BackendResult, BackendSession};
use voltguard_core::{DashboardFeed, FeedError, FeedResult};
use voltguard_types::{
    CameraStatusSnapshot, Credentials, LocationData, LocationResponse, MetricsSnapshot,
};

/// Backend access with the configured service account.
///
/// Logs in lazily and keeps the token until the backend rejects it. A rejected token is
/// dropped and the next call logs in again; the failing call itself is not repeated.
/// Concurrent callers share a single login.
pub struct ServiceFeed {
    client: BackendClient,
    credentials: Credentials,
    session: RwLock<Option<BackendSession>>,
    login: Mutex<()>,
}

impl fmt::Debug for ServiceFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceFeed")
            .field("backend", &self.client.base_url())
            .field("username", &self.credentials.username)
            .field("logged_in", &self.session.read().is_some())
            .finish()
    }
}

impl ServiceFeed {
    pub fn new(client: BackendClient, credentials: Credentials) -> Self {
        Self {
            client,
            credentials,
            session: RwLock::new(None),
            login: Mutex::new(()),
        }
    }

    pub fn client(&self) -> &BackendClient {
        &self.client
    }

    async fn session(&self) -> BackendResult<BackendSession> {
        if let Some(session) = self.cached() {
            return Ok(session);
        }

        let _guard = self.login.lock().await;
        if let Some(session) = self.cached() {
            return Ok(session);
        }
        let login = self.client.login(&self.credentials).await?;
        info!(user = %self.credentials.username, "Service account logged in");
        let session = self.client.session(login.access_token);
        *self.session.write() = Some(session.clone());
        Ok(session)
    }

    async fn with_session<T, F, Fut>(&self, op: F) -> BackendResult<T>
    where
        F: FnOnce(BackendSession) -> Fut,
        Fut: Future<Output = BackendResult<T>>,
    {
        let session = self.session().await?;
        let token = session.token().to_owned();
        let result = op(session).await;
        if let Err(e) = &result
            && e.is_auth_failure()
        {
            self.forget(&token);
        }
        result
    }

    fn cached(&self) -> Option<BackendSession> {
        self.session.read().clone()
    }

    /// Drops the cached session if it still holds `rejected`.
    fn forget(&self, rejected: &str) {
        let mut session = self.session.write();
        if session.as_ref().is_some_and(|s| s.token() == rejected) {
            warn!("Service account token rejected, will log in again");
            *session = None;
        }
    }

    pub async fn device_status(&self) -> BackendResult<MetricsSnapshot> {
        self.with_session(|s| async move { s.device_status().await })
            .await
    }

    pub async fn camera_status(&self) -> BackendResult<CameraStatusSnapshot> {
        self.with_session(|s| async move { s.camera_status().await })
            .await
    }

    pub async fn today_locations(&self) -> BackendResult<LocationResponse> {
        self.with_session(|s| async move { s.today_locations().await })
            .await
    }
}

fn feed_error(endpoint: &str, err: BackendError) -> FeedError {
    debug!(endpoint, error = %err, "Backend fetch failed");
    match err {
        BackendError::Http(e) if e.is_decode() => FeedError::Decode {
            endpoint: endpoint.to_owned(),
            message: e.to_string(),
        },
        BackendError::Api { status, .. } => FeedError::Status {
            endpoint: endpoint.to_owned(),
            status,
        },
        BackendError::AuthenticationFailed | BackendError::InvalidCredentials => {
            FeedError::Status {
                endpoint: endpoint.to_owned(),
                status: 401,
            }
        }
        other => FeedError::Transport(other.to_string()),
    }
}

#[async_trait]
impl DashboardFeed for ServiceFeed {
    async fn metrics(&self) -> FeedResult<MetricsSnapshot> {
        self.device_status()
            .await
            .map_err(|e| feed_error("/status", e))
    }

    async fn camera_status(&self) -> FeedResult<CameraStatusSnapshot> {
        ServiceFeed::camera_status(self)
            .await
            .map_err(|e| feed_error("/cameras/status", e))
    }

    async fn today_locations(&self) -> FeedResult<Vec<LocationData>> {
        ServiceFeed::today_locations(self)
            .await
            .map(|envelope| envelope.locations)
            .map_err(|e| feed_error("/locations/today", e))
    }

    fn name(&self) -> &str {
        "backend"
    }
}
