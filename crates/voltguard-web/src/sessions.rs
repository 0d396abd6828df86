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

//! Operator login sessions.
//!
//! The browser only holds an opaque id in the `voltguard_session` cookie; the backend access
//! token and the terminal history stay server-side.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::response::Redirect;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use tracing::{debug, info};
use uuid::Uuid;
use voltguard_backend::{BackendError, BackendSession};

use crate::error::WebError;
use crate::terminal::HistoryEntry;

pub const SESSION_COOKIE: &str = "voltguard_session";

#[derive(Debug, Clone)]
struct OperatorSession {
    user_name: String,
    backend: BackendSession,
    expires_at: DateTime<Utc>,
    history: Vec<HistoryEntry>,
}

#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, OperatorSession>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn create(&self, user_name: impl Into<String>, backend: BackendSession) -> Uuid {
        let id = Uuid::new_v4();
        let user_name = user_name.into();
        info!(user = %user_name, "Operator logged in");

        let mut sessions = self.sessions.write();
        let now = Utc::now();
        sessions.retain(|_, session| session.expires_at > now);
        sessions.insert(
            id,
            OperatorSession {
                user_name,
                backend,
                expires_at: now + self.ttl,
                history: Vec::new(),
            },
        );
        id
    }

    /// Returns the operator name and backend access for a live session.
    pub fn lookup(&self, id: Uuid) -> Option<(String, BackendSession)> {
        {
            let sessions = self.sessions.read();
            let session = sessions.get(&id)?;
            if session.expires_at > Utc::now() {
                return Some((session.user_name.clone(), session.backend.clone()));
            }
        }
        debug!(session = %id, "Session expired");
        self.remove(id);
        None
    }

    pub fn remove(&self, id: Uuid) {
        if let Some(session) = self.sessions.write().remove(&id) {
            info!(user = %session.user_name, "Operator session ended");
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn push_history(&self, id: Uuid, entry: HistoryEntry) {
        if let Some(session) = self.sessions.write().get_mut(&id) {
            session.history.push(entry);
        }
    }

    pub fn history(&self, id: Uuid) -> Vec<HistoryEntry> {
        self.sessions
            .read()
            .get(&id)
            .map(|session| session.history.clone())
            .unwrap_or_default()
    }

    pub fn clear_history(&self, id: Uuid) {
        if let Some(session) = self.sessions.write().get_mut(&id) {
            session.history.clear();
        }
    }
}

/// Reads the session id from the request cookies.
pub fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| value.parse().ok())
}

pub fn session_cookie(id: Uuid, ttl: Duration) -> String {
    format!(
        "{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        ttl.num_seconds()
    )
}

pub fn expired_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// A logged-in operator. Extracting it redirects anonymous requests to `/login`.
#[derive(Debug, Clone)]
pub struct Operator {
    pub id: Uuid,
    pub name: String,
    pub backend: BackendSession,
    store: Arc<SessionStore>,
}

impl Operator {
    /// Maps a backend failure to a page error, ending the session on auth failures.
    pub fn fail(&self, err: BackendError) -> WebError {
        if err.is_auth_failure() {
            self.store.remove(self.id);
            WebError::SessionExpired
        } else {
            WebError::Backend(err)
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.store
    }
}

impl<S> FromRequestParts<S> for Operator
where
    Arc<SessionStore>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let store = Arc::<SessionStore>::from_ref(state);
        let Some(id) = session_id(&parts.headers) else {
            return Err(Redirect::to("/login"));
        };
        let Some((name, backend)) = store.lookup(id) else {
            return Err(Redirect::to("/login"));
        };

        Ok(Self {
            id,
            name,
            backend,
            store,
        })
    }
}
