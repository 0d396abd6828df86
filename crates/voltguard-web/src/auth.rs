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

use askama::Template;
use axum::Form;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::response::{Html, IntoResponse, Redirect, Response};
use tracing::{info, warn};
use voltguard_types::Credentials;

use crate::AppState;
use crate::error::{WebResult, render};
use crate::sessions::{Operator, expired_cookie, session_cookie};

#[derive(Debug, Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub username: String,
    pub error: Option<String>,
}

#[derive(Debug, Template)]
#[template(path = "users.html")]
pub struct UsersTemplate {
    pub operator: String,
}

pub async fn login_page() -> WebResult<Html<String>> {
    render(&LoginTemplate {
        username: String::new(),
        error: None,
    })
}

/// Exchanges the submitted credentials for a backend token and opens a session.
pub async fn login_handler(
    State(state): State<AppState>,
    Form(credentials): Form<Credentials>,
) -> WebResult<Response> {
    match state.backend.login(&credentials).await {
        Ok(login) => {
            let name = if login.name.is_empty() {
                credentials.username
            } else {
                login.name
            };
            let backend = state.backend.session(login.access_token);
            let id = state.sessions.create(name, backend);
            Ok((
                [(SET_COOKIE, session_cookie(id, state.sessions.ttl()))],
                Redirect::to("/"),
            )
                .into_response())
        }
        Err(e) => {
            warn!(username = %credentials.username, error = %e, "Login failed");
            let page = render(&LoginTemplate {
                username: credentials.username,
                error: Some(e.to_string()),
            })?;
            Ok(page.into_response())
        }
    }
}

pub async fn logout_handler(operator: Operator) -> impl IntoResponse {
    info!(user = %operator.name, "Logout");
    operator.sessions().remove(operator.id);
    ([(SET_COOKIE, expired_cookie())], Redirect::to("/login"))
}

pub async fn users_page(operator: Operator) -> WebResult<Html<String>> {
    render(&UsersTemplate {
        operator: operator.name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_page_shows_error() {
        let html = LoginTemplate {
            username: "operator".to_owned(),
            error: Some("Invalid username or password".to_owned()),
        }
        .render()
        .unwrap();
        assert!(html.contains("Invalid username or password"));
        assert!(html.contains("value=\"operator\""));
    }
}
