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
use axum::http::StatusCode;
use axum::http::header::SET_COOKIE;
use axum::response::{Html, IntoResponse, Redirect, Response};
use thiserror::Error;
use tracing::error;
use voltguard_backend::BackendError;

use crate::sessions::expired_cookie;

/// Failures of HTML page handlers.
#[derive(Error, Debug)]
pub enum WebError {
    #[error("session expired")]
    SessionExpired,

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("template render error: {0}")]
    Render(#[from] askama::Error),

    #[error("{0}")]
    NotFound(String),
}

pub type WebResult<T> = Result<T, WebError>;

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, title) = match &self {
            Self::SessionExpired => {
                return ([(SET_COOKIE, expired_cookie())], Redirect::to("/login")).into_response();
            }
            Self::Backend(_) => (StatusCode::BAD_GATEWAY, "Backend error"),
            Self::Render(e) => {
                error!(error = %e, "Template render error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Error")
            }
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "Not found"),
        };

        let message = escape_html(&self.to_string());
        (
            status,
            Html(format!(
                "<html><body><h1>{title}</h1><p>{message}</p><p><a href=\"/\">Back to dashboard</a></p></body></html>"
            )),
        )
            .into_response()
    }
}

/// Renders a template into an HTML response.
pub fn render<T: Template>(template: &T) -> WebResult<Html<String>> {
    Ok(Html(template.render()?))
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
