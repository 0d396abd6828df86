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

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono_tz::Tz;
use serde::Deserialize;
use voltguard_types::Credentials;

/// Overrides `backend.api_url` when set.
pub const API_URL_ENV: &str = "API_URL";

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSettings,
    pub backend: BackendSettings,
    #[serde(default)]
    pub dashboard: DashboardSettings,
    #[serde(default)]
    pub auth: AuthSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Backend API location and the service account used for polling.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendSettings {
    #[serde(default)]
    pub api_url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardSettings {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_camera_portal_port")]
    pub camera_portal_port: u16,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: u64,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_owned()
}

fn default_port() -> u16 {
    3000
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_poll_interval_secs() -> u64 {
    10
}

fn default_camera_portal_port() -> u16 {
    5000
}

fn default_timezone() -> String {
    "UTC".to_owned()
}

fn default_session_ttl_hours() -> u64 {
    12
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            camera_portal_port: default_camera_portal_port(),
            timezone: default_timezone(),
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            session_ttl_hours: default_session_ttl_hours(),
        }
    }
}

impl BackendSettings {
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.username.clone(), self.password.clone())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl DashboardSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Falls back to UTC; `validate` rejects unknown names at load time.
    pub fn tz(&self) -> Tz {
        self.timezone.parse().unwrap_or(Tz::UTC)
    }
}

impl AuthSettings {
    pub fn session_ttl(&self) -> chrono::Duration {
        let hours = i64::try_from(self.session_ttl_hours).unwrap_or(i64::MAX);
        chrono::Duration::try_hours(hours).unwrap_or(chrono::Duration::MAX)
    }
}

impl ServerConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(Path::new(path))
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_toml(&content, std::env::var(API_URL_ENV).ok())
    }

    /// Parses and validates; `api_url_override` replaces `backend.api_url` when non-empty.
    pub fn from_toml(content: &str, api_url_override: Option<String>) -> Result<Self> {
        let mut config: Self =
            toml::from_str(content).with_context(|| "Failed to parse config TOML")?;
        if let Some(url) = api_url_override.filter(|u| !u.trim().is_empty()) {
            config.backend.api_url = url;
        }
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.backend.api_url.trim().is_empty() {
            bail!("backend.api_url must be set (or provide the {API_URL_ENV} environment variable)");
        }
        if self.backend.username.is_empty() || self.backend.password.is_empty() {
            bail!("backend.username and backend.password must be set for the service account");
        }
        if self.backend.timeout_secs == 0 {
            bail!("backend.timeout_secs must be greater than zero");
        }
        if self.dashboard.poll_interval_secs == 0 {
            bail!("dashboard.poll_interval_secs must be greater than zero");
        }
        if self.dashboard.timezone.parse::<Tz>().is_err() {
            bail!("dashboard.timezone '{}' is not a known time zone", self.dashboard.timezone);
        }
        if self.auth.session_ttl_hours == 0 {
            bail!("auth.session_ttl_hours must be greater than zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = r#"
[backend]
api_url = "http://localhost:8000"
username = "dashboard"
password = "secret"
"#;

    #[test]
    fn test_defaults_applied() {
        let config = ServerConfig::from_toml(MINIMAL, None).unwrap();
        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.backend.timeout_secs, 10);
        assert_eq!(config.dashboard.poll_interval(), Duration::from_secs(10));
        assert_eq!(config.dashboard.camera_portal_port, 5000);
        assert_eq!(config.dashboard.tz(), Tz::UTC);
        assert_eq!(config.auth.session_ttl(), chrono::Duration::hours(12));
    }

    #[test]
    fn test_env_override_replaces_url() {
        let config =
            ServerConfig::from_toml(MINIMAL, Some("http://backend:9000".to_owned())).unwrap();
        assert_eq!(config.backend.api_url, "http://backend:9000");

        let config = ServerConfig::from_toml(MINIMAL, Some("  ".to_owned())).unwrap();
        assert_eq!(config.backend.api_url, "http://localhost:8000");
    }

    #[test]
    fn test_missing_url_rejected_without_override() {
        let content = "[backend]\nusername = \"a\"\npassword = \"b\"\n";
        assert!(ServerConfig::from_toml(content, None).is_err());
        assert!(ServerConfig::from_toml(content, Some("http://b".to_owned())).is_ok());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let zero_interval = format!("{MINIMAL}\n[dashboard]\npoll_interval_secs = 0\n");
        assert!(ServerConfig::from_toml(&zero_interval, None).is_err());

        let bad_zone = format!("{MINIMAL}\n[dashboard]\ntimezone = \"Mars/Olympus\"\n");
        assert!(ServerConfig::from_toml(&bad_zone, None).is_err());

        let no_password = "[backend]\napi_url = \"http://x\"\nusername = \"a\"\n";
        assert!(ServerConfig::from_toml(no_password, None).is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "{MINIMAL}\n[server]\nport = 8080\n\n[dashboard]\ntimezone = \"America/Sao_Paulo\"\n"
        )
        .unwrap();

        let config = ServerConfig::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.dashboard.tz(), chrono_tz::America::Sao_Paulo);
    }

    #[test]
    fn test_missing_file() {
        let result = ServerConfig::from_file("/nonexistent/voltguard.toml");
        assert!(result.is_err());
    }
}
