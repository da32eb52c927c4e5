// SPDX-License-Identifier: MIT

//! Application configuration loaded from environment variables.
//!
//! The Steam Web API key is deliberately not part of the configuration: it is
//! entered by the user at login time and lives in the credential store.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// URL Steam redirects back to after the OpenID round-trip.
    pub return_url: String,
    /// OpenID realm (the registered base identifier of this app).
    pub realm: String,
    /// How long to wait for the browser callback before giving up.
    pub auth_timeout_secs: u64,
    /// Path of the file-backed credential store.
    pub credentials_path: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            return_url: env::var("STEAM_RETURN_URL")
                .map_err(|_| ConfigError::Missing("STEAM_RETURN_URL"))?,
            realm: env::var("STEAM_REALM").unwrap_or_else(|_| "https://my-app".to_string()),
            auth_timeout_secs: env::var("AUTH_TIMEOUT_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .unwrap_or(300),
            credentials_path: env::var("CREDENTIALS_PATH")
                .unwrap_or_else(|_| "credentials.json".to_string()),
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            return_url: "steamshelf://auth/callback".to_string(),
            realm: "https://my-app".to_string(),
            auth_timeout_secs: 300,
            credentials_path: "credentials.json".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
