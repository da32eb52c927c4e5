// SPDX-License-Identifier: MIT

//! End-to-end login orchestration.
//!
//! Turns raw callback parameters into a typed [`AuthenticationResult`]. Every
//! step catches its own failures; callers only ever observe a result value,
//! never an error, so the UI cannot be left hanging on a raw failure.

use crate::db::{keys, CredentialStore};
use crate::error::AppError;
use crate::models::{AuthenticationResult, AuthenticationStatus, StatusSeverity};
use crate::services::browser::BrowserAuthBroker;
use crate::services::openid::{self, CallbackParams};
use crate::services::steam::SteamAuthService;
use std::sync::Arc;
use std::time::Duration;

/// Drives the login sequence: browser round-trip, response processing,
/// credential persistence.
pub struct AuthPipeline {
    steam: Arc<SteamAuthService>,
    credentials: Arc<dyn CredentialStore>,
    broker: Arc<BrowserAuthBroker>,
    return_url: String,
    timeout: Duration,
}

impl AuthPipeline {
    pub fn new(
        steam: Arc<SteamAuthService>,
        credentials: Arc<dyn CredentialStore>,
        broker: Arc<BrowserAuthBroker>,
        return_url: String,
        timeout: Duration,
    ) -> Self {
        Self {
            steam,
            credentials,
            broker,
            return_url,
            timeout,
        }
    }

    /// Run the full login flow: open the browser, await the callback, process
    /// the response.
    pub async fn login(&self, api_key: &str) -> AuthenticationResult {
        let auth_url = self.steam.auth_url(&self.return_url);

        let params = match self.broker.authenticate(&auth_url, self.timeout).await {
            Ok(params) => params,
            Err(e) => {
                tracing::warn!(error = %e, "Browser authentication failed");
                let status = if e.is_network() {
                    AuthenticationStatus::NetworkError
                } else {
                    AuthenticationStatus::UnknownError
                };
                return AuthenticationResult::failure(status, e.to_string());
            }
        };

        self.process_callback(&params, api_key).await
    }

    /// Process callback parameters into a terminal result.
    ///
    /// Checks run strictly in order and short-circuit at the first failure:
    /// cancellation, response shape, ID extraction, ID format, server
    /// verification (with a parsed-vs-verified ID cross-check against forged
    /// claimed_id values), profile fetch, credential persistence.
    pub async fn process_callback(
        &self,
        params: &CallbackParams,
        api_key: &str,
    ) -> AuthenticationResult {
        if openid::was_cancelled(params) {
            let message = openid::error_message(params);
            tracing::info!(message = %message, "Authentication cancelled");
            return AuthenticationResult::failure(AuthenticationStatus::Cancelled, message);
        }

        if !openid::is_valid_openid_response(params) {
            tracing::warn!("Invalid OpenID response structure");
            return AuthenticationResult::failure(
                AuthenticationStatus::InvalidCredentials,
                "Invalid authentication response from Steam.",
            );
        }

        let steam_id = match openid::extract_steam_id(params) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(error = %e, "Steam ID extraction failed");
                return AuthenticationResult::failure(
                    AuthenticationStatus::InvalidCredentials,
                    format!("Could not extract Steam ID: {}", e),
                );
            }
        };

        if !steam_id.bytes().all(|b| b.is_ascii_digit()) {
            return AuthenticationResult::failure(
                AuthenticationStatus::InvalidCredentials,
                "Invalid Steam ID format.",
            );
        }

        match self.steam.verify(params).await {
            Ok(verified_id) if verified_id != steam_id => {
                tracing::warn!(
                    parsed = %steam_id,
                    verified = %verified_id,
                    "Steam ID mismatch during verification"
                );
                return AuthenticationResult::failure_with_id(
                    AuthenticationStatus::InvalidCredentials,
                    steam_id,
                    "Steam ID verification failed.",
                );
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Steam verification failed");
                return AuthenticationResult::failure_with_id(
                    AuthenticationStatus::NetworkError,
                    steam_id,
                    format!("Failed to verify authentication with Steam: {}", e),
                );
            }
        }

        let user = match self.steam.fetch_profile(&steam_id, api_key).await {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(error = %e, "Profile fetch failed");
                return AuthenticationResult::failure_with_id(
                    AuthenticationStatus::NetworkError,
                    steam_id,
                    format!("Failed to fetch user profile: {}", e),
                );
            }
        };

        if let Err(e) = self.persist_credentials(api_key, &user.steam_id, &user.username).await {
            tracing::error!(error = %e, "Failed to persist credentials");
            return AuthenticationResult::failure_with_id(
                AuthenticationStatus::UnknownError,
                steam_id,
                format!("An unexpected error occurred: {}", e),
            );
        }

        tracing::info!(
            steam_id = %user.steam_id,
            username = %user.username,
            "Authentication successful"
        );
        AuthenticationResult::success(user)
    }

    async fn persist_credentials(
        &self,
        api_key: &str,
        steam_id: &str,
        username: &str,
    ) -> Result<(), AppError> {
        self.credentials.set(keys::API_KEY, api_key).await?;
        self.credentials.set(keys::STEAM_ID, steam_id).await?;
        self.credentials.set(keys::USERNAME, username).await?;
        Ok(())
    }
}

/// User-facing message for a result. Pure; no side effects.
pub fn status_message(result: &AuthenticationResult) -> String {
    match result.status {
        AuthenticationStatus::Success => {
            let username = result
                .user
                .as_ref()
                .map(|u| u.username.as_str())
                .unwrap_or_default();
            format!("Welcome, {}!", username)
        }
        AuthenticationStatus::Cancelled => "Authentication was cancelled.".to_string(),
        AuthenticationStatus::NetworkError => {
            "Network error. Please check your connection and try again.".to_string()
        }
        AuthenticationStatus::InvalidCredentials | AuthenticationStatus::UnknownError => result
            .error_message
            .clone()
            .unwrap_or_else(|| "Authentication failed.".to_string()),
        AuthenticationStatus::Pending => "Authentication pending...".to_string(),
    }
}

/// Severity tag for rendering a result's message. Pure; no side effects.
pub fn status_severity(result: &AuthenticationResult) -> StatusSeverity {
    match result.status {
        AuthenticationStatus::Success => StatusSeverity::Success,
        AuthenticationStatus::Cancelled => StatusSeverity::Warning,
        AuthenticationStatus::InvalidCredentials
        | AuthenticationStatus::NetworkError
        | AuthenticationStatus::UnknownError => StatusSeverity::Error,
        AuthenticationStatus::Pending => StatusSeverity::Info,
    }
}
