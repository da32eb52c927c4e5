// SPDX-License-Identifier: MIT

//! Logout workflow: session, credential, and game-data cleanup.
//!
//! Each cleanup step is guarded independently and the workflow always runs
//! every step, so a failing credential store still leaves the app as close
//! to a clean state as possible. Partial failures are reported per step in
//! [`LogoutResult::error_details`].

use crate::db::{keys, CredentialStore, GameStore};
use crate::models::LogoutResult;
use crate::services::steam::SteamAuthService;
use std::sync::Arc;

/// Step names used as `error_details` keys.
const STEP_AUTH_STATE: &str = "Authentication State";
const STEP_CREDENTIALS: &str = "Secure Credentials";
const STEP_GAME_DATA: &str = "Game Data";

/// Reverses authentication: clears the in-memory session, stored credentials
/// and, optionally, the imported game library.
pub struct LogoutFlow {
    steam: Arc<SteamAuthService>,
    credentials: Arc<dyn CredentialStore>,
    games: Arc<dyn GameStore>,
}

impl LogoutFlow {
    pub fn new(
        steam: Arc<SteamAuthService>,
        credentials: Arc<dyn CredentialStore>,
        games: Arc<dyn GameStore>,
    ) -> Self {
        Self {
            steam,
            credentials,
            games,
        }
    }

    /// Execute the logout workflow.
    ///
    /// `is_successful` stays true even when individual steps fail; it only
    /// flips when the workflow itself cannot run.
    pub async fn logout(&self, clear_game_data: bool) -> LogoutResult {
        let mut result = LogoutResult::new();

        tracing::info!(clear_game_data, "Starting logout");

        // Step 1: clear in-memory session. Infallible today, but kept as a
        // named step so a future session backend reports under the same key.
        self.steam.logout();
        tracing::debug!(step = STEP_AUTH_STATE, "Session cleared");

        // Step 2: clear stored credentials, attempting every key.
        let mut credential_errors = Vec::new();
        for key in [keys::API_KEY, keys::STEAM_ID, keys::USERNAME] {
            if let Err(e) = self.credentials.remove(key).await {
                tracing::warn!(key, error = %e, "Failed to clear credential");
                credential_errors.push(format!("{}: {}", key, e));
            }
        }
        if credential_errors.is_empty() {
            tracing::debug!(step = STEP_CREDENTIALS, "Credentials cleared");
        } else {
            result
                .error_details
                .insert(STEP_CREDENTIALS.to_string(), credential_errors.join("; "));
        }

        // Step 3: optionally purge the imported library.
        if clear_game_data {
            match self.games.delete_all().await {
                Ok(deleted) => {
                    tracing::info!(deleted, "Game library purged");
                    result.games_deleted_count = deleted;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to clear game data");
                    result
                        .error_details
                        .insert(STEP_GAME_DATA.to_string(), e.to_string());
                }
            }
        }

        result.is_successful = true;
        tracing::info!(
            partial_failures = result.error_details.len(),
            "Logout finished"
        );
        result
    }

    /// Confirm the credential clear actually took effect.
    ///
    /// Store writes are not guaranteed synchronous, so callers re-check after
    /// logout. True iff both the API key and the Steam ID read back absent
    /// or empty; a store read error reports as still-logged-in.
    pub async fn validate_logout(&self) -> bool {
        let api_key = self.credentials.get(keys::API_KEY).await;
        let steam_id = self.credentials.get(keys::STEAM_ID).await;

        match (api_key, steam_id) {
            (Ok(api_key), Ok(steam_id)) => {
                let logged_out = api_key.map_or(true, |v| v.is_empty())
                    && steam_id.map_or(true, |v| v.is_empty());
                tracing::debug!(logged_out, "Logout validation");
                logged_out
            }
            _ => {
                tracing::warn!("Logout validation failed to read credential store");
                false
            }
        }
    }
}
