// SPDX-License-Identifier: MIT

//! Steam endpoints: OpenID verification, player profiles, owned games.
//!
//! Handles:
//! - Building the OpenID `checkid_setup` redirect URL
//! - Re-submitting callback parameters to `check_auth`
//! - Fetching the authenticated user's public profile
//! - API key validation and owned-games import

use crate::db::GameStore;
use crate::error::{AppError, Result};
use crate::models::{AuthenticationUser, Game};
use crate::services::openid::{self, CallbackParams};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Mutex;

const STEAM_OPENID_URL: &str = "https://steamcommunity.com/openid/login";
const STEAM_API_BASE_URL: &str = "https://api.steampowered.com";

/// Check response status and return the plain-text body.
async fn check_response_text(response: reqwest::Response) -> Result<String> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AppError::SteamApi(format!("HTTP {}: {}", status, body)));
    }

    response
        .text()
        .await
        .map_err(|e| AppError::SteamApi(format!("failed to read response body: {}", e)))
}

/// Check response status and parse the JSON body.
async fn check_response_json<T: for<'de> serde::Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AppError::SteamApi(format!("HTTP {}: {}", status, body)));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::SteamApi(format!("JSON parse error: {}", e)))
}

/// Steam OpenID authentication service.
///
/// Owns the HTTP client for the OpenID and profile endpoints and caches the
/// current session user. The cached user is replaced whole on each login and
/// cleared on logout.
pub struct SteamAuthService {
    http: reqwest::Client,
    openid_url: String,
    api_base_url: String,
    realm: String,
    current_user: Mutex<Option<AuthenticationUser>>,
}

impl SteamAuthService {
    /// Create a new service pointed at the real Steam endpoints.
    pub fn new(realm: String) -> Self {
        Self::with_endpoints(
            realm,
            STEAM_OPENID_URL.to_string(),
            STEAM_API_BASE_URL.to_string(),
        )
    }

    /// Create a service with overridden endpoints (tests).
    pub fn with_endpoints(realm: String, openid_url: String, api_base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            openid_url,
            api_base_url,
            realm,
            current_user: Mutex::new(None),
        }
    }

    /// Build the OpenID `checkid_setup` redirect URL for the given return URL.
    pub fn auth_url(&self, return_url: &str) -> String {
        let parameters = [
            ("openid.ns", "http://specs.openid.net/auth/2.0"),
            ("openid.mode", "checkid_setup"),
            ("openid.return_to", return_url),
            ("openid.realm", self.realm.as_str()),
            (
                "openid.identity",
                "http://specs.openid.net/auth/2.0/identifier_select",
            ),
            (
                "openid.claimed_id",
                "http://specs.openid.net/auth/2.0/identifier_select",
            ),
        ];

        let query = parameters
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        format!("{}?{}", self.openid_url, query)
    }

    /// Verify the OpenID assertion with the Steam servers.
    ///
    /// Re-POSTs all callback parameters with `openid.mode` overridden to
    /// `check_auth`; Steam answers a plain-text body and only the literal
    /// `is_valid:true` counts as confirmation. Returns the Steam ID taken
    /// from `openid.claimed_id` once the assertion is confirmed genuine.
    pub async fn verify(&self, params: &CallbackParams) -> Result<String> {
        let claimed_id = params.get("openid.claimed_id").ok_or_else(|| {
            AppError::Validation("missing 'openid.claimed_id' in authentication response".to_string())
        })?;

        let steam_id = openid::trailing_digits(claimed_id)
            .ok_or_else(|| {
                AppError::Format(format!(
                    "could not extract Steam ID from claimed_id: {}",
                    claimed_id
                ))
            })?
            .to_string();

        let mut form: Vec<(String, String)> = params
            .iter()
            .filter(|(k, _)| *k != "openid.mode")
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        form.push(("openid.mode".to_string(), "check_auth".to_string()));

        let response = self
            .http
            .post(&self.openid_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::Verification(format!("check_auth request failed: {}", e)))?;

        let body = check_response_text(response).await.map_err(|e| {
            AppError::Verification(format!("Steam server verification failed: {}", e))
        })?;

        if !body.contains("is_valid:true") {
            tracing::warn!(steam_id = %steam_id, "check_auth rejected the assertion");
            return Err(AppError::Verification(
                "Steam authentication validation failed".to_string(),
            ));
        }

        tracing::info!(steam_id = %steam_id, "OpenID assertion verified by Steam");
        Ok(steam_id)
    }

    /// Fetch the user's public profile and cache it as the session user.
    pub async fn fetch_profile(
        &self,
        steam_id: &str,
        api_key: &str,
    ) -> Result<AuthenticationUser> {
        if steam_id.trim().is_empty() || api_key.trim().is_empty() {
            return Err(AppError::Validation(
                "Steam ID and API key are required".to_string(),
            ));
        }

        let url = format!("{}/ISteamUser/GetPlayerSummaries/v2/", self.api_base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("steamids", steam_id), ("key", api_key)])
            .send()
            .await
            .map_err(|e| AppError::SteamApi(format!("profile request failed: {}", e)))?;

        let summaries: PlayerSummariesResponse = check_response_json(response).await?;

        let player = summaries
            .response
            .players
            .into_iter()
            .next()
            .ok_or_else(|| {
                AppError::ProfileFetch("could not fetch user profile from Steam".to_string())
            })?;

        let user = AuthenticationUser {
            steam_id: player.steamid,
            username: player.personaname,
            avatar_url: player.avatarfull,
            authenticated_at: Utc::now(),
        };

        tracing::info!(
            steam_id = %user.steam_id,
            username = %user.username,
            "Fetched Steam profile"
        );

        *self.current_user.lock().expect("session lock poisoned") = Some(user.clone());
        Ok(user)
    }

    /// The currently authenticated user, if any.
    pub fn current_user(&self) -> Option<AuthenticationUser> {
        self.current_user.lock().expect("session lock poisoned").clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }

    /// Clear the in-memory session. No network call is made.
    pub fn logout(&self) {
        *self.current_user.lock().expect("session lock poisoned") = None;
        tracing::info!("Session user cleared");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SteamApiClient - Web API wrapper for library import
// ─────────────────────────────────────────────────────────────────────────────

/// Thin client for the authenticated Steam Web API endpoints.
pub struct SteamApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl SteamApiClient {
    pub fn new() -> Self {
        Self::with_base_url(STEAM_API_BASE_URL.to_string())
    }

    /// Create a client with an overridden base URL (tests).
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// Check an API key against a cheap unauthenticated-data endpoint.
    /// Transport errors count as invalid rather than surfacing.
    pub async fn validate_api_key(&self, api_key: &str) -> bool {
        if api_key.trim().is_empty() {
            return false;
        }

        let url = format!("{}/ISteamWebAPIUtil/GetSupportedAPIList/v1/", self.base_url);
        match self.http.get(&url).query(&[("key", api_key)]).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, "API key validation request failed");
                false
            }
        }
    }

    /// Fetch the user's owned games, including app info and free games.
    pub async fn get_owned_games(
        &self,
        steam_id: &str,
        api_key: &str,
    ) -> Result<Vec<SteamGame>> {
        if steam_id.trim().is_empty() || api_key.trim().is_empty() {
            return Err(AppError::Validation(
                "Steam ID and API key are required".to_string(),
            ));
        }

        let url = format!("{}/IPlayerService/GetOwnedGames/v1/", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("steamid", steam_id),
                ("key", api_key),
                ("format", "json"),
                ("include_appinfo", "true"),
                ("include_played_free_games", "true"),
            ])
            .send()
            .await
            .map_err(|e| AppError::SteamApi(format!("owned games request failed: {}", e)))?;

        let owned: OwnedGamesResponse = check_response_json(response).await?;

        let games = owned.response.games;
        tracing::info!(count = games.len(), "Fetched owned games");
        Ok(games)
    }

    /// Import owned games into the library store.
    ///
    /// Entries already present (same app ID) are skipped and counted; any
    /// other store failure aborts the import so a disk-level problem is not
    /// silently misread as a duplicate.
    pub async fn import_games(
        &self,
        store: &dyn GameStore,
        games: Vec<SteamGame>,
    ) -> Result<ImportSummary> {
        let mut summary = ImportSummary::default();

        for game in games {
            let record = Game::from_steam(game.appid, game.name);
            match store.insert(record).await {
                Ok(()) => summary.imported += 1,
                Err(AppError::Duplicate(_)) => summary.skipped += 1,
                Err(e) => {
                    tracing::error!(error = %e, appid = game.appid, "Game import aborted");
                    return Err(e);
                }
            }
        }

        tracing::info!(
            imported = summary.imported,
            skipped = summary.skipped,
            "Library import finished"
        );
        Ok(summary)
    }
}

impl Default for SteamApiClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts from one library import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// Player summary response from the Steam Web API.
#[derive(Debug, Deserialize)]
struct PlayerSummariesResponse {
    response: PlayerList,
}

#[derive(Debug, Deserialize)]
struct PlayerList {
    #[serde(default)]
    players: Vec<Player>,
}

/// Public profile record. Steam returns more fields; only these are used.
#[derive(Debug, Deserialize)]
struct Player {
    steamid: String,
    personaname: String,
    #[serde(default)]
    avatarfull: Option<String>,
}

/// Owned games response from the Steam Web API.
#[derive(Debug, Deserialize)]
struct OwnedGamesResponse {
    response: OwnedGamesList,
}

#[derive(Debug, Deserialize)]
struct OwnedGamesList {
    #[serde(default)]
    games: Vec<SteamGame>,
}

/// One owned game as returned by `GetOwnedGames`.
#[derive(Debug, Clone, Deserialize)]
pub struct SteamGame {
    pub appid: u32,
    #[serde(default)]
    pub name: String,
}
