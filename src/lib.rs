// SPDX-License-Identifier: MIT

//! Steam-Shelf: track your game backlog against your Steam library.
//!
//! This crate implements the Steam OpenID login workflow (browser round-trip,
//! callback validation, `check_auth` verification, profile fetch, credential
//! persistence) and the logout workflow that reverses it. The UI layer only
//! calls the services here and renders the typed results.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

use config::Config;
use db::{CredentialStore, GameStore};
use services::{
    AuthPipeline, BrowserAuthBroker, BrowserLauncher, LogoutFlow, SteamApiClient,
    SteamAuthService,
};
use std::sync::Arc;
use std::time::Duration;

/// Fully wired application services.
///
/// Construction is explicit: every service receives its collaborators rather
/// than reaching for process-wide singletons, so tests can substitute any
/// seam.
pub struct App {
    pub config: Config,
    pub steam: Arc<SteamAuthService>,
    pub steam_api: SteamApiClient,
    pub broker: Arc<BrowserAuthBroker>,
    pub auth: AuthPipeline,
    pub logout: LogoutFlow,
}

impl App {
    /// Wire all services from a configuration and the platform seams.
    pub fn new(
        config: Config,
        credentials: Arc<dyn CredentialStore>,
        games: Arc<dyn GameStore>,
        launcher: Arc<dyn BrowserLauncher>,
    ) -> Self {
        let steam = Arc::new(SteamAuthService::new(config.realm.clone()));
        let broker = Arc::new(BrowserAuthBroker::new(launcher));

        let auth = AuthPipeline::new(
            steam.clone(),
            credentials.clone(),
            broker.clone(),
            config.return_url.clone(),
            Duration::from_secs(config.auth_timeout_secs),
        );
        let logout = LogoutFlow::new(steam.clone(), credentials, games);

        Self {
            config,
            steam,
            steam_api: SteamApiClient::new(),
            broker,
            auth,
            logout,
        }
    }
}
