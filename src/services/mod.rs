// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod auth;
pub mod browser;
pub mod logout;
pub mod openid;
pub mod steam;

pub use auth::AuthPipeline;
pub use browser::{BrowserAuthBroker, BrowserLauncher, DEFAULT_AUTH_TIMEOUT};
pub use logout::LogoutFlow;
pub use openid::CallbackParams;
pub use steam::{ImportSummary, SteamApiClient, SteamAuthService, SteamGame};
