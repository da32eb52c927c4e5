// SPDX-License-Identifier: MIT

//! Authenticated Steam user model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity obtained from Steam after a successful login.
///
/// Held as the in-memory session user for the process lifetime; superseded on
/// re-login and cleared on logout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticationUser {
    /// SteamID64 as a numeric string (stable external identifier)
    pub steam_id: String,
    /// Display name (mutable upstream; a snapshot from login time)
    pub username: String,
    /// Full-size avatar URL, if the profile exposes one
    pub avatar_url: Option<String>,
    /// When this identity was authenticated
    pub authenticated_at: DateTime<Utc>,
}
