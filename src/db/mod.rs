// SPDX-License-Identifier: MIT

//! Storage layer: credential store and game library store seams.

pub mod credentials;
pub mod games;

pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use games::{GameStore, MemoryGameStore};

/// Credential store key names as constants.
pub mod keys {
    pub const API_KEY: &str = "steam_api_key";
    pub const STEAM_ID: &str = "steam_id";
    pub const USERNAME: &str = "steam_username";
}
