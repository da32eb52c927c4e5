// SPDX-License-Identifier: MIT

//! Application error types shared across the authentication and storage layers.

/// Application error type covering every failure mode of the login and
/// logout workflows.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Malformed callback URI: {0}")]
    MalformedUri(String),

    #[error("Could not extract Steam ID: {0}")]
    Format(String),

    #[error("Invalid authentication response: {0}")]
    Validation(String),

    #[error("Steam verification failed: {0}")]
    Verification(String),

    #[error("Could not fetch user profile: {0}")]
    ProfileFetch(String),

    #[error("Steam API error: {0}")]
    SteamApi(String),

    #[error("Record already exists: {0}")]
    Duplicate(String),

    #[error("Credential storage error: {0}")]
    Storage(String),

    #[error("Game store error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// True when the error came from transport or the Steam servers rather
    /// than from the callback data itself. The orchestrator maps these to
    /// `NetworkError` instead of `InvalidCredentials`.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            AppError::Verification(_) | AppError::ProfileFetch(_) | AppError::SteamApi(_)
        )
    }
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AppError>;
