// SPDX-License-Identifier: MIT

//! Typed outcome of a single login attempt.

use crate::models::AuthenticationUser;

/// Terminal status of a login attempt.
///
/// `Pending` only exists while the orchestrator is mid-flight; every result
/// handed to a caller carries one of the five terminal statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticationStatus {
    Pending,
    Success,
    InvalidCredentials,
    NetworkError,
    Cancelled,
    UnknownError,
}

/// Severity tag for rendering a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusSeverity {
    Info,
    Success,
    Warning,
    Error,
}

/// Outcome of one login attempt. Immutable after construction; transient,
/// consumed by the caller and never persisted.
///
/// Exactly one of `user` / `error_message` is set per terminal status,
/// except `Pending` which carries neither.
#[derive(Debug, Clone)]
pub struct AuthenticationResult {
    pub status: AuthenticationStatus,
    /// Steam ID as parsed from the callback, when extraction got that far.
    pub steam_id: Option<String>,
    pub user: Option<AuthenticationUser>,
    pub error_message: Option<String>,
}

impl AuthenticationResult {
    /// Successful result carrying the authenticated user.
    pub fn success(user: AuthenticationUser) -> Self {
        Self {
            status: AuthenticationStatus::Success,
            steam_id: Some(user.steam_id.clone()),
            user: Some(user),
            error_message: None,
        }
    }

    /// Failed result with a terminal non-success status.
    pub fn failure(status: AuthenticationStatus, message: impl Into<String>) -> Self {
        debug_assert!(!matches!(
            status,
            AuthenticationStatus::Success | AuthenticationStatus::Pending
        ));
        Self {
            status,
            steam_id: None,
            user: None,
            error_message: Some(message.into()),
        }
    }

    /// Failed result that still records the Steam ID parsed before the
    /// failing step.
    pub fn failure_with_id(
        status: AuthenticationStatus,
        steam_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let mut result = Self::failure(status, message);
        result.steam_id = Some(steam_id.into());
        result
    }

    /// True iff the attempt ended in `Success`.
    pub fn is_successful(&self) -> bool {
        self.status == AuthenticationStatus::Success
    }
}
