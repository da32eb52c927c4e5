// SPDX-License-Identifier: MIT

//! Typed outcome of a logout attempt.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Result of one logout attempt.
///
/// Logout runs every cleanup step even when earlier steps fail, so the
/// overall result can be successful while `error_details` records partial
/// failures keyed by step name.
#[derive(Debug, Clone)]
pub struct LogoutResult {
    pub is_successful: bool,
    pub logout_time: DateTime<Utc>,
    /// Rows removed from the game store (0 when game data was not cleared)
    pub games_deleted_count: usize,
    /// Top-level failure summary; only set when the workflow itself broke
    pub error_message: Option<String>,
    /// Per-step failure messages, keyed by step name
    pub error_details: BTreeMap<String, String>,
}

impl LogoutResult {
    pub fn new() -> Self {
        Self {
            is_successful: false,
            logout_time: Utc::now(),
            games_deleted_count: 0,
            error_message: None,
            error_details: BTreeMap::new(),
        }
    }
}

impl Default for LogoutResult {
    fn default() -> Self {
        Self::new()
    }
}
