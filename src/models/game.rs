// SPDX-License-Identifier: MIT

//! Game library record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a library entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameSource {
    Steam,
    Custom,
}

/// One entry in the local game library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    /// Steam app ID for imported games; None for custom entries
    pub appid: Option<u32>,
    pub title: String,
    pub source: GameSource,
    pub completed: bool,
    pub date_added: DateTime<Utc>,
}

impl Game {
    /// Build an incomplete library entry imported from Steam.
    pub fn from_steam(appid: u32, title: impl Into<String>) -> Self {
        Self {
            appid: Some(appid),
            title: title.into(),
            source: GameSource::Steam,
            completed: false,
            date_added: Utc::now(),
        }
    }
}
