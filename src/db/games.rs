// SPDX-License-Identifier: MIT

//! Game library store seam.
//!
//! Imported Steam games are unique per app ID; inserting a second entry for
//! the same app ID fails with `AppError::Duplicate` so import code can tell
//! a benign duplicate apart from a real persistence failure.

use crate::error::{AppError, Result};
use crate::models::Game;
use async_trait::async_trait;
use std::sync::Mutex;

/// Single-table store over [`Game`] records.
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Insert one record. `AppError::Duplicate` when a Steam entry with the
    /// same app ID already exists.
    async fn insert(&self, game: Game) -> Result<()>;

    /// Delete every record, returning how many were removed.
    async fn delete_all(&self) -> Result<usize>;

    async fn count(&self) -> Result<usize>;

    async fn list(&self) -> Result<Vec<Game>>;
}

/// In-memory game store.
#[derive(Default)]
pub struct MemoryGameStore {
    games: Mutex<Vec<Game>>,
}

impl MemoryGameStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GameStore for MemoryGameStore {
    async fn insert(&self, game: Game) -> Result<()> {
        let mut games = self
            .games
            .lock()
            .map_err(|_| AppError::Database("game store lock poisoned".to_string()))?;

        if let Some(appid) = game.appid {
            if games.iter().any(|g| g.appid == Some(appid)) {
                return Err(AppError::Duplicate(format!("appid {}", appid)));
            }
        }

        games.push(game);
        Ok(())
    }

    async fn delete_all(&self) -> Result<usize> {
        let mut games = self
            .games
            .lock()
            .map_err(|_| AppError::Database("game store lock poisoned".to_string()))?;
        let deleted = games.len();
        games.clear();
        Ok(deleted)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self
            .games
            .lock()
            .map_err(|_| AppError::Database("game store lock poisoned".to_string()))?
            .len())
    }

    async fn list(&self) -> Result<Vec<Game>> {
        Ok(self
            .games
            .lock()
            .map_err(|_| AppError::Database("game store lock poisoned".to_string()))?
            .clone())
    }
}
