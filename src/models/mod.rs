// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod game;
pub mod logout;
pub mod result;
pub mod user;

pub use game::{Game, GameSource};
pub use logout::LogoutResult;
pub use result::{AuthenticationResult, AuthenticationStatus, StatusSeverity};
pub use user::AuthenticationUser;
