//! # waiting-room
//!
//! A terminal lobby for multiplayer games. Players gather in a waiting room
//! until the creator starts the game.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use waiting_room::{client, server, Config, LobbyError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), LobbyError> {
//!     // Host a lobby server on LOBBY_PORT (default 8712)
//!     tokio::spawn(server::run(Config::from_env()));
//!
//!     // Open a new lobby as "Alice"
//!     client::run("ws://127.0.0.1:8712".to_string(), Some("Alice".to_string()), None).await
//! }
//! ```

pub mod badge;
pub mod client;
pub mod config;
pub mod lobby;
pub mod logging;
pub mod models;
pub mod protocol;
pub mod server;
pub mod terminal;

use std::io;

use tokio_tungstenite::tungstenite;

pub use badge::{Badge, BadgeStatus, BadgeVariant, badge_class};
pub use config::Config;
pub use lobby::{MutationState, StartGameError, StartGameResponse, WaitingRoom, can_start};
pub use models::{Game, Player, User};

/// Error type for lobby operations.
#[derive(Debug)]
pub enum LobbyError {
    /// IO error on the terminal or the listener.
    Io(io::Error),
    /// WebSocket transport error.
    WebSocket(tungstenite::Error),
    /// Message could not be encoded or decoded.
    Json(serde_json::Error),
}

impl std::fmt::Display for LobbyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LobbyError::Io(e) => write!(f, "IO error: {}", e),
            LobbyError::WebSocket(e) => write!(f, "WebSocket error: {}", e),
            LobbyError::Json(e) => write!(f, "Invalid message: {}", e),
        }
    }
}

impl std::error::Error for LobbyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LobbyError::Io(e) => Some(e),
            LobbyError::WebSocket(e) => Some(e),
            LobbyError::Json(e) => Some(e),
        }
    }
}

impl From<io::Error> for LobbyError {
    fn from(err: io::Error) -> Self {
        LobbyError::Io(err)
    }
}

impl From<tungstenite::Error> for LobbyError {
    fn from(err: tungstenite::Error) -> Self {
        LobbyError::WebSocket(err)
    }
}

impl From<serde_json::Error> for LobbyError {
    fn from(err: serde_json::Error) -> Self {
        LobbyError::Json(err)
    }
}
