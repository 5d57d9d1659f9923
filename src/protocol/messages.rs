//! Protocol messages for client-server communication.
//!
//! All messages are serialized as JSON over WebSocket.

use serde::{Deserialize, Serialize};

use crate::models::Game;

/// Messages sent from client to server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Join an existing lobby by code, or open a new one when `code` is absent.
    Join {
        name: String,
        #[serde(default)]
        code: Option<String>,
    },

    /// Ask the server to start the game.
    #[serde(rename_all = "camelCase")]
    StartGame { game_id: String },
}

/// Messages sent from server to client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Connection accepted; carries the session identity.
    #[serde(rename_all = "camelCase")]
    ConnectionAck { user_id: String },

    /// Join rejected (bad name, unknown code, full lobby, etc.).
    JoinRejected { reason: String },

    /// Current state of the lobby the client sits in.
    GameSnapshot { game: Game },

    /// Settled reply to `StartGame`.
    StartGameResult { success: bool },

    /// `StartGame` was refused outright.
    StartGameFailed {
        #[serde(default)]
        message: Option<String>,
    },

    /// The lobby's game has begun.
    #[serde(rename_all = "camelCase")]
    GameStarted { game_id: String },

    /// Server is shutting down.
    ServerClosing,
}

/// Player name validation constants.
pub const NAME_MIN_LENGTH: usize = 3;
pub const NAME_MAX_LENGTH: usize = 16;

/// Length of a lobby join code.
pub const GAME_CODE_LENGTH: usize = 6;

/// Default server port.
pub const DEFAULT_PORT: u16 = 8712;

/// Validates a player name according to the rules.
///
/// Returns `Ok(())` if valid, or `Err` with an error message.
pub fn validate_name(name: &str) -> Result<(), &'static str> {
    let length = name.trim().chars().count();

    if length < NAME_MIN_LENGTH {
        return Err("Name must be at least 3 characters");
    }

    if length > NAME_MAX_LENGTH {
        return Err("Name must be at most 16 characters");
    }

    Ok(())
}

/// Canonical form of a user-typed join code.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}
