use serde::{Deserialize, Serialize};

/// Upper bound on players in a single lobby.
pub const MAX_PLAYERS: usize = 8;

/// Public profile shown next to a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// A seat in a game lobby.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub user_id: String,
    pub is_creator: bool,
    pub user: User,
}

/// Snapshot of a lobby as pushed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: String,
    pub code: String,
    pub players: Vec<Player>,
}
