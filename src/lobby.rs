//! Waiting-room logic: who may start a game, and the lifecycle of the
//! start request.

use std::fmt;

use crate::models::Game;
use crate::protocol::ClientMessage;

/// Fallback alert text when a failed start carries no message.
pub const START_FAILED_FALLBACK: &str = "Failed to start game. Please try again.";

/// Minimum number of players before a game can begin.
pub const MIN_PLAYERS: usize = 2;

/// True when `user_id` is flagged as the creator of `game`.
pub fn is_creator(game: &Game, user_id: &str) -> bool {
    game.players
        .iter()
        .any(|player| player.is_creator && player.user_id == user_id)
}

/// True when `user_id` may start `game` right now.
pub fn can_start(game: &Game, user_id: &str) -> bool {
    game.players.len() >= MIN_PLAYERS && is_creator(game, user_id)
}

/// Lifecycle of a single start request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MutationState {
    #[default]
    Idle,
    Pending,
    Success,
    Error(String),
}

impl MutationState {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Hard failure of a start request: refused by the server or lost in transit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartGameError {
    pub message: Option<String>,
}

impl StartGameError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    pub fn without_message() -> Self {
        Self { message: None }
    }

    /// Text shown to the user.
    pub fn alert_text(&self) -> String {
        match &self.message {
            Some(message) => format!("Failed to start game: {}", message),
            None => START_FAILED_FALLBACK.to_string(),
        }
    }
}

impl fmt::Display for StartGameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.alert_text())
    }
}

impl std::error::Error for StartGameError {}

/// Server's reply to a start request that went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartGameResponse {
    pub success: bool,
}

/// Client-side state of the waiting room.
#[derive(Debug, Clone)]
pub struct WaitingRoom {
    game: Game,
    user_id: String,
    start: MutationState,
    alert: Option<String>,
}

impl WaitingRoom {
    pub fn new(game: Game, user_id: impl Into<String>) -> Self {
        Self {
            game,
            user_id: user_id.into(),
            start: MutationState::Idle,
            alert: None,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn start_state(&self) -> &MutationState {
        &self.start
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    /// Replace the snapshot, keeping any in-flight request.
    pub fn update_game(&mut self, game: Game) {
        self.game = game;
    }

    pub fn is_creator(&self) -> bool {
        is_creator(&self.game, &self.user_id)
    }

    /// Whether the start control is enabled.
    pub fn start_enabled(&self) -> bool {
        can_start(&self.game, &self.user_id) && !self.start.is_pending()
    }

    pub fn start_label(&self) -> &'static str {
        if self.start.is_pending() {
            "Starting..."
        } else {
            "Start Game"
        }
    }

    /// Build the start request and mark it pending.
    ///
    /// Returns `None` when the control is disabled, including while a
    /// previous request is still in flight.
    pub fn trigger_start(&mut self) -> Option<ClientMessage> {
        if !self.start_enabled() {
            return None;
        }

        self.start = MutationState::Pending;
        tracing::info!(game_id = %self.game.id, "Requesting game start");
        Some(ClientMessage::StartGame {
            game_id: self.game.id.clone(),
        })
    }

    /// Apply the outcome of the pending request.
    ///
    /// A soft failure (`success: false`) is only logged. A hard failure raises
    /// an alert, whose text is also returned.
    pub fn settle(
        &mut self,
        result: Result<StartGameResponse, StartGameError>,
    ) -> Option<String> {
        if !self.start.is_pending() {
            tracing::debug!(?result, "Ignoring start result with no request in flight");
            return None;
        }

        match result {
            Ok(StartGameResponse { success: true }) => {
                tracing::info!(game_id = %self.game.id, "Game started successfully");
                self.start = MutationState::Success;
                None
            }
            Ok(StartGameResponse { success: false }) => {
                tracing::warn!(game_id = %self.game.id, "Game start acknowledged, but the server reported an error");
                self.start = MutationState::Success;
                None
            }
            Err(err) => {
                tracing::error!(game_id = %self.game.id, error = ?err.message, "Failed to start game");
                let text = err.alert_text();
                self.start = MutationState::Error(text.clone());
                self.alert = Some(text.clone());
                Some(text)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Player, User};

    fn player(id: &str, creator: bool) -> Player {
        Player {
            id: format!("player-{}", id),
            user_id: id.to_string(),
            is_creator: creator,
            user: User {
                name: format!("User {}", id),
                image: None,
            },
        }
    }

    fn game(players: Vec<Player>) -> Game {
        Game {
            id: "game-1".to_string(),
            code: "ABC123".to_string(),
            players,
        }
    }

    #[test]
    fn test_single_player_cannot_start() {
        let g = game(vec![player("alice", true)]);
        assert!(!can_start(&g, "alice"));
        assert!(!can_start(&game(vec![]), "alice"));
    }

    #[test]
    fn test_non_creator_cannot_start() {
        let g = game(vec![player("alice", true), player("bob", false)]);
        assert!(!can_start(&g, "bob"));
        assert!(!can_start(&g, "mallory"));
    }

    #[test]
    fn test_creator_flag_must_belong_to_caller() {
        let g = game(vec![player("alice", false), player("bob", true), player("carol", true)]);
        assert!(!can_start(&g, "alice"));
        assert!(can_start(&g, "carol"));
    }

    #[test]
    fn test_two_players_with_matching_creator_can_start() {
        let g = game(vec![player("alice", true), player("bob", false)]);
        assert!(can_start(&g, "alice"));
    }

    #[test]
    fn test_trigger_while_pending_sends_nothing() {
        let mut room = WaitingRoom::new(game(vec![player("alice", true), player("bob", false)]), "alice");

        let first = room.trigger_start();
        assert_eq!(
            first,
            Some(ClientMessage::StartGame {
                game_id: "game-1".to_string()
            })
        );
        assert!(room.start_state().is_pending());
        assert!(!room.start_enabled());
        assert_eq!(room.start_label(), "Starting...");

        assert_eq!(room.trigger_start(), None);
    }

    #[test]
    fn test_trigger_disabled_for_guest() {
        let mut room = WaitingRoom::new(game(vec![player("alice", true), player("bob", false)]), "bob");
        assert_eq!(room.trigger_start(), None);
        assert_eq!(room.start_state(), &MutationState::Idle);
    }

    #[test]
    fn test_failure_without_message_uses_fallback() {
        let mut room = WaitingRoom::new(game(vec![player("alice", true), player("bob", false)]), "alice");
        room.trigger_start();

        let alert = room.settle(Err(StartGameError::without_message()));
        assert_eq!(alert.as_deref(), Some("Failed to start game. Please try again."));
        assert_eq!(room.alert(), Some(START_FAILED_FALLBACK));
        assert!(room.start_enabled());
    }

    #[test]
    fn test_failure_with_message_is_surfaced() {
        let mut room = WaitingRoom::new(game(vec![player("alice", true), player("bob", false)]), "alice");
        room.trigger_start();

        let alert = room.settle(Err(StartGameError::new("connection reset")));
        assert_eq!(alert.as_deref(), Some("Failed to start game: connection reset"));

        room.dismiss_alert();
        assert_eq!(room.alert(), None);
    }

    #[test]
    fn test_soft_failure_is_not_alerted() {
        let mut room = WaitingRoom::new(game(vec![player("alice", true), player("bob", false)]), "alice");
        room.trigger_start();

        assert_eq!(room.settle(Ok(StartGameResponse { success: false })), None);
        assert_eq!(room.alert(), None);
        assert_eq!(room.start_state(), &MutationState::Success);
    }

    #[test]
    fn test_snapshot_update_keeps_pending_request() {
        let mut room = WaitingRoom::new(game(vec![player("alice", true), player("bob", false)]), "alice");
        room.trigger_start();

        room.update_game(game(vec![player("alice", true), player("bob", false), player("carol", false)]));
        assert!(room.start_state().is_pending());
        assert_eq!(room.game().players.len(), 3);
    }

    #[test]
    fn test_settle_without_request_is_ignored() {
        let mut room = WaitingRoom::new(game(vec![player("alice", true), player("bob", false)]), "alice");
        assert_eq!(room.settle(Err(StartGameError::without_message())), None);
        assert_eq!(room.start_state(), &MutationState::Idle);
    }
}
