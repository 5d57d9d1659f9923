//! Client state management.

use crate::lobby::{StartGameError, StartGameResponse, WaitingRoom};
use crate::models::Game;
use crate::protocol::{ClientMessage, NAME_MAX_LENGTH, ServerMessage, normalize_code};

/// Current state of the client.
#[derive(Debug, Clone)]
pub enum ClientState {
    /// Connecting to server.
    Connecting,

    /// Entering a player name.
    NameEntry {
        input: String,
        error: Option<String>,
    },

    /// Sitting in a lobby until the creator starts the game.
    WaitingRoom(WaitingRoom),

    /// The game has begun.
    Started { game: Game },

    /// Disconnected from server. `alert` holds a start failure caused by
    /// the disconnect.
    Disconnected {
        message: String,
        alert: Option<String>,
    },
}

impl Default for ClientState {
    fn default() -> Self {
        Self::Connecting
    }
}

impl ClientState {
    /// Create a new name entry state.
    pub fn name_entry(input: String) -> Self {
        Self::NameEntry { input, error: None }
    }

    /// Create a disconnected state.
    pub fn disconnected(message: String, alert: Option<String>) -> Self {
        Self::Disconnected { message, alert }
    }
}

/// Client application state.
pub struct ClientApp {
    /// Current state.
    pub state: ClientState,
    /// Server URL, for display.
    pub server_url: String,
    /// Session identity assigned by the server.
    pub user_id: Option<String>,
    /// Name given on the command line; joins without prompting.
    preset_name: Option<String>,
    /// Code of the lobby to join; a new lobby is opened when absent.
    pub code: Option<String>,
    /// Whether the client should quit.
    pub should_quit: bool,
}

impl ClientApp {
    /// Create a new client app.
    pub fn new(server_url: String, name: Option<String>, code: Option<String>) -> Self {
        Self {
            state: ClientState::Connecting,
            server_url,
            user_id: None,
            preset_name: name,
            code: code.map(|c| normalize_code(&c)).filter(|c| !c.is_empty()),
            should_quit: false,
        }
    }

    /// Apply a message from the server. Returns a reply to send, if any.
    pub fn apply(&mut self, msg: ServerMessage) -> Option<ClientMessage> {
        match msg {
            ServerMessage::ConnectionAck { user_id } => {
                self.user_id = Some(user_id);
                let preset = self.preset_name.take();
                self.state = ClientState::name_entry(preset.clone().unwrap_or_default());
                preset.and_then(|_| self.join_request())
            }
            ServerMessage::JoinRejected { reason } => {
                if !matches!(self.state, ClientState::NameEntry { .. }) {
                    self.state = ClientState::name_entry(String::new());
                }
                self.set_name_error(reason);
                None
            }
            ServerMessage::GameSnapshot { game } => {
                match &mut self.state {
                    ClientState::WaitingRoom(room) => room.update_game(game),
                    ClientState::Started { .. } => {}
                    _ => {
                        let user_id = self.user_id.clone().unwrap_or_default();
                        self.state = ClientState::WaitingRoom(WaitingRoom::new(game, user_id));
                    }
                }
                None
            }
            ServerMessage::StartGameResult { success } => {
                if let Some(room) = self.room_mut() {
                    room.settle(Ok(StartGameResponse { success }));
                }
                None
            }
            ServerMessage::StartGameFailed { message } => {
                if let Some(room) = self.room_mut() {
                    room.settle(Err(StartGameError { message }));
                }
                None
            }
            ServerMessage::GameStarted { game_id } => {
                if let ClientState::WaitingRoom(room) = &self.state {
                    if room.game().id == game_id {
                        let game = room.game().clone();
                        self.state = ClientState::Started { game };
                    }
                }
                None
            }
            ServerMessage::ServerClosing => {
                self.disconnect("Server is shutting down".to_string());
                None
            }
        }
    }

    /// The transport failed. Any in-flight start request fails with it.
    pub fn connection_lost(&mut self, message: String) {
        let alert = self
            .room_mut()
            .and_then(|room| room.settle(Err(StartGameError::new(message.clone()))));
        tracing::info!(%message, "Disconnected");
        self.state = ClientState::disconnected(message, alert);
    }

    /// Move to disconnected state.
    pub fn disconnect(&mut self, message: String) {
        tracing::info!(%message, "Disconnected");
        self.state = ClientState::disconnected(message, None);
    }

    pub fn room(&self) -> Option<&WaitingRoom> {
        match &self.state {
            ClientState::WaitingRoom(room) => Some(room),
            _ => None,
        }
    }

    pub fn room_mut(&mut self) -> Option<&mut WaitingRoom> {
        match &mut self.state {
            ClientState::WaitingRoom(room) => Some(room),
            _ => None,
        }
    }

    /// Start request for the current lobby, if the control is enabled.
    pub fn request_start(&mut self) -> Option<ClientMessage> {
        self.room_mut()?.trigger_start()
    }

    /// Join request built from the typed name.
    pub fn join_request(&self) -> Option<ClientMessage> {
        let name = self.name_input().trim();
        if name.is_empty() {
            return None;
        }
        Some(ClientMessage::Join {
            name: name.to_string(),
            code: self.code.clone(),
        })
    }

    /// Add a character to name input.
    pub fn name_input_push(&mut self, c: char) {
        if let ClientState::NameEntry { input, .. } = &mut self.state {
            if input.chars().count() < NAME_MAX_LENGTH {
                input.push(c);
            }
        }
    }

    /// Remove a character from name input.
    pub fn name_input_pop(&mut self) {
        if let ClientState::NameEntry { input, .. } = &mut self.state {
            input.pop();
        }
    }

    /// Get name input value.
    pub fn name_input(&self) -> &str {
        if let ClientState::NameEntry { input, .. } = &self.state {
            input
        } else {
            ""
        }
    }

    /// Set name entry error.
    pub fn set_name_error(&mut self, err: String) {
        if let ClientState::NameEntry { error, .. } = &mut self.state {
            *error = Some(err);
        }
    }

    /// Clear name entry error.
    pub fn clear_name_error(&mut self) {
        if let ClientState::NameEntry { error, .. } = &mut self.state {
            *error = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lobby::MutationState;
    use crate::models::{Player, User};

    fn game(players: &[(&str, bool)]) -> Game {
        Game {
            id: "game-1".to_string(),
            code: "ABC123".to_string(),
            players: players
                .iter()
                .map(|(user_id, creator)| Player {
                    id: format!("p-{}", user_id),
                    user_id: user_id.to_string(),
                    is_creator: *creator,
                    user: User {
                        name: user_id.to_string(),
                        image: None,
                    },
                })
                .collect(),
        }
    }

    fn seated(user_id: &str, players: &[(&str, bool)]) -> ClientApp {
        let mut app = ClientApp::new("ws://localhost:8712".to_string(), None, None);
        app.apply(ServerMessage::ConnectionAck {
            user_id: user_id.to_string(),
        });
        app.apply(ServerMessage::GameSnapshot { game: game(players) });
        app
    }

    #[test]
    fn test_preset_name_joins_on_ack() {
        let mut app = ClientApp::new(
            "ws://localhost:8712".to_string(),
            Some("Alice".to_string()),
            Some(" abc123 ".to_string()),
        );
        let reply = app.apply(ServerMessage::ConnectionAck {
            user_id: "alice".to_string(),
        });
        assert_eq!(
            reply,
            Some(ClientMessage::Join {
                name: "Alice".to_string(),
                code: Some("ABC123".to_string()),
            })
        );
    }

    #[test]
    fn test_prompt_without_preset_name() {
        let mut app = ClientApp::new("ws://localhost:8712".to_string(), None, None);
        assert_eq!(
            app.apply(ServerMessage::ConnectionAck {
                user_id: "alice".to_string()
            }),
            None
        );
        assert!(matches!(app.state, ClientState::NameEntry { .. }));
        assert_eq!(app.join_request(), None);

        for c in "Bob".chars() {
            app.name_input_push(c);
        }
        assert_eq!(
            app.join_request(),
            Some(ClientMessage::Join {
                name: "Bob".to_string(),
                code: None,
            })
        );
    }

    #[test]
    fn test_join_rejected_shows_error() {
        let mut app = ClientApp::new("ws://localhost:8712".to_string(), None, None);
        app.apply(ServerMessage::ConnectionAck {
            user_id: "alice".to_string(),
        });
        app.apply(ServerMessage::JoinRejected {
            reason: "Game is full".to_string(),
        });
        let ClientState::NameEntry { error, .. } = &app.state else {
            panic!("expected name entry");
        };
        assert_eq!(error.as_deref(), Some("Game is full"));
    }

    #[test]
    fn test_start_round_trip() {
        let mut app = seated("alice", &[("alice", true), ("bob", false)]);
        assert!(app.request_start().is_some());
        assert!(app.request_start().is_none());

        app.apply(ServerMessage::StartGameResult { success: true });
        assert_eq!(app.room().unwrap().start_state(), &MutationState::Success);

        app.apply(ServerMessage::GameStarted {
            game_id: "game-1".to_string(),
        });
        assert!(matches!(app.state, ClientState::Started { .. }));
    }

    #[test]
    fn test_refused_start_raises_alert() {
        let mut app = seated("alice", &[("alice", true), ("bob", false)]);
        app.request_start();
        app.apply(ServerMessage::StartGameFailed { message: None });
        assert_eq!(
            app.room().unwrap().alert(),
            Some("Failed to start game. Please try again.")
        );
    }

    #[test]
    fn test_guest_cannot_request_start() {
        let mut app = seated("bob", &[("alice", true), ("bob", false)]);
        assert!(app.request_start().is_none());
    }

    #[test]
    fn test_snapshot_updates_room_in_place() {
        let mut app = seated("alice", &[("alice", true)]);
        assert!(!app.room().unwrap().start_enabled());

        app.apply(ServerMessage::GameSnapshot {
            game: game(&[("alice", true), ("bob", false)]),
        });
        assert!(app.room().unwrap().start_enabled());
    }

    #[test]
    fn test_connection_lost_while_pending() {
        let mut app = seated("alice", &[("alice", true), ("bob", false)]);
        app.request_start();
        app.connection_lost("Connection error: reset".to_string());

        let ClientState::Disconnected { message, alert } = &app.state else {
            panic!("expected disconnected, got {:?}", app.state);
        };
        assert_eq!(message, "Connection error: reset");
        assert_eq!(
            alert.as_deref(),
            Some("Failed to start game: Connection error: reset")
        );
    }

    #[test]
    fn test_connection_lost_while_idle_has_no_alert() {
        let mut app = seated("alice", &[("alice", true), ("bob", false)]);
        app.connection_lost("Connection closed by server".to_string());
        assert!(matches!(
            app.state,
            ClientState::Disconnected { alert: None, .. }
        ));
    }
}
