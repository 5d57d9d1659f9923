//! Server state management.
//!
//! Tracks connected sessions and the lobbies they sit in. All operations are
//! synchronous; the connection tasks serialise access through a mutex.

use std::collections::HashMap;

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::lobby::MIN_PLAYERS;
use crate::models::{Game, MAX_PLAYERS, Player, User};
use crate::protocol::{GAME_CODE_LENGTH, ServerMessage, normalize_code, validate_name};

/// Current status of a lobby.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    /// Gathering players.
    Waiting,
    /// The creator has started the game.
    Started,
}

/// A connected client.
pub struct Session {
    /// Session user id, sent in `ConnectionAck`.
    pub user_id: String,
    /// Lobby this session joined, if any.
    pub game_id: Option<String>,
    /// Channel to send messages to this client.
    pub sender: mpsc::UnboundedSender<ServerMessage>,
}

impl Session {
    /// Send a message to this client.
    pub fn send(&self, msg: ServerMessage) -> bool {
        self.sender.send(msg).is_ok()
    }
}

/// A lobby owned by the server.
pub struct LobbyGame {
    pub id: String,
    pub code: String,
    pub status: GameStatus,
    pub players: Vec<Player>,
}

impl LobbyGame {
    pub fn snapshot(&self) -> Game {
        Game {
            id: self.id.clone(),
            code: self.code.clone(),
            players: self.players.clone(),
        }
    }

    fn add_player(&mut self, user_id: &str, name: String, creator: bool) {
        self.players.push(Player {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            is_creator: creator,
            user: User { name, image: None },
        });
    }
}

/// Why a join was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinError {
    InvalidName(&'static str),
    UnknownSession,
    AlreadyInGame,
    UnknownCode,
    GameFull,
    GameStarted,
}

impl JoinError {
    pub fn reason(self) -> &'static str {
        match self {
            Self::InvalidName(reason) => reason,
            Self::UnknownSession => "Session is not connected",
            Self::AlreadyInGame => "You are already in a game",
            Self::UnknownCode => "No game found with that code",
            Self::GameFull => "Game is full",
            Self::GameStarted => "Game has already started",
        }
    }
}

/// Main server state.
#[derive(Default)]
pub struct ServerState {
    /// Connected sessions by user id.
    pub sessions: HashMap<String, Session>,
    /// Lobbies by game id.
    pub games: HashMap<String, LobbyGame>,
    /// Join code to game id.
    pub code_to_id: HashMap<String, String>,
}

impl ServerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new connection and acknowledge it. Returns the user id.
    pub fn connect(&mut self, sender: mpsc::UnboundedSender<ServerMessage>) -> String {
        let user_id = Uuid::new_v4().to_string();
        let session = Session {
            user_id: user_id.clone(),
            game_id: None,
            sender,
        };
        session.send(ServerMessage::ConnectionAck {
            user_id: user_id.clone(),
        });
        self.sessions.insert(user_id.clone(), session);
        user_id
    }

    /// Handle a Join message. On success every member gets a fresh snapshot.
    pub fn join(&mut self, user_id: &str, name: &str, code: Option<&str>) -> Result<String, JoinError> {
        let result = self.try_join(user_id, name, code);

        match &result {
            Ok(game_id) => {
                tracing::info!(%user_id, %game_id, "Player joined");
                self.broadcast_snapshot(game_id);
            }
            Err(err) => {
                tracing::warn!(%user_id, reason = err.reason(), "Join rejected");
                self.send_to(
                    user_id,
                    ServerMessage::JoinRejected {
                        reason: err.reason().to_string(),
                    },
                );
            }
        }

        result
    }

    fn try_join(&mut self, user_id: &str, name: &str, code: Option<&str>) -> Result<String, JoinError> {
        validate_name(name).map_err(JoinError::InvalidName)?;
        let name = name.trim().to_string();

        let Some(session) = self.sessions.get(user_id) else {
            return Err(JoinError::UnknownSession);
        };
        if session.game_id.is_some() {
            return Err(JoinError::AlreadyInGame);
        }

        let game_id = match code {
            Some(code) => {
                let game_id = self
                    .code_to_id
                    .get(&normalize_code(code))
                    .cloned()
                    .ok_or(JoinError::UnknownCode)?;
                let game = self.games.get_mut(&game_id).ok_or(JoinError::UnknownCode)?;
                if game.status == GameStatus::Started {
                    return Err(JoinError::GameStarted);
                }
                if game.players.len() >= MAX_PLAYERS {
                    return Err(JoinError::GameFull);
                }
                game.add_player(user_id, name, false);
                game_id
            }
            None => {
                let mut game = LobbyGame {
                    id: Uuid::new_v4().to_string(),
                    code: self.unused_code(),
                    status: GameStatus::Waiting,
                    players: Vec::new(),
                };
                game.add_player(user_id, name, true);
                let game_id = game.id.clone();
                tracing::info!(%game_id, code = %game.code, "Game created");
                self.code_to_id.insert(game.code.clone(), game_id.clone());
                self.games.insert(game_id.clone(), game);
                game_id
            }
        };

        if let Some(session) = self.sessions.get_mut(user_id) {
            session.game_id = Some(game_id.clone());
        }
        Ok(game_id)
    }

    fn unused_code(&self) -> String {
        loop {
            let code: String = Uuid::new_v4()
                .simple()
                .to_string()
                .to_ascii_uppercase()
                .chars()
                .take(GAME_CODE_LENGTH)
                .collect();
            if !self.code_to_id.contains_key(&code) {
                return code;
            }
        }
    }

    /// Handle a StartGame message.
    ///
    /// Authorization is checked again here; the client-side gate is advisory.
    pub fn start_game(&mut self, user_id: &str, game_id: &str) {
        let reply = match self.games.get_mut(game_id) {
            None => Err("Game not found"),
            Some(game) if !game.players.iter().any(|p| p.user_id == user_id) => {
                Err("You are not in this game")
            }
            Some(game) if !game.players.iter().any(|p| p.user_id == user_id && p.is_creator) => {
                Err("Only the game creator can start the game")
            }
            Some(game) if game.status == GameStatus::Started => Ok(false),
            Some(game) if game.players.len() < MIN_PLAYERS => {
                Err("At least 2 players are required to start")
            }
            Some(game) => {
                game.status = GameStatus::Started;
                Ok(true)
            }
        };

        match reply {
            Ok(success) => {
                self.send_to(user_id, ServerMessage::StartGameResult { success });
                if success {
                    tracing::info!(%game_id, "Game started");
                    self.broadcast_to_game(
                        game_id,
                        ServerMessage::GameStarted {
                            game_id: game_id.to_string(),
                        },
                    );
                } else {
                    tracing::warn!(%game_id, "Start requested for a game already in progress");
                }
            }
            Err(message) => {
                tracing::warn!(%user_id, %game_id, reason = message, "Start refused");
                self.send_to(
                    user_id,
                    ServerMessage::StartGameFailed {
                        message: Some(message.to_string()),
                    },
                );
            }
        }
    }

    /// Drop a session, removing it from its lobby.
    pub fn disconnect(&mut self, user_id: &str) {
        let Some(session) = self.sessions.remove(user_id) else {
            return;
        };
        tracing::info!(%user_id, "Session closed");

        let Some(game_id) = session.game_id else {
            return;
        };
        let Some(game) = self.games.get_mut(&game_id) else {
            return;
        };

        let was_creator = game
            .players
            .iter()
            .any(|p| p.user_id == user_id && p.is_creator);
        game.players.retain(|p| p.user_id != user_id);

        if game.players.is_empty() {
            tracing::info!(%game_id, "Game closed, no players left");
            self.code_to_id.remove(&game.code);
            self.games.remove(&game_id);
            return;
        }

        if was_creator {
            if let Some(next) = game.players.first_mut() {
                next.is_creator = true;
                tracing::info!(%game_id, user_id = %next.user_id, "Creator handed over");
            }
        }

        if game.status == GameStatus::Waiting {
            self.broadcast_snapshot(&game_id);
        }
    }

    /// Send a message to one session.
    pub fn send_to(&self, user_id: &str, msg: ServerMessage) -> bool {
        self.sessions
            .get(user_id)
            .is_some_and(|session| session.send(msg))
    }

    /// Send a message to every member of a lobby.
    pub fn broadcast_to_game(&self, game_id: &str, msg: ServerMessage) {
        let Some(game) = self.games.get(game_id) else {
            return;
        };
        for player in &game.players {
            self.send_to(&player.user_id, msg.clone());
        }
    }

    pub fn broadcast_snapshot(&self, game_id: &str) {
        if let Some(game) = self.games.get(game_id) {
            self.broadcast_to_game(game_id, ServerMessage::GameSnapshot {
                game: game.snapshot(),
            });
        }
    }

    /// Broadcast a message to all connected sessions.
    pub fn broadcast_all(&self, msg: ServerMessage) {
        for session in self.sessions.values() {
            session.send(msg.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Inbox = mpsc::UnboundedReceiver<ServerMessage>;

    fn connect(state: &mut ServerState) -> (String, Inbox) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let user_id = state.connect(tx);
        assert!(matches!(rx.try_recv(), Ok(ServerMessage::ConnectionAck { .. })));
        (user_id, rx)
    }

    fn drain(rx: &mut Inbox) -> Vec<ServerMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            messages.push(msg);
        }
        messages
    }

    fn code_of(state: &ServerState, game_id: &str) -> String {
        state.games[game_id].code.clone()
    }

    #[test]
    fn test_create_then_join() {
        let mut state = ServerState::new();
        let (alice, mut alice_rx) = connect(&mut state);
        let (bob, mut bob_rx) = connect(&mut state);

        let game_id = state.join(&alice, "Alice", None).unwrap();
        let code = code_of(&state, &game_id);
        assert_eq!(code.len(), GAME_CODE_LENGTH);

        let joined = state.join(&bob, "Bob", Some(&code.to_lowercase())).unwrap();
        assert_eq!(joined, game_id);

        let last = drain(&mut alice_rx).pop().unwrap();
        let ServerMessage::GameSnapshot { game } = last else {
            panic!("expected snapshot, got {:?}", last);
        };
        assert_eq!(game.players.len(), 2);
        assert!(game.players[0].is_creator);
        assert!(!game.players[1].is_creator);
        assert_eq!(game.players[1].user.name, "Bob");
        assert!(matches!(drain(&mut bob_rx).pop(), Some(ServerMessage::GameSnapshot { .. })));
    }

    #[test]
    fn test_join_rejections() {
        let mut state = ServerState::new();
        let (alice, _alice_rx) = connect(&mut state);
        let (bob, mut bob_rx) = connect(&mut state);

        assert_eq!(
            state.join(&bob, "Bo", None),
            Err(JoinError::InvalidName("Name must be at least 3 characters"))
        );
        assert_eq!(state.join(&bob, "Bob", Some("ZZZZZZ")), Err(JoinError::UnknownCode));
        assert!(matches!(
            bob_rx.try_recv(),
            Ok(ServerMessage::JoinRejected { .. })
        ));

        let game_id = state.join(&alice, "Alice", None).unwrap();
        assert_eq!(state.join(&alice, "Alice", None), Err(JoinError::AlreadyInGame));

        state.games.get_mut(&game_id).unwrap().status = GameStatus::Started;
        let code = code_of(&state, &game_id);
        assert_eq!(state.join(&bob, "Bob", Some(&code)), Err(JoinError::GameStarted));
    }

    #[test]
    fn test_join_without_session() {
        let mut state = ServerState::new();
        assert_eq!(
            state.join("ghost", "Ghost", None),
            Err(JoinError::UnknownSession)
        );
        assert!(state.games.is_empty());
    }

    #[test]
    fn test_lobby_capacity() {
        let mut state = ServerState::new();
        let (creator, _rx) = connect(&mut state);
        let game_id = state.join(&creator, "Creator", None).unwrap();
        let code = code_of(&state, &game_id);

        let mut inboxes = Vec::new();
        for i in 1..MAX_PLAYERS {
            let (user, rx) = connect(&mut state);
            state.join(&user, &format!("Player{}", i), Some(&code)).unwrap();
            inboxes.push(rx);
        }

        let (late, _late_rx) = connect(&mut state);
        assert_eq!(state.join(&late, "Latecomer", Some(&code)), Err(JoinError::GameFull));
        assert_eq!(state.games[&game_id].players.len(), MAX_PLAYERS);
    }

    #[test]
    fn test_start_requires_creator_and_two_players() {
        let mut state = ServerState::new();
        let (alice, mut alice_rx) = connect(&mut state);
        let (bob, mut bob_rx) = connect(&mut state);
        let game_id = state.join(&alice, "Alice", None).unwrap();

        state.start_game(&alice, &game_id);
        assert_eq!(
            drain(&mut alice_rx).pop(),
            Some(ServerMessage::StartGameFailed {
                message: Some("At least 2 players are required to start".to_string())
            })
        );

        let code = code_of(&state, &game_id);
        state.join(&bob, "Bob", Some(&code)).unwrap();
        drain(&mut bob_rx);

        state.start_game(&bob, &game_id);
        assert_eq!(
            drain(&mut bob_rx).pop(),
            Some(ServerMessage::StartGameFailed {
                message: Some("Only the game creator can start the game".to_string())
            })
        );
        assert_eq!(state.games[&game_id].status, GameStatus::Waiting);
    }

    #[test]
    fn test_start_broadcasts_and_second_start_is_soft_failure() {
        let mut state = ServerState::new();
        let (alice, mut alice_rx) = connect(&mut state);
        let (bob, mut bob_rx) = connect(&mut state);
        let game_id = state.join(&alice, "Alice", None).unwrap();
        let code = code_of(&state, &game_id);
        state.join(&bob, "Bob", Some(&code)).unwrap();
        drain(&mut alice_rx);
        drain(&mut bob_rx);

        state.start_game(&alice, &game_id);
        assert_eq!(
            drain(&mut alice_rx),
            vec![
                ServerMessage::StartGameResult { success: true },
                ServerMessage::GameStarted {
                    game_id: game_id.clone()
                },
            ]
        );
        assert_eq!(
            drain(&mut bob_rx),
            vec![ServerMessage::GameStarted {
                game_id: game_id.clone()
            }]
        );

        state.start_game(&alice, &game_id);
        assert_eq!(
            drain(&mut alice_rx),
            vec![ServerMessage::StartGameResult { success: false }]
        );
    }

    #[test]
    fn test_start_unknown_game() {
        let mut state = ServerState::new();
        let (alice, mut alice_rx) = connect(&mut state);
        state.start_game(&alice, "missing");
        assert_eq!(
            alice_rx.try_recv().ok(),
            Some(ServerMessage::StartGameFailed {
                message: Some("Game not found".to_string())
            })
        );
    }

    #[test]
    fn test_creator_leaving_hands_over() {
        let mut state = ServerState::new();
        let (alice, _alice_rx) = connect(&mut state);
        let (bob, mut bob_rx) = connect(&mut state);
        let game_id = state.join(&alice, "Alice", None).unwrap();
        let code = code_of(&state, &game_id);
        state.join(&bob, "Bob", Some(&code)).unwrap();
        drain(&mut bob_rx);

        state.disconnect(&alice);

        let Some(ServerMessage::GameSnapshot { game }) = drain(&mut bob_rx).pop() else {
            panic!("expected snapshot");
        };
        assert_eq!(game.players.len(), 1);
        assert!(game.players[0].is_creator);
        assert_eq!(game.players[0].user_id, bob);

        state.disconnect(&bob);
        assert!(state.games.is_empty());
        assert!(state.code_to_id.is_empty());
    }
}
