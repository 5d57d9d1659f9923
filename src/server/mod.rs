//! Lobby server module.
//!
//! Hosts waiting rooms over WebSocket and executes start requests.

mod server;
mod state;

pub use server::{SharedState, bind, run, serve};
pub use state::{GameStatus, JoinError, LobbyGame, ServerState};
