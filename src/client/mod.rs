//! Lobby client module.
//!
//! Terminal waiting room backed by a WebSocket connection to the server.

mod client;
mod state;
mod ui;

pub use client::run;
pub use state::{ClientApp, ClientState};
