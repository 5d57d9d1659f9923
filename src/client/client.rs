//! WebSocket client implementation.

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{Mutex, mpsc};
use tokio_tungstenite::tungstenite::Message;

use crate::LobbyError;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::terminal;

use super::state::{ClientApp, ClientState};
use super::ui;

/// Shared client app state.
type SharedApp = Arc<Mutex<ClientApp>>;

/// Run the lobby client against `url`.
///
/// With `name` set the client joins straight away; `code` selects the lobby
/// to join, otherwise a new one is opened.
pub async fn run(url: String, name: Option<String>, code: Option<String>) -> Result<(), LobbyError> {
    let app = Arc::new(Mutex::new(ClientApp::new(url.clone(), name, code)));

    tracing::info!("Connecting to {}", url);
    let (ws_stream, _) = tokio_tungstenite::connect_async(&url).await?;
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    // Create channel for outgoing messages
    let (tx, mut rx) = mpsc::unbounded_channel::<ClientMessage>();

    let send_app = Arc::clone(&app);
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("Failed to encode {:?}: {}", msg, e);
                    continue;
                }
            };
            if let Err(e) = ws_sender.send(Message::Text(json.into())).await {
                send_app
                    .lock()
                    .await
                    .connection_lost(format!("Connection error: {}", e));
                break;
            }
        }
    });

    let recv_app = Arc::clone(&app);
    let recv_tx = tx.clone();
    let recv_task = tokio::spawn(async move {
        while let Some(msg) = ws_receiver.next().await {
            let text = match msg {
                Ok(Message::Text(text)) => text.to_string(),
                Ok(Message::Close(_)) => {
                    let mut app = recv_app.lock().await;
                    app.connection_lost("Connection closed by server".to_string());
                    break;
                }
                Err(e) => {
                    let mut app = recv_app.lock().await;
                    app.connection_lost(format!("Connection error: {}", e));
                    break;
                }
                _ => continue,
            };

            let server_msg: ServerMessage = match serde_json::from_str(&text) {
                Ok(m) => m,
                Err(e) => {
                    tracing::debug!("Ignoring malformed message: {}", e);
                    continue;
                }
            };

            tracing::debug!(?server_msg, "Received");
            let reply = recv_app.lock().await.apply(server_msg);
            if let Some(reply) = reply {
                let _ = recv_tx.send(reply);
            }
        }
    });

    let result = run_tui(app, tx).await;
    recv_task.abort();
    result
}

/// Run the client TUI.
async fn run_tui(app: SharedApp, tx: mpsc::UnboundedSender<ClientMessage>) -> Result<(), LobbyError> {
    let mut terminal = terminal::init()?;

    loop {
        {
            let app = app.lock().await;
            if app.should_quit {
                break;
            }
            terminal.draw(|frame| ui::render(frame, &app))?;
        }

        // Handle input with timeout
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                let mut app = app.lock().await;
                if handle_input(&mut app, &tx, key.code) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Handle keyboard input. Returns true if the client should exit.
fn handle_input(app: &mut ClientApp, tx: &mpsc::UnboundedSender<ClientMessage>, key: KeyCode) -> bool {
    match &app.state {
        ClientState::Connecting => {
            if matches!(key, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc) {
                app.should_quit = true;
            }
        }
        ClientState::NameEntry { .. } => match key {
            KeyCode::Char(c) => {
                app.clear_name_error();
                app.name_input_push(c);
            }
            KeyCode::Backspace => {
                app.clear_name_error();
                app.name_input_pop();
            }
            KeyCode::Enter => {
                if let Some(join) = app.join_request() {
                    let _ = tx.send(join);
                }
            }
            KeyCode::Esc => {
                app.should_quit = true;
            }
            _ => {}
        },
        ClientState::WaitingRoom(room) => {
            if room.alert().is_some() {
                if matches!(key, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(_)) {
                    if let Some(room) = app.room_mut() {
                        room.dismiss_alert();
                    }
                }
                return false;
            }

            match key {
                KeyCode::Enter | KeyCode::Char('s') | KeyCode::Char('S') => {
                    if let Some(start) = app.request_start() {
                        let _ = tx.send(start);
                    }
                }
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    app.should_quit = true;
                }
                _ => {}
            }
        }
        ClientState::Started { .. } | ClientState::Disconnected { .. } => {
            if matches!(
                key,
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc | KeyCode::Enter
            ) {
                app.should_quit = true;
            }
        }
    }

    app.should_quit
}
