//! WebSocket server implementation.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Mutex, mpsc};
use tokio_tungstenite::tungstenite::Message;

use crate::LobbyError;
use crate::config::Config;
use crate::protocol::{ClientMessage, ServerMessage};

use super::state::ServerState;

/// Shared server state wrapped in Arc<Mutex> for async access.
pub type SharedState = Arc<Mutex<ServerState>>;

/// Bind the listener on the configured address.
pub async fn bind(config: &Config) -> io::Result<TcpListener> {
    let listener = TcpListener::bind(config.bind_addr()).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);
    Ok(listener)
}

/// Run the lobby server until Ctrl-C.
pub async fn run(config: Config) -> Result<(), LobbyError> {
    let listener = bind(&config).await?;

    let state = Arc::new(Mutex::new(ServerState::new()));
    let acceptor = tokio::spawn(serve(listener, Arc::clone(&state)));

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");

    state.lock().await.broadcast_all(ServerMessage::ServerClosing);
    // Let the writer tasks flush the closing notice.
    tokio::time::sleep(Duration::from_millis(100)).await;
    acceptor.abort();

    Ok(())
}

/// Accept connections on `listener` forever.
pub async fn serve(listener: TcpListener, state: SharedState) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                tokio::spawn(handle_connection(stream, addr, Arc::clone(&state)));
            }
            Err(e) => {
                tracing::error!("Failed to accept connection: {}", e);
            }
        }
    }
}

/// Handle a single WebSocket connection.
async fn handle_connection(stream: TcpStream, addr: SocketAddr, state: SharedState) {
    let ws_stream = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            tracing::warn!(%addr, "WebSocket handshake failed: {}", e);
            return;
        }
    };

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let user_id = state.lock().await.connect(tx);
    tracing::info!(%addr, %user_id, "Client connected");

    // Forward queued messages to the socket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("Failed to encode {:?}: {}", msg, e);
                    continue;
                }
            };
            if ws_sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(msg) = ws_receiver.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text.to_string(),
            Ok(Message::Close(_)) => break,
            Err(e) => {
                tracing::debug!(%user_id, "Connection error: {}", e);
                break;
            }
            _ => continue,
        };

        let client_msg: ClientMessage = match serde_json::from_str(&text) {
            Ok(m) => m,
            Err(e) => {
                tracing::debug!(%user_id, "Ignoring malformed message: {}", e);
                continue;
            }
        };

        handle_client_message(&user_id, client_msg, &state).await;
    }

    state.lock().await.disconnect(&user_id);
    send_task.abort();
}

/// Handle a single client message.
async fn handle_client_message(user_id: &str, msg: ClientMessage, state: &SharedState) {
    tracing::debug!(%user_id, ?msg, "Received");
    let mut state = state.lock().await;

    match msg {
        ClientMessage::Join { name, code } => {
            let _ = state.join(user_id, &name, code.as_deref());
        }
        ClientMessage::StartGame { game_id } => {
            state.start_game(user_id, &game_id);
        }
    }
}
