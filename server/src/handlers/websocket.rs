//! WebSocket handler for live session updates.
//!
//! Handles WebSocket connections and dispatches client messages to the same
//! handlers the HTTP routes use, while the connection manager pushes
//! session changes to every client.

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::websocket::{ClientMessage, ServerMessage};
use crate::AppState;

use super::{inspections, session};

/// Handle an established WebSocket connection.
///
/// This function:
/// 1. Registers the connection with the manager
/// 2. Sends the current state
/// 3. Spawns a task to forward outgoing messages
/// 4. Processes incoming messages in a loop
/// 5. Cleans up on disconnect
pub async fn handle_websocket_connection(socket: WebSocket, state: AppState, client: String) {
    // Split the socket into sender and receiver
    let (mut ws_sender, mut ws_receiver) = socket.split();

    // Create channel for sending messages to this connection
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    // Register and queue the current state under the session lock, so no
    // broadcast can arrive ahead of an older initial state
    let conn_manager = state.conn_manager.clone();
    let conn_id = {
        let session = state.session.lock().await;
        let conn_id = conn_manager.register(client.clone(), tx);
        conn_manager.send_to(
            &conn_id,
            ServerMessage::State {
                state: session.view(),
                request_id: None,
            },
        );
        conn_id
    };

    tracing::info!(
        conn_id = %conn_id,
        client = %client,
        "WebSocket client connected"
    );

    // Spawn task to forward messages from channel to WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(text) => {
                    if let Err(e) = ws_sender.send(Message::Text(text.into())).await {
                        tracing::warn!("Failed to send WebSocket message: {}", e);
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to serialize WebSocket message: {}", e);
                }
            }
        }
    });

    // Process incoming messages
    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Text(text)) => {
                let response = process_message(&text, &state).await;
                conn_manager.send_to(&conn_id, response);
            }
            Ok(Message::Binary(_)) => {
                tracing::warn!("Binary messages not supported");
            }
            Ok(Message::Ping(data)) => {
                tracing::trace!("Received ping: {} bytes", data.len());
            }
            Ok(Message::Pong(_)) => {
                tracing::trace!("Received pong");
            }
            Ok(Message::Close(_)) => {
                tracing::info!(conn_id = %conn_id, "WebSocket close frame received");
                break;
            }
            Err(e) => {
                tracing::warn!(conn_id = %conn_id, "WebSocket error: {}", e);
                break;
            }
        }
    }

    // Clean up
    conn_manager.unregister(&conn_id);
    send_task.abort();

    tracing::info!(
        conn_id = %conn_id,
        client = %client,
        active_connections = conn_manager.connection_count(),
        "WebSocket client disconnected"
    );
}

/// Process a client message and return a server response.
pub async fn process_message(text: &str, state: &AppState) -> ServerMessage {
    let client_msg: ClientMessage = match serde_json::from_str(text) {
        Ok(msg) => msg,
        Err(e) => {
            return ServerMessage::error(format!("Invalid message format: {}", e), None);
        }
    };

    match client_msg {
        ClientMessage::GetState { request_id } => ServerMessage::State {
            state: session::handle_state(state).await,
            request_id,
        },

        ClientMessage::SaveInspection {
            inspection,
            request_id,
        } => match inspections::handle_save(state, inspection).await {
            Ok(result) => ServerMessage::SaveResponse { result, request_id },
            Err(e) => ServerMessage::error(e.to_string(), request_id),
        },

        ClientMessage::Sync { request_id } => match session::handle_sync(state).await {
            Ok(result) => ServerMessage::SyncResponse { result, request_id },
            Err(e) => ServerMessage::error(e.to_string(), request_id),
        },

        ClientMessage::ToggleOnline { request_id } => ServerMessage::ConnectivityResponse {
            result: session::handle_toggle_online(state).await,
            request_id,
        },

        ClientMessage::Ping => ServerMessage::Pong,
    }
}
