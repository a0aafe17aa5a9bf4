use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use flowstate_core::client_id::validate_client_id;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;

use crate::error::AppResult;
use crate::state::AppState;
use crate::ws::manager::WsManager;

/// Query parameters accepted on the upgrade request.
#[derive(Debug, Deserialize)]
pub struct WsConnectQuery {
    pub user_id: Option<String>,
}

/// GET /api/v1/ws/{client_id}
///
/// Upgrades the connection to WebSocket. After the upgrade the socket is
/// registered with `WsManager` under `client_id`, replacing any previous
/// socket for that id.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(client_id): Path<String>,
    Query(query): Query<WsConnectQuery>,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    validate_client_id(&client_id)?;

    Ok(ws.on_upgrade(move |socket| {
        handle_socket(socket, client_id, query.user_id, state.ws_manager)
    }))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection with `WsManager`.
///   2. Spawns a sender task that forwards messages from the manager channel.
///   3. Processes inbound messages on the current task.
///   4. Removes its own registry entry on disconnect.
async fn handle_socket(
    socket: WebSocket,
    client_id: String,
    user_id: Option<String>,
    ws_manager: Arc<WsManager>,
) {
    let (conn_id, mut rx) = ws_manager.add(client_id.clone(), user_id).await;
    tracing::info!(client_id = %client_id, conn_id = %conn_id, "WebSocket connected");

    let (mut sink, mut stream) = socket.split();

    // Sender task: forward channel messages to the WebSocket sink. Dropping
    // `rx` on exit makes further sends fail, which unregisters the entry.
    let sender_client_id = client_id.clone();
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let is_close = matches!(msg, Message::Close(_));
            if sink.send(msg).await.is_err() {
                tracing::debug!(client_id = %sender_client_id, "WebSocket sink closed");
                break;
            }
            if is_close {
                break;
            }
        }
    });

    // Receiver loop: inbound frames carry no commands; only watch for close.
    loop {
        tokio::select! {
            _ = &mut send_task => break,
            frame = stream.next() => match frame {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(Message::Pong(_))) => {
                    tracing::trace!(client_id = %client_id, "Pong received");
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!(client_id = %client_id, error = %e, "WebSocket receive error");
                    break;
                }
            },
        }
    }

    ws_manager.unregister_connection(&client_id, conn_id).await;
    send_task.abort();
    tracing::info!(client_id = %client_id, conn_id = %conn_id, "WebSocket disconnected");
}
