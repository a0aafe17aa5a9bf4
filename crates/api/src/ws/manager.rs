use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::ws::Message;
use flowstate_core::client_id::is_valid_client_id;
use flowstate_core::types::{ClientId, Timestamp};
use serde::Serialize;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// Metadata for a single registered WebSocket connection.
pub struct WsConnection {
    /// Unique id of this particular socket. A reconnect under the same
    /// client id gets a new one.
    pub conn_id: Uuid,
    /// User the client announced at connect time, if any.
    pub user_id: Option<String>,
    /// Channel sender for outbound messages to this connection.
    pub sender: WsSender,
    /// When this connection was established.
    pub connected_at: Timestamp,
}

/// Resolved send target for one client, valid for a single send.
#[derive(Debug, Clone)]
pub struct WsTarget {
    pub client_id: ClientId,
    pub conn_id: Uuid,
    pub sender: WsSender,
}

/// Read-only description of a registered connection.
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub client_id: ClientId,
    pub conn_id: Uuid,
    pub user_id: Option<String>,
    pub connected_at: Timestamp,
}

/// Registry of live WebSocket sessions keyed by client id.
///
/// Holds at most one connection per client id. Thread-safe via interior
/// `RwLock`; designed to be wrapped in `Arc` and shared across the
/// application. No lock is held while a message is pushed, since sends are
/// non-blocking channel writes performed on a cloned sender.
pub struct WsManager {
    connections: RwLock<HashMap<ClientId, WsConnection>>,
}

impl WsManager {
    /// Create a new, empty connection manager.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new socket under `client_id` and create its channel.
    ///
    /// Returns the connection id together with the receiver half of the
    /// message channel, so the caller can forward messages to the
    /// WebSocket sink.
    pub async fn add(
        &self,
        client_id: ClientId,
        user_id: Option<String>,
    ) -> (Uuid, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn_id = self.register(client_id, user_id, tx).await;
        (conn_id, rx)
    }

    /// Install `sender` as the transport for `client_id`.
    ///
    /// Any existing connection for the same id is replaced and sent a Close
    /// frame. Malformed ids are not stored: the sender is dropped and the
    /// returned connection id matches no entry, so `lookup`,
    /// `connection_count` and `broadcast_targets` all treat the id as absent.
    pub async fn register(
        &self,
        client_id: ClientId,
        user_id: Option<String>,
        sender: WsSender,
    ) -> Uuid {
        let conn_id = Uuid::new_v4();
        if !is_valid_client_id(&client_id) {
            tracing::debug!(
                client_id = %client_id,
                conn_id = %conn_id,
                "Refusing to register malformed client id",
            );
            return conn_id;
        }

        let conn = WsConnection {
            conn_id,
            user_id,
            sender,
            connected_at: chrono::Utc::now(),
        };

        let replaced = self
            .connections
            .write()
            .await
            .insert(client_id.clone(), conn);

        if let Some(old) = replaced {
            tracing::info!(
                client_id = %client_id,
                old_conn_id = %old.conn_id,
                conn_id = %conn_id,
                "Replaced existing WebSocket connection",
            );
            let _ = old.sender.send(Message::Close(None));
        }

        conn_id
    }

    /// Remove the connection registered under `client_id`, if any.
    pub async fn unregister(&self, client_id: &str) {
        self.connections.write().await.remove(client_id);
    }

    /// Remove the entry for `client_id` only if it is still `conn_id`.
    ///
    /// Returns `true` when an entry was removed. A socket that was
    /// replaced by a reconnect leaves the newer entry in place.
    pub async fn unregister_connection(&self, client_id: &str, conn_id: Uuid) -> bool {
        let mut conns = self.connections.write().await;
        match conns.get(client_id) {
            Some(conn) if conn.conn_id == conn_id => {
                conns.remove(client_id);
                true
            }
            _ => false,
        }
    }

    /// Resolve the current transport for `client_id`.
    ///
    /// Malformed ids resolve to `None`, as do ids with no live connection.
    pub async fn lookup(&self, client_id: &str) -> Option<WsTarget> {
        if !is_valid_client_id(client_id) {
            return None;
        }
        self.connections
            .read()
            .await
            .get(client_id)
            .map(|conn| WsTarget {
                client_id: client_id.to_string(),
                conn_id: conn.conn_id,
                sender: conn.sender.clone(),
            })
    }

    /// Snapshot of every registered transport, taken under a single read
    /// lock.
    pub async fn broadcast_targets(&self) -> Vec<WsTarget> {
        self.connections
            .read()
            .await
            .iter()
            .map(|(client_id, conn)| WsTarget {
                client_id: client_id.clone(),
                conn_id: conn.conn_id,
                sender: conn.sender.clone(),
            })
            .collect()
    }

    /// Describe every registered connection, sorted by client id.
    pub async fn sessions(&self) -> Vec<SessionInfo> {
        let mut sessions: Vec<SessionInfo> = self
            .connections
            .read()
            .await
            .iter()
            .map(|(client_id, conn)| SessionInfo {
                client_id: client_id.clone(),
                conn_id: conn.conn_id,
                user_id: conn.user_id.clone(),
                connected_at: conn.connected_at,
            })
            .collect();
        sessions.sort_by(|a, b| a.client_id.cmp(&b.client_id));
        sessions
    }

    /// Return the current number of active connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Send a Close frame to every connection, then clear the map.
    ///
    /// Used during graceful shutdown to notify all clients before the
    /// server exits.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Send a Ping frame to every connected client.
    ///
    /// Used by the heartbeat task to keep connections alive. Connections
    /// whose channel is already closed are dropped from the map; returns how
    /// many were pruned.
    pub async fn ping_all(&self) -> usize {
        let mut conns = self.connections.write().await;
        let before = conns.len();
        conns.retain(|client_id, conn| {
            let alive = conn.sender.send(Message::Ping(Bytes::new())).is_ok();
            if !alive {
                tracing::debug!(client_id = %client_id, conn_id = %conn.conn_id, "Pruned stale WebSocket connection");
            }
            alive
        });
        before - conns.len()
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}
