//! Delivery of agent lifecycle events to live sessions.
//!
//! [`EventDispatcher`] resolves the target client through [`WsManager`] at
//! the moment of every send, so a client that reconnected between two events
//! receives the later one on its new socket, and a client that went away is
//! skipped. Nothing here ever returns an error to the caller.

use std::sync::Arc;

use axum::extract::ws::Message;
use flowstate_events::AgentEvent;

use crate::ws::manager::{WsManager, WsTarget};

/// Outcome of a single [`EventDispatcher::send_to`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Handed to the client's outbound channel.
    Delivered,
    /// No live connection for that client id.
    Missed,
    /// The connection's channel was closed; it has been unregistered.
    Failed,
}

/// Formats [`AgentEvent`]s and pushes them to registered connections.
#[derive(Clone)]
pub struct EventDispatcher {
    ws_manager: Arc<WsManager>,
}

impl EventDispatcher {
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Send `event` to whichever connection currently holds `client_id`.
    pub async fn send_to(&self, client_id: &str, event: &AgentEvent) -> Delivery {
        let Some(target) = self.ws_manager.lookup(client_id).await else {
            tracing::debug!(
                client_id = %client_id,
                event_type = event.message_type(),
                "Client not connected, dropping event",
            );
            return Delivery::Missed;
        };

        let Some(message) = encode(event) else {
            return Delivery::Failed;
        };

        if self.push(&target, message).await {
            Delivery::Delivered
        } else {
            Delivery::Failed
        }
    }

    /// Send `event` to every connection registered at call time.
    ///
    /// Returns the number of connections the event was handed to.
    pub async fn broadcast(&self, event: &AgentEvent) -> usize {
        let Some(message) = encode(event) else {
            return 0;
        };

        let targets = self.ws_manager.broadcast_targets().await;
        let mut delivered = 0;
        for target in &targets {
            if self.push(target, message.clone()).await {
                delivered += 1;
            }
        }

        tracing::debug!(
            event_type = event.message_type(),
            targets = targets.len(),
            delivered,
            "Broadcast agent event",
        );
        delivered
    }

    /// Push one frame; on a closed channel, unregister that exact
    /// connection and report `false`.
    async fn push(&self, target: &WsTarget, message: Message) -> bool {
        if target.sender.send(message).is_ok() {
            return true;
        }

        tracing::debug!(
            client_id = %target.client_id,
            conn_id = %target.conn_id,
            "WebSocket channel closed, unregistering connection",
        );
        self.ws_manager
            .unregister_connection(&target.client_id, target.conn_id)
            .await;
        false
    }
}

/// Serialise an event into a text frame.
fn encode(event: &AgentEvent) -> Option<Message> {
    match event.to_json() {
        Ok(json) => Some(Message::Text(json.into())),
        Err(e) => {
            tracing::error!(
                error = %e,
                event_type = event.message_type(),
                "Failed to serialise agent event",
            );
            None
        }
    }
}
