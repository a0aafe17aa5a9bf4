//! WebSocket infrastructure for live client sessions.
//!
//! Provides the session registry, event dispatch, heartbeat monitoring, and
//! the HTTP upgrade handler used by Axum routes.

pub mod dispatcher;
mod handler;
mod heartbeat;
pub mod manager;

pub use dispatcher::{Delivery, EventDispatcher};
pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
