//! Lifecycle events pushed to live WebSocket sessions.
//!
//! - [`AgentEvent`] — closed set of messages emitted by background agent
//!   jobs, serialised with a `type` discriminator.
//! - [`AgentStatus`] — the two non-terminal status values.

pub mod agent;

pub use agent::{AgentEvent, AgentStatus};
