//! Boundary to the external reasoning agent.
//!
//! The agent is a stateless function from a conversation to an updated
//! conversation plus retrieved context. This crate defines that contract
//! ([`Agent`]) and an HTTP implementation ([`HttpAgent`]).

pub mod client;
pub mod conversation;

use async_trait::async_trait;

pub use client::HttpAgent;
pub use conversation::{AgentInput, AgentOutput, AgentReply, Role, Turn};

/// Errors raised at the agent boundary.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("Agent request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The agent service returned a non-2xx status code.
    #[error("Agent service error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The agent answered with something that is not a usable result.
    #[error("Malformed agent output: {0}")]
    Malformed(String),

    /// The agent reported a failure of its own.
    #[error("{0}")]
    Failed(String),
}

/// An external reasoning agent.
///
/// Implementations must be safe to call from many jobs at once.
#[async_trait]
pub trait Agent: Send + Sync {
    async fn invoke(&self, input: AgentInput) -> Result<AgentOutput, AgentError>;
}
