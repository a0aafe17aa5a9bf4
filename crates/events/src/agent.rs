//! Agent job lifecycle events.
//!
//! Wire format (one JSON object per WebSocket text frame):
//!
//! ```text
//! {"type":"agent_status","status":"started","message":"Agent analyzing task: Write report"}
//! {"type":"agent_result","content":"Report drafted","context":[]}
//! {"type":"agent_status","status":"completed","message":"Agent analysis finished."}
//! {"type":"agent_error","error":"rate limited"}
//! ```

use serde::{Deserialize, Serialize};

/// WebSocket message type for status updates.
pub const MSG_TYPE_AGENT_STATUS: &str = "agent_status";

/// WebSocket message type for a successful agent answer.
pub const MSG_TYPE_AGENT_RESULT: &str = "agent_result";

/// WebSocket message type for a failed agent job.
pub const MSG_TYPE_AGENT_ERROR: &str = "agent_error";

/// Progress marker carried by [`AgentEvent::Status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Started,
    Completed,
}

/// A single lifecycle notification for one agent job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AgentEvent {
    #[serde(rename = "agent_status")]
    Status { status: AgentStatus, message: String },

    #[serde(rename = "agent_result")]
    Result {
        content: String,
        context: Vec<serde_json::Value>,
    },

    #[serde(rename = "agent_error")]
    Error { error: String },
}

impl AgentEvent {
    pub fn started(message: impl Into<String>) -> Self {
        Self::Status {
            status: AgentStatus::Started,
            message: message.into(),
        }
    }

    pub fn completed(message: impl Into<String>) -> Self {
        Self::Status {
            status: AgentStatus::Completed,
            message: message.into(),
        }
    }

    pub fn result(content: impl Into<String>, context: Vec<serde_json::Value>) -> Self {
        Self::Result {
            content: content.into(),
            context,
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self::Error {
            error: error.into(),
        }
    }

    /// The `type` discriminator this event serialises with.
    pub fn message_type(&self) -> &'static str {
        match self {
            Self::Status { .. } => MSG_TYPE_AGENT_STATUS,
            Self::Result { .. } => MSG_TYPE_AGENT_RESULT,
            Self::Error { .. } => MSG_TYPE_AGENT_ERROR,
        }
    }

    /// Whether this is the `result` or `error` event that ends a job.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Result { .. } | Self::Error { .. })
    }

    /// Serialise to the JSON text carried in a WebSocket frame.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
