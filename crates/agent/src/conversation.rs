//! Conversation state exchanged with the agent.
//!
//! Turns travel as two-element arrays, `["user", "text"]`, matching the
//! agent service's `(role, text)` pairs.

use serde::{Deserialize, Serialize};

use crate::AgentError;

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    #[serde(alias = "ai")]
    Assistant,
    System,
    Tool,
    /// Any role this backend does not distinguish.
    #[serde(other)]
    Other,
}

/// One `(role, text)` conversation entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn(pub Role, pub String);

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self(Role::User, text.into())
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self(Role::Assistant, text.into())
    }

    pub fn role(&self) -> Role {
        self.0
    }

    pub fn text(&self) -> &str {
        &self.1
    }
}

/// Request body sent to the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentInput {
    pub conversation: Vec<Turn>,
    pub user_id: String,
}

impl AgentInput {
    /// Start a conversation with a single user turn.
    pub fn from_prompt(prompt: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            conversation: vec![Turn::user(prompt)],
            user_id: user_id.into(),
        }
    }
}

/// Updated state returned by the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentOutput {
    pub conversation: Vec<Turn>,
    #[serde(default)]
    pub context: Vec<serde_json::Value>,
}

/// The parts of an [`AgentOutput`] delivered to the client.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentReply {
    pub content: String,
    pub context: Vec<serde_json::Value>,
}

impl AgentOutput {
    /// Take the last turn's text as the answer, keeping the context.
    ///
    /// An empty conversation has no answer and counts as malformed output.
    pub fn into_reply(self) -> Result<AgentReply, AgentError> {
        let Self {
            mut conversation,
            context,
        } = self;
        let last = conversation
            .pop()
            .ok_or_else(|| AgentError::Malformed("conversation is empty".to_string()))?;
        Ok(AgentReply {
            content: last.1,
            context,
        })
    }
}
