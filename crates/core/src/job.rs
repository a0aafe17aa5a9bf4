//! Text builders for agent jobs.
//!
//! A job carries two strings derived from its trigger: the prompt handed to
//! the agent as the opening user turn, and the short description shown to
//! the client in the `started` status event.

use crate::error::CoreError;

/// Status message sent once the agent has produced its answer.
pub const COMPLETED_MESSAGE: &str = "Agent analysis finished.";

/// `started` description for a task-analysis job.
pub fn task_started_message(title: &str) -> String {
    format!("Agent analyzing task: {title}")
}

/// `started` description for a free-form chat job.
pub const CHAT_STARTED_MESSAGE: &str = "Agent processing message";

/// Opening user turn for a newly created task.
///
/// A missing or blank description is rendered as `None`.
pub fn task_prompt(title: &str, description: Option<&str>) -> String {
    let description = description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or("None");
    format!("New task created: '{title}'. Description: {description}")
}

/// Reject empty or whitespace-only required text fields.
pub fn validate_required(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}
