//! Fire-and-forget agent jobs.
//!
//! Each trigger becomes one [`AgentJob`] spawned onto the runner's
//! [`TaskTracker`]. The job emits, strictly in order on its own task:
//!
//! ```text
//! agent_status(started) -> agent_result -> agent_status(completed)
//! agent_status(started) -> agent_error
//! ```
//!
//! Every event is resolved against the registry when it is sent. Failures
//! of the agent, including timeouts and panics, end the job with an
//! `agent_error` event and never reach the trigger. No automatic retry is
//! performed.

use std::sync::Arc;
use std::time::Duration;

use flowstate_agent::{Agent, AgentInput, AgentReply};
use flowstate_core::error::CoreError;
use flowstate_core::job::{
    task_prompt, task_started_message, CHAT_STARTED_MESSAGE, COMPLETED_MESSAGE,
};
use flowstate_core::types::ClientId;
use flowstate_events::AgentEvent;
use tokio_util::task::TaskTracker;

use crate::ws::EventDispatcher;

/// What triggered a job. Only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentJobKind {
    TaskAnalysis,
    Chat,
}

impl AgentJobKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TaskAnalysis => "task_analysis",
            Self::Chat => "chat",
        }
    }
}

/// One background agent invocation.
#[derive(Debug, Clone)]
pub struct AgentJob {
    /// Session that receives the lifecycle events.
    pub client_id: ClientId,
    /// User on whose behalf the agent runs.
    pub user_id: String,
    pub kind: AgentJobKind,
    /// Opening user turn of the conversation.
    pub prompt: String,
    /// Text of the `started` status event.
    pub started_message: String,
}

impl AgentJob {
    /// Job analysing a newly created task.
    pub fn task_analysis(
        client_id: impl Into<ClientId>,
        user_id: impl Into<String>,
        title: &str,
        description: Option<&str>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            user_id: user_id.into(),
            kind: AgentJobKind::TaskAnalysis,
            prompt: task_prompt(title, description),
            started_message: task_started_message(title),
        }
    }

    /// Job answering a free-form chat message.
    pub fn chat(
        client_id: impl Into<ClientId>,
        user_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            user_id: user_id.into(),
            kind: AgentJobKind::Chat,
            prompt: message.into(),
            started_message: CHAT_STARTED_MESSAGE.to_string(),
        }
    }
}

/// Terminal state a job ended in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Succeeded,
    Failed,
}

/// Runs [`AgentJob`]s in the background and reports through
/// [`EventDispatcher`].
///
/// Cheaply cloneable; clones share the same tracker.
#[derive(Clone)]
pub struct AgentJobRunner {
    dispatcher: EventDispatcher,
    agent: Arc<dyn Agent>,
    agent_timeout: Option<Duration>,
    tracker: TaskTracker,
}

impl AgentJobRunner {
    /// Create a runner with no limit on agent invocation time.
    pub fn new(dispatcher: EventDispatcher, agent: Arc<dyn Agent>) -> Self {
        Self {
            dispatcher,
            agent,
            agent_timeout: None,
            tracker: TaskTracker::new(),
        }
    }

    /// Bound each agent invocation. `None` waits indefinitely.
    pub fn with_agent_timeout(mut self, agent_timeout: Option<Duration>) -> Self {
        self.agent_timeout = agent_timeout;
        self
    }

    /// Accept `job` for asynchronous processing.
    ///
    /// The job runs on its own task and is never joined by the caller.
    /// Fails only after [`shutdown`](Self::shutdown) has begun.
    pub fn submit(&self, job: AgentJob) -> Result<(), CoreError> {
        if self.tracker.is_closed() {
            return Err(CoreError::Unavailable(
                "agent jobs are no longer accepted, server is shutting down".to_string(),
            ));
        }

        tracing::info!(
            client_id = %job.client_id,
            user_id = %job.user_id,
            job_kind = job.kind.as_str(),
            "Agent job accepted",
        );

        let runner = self.clone();
        self.tracker.spawn(async move {
            runner.run(job).await;
        });
        Ok(())
    }

    /// Execute `job` to its terminal state, emitting every lifecycle event.
    pub async fn run(&self, job: AgentJob) -> JobState {
        let AgentJob {
            client_id,
            user_id,
            kind,
            prompt,
            started_message,
        } = job;

        self.dispatcher
            .send_to(&client_id, &AgentEvent::started(started_message))
            .await;

        match self.invoke(AgentInput::from_prompt(prompt, user_id)).await {
            Ok(AgentReply { content, context }) => {
                tracing::info!(
                    client_id = %client_id,
                    job_kind = kind.as_str(),
                    context_items = context.len(),
                    "Agent job succeeded",
                );
                self.dispatcher
                    .send_to(&client_id, &AgentEvent::result(content, context))
                    .await;
                self.dispatcher
                    .send_to(&client_id, &AgentEvent::completed(COMPLETED_MESSAGE))
                    .await;
                JobState::Succeeded
            }
            Err(error) => {
                tracing::warn!(
                    client_id = %client_id,
                    job_kind = kind.as_str(),
                    error = %error,
                    "Agent job failed",
                );
                self.dispatcher
                    .send_to(&client_id, &AgentEvent::error(error))
                    .await;
                JobState::Failed
            }
        }
    }

    /// Call the agent on a separate task and extract the reply.
    ///
    /// A panic inside the agent or the extraction surfaces as `Err`.
    async fn invoke(&self, input: AgentInput) -> Result<AgentReply, String> {
        let agent = Arc::clone(&self.agent);
        let agent_timeout = self.agent_timeout;

        let call = tokio::spawn(async move {
            let output = match agent_timeout {
                Some(limit) => tokio::time::timeout(limit, agent.invoke(input))
                    .await
                    .map_err(|_| format!("Agent invocation timed out after {limit:?}"))?,
                None => agent.invoke(input).await,
            };
            output
                .and_then(|output| output.into_reply())
                .map_err(|e| e.to_string())
        });

        match call.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => Err("Agent invocation panicked".to_string()),
            Err(e) => Err(format!("Agent invocation aborted: {e}")),
        }
    }

    /// Number of jobs currently running.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Stop accepting jobs and wait up to `grace` for running ones.
    ///
    /// Returns `true` if every job finished within the grace period.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        self.tracker.close();
        let pending = self.tracker.len();
        let drained = tokio::time::timeout(grace, self.tracker.wait())
            .await
            .is_ok();
        tracing::info!(pending, drained, "Agent job runner shut down");
        drained
    }
}
