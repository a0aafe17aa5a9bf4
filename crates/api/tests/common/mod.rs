#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::ws::Message;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use flowstate_agent::{Agent, AgentError, AgentInput, AgentOutput, Turn};
use flowstate_events::AgentEvent;
use http_body_util::BodyExt;
use tokio::sync::mpsc;
use tower::ServiceExt;

use flowstate_api::config::ServerConfig;
use flowstate_api::router::build_app_router;
use flowstate_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default),
/// a 30-second request timeout and a 5-second agent timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        agent_url: "http://127.0.0.1:9".to_string(),
        agent_timeout_secs: 5,
    }
}

/// What a [`FakeAgent`] does when invoked.
#[derive(Clone)]
pub enum Script {
    /// Append an assistant turn with this text and return `context`.
    Reply {
        text: String,
        context: Vec<serde_json::Value>,
    },
    /// Return an empty conversation.
    Empty,
    /// Fail with [`AgentError::Failed`].
    Fail(String),
    /// Panic inside `invoke`.
    Panic,
    /// Sleep this long, then reply `"late"`.
    Delay(Duration),
}

/// In-process agent driven by a [`Script`]. Records every input it sees.
pub struct FakeAgent {
    script: Script,
    pub inputs: Mutex<Vec<AgentInput>>,
}

impl FakeAgent {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            inputs: Mutex::new(Vec::new()),
        })
    }

    pub fn replying(text: &str, context: Vec<serde_json::Value>) -> Arc<Self> {
        Self::new(Script::Reply {
            text: text.to_string(),
            context,
        })
    }

    pub fn failing(error: &str) -> Arc<Self> {
        Self::new(Script::Fail(error.to_string()))
    }

    pub fn recorded_inputs(&self) -> Vec<AgentInput> {
        self.inputs.lock().unwrap().clone()
    }
}

#[async_trait]
impl Agent for FakeAgent {
    async fn invoke(&self, input: AgentInput) -> Result<AgentOutput, AgentError> {
        self.inputs.lock().unwrap().push(input.clone());

        match &self.script {
            Script::Reply { text, context } => {
                let mut conversation = input.conversation;
                conversation.push(Turn::assistant(text.clone()));
                Ok(AgentOutput {
                    conversation,
                    context: context.clone(),
                })
            }
            Script::Empty => Ok(AgentOutput {
                conversation: vec![],
                context: vec![],
            }),
            Script::Fail(error) => Err(AgentError::Failed(error.clone())),
            Script::Panic => panic!("agent blew up"),
            Script::Delay(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(AgentOutput {
                    conversation: vec![Turn::assistant("late")],
                    context: vec![],
                })
            }
        }
    }
}

/// Build application state around `agent` using [`test_config`].
pub fn test_state(agent: Arc<dyn Agent>) -> AppState {
    AppState::new(test_config(), agent)
}

/// Build the full application router with all middleware layers.
///
/// Returns the state as well so tests can register sessions directly.
pub fn build_test_app(agent: Arc<dyn Agent>) -> (Router, AppState) {
    let state = test_state(agent);
    (build_app_router(state.clone()), state)
}

/// Issue a GET request against `app`.
pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Issue a POST request with a JSON body against `app`.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Decode a text frame into an [`AgentEvent`].
pub fn decode_event(message: Message) -> AgentEvent {
    match message {
        Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
        other => panic!("Expected a text frame, got: {other:?}"),
    }
}

/// Wait (up to two seconds) for the next event on a session channel.
pub async fn next_event(rx: &mut mpsc::UnboundedReceiver<Message>) -> AgentEvent {
    let message = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for an event")
        .expect("channel closed before an event arrived");
    decode_event(message)
}

/// Drain every event already queued on a session channel.
pub fn drain_events(rx: &mut mpsc::UnboundedReceiver<Message>) -> Vec<AgentEvent> {
    let mut events = Vec::new();
    while let Ok(message) = rx.try_recv() {
        events.push(decode_event(message));
    }
    events
}
