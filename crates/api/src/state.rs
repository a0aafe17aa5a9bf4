use std::sync::Arc;

use flowstate_agent::Agent;

use crate::background::AgentJobRunner;
use crate::config::ServerConfig;
use crate::ws::{EventDispatcher, WsManager};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Live WebSocket session registry.
    pub ws_manager: Arc<WsManager>,
    /// Background runner for agent jobs.
    pub agent_jobs: AgentJobRunner,
}

impl AppState {
    /// Build the state around `agent`, with an empty session registry.
    pub fn new(config: ServerConfig, agent: Arc<dyn Agent>) -> Self {
        let ws_manager = Arc::new(WsManager::new());
        let dispatcher = EventDispatcher::new(Arc::clone(&ws_manager));
        let agent_jobs =
            AgentJobRunner::new(dispatcher, agent).with_agent_timeout(config.agent_timeout());

        Self {
            config: Arc::new(config),
            ws_manager,
            agent_jobs,
        }
    }
}
