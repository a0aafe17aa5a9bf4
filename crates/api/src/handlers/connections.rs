//! Handler for inspecting live WebSocket sessions.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::response::DataResponse;
use crate::state::AppState;
use crate::ws::manager::SessionInfo;

/// Payload of `GET /api/v1/connections`.
#[derive(Debug, Serialize)]
pub struct ConnectionList {
    pub count: usize,
    pub sessions: Vec<SessionInfo>,
}

/// GET /api/v1/connections
pub async fn list_connections(State(state): State<AppState>) -> Json<DataResponse<ConnectionList>> {
    let sessions = state.ws_manager.sessions().await;
    Json(DataResponse {
        data: ConnectionList {
            count: sessions.len(),
            sessions,
        },
    })
}
