pub mod agent;
pub mod health;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws/{client_id}                                  WebSocket session
/// /connections                                     live sessions (GET)
///
/// /agent/analyze                                   queue task analysis (POST)
/// /agent/chat                                      queue chat answer (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // WebSocket endpoint.
        .route("/ws/{client_id}", get(ws::ws_handler))
        .route("/connections", get(handlers::connections::list_connections))
        // Agent job triggers.
        .nest("/agent", agent::router())
}
