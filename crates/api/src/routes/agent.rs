//! Route definitions for the `/agent` trigger endpoints.

use axum::routing::post;
use axum::Router;

use crate::handlers::agent;
use crate::state::AppState;

/// Routes mounted at `/agent`.
///
/// ```text
/// POST   /analyze         -> analyze_task
/// POST   /chat            -> chat
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/analyze", post(agent::analyze_task))
        .route("/chat", post(agent::chat))
}
