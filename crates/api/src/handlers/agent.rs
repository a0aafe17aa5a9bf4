//! Handlers for the `/agent` trigger endpoints.
//!
//! Both endpoints only accept work: they validate the request, hand an
//! [`AgentJob`] to the background runner, and answer `202 Accepted`
//! immediately. Progress and results reach the client over its WebSocket
//! session.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use flowstate_core::client_id::validate_client_id;
use flowstate_core::job::validate_required;
use serde::{Deserialize, Serialize};

use crate::background::AgentJob;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of `POST /api/v1/agent/analyze`.
#[derive(Debug, Deserialize)]
pub struct AnalyzeTaskRequest {
    pub client_id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
}

/// Body of `POST /api/v1/agent/chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(alias = "socket_id")]
    pub client_id: String,
    pub user_id: String,
    pub message: String,
}

/// Acknowledgement returned by both trigger endpoints.
#[derive(Debug, Serialize)]
pub struct JobAccepted {
    pub status: &'static str,
    pub client_id: String,
}

/// POST /api/v1/agent/analyze
///
/// Queue an agent analysis of a newly created task.
pub async fn analyze_task(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeTaskRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    validate_client_id(&input.client_id)?;
    validate_required("user_id", &input.user_id)?;
    validate_required("title", &input.title)?;

    let job = AgentJob::task_analysis(
        input.client_id.clone(),
        input.user_id,
        &input.title,
        input.description.as_deref(),
    );
    state.agent_jobs.submit(job)?;

    Ok(accepted(input.client_id))
}

/// POST /api/v1/agent/chat
///
/// Queue an agent answer to a chat message.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    validate_client_id(&input.client_id)?;
    validate_required("user_id", &input.user_id)?;
    validate_required("message", &input.message)?;

    let job = AgentJob::chat(input.client_id.clone(), input.user_id, input.message);
    state.agent_jobs.submit(job)?;

    Ok(accepted(input.client_id))
}

fn accepted(client_id: String) -> impl IntoResponse {
    (
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: JobAccepted {
                status: "processing",
                client_id,
            },
        }),
    )
}
