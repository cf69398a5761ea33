//! Signaling endpoints: `offer_received` / `close_received` (§6).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::error::HttpError;
use crate::sse::ObservabilityEvent;
use crate::state::AppState;

#[derive(Serialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
    pub audio_url: String,
}

/// `POST /session` — `offer_received`: create a session and hand back its
/// id and the WebSocket URL for the audio data plane.
pub async fn create(State(state): State<AppState>) -> impl IntoResponse {
    let id = state.registry.create().await;
    let body = CreateSessionResponse { session_id: id, audio_url: format!("/session/{id}/audio") };
    (StatusCode::CREATED, Json(body))
}

/// `DELETE /session/{id}` — `close_received`: tear down a session.
pub async fn close(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode, HttpError> {
    let record = state
        .registry
        .remove(id)
        .await
        .ok_or_else(|| HttpError::NotFound(format!("session {id}")))?;
    record.controller.lock().await.close();
    state.sse.emit(ObservabilityEvent::SessionClose { session_id: id });
    Ok(StatusCode::NO_CONTENT)
}
