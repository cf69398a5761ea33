//! `GET /session/{id}/metrics` — the per-session observability snapshot.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;
use voicebridge_core::MetricsSnapshot;

use crate::error::HttpError;
use crate::state::AppState;

/// Wire representation of [`MetricsSnapshot`], with durations in whole
/// milliseconds rather than `std::time::Duration`.
#[derive(Serialize)]
pub struct MetricsSnapshotDto {
    pub total_events: usize,
    pub webrtc_connect_time_ms: Option<u64>,
    pub avg_stt_latency_ms: Option<u64>,
    pub barge_in_latencies_ms: Vec<u64>,
    pub max_barge_in_latency_ms: Option<u64>,
}

impl From<MetricsSnapshot> for MetricsSnapshotDto {
    fn from(snapshot: MetricsSnapshot) -> Self {
        Self {
            total_events: snapshot.total_events,
            webrtc_connect_time_ms: snapshot.webrtc_connect_time.map(|d| d.as_millis() as u64),
            avg_stt_latency_ms: snapshot.avg_stt_latency.map(|d| d.as_millis() as u64),
            barge_in_latencies_ms: snapshot.barge_in_latencies.iter().map(|d| d.as_millis() as u64).collect(),
            max_barge_in_latency_ms: snapshot.max_barge_in_latency.map(|d| d.as_millis() as u64),
        }
    }
}

pub async fn snapshot(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MetricsSnapshotDto>, HttpError> {
    let record = state
        .registry
        .get(id)
        .await
        .ok_or_else(|| HttpError::NotFound(format!("session {id}")))?;
    let snapshot = record.controller.lock().await.metrics().snapshot();
    Ok(Json(snapshot.into()))
}
