//! Observability event broadcaster — fans out every session's named events
//! to `GET /events` subscribers over server-sent events.

use std::convert::Infallible;
use std::time::Duration;

use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::stream::Stream;
use serde::Serialize;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use uuid::Uuid;

/// One of the named observability events a session can produce (§6).
///
/// Millisecond fields are reported as `u64` on the wire; `stt_final`'s
/// latency is best-effort and may be absent — the authoritative per-session
/// figures live behind `GET /session/{id}/metrics`, this is just the live
/// feed.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ObservabilityEvent {
    #[serde(rename = "session_start")]
    SessionStart { session_id: Uuid },
    #[serde(rename = "webrtc_connected")]
    WebrtcConnected { session_id: Uuid, connection_time_ms: u64 },
    #[serde(rename = "stt_partial")]
    SttPartial { session_id: Uuid, text: String },
    #[serde(rename = "stt_final")]
    SttFinal {
        session_id: Uuid,
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        latency_ms: Option<u64>,
    },
    #[serde(rename = "tts_start")]
    TtsStart { session_id: Uuid, text: String },
    #[serde(rename = "tts_first_chunk")]
    TtsFirstChunk { session_id: Uuid, latency_ms: u64 },
    #[serde(rename = "tts_complete")]
    TtsComplete { session_id: Uuid },
    #[serde(rename = "barge_in")]
    BargeIn { session_id: Uuid, latency_ms: u64 },
    #[serde(rename = "session_close")]
    SessionClose { session_id: Uuid },
}

/// Broadcasts [`ObservabilityEvent`]s to every connected `/events` client.
#[derive(Debug, Clone)]
pub struct SseBroadcaster {
    sender: broadcast::Sender<ObservabilityEvent>,
}

impl SseBroadcaster {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(256)
    }

    /// Emit an event. Errors (no subscribers) are ignored — that's normal.
    pub fn emit(&self, event: ObservabilityEvent) {
        let _ = self.sender.send(event);
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Subscribe and return an axum SSE response for one client connection.
    pub fn subscribe(&self) -> Sse<impl Stream<Item = Result<Event, Infallible>> + Send + 'static> {
        let receiver = self.sender.subscribe();
        let stream = BroadcastStream::new(receiver).filter_map(|result| match result {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(json) => Some(Ok(Event::default().data(json))),
                Err(err) => {
                    tracing::warn!(%err, "failed to serialize observability event");
                    None
                }
            },
            Err(err) => {
                tracing::debug!(%err, "events subscriber lagged");
                None
            }
        });

        Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(30)).text("ping"))
    }
}

impl Default for SseBroadcaster {
    fn default() -> Self {
        Self::with_defaults()
    }
}
