//! `GET /session/{id}/audio` — the Transport Adapter: a binary WebSocket
//! carrying the media session's audio in both directions.
//!
//! One task per connection drives the whole session cooperatively: a single
//! `tokio::select!` loop alternates between the next inbound WS message and
//! the next frame of an in-flight synthesis stream, so at most one future
//! ever touches the session's controller at a time (the three suspension
//! points named in the design notes: between synthesis frames, during
//! outbound send, and waiting on the next inbound block).
//!
//! Source rate/channels are negotiated once, out-of-band, via query
//! parameters on the upgrade request — a real media session would fix these
//! during SDP negotiation instead.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use futures_util::stream::Stream;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;
use voicebridge_core::{respond_to, Frame, SessionEvent, TranscriptEvent};

use crate::sse::{ObservabilityEvent, SseBroadcaster};
use crate::state::AppState;

/// Out-of-band source format, negotiated once at connection time.
#[derive(Debug, Deserialize)]
pub struct AudioQuery {
    #[serde(default = "default_rate")]
    pub rate: u32,
    #[serde(default = "default_channels")]
    pub channels: u16,
}

const fn default_rate() -> u32 {
    16_000
}

const fn default_channels() -> u16 {
    1
}

/// Upgrade the connection if the session id is known; otherwise the caller
/// gets a plain 404 without ever reaching the WebSocket machinery.
pub async fn upgrade(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<AudioQuery>,
) -> impl IntoResponse {
    match state.registry.get(id).await {
        Some(record) => {
            let sse = state.sse.clone();
            ws.on_upgrade(move |socket| {
                run_session(socket, id, record.controller, record.created_at, sse, query)
            })
            .into_response()
        }
        None => axum::http::StatusCode::NOT_FOUND.into_response(),
    }
}

async fn run_session(
    socket: WebSocket,
    session_id: Uuid,
    controller: Arc<tokio::sync::Mutex<voicebridge_core::SessionController>>,
    created_at: Instant,
    sse: Arc<SseBroadcaster>,
    query: AudioQuery,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    {
        let mut ctl = controller.lock().await;
        ctl.start();
        ctl.mark_webrtc_connected();
    }
    sse.emit(ObservabilityEvent::SessionStart { session_id });
    sse.emit(ObservabilityEvent::WebrtcConnected {
        session_id,
        connection_time_ms: created_at.elapsed().as_millis() as u64,
    });
    info!(%session_id, rate = query.rate, channels = query.channels, "audio session connected");

    let mut response_stream: Option<Pin<Box<dyn Stream<Item = Frame> + Send>>> = None;
    let mut first_frame_pending = false;
    let mut tts_started_at: Option<Instant> = None;
    let mut transport_failed = false;

    loop {
        tokio::select! {
            inbound = ws_rx.next() => {
                match inbound {
                    Some(Ok(Message::Binary(data))) => {
                        let events = controller
                            .lock()
                            .await
                            .on_inbound_bytes(&data, query.rate, query.channels);
                        for event in events {
                            handle_session_event(
                                event,
                                session_id,
                                &controller,
                                &sse,
                                &mut response_stream,
                                &mut first_frame_pending,
                                &mut tts_started_at,
                            )
                            .await;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(err)) => {
                        warn!(%session_id, %err, "audio transport error");
                        transport_failed = true;
                        break;
                    }
                    Some(Ok(_)) => {}
                }
            }
            frame = next_response_frame(&mut response_stream) => {
                match frame {
                    Some(frame) => {
                        if first_frame_pending {
                            controller.lock().await.on_response_first_frame();
                            let latency_ms = tts_started_at.take().map_or(0, |t| t.elapsed().as_millis() as u64);
                            sse.emit(ObservabilityEvent::TtsFirstChunk { session_id, latency_ms });
                            first_frame_pending = false;
                        }
                        if ws_tx.send(Message::Binary(frame.as_bytes().to_vec().into())).await.is_err() {
                            warn!(%session_id, "outbound send failed, ending session");
                            transport_failed = true;
                            break;
                        }
                    }
                    None => {
                        response_stream = None;
                        controller.lock().await.on_response_complete();
                        sse.emit(ObservabilityEvent::TtsComplete { session_id });
                    }
                }
            }
        }
    }

    {
        let mut ctl = controller.lock().await;
        ctl.close();
    }
    sse.emit(ObservabilityEvent::SessionClose { session_id });
    if transport_failed {
        warn!(%session_id, "audio session ended after transport failure");
    } else {
        info!(%session_id, "audio session closed");
    }
}

async fn handle_session_event(
    event: SessionEvent,
    session_id: Uuid,
    controller: &Arc<tokio::sync::Mutex<voicebridge_core::SessionController>>,
    sse: &SseBroadcaster,
    response_stream: &mut Option<Pin<Box<dyn Stream<Item = Frame> + Send>>>,
    first_frame_pending: &mut bool,
    tts_started_at: &mut Option<Instant>,
) {
    match event {
        SessionEvent::Transcript(TranscriptEvent::Partial { text }) => {
            sse.emit(ObservabilityEvent::SttPartial { session_id, text });
        }
        SessionEvent::Transcript(TranscriptEvent::Final { text }) => {
            sse.emit(ObservabilityEvent::SttFinal { session_id, text: text.clone(), latency_ms: None });
            let reply = respond_to(&text);
            let mut ctl = controller.lock().await;
            if let Ok(stream) = ctl.begin_response(reply.clone()) {
                *response_stream = Some(Box::pin(stream));
                *first_frame_pending = true;
                *tts_started_at = Some(Instant::now());
                sse.emit(ObservabilityEvent::TtsStart { session_id, text: reply });
            }
        }
        SessionEvent::BargeIn { latency } => {
            *response_stream = None;
            sse.emit(ObservabilityEvent::BargeIn {
                session_id,
                latency_ms: latency.as_millis() as u64,
            });
        }
    }
}

/// Await the next frame of the active response stream, or never resolve if
/// there isn't one — letting the `select!` arm for inbound messages win.
async fn next_response_frame(stream: &mut Option<Pin<Box<dyn Stream<Item = Frame> + Send>>>) -> Option<Frame> {
    match stream {
        Some(s) => s.next().await,
        None => std::future::pending().await,
    }
}
