//! Session Controller — routes frames and transcript/response events,
//! enforces the session state machine, and owns the synthesis cancellation
//! handle.

use std::time::{Duration, Instant};

use futures_util::stream::Stream;
use tracing::{info, warn};

use crate::frame::{Frame, FrameNormalizer};
use crate::metrics::{MetricEvent, MetricsRecorder};
use crate::synthesizer;
use crate::transcript::TranscriptEvent;
use crate::vad::{rms, Recognizer, VOICE_THRESHOLD};

/// The session's barge-in budget; a barge-in slower than this logs a warning
/// but is otherwise handled identically.
const BARGE_IN_BUDGET: Duration = Duration::from_millis(300);

/// The session's lifecycle state. See the module-level transition table in
/// [`SessionState::allows`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Listening,
    Processing,
    Speaking,
    Interrupted,
}

impl SessionState {
    /// Whether a transition from `self` to `to` is permitted.
    #[must_use]
    pub const fn allows(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Idle, Self::Listening)
                | (Self::Listening, Self::Processing | Self::Idle)
                | (Self::Processing, Self::Speaking | Self::Listening | Self::Idle)
                | (Self::Speaking, Self::Interrupted | Self::Listening | Self::Idle)
                | (Self::Interrupted, Self::Listening | Self::Idle)
        )
    }
}

/// An observable outcome of feeding inbound audio to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A recognizer transcript event (`Partial` or `Final`).
    Transcript(TranscriptEvent),
    /// A barge-in was triggered and handled; carries its measured latency.
    BargeIn { latency: Duration },
}

/// Owns one session's pipeline state: the frame normalizer, recognizer,
/// cancellation handle, and metrics log.
pub struct SessionController {
    state: SessionState,
    normalizer: FrameNormalizer,
    recognizer: Recognizer,
    cancel: Option<crate::cancel::CancelToken>,
    metrics: MetricsRecorder,
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionController {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            normalizer: FrameNormalizer::new(),
            recognizer: Recognizer::new(),
            cancel: None,
            metrics: MetricsRecorder::new(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn metrics(&self) -> &MetricsRecorder {
        &self.metrics
    }

    /// `IDLE -> LISTENING`. Returns whether the transition succeeded.
    pub fn start(&mut self) -> bool {
        let ok = self.transition(SessionState::Listening);
        if ok {
            self.metrics.record(MetricEvent::SessionStart);
        }
        ok
    }

    /// Record that the transport-level connection (e.g. the WebRTC/WebSocket
    /// handshake) has completed. Purely an observability event; it doesn't
    /// affect the state machine.
    pub fn mark_webrtc_connected(&mut self) {
        self.metrics.record(MetricEvent::WebrtcConnected);
    }

    /// Abort any active cancellation handle, drop to `IDLE`, and record
    /// session close. Safe to call more than once.
    pub fn close(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.trip();
        }
        self.transition(SessionState::Idle);
        self.metrics.record(MetricEvent::SessionClose);
    }

    /// Normalize and process a raw inbound audio block, returning every
    /// event produced by the frames it yields, in order.
    pub fn on_inbound_bytes(
        &mut self,
        bytes: &[u8],
        source_rate_hz: u32,
        source_channels: u16,
    ) -> Vec<SessionEvent> {
        let frames = self.normalizer.push(bytes, source_rate_hz, source_channels);
        frames
            .iter()
            .filter_map(|frame| self.on_inbound_frame(frame))
            .collect()
    }

    /// Route one normalized inbound frame per §4.4: barge-in detection while
    /// `SPEAKING`, recognition while `LISTENING`, dropped otherwise.
    fn on_inbound_frame(&mut self, frame: &Frame) -> Option<SessionEvent> {
        match self.state {
            SessionState::Speaking if rms(frame) > VOICE_THRESHOLD => {
                Some(SessionEvent::BargeIn { latency: self.run_barge_in() })
            }
            SessionState::Listening => {
                let event = self.recognizer.process_frame(frame)?;
                match &event {
                    TranscriptEvent::Partial { .. } => {
                        self.metrics.record(MetricEvent::SttPartial);
                    }
                    TranscriptEvent::Final { .. } => {
                        self.metrics.record(MetricEvent::SttFinal);
                        self.transition(SessionState::Processing);
                    }
                }
                Some(SessionEvent::Transcript(event))
            }
            _ => None,
        }
    }

    /// Run the 8-step barge-in procedure (§4.5) and return its latency.
    fn run_barge_in(&mut self) -> Duration {
        let t0 = Instant::now();

        self.transition(SessionState::Interrupted);
        if let Some(cancel) = self.cancel.take() {
            cancel.trip();
        }
        // Buffered outbound audio and the synthesizer's phase live only in
        // the now-abandoned response stream; dropping it without draining
        // covers steps 4 and 5.
        self.transition(SessionState::Listening);
        self.recognizer.reset();

        let latency = t0.elapsed();
        if latency > BARGE_IN_BUDGET {
            warn!(?latency, "barge-in exceeded budget");
        } else {
            info!(?latency, "barge-in handled");
        }
        self.metrics.record(MetricEvent::BargeIn { latency });
        latency
    }

    /// Begin synthesizing a reply: `PROCESSING -> SPEAKING`, allocate a
    /// fresh cancellation handle, and return the frame stream for the
    /// caller to drain into the transport. Fails (and logs) if the session
    /// wasn't in `PROCESSING` — either it's already closed (`IDLE`) and
    /// accepts no further work, or there is no finalized utterance to reply to.
    pub fn begin_response(
        &mut self,
        reply_text: impl Into<String>,
    ) -> Result<impl Stream<Item = Frame>, crate::error::PipelineError> {
        if self.state == SessionState::Idle {
            return Err(crate::error::PipelineError::SessionClosed);
        }
        if !self.transition(SessionState::Speaking) {
            return Err(crate::error::PipelineError::NoActiveUtterance);
        }
        let cancel = crate::cancel::CancelToken::new();
        self.cancel = Some(cancel.clone());
        self.metrics.record(MetricEvent::TtsStart);
        Ok(synthesizer::synthesize(&reply_text.into(), cancel))
    }

    /// Call once, when the first frame of a response stream is handed to
    /// the transport, to record `tts_first_chunk` latency.
    pub fn on_response_first_frame(&mut self) {
        self.metrics.record(MetricEvent::TtsFirstChunk);
    }

    /// Call once the response stream completes normally (not via barge-in):
    /// `SPEAKING -> LISTENING`.
    pub fn on_response_complete(&mut self) {
        self.transition(SessionState::Listening);
        self.cancel = None;
        self.metrics.record(MetricEvent::TtsComplete);
    }

    fn transition(&mut self, to: SessionState) -> bool {
        if self.state.allows(to) {
            self.state = to;
            true
        } else {
            warn!(from = ?self.state, to = ?to, "rejected invalid session transition");
            false
        }
    }
}
