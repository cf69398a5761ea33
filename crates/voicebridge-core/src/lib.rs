//! Pure pipeline logic for a real-time, full-duplex voice session: frame
//! normalization, voice-activity detection, reply synthesis, and the
//! barge-in-aware session state machine.
//!
//! This crate has no knowledge of any particular transport — see
//! `voicebridge-server` for the axum/WebSocket adapter that drives a
//! [`SessionController`] from real network traffic.

pub mod cancel;
pub mod error;
pub mod frame;
pub mod metrics;
pub mod responder;
pub mod session;
pub mod synthesizer;
pub mod transcript;
pub mod vad;

pub use cancel::CancelToken;
pub use error::PipelineError;
pub use frame::{Frame, FrameNormalizer, FRAME_BYTES, FRAME_SAMPLES, TARGET_SAMPLE_RATE_HZ};
pub use metrics::{MetricEvent, MetricsRecorder, MetricsSnapshot};
pub use responder::respond_to;
pub use session::{SessionController, SessionEvent, SessionState};
pub use synthesizer::synthesize;
pub use transcript::TranscriptEvent;
pub use vad::Recognizer;
