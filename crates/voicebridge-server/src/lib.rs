//! Axum HTTP/WebSocket adapter for the voicebridge session pipeline.
//!
//! This crate owns transport concerns only — HTTP signaling, the WebSocket
//! audio data plane, and observability plumbing. The actual pipeline logic
//! (frame normalization, VAD, synthesis, the barge-in state machine) lives
//! in `voicebridge-core` and has no notion of axum or WebSockets at all.

pub mod bootstrap;
pub mod error;
pub mod handlers;
pub mod registry;
pub mod routes;
pub mod sse;
pub mod state;

pub use bootstrap::{bootstrap, start_server, CorsConfig, ServerConfig};
pub use error::HttpError;
pub use state::{AppContext, AppState};
