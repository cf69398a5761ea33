//! Pipeline error types.

/// Errors that can occur while driving a session's pipeline.
///
/// Most failure modes in this system are *not* represented here — an
/// invalid state transition, a malformed PCM block, or a cancelled
/// synthesis are all normal outcomes handled inline (see `§7` of the
/// design notes) rather than propagated as errors. This type exists for
/// the handful of conditions that genuinely abort an operation.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The session has already been closed; no further frames are accepted.
    #[error("session is closed")]
    SessionClosed,

    /// A synthesizer or recognizer was asked to operate without having
    /// been configured with a reply/transcript first.
    #[error("no active utterance")]
    NoActiveUtterance,
}
