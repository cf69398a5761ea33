//! Integration tests for the `SessionController` state machine end to end.
//!
//! These drive a controller through its full lifecycle using only the
//! public API a transport adapter would call — no mock backends are needed
//! since the recognizer and synthesizer in this crate are already
//! self-contained.
//!
//! # What is tested
//!
//! - Speech onset followed by silence yields exactly one `Final` transcript
//! - A reply can be spoken and barge-in interrupts it within budget
//! - Synthesis frame count follows the word-count law
//! - Invalid transitions are no-ops
//! - Two sessions never observe each other's state

use std::time::Duration;

use futures_util::StreamExt;
use voicebridge_core::frame::{Frame, FRAME_SAMPLES};
use voicebridge_core::session::{SessionController, SessionEvent, SessionState};
use voicebridge_core::synthesizer::frame_count_for;

fn pcm_bytes(amplitude: f32) -> Vec<u8> {
    let value = (amplitude * f32::from(i16::MAX)) as i16;
    Frame::from_samples(&[value; FRAME_SAMPLES]).as_bytes().to_vec()
}

fn voiced() -> Vec<u8> {
    pcm_bytes(0.1)
}

fn silent() -> Vec<u8> {
    pcm_bytes(0.0)
}

fn feed_voiced(ctl: &mut SessionController, count: usize) -> Vec<SessionEvent> {
    (0..count).flat_map(|_| ctl.on_inbound_bytes(&voiced(), 16_000, 1)).collect()
}

fn feed_silence(ctl: &mut SessionController, count: usize) -> Vec<SessionEvent> {
    (0..count).flat_map(|_| ctl.on_inbound_bytes(&silent(), 16_000, 1)).collect()
}

#[test]
fn speech_onset_then_silence_yields_exactly_one_final() {
    let mut ctl = SessionController::new();
    assert!(ctl.start());

    let mut events = feed_voiced(&mut ctl, 30);
    events.extend(feed_silence(&mut ctl, 15));

    let finals = events
        .iter()
        .filter(|e| matches!(e, SessionEvent::Transcript(t) if t.is_final()))
        .count();
    assert_eq!(finals, 1);
    assert_eq!(ctl.state(), SessionState::Processing);
}

#[tokio::test]
async fn bot_speaking_then_user_voiced_frame_triggers_barge_in_under_budget() {
    let mut ctl = SessionController::new();
    ctl.start();
    feed_voiced(&mut ctl, 30);
    feed_silence(&mut ctl, 15);
    assert_eq!(ctl.state(), SessionState::Processing);

    let stream = ctl.begin_response("tell me a short joke").expect("processing can speak");
    assert_eq!(ctl.state(), SessionState::Speaking);

    // Drain one frame so there's an in-flight response, then interrupt it.
    tokio::pin!(stream);
    let _first = stream.next().await;

    let events = ctl.on_inbound_bytes(&voiced(), 16_000, 1);
    assert_eq!(events.len(), 1);
    match &events[0] {
        SessionEvent::BargeIn { latency } => assert!(*latency < Duration::from_millis(300)),
        other => panic!("expected a barge-in event, got {other:?}"),
    }
    assert_eq!(ctl.state(), SessionState::Listening);

    // Remaining frames from the cancelled stream are not produced.
    let rest: Vec<_> = stream.collect().await;
    assert!(rest.is_empty());
}

#[test]
fn synthesis_frame_count_follows_the_word_count_law() {
    // max(words/3, 2.0) seconds floors at 2.0 s == ceil(2000/20) = 100 frames.
    assert_eq!(frame_count_for("hi"), 100);
    assert_eq!(frame_count_for(""), 100);
    // 30 words / 3 words-per-second = 10 s = 500 frames.
    let thirty_words = (0..30).map(|_| "word").collect::<Vec<_>>().join(" ");
    assert_eq!(frame_count_for(&thirty_words), 500);
}

#[test]
fn an_invalid_transition_is_rejected_and_leaves_state_unchanged() {
    let mut ctl = SessionController::new();
    // Fresh session is IDLE; IDLE -> SPEAKING is not in the transition table.
    assert!(ctl.begin_response("too soon").is_err());
    assert_eq!(ctl.state(), SessionState::Idle);
}

#[test]
fn two_sessions_are_fully_isolated() {
    let mut a = SessionController::new();
    let mut b = SessionController::new();

    a.start();
    feed_voiced(&mut a, 30);
    feed_silence(&mut a, 15);

    // b never received any frames or a start() call.
    assert_eq!(a.state(), SessionState::Processing);
    assert_eq!(b.state(), SessionState::Idle);
    assert_eq!(b.metrics().len(), 0);
    assert!(a.metrics().len() > 0);
}
