//! Synthesizer — turns a reply string into a lazily-generated, cancellable
//! stream of [`Frame`]s paced in real time.
//!
//! Frames are produced on demand rather than all at once: the stream only
//! renders the next 20 ms of audio when the consumer polls for it, and a
//! [`CancelToken`] trip stops generation before the next frame is produced
//! rather than after the whole reply has been rendered.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use futures_util::stream::{self, Stream};

use crate::cancel::CancelToken;
use crate::frame::{Frame, FRAME_SAMPLES, TARGET_SAMPLE_RATE_HZ};

/// One frame's wall-clock duration.
const FRAME_DURATION: Duration = Duration::from_millis(20);

/// Lower bound of the text-derived tone frequency range, in Hz.
const MIN_FREQUENCY_HZ: f64 = 220.0;
/// Upper bound of the text-derived tone frequency range, in Hz.
const MAX_FREQUENCY_HZ: f64 = 880.0;

/// Fraction of full scale used for the synthesized tone's amplitude.
const AMPLITUDE: f64 = 0.3;

/// Number of 20 ms frames a reply of `text` renders as.
///
/// Loosely proportional to word count (about 3 words per second of speech),
/// with a floor of 2 frames so even a one-word reply is audible.
#[must_use]
pub fn frame_count_for(text: &str) -> usize {
    let words = text.split_whitespace().count().max(1) as f64;
    let seconds = (words / 3.0).max(2.0);
    ((seconds * 1000.0) / FRAME_DURATION.as_millis() as f64).ceil() as usize
}

/// Map `text` deterministically onto a tone frequency in `[220, 880]` Hz.
#[must_use]
fn frequency_for(text: &str) -> f64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    let h = hasher.finish();
    MIN_FREQUENCY_HZ + (h % (MAX_FREQUENCY_HZ - MIN_FREQUENCY_HZ) as u64) as f64
}

struct SynthState {
    remaining: usize,
    phase: f64,
    phase_step: f64,
    cancel: CancelToken,
}

/// Build a cancellable, real-time-paced stream of synthesized speech frames
/// for `text`. The stream ends early — without error — the moment `cancel`
/// is tripped, or naturally once [`frame_count_for`] frames have been
/// emitted.
pub fn synthesize(text: &str, cancel: CancelToken) -> impl Stream<Item = Frame> {
    let freq = frequency_for(text);
    let state = SynthState {
        remaining: frame_count_for(text),
        phase: 0.0,
        phase_step: 2.0 * std::f64::consts::PI * freq / f64::from(TARGET_SAMPLE_RATE_HZ),
        cancel,
    };

    stream::unfold(state, |mut state| async move {
        if state.remaining == 0 {
            return None;
        }
        if state.cancel.sleep_or_cancelled(FRAME_DURATION).await {
            return None;
        }

        let (frame, next_phase) = render_frame(state.phase, state.phase_step);
        state.phase = next_phase;
        state.remaining -= 1;
        Some((frame, state))
    })
}

/// Render one 320-sample sine-wave frame starting at `phase`, returning the
/// frame and the carried-forward phase for the next one.
fn render_frame(phase: f64, phase_step: f64) -> (Frame, f64) {
    let mut samples = [0i16; FRAME_SAMPLES];
    let mut p = phase;
    for sample in &mut samples {
        *sample = (p.sin() * AMPLITUDE * f64::from(i16::MAX)) as i16;
        p += phase_step;
        if p > 2.0 * std::f64::consts::PI {
            p -= 2.0 * std::f64::consts::PI;
        }
    }
    (Frame::from_samples(&samples), p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    #[test]
    fn frame_count_floors_at_two_seconds() {
        // max(words/3, 2.0) seconds floors at 2.0 s == 100 frames, not 2 frames.
        assert_eq!(frame_count_for("hi"), 100);
        assert_eq!(frame_count_for("a b c d e f g h i"), 150);
    }

    #[test]
    fn frequency_is_within_range() {
        let f = frequency_for("what is the weather like today");
        assert!((MIN_FREQUENCY_HZ..MAX_FREQUENCY_HZ).contains(&f));
    }

    #[test]
    fn same_text_yields_same_frequency() {
        assert_eq!(frequency_for("hello"), frequency_for("hello"));
    }

    #[tokio::test]
    async fn uncancelled_stream_yields_exactly_frame_count_frames() {
        let cancel = CancelToken::new();
        let text = "hi";
        let frames: Vec<_> = synthesize(text, cancel).collect().await;
        assert_eq!(frames.len(), frame_count_for(text));
    }

    #[tokio::test]
    async fn tripped_token_stops_the_stream_immediately() {
        let cancel = CancelToken::new();
        cancel.trip();
        let frames: Vec<_> = synthesize("a long reply with plenty of words in it", cancel)
            .collect()
            .await;
        assert!(frames.is_empty());
    }

    #[tokio::test]
    async fn cancelling_mid_stream_stops_further_frames() {
        let cancel = CancelToken::new();
        let mut stream = Box::pin(synthesize(
            "a long reply with plenty of words in it indeed",
            cancel.clone(),
        ));

        let first = stream.next().await;
        assert!(first.is_some());

        cancel.trip();
        let rest: Vec<_> = stream.collect().await;
        assert!(rest.is_empty());
    }
}
