//! Voice Activity Detector / Recognizer — detects voiced regions and emits
//! the transcript event stream.
//!
//! The recognizer itself is a deterministic round-robin over a fixed list of
//! canned demo strings, independent of the audio's actual content. The
//! contract under test is the VAD-gated emission shape (`Partial* Final`,
//! with non-shrinking prefix growth), not transcription accuracy — the real
//! ML model is out of scope for this system (see `SPEC_FULL.md` §1, §4.2).

use crate::frame::Frame;
use crate::transcript::TranscriptEvent;

/// RMS energy above which a frame is considered voiced.
pub const VOICE_THRESHOLD: f32 = 0.02;
/// Consecutive voiced frames (~500 ms) before an utterance is recognized as started.
pub const VOICE_START_FRAMES: u32 = 25;
/// A further `Partial` is emitted every this many voiced frames while processing.
pub const PARTIAL_INTERVAL_FRAMES: u32 = 10;
/// Consecutive silent frames (~300 ms) after which an utterance is considered ended.
pub const SILENCE_END_FRAMES: u32 = 15;

/// The canned demo transcripts, cycled round-robin per utterance.
const CANNED_TRANSCRIPTS: &[&str] = &[
    "what is the weather like today",
    "can you set a timer for ten minutes",
    "tell me a short joke",
    "what time is it in tokyo",
    "play some relaxing music",
];

/// Compute RMS (root-mean-square) energy of a frame, normalized to `[-1, 1]`.
///
/// Exported because the Session Controller also uses it, independently of
/// any [`Recognizer`] instance, to decide whether an inbound frame arriving
/// during `SPEAKING` counts as barge-in.
#[must_use]
pub fn rms(frame: &Frame) -> f32 {
    let samples = frame.samples();
    let sum_sq: f64 = samples
        .iter()
        .map(|&s| {
            let n = f64::from(s) / f64::from(i16::MAX);
            n * n
        })
        .sum();
    (sum_sq / samples.len() as f64).sqrt() as f32
}

/// Streaming voice-activity detector and (stubbed) recognizer.
pub struct Recognizer {
    voiced_frames: u32,
    silence_frames: u32,
    is_processing: bool,
    cursor: usize,
    current_text: Option<&'static str>,
    revealed_words: usize,
}

impl Default for Recognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Recognizer {
    /// Create a fresh recognizer, waiting for speech.
    #[must_use]
    pub fn new() -> Self {
        Self {
            voiced_frames: 0,
            silence_frames: 0,
            is_processing: false,
            cursor: 0,
            current_text: None,
            revealed_words: 0,
        }
    }

    /// Reset the voiced/silence counters and in-progress utterance state.
    ///
    /// The round-robin cursor over canned transcripts is *not* reset — it
    /// keeps advancing across utterances (and across barge-in resets) so
    /// consecutive utterances don't repeat the same demo text.
    pub fn reset(&mut self) {
        self.voiced_frames = 0;
        self.silence_frames = 0;
        self.is_processing = false;
        self.current_text = None;
        self.revealed_words = 0;
    }

    /// Whether an utterance is currently being recognized (between the
    /// voice-start threshold and the eventual `Final`).
    #[must_use]
    pub const fn is_processing(&self) -> bool {
        self.is_processing
    }

    /// Feed one normalized frame, returning a transcript event if this frame
    /// crosses a voice-start, partial, or end-of-utterance boundary.
    pub fn process_frame(&mut self, frame: &Frame) -> Option<TranscriptEvent> {
        if rms(frame) > VOICE_THRESHOLD {
            self.on_voiced_frame()
        } else {
            self.on_silent_frame()
        }
    }

    fn on_voiced_frame(&mut self) -> Option<TranscriptEvent> {
        self.voiced_frames += 1;
        self.silence_frames = 0;

        if !self.is_processing {
            if self.voiced_frames < VOICE_START_FRAMES {
                return None;
            }
            self.is_processing = true;
            let text = CANNED_TRANSCRIPTS[self.cursor];
            self.cursor = (self.cursor + 1) % CANNED_TRANSCRIPTS.len();
            self.current_text = Some(text);
            self.revealed_words = 1;
            return Some(TranscriptEvent::Partial {
                text: prefix_of(text, self.revealed_words),
            });
        }

        if self.voiced_frames % PARTIAL_INTERVAL_FRAMES == 0 {
            let text = self.current_text.expect("set when is_processing began");
            let total_words = text.split_whitespace().count();
            self.revealed_words = (self.revealed_words + 1).min(total_words);
            return Some(TranscriptEvent::Partial {
                text: prefix_of(text, self.revealed_words),
            });
        }

        None
    }

    fn on_silent_frame(&mut self) -> Option<TranscriptEvent> {
        if !self.is_processing {
            self.voiced_frames = 0;
            return None;
        }

        self.silence_frames += 1;
        if self.silence_frames < SILENCE_END_FRAMES {
            return None;
        }

        let text = self
            .current_text
            .expect("set when is_processing began")
            .to_string();
        self.reset();
        Some(TranscriptEvent::Final { text })
    }
}

fn prefix_of(text: &str, words: usize) -> String {
    text.split_whitespace()
        .take(words)
        .collect::<Vec<_>>()
        .join(" ")
}
