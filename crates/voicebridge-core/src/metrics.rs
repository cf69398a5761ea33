//! Metrics Recorder — a per-session timestamped event log and the derived
//! snapshot used for observability.

use std::time::{Duration, Instant};

/// One recordable occurrence in a session's lifetime.
///
/// `BargeIn` carries its own latency because that figure — time from the
/// interrupting frame to the barge-in procedure completing — isn't
/// recoverable from the log's timestamps alone; the Session Controller
/// measures it directly and attaches it here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricEvent {
    SessionStart,
    WebrtcConnected,
    SttPartial,
    SttFinal,
    TtsStart,
    TtsFirstChunk,
    TtsComplete,
    BargeIn { latency: Duration },
    SessionClose,
}

/// A point-in-time summary derived from a session's event log.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSnapshot {
    /// Total number of events recorded so far.
    pub total_events: usize,
    /// Time from `SessionStart` to `WebrtcConnected`, if both occurred.
    pub webrtc_connect_time: Option<Duration>,
    /// Average time from the first `SttPartial` of an utterance to its `SttFinal`.
    pub avg_stt_latency: Option<Duration>,
    /// Every recorded barge-in latency, in occurrence order.
    pub barge_in_latencies: Vec<Duration>,
    /// The largest recorded barge-in latency, if any occurred.
    pub max_barge_in_latency: Option<Duration>,
}

/// Accumulates [`MetricEvent`]s for a single session and derives snapshots
/// from the log on demand.
#[derive(Debug, Default)]
pub struct MetricsRecorder {
    events: Vec<(MetricEvent, Instant)>,
}

impl MetricsRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Append an event, timestamped now.
    pub fn record(&mut self, event: MetricEvent) {
        self.events.push((event, Instant::now()));
    }

    /// Total events recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Derive a [`MetricsSnapshot`] from the current log.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let total_events = self.events.len();

        let session_start = self.first_timestamp(|e| matches!(e, MetricEvent::SessionStart));
        let webrtc_connected = self.first_timestamp(|e| matches!(e, MetricEvent::WebrtcConnected));
        let webrtc_connect_time = match (session_start, webrtc_connected) {
            (Some(start), Some(connected)) => Some(connected.saturating_duration_since(start)),
            _ => None,
        };

        let mut stt_latencies = Vec::new();
        let mut utterance_start: Option<Instant> = None;
        for (event, ts) in &self.events {
            match event {
                MetricEvent::SttPartial => {
                    utterance_start.get_or_insert(*ts);
                }
                MetricEvent::SttFinal => {
                    if let Some(start) = utterance_start.take() {
                        stt_latencies.push(ts.saturating_duration_since(start));
                    }
                }
                _ => {}
            }
        }
        let avg_stt_latency = average(&stt_latencies);

        let barge_in_latencies: Vec<Duration> = self
            .events
            .iter()
            .filter_map(|(e, _)| match e {
                MetricEvent::BargeIn { latency } => Some(*latency),
                _ => None,
            })
            .collect();
        let max_barge_in_latency = barge_in_latencies.iter().copied().max();

        MetricsSnapshot {
            total_events,
            webrtc_connect_time,
            avg_stt_latency,
            barge_in_latencies,
            max_barge_in_latency,
        }
    }

    fn first_timestamp(&self, matches: impl Fn(&MetricEvent) -> bool) -> Option<Instant> {
        self.events.iter().find(|(e, _)| matches(e)).map(|(_, ts)| *ts)
    }
}

fn average(durations: &[Duration]) -> Option<Duration> {
    if durations.is_empty() {
        return None;
    }
    let total: Duration = durations.iter().sum();
    Some(total / durations.len() as u32)
}
