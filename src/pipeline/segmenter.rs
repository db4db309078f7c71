//! Turns the raw recognizer outcome stream into a minimal, UI-worthy
//! transcript event stream.
//!
//! Partials are lossy by design: identical or too-frequent guesses are
//! suppressed so the presentation layer is not flooded with redraws.
//! Finals are never throttled.

use std::time::{Duration, Instant};

use chrono::Local;

use crate::engine::{RecognitionOutcome, WordTiming};
use crate::transcript::{Segment, SegmentTime, TranscriptEvent};

/// Marker appended to the live line while the utterance is still open.
const LIVE_SUFFIX: &str = " …";

#[derive(Debug, Default)]
struct ThrottleState {
    last_partial: String,
    last_emit: Option<Instant>,
}

/// Per-utterance segmentation and throttling. Owned by the recognition
/// worker; no other thread touches this state.
pub struct SegmentationPolicy {
    speaker: String,
    min_partial_interval: Duration,
    throttle: ThrottleState,
}

impl SegmentationPolicy {
    pub fn new(speaker: impl Into<String>, min_partial_interval: Duration) -> Self {
        Self {
            speaker: speaker.into(),
            min_partial_interval,
            throttle: ThrottleState::default(),
        }
    }

    /// Decide which transcript events a recognizer outcome is worth.
    /// `now` is passed in so the throttle window is testable.
    pub fn handle(&mut self, outcome: RecognitionOutcome, now: Instant) -> Vec<TranscriptEvent> {
        match outcome {
            RecognitionOutcome::Partial { text } => self.on_partial(text.trim(), now),
            RecognitionOutcome::Final { text, words } => self.on_final(text.trim(), &words),
        }
    }

    fn on_partial(&mut self, text: &str, now: Instant) -> Vec<TranscriptEvent> {
        if text.is_empty() || text == self.throttle.last_partial {
            return Vec::new();
        }
        if let Some(last_emit) = self.throttle.last_emit {
            if now.duration_since(last_emit) < self.min_partial_interval {
                // Suppressed partials leave the throttle state alone, so the
                // same text can still be emitted once the window reopens.
                return Vec::new();
            }
        }

        self.throttle.last_partial = text.to_string();
        self.throttle.last_emit = Some(now);
        vec![TranscriptEvent::Live {
            text: format!("{text}{LIVE_SUFFIX}"),
        }]
    }

    fn on_final(&mut self, text: &str, words: &[WordTiming]) -> Vec<TranscriptEvent> {
        if text.is_empty() {
            return Vec::new();
        }

        let timestamp = match words.first() {
            Some(word) if word.start.is_finite() => {
                SegmentTime::StreamOffset(Duration::from_secs_f32(word.start.max(0.0)))
            }
            _ => SegmentTime::WallClock(Local::now()),
        };

        self.throttle = ThrottleState::default();

        vec![
            TranscriptEvent::Segment(Segment {
                timestamp,
                speaker: self.speaker.clone(),
                text: text.to_string(),
            }),
            TranscriptEvent::Live {
                text: text.to_string(),
            },
        ]
    }
}
