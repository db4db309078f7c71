//! Transcript data model: the events crossing the worker/presentation
//! boundary and the append-only history of finalized utterances.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::Serialize;

/// Speaker label used until diarization exists.
pub const DEFAULT_SPEAKER: &str = "S1";

/// When a finalized utterance started.
///
/// `StreamOffset` is the start of the first recognized word, measured from
/// the beginning of the audio stream; `WallClock` is the fallback when the
/// recognizer reported no word timings. Both render as `HH:MM:SS`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value")]
pub enum SegmentTime {
    StreamOffset(Duration),
    WallClock(DateTime<Local>),
}

impl fmt::Display for SegmentTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentTime::StreamOffset(offset) => {
                let total = offset.as_secs();
                write!(
                    f,
                    "{:02}:{:02}:{:02}",
                    (total / 3600) % 24,
                    (total / 60) % 60,
                    total % 60
                )
            }
            SegmentTime::WallClock(time) => write!(f, "{}", time.format("%H:%M:%S")),
        }
    }
}

/// One finalized utterance. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub timestamp: SegmentTime,
    pub speaker: String,
    pub text: String,
}

/// The only type crossing the worker → presentation boundary.
///
/// `Live` replaces the currently displayed line; `Segment` is appended to
/// the history. Any later event supersedes an earlier `Live`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum TranscriptEvent {
    Live { text: String },
    Segment(Segment),
}

/// Append-only store of finalized segments, in recognition completion order.
#[derive(Debug, Default)]
pub struct TranscriptHistory {
    segments: Vec<Segment>,
}

impl TranscriptHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    /// Read view for rendering.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
