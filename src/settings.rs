use serde::{Deserialize, Serialize};

use crate::transcript::DEFAULT_SPEAKER;

/// Pipeline tuning knobs. None of these affect correctness, only latency
/// and update rate.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Settings {
    /// Recognizer sample rate in Hz.
    pub sample_rate: u32,
    /// Frame duration in milliseconds; smaller frames mean lower latency
    /// and more recognizer calls.
    pub frame_duration_ms: u32,
    /// Capture → worker queue depth, in frames.
    pub queue_capacity: usize,
    /// Minimum interval between live partial updates.
    pub partial_min_interval_ms: u64,
    /// Presentation drain cadence.
    pub drain_interval_ms: u64,
    /// Events consumed per drain cycle; the rest wait for the next tick.
    pub max_events_per_drain: usize,
    /// Speaker label for finalized segments.
    pub speaker: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            frame_duration_ms: 200,
            queue_capacity: 32,
            partial_min_interval_ms: 80,
            drain_interval_ms: 60,
            max_events_per_drain: 32,
            speaker: DEFAULT_SPEAKER.to_string(),
        }
    }
}
