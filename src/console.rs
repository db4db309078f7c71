//! Console presentation layer.
//!
//! A single-threaded consumer that drains the delivery bus on a fixed
//! cadence: live updates rewrite the current line in place, finalized
//! segments scroll above it as `[HH:MM:SS] S1: text` rows and land in the
//! transcript history. The worker never touches any of this state.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crate::pipeline::EventDrain;
use crate::settings::Settings;
use crate::transcript::{TranscriptEvent, TranscriptHistory};

#[derive(Default)]
pub struct ConsoleView {
    history: TranscriptHistory,
}

impl ConsoleView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render a batch of events and append finals to the history.
    pub fn apply(&mut self, events: Vec<TranscriptEvent>) {
        if events.is_empty() {
            return;
        }

        let mut out = io::stdout().lock();
        for event in events {
            match event {
                TranscriptEvent::Live { text } => {
                    let _ = write!(out, "\r\x1b[K{text}");
                }
                TranscriptEvent::Segment(segment) => {
                    let _ = writeln!(
                        out,
                        "\r\x1b[K[{}] {}: {}",
                        segment.timestamp, segment.speaker, segment.text
                    );
                    self.history.append(segment);
                }
            }
        }
        let _ = out.flush();
    }

    /// Drain on the configured cadence until the bus disconnects or the
    /// stop flag is raised.
    pub fn poll(&mut self, drain: &EventDrain, settings: &Settings, stop: &AtomicBool) {
        let cadence = Duration::from_millis(settings.drain_interval_ms);
        loop {
            if stop.load(Ordering::Relaxed) {
                break;
            }
            let drained = drain.drain(settings.max_events_per_drain);
            let disconnected = drained.disconnected;
            self.apply(drained.events);
            if disconnected {
                break;
            }
            thread::sleep(cadence);
        }
    }

    /// Consume whatever is still queued after shutdown. Only returns once
    /// the bus is empty and closed.
    pub fn flush(&mut self, drain: &EventDrain, max_events: usize) {
        loop {
            let drained = drain.drain(max_events);
            let done = drained.disconnected && drained.events.is_empty();
            self.apply(drained.events);
            if done {
                break;
            }
        }
    }

    pub fn into_history(self) -> TranscriptHistory {
        self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::delivery_bus;
    use crate::transcript::{Segment, SegmentTime, DEFAULT_SPEAKER};

    fn segment(text: &str) -> TranscriptEvent {
        TranscriptEvent::Segment(Segment {
            timestamp: SegmentTime::StreamOffset(Duration::ZERO),
            speaker: DEFAULT_SPEAKER.to_string(),
            text: text.to_string(),
        })
    }

    #[test]
    fn test_applied_segments_land_in_history() {
        let mut view = ConsoleView::new();
        view.apply(vec![
            TranscriptEvent::Live {
                text: "hel …".to_string(),
            },
            segment("hello"),
            segment("world"),
        ]);

        let history = view.into_history();
        let texts: Vec<&str> = history.segments().iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, ["hello", "world"]);
    }

    #[test]
    fn test_flush_consumes_the_whole_backlog() {
        let (tx, drain) = delivery_bus();
        for index in 0..10 {
            tx.send(segment(&index.to_string()));
        }
        drop(tx);

        let mut view = ConsoleView::new();
        view.flush(&drain, 3);
        assert_eq!(view.into_history().len(), 10);
    }
}
