//! The recognition worker: a single dedicated thread that owns the engine
//! and all segmentation state.

use std::thread::{self, JoinHandle};
use std::time::Instant;

use log::debug;

use super::delivery::EventSender;
use super::frame::FrameConsumer;
use super::segmenter::SegmentationPolicy;
use crate::engine::RecognitionEngine;

/// Spawn the worker. It blocks on the frame queue, feeds each frame to the
/// engine, and exits once every producer is gone and the queue is drained.
pub fn spawn(
    mut engine: Box<dyn RecognitionEngine>,
    mut policy: SegmentationPolicy,
    frames: FrameConsumer,
    events: EventSender,
) -> JoinHandle<()> {
    thread::spawn(move || {
        while let Some(frame) = frames.recv() {
            let outcome = match engine.feed(frame.samples()) {
                Ok(outcome) => outcome,
                Err(e) => {
                    // Per-frame decode problems never stall the stream.
                    debug!(
                        "skipping undecodable recognizer output for frame {}: {e:#}",
                        frame.seq()
                    );
                    continue;
                }
            };

            for event in policy.handle(outcome, Instant::now()) {
                if !events.send(event) {
                    debug!("event consumer gone, recognition worker stopping");
                    return;
                }
            }
        }
        debug!("frame queue closed, recognition worker exiting");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RecognitionOutcome;
    use crate::pipeline::{delivery_bus, frame_queue, EventDrain};
    use crate::transcript::{SegmentTime, TranscriptEvent, DEFAULT_SPEAKER};
    use anyhow::{anyhow, Result};
    use std::collections::VecDeque;
    use std::time::Duration;

    /// Plays back a canned outcome per fed frame.
    struct ScriptedEngine {
        script: VecDeque<Result<RecognitionOutcome>>,
    }

    impl ScriptedEngine {
        fn new(script: impl IntoIterator<Item = Result<RecognitionOutcome>>) -> Box<Self> {
            Box::new(Self {
                script: script.into_iter().collect(),
            })
        }
    }

    impl RecognitionEngine for ScriptedEngine {
        fn feed(&mut self, _pcm: &[i16]) -> Result<RecognitionOutcome> {
            self.script.pop_front().unwrap_or_else(|| {
                Ok(RecognitionOutcome::Partial {
                    text: String::new(),
                })
            })
        }
    }

    fn partial(text: &str) -> Result<RecognitionOutcome> {
        Ok(RecognitionOutcome::Partial {
            text: text.to_string(),
        })
    }

    fn final_outcome(text: &str, words: &[(&str, f32, f32)]) -> Result<RecognitionOutcome> {
        Ok(RecognitionOutcome::Final {
            text: text.to_string(),
            words: words
                .iter()
                .map(|(word, start, end)| crate::engine::WordTiming {
                    text: word.to_string(),
                    start: *start,
                    end: *end,
                })
                .collect(),
        })
    }

    /// A wide-open throttle would let both partials through; a long one
    /// makes the suppression deterministic for the end-to-end scenario.
    fn run_script(
        script: Vec<Result<RecognitionOutcome>>,
        min_partial_interval: Duration,
    ) -> EventDrain {
        let frames = script.len();
        let engine = ScriptedEngine::new(script);
        let policy = SegmentationPolicy::new(DEFAULT_SPEAKER, min_partial_interval);
        let (producer, consumer) = frame_queue(frames.max(1));
        let (events, drain) = delivery_bus();

        let handle = spawn(engine, policy, consumer, events);
        for _ in 0..frames {
            assert!(producer.push(&[0i16; 320]));
        }
        drop(producer);
        handle.join().unwrap();
        drain
    }

    #[test]
    fn test_end_to_end_utterance() {
        let drain = run_script(
            vec![
                partial("open"),
                partial("open the"),
                final_outcome(
                    "open the door",
                    &[("open", 0.0, 0.2), ("the", 0.2, 0.3), ("door", 0.3, 0.6)],
                ),
            ],
            Duration::from_secs(60),
        );

        // Draining one raw event at a time bypasses coalescing, so the full
        // emitted stream is observable.
        let first = drain.drain(1).events;
        assert_eq!(
            first,
            [TranscriptEvent::Live {
                text: "open …".to_string()
            }]
        );

        let second = drain.drain(1).events;
        match &second[0] {
            TranscriptEvent::Segment(segment) => {
                assert_eq!(segment.text, "open the door");
                assert_eq!(segment.speaker, DEFAULT_SPEAKER);
                assert_eq!(segment.timestamp, SegmentTime::StreamOffset(Duration::ZERO));
            }
            other => panic!("expected the segment, got {other:?}"),
        }

        let third = drain.drain(1).events;
        assert_eq!(
            third,
            [TranscriptEvent::Live {
                text: "open the door".to_string()
            }]
        );

        let rest = drain.drain(8);
        assert!(rest.events.is_empty());
        assert!(rest.disconnected);
    }

    #[test]
    fn test_finals_are_never_dropped_and_stay_ordered() {
        let mut script = Vec::new();
        for _ in 0..20 {
            script.push(partial("chatter"));
        }
        script.push(final_outcome("first utterance", &[("first", 0.1, 0.4)]));
        for _ in 0..20 {
            script.push(partial("more chatter"));
        }
        script.push(final_outcome("second utterance", &[("second", 2.0, 2.4)]));

        let drain = run_script(script, Duration::from_millis(80));
        let mut segments = Vec::new();
        loop {
            let drained = drain.drain(64);
            for event in drained.events {
                if let TranscriptEvent::Segment(segment) = event {
                    segments.push(segment.text);
                }
            }
            if drained.disconnected {
                break;
            }
        }

        assert_eq!(segments, ["first utterance", "second utterance"]);
    }

    #[test]
    fn test_undecodable_output_is_skipped_without_events() {
        let drain = run_script(
            vec![
                Err(anyhow!("garbage from the recognizer")),
                partial("still alive"),
            ],
            Duration::ZERO,
        );

        let drained = drain.drain(16);
        assert_eq!(
            drained.events,
            [TranscriptEvent::Live {
                text: "still alive …".to_string()
            }]
        );
    }

    #[test]
    fn test_empty_outcomes_emit_nothing() {
        let drain = run_script(
            vec![partial("   "), final_outcome("", &[]), partial("")],
            Duration::ZERO,
        );

        let drained = drain.drain(16);
        assert!(drained.events.is_empty());
    }
}
