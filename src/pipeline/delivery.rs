//! Worker → presentation hand-off.
//!
//! Single producer (the recognition worker), single consumer (the
//! presentation loop). Live updates may be coalesced while they queue up;
//! segments are never coalesced or dropped.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use crate::transcript::TranscriptEvent;

pub fn delivery_bus() -> (EventSender, EventDrain) {
    let (tx, rx) = mpsc::channel();
    (EventSender { tx }, EventDrain { rx })
}

/// Worker-side handle. Sending never blocks.
pub struct EventSender {
    tx: Sender<TranscriptEvent>,
}

impl EventSender {
    /// False once the consumer is gone.
    pub fn send(&self, event: TranscriptEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// What one drain cycle produced.
#[derive(Debug, Default)]
pub struct Drained {
    pub events: Vec<TranscriptEvent>,
    /// True once the worker has exited and the queue is empty.
    pub disconnected: bool,
}

/// Presentation-side handle, polled on the consumer's own cadence.
pub struct EventDrain {
    rx: Receiver<TranscriptEvent>,
}

impl EventDrain {
    /// Pop up to `max_events` pending events (the rest wait for the next
    /// cycle) and coalesce the live updates: only the newest `Live` in the
    /// batch is meaningful, segments all survive in emission order.
    pub fn drain(&self, max_events: usize) -> Drained {
        let mut raw = Vec::new();
        let mut disconnected = false;
        while raw.len() < max_events {
            match self.rx.try_recv() {
                Ok(event) => raw.push(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    disconnected = true;
                    break;
                }
            }
        }

        Drained {
            events: coalesce_live(raw),
            disconnected,
        }
    }
}

fn coalesce_live(events: Vec<TranscriptEvent>) -> Vec<TranscriptEvent> {
    let last_live = events
        .iter()
        .rposition(|event| matches!(event, TranscriptEvent::Live { .. }));
    events
        .into_iter()
        .enumerate()
        .filter(|(index, event)| {
            matches!(event, TranscriptEvent::Segment(_)) || Some(*index) == last_live
        })
        .map(|(_, event)| event)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::{Segment, SegmentTime, DEFAULT_SPEAKER};
    use std::time::Duration;

    fn live(text: &str) -> TranscriptEvent {
        TranscriptEvent::Live {
            text: text.to_string(),
        }
    }

    fn segment(text: &str) -> TranscriptEvent {
        TranscriptEvent::Segment(Segment {
            timestamp: SegmentTime::StreamOffset(Duration::ZERO),
            speaker: DEFAULT_SPEAKER.to_string(),
            text: text.to_string(),
        })
    }

    #[test]
    fn test_stale_live_updates_are_coalesced() {
        let (tx, drain) = delivery_bus();
        for event in [live("a"), live("a b"), segment("a b c"), live("a b c")] {
            assert!(tx.send(event));
        }

        let drained = drain.drain(16);
        assert_eq!(drained.events, [segment("a b c"), live("a b c")]);
        assert!(!drained.disconnected);
    }

    #[test]
    fn test_segments_survive_coalescing_in_order() {
        let (tx, drain) = delivery_bus();
        for event in [live("x"), segment("one"), live("y"), segment("two"), live("z")] {
            tx.send(event);
        }

        let drained = drain.drain(16);
        assert_eq!(drained.events, [segment("one"), segment("two"), live("z")]);
    }

    #[test]
    fn test_drain_cap_leaves_the_rest_for_the_next_cycle() {
        let (tx, drain) = delivery_bus();
        for index in 0..5 {
            tx.send(segment(&index.to_string()));
        }

        let first = drain.drain(3);
        assert_eq!(first.events.len(), 3);
        let second = drain.drain(3);
        assert_eq!(second.events.len(), 2);
        assert_eq!(second.events[1], segment("4"));
    }

    #[test]
    fn test_disconnect_is_reported_once_empty() {
        let (tx, drain) = delivery_bus();
        tx.send(live("tail"));
        drop(tx);

        let drained = drain.drain(16);
        assert_eq!(drained.events, [live("tail")]);
        assert!(drained.disconnected);
        assert!(drain.drain(16).disconnected);
    }
}
