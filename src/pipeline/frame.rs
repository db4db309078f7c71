//! Fixed-size audio frames and the bounded capture → worker queue.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::Arc;

use log::warn;

const DROP_LOG_EVERY: u64 = 50;

/// One fixed-duration block of 16-bit mono samples at the recognizer rate.
/// Never mutated after creation; `seq` is monotonic per producer group, so
/// gaps make dropped frames visible downstream.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    seq: u64,
    samples: Box<[i16]>,
}

impl AudioFrame {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }
}

/// Create the bounded FIFO hand-off between the capture callback and the
/// recognition worker. Capacity is a tuning knob, not a correctness one.
pub fn frame_queue(capacity: usize) -> (FrameProducer, FrameConsumer) {
    let (tx, rx) = mpsc::sync_channel(capacity);
    let producer = FrameProducer {
        tx,
        next_seq: Arc::new(AtomicU64::new(0)),
        dropped: Arc::new(AtomicU64::new(0)),
    };
    (producer, FrameConsumer { rx })
}

/// Capture-side handle. Cloneable; clones share sequence and drop counters.
#[derive(Clone)]
pub struct FrameProducer {
    tx: SyncSender<AudioFrame>,
    next_seq: Arc<AtomicU64>,
    dropped: Arc<AtomicU64>,
}

impl FrameProducer {
    /// Non-blocking enqueue for the real-time capture path. When the queue
    /// is full the incoming frame is dropped and counted, so frames already
    /// queued reach the recognizer contiguously.
    pub fn push(&self, samples: &[i16]) -> bool {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let frame = AudioFrame {
            seq,
            samples: samples.into(),
        };
        match self.tx.try_send(frame) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                if dropped % DROP_LOG_EVERY == 1 {
                    warn!("recognizer is behind, {dropped} frame(s) dropped so far");
                }
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Blocking enqueue for offline feeds (WAV files), where stalling the
    /// producer is fine and dropping audio is not.
    pub fn push_blocking(&self, samples: &[i16]) -> bool {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let frame = AudioFrame {
            seq,
            samples: samples.into(),
        };
        self.tx.send(frame).is_ok()
    }

    /// Total frames dropped on the non-blocking path.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Worker-side handle.
pub struct FrameConsumer {
    rx: Receiver<AudioFrame>,
}

impl FrameConsumer {
    /// Blocks until a frame arrives; `None` once every producer is gone.
    pub fn recv(&self) -> Option<AudioFrame> {
        self.rx.recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_arrive_in_fifo_order() {
        let (producer, consumer) = frame_queue(8);
        for value in 0..4i16 {
            assert!(producer.push(&[value, value]));
        }

        for expected in 0..4 {
            let frame = consumer.recv().unwrap();
            assert_eq!(frame.seq(), expected);
            assert_eq!(frame.samples(), [expected as i16, expected as i16]);
        }
    }

    #[test]
    fn test_full_queue_drops_the_incoming_frame() {
        let (producer, consumer) = frame_queue(2);
        assert!(producer.push(&[1]));
        assert!(producer.push(&[2]));
        assert!(!producer.push(&[3]));
        assert_eq!(producer.dropped(), 1);

        // The queued frames survive; the gap shows in the sequence numbers.
        assert_eq!(consumer.recv().unwrap().samples(), [1]);
        assert_eq!(consumer.recv().unwrap().samples(), [2]);
        assert!(producer.push(&[4]));
        assert_eq!(consumer.recv().unwrap().seq(), 3);
    }

    #[test]
    fn test_recv_ends_when_producers_are_gone() {
        let (producer, consumer) = frame_queue(2);
        let clone = producer.clone();
        producer.push(&[7]);
        drop(producer);
        drop(clone);

        assert_eq!(consumer.recv().unwrap().samples(), [7]);
        assert!(consumer.recv().is_none());
    }
}
