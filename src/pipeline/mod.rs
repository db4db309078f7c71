//! The streaming transcription pipeline.
//!
//! ```text
//! capture callback ──▶ FrameQueue ──▶ recognition worker ──▶ DeliveryBus ──▶ presentation
//!   (non-blocking)      (bounded)      (engine + policy)      (unbounded)      (polls)
//! ```
//!
//! Exactly one frame sequence feeds exactly one engine instance, so finals
//! leave the worker in non-decreasing audio-time order.

mod delivery;
mod frame;
mod segmenter;
mod worker;

pub use delivery::{delivery_bus, Drained, EventDrain, EventSender};
pub use frame::{frame_queue, AudioFrame, FrameConsumer, FrameProducer};
pub use segmenter::SegmentationPolicy;

use std::thread::JoinHandle;
use std::time::Duration;

use log::{error, warn};

use crate::engine::RecognitionEngine;
use crate::settings::Settings;

/// The assembled pipeline: frame queue feeding one recognition worker that
/// publishes onto the delivery bus. Owns the worker and the queue's write
/// side; the presentation layer owns the returned drain.
pub struct Pipeline {
    producer: FrameProducer,
    worker: JoinHandle<()>,
}

impl Pipeline {
    pub fn spawn(engine: Box<dyn RecognitionEngine>, settings: &Settings) -> (Self, EventDrain) {
        let (producer, consumer) = frame_queue(settings.queue_capacity);
        let (events, drain) = delivery_bus();
        let policy = SegmentationPolicy::new(
            settings.speaker.clone(),
            Duration::from_millis(settings.partial_min_interval_ms),
        );
        let worker = worker::spawn(engine, policy, consumer, events);

        (Self { producer, worker }, drain)
    }

    /// Handle for the capture side of the frame queue.
    pub fn producer(&self) -> FrameProducer {
        self.producer.clone()
    }

    /// Tear down in order: close the frame queue, then wait for the worker
    /// to drain it and exit. The audio source must be stopped first, or the
    /// queue stays open and this blocks.
    pub fn shutdown(self) {
        let Pipeline { producer, worker } = self;
        let dropped = producer.dropped();
        drop(producer);

        if worker.join().is_err() {
            error!("recognition worker panicked");
        }
        if dropped > 0 {
            warn!("capture dropped {dropped} frame(s) under load");
        }
    }
}
