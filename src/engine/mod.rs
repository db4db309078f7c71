//! The speech recognition capability boundary.
//!
//! The pipeline treats the recognizer as a black box: PCM goes in, a
//! partial guess or a finalized utterance comes out. One engine instance
//! is driven by exactly one thread.

pub mod protocol;
pub mod vosk;

pub use vosk::VoskEngine;

use anyhow::Result;

/// One recognized word with its start/end offsets in seconds from the
/// beginning of the stream.
#[derive(Debug, Clone, PartialEq)]
pub struct WordTiming {
    pub text: String,
    pub start: f32,
    pub end: f32,
}

/// What the recognizer had to say about the most recent frame.
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionOutcome {
    /// Best-effort guess for the still-open utterance.
    Partial { text: String },
    /// The recognizer detected an utterance boundary.
    Final { text: String, words: Vec<WordTiming> },
}

/// A streaming speech recognizer.
///
/// Implementations are not required to be `Sync`; the recognition worker
/// owns the instance and is the only caller of `feed`.
pub trait RecognitionEngine: Send {
    /// Feed one frame of 16-bit signed mono PCM at the configured sample
    /// rate. An `Err` means this frame's output was undecodable; the frame
    /// is skipped and the stream continues.
    fn feed(&mut self, pcm: &[i16]) -> Result<RecognitionOutcome>;
}
