//! WAV loading for offline transcription runs.

use std::path::Path;

use anyhow::{bail, Context, Result};
use hound::{SampleFormat, WavReader};
use log::debug;

pub struct WavAudio {
    pub sample_rate: u32,
    pub channels: u16,
    /// Interleaved samples, normalized to [-1.0, 1.0].
    pub samples: Vec<f32>,
}

/// Load a WAV file as interleaved f32 samples.
pub fn load_wav_file<P: AsRef<Path>>(path: P) -> Result<WavAudio> {
    let mut reader = WavReader::open(path.as_ref())
        .with_context(|| format!("failed to open {}", path.as_ref().display()))?;
    let spec = reader.spec();

    debug!("loading WAV file: {:?}, spec: {:?}", path.as_ref(), spec);

    let samples: Result<Vec<f32>, hound::Error> = match spec.sample_format {
        SampleFormat::Int => match spec.bits_per_sample {
            16 => reader
                .samples::<i16>()
                .map(|s| s.map(|sample| sample as f32 / i16::MAX as f32))
                .collect(),
            32 => reader
                .samples::<i32>()
                .map(|s| s.map(|sample| sample as f32 / i32::MAX as f32))
                .collect(),
            other => bail!("unsupported bit depth: {other}"),
        },
        SampleFormat::Float => reader.samples::<f32>().collect(),
    };

    let samples = samples.context("failed to decode WAV samples")?;
    debug!("loaded {} samples", samples.len());

    Ok(WavAudio {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        samples,
    })
}
