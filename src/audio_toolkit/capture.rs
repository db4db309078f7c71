//! Microphone capture.
//!
//! The cpal data callback runs on the device's real-time thread, so it only
//! downmixes, resamples and enqueues. Anything heavier belongs to the
//! recognition worker on the far side of the frame queue.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{SampleFormat, Stream};
use log::{info, warn};

use super::resampler::FrameResampler;
use crate::pipeline::FrameProducer;
use crate::settings::Settings;

/// Owns the input stream; capture runs until `stop` drops it.
pub struct MicCapture {
    _stream: Stream,
}

impl MicCapture {
    pub fn open(device: cpal::Device, settings: &Settings, producer: FrameProducer) -> Result<Self> {
        let config = device
            .default_input_config()
            .context("failed to query input config")?;
        let sample_format = config.sample_format();
        let channels = config.channels() as usize;
        let in_rate = config.sample_rate().0;
        let name = device.name().unwrap_or_else(|_| "Unknown".to_string());

        info!(
            "opening '{name}' at {in_rate} Hz, {channels} channel(s), producing {} ms frames at {} Hz",
            settings.frame_duration_ms, settings.sample_rate
        );

        let resampler = FrameResampler::new(
            in_rate,
            settings.sample_rate,
            Duration::from_millis(settings.frame_duration_ms as u64),
        );
        let mut feeder = FrameFeeder {
            resampler,
            producer,
            channels,
            mono: Vec::new(),
            conv: Vec::new(),
        };

        let stream_config: cpal::StreamConfig = config.into();
        // Overruns and other device anomalies are reported, not fatal.
        let err_fn = |err: cpal::StreamError| warn!("audio device reported: {err}");

        let stream = match sample_format {
            SampleFormat::F32 => device
                .build_input_stream(
                    &stream_config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| feeder.feed_f32(data),
                    err_fn,
                    None,
                )
                .context("failed to build input stream")?,
            SampleFormat::I16 => device
                .build_input_stream(
                    &stream_config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| feeder.feed_i16(data),
                    err_fn,
                    None,
                )
                .context("failed to build input stream")?,
            other => bail!("unsupported input sample format {other:?}"),
        };

        stream.play().context("failed to start audio capture")?;

        Ok(Self { _stream: stream })
    }

    /// Release the device.
    pub fn stop(self) {}
}

/// Callback-owned state: downmix scratch buffers plus the frame resampler.
struct FrameFeeder {
    resampler: FrameResampler,
    producer: FrameProducer,
    channels: usize,
    mono: Vec<f32>,
    conv: Vec<f32>,
}

impl FrameFeeder {
    fn feed_f32(&mut self, data: &[f32]) {
        let producer = &self.producer;
        if self.channels <= 1 {
            self.resampler.push(data, |frame| {
                producer.push(frame);
            });
            return;
        }

        let channels = self.channels;
        self.mono.clear();
        self.mono.extend(
            data.chunks(channels)
                .map(|frame| frame.iter().sum::<f32>() / channels as f32),
        );
        self.resampler.push(&self.mono, |frame| {
            producer.push(frame);
        });
    }

    fn feed_i16(&mut self, data: &[i16]) {
        self.conv.clear();
        self.conv
            .extend(data.iter().map(|s| f32::from(*s) / f32::from(i16::MAX)));

        let producer = &self.producer;
        if self.channels <= 1 {
            self.resampler.push(&self.conv, |frame| {
                producer.push(frame);
            });
            return;
        }

        let channels = self.channels;
        self.mono.clear();
        self.mono.extend(
            self.conv
                .chunks(channels)
                .map(|frame| frame.iter().sum::<f32>() / channels as f32),
        );
        self.resampler.push(&self.mono, |frame| {
            producer.push(frame);
        });
    }
}
