//! Converts device-rate mono audio into the fixed-duration 16-bit frames
//! the recognizer consumes.

use rubato::{FftFixedIn, Resampler};
use std::time::Duration;

// Fixed input chunk size for the FFT resampler.
const RESAMPLER_CHUNK_SIZE: usize = 1024;

pub struct FrameResampler {
    resampler: Option<FftFixedIn<f32>>,
    chunk_in: usize,
    in_buf: Vec<f32>,
    frame_samples: usize,
    pending: Vec<f32>,
    scratch: Vec<i16>,
}

impl FrameResampler {
    pub fn new(in_hz: u32, out_hz: u32, frame_dur: Duration) -> Self {
        let frame_samples = (out_hz as f64 * frame_dur.as_secs_f64()).round() as usize;
        assert!(frame_samples > 0, "frame duration too short");

        let chunk_in = RESAMPLER_CHUNK_SIZE;
        let resampler = (in_hz != out_hz).then(|| {
            FftFixedIn::<f32>::new(in_hz as usize, out_hz as usize, chunk_in, 1, 1)
                .expect("failed to create resampler")
        });

        Self {
            resampler,
            chunk_in,
            in_buf: Vec::with_capacity(chunk_in),
            frame_samples,
            pending: Vec::with_capacity(frame_samples),
            scratch: Vec::new(),
        }
    }

    /// Samples per emitted frame at the output rate.
    pub fn frame_samples(&self) -> usize {
        self.frame_samples
    }

    /// Feed mono samples; `emit` is called once per complete output frame.
    pub fn push(&mut self, mut src: &[f32], mut emit: impl FnMut(&[i16])) {
        if self.resampler.is_none() {
            self.emit_frames(src, &mut emit);
            return;
        }

        while !src.is_empty() {
            let space = self.chunk_in - self.in_buf.len();
            let take = space.min(src.len());
            self.in_buf.extend_from_slice(&src[..take]);
            src = &src[take..];

            if self.in_buf.len() == self.chunk_in {
                if let Ok(out) = self
                    .resampler
                    .as_mut()
                    .unwrap()
                    .process(&[&self.in_buf[..]], None)
                {
                    self.emit_frames(&out[0], &mut emit);
                }
                self.in_buf.clear();
            }
        }
    }

    /// Flush buffered input and emit the trailing partial frame, both padded
    /// with silence. Used by offline feeds; live capture just stops.
    pub fn finish(&mut self, mut emit: impl FnMut(&[i16])) {
        if let Some(ref mut resampler) = self.resampler {
            if !self.in_buf.is_empty() {
                self.in_buf.resize(self.chunk_in, 0.0);
                if let Ok(out) = resampler.process(&[&self.in_buf[..]], None) {
                    let tail = out;
                    self.in_buf.clear();
                    self.emit_frames(&tail[0], &mut emit);
                }
            }
        }

        if !self.pending.is_empty() {
            self.pending.resize(self.frame_samples, 0.0);
            self.convert_pending(&mut emit);
        }
    }

    fn emit_frames(&mut self, mut data: &[f32], emit: &mut impl FnMut(&[i16])) {
        while !data.is_empty() {
            let space = self.frame_samples - self.pending.len();
            let take = space.min(data.len());
            self.pending.extend_from_slice(&data[..take]);
            data = &data[take..];

            if self.pending.len() == self.frame_samples {
                self.convert_pending(emit);
            }
        }
    }

    fn convert_pending(&mut self, emit: &mut impl FnMut(&[i16])) {
        self.scratch.clear();
        self.scratch
            .extend(self.pending.iter().map(|s| (s * i16::MAX as f32) as i16));
        emit(&self.scratch);
        self.pending.clear();
    }
}
