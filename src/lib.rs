//! Sotto: live microphone transcription.
//!
//! A cpal capture callback slices the microphone into fixed 16 kHz frames,
//! a bounded queue hands them to a single recognition worker driving a Vosk
//! recognizer, and a delivery bus carries live/final transcript events to a
//! console view that keeps the current line plus a timestamped history.

pub mod audio_toolkit;
pub mod cli;
pub mod console;
pub mod engine;
pub mod pipeline;
pub mod settings;
pub mod transcript;

use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use log::info;

use crate::audio_toolkit::{list_input_devices, select_input_device, FrameResampler, MicCapture};
use crate::cli::CliArgs;
use crate::console::ConsoleView;
use crate::engine::VoskEngine;
use crate::pipeline::Pipeline;
use crate::settings::Settings;

pub fn run(args: CliArgs) -> Result<()> {
    if args.list_devices {
        for info in list_input_devices()? {
            println!("{}", info.name);
        }
        return Ok(());
    }

    let settings = args.settings();

    // Model provisioning is someone else's job; just fail fast before any
    // audio starts.
    if !args.model.is_dir() {
        bail!(
            "recognition model not found at {} (unpack a Vosk model there, or pass --model)",
            args.model.display()
        );
    }

    let library = VoskEngine::find_library(args.vosk_lib.as_deref())?;
    let engine = VoskEngine::new(&library, &args.model, settings.sample_rate)?;

    let (pipeline, drain) = Pipeline::spawn(Box::new(engine), &settings);
    let mut view = ConsoleView::new();

    if let Some(wav) = &args.wav {
        feed_wav(wav, &settings, &pipeline)?;
        pipeline.shutdown();
        view.flush(&drain, settings.max_events_per_drain);
    } else {
        let stop = Arc::new(AtomicBool::new(false));
        register_shutdown_flag(&stop)?;

        let device = select_input_device(args.device.as_deref())?;
        let capture = MicCapture::open(device, &settings, pipeline.producer())?;
        println!("Listening… (Ctrl-C to stop)");

        view.poll(&drain, &settings, &stop);
        println!();

        // Teardown order matters: device first, then the worker drains the
        // queue, then the bus is flushed into the history.
        capture.stop();
        pipeline.shutdown();
        view.flush(&drain, settings.max_events_per_drain);
    }

    let history = view.into_history();
    info!("transcribed {} segment(s)", history.len());
    Ok(())
}

/// Stream a WAV file through the same pipeline the microphone uses.
fn feed_wav(path: &Path, settings: &Settings, pipeline: &Pipeline) -> Result<()> {
    let audio = audio_toolkit::load_wav_file(path)?;
    info!(
        "transcribing {} ({} Hz, {} channel(s))",
        path.display(),
        audio.sample_rate,
        audio.channels
    );

    let channels = audio.channels as usize;
    let mono: Vec<f32> = if channels > 1 {
        audio
            .samples
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    } else {
        audio.samples
    };

    let producer = pipeline.producer();
    let mut resampler = FrameResampler::new(
        audio.sample_rate,
        settings.sample_rate,
        Duration::from_millis(settings.frame_duration_ms as u64),
    );
    // Offline feeds block on a full queue instead of dropping audio.
    resampler.push(&mono, |frame| {
        producer.push_blocking(frame);
    });
    resampler.finish(|frame| {
        producer.push_blocking(frame);
    });

    Ok(())
}

#[cfg(unix)]
fn register_shutdown_flag(stop: &Arc<AtomicBool>) -> Result<()> {
    use anyhow::Context;

    signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(stop))
        .context("failed to install SIGINT handler")?;
    signal_hook::flag::register(signal_hook::consts::SIGTERM, Arc::clone(stop))
        .context("failed to install SIGTERM handler")?;
    Ok(())
}

#[cfg(not(unix))]
fn register_shutdown_flag(_stop: &Arc<AtomicBool>) -> Result<()> {
    Ok(())
}
