use std::path::PathBuf;

use clap::Parser;

use crate::settings::Settings;

#[derive(Parser, Debug, Clone)]
#[command(name = "sotto", about = "Sotto - live microphone transcription")]
pub struct CliArgs {
    /// Path to the recognition model directory
    #[arg(long, default_value = "model_en")]
    pub model: PathBuf,

    /// Input device name (substring match); defaults to the system microphone
    #[arg(long)]
    pub device: Option<String>,

    /// List input devices and exit
    #[arg(long)]
    pub list_devices: bool,

    /// Transcribe a WAV file instead of capturing the microphone
    #[arg(long)]
    pub wav: Option<PathBuf>,

    /// Explicit path to the Vosk shared library
    #[arg(long)]
    pub vosk_lib: Option<PathBuf>,

    /// Minimum interval between live partial updates, in milliseconds
    #[arg(long)]
    pub partial_interval_ms: Option<u64>,

    /// Frame duration in milliseconds
    #[arg(long)]
    pub frame_ms: Option<u32>,

    /// Enable debug mode with verbose logging
    #[arg(long)]
    pub debug: bool,
}

impl CliArgs {
    pub fn settings(&self) -> Settings {
        let mut settings = Settings::default();
        if let Some(interval) = self.partial_interval_ms {
            settings.partial_min_interval_ms = interval;
        }
        if let Some(frame_ms) = self.frame_ms {
            settings.frame_duration_ms = frame_ms;
        }
        settings
    }
}
