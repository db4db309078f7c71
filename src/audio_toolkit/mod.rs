// Re-export all audio components
pub mod capture;
pub mod device;
pub mod resampler;
pub mod wav;

pub use capture::MicCapture;
pub use device::{list_input_devices, select_input_device, InputDeviceInfo};
pub use resampler::FrameResampler;
pub use wav::load_wav_file;
