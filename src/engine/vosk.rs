//! Runtime binding to the Vosk speech recognition library.
//!
//! libvosk is loaded with libloading when the engine is constructed, so the
//! crate builds and tests without the library installed; a missing library
//! or model is a startup error, never a steady-state one.

use std::ffi::{c_char, c_float, c_int, CStr, CString};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use libloading::Library;
use log::{debug, info};

use super::{protocol, RecognitionEngine, RecognitionOutcome};

type VoskModelPtr = *mut std::ffi::c_void;
type VoskRecognizerPtr = *mut std::ffi::c_void;

/// Loaded library handle plus the symbols the engine needs.
struct VoskLibrary {
    _lib: Library,
    model_new: unsafe extern "C" fn(*const c_char) -> VoskModelPtr,
    model_free: unsafe extern "C" fn(VoskModelPtr),
    recognizer_new: unsafe extern "C" fn(VoskModelPtr, c_float) -> VoskRecognizerPtr,
    recognizer_free: unsafe extern "C" fn(VoskRecognizerPtr),
    recognizer_set_words: unsafe extern "C" fn(VoskRecognizerPtr, c_int),
    recognizer_accept_waveform: unsafe extern "C" fn(VoskRecognizerPtr, *const i16, c_int) -> c_int,
    recognizer_result: unsafe extern "C" fn(VoskRecognizerPtr) -> *const c_char,
    recognizer_partial_result: unsafe extern "C" fn(VoskRecognizerPtr) -> *const c_char,
    set_log_level: unsafe extern "C" fn(c_int),
}

impl VoskLibrary {
    fn load(path: &Path) -> Result<Self> {
        unsafe {
            let lib = Library::new(path)
                .with_context(|| format!("failed to load {}", path.display()))?;

            let model_new = *lib
                .get::<unsafe extern "C" fn(*const c_char) -> VoskModelPtr>(b"vosk_model_new\0")
                .context("missing symbol vosk_model_new")?;
            let model_free = *lib
                .get::<unsafe extern "C" fn(VoskModelPtr)>(b"vosk_model_free\0")
                .context("missing symbol vosk_model_free")?;
            let recognizer_new = *lib
                .get::<unsafe extern "C" fn(VoskModelPtr, c_float) -> VoskRecognizerPtr>(
                    b"vosk_recognizer_new\0",
                )
                .context("missing symbol vosk_recognizer_new")?;
            let recognizer_free = *lib
                .get::<unsafe extern "C" fn(VoskRecognizerPtr)>(b"vosk_recognizer_free\0")
                .context("missing symbol vosk_recognizer_free")?;
            let recognizer_set_words = *lib
                .get::<unsafe extern "C" fn(VoskRecognizerPtr, c_int)>(
                    b"vosk_recognizer_set_words\0",
                )
                .context("missing symbol vosk_recognizer_set_words")?;
            let recognizer_accept_waveform = *lib
                .get::<unsafe extern "C" fn(VoskRecognizerPtr, *const i16, c_int) -> c_int>(
                    b"vosk_recognizer_accept_waveform_s\0",
                )
                .context("missing symbol vosk_recognizer_accept_waveform_s")?;
            let recognizer_result = *lib
                .get::<unsafe extern "C" fn(VoskRecognizerPtr) -> *const c_char>(
                    b"vosk_recognizer_result\0",
                )
                .context("missing symbol vosk_recognizer_result")?;
            let recognizer_partial_result = *lib
                .get::<unsafe extern "C" fn(VoskRecognizerPtr) -> *const c_char>(
                    b"vosk_recognizer_partial_result\0",
                )
                .context("missing symbol vosk_recognizer_partial_result")?;
            let set_log_level = *lib
                .get::<unsafe extern "C" fn(c_int)>(b"vosk_set_log_level\0")
                .context("missing symbol vosk_set_log_level")?;

            Ok(Self {
                _lib: lib,
                model_new,
                model_free,
                recognizer_new,
                recognizer_free,
                recognizer_set_words,
                recognizer_accept_waveform,
                recognizer_result,
                recognizer_partial_result,
                set_log_level,
            })
        }
    }
}

/// Vosk-backed [`RecognitionEngine`]. Owns its library handle, model and
/// recognizer; nothing here is process-global.
pub struct VoskEngine {
    lib: VoskLibrary,
    model: VoskModelPtr,
    recognizer: VoskRecognizerPtr,
}

// SAFETY: the model and recognizer are only ever driven by the one thread
// that owns the engine; Vosk handles can be moved between threads.
unsafe impl Send for VoskEngine {}

impl VoskEngine {
    /// Load the shared library and model, and create a recognizer with word
    /// timings enabled. Any failure here is fatal at startup.
    pub fn new(library_path: &Path, model_path: &Path, sample_rate: u32) -> Result<Self> {
        let lib = VoskLibrary::load(library_path)?;

        // Keep Kaldi's stderr chatter away from the transcript view.
        unsafe { (lib.set_log_level)(-1) };

        let model_str = model_path
            .to_str()
            .ok_or_else(|| anyhow!("model path is not valid UTF-8"))?;
        let c_model = CString::new(model_str).context("model path contains a NUL byte")?;

        let model = unsafe { (lib.model_new)(c_model.as_ptr()) };
        if model.is_null() {
            bail!(
                "failed to load recognition model from {}",
                model_path.display()
            );
        }

        let recognizer = unsafe { (lib.recognizer_new)(model, sample_rate as c_float) };
        if recognizer.is_null() {
            unsafe { (lib.model_free)(model) };
            bail!("failed to create recognizer at {sample_rate} Hz");
        }
        unsafe { (lib.recognizer_set_words)(recognizer, 1) };

        info!(
            "recognition model loaded from {} ({sample_rate} Hz)",
            model_path.display()
        );

        Ok(Self {
            lib,
            model,
            recognizer,
        })
    }

    /// Resolve the shared library path: an explicit path wins, then the
    /// executable's directory, then the working directory, then whatever
    /// the system loader can find under the platform name.
    pub fn find_library(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(path.to_path_buf());
            }
            bail!("no Vosk library at {}", path.display());
        }

        let lib_name = if cfg!(windows) {
            "libvosk.dll"
        } else if cfg!(target_os = "macos") {
            "libvosk.dylib"
        } else {
            "libvosk.so"
        };

        let mut candidates = Vec::new();
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                candidates.push(dir.join(lib_name));
            }
        }
        if let Ok(cwd) = std::env::current_dir() {
            candidates.push(cwd.join(lib_name));
        }

        for candidate in &candidates {
            if candidate.exists() {
                debug!("found Vosk library at {}", candidate.display());
                return Ok(candidate.clone());
            }
        }

        // Fall back to the system loader's search path.
        Ok(PathBuf::from(lib_name))
    }

    fn result_str(&self, ptr: *const c_char) -> Result<&str> {
        if ptr.is_null() {
            bail!("recognizer returned no result");
        }
        unsafe { CStr::from_ptr(ptr) }
            .to_str()
            .context("recognizer result is not valid UTF-8")
    }
}

impl RecognitionEngine for VoskEngine {
    fn feed(&mut self, pcm: &[i16]) -> Result<RecognitionOutcome> {
        let len = c_int::try_from(pcm.len()).context("frame too large for recognizer")?;
        let state =
            unsafe { (self.lib.recognizer_accept_waveform)(self.recognizer, pcm.as_ptr(), len) };

        if state < 0 {
            bail!("recognizer failed to accept waveform");
        }

        if state > 0 {
            let json = self.result_str(unsafe { (self.lib.recognizer_result)(self.recognizer) })?;
            protocol::parse_final(json)
        } else {
            let json = self
                .result_str(unsafe { (self.lib.recognizer_partial_result)(self.recognizer) })?;
            protocol::parse_partial(json)
        }
    }
}

impl Drop for VoskEngine {
    fn drop(&mut self) {
        unsafe {
            (self.lib.recognizer_free)(self.recognizer);
            (self.lib.model_free)(self.model);
        }
    }
}
