//! Gentle tones: sine tone generator with frequency control.
//!
//! # Responsibility
//! - Acquire the audio output lazily on the first toggle.
//! - Start, retune and stop one sine voice at a time.
//! - Release every audio handle on teardown.
//!
//! # Invariants
//! - `voice.is_some()` iff the generator is playing.
//! - The output, once acquired, is held until teardown; stopping only
//!   releases the voice.
//! - `frequency_hz` always lies within `MIN_FREQUENCY_HZ..=MAX_FREQUENCY_HZ`.
//! - Teardown runs from `Drop` regardless of state and is idempotent.
//! - An unavailable audio backend disables the generator instead of failing
//!   the hub.

use crate::capability::audio::{AudioBackend, AudioError, OutputId, VoiceId, Waveform};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

pub const MIN_FREQUENCY_HZ: f32 = 100.0;
pub const MAX_FREQUENCY_HZ: f32 = 1000.0;
/// A4.
pub const DEFAULT_FREQUENCY_HZ: f32 = 440.0;
/// Fixed output gain, half amplitude.
pub const OUTPUT_GAIN: f32 = 0.5;

/// Tone generator lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToneState {
    Uninitialized,
    Stopped,
    Playing,
    /// Audio could not be acquired; the generator is inert.
    Disabled,
}

/// Render snapshot of the tone generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToneView {
    pub state: ToneState,
    pub playing: bool,
    pub frequency_hz: f32,
    pub min_frequency_hz: f32,
    pub max_frequency_hz: f32,
    pub button_label: String,
    /// User-facing problem report, set while disabled.
    pub status: Option<String>,
}

/// Tone generator errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ToneError {
    /// Frequency input was NaN or infinite.
    InvalidFrequency(f32),
    Audio(AudioError),
}

impl Display for ToneError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFrequency(value) => write!(f, "frequency must be finite, got {value}"),
            Self::Audio(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ToneError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidFrequency(_) => None,
            Self::Audio(err) => Some(err),
        }
    }
}

impl From<AudioError> for ToneError {
    fn from(value: AudioError) -> Self {
        Self::Audio(value)
    }
}

/// Clamps a slider value into the supported range.
///
/// # Errors
/// - Returns `ToneError::InvalidFrequency` for NaN or infinite input.
pub fn normalize_frequency(hz: f32) -> Result<f32, ToneError> {
    if !hz.is_finite() {
        return Err(ToneError::InvalidFrequency(hz));
    }
    Ok(hz.clamp(MIN_FREQUENCY_HZ, MAX_FREQUENCY_HZ))
}

/// Tone generator component state.
pub struct ToneGenerator {
    audio: Rc<dyn AudioBackend>,
    frequency_hz: f32,
    output: Option<OutputId>,
    voice: Option<VoiceId>,
    unavailable: Option<AudioError>,
}

impl ToneGenerator {
    pub fn new(audio: Rc<dyn AudioBackend>) -> Self {
        Self {
            audio,
            frequency_hz: DEFAULT_FREQUENCY_HZ,
            output: None,
            voice: None,
            unavailable: None,
        }
    }

    pub fn state(&self) -> ToneState {
        if self.unavailable.is_some() {
            ToneState::Disabled
        } else if self.voice.is_some() {
            ToneState::Playing
        } else if self.output.is_some() {
            ToneState::Stopped
        } else {
            ToneState::Uninitialized
        }
    }

    pub fn is_playing(&self) -> bool {
        self.voice.is_some()
    }

    pub fn frequency_hz(&self) -> f32 {
        self.frequency_hz
    }

    pub fn output(&self) -> Option<OutputId> {
        self.output
    }

    pub fn voice(&self) -> Option<VoiceId> {
        self.voice
    }

    /// Acquires the audio output once; later calls return the held output.
    ///
    /// # Errors
    /// - Returns the backend error when acquisition fails; the generator is
    ///   then disabled and every later call returns the same error.
    pub fn initialize(&mut self) -> Result<OutputId, ToneError> {
        if let Some(err) = &self.unavailable {
            return Err(ToneError::Audio(err.clone()));
        }
        if let Some(output) = self.output {
            return Ok(output);
        }
        match self.audio.open_output(OUTPUT_GAIN) {
            Ok(output) => {
                info!(
                    "event=tone_init module=tones status=ok gain={OUTPUT_GAIN} output={}",
                    output.raw()
                );
                self.output = Some(output);
                Ok(output)
            }
            Err(err) => {
                warn!("event=tone_init module=tones status=disabled error={err}");
                self.unavailable = Some(err.clone());
                Err(ToneError::Audio(err))
            }
        }
    }

    /// Starts a tone when stopped, stops it when playing.
    ///
    /// The first toggle also acquires the audio output. A backend that
    /// reports itself unavailable when a voice is started disables the
    /// generator, same as a failed acquisition.
    pub fn toggle(&mut self) -> Result<ToneState, ToneError> {
        if let Some(voice) = self.voice.take() {
            self.audio.stop_voice(voice);
            debug!("event=tone_stop module=tones status=ok voice={}", voice.raw());
            return Ok(self.state());
        }

        let output = self.initialize()?;
        let voice = match self
            .audio
            .start_voice(output, Waveform::Sine, self.frequency_hz)
        {
            Ok(voice) => voice,
            Err(err @ AudioError::Unavailable(_)) => {
                warn!("event=tone_start module=tones status=disabled error={err}");
                self.unavailable = Some(err.clone());
                return Err(ToneError::Audio(err));
            }
            Err(err) => return Err(err.into()),
        };
        debug!(
            "event=tone_start module=tones status=ok voice={} frequency_hz={}",
            voice.raw(),
            self.frequency_hz
        );
        self.voice = Some(voice);
        Ok(self.state())
    }

    /// Sets the frequency, retuning the running voice in place.
    ///
    /// Returns the applied (clamped) frequency.
    pub fn set_frequency(&mut self, hz: f32) -> Result<f32, ToneError> {
        let applied = normalize_frequency(hz)?;
        self.frequency_hz = applied;
        if let Some(voice) = self.voice {
            self.audio.set_voice_frequency(voice, applied);
        }
        Ok(applied)
    }

    /// Releases the voice and the output. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        if let Some(voice) = self.voice.take() {
            self.audio.stop_voice(voice);
        }
        if let Some(output) = self.output.take() {
            self.audio.close_output(output);
            debug!(
                "event=tone_teardown module=tones status=ok output={}",
                output.raw()
            );
        }
    }

    pub fn view(&self) -> ToneView {
        let playing = self.is_playing();
        ToneView {
            state: self.state(),
            playing,
            frequency_hz: self.frequency_hz,
            min_frequency_hz: MIN_FREQUENCY_HZ,
            max_frequency_hz: MAX_FREQUENCY_HZ,
            button_label: if playing { "Stop Tone" } else { "Start Tone" }.to_string(),
            status: self.unavailable.as_ref().map(ToString::to_string),
        }
    }
}

impl Drop for ToneGenerator {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_frequency, ToneError, ToneGenerator, ToneState};
    use crate::capability::audio::{AudioBackend, MemoryAudioBackend};
    use std::rc::Rc;

    fn generator() -> (Rc<MemoryAudioBackend>, ToneGenerator) {
        let backend = Rc::new(MemoryAudioBackend::new());
        let audio: Rc<dyn AudioBackend> = backend.clone();
        (backend, ToneGenerator::new(audio))
    }

    #[test]
    fn first_toggle_initializes_and_plays() {
        let (backend, mut tones) = generator();
        assert_eq!(tones.state(), ToneState::Uninitialized);

        assert_eq!(tones.toggle().expect("toggle"), ToneState::Playing);
        let output = tones.output().expect("output acquired");
        assert_eq!(backend.output_gain(output), Some(0.5));
        assert_eq!(backend.active_voices().len(), 1);
        assert_eq!(tones.view().button_label, "Stop Tone");
    }

    #[test]
    fn initialize_is_idempotent() {
        let (backend, mut tones) = generator();
        let first = tones.initialize().expect("first init");
        let second = tones.initialize().expect("second init");
        assert_eq!(first, second);
        assert_eq!(backend.outputs_opened(), 1);
        assert_eq!(tones.state(), ToneState::Stopped);
    }

    #[test]
    fn stop_keeps_output_and_restart_creates_new_voice() {
        let (backend, mut tones) = generator();
        tones.toggle().expect("start");
        let first_voice = tones.voice().expect("voice");
        tones.toggle().expect("stop");

        assert_eq!(tones.state(), ToneState::Stopped);
        assert_eq!(backend.open_outputs().len(), 1);
        assert!(backend.active_voices().is_empty());

        tones.toggle().expect("restart");
        assert_ne!(tones.voice().expect("voice"), first_voice);
        assert_eq!(backend.voices_started(), 2);
        assert_eq!(backend.outputs_opened(), 1);
    }

    #[test]
    fn frequency_is_clamped_and_non_finite_rejected() {
        assert_eq!(normalize_frequency(50.0).expect("clamp low"), 100.0);
        assert_eq!(normalize_frequency(5_000.0).expect("clamp high"), 1000.0);
        assert_eq!(normalize_frequency(432.5).expect("in range"), 432.5);

        let (_backend, mut tones) = generator();
        let err = tones.set_frequency(f32::NAN).expect_err("NaN rejected");
        assert!(matches!(err, ToneError::InvalidFrequency(_)));
        assert_eq!(tones.frequency_hz(), 440.0);
    }

    #[test]
    fn new_voice_uses_frequency_set_while_stopped() {
        let (backend, mut tones) = generator();
        tones.set_frequency(700.0).expect("set frequency");
        tones.toggle().expect("start");
        let voice = tones.voice().expect("voice");
        assert_eq!(backend.voice(voice).expect("active").frequency_hz, 700.0);
    }

    #[test]
    fn unavailable_audio_disables_generator() {
        let backend = Rc::new(MemoryAudioBackend::unavailable("not supported"));
        let audio: Rc<dyn AudioBackend> = backend.clone();
        let mut tones = ToneGenerator::new(audio);

        let err = tones.toggle().expect_err("toggle must fail");
        assert!(matches!(err, ToneError::Audio(_)));
        assert_eq!(tones.state(), ToneState::Disabled);
        assert!(tones.toggle().is_err());
        let view = tones.view();
        assert!(!view.playing);
        assert!(view
            .status
            .expect("status message")
            .contains("not supported"));
    }

    #[test]
    fn audio_loss_after_init_disables_generator() {
        let (backend, mut tones) = generator();
        tones.toggle().expect("start");
        tones.toggle().expect("stop");
        backend.set_available(false, "device lost");

        let err = tones.toggle().expect_err("restart must fail");
        assert!(matches!(err, ToneError::Audio(_)));
        assert_eq!(tones.state(), ToneState::Disabled);
        assert_eq!(backend.voices_started(), 1);
        assert!(tones.toggle().is_err());

        tones.teardown();
        assert!(backend.is_idle());
    }

    #[test]
    fn teardown_is_idempotent() {
        let (backend, mut tones) = generator();
        tones.toggle().expect("start");
        tones.teardown();
        tones.teardown();
        assert!(backend.is_idle());
        assert_eq!(tones.state(), ToneState::Uninitialized);
    }
}
