//! Audio capability contracts and an in-memory backend.
//!
//! # Responsibility
//! - Define the host audio collaborator used by the tone generator.
//! - Provide a recording backend for tests and scripted demos.
//!
//! # Invariants
//! - Release calls (`close_output`, `stop_voice`) are idempotent.
//! - A voice is one-shot: once stopped it cannot be restarted.
//! - Closing an output stops every voice still connected to it.

use log::debug;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Handle of one acquired audio output (destination plus gain stage).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OutputId(u64);

impl OutputId {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Handle of one waveform-generating voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VoiceId(u64);

impl VoiceId {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Oscillator waveform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Waveform {
    Sine,
}

/// Host audio collaborator.
pub trait AudioBackend {
    /// Acquires an output with a fixed linear gain in `0.0..=1.0`.
    fn open_output(&self, gain: f32) -> Result<OutputId, AudioError>;

    /// Releases an output and anything still connected to it.
    fn close_output(&self, output: OutputId);

    /// Creates a voice connected to `output` and starts emission.
    fn start_voice(
        &self,
        output: OutputId,
        waveform: Waveform,
        frequency_hz: f32,
    ) -> Result<VoiceId, AudioError>;

    /// Retunes a running voice in place.
    fn set_voice_frequency(&self, voice: VoiceId, frequency_hz: f32);

    /// Stops and releases a voice.
    fn stop_voice(&self, voice: VoiceId);
}

/// Audio capability errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// Host has no usable audio subsystem (denied or unsupported).
    Unavailable(String),
    /// Referenced output is not open.
    UnknownOutput(OutputId),
}

impl Display for AudioError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(reason) => write!(f, "audio unavailable: {reason}"),
            Self::UnknownOutput(id) => write!(f, "audio output not open: {}", id.raw()),
        }
    }
}

impl Error for AudioError {}

/// Snapshot of one voice held by `MemoryAudioBackend`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceState {
    pub output: OutputId,
    pub waveform: Waveform,
    pub frequency_hz: f32,
}

#[derive(Debug, Default)]
struct MemoryAudioState {
    unavailable: Option<String>,
    next_id: u64,
    outputs: BTreeMap<OutputId, f32>,
    voices: BTreeMap<VoiceId, VoiceState>,
    outputs_opened: usize,
    voices_started: usize,
}

/// Recording audio backend without a device.
#[derive(Debug, Default)]
pub struct MemoryAudioBackend {
    state: RefCell<MemoryAudioState>,
}

impl MemoryAudioBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend whose `open_output` and `start_voice` fail.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        let backend = Self::new();
        backend.set_available(false, reason);
        backend
    }

    /// Simulates losing or regaining the audio device; held handles stay open.
    pub fn set_available(&self, available: bool, reason: impl Into<String>) {
        self.state.borrow_mut().unavailable = (!available).then(|| reason.into());
    }

    pub fn open_outputs(&self) -> Vec<OutputId> {
        self.state.borrow().outputs.keys().copied().collect()
    }

    pub fn output_gain(&self, output: OutputId) -> Option<f32> {
        self.state.borrow().outputs.get(&output).copied()
    }

    pub fn active_voices(&self) -> Vec<(VoiceId, VoiceState)> {
        self.state
            .borrow()
            .voices
            .iter()
            .map(|(id, voice)| (*id, *voice))
            .collect()
    }

    pub fn voice(&self, voice: VoiceId) -> Option<VoiceState> {
        self.state.borrow().voices.get(&voice).copied()
    }

    /// Total outputs acquired over the backend lifetime.
    pub fn outputs_opened(&self) -> usize {
        self.state.borrow().outputs_opened
    }

    /// Total voices started over the backend lifetime.
    pub fn voices_started(&self) -> usize {
        self.state.borrow().voices_started
    }

    /// Returns whether no output or voice is currently held.
    pub fn is_idle(&self) -> bool {
        let state = self.state.borrow();
        state.outputs.is_empty() && state.voices.is_empty()
    }
}

impl AudioBackend for MemoryAudioBackend {
    fn open_output(&self, gain: f32) -> Result<OutputId, AudioError> {
        let mut state = self.state.borrow_mut();
        if let Some(reason) = &state.unavailable {
            return Err(AudioError::Unavailable(reason.clone()));
        }
        state.next_id += 1;
        let id = OutputId(state.next_id);
        state.outputs.insert(id, gain.clamp(0.0, 1.0));
        state.outputs_opened += 1;
        debug!("event=audio_output_open module=audio status=ok output={}", id.0);
        Ok(id)
    }

    fn close_output(&self, output: OutputId) {
        let mut state = self.state.borrow_mut();
        if state.outputs.remove(&output).is_some() {
            state.voices.retain(|_, voice| voice.output != output);
            debug!("event=audio_output_close module=audio status=ok output={}", output.0);
        }
    }

    fn start_voice(
        &self,
        output: OutputId,
        waveform: Waveform,
        frequency_hz: f32,
    ) -> Result<VoiceId, AudioError> {
        let mut state = self.state.borrow_mut();
        if let Some(reason) = &state.unavailable {
            return Err(AudioError::Unavailable(reason.clone()));
        }
        if !state.outputs.contains_key(&output) {
            return Err(AudioError::UnknownOutput(output));
        }
        state.next_id += 1;
        let id = VoiceId(state.next_id);
        state.voices.insert(
            id,
            VoiceState {
                output,
                waveform,
                frequency_hz,
            },
        );
        state.voices_started += 1;
        Ok(id)
    }

    fn set_voice_frequency(&self, voice: VoiceId, frequency_hz: f32) {
        if let Some(entry) = self.state.borrow_mut().voices.get_mut(&voice) {
            entry.frequency_hz = frequency_hz;
        }
    }

    fn stop_voice(&self, voice: VoiceId) {
        self.state.borrow_mut().voices.remove(&voice);
    }
}

#[cfg(test)]
mod tests {
    use super::{AudioBackend, AudioError, MemoryAudioBackend, Waveform};

    #[test]
    fn unavailable_backend_rejects_output() {
        let backend = MemoryAudioBackend::unavailable("permission denied");
        let err = backend.open_output(0.5).expect_err("open must fail");
        assert_eq!(err, AudioError::Unavailable("permission denied".to_string()));
        assert!(err.to_string().contains("permission denied"));
    }

    #[test]
    fn closing_output_drops_connected_voices() {
        let backend = MemoryAudioBackend::new();
        let output = backend.open_output(0.5).expect("open output");
        backend
            .start_voice(output, Waveform::Sine, 440.0)
            .expect("start voice");

        backend.close_output(output);
        backend.close_output(output);
        assert!(backend.is_idle());
    }

    #[test]
    fn start_voice_requires_open_output() {
        let backend = MemoryAudioBackend::new();
        let output = backend.open_output(0.5).expect("open output");
        backend.close_output(output);

        let err = backend
            .start_voice(output, Waveform::Sine, 440.0)
            .expect_err("closed output must be rejected");
        assert_eq!(err, AudioError::UnknownOutput(output));
    }

    #[test]
    fn retune_updates_voice_in_place() {
        let backend = MemoryAudioBackend::new();
        let output = backend.open_output(0.5).expect("open output");
        let voice = backend
            .start_voice(output, Waveform::Sine, 440.0)
            .expect("start voice");

        backend.set_voice_frequency(voice, 250.0);
        let state = backend.voice(voice).expect("voice is active");
        assert_eq!(state.frequency_hz, 250.0);
        assert_eq!(backend.voices_started(), 1);
    }
}
