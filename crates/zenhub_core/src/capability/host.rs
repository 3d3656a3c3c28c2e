//! Command outbox bridging capabilities to a foreign UI host.
//!
//! # Responsibility
//! - Implement `Clock` and `AudioBackend` by queueing host commands.
//! - Let the host drain and execute commands after each input event.
//!
//! # Invariants
//! - Ids are allocated by the bridge, so capability calls never block on the host.
//! - Commands drain in the order they were issued.
//! - Cancelling an unknown timer still queues a `CancelTimer`; hosts treat it
//!   as a no-op.

use crate::capability::audio::{AudioBackend, AudioError, OutputId, VoiceId, Waveform};
use crate::capability::clock::{Clock, TimerId};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::time::Duration;

/// One capability call for the host to execute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum HostCommand {
    ScheduleTimer {
        id: TimerId,
        delay_ms: u64,
    },
    CancelTimer {
        id: TimerId,
    },
    OpenOutput {
        id: OutputId,
        gain: f32,
    },
    CloseOutput {
        id: OutputId,
    },
    StartVoice {
        id: VoiceId,
        output: OutputId,
        waveform: Waveform,
        frequency_hz: f32,
    },
    SetVoiceFrequency {
        id: VoiceId,
        frequency_hz: f32,
    },
    StopVoice {
        id: VoiceId,
    },
}

#[derive(Debug)]
struct HostBridgeState {
    next_id: u64,
    audio_unavailable: Option<String>,
    outbox: Vec<HostCommand>,
}

/// Capability adapter that records calls for the host.
#[derive(Debug)]
pub struct HostBridge {
    state: RefCell<HostBridgeState>,
}

impl Default for HostBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl HostBridge {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(HostBridgeState {
                next_id: 0,
                audio_unavailable: None,
                outbox: Vec::new(),
            }),
        }
    }

    /// Marks host audio as available or not.
    ///
    /// While unavailable, `open_output` and `start_voice` fail with
    /// `AudioError::Unavailable`.
    pub fn set_audio_available(&self, available: bool, reason: impl Into<String>) {
        let mut state = self.state.borrow_mut();
        if available {
            state.audio_unavailable = None;
        } else {
            let reason = reason.into();
            warn!("event=host_audio_unavailable module=host status=degraded reason={reason}");
            state.audio_unavailable = Some(reason);
        }
    }

    pub fn pending_len(&self) -> usize {
        self.state.borrow().outbox.len()
    }

    /// Takes all queued commands in issue order.
    pub fn drain(&self) -> Vec<HostCommand> {
        let drained = std::mem::take(&mut self.state.borrow_mut().outbox);
        if !drained.is_empty() {
            debug!(
                "event=host_drain module=host status=ok commands={}",
                drained.len()
            );
        }
        drained
    }

    fn ensure_audio(&self) -> Result<(), AudioError> {
        match &self.state.borrow().audio_unavailable {
            Some(reason) => Err(AudioError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }

    fn next_id(&self) -> u64 {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        state.next_id
    }

    fn push(&self, command: HostCommand) {
        self.state.borrow_mut().outbox.push(command);
    }
}

impl Clock for HostBridge {
    fn schedule(&self, delay: Duration) -> TimerId {
        let id = TimerId::from_raw(self.next_id());
        self.push(HostCommand::ScheduleTimer {
            id,
            delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
        });
        id
    }

    fn cancel(&self, id: TimerId) {
        self.push(HostCommand::CancelTimer { id });
    }
}

impl AudioBackend for HostBridge {
    fn open_output(&self, gain: f32) -> Result<OutputId, AudioError> {
        self.ensure_audio()?;
        let id = OutputId::from_raw(self.next_id());
        self.push(HostCommand::OpenOutput { id, gain });
        Ok(id)
    }

    fn close_output(&self, output: OutputId) {
        self.push(HostCommand::CloseOutput { id: output });
    }

    fn start_voice(
        &self,
        output: OutputId,
        waveform: Waveform,
        frequency_hz: f32,
    ) -> Result<VoiceId, AudioError> {
        self.ensure_audio()?;
        let id = VoiceId::from_raw(self.next_id());
        self.push(HostCommand::StartVoice {
            id,
            output,
            waveform,
            frequency_hz,
        });
        Ok(id)
    }

    fn set_voice_frequency(&self, voice: VoiceId, frequency_hz: f32) {
        self.push(HostCommand::SetVoiceFrequency {
            id: voice,
            frequency_hz,
        });
    }

    fn stop_voice(&self, voice: VoiceId) {
        self.push(HostCommand::StopVoice { id: voice });
    }
}

#[cfg(test)]
mod tests {
    use super::{HostBridge, HostCommand};
    use crate::capability::audio::{AudioBackend, AudioError, Waveform};
    use crate::capability::clock::Clock;
    use std::time::Duration;

    #[test]
    fn queues_commands_in_issue_order() {
        let bridge = HostBridge::new();
        let timer = bridge.schedule(Duration::from_secs(4));
        let output = bridge.open_output(0.5).expect("open output");
        let voice = bridge
            .start_voice(output, Waveform::Sine, 440.0)
            .expect("start voice");
        bridge.cancel(timer);

        assert_eq!(
            bridge.drain(),
            vec![
                HostCommand::ScheduleTimer {
                    id: timer,
                    delay_ms: 4_000
                },
                HostCommand::OpenOutput {
                    id: output,
                    gain: 0.5
                },
                HostCommand::StartVoice {
                    id: voice,
                    output,
                    waveform: Waveform::Sine,
                    frequency_hz: 440.0
                },
                HostCommand::CancelTimer { id: timer },
            ]
        );
        assert_eq!(bridge.pending_len(), 0);
    }

    #[test]
    fn unavailable_audio_rejects_output_without_queueing() {
        let bridge = HostBridge::new();
        bridge.set_audio_available(false, "no audio device");

        let err = bridge.open_output(0.5).expect_err("open must fail");
        assert_eq!(err, AudioError::Unavailable("no audio device".to_string()));
        assert!(bridge.drain().is_empty());

        bridge.set_audio_available(true, "");
        assert!(bridge.open_output(0.5).is_ok());
    }

    #[test]
    fn unavailable_audio_rejects_voice_on_open_output() {
        let bridge = HostBridge::new();
        let output = bridge.open_output(0.5).expect("open output");
        bridge.drain();
        bridge.set_audio_available(false, "device lost");

        let err = bridge
            .start_voice(output, Waveform::Sine, 440.0)
            .expect_err("start must fail");
        assert_eq!(err, AudioError::Unavailable("device lost".to_string()));
        assert!(bridge.drain().is_empty());
    }

    #[test]
    fn commands_serialize_with_op_tag() {
        let bridge = HostBridge::new();
        bridge.schedule(Duration::from_millis(800));
        let json = serde_json::to_value(bridge.drain()).expect("serialize commands");
        assert_eq!(json[0]["op"], "schedule_timer");
        assert_eq!(json[0]["delay_ms"], 800);
    }
}
