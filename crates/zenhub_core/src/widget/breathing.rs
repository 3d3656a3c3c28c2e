//! 4-7-8 breathing pace guide.
//!
//! # Responsibility
//! - Run the Inhale -> Hold -> Exhale cycle on chained single-shot timers.
//! - Derive the circle visuals purely from the current phase.
//!
//! # Invariants
//! - At most one phase timer is pending, owned by `pending`.
//! - Stopping cancels the pending timer before returning; no transition can
//!   fire afterwards.
//! - Every start begins at `Inhale`.

use crate::capability::clock::{Clock, ScheduledTask, TimerId};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use std::time::Duration;

/// Length of one full breathing cycle.
pub const CYCLE_DURATION: Duration = Duration::from_secs(19);

const EXPANDED_SCALE: f32 = 1.2;
const EXHALE_OPACITY: f32 = 0.7;

/// Breathing phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreathPhase {
    Idle,
    Inhale,
    Hold,
    Exhale,
}

impl BreathPhase {
    /// Time spent in this phase before the next transition.
    pub fn duration(self) -> Option<Duration> {
        match self {
            Self::Idle => None,
            Self::Inhale => Some(Duration::from_secs(4)),
            Self::Hold => Some(Duration::from_secs(7)),
            Self::Exhale => Some(Duration::from_secs(8)),
        }
    }

    /// Phase entered when this one elapses.
    pub fn next(self) -> Self {
        match self {
            Self::Idle => Self::Idle,
            Self::Inhale => Self::Hold,
            Self::Hold => Self::Exhale,
            Self::Exhale => Self::Inhale,
        }
    }

    /// Short label shown inside the circle.
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Tap to Start",
            Self::Inhale => "Breathe In",
            Self::Hold => "Hold",
            Self::Exhale => "Breathe Out",
        }
    }

    /// Instruction line shown under the circle.
    pub fn instruction(self) -> &'static str {
        match self {
            Self::Idle => "Tap to Start",
            Self::Inhale => "Inhale deeply...",
            Self::Hold => "Hold your breath...",
            Self::Exhale => "Exhale slowly and completely...",
        }
    }
}

/// Render snapshot of the breathing guide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreathingView {
    pub phase: BreathPhase,
    pub running: bool,
    pub label: String,
    pub instruction: String,
    pub scale: f32,
    pub opacity: f32,
    /// Glow animation period; `None` while stopped.
    pub glow_period_ms: Option<u64>,
}

/// Breathing guide component state.
pub struct BreathingGuide {
    clock: Rc<dyn Clock>,
    phase: BreathPhase,
    pending: Option<ScheduledTask>,
    cycles_completed: u64,
}

impl BreathingGuide {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            clock,
            phase: BreathPhase::Idle,
            pending: None,
            cycles_completed: 0,
        }
    }

    pub fn phase(&self) -> BreathPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase != BreathPhase::Idle
    }

    /// Number of Exhale -> Inhale wraps since the last start.
    pub fn cycles_completed(&self) -> u64 {
        self.cycles_completed
    }

    /// Starts the cycle when idle, stops it otherwise.
    pub fn toggle(&mut self) {
        if self.is_running() {
            self.stop();
        } else {
            self.start();
        }
    }

    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        self.cycles_completed = 0;
        info!("event=breathing_start module=breathing status=ok");
        self.enter(BreathPhase::Inhale);
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.pending.take() {
            task.cancel();
        }
        if self.is_running() {
            info!(
                "event=breathing_stop module=breathing status=ok cycles={}",
                self.cycles_completed
            );
        }
        self.phase = BreathPhase::Idle;
    }

    /// Handles a fired timer. Returns `false` when `id` is not this guide's.
    pub fn handle_timer(&mut self, id: TimerId) -> bool {
        let Some(task) = self.pending.take_if(|task| task.matches(id)) else {
            return false;
        };
        task.complete();
        let next = self.phase.next();
        if next == BreathPhase::Inhale {
            self.cycles_completed = self.cycles_completed.saturating_add(1);
        }
        self.enter(next);
        true
    }

    pub fn view(&self) -> BreathingView {
        let phase = self.phase;
        BreathingView {
            phase,
            running: self.is_running(),
            label: phase.label().to_string(),
            instruction: phase.instruction().to_string(),
            scale: match phase {
                BreathPhase::Inhale | BreathPhase::Hold => EXPANDED_SCALE,
                _ => 1.0,
            },
            opacity: if phase == BreathPhase::Exhale {
                EXHALE_OPACITY
            } else {
                1.0
            },
            glow_period_ms: self
                .is_running()
                .then(|| CYCLE_DURATION.as_millis() as u64),
        }
    }

    fn enter(&mut self, phase: BreathPhase) {
        self.phase = phase;
        self.pending = phase
            .duration()
            .map(|delay| ScheduledTask::schedule(&self.clock, delay));
        debug!(
            "event=breathing_phase module=breathing phase={:?} timer={:?}",
            phase,
            self.pending.as_ref().map(ScheduledTask::id)
        );
    }
}
