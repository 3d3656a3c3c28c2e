//! Timer capability and scheduled-task handles.
//!
//! # Responsibility
//! - Define the host timer contract used by breathing and tap components.
//! - Own pending timers through RAII handles so teardown cancels them.
//! - Provide a deterministic manual clock for tests and scripted demos.
//!
//! # Invariants
//! - `Clock::cancel` is idempotent and tolerates ids that already fired.
//! - A `ScheduledTask` cancels its timer when dropped unless it completed.
//! - `ManualClock::advance` fires timers in due order, including timers
//!   scheduled while dispatching earlier ones.

use log::trace;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt::{Display, Formatter};
use std::rc::Rc;
use std::time::Duration;

/// Opaque id of one scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimerId(u64);

impl TimerId {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl Display for TimerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

/// Host timer collaborator.
///
/// Fired timers are delivered back by the host through
/// `Shell::on_timer`; the clock itself never calls into components.
pub trait Clock {
    /// Schedules a single-shot timer firing after `delay`.
    fn schedule(&self, delay: Duration) -> TimerId;

    /// Cancels a pending timer. Unknown or already fired ids are ignored.
    fn cancel(&self, id: TimerId);
}

/// Pending timer owned by the component that scheduled it.
///
/// Dropping the handle cancels the timer at the clock.
pub struct ScheduledTask {
    clock: Rc<dyn Clock>,
    id: TimerId,
    armed: bool,
}

impl ScheduledTask {
    /// Schedules a timer on `clock` and returns its owning handle.
    pub fn schedule(clock: &Rc<dyn Clock>, delay: Duration) -> Self {
        let id = clock.schedule(delay);
        Self {
            clock: Rc::clone(clock),
            id,
            armed: true,
        }
    }

    pub fn id(&self) -> TimerId {
        self.id
    }

    /// Returns whether `id` refers to this task's timer.
    pub fn matches(&self, id: TimerId) -> bool {
        self.armed && self.id == id
    }

    /// Consumes the handle after its timer fired, without cancelling.
    pub fn complete(mut self) {
        self.armed = false;
    }

    /// Cancels the timer immediately.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        if self.armed {
            self.armed = false;
            self.clock.cancel(self.id);
        }
    }
}

impl std::fmt::Debug for ScheduledTask {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduledTask")
            .field("id", &self.id)
            .field("armed", &self.armed)
            .finish()
    }
}

#[derive(Debug, Default)]
struct ManualClockState {
    now: Duration,
    next_id: u64,
    // (due, id); ids are monotonic so ties fire in scheduling order.
    pending: Vec<(Duration, TimerId)>,
}

/// Deterministic clock advanced explicitly by the caller.
#[derive(Debug, Default)]
pub struct ManualClock {
    state: RefCell<ManualClockState>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a shared manual clock.
    pub fn shared() -> Rc<Self> {
        Rc::new(Self::new())
    }

    /// Elapsed time since clock creation.
    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    pub fn pending_count(&self) -> usize {
        self.state.borrow().pending.len()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.state
            .borrow()
            .pending
            .iter()
            .any(|(_, pending)| *pending == id)
    }

    /// Advances time by `by`, dispatching every timer that falls due.
    ///
    /// Returns the number of dispatched timers.
    pub fn advance(&self, by: Duration, dispatch: impl FnMut(TimerId)) -> usize {
        let target = self.now() + by;
        self.advance_to(target, dispatch)
    }

    /// Advances time to `target`, dispatching every timer due at or before it.
    ///
    /// `target` earlier than `now` is treated as `now`.
    pub fn advance_to(&self, target: Duration, mut dispatch: impl FnMut(TimerId)) -> usize {
        let mut fired = 0;
        while let Some(id) = self.pop_due(target) {
            fired += 1;
            dispatch(id);
        }
        let mut state = self.state.borrow_mut();
        if target > state.now {
            state.now = target;
        }
        fired
    }

    fn pop_due(&self, target: Duration) -> Option<TimerId> {
        let mut state = self.state.borrow_mut();
        let (index, (due, id)) = state
            .pending
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, (due, _))| *due <= target)
            .min_by_key(|(_, entry)| *entry)?;
        state.pending.swap_remove(index);
        if due > state.now {
            state.now = due;
        }
        trace!("event=timer_fired module=clock id={id} at_ms={}", due.as_millis());
        Some(id)
    }
}

impl Clock for ManualClock {
    fn schedule(&self, delay: Duration) -> TimerId {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = TimerId(state.next_id);
        let due = state.now + delay;
        state.pending.push((due, id));
        id
    }

    fn cancel(&self, id: TimerId) {
        self.state
            .borrow_mut()
            .pending
            .retain(|(_, pending)| *pending != id);
    }
}
