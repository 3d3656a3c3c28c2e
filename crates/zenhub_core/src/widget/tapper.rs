//! Infinite tapper: tap counter with transient splash markers.
//!
//! # Responsibility
//! - Count taps for the lifetime of one mount.
//! - Show a marker per tap and expire it after `MARKER_LIFETIME`.
//!
//! # Invariants
//! - `count` only grows, by exactly one per tap, saturating at `u64::MAX`.
//! - Every live marker owns one pending expiry timer; markers expire
//!   independently of each other.

use crate::capability::clock::{Clock, ScheduledTask, TimerId};
use log::trace;
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use std::time::Duration;

/// Lifetime of one splash marker.
pub const MARKER_LIFETIME: Duration = Duration::from_millis(800);

/// Rendered marker edge length in logical pixels.
pub const MARKER_SIZE: f32 = 30.0;

/// Tap position relative to the tap surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TapPosition {
    pub x: f32,
    pub y: f32,
}

impl TapPosition {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Render snapshot of one live marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerView {
    pub id: u64,
    /// Top-left corner, so the marker is centered on the tap.
    pub left: f32,
    pub top: f32,
    pub size: f32,
}

/// Render snapshot of the tapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TapperView {
    pub count: u64,
    pub markers: Vec<MarkerView>,
}

struct Marker {
    id: u64,
    position: TapPosition,
    expiry: ScheduledTask,
}

/// Tap counter component state.
///
/// Each marker owns its own expiry timer; dropping the counter cancels all
/// of them.
pub struct TapCounter {
    clock: Rc<dyn Clock>,
    count: u64,
    next_marker_id: u64,
    markers: Vec<Marker>,
}

impl TapCounter {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            clock,
            count: 0,
            next_marker_id: 0,
            markers: Vec::new(),
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Counts one tap and spawns a marker at `position`.
    ///
    /// Returns the updated count.
    pub fn register_tap(&mut self, position: TapPosition) -> u64 {
        self.count = self.count.saturating_add(1);
        self.next_marker_id = self.next_marker_id.saturating_add(1);
        let expiry = ScheduledTask::schedule(&self.clock, MARKER_LIFETIME);
        trace!(
            "event=tap module=tapper count={} marker={} timer={}",
            self.count,
            self.next_marker_id,
            expiry.id()
        );
        self.markers.push(Marker {
            id: self.next_marker_id,
            position,
            expiry,
        });
        self.count
    }

    /// Removes the marker whose expiry fired. Returns `false` for unknown ids.
    pub fn handle_timer(&mut self, id: TimerId) -> bool {
        let Some(index) = self
            .markers
            .iter()
            .position(|marker| marker.expiry.matches(id))
        else {
            return false;
        };
        self.markers.remove(index).expiry.complete();
        true
    }

    pub fn view(&self) -> TapperView {
        let half = MARKER_SIZE / 2.0;
        TapperView {
            count: self.count,
            markers: self
                .markers
                .iter()
                .map(|marker| MarkerView {
                    id: marker.id,
                    left: marker.position.x - half,
                    top: marker.position.y - half,
                    size: MARKER_SIZE,
                })
                .collect(),
        }
    }
}
