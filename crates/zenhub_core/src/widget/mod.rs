//! Interactive activity components.
//!
//! # Responsibility
//! - Hold per-component state and update it from input and timer events.
//! - Produce serializable view snapshots for the host renderer.
//!
//! # Invariants
//! - Components are created fresh on every mount and share nothing.
//! - Dropping a component cancels its timers and releases its audio handles.

pub mod breathing;
pub mod tapper;
pub mod tones;
