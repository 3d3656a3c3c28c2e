//! Hub shell: card selection, event routing and view snapshots.
//!
//! # Responsibility
//! - Decide which of the hub grid or one activity is shown.
//! - Keep UI/FFI hosts decoupled from component internals.

pub mod hub;
pub mod prefs;
pub mod view;
