//! Host capability contracts.
//!
//! Components never touch real timers or audio devices. They receive these
//! capabilities at mount time and release what they acquired on teardown.

pub mod audio;
pub mod clock;
pub mod host;
