//! Core logic for the ZenHub stress relief hub.
//! This crate owns catalog, selection and activity behavior; hosts only render
//! views and execute timer/audio capabilities.

pub mod capability;
pub mod config;
pub mod logging;
pub mod model;
pub mod shell;
pub mod widget;

pub use capability::audio::{
    AudioBackend, AudioError, MemoryAudioBackend, OutputId, VoiceId, VoiceState, Waveform,
};
pub use capability::clock::{Clock, ManualClock, ScheduledTask, TimerId};
pub use capability::host::{HostBridge, HostCommand};
pub use config::{ConfigError, HubConfig};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::activity::{ActivityCard, ActivityId, CatalogError, Category, PlayableKind};
pub use model::catalog::Catalog;
pub use shell::hub::{HubInput, Shell, ShellError};
pub use shell::prefs::{Theme, ViewPreferences};
pub use shell::view::{CardView, HubView, ScreenView};
pub use widget::breathing::{BreathPhase, BreathingGuide, BreathingView};
pub use widget::tapper::{MarkerView, TapCounter, TapPosition, TapperView};
pub use widget::tones::{ToneError, ToneGenerator, ToneState, ToneView};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
