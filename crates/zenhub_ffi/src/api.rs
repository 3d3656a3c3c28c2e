//! FFI hub API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose one hub session to Dart via FRB as sync, use-case level calls.
//! - Hand timer/audio work to Dart as host commands returned with every action.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Every action response carries the host commands issued while handling it,
//!   in issue order; Dart must execute them before the next call.
//! - The session lives on the calling thread; sync FRB calls arrive on the
//!   Dart UI thread.
//! - An invalid `ZENHUB_*` environment is reported by every call until it is
//!   fixed; no session is created from a partially applied config.

use log::warn;
use std::cell::RefCell;
use std::rc::Rc;
use zenhub_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    AudioBackend, BreathingView, Clock, HostBridge, HostCommand, HubConfig, HubInput, HubView,
    ScreenView, Shell, ShellError, TapperView, TimerId, ToneView,
};

thread_local! {
    static HUB_SESSION: RefCell<Option<HubSession>> = const { RefCell::new(None) };
}

struct HubSession {
    bridge: Rc<HostBridge>,
    shell: Shell,
}

impl HubSession {
    fn new(config: &HubConfig) -> Self {
        let bridge = Rc::new(HostBridge::new());
        let clock: Rc<dyn Clock> = bridge.clone();
        let audio: Rc<dyn AudioBackend> = bridge.clone();
        let shell = Shell::from_config(config, clock, audio);
        Self { bridge, shell }
    }

}

fn session_config(catalog_seed: Option<u64>) -> Result<HubConfig, String> {
    let mut config = HubConfig::from_env().map_err(|err| {
        warn!("event=hub_config module=ffi status=error error={err}");
        format!("hub config invalid: {err}")
    })?;
    if catalog_seed.is_some() {
        config.catalog_seed = catalog_seed;
    }
    Ok(config)
}

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory for rolling logs.
/// - Returns empty string on success and an error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One hub grid card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubCardItem {
    pub id: u32,
    pub title: String,
    pub category: String,
    pub playable: bool,
}

/// Breathing guide render state.
#[derive(Debug, Clone, PartialEq)]
pub struct BreathingItem {
    pub label: String,
    pub instruction: String,
    pub running: bool,
    pub scale: f32,
    pub opacity: f32,
    pub glow_period_ms: Option<u64>,
}

/// Live tap marker, top-left anchored.
#[derive(Debug, Clone, PartialEq)]
pub struct TapMarkerItem {
    pub id: u64,
    pub left: f32,
    pub top: f32,
    pub size: f32,
}

/// Tap counter render state.
#[derive(Debug, Clone, PartialEq)]
pub struct TapperItem {
    pub count: u64,
    pub markers: Vec<TapMarkerItem>,
}

/// Tone generator render state.
#[derive(Debug, Clone, PartialEq)]
pub struct ToneItem {
    pub playing: bool,
    pub disabled: bool,
    pub frequency_hz: f32,
    pub min_frequency_hz: f32,
    pub max_frequency_hz: f32,
    pub button_label: String,
    pub status: Option<String>,
}

/// Whole-screen snapshot.
///
/// `screen` is one of `hub|breathing|tapper|tones|placeholder|error`; only
/// the matching payload field is set.
#[derive(Debug, Clone, PartialEq)]
pub struct HubSnapshot {
    pub header_title: String,
    pub theme: String,
    pub selection: Option<u32>,
    pub show_reset: bool,
    pub screen: String,
    pub cards: Vec<HubCardItem>,
    pub placeholder_title: Option<String>,
    pub placeholder_message: Option<String>,
    pub breathing: Option<BreathingItem>,
    pub tapper: Option<TapperItem>,
    pub tones: Option<ToneItem>,
    /// Why no session could be created; empty otherwise.
    pub message: String,
}

impl HubSnapshot {
    fn failure(message: String) -> Self {
        Self {
            header_title: String::new(),
            theme: String::new(),
            selection: None,
            show_reset: false,
            screen: "error".to_string(),
            cards: Vec::new(),
            placeholder_title: None,
            placeholder_message: None,
            breathing: None,
            tapper: None,
            tones: None,
            message,
        }
    }
}

/// Timer or audio work for Dart to execute.
///
/// `op` is one of `schedule_timer|cancel_timer|open_output|close_output|
/// start_voice|set_voice_frequency|stop_voice`; `id` is the timer, output or
/// voice handle the op refers to.
#[derive(Debug, Clone, PartialEq)]
pub struct HostCommandItem {
    pub op: String,
    pub id: u64,
    pub delay_ms: Option<u64>,
    pub output: Option<u64>,
    pub gain: Option<f32>,
    pub frequency_hz: Option<f32>,
}

/// Action response envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct HubActionResponse {
    /// Whether the action succeeded.
    pub ok: bool,
    /// Human-readable message for diagnostics/UI; empty on success.
    pub message: String,
    /// Host commands issued while handling the action.
    pub commands: Vec<HostCommandItem>,
}

/// Replaces the hub session with a fresh one.
///
/// `catalog_seed` overrides `ZENHUB_CATALOG_SEED`. The old session is torn
/// down first, so its cancel/release commands are returned.
#[flutter_rust_bridge::frb(sync)]
pub fn hub_start(catalog_seed: Option<u64>) -> HubActionResponse {
    let config = match session_config(catalog_seed) {
        Ok(config) => config,
        Err(message) => return respond(Err(message), Vec::new()),
    };
    let released = HUB_SESSION.with(|cell| {
        let previous = cell.borrow_mut().take();
        previous.map(|session| {
            let bridge = Rc::clone(&session.bridge);
            drop(session);
            bridge.drain()
        })
    });
    HUB_SESSION.with(|cell| *cell.borrow_mut() = Some(HubSession::new(&config)));
    respond(Ok(()), released.unwrap_or_default())
}

/// Returns the current screen snapshot.
#[flutter_rust_bridge::frb(sync)]
pub fn hub_view() -> HubSnapshot {
    with_session(|session| to_snapshot(session.shell.view()))
        .unwrap_or_else(HubSnapshot::failure)
}

/// Selects a hub card by id (`1..=99`).
#[flutter_rust_bridge::frb(sync)]
pub fn hub_select_card(id: u32) -> HubActionResponse {
    dispatch(HubInput::SelectCard { id })
}

/// Returns to the hub grid.
#[flutter_rust_bridge::frb(sync)]
pub fn hub_back() -> HubActionResponse {
    dispatch(HubInput::Back)
}

#[flutter_rust_bridge::frb(sync)]
pub fn hub_toggle_theme() -> HubActionResponse {
    dispatch(HubInput::ToggleTheme)
}

#[flutter_rust_bridge::frb(sync)]
pub fn hub_breathing_toggle() -> HubActionResponse {
    dispatch(HubInput::BreathingToggle)
}

/// Registers a tap at surface-relative coordinates.
#[flutter_rust_bridge::frb(sync)]
pub fn hub_tap(x: f32, y: f32) -> HubActionResponse {
    dispatch(HubInput::Tap { x, y })
}

#[flutter_rust_bridge::frb(sync)]
pub fn hub_tone_toggle() -> HubActionResponse {
    dispatch(HubInput::ToneToggle)
}

/// Moves the tone slider; values are clamped to `100..=1000` Hz.
#[flutter_rust_bridge::frb(sync)]
pub fn hub_tone_set_frequency(hz: f32) -> HubActionResponse {
    dispatch(HubInput::ToneFrequency { hz })
}

/// Delivers a timer scheduled through `schedule_timer`.
#[flutter_rust_bridge::frb(sync)]
pub fn hub_timer_fired(timer_id: u64) -> HubActionResponse {
    dispatch(HubInput::TimerFired {
        id: TimerId::from_raw(timer_id),
    })
}

/// Reports whether Dart could obtain an audio device.
///
/// While unavailable, the tone generator reports a disabled state.
#[flutter_rust_bridge::frb(sync)]
pub fn hub_set_audio_available(available: bool, reason: String) -> HubActionResponse {
    with_session(|session| {
        session.bridge.set_audio_available(available, reason);
        respond(Ok(()), session.bridge.drain())
    })
    .unwrap_or_else(|message| respond(Err(message), Vec::new()))
}

/// Drains host commands not yet returned by an action.
///
/// Empty when no session could be created.
#[flutter_rust_bridge::frb(sync)]
pub fn hub_drain_host_commands() -> Vec<HostCommandItem> {
    with_session(|session| {
        session
            .bridge
            .drain()
            .into_iter()
            .map(to_command_item)
            .collect()
    })
    .unwrap_or_default()
}

fn dispatch(input: HubInput) -> HubActionResponse {
    with_session(|session| {
        let result = session
            .shell
            .handle(input)
            .map_err(|err: ShellError| err.to_string());
        respond(result, session.bridge.drain())
    })
    .unwrap_or_else(|message| respond(Err(message), Vec::new()))
}

fn respond(result: Result<(), String>, commands: Vec<HostCommand>) -> HubActionResponse {
    let commands = commands.into_iter().map(to_command_item).collect();
    match result {
        Ok(()) => HubActionResponse {
            ok: true,
            message: String::new(),
            commands,
        },
        Err(message) => HubActionResponse {
            ok: false,
            message,
            commands,
        },
    }
}

fn with_session<T>(f: impl FnOnce(&mut HubSession) -> T) -> Result<T, String> {
    with_session_from(|| session_config(None), f)
}

/// Runs `f` on the thread's session, creating it from `config` on first use.
fn with_session_from<T>(
    config: impl FnOnce() -> Result<HubConfig, String>,
    f: impl FnOnce(&mut HubSession) -> T,
) -> Result<T, String> {
    HUB_SESSION.with(|cell| {
        let mut slot = cell.borrow_mut();
        if slot.is_none() {
            *slot = Some(HubSession::new(&config()?));
        }
        match slot.as_mut() {
            Some(session) => Ok(f(session)),
            None => Err("hub session unavailable".to_string()),
        }
    })
}

fn to_snapshot(view: HubView) -> HubSnapshot {
    let mut snapshot = HubSnapshot {
        header_title: view.header_title,
        theme: view.theme.as_str().to_string(),
        selection: view.selection,
        show_reset: view.show_reset,
        screen: String::new(),
        cards: Vec::new(),
        placeholder_title: None,
        placeholder_message: None,
        breathing: None,
        tapper: None,
        tones: None,
        message: String::new(),
    };
    match view.screen {
        ScreenView::Hub { cards } => {
            snapshot.screen = "hub".to_string();
            snapshot.cards = cards
                .into_iter()
                .map(|card| HubCardItem {
                    id: card.id,
                    title: card.title,
                    category: card.category,
                    playable: card.playable,
                })
                .collect();
        }
        ScreenView::Breathing(view) => {
            snapshot.screen = "breathing".to_string();
            snapshot.breathing = Some(to_breathing_item(view));
        }
        ScreenView::Tapper(view) => {
            snapshot.screen = "tapper".to_string();
            snapshot.tapper = Some(to_tapper_item(view));
        }
        ScreenView::Tones(view) => {
            snapshot.screen = "tones".to_string();
            snapshot.tones = Some(to_tone_item(view));
        }
        ScreenView::Placeholder { title, message } => {
            snapshot.screen = "placeholder".to_string();
            snapshot.placeholder_title = Some(title);
            snapshot.placeholder_message = Some(message);
        }
    }
    snapshot
}

fn to_breathing_item(view: BreathingView) -> BreathingItem {
    BreathingItem {
        label: view.label,
        instruction: view.instruction,
        running: view.running,
        scale: view.scale,
        opacity: view.opacity,
        glow_period_ms: view.glow_period_ms,
    }
}

fn to_tapper_item(view: TapperView) -> TapperItem {
    TapperItem {
        count: view.count,
        markers: view
            .markers
            .into_iter()
            .map(|marker| TapMarkerItem {
                id: marker.id,
                left: marker.left,
                top: marker.top,
                size: marker.size,
            })
            .collect(),
    }
}

fn to_tone_item(view: ToneView) -> ToneItem {
    ToneItem {
        playing: view.playing,
        disabled: view.state == zenhub_core::ToneState::Disabled,
        frequency_hz: view.frequency_hz,
        min_frequency_hz: view.min_frequency_hz,
        max_frequency_hz: view.max_frequency_hz,
        button_label: view.button_label,
        status: view.status,
    }
}

fn to_command_item(command: HostCommand) -> HostCommandItem {
    let item = |op: &str, id: u64| HostCommandItem {
        op: op.to_string(),
        id,
        delay_ms: None,
        output: None,
        gain: None,
        frequency_hz: None,
    };
    match command {
        HostCommand::ScheduleTimer { id, delay_ms } => HostCommandItem {
            delay_ms: Some(delay_ms),
            ..item("schedule_timer", id.raw())
        },
        HostCommand::CancelTimer { id } => item("cancel_timer", id.raw()),
        HostCommand::OpenOutput { id, gain } => HostCommandItem {
            gain: Some(gain),
            ..item("open_output", id.raw())
        },
        HostCommand::CloseOutput { id } => item("close_output", id.raw()),
        HostCommand::StartVoice {
            id,
            output,
            waveform: _,
            frequency_hz,
        } => HostCommandItem {
            output: Some(output.raw()),
            frequency_hz: Some(frequency_hz),
            ..item("start_voice", id.raw())
        },
        HostCommand::SetVoiceFrequency { id, frequency_hz } => HostCommandItem {
            frequency_hz: Some(frequency_hz),
            ..item("set_voice_frequency", id.raw())
        },
        HostCommand::StopVoice { id } => item("stop_voice", id.raw()),
    }
}
