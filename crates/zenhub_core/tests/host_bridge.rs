use std::rc::Rc;
use zenhub_core::{
    AudioBackend, BreathPhase, Catalog, Clock, HostBridge, HostCommand, HubConfig, HubInput,
    Shell, Theme, ToneState,
};

fn bridged_shell() -> (Rc<HostBridge>, Shell) {
    let bridge = Rc::new(HostBridge::new());
    let clock: Rc<dyn Clock> = bridge.clone();
    let audio: Rc<dyn AudioBackend> = bridge.clone();
    let config = HubConfig {
        catalog_seed: Some(77),
        theme: Theme::Light,
        ..HubConfig::default()
    };
    (bridge, Shell::from_config(&config, clock, audio))
}

#[test]
fn from_config_applies_seed_and_theme() {
    let (_bridge, shell) = bridged_shell();
    assert_eq!(shell.preferences().theme, Theme::Light);
    assert_eq!(shell.catalog(), &Catalog::generate_seeded(77));
}

#[test]
fn breathing_timers_round_trip_through_host() {
    let (bridge, mut shell) = bridged_shell();
    shell.handle(HubInput::SelectCard { id: 1 }).expect("select");
    shell.handle(HubInput::BreathingToggle).expect("start");

    let commands = bridge.drain();
    let [HostCommand::ScheduleTimer { id, delay_ms }] = commands.as_slice() else {
        panic!("expected one scheduled timer, got {commands:?}");
    };
    assert_eq!(*delay_ms, 4_000);

    shell
        .handle(HubInput::TimerFired { id: *id })
        .expect("timer delivered");
    assert_eq!(
        shell.breathing().expect("mounted").phase(),
        BreathPhase::Hold
    );
    assert!(matches!(
        bridge.drain().as_slice(),
        [HostCommand::ScheduleTimer { delay_ms: 7_000, .. }]
    ));
}

#[test]
fn stopping_breathing_queues_cancel_and_late_timer_is_ignored() {
    let (bridge, mut shell) = bridged_shell();
    shell.select_card(1).expect("select");
    shell.breathing_toggle().expect("start");
    let scheduled = match bridge.drain().as_slice() {
        [HostCommand::ScheduleTimer { id, .. }] => *id,
        other => panic!("unexpected commands {other:?}"),
    };

    shell.breathing_toggle().expect("stop");
    assert_eq!(
        bridge.drain(),
        vec![HostCommand::CancelTimer { id: scheduled }]
    );

    assert!(!shell.on_timer(scheduled));
    assert_eq!(
        shell.breathing().expect("mounted").phase(),
        BreathPhase::Idle
    );
}

#[test]
fn tone_session_emits_audio_commands_and_releases_on_back() {
    let (bridge, mut shell) = bridged_shell();
    shell.select_card(3).expect("select");
    assert_eq!(shell.tone_toggle().expect("start"), ToneState::Playing);
    shell.tone_set_frequency(600.0).expect("retune");
    shell.back();

    let ops = bridge
        .drain()
        .into_iter()
        .map(|command| match command {
            HostCommand::OpenOutput { gain, .. } => format!("open:{gain}"),
            HostCommand::StartVoice { frequency_hz, .. } => format!("start:{frequency_hz}"),
            HostCommand::SetVoiceFrequency { frequency_hz, .. } => format!("tune:{frequency_hz}"),
            HostCommand::StopVoice { .. } => "stop".to_string(),
            HostCommand::CloseOutput { .. } => "close".to_string(),
            other => format!("{other:?}"),
        })
        .collect::<Vec<_>>();
    assert_eq!(ops, vec!["open:0.5", "start:440", "tune:600", "stop", "close"]);
}

#[test]
fn host_reported_audio_loss_disables_tones_only() {
    let (bridge, mut shell) = bridged_shell();
    bridge.set_audio_available(false, "no output device");
    shell.select_card(3).expect("select");

    assert!(shell.tone_toggle().is_err());
    assert_eq!(
        shell.tones().expect("mounted").state(),
        ToneState::Disabled
    );
    shell.handle(HubInput::ToggleTheme).expect("theme still toggles");
    shell.handle(HubInput::Back).expect("back still works");
    assert_eq!(shell.selection(), None);
}

#[test]
fn audio_loss_after_output_opened_disables_next_start() {
    let (bridge, mut shell) = bridged_shell();
    shell.select_card(3).expect("select");
    shell.tone_toggle().expect("start");
    shell.tone_toggle().expect("stop");
    bridge.drain();

    bridge.set_audio_available(false, "device lost");
    let err = shell.tone_toggle().expect_err("start without device must fail");
    assert!(err.to_string().contains("device lost"));

    assert!(!bridge
        .drain()
        .iter()
        .any(|command| matches!(command, HostCommand::StartVoice { .. })));
    let tones = shell.tones().expect("mounted");
    assert_eq!(tones.state(), ToneState::Disabled);
    assert!(tones
        .view()
        .status
        .expect("status message")
        .contains("device lost"));

    shell.back();
    assert!(matches!(
        bridge.drain().as_slice(),
        [HostCommand::CloseOutput { .. }]
    ));
}
