//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `zenhub_core` linkage without the Flutter/FFI runtime.
//! - Replay a scripted hub session on a manual clock so output is
//!   deterministic.

use std::rc::Rc;
use std::time::Duration;
use zenhub_core::{
    AudioBackend, Clock, HubConfig, HubInput, ManualClock, MemoryAudioBackend, Shell,
};

fn main() {
    println!("zenhub_core ping={}", zenhub_core::ping());
    println!("zenhub_core version={}", zenhub_core::core_version());

    let config = match HubConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            std::process::exit(2);
        }
    };
    if let Err(err) = zenhub_core::init_logging_from_config(&config) {
        eprintln!("logging disabled: {err}");
    }

    let clock = ManualClock::shared();
    let audio = Rc::new(MemoryAudioBackend::new());
    let dyn_clock: Rc<dyn Clock> = clock.clone();
    let dyn_audio: Rc<dyn AudioBackend> = audio.clone();
    let mut shell = Shell::from_config(&config, dyn_clock, dyn_audio);
    println!(
        "catalog cards={} playable={}",
        shell.catalog().len(),
        shell.catalog().playable().count()
    );

    let script = [
        HubInput::SelectCard { id: 1 },
        HubInput::BreathingToggle,
    ];
    for input in script {
        if let Err(err) = shell.handle(input) {
            eprintln!("input {input:?} failed: {err}");
        }
    }
    for second in [0, 4, 11, 19] {
        clock.advance_to(Duration::from_secs(second), |id| {
            shell.on_timer(id);
        });
        if let Some(guide) = shell.breathing() {
            let view = guide.view();
            println!("t={second:>2}s {:<12} {}", view.label, view.instruction);
        }
    }

    let script = [
        HubInput::SelectCard { id: 2 },
        HubInput::Tap { x: 10.0, y: 10.0 },
        HubInput::Tap { x: 20.0, y: 20.0 },
        HubInput::SelectCard { id: 3 },
        HubInput::ToneToggle,
        HubInput::ToneFrequency { hz: 250.0 },
    ];
    for input in script {
        if let Err(err) = shell.handle(input) {
            eprintln!("input {input:?} failed: {err}");
        }
    }
    if let Some(tones) = shell.tones() {
        println!(
            "tone state={:?} frequency_hz={}",
            tones.state(),
            tones.frequency_hz()
        );
    }

    shell.handle(HubInput::Back).ok();
    println!(
        "back to hub selection={:?} audio_idle={}",
        shell.selection(),
        audio.is_idle()
    );
}
