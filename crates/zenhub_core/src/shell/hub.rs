//! Card selector and activity shell.
//!
//! # Responsibility
//! - Own the catalog, the current selection and the mounted component.
//! - Route input and timer events to the mounted component.
//! - Produce one `HubView` snapshot per render.
//!
//! # Invariants
//! - Selection and the mounted component change together; there is never a
//!   component without a selection or the other way round.
//! - Replacing or clearing the selection drops the previous component, which
//!   cancels its timers and releases its audio handles.
//! - Theme changes never touch selection.
//! - A failing component never blocks selection or navigation.

use crate::capability::audio::AudioBackend;
use crate::capability::clock::{Clock, TimerId};
use crate::config::HubConfig;
use crate::model::activity::{ActivityId, CatalogError, PlayableKind};
use crate::model::catalog::Catalog;
use crate::shell::prefs::{Theme, ViewPreferences};
use crate::shell::view::{
    CardView, HubView, ScreenView, ACTIVITY_MODE_TITLE, HUB_TITLE, PLACEHOLDER_MESSAGE,
};
use crate::widget::breathing::{BreathPhase, BreathingGuide};
use crate::widget::tapper::{TapCounter, TapPosition};
use crate::widget::tones::{ToneError, ToneGenerator, ToneState};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

/// Input events accepted by `Shell::handle`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HubInput {
    SelectCard { id: u32 },
    Back,
    ToggleTheme,
    BreathingToggle,
    Tap { x: f32, y: f32 },
    ToneToggle,
    ToneFrequency { hz: f32 },
    TimerFired { id: TimerId },
}

/// Shell operation errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellError {
    UnknownActivity(CatalogError),
    /// Input targeted a component that is not mounted.
    NoActiveComponent(PlayableKind),
    Tone(ToneError),
}

impl Display for ShellError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownActivity(err) => write!(f, "{err}"),
            Self::NoActiveComponent(kind) => write!(f, "{kind:?} component is not active"),
            Self::Tone(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ShellError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::UnknownActivity(err) => Some(err),
            Self::NoActiveComponent(_) => None,
            Self::Tone(err) => Some(err),
        }
    }
}

impl From<CatalogError> for ShellError {
    fn from(value: CatalogError) -> Self {
        Self::UnknownActivity(value)
    }
}

impl From<ToneError> for ShellError {
    fn from(value: ToneError) -> Self {
        Self::Tone(value)
    }
}

enum Screen {
    Breathing(BreathingGuide),
    Tapper(TapCounter),
    Tones(ToneGenerator),
    Placeholder,
}

struct Mounted {
    id: ActivityId,
    screen: Screen,
}

/// Hub session: catalog, selection and the mounted activity.
pub struct Shell {
    catalog: Catalog,
    prefs: ViewPreferences,
    mounted: Option<Mounted>,
    clock: Rc<dyn Clock>,
    audio: Rc<dyn AudioBackend>,
}

impl Shell {
    pub fn new(
        catalog: Catalog,
        prefs: ViewPreferences,
        clock: Rc<dyn Clock>,
        audio: Rc<dyn AudioBackend>,
    ) -> Self {
        Self {
            catalog,
            prefs,
            mounted: None,
            clock,
            audio,
        }
    }

    /// Builds a shell whose catalog and theme follow `config`.
    pub fn from_config(
        config: &HubConfig,
        clock: Rc<dyn Clock>,
        audio: Rc<dyn AudioBackend>,
    ) -> Self {
        let catalog = match config.catalog_seed {
            Some(seed) => Catalog::generate_seeded(seed),
            None => Catalog::generate(),
        };
        info!(
            "event=hub_start module=shell status=ok cards={} seeded={} theme={}",
            catalog.len(),
            config.catalog_seed.is_some(),
            config.theme
        );
        Self::new(catalog, ViewPreferences::new(config.theme), clock, audio)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn preferences(&self) -> ViewPreferences {
        self.prefs
    }

    pub fn selection(&self) -> Option<ActivityId> {
        self.mounted.as_ref().map(|mounted| mounted.id)
    }

    /// Selects a card and mounts a fresh component for it.
    ///
    /// Re-selecting the current card keeps its component as is.
    ///
    /// # Errors
    /// - Returns `ShellError::UnknownActivity` for ids outside the catalog;
    ///   selection is left unchanged.
    pub fn select_card(&mut self, raw_id: u32) -> Result<ActivityId, ShellError> {
        let id = ActivityId::new(raw_id)?;
        if self.selection() == Some(id) {
            return Ok(id);
        }
        // Tear down before mounting so the old component releases first.
        self.mounted = None;
        let screen = match id.playable_kind() {
            Some(PlayableKind::Breathing) => {
                Screen::Breathing(BreathingGuide::new(Rc::clone(&self.clock)))
            }
            Some(PlayableKind::Tapper) => Screen::Tapper(TapCounter::new(Rc::clone(&self.clock))),
            Some(PlayableKind::Tones) => Screen::Tones(ToneGenerator::new(Rc::clone(&self.audio))),
            None => Screen::Placeholder,
        };
        info!(
            "event=card_select module=shell status=ok id={id} playable={}",
            id.playable_kind().is_some()
        );
        self.mounted = Some(Mounted { id, screen });
        Ok(id)
    }

    /// Returns to the hub grid, tearing down the active component.
    pub fn back(&mut self) {
        if let Some(mounted) = self.mounted.take() {
            info!("event=card_back module=shell status=ok id={}", mounted.id);
        }
    }

    /// Header reset action; same as `back`.
    pub fn reset(&mut self) {
        self.back();
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.prefs.theme = self.prefs.theme.toggled();
        debug!("event=theme_toggle module=shell theme={}", self.prefs.theme);
        self.prefs.theme
    }

    pub fn breathing(&self) -> Option<&BreathingGuide> {
        match self.mounted.as_ref().map(|mounted| &mounted.screen) {
            Some(Screen::Breathing(guide)) => Some(guide),
            _ => None,
        }
    }

    pub fn tapper(&self) -> Option<&TapCounter> {
        match self.mounted.as_ref().map(|mounted| &mounted.screen) {
            Some(Screen::Tapper(counter)) => Some(counter),
            _ => None,
        }
    }

    pub fn tones(&self) -> Option<&ToneGenerator> {
        match self.mounted.as_ref().map(|mounted| &mounted.screen) {
            Some(Screen::Tones(tones)) => Some(tones),
            _ => None,
        }
    }

    pub fn breathing_toggle(&mut self) -> Result<BreathPhase, ShellError> {
        let guide = match self.screen_mut() {
            Some(Screen::Breathing(guide)) => guide,
            _ => return Err(ShellError::NoActiveComponent(PlayableKind::Breathing)),
        };
        guide.toggle();
        Ok(guide.phase())
    }

    pub fn register_tap(&mut self, position: TapPosition) -> Result<u64, ShellError> {
        match self.screen_mut() {
            Some(Screen::Tapper(counter)) => Ok(counter.register_tap(position)),
            _ => Err(ShellError::NoActiveComponent(PlayableKind::Tapper)),
        }
    }

    pub fn tone_toggle(&mut self) -> Result<ToneState, ShellError> {
        let tones = match self.screen_mut() {
            Some(Screen::Tones(tones)) => tones,
            _ => return Err(ShellError::NoActiveComponent(PlayableKind::Tones)),
        };
        tones.toggle().map_err(|err| {
            warn!("event=tone_toggle module=shell status=error error={err}");
            ShellError::Tone(err)
        })
    }

    /// Moves the frequency slider; returns the applied frequency.
    pub fn tone_set_frequency(&mut self, hz: f32) -> Result<f32, ShellError> {
        match self.screen_mut() {
            Some(Screen::Tones(tones)) => Ok(tones.set_frequency(hz)?),
            _ => Err(ShellError::NoActiveComponent(PlayableKind::Tones)),
        }
    }

    /// Routes a fired timer to the mounted component.
    ///
    /// Returns `false` when no component owns the timer, e.g. one fired by
    /// the host after its component was torn down.
    pub fn on_timer(&mut self, id: TimerId) -> bool {
        let handled = match self.screen_mut() {
            Some(Screen::Breathing(guide)) => guide.handle_timer(id),
            Some(Screen::Tapper(counter)) => counter.handle_timer(id),
            _ => false,
        };
        if !handled {
            debug!("event=timer_ignored module=shell id={id}");
        }
        handled
    }

    /// Applies one input event.
    pub fn handle(&mut self, input: HubInput) -> Result<(), ShellError> {
        match input {
            HubInput::SelectCard { id } => self.select_card(id).map(|_| ()),
            HubInput::Back => {
                self.back();
                Ok(())
            }
            HubInput::ToggleTheme => {
                self.toggle_theme();
                Ok(())
            }
            HubInput::BreathingToggle => self.breathing_toggle().map(|_| ()),
            HubInput::Tap { x, y } => self.register_tap(TapPosition::new(x, y)).map(|_| ()),
            HubInput::ToneToggle => self.tone_toggle().map(|_| ()),
            HubInput::ToneFrequency { hz } => self.tone_set_frequency(hz).map(|_| ()),
            HubInput::TimerFired { id } => {
                self.on_timer(id);
                Ok(())
            }
        }
    }

    pub fn view(&self) -> HubView {
        let Some(mounted) = self.mounted.as_ref() else {
            return HubView {
                header_title: HUB_TITLE.to_string(),
                theme: self.prefs.theme,
                selection: None,
                show_reset: false,
                screen: ScreenView::Hub {
                    cards: self.catalog.cards().iter().map(CardView::from).collect(),
                },
            };
        };

        let screen = match &mounted.screen {
            Screen::Breathing(guide) => ScreenView::Breathing(guide.view()),
            Screen::Tapper(counter) => ScreenView::Tapper(counter.view()),
            Screen::Tones(tones) => ScreenView::Tones(tones.view()),
            Screen::Placeholder => ScreenView::Placeholder {
                title: self
                    .catalog
                    .get(mounted.id)
                    .map(|card| card.title.clone())
                    .unwrap_or_default(),
                message: PLACEHOLDER_MESSAGE.to_string(),
            },
        };
        HubView {
            header_title: ACTIVITY_MODE_TITLE.to_string(),
            theme: self.prefs.theme,
            selection: Some(mounted.id.get()),
            show_reset: true,
            screen,
        }
    }

    fn screen_mut(&mut self) -> Option<&mut Screen> {
        self.mounted.as_mut().map(|mounted| &mut mounted.screen)
    }
}
