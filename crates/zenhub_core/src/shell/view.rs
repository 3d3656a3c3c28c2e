//! Render snapshots produced by the shell.

use crate::model::activity::ActivityCard;
use crate::shell::prefs::Theme;
use crate::widget::breathing::BreathingView;
use crate::widget::tapper::TapperView;
use crate::widget::tones::ToneView;
use serde::{Deserialize, Serialize};

pub const HUB_TITLE: &str = "99 Stress Relief Hub";
pub const ACTIVITY_MODE_TITLE: &str = "Mini Game Mode";
pub const PLACEHOLDER_MESSAGE: &str =
    "This game is conceptual. Feel free to explore the fully functional games!";
pub const PLAYABLE_BADGE: &str = "PLAY!";

/// Whole-screen snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubView {
    pub header_title: String,
    pub theme: Theme,
    /// Selected card id, `None` on the hub grid.
    pub selection: Option<u32>,
    /// The header reset button is shown only while a card is selected.
    pub show_reset: bool,
    pub screen: ScreenView,
}

/// Exactly one of the hub grid or the active activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScreenView {
    Hub { cards: Vec<CardView> },
    Breathing(BreathingView),
    Tapper(TapperView),
    Tones(ToneView),
    Placeholder { title: String, message: String },
}

/// One hub grid card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardView {
    pub id: u32,
    pub title: String,
    pub category: String,
    pub playable: bool,
    pub badge: Option<String>,
}

impl From<&ActivityCard> for CardView {
    fn from(card: &ActivityCard) -> Self {
        Self {
            id: card.id.get(),
            title: card.title.clone(),
            category: card.category.label().to_string(),
            playable: card.is_playable,
            badge: card.is_playable.then(|| PLAYABLE_BADGE.to_string()),
        }
    }
}
