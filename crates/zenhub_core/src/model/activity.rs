//! Activity card domain model.
//!
//! # Responsibility
//! - Define the card record shown in the hub grid.
//! - Map the three playable ids to their interactive component kind.
//!
//! # Invariants
//! - `ActivityId` always holds a value in `1..=ACTIVITY_COUNT`.
//! - Only ids 1, 2 and 3 are playable.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Number of cards in the hub catalog.
pub const ACTIVITY_COUNT: u32 = 99;

/// Stable identifier of one catalog card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ActivityId(u32);

impl ActivityId {
    /// Validates a raw card id.
    ///
    /// # Errors
    /// - Returns `CatalogError::OutOfRange` when `raw` is outside `1..=99`.
    pub fn new(raw: u32) -> Result<Self, CatalogError> {
        if (1..=ACTIVITY_COUNT).contains(&raw) {
            Ok(Self(raw))
        } else {
            Err(CatalogError::OutOfRange(raw))
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Returns the interactive component backing this id, if any.
    pub fn playable_kind(self) -> Option<PlayableKind> {
        match self.0 {
            1 => Some(PlayableKind::Breathing),
            2 => Some(PlayableKind::Tapper),
            3 => Some(PlayableKind::Tones),
            _ => None,
        }
    }
}

impl TryFrom<u32> for ActivityId {
    type Error = CatalogError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ActivityId> for u32 {
    fn from(value: ActivityId) -> Self {
        value.0
    }
}

impl Display for ActivityId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Interactive component kinds mounted for playable cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayableKind {
    /// 4-7-8 breathing pace guide.
    Breathing,
    /// Tap counter with transient markers.
    Tapper,
    /// Sine tone generator.
    Tones,
}

/// Card category shown under the title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Meditation,
    Focus,
    SoundTherapy,
    Humor,
    Color,
    Tapping,
    Visual,
    Sound,
    Puzzle,
}

impl Category {
    /// Categories drawn for generated placeholder cards.
    pub const GENERATED: [Category; 6] = [
        Category::Focus,
        Category::Color,
        Category::Tapping,
        Category::Visual,
        Category::Sound,
        Category::Puzzle,
    ];

    /// User-facing label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Meditation => "Meditation",
            Self::Focus => "Focus",
            Self::SoundTherapy => "Sound Therapy",
            Self::Humor => "Humor",
            Self::Color => "Color",
            Self::Tapping => "Tapping",
            Self::Visual => "Visual",
            Self::Sound => "Sound",
            Self::Puzzle => "Puzzle",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One entry of the hub grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityCard {
    pub id: ActivityId,
    pub title: String,
    pub category: Category,
    pub is_playable: bool,
}

impl ActivityCard {
    pub fn new(id: ActivityId, title: impl Into<String>, category: Category) -> Self {
        Self {
            id,
            title: title.into(),
            category,
            is_playable: id.playable_kind().is_some(),
        }
    }
}

/// Catalog lookup errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogError {
    OutOfRange(u32),
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange(value) => write!(
                f,
                "activity id must be within 1..={ACTIVITY_COUNT}, got {value}"
            ),
        }
    }
}

impl Error for CatalogError {}

#[cfg(test)]
mod tests {
    use super::{ActivityCard, ActivityId, CatalogError, Category, PlayableKind};

    #[test]
    fn activity_id_rejects_zero_and_overflow() {
        assert_eq!(
            ActivityId::new(0).expect_err("zero must be rejected"),
            CatalogError::OutOfRange(0)
        );
        assert_eq!(
            ActivityId::new(100).expect_err("100 must be rejected"),
            CatalogError::OutOfRange(100)
        );
        assert_eq!(ActivityId::new(99).expect("99 is valid").get(), 99);
    }

    #[test]
    fn only_first_three_ids_are_playable() {
        let kinds = (1..=5)
            .map(|raw| ActivityId::new(raw).expect("valid id").playable_kind())
            .collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                Some(PlayableKind::Breathing),
                Some(PlayableKind::Tapper),
                Some(PlayableKind::Tones),
                None,
                None,
            ]
        );
    }

    #[test]
    fn card_playability_follows_id() {
        let card = ActivityCard::new(
            ActivityId::new(2).expect("valid id"),
            "Infinite Tapper",
            Category::Focus,
        );
        assert!(card.is_playable);
        assert_eq!(card.category.label(), "Focus");
    }
}
