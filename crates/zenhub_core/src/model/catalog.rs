//! Hub catalog generation.
//!
//! # Responsibility
//! - Build the 99 cards once at hub startup.
//! - Provide id lookup for the shell.
//!
//! # Invariants
//! - Exactly one card exists per id in `1..=99`, stored in id order.
//! - Cards are immutable after construction.
//! - Placeholder categories are drawn independently per id; without a seed
//!   they differ across runs.

use crate::model::activity::{ActivityCard, ActivityId, Category, ACTIVITY_COUNT};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Immutable set of hub cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    cards: Vec<ActivityCard>,
}

impl Catalog {
    /// Builds the catalog with process-random placeholder categories.
    pub fn generate() -> Self {
        Self::generate_with_rng(&mut rand::rng())
    }

    /// Builds the catalog with placeholder categories drawn from a seeded RNG.
    ///
    /// The same seed always yields the same catalog.
    pub fn generate_seeded(seed: u64) -> Self {
        Self::generate_with_rng(&mut StdRng::seed_from_u64(seed))
    }

    /// Builds the catalog drawing placeholder categories from `rng`.
    pub fn generate_with_rng<R: Rng>(rng: &mut R) -> Self {
        let cards = (1..=ACTIVITY_COUNT)
            .filter_map(|raw| ActivityId::new(raw).ok())
            .map(|id| build_card(id, rng))
            .collect::<Vec<_>>();
        debug!(
            "event=catalog_generated module=catalog status=ok cards={}",
            cards.len()
        );
        Self { cards }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Returns cards in id order.
    pub fn cards(&self) -> &[ActivityCard] {
        &self.cards
    }

    pub fn get(&self, id: ActivityId) -> Option<&ActivityCard> {
        // Cards are stored densely in id order.
        self.cards.get(id.get() as usize - 1)
    }

    pub fn playable(&self) -> impl Iterator<Item = &ActivityCard> {
        self.cards.iter().filter(|card| card.is_playable)
    }
}

fn build_card<R: Rng>(id: ActivityId, rng: &mut R) -> ActivityCard {
    match id.get() {
        1 => ActivityCard::new(id, "4-7-8 Breathing Guide", Category::Meditation),
        2 => ActivityCard::new(id, "Infinite Tapper", Category::Focus),
        3 => ActivityCard::new(id, "Gentle Tones", Category::SoundTherapy),
        ACTIVITY_COUNT => ActivityCard::new(id, "The Last Laugh", Category::Humor),
        raw => {
            let category = Category::GENERATED[rng.random_range(0..Category::GENERATED.len())];
            ActivityCard::new(id, format!("Zen Game {raw} - {category} Focus"), category)
        }
    }
}
