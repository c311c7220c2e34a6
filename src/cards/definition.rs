//! Card definitions - static card data.
//!
//! `CardDefinition` holds the immutable properties of a blueprint: cost,
//! kind, affinities, abilities. Where a physical copy currently is (hand,
//! board, discard) lives in `state::CardInstance`, keyed by `EntityId`.
//!
//! The orchestration core never reads definitions directly; it asks the
//! content layer (`rules::ContentRules`) for costs and legality. Definitions
//! exist so content implementations have a shared vocabulary.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Unique identifier for a card blueprint.
///
/// This identifies the "type" of card (e.g., "Bolt"), not a specific copy in
/// a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// Elemental alignment a player attunes to by playing destiny cards.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    Display, EnumString, EnumIter,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Affinity {
    Fire,
    Water,
    Earth,
    Air,
    Light,
    Shadow,
}

/// What a card does when it resolves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardKind {
    /// Occupies a minion slot when played.
    Minion { attack: i64, health: i64 },

    /// Resolves through the effect chain and goes to the discard pile.
    Spell,

    /// Played from the destiny zone during the Destiny phase.
    Destiny,
}

/// An activated ability printed on a minion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityDefinition {
    pub name: String,
    pub cost: u32,
}

/// Static card definition.
///
/// ```
/// use tactics_core::cards::{Affinity, CardDefinition, CardId, CardKind};
///
/// let drake = CardDefinition::minion(CardId::new(4), "Ember Drake", 3, 3, 2)
///     .with_affinity(Affinity::Fire);
///
/// assert_eq!(drake.cost, 3);
/// assert!(matches!(drake.kind, CardKind::Minion { attack: 3, health: 2 }));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDefinition {
    /// Unique identifier for this blueprint.
    pub id: CardId,

    /// Card name (for display/debugging).
    pub name: String,

    /// Mana cost.
    pub cost: u32,

    pub kind: CardKind,

    /// Reactive cards may only be played in response, while an effect chain
    /// is open.
    pub reactive: bool,

    /// Affinities granted (destiny) or required (others).
    pub affinities: Vec<Affinity>,

    pub abilities: Vec<AbilityDefinition>,
}

impl CardDefinition {
    /// Create a definition of the given kind.
    #[must_use]
    pub fn new(id: CardId, name: impl Into<String>, cost: u32, kind: CardKind) -> Self {
        Self {
            id,
            name: name.into(),
            cost,
            kind,
            reactive: false,
            affinities: Vec::new(),
            abilities: Vec::new(),
        }
    }

    /// Create a minion definition.
    #[must_use]
    pub fn minion(id: CardId, name: impl Into<String>, cost: u32, attack: i64, health: i64) -> Self {
        Self::new(id, name, cost, CardKind::Minion { attack, health })
    }

    /// Create a spell definition.
    #[must_use]
    pub fn spell(id: CardId, name: impl Into<String>, cost: u32) -> Self {
        Self::new(id, name, cost, CardKind::Spell)
    }

    /// Create a destiny definition.
    #[must_use]
    pub fn destiny(id: CardId, name: impl Into<String>) -> Self {
        Self::new(id, name, 0, CardKind::Destiny)
    }

    /// Mark as reactive (builder pattern).
    #[must_use]
    pub fn reactive(mut self) -> Self {
        self.reactive = true;
        self
    }

    /// Add an affinity (builder pattern).
    #[must_use]
    pub fn with_affinity(mut self, affinity: Affinity) -> Self {
        if !self.affinities.contains(&affinity) {
            self.affinities.push(affinity);
        }
        self
    }

    /// Add an activated ability (builder pattern).
    #[must_use]
    pub fn with_ability(mut self, name: impl Into<String>, cost: u32) -> Self {
        self.abilities.push(AbilityDefinition {
            name: name.into(),
            cost,
        });
        self
    }

    /// Check if this is a minion.
    #[must_use]
    pub fn is_minion(&self) -> bool {
        matches!(self.kind, CardKind::Minion { .. })
    }
}
