//! Blueprint lookup for a card pool.

use rustc_hash::FxHashMap;

use super::definition::{CardDefinition, CardId};
use crate::core::DeckList;

/// Every blueprint a content implementation knows, keyed by `CardId`.
///
/// ```
/// use tactics_core::cards::{CardDefinition, CardId, CardRegistry};
/// use tactics_core::core::DeckList;
///
/// let registry = CardRegistry::new().with(CardDefinition::spell(CardId::new(1), "Bolt", 1));
/// assert_eq!(registry.get(CardId::new(1)).unwrap().name, "Bolt");
///
/// let deck = DeckList::new(vec![CardId::new(1), CardId::new(7)], vec![]);
/// assert_eq!(registry.missing_from(&deck), vec![CardId::new(7)]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardRegistry {
    blueprints: FxHashMap<CardId, CardDefinition>,
}

impl CardRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a blueprint. Returns `false` and keeps the earlier one if the id
    /// is taken.
    pub fn register(&mut self, card: CardDefinition) -> bool {
        if self.blueprints.contains_key(&card.id) {
            return false;
        }
        self.blueprints.insert(card.id, card);
        true
    }

    /// Add a blueprint (builder pattern).
    #[must_use]
    pub fn with(mut self, card: CardDefinition) -> Self {
        self.register(card);
        self
    }

    #[must_use]
    pub fn get(&self, id: CardId) -> Option<&CardDefinition> {
        self.blueprints.get(&id)
    }

    #[must_use]
    pub fn contains(&self, id: CardId) -> bool {
        self.blueprints.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.blueprints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blueprints.is_empty()
    }

    /// Registered ids in ascending order.
    #[must_use]
    pub fn ids(&self) -> Vec<CardId> {
        let mut ids: Vec<CardId> = self.blueprints.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Blueprints a decklist names that this pool lacks, deduplicated and
    /// sorted.
    #[must_use]
    pub fn missing_from(&self, deck: &DeckList) -> Vec<CardId> {
        let mut missing: Vec<CardId> = deck
            .main
            .iter()
            .chain(&deck.destiny)
            .copied()
            .filter(|id| !self.contains(*id))
            .collect();
        missing.sort_unstable();
        missing.dedup();
        missing
    }
}
