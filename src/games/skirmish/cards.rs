//! Skirmish card list and starter decks.

use crate::cards::{Affinity, CardDefinition, CardId, CardRegistry};
use crate::core::{DeckList, GameConfig, PlayerId};

pub const SQUIRE: CardId = CardId::new(1);
pub const EMBER_DRAKE: CardId = CardId::new(2);
pub const WISP: CardId = CardId::new(3);

pub const BOLT: CardId = CardId::new(10);
pub const PARRY: CardId = CardId::new(11);
pub const FORKED_LIGHTNING: CardId = CardId::new(12);
pub const SCOUT: CardId = CardId::new(13);

pub const BARREN_SHRINE: CardId = CardId::new(20);
pub const EMBER_SHRINE: CardId = CardId::new(21);
pub const CROSSROADS: CardId = CardId::new(22);

/// Every Skirmish card.
#[must_use]
pub fn registry() -> CardRegistry {
    CardRegistry::new()
        .with(CardDefinition::minion(SQUIRE, "Squire", 1, 1, 2))
        .with(
            CardDefinition::minion(EMBER_DRAKE, "Ember Drake", 3, 3, 2)
                .with_affinity(Affinity::Fire)
                .with_ability("Breathe", 1),
        )
        .with(CardDefinition::minion(WISP, "Wisp", 0, 1, 1))
        .with(CardDefinition::spell(BOLT, "Bolt", 1).with_affinity(Affinity::Fire))
        .with(CardDefinition::spell(PARRY, "Parry", 1).reactive())
        .with(CardDefinition::spell(FORKED_LIGHTNING, "Forked Lightning", 2).with_affinity(Affinity::Air))
        .with(CardDefinition::spell(SCOUT, "Scout", 1))
        .with(CardDefinition::destiny(BARREN_SHRINE, "Barren Shrine"))
        .with(CardDefinition::destiny(EMBER_SHRINE, "Ember Shrine").with_affinity(Affinity::Fire))
        .with(
            CardDefinition::destiny(CROSSROADS, "Crossroads")
                .with_affinity(Affinity::Fire)
                .with_affinity(Affinity::Water),
        )
}

/// A balanced twenty-card deck with four destiny cards.
#[must_use]
pub fn starter_deck() -> DeckList {
    let mut main = Vec::with_capacity(20);
    main.extend([SQUIRE; 4]);
    main.extend([EMBER_DRAKE; 2]);
    main.extend([WISP; 3]);
    main.extend([BOLT; 4]);
    main.extend([PARRY; 3]);
    main.extend([FORKED_LIGHTNING; 2]);
    main.extend([SCOUT; 2]);
    DeckList::new(main, vec![BARREN_SHRINE, EMBER_SHRINE, EMBER_SHRINE, CROSSROADS])
}

/// Both players on the starter deck.
#[must_use]
pub fn demo_config(seed: u64) -> GameConfig {
    GameConfig::new(seed)
        .with_deck(PlayerId::new(0), starter_deck())
        .with_deck(PlayerId::new(1), starter_deck())
}
