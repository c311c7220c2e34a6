//! Skirmish: a ten-card demo pool.
//!
//! - Minions: Squire, Ember Drake (with the targeted "Breathe" ability), Wisp
//! - Spells: Bolt, Forked Lightning, Scout, and the reactive Parry
//! - Destiny: Barren Shrine, Ember Shrine, Crossroads
//!
//! Used by the integration tests, the replay benchmark and the doctests.

mod cards;
mod game;

pub use cards::{
    demo_config, registry, starter_deck, BARREN_SHRINE, BOLT, CROSSROADS, EMBER_DRAKE, EMBER_SHRINE,
    FORKED_LIGHTNING, PARRY, SCOUT, SQUIRE, WISP,
};
pub use game::Skirmish;
