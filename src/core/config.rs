//! Match configuration.
//!
//! A `GameConfig` is the complete initial configuration of a match: seed,
//! seating, starting values and both players' decklists. Together with the
//! command log it is everything needed to reproduce a match, so it is the
//! first half of every reproduction dump.
//!
//! Configs are plain serde structs and can be loaded from JSON:
//!
//! ```
//! use tactics_core::core::GameConfig;
//!
//! let config = GameConfig::from_json(r#"{
//!     "seed": 7,
//!     "decks": [
//!         { "main": [1, 1, 2], "destiny": [10] },
//!         { "main": [1, 2, 2], "destiny": [] }
//!     ]
//! }"#).unwrap();
//!
//! assert_eq!(config.seed, 7);
//! assert_eq!(config.starting_health, 20);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::player::{PlayerId, PlayerMap};
use crate::cards::CardId;

/// Errors raised while loading or validating a `GameConfig`.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The JSON document did not match the config schema.
    #[error("invalid config document: {0}")]
    Parse(String),

    /// Starting health must be positive.
    #[error("starting health must be positive")]
    NonPositiveHealth,

    /// A match needs at least one minion slot per player.
    #[error("slot count must be between 1 and {max}, got {got}")]
    SlotCount { got: usize, max: usize },

    /// Mana cap of zero leaves no card but zero-cost ones playable.
    #[error("mana cap must be positive")]
    ZeroManaCap,
}

/// Maximum number of minion slots per player.
pub const MAX_SLOTS: usize = 7;

/// One player's cards, as blueprint ids.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckList {
    /// Main deck, top card last. Shuffled at setup.
    pub main: Vec<CardId>,

    /// Destiny cards, available face-up to their owner in the Destiny phase.
    #[serde(default)]
    pub destiny: Vec<CardId>,
}

impl DeckList {
    /// Create a decklist.
    pub fn new(main: Vec<CardId>, destiny: Vec<CardId>) -> Self {
        Self { main, destiny }
    }
}

/// Complete initial configuration of a match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// RNG seed. Same seed + same command log = same match.
    pub seed: u64,

    /// Player who takes the first turn. The elapsed-turn counter ticks
    /// whenever control returns to this player.
    pub first_player: PlayerId,

    /// Hero health at match start.
    pub starting_health: i64,

    /// Cards dealt to each player before the first turn.
    pub starting_hand_size: usize,

    /// Upper bound for a player's maximum mana.
    pub mana_cap: u32,

    /// Minion slots per player.
    pub slot_count: usize,

    /// Drawing from an empty deck deals increasing damage to the drawer.
    pub fatigue: bool,

    /// Per-player decklists.
    pub decks: PlayerMap<DeckList>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            first_player: PlayerId::new(0),
            starting_health: 20,
            starting_hand_size: 3,
            mana_cap: 10,
            slot_count: 5,
            fatigue: true,
            decks: PlayerMap::with_default(),
        }
    }
}

impl GameConfig {
    /// Create a config with default rules and the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the config for values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.starting_health <= 0 {
            return Err(ConfigError::NonPositiveHealth);
        }
        if self.slot_count == 0 || self.slot_count > MAX_SLOTS {
            return Err(ConfigError::SlotCount {
                got: self.slot_count,
                max: MAX_SLOTS,
            });
        }
        if self.mana_cap == 0 {
            return Err(ConfigError::ZeroManaCap);
        }
        Ok(())
    }

    /// Set a player's decklist (builder pattern).
    #[must_use]
    pub fn with_deck(mut self, player: PlayerId, deck: DeckList) -> Self {
        self.decks[player] = deck;
        self
    }

    /// Set the first player (builder pattern).
    #[must_use]
    pub fn with_first_player(mut self, player: PlayerId) -> Self {
        self.first_player = player;
        self
    }

    /// Set the starting hand size (builder pattern).
    #[must_use]
    pub fn with_starting_hand_size(mut self, size: usize) -> Self {
        self.starting_hand_size = size;
        self
    }

    /// Set the starting health (builder pattern).
    #[must_use]
    pub fn with_starting_health(mut self, health: i64) -> Self {
        self.starting_health = health;
        self
    }

    /// Set the slot count (builder pattern).
    #[must_use]
    pub fn with_slot_count(mut self, slots: usize) -> Self {
        self.slot_count = slots;
        self
    }

    /// Disable fatigue damage (builder pattern).
    #[must_use]
    pub fn without_fatigue(mut self) -> Self {
        self.fatigue = false;
        self
    }
}
