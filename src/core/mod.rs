//! Core types: entities, players, RNG, configuration.
//!
//! These are the building blocks every other module depends on. Nothing in
//! here knows about phases, interactions or the effect chain.

pub mod entity;
pub mod player;
pub mod rng;
pub mod config;

pub use entity::EntityId;
pub use player::{PlayerId, PlayerMap, PLAYER_COUNT};
pub use rng::{GameRng, GameRngState};
pub use config::{ConfigError, DeckList, GameConfig, MAX_SLOTS};
