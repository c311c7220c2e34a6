//! # tactics-core
//!
//! Orchestration core for a two-player, turn-based tactics card game.
//!
//! ## Design Principles
//!
//! 1. **Commands In, Snapshots Out**: Clients submit JSON commands; after
//!    every flush the game publishes a snapshot and the events it produced.
//!    Nothing else mutates a match.
//!
//! 2. **Content Is Pluggable**: Card costs, plays, abilities and combat
//!    damage come from a `ContentRules` implementation. The core only
//!    sequences them.
//!
//! 3. **Deterministic**: Same `GameConfig` + same command log = same match,
//!    down to the digest of the final state.
//!
//! ## Architecture
//!
//! - **Scheduler**: internal follow-up work runs before the next external
//!   command. An interaction waiting on a player suspends both queues.
//!
//! - **Checkpoints**: The board is built on `im-rs` persistent structures,
//!   so every command is checkpointed in O(1) and rolled back on a
//!   validation error.
//!
//! - **Severity**: Validation errors roll back and resync. Invariant
//!   errors halt the match and log a reproduction dump.
//!
//! ## Modules
//!
//! - `core`: Entity ids, players, RNG, match configuration
//! - `cards`: Card blueprints and registry
//! - `state`: Board state, card locations and units
//! - `events`: Game events and the topic-based event bus
//! - `input`: Commands, command log and the scheduler
//! - `phases`: Turn phases and the combat sub-machine
//! - `interaction`: Player decisions: plays, selections, choices
//! - `chain`: The effect chain and its resolution
//! - `rules`: The `ContentRules` trait
//! - `game`: The `Game` facade, snapshots and replay
//! - `games`: Card pools (the `skirmish` demo pool)

pub mod core;
pub mod cards;
pub mod state;
pub mod error;
pub mod events;
pub mod input;
pub mod phases;
pub mod interaction;
pub mod chain;
pub mod rules;
pub mod game;
pub mod games;

// Re-export commonly used types
pub use crate::core::{DeckList, EntityId, GameConfig, GameRng, GameRngState, PlayerId, PlayerMap};

pub use crate::cards::{Affinity, CardDefinition, CardId, CardKind, CardRegistry};

pub use crate::state::{CardInstance, CardLocation, GameState, SlotRef, Unit};

pub use crate::error::{ErrorReport, ErrorSeverity, GameError, GameResult};

pub use crate::events::{EventBus, GameEvent, Topic};

pub use crate::input::{Command, CommandKind, CommandLog, LoggedCommand, RawCommand, ReproductionDump};

pub use crate::phases::{CombatStep, EndReason, GameOutcome, Phase};

pub use crate::interaction::{Decision, InteractionState, SelectionSpec};

pub use crate::chain::{ChainState, Effect};

pub use crate::rules::{CardPlay, ContentRules, EffectPlan};

pub use crate::game::{Dispatch, Game, Snapshot, StateView};
