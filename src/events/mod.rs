//! Event stream: typed per-category channels and an aggregated channel.
//!
//! ## Key Types
//!
//! - `EventBus`: owns the channels and the since-last-snapshot buffer
//! - `GameEvent`: any event; wraps the per-category enums
//! - `Topic`: channel identifier

pub mod bus;
pub mod event;

pub use bus::{Channel, EventBus, Subscriber};
pub use event::{
    BoardEvent, ChainEvent, CombatEvent, CommandEvent, GameEvent, InteractionEvent, PhaseEvent, Topic,
};
