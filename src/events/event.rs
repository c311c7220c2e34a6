//! Typed events, one enum per category.
//!
//! Each category has its own channel on the `EventBus`; `GameEvent` wraps
//! them for the aggregated `any` channel and the snapshot buffer.

use serde::{Deserialize, Serialize};

use crate::cards::Affinity;
use crate::chain::ChainState;
use crate::core::{EntityId, PlayerId};
use crate::error::ErrorReport;
use crate::input::{CommandId, CommandKind, ReproductionDump};
use crate::interaction::InteractionState;
use crate::phases::{CombatStep, GameOutcome, Phase};
use crate::rules::DamageReport;
use crate::state::SlotRef;

/// Event categories, one channel each.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    Command,
    Phase,
    Combat,
    Interaction,
    Chain,
    Board,
}

/// Scheduler lifecycle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CommandEvent {
    Started {
        id: CommandId,
        issuer: PlayerId,
        kind: CommandKind,
    },
    Finished {
        id: CommandId,
        kind: CommandKind,
    },
    /// The job queue drained and a snapshot was taken.
    QueueFlushed { sequence: u64 },
    /// A command was rejected and rolled back. Clients should reload the
    /// snapshot with this sequence number.
    Resync { error: ErrorReport, sequence: u64 },
    /// The simulation halted.
    Fatal { dump: ReproductionDump },
}

/// Phase machine transitions and turn bookkeeping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PhaseEvent {
    BeforeChange {
        from: Phase,
        to: Phase,
    },
    /// `context` is the freshly constructed controller, serialized.
    AfterChange {
        from: Phase,
        to: Phase,
        context: serde_json::Value,
    },
    TurnEnded {
        player: PlayerId,
        turn: u32,
    },
    GameEnded(GameOutcome),
}

/// Combat sub-machine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatEvent {
    BeforeStep(CombatStep),
    AfterStep(CombatStep),
    Cancelled { attacker: Option<EntityId> },
    DamageDealt(DamageReport),
}

/// Interaction machine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionEvent {
    Started {
        state: InteractionState,
        owner: PlayerId,
    },
    Selected {
        state: InteractionState,
        owner: PlayerId,
        count: usize,
    },
    Committed {
        state: InteractionState,
        owner: PlayerId,
    },
    Cancelled {
        state: InteractionState,
        owner: PlayerId,
    },
}

/// Effect chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainEvent {
    Opened {
        priority: PlayerId,
    },
    EffectAdded {
        source: EntityId,
        controller: PlayerId,
        depth: usize,
    },
    Passed {
        player: PlayerId,
        passes: u8,
    },
    StateChanged(ChainState),
    EffectResolved {
        source: EntityId,
        remaining: usize,
    },
}

/// Board mutations worth telling clients about.
///
/// Carries no hidden information: draws name the drawer, not the card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardEvent {
    CardDrawn { player: PlayerId },
    Fatigue { player: PlayerId, damage: i64 },
    ManaRefilled { player: PlayerId, mana: u32 },
    ManaSpent { player: PlayerId, amount: u32 },
    AffinityGained { player: PlayerId, affinity: Affinity },
    Summoned { unit: EntityId, slot: SlotRef },
    Damaged { source: EntityId, target: EntityId, amount: i64, remaining: i64 },
    CardPlayed { player: PlayerId, card: EntityId },
}

/// Any event, as delivered on the aggregated channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Command(CommandEvent),
    Phase(PhaseEvent),
    Combat(CombatEvent),
    Interaction(InteractionEvent),
    Chain(ChainEvent),
    Board(BoardEvent),
}

impl GameEvent {
    /// Channel this event is routed to.
    pub fn topic(&self) -> Topic {
        match self {
            GameEvent::Command(_) => Topic::Command,
            GameEvent::Phase(_) => Topic::Phase,
            GameEvent::Combat(_) => Topic::Combat,
            GameEvent::Interaction(_) => Topic::Interaction,
            GameEvent::Chain(_) => Topic::Chain,
            GameEvent::Board(_) => Topic::Board,
        }
    }
}

macro_rules! impl_from_category {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for GameEvent {
                fn from(event: $ty) -> Self {
                    GameEvent::$variant(event)
                }
            }
        )*
    };
}

impl_from_category!(
    Command(CommandEvent),
    Phase(PhaseEvent),
    Combat(CombatEvent),
    Interaction(InteractionEvent),
    Chain(ChainEvent),
    Board(BoardEvent),
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_routing() {
        let event: GameEvent = ChainEvent::Opened {
            priority: PlayerId::new(0),
        }
        .into();
        assert_eq!(event.topic(), Topic::Chain);

        let event: GameEvent = BoardEvent::CardDrawn {
            player: PlayerId::new(1),
        }
        .into();
        assert_eq!(event.topic(), Topic::Board);
    }

    #[test]
    fn test_event_serialization() {
        let event: GameEvent = PhaseEvent::BeforeChange {
            from: Phase::Main,
            to: Phase::Attack,
        }
        .into();
        let json = serde_json::to_string(&event).unwrap();
        let back: GameEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }
}
