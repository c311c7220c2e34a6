//! Snapshots and per-player redaction.
//!
//! A snapshot is taken at the end of every flush (and after every resync).
//! It carries the full state view plus the events published since the
//! previous snapshot. Before it leaves the authority it is redacted for the
//! receiving player:
//!
//! - both decks are reduced to their size
//! - the opponent's hand and destiny zone are reduced to their size
//! - card instances the viewer cannot see are dropped
//! - the RNG position is stripped

use im::OrdMap;
use serde::{Deserialize, Serialize};

use super::Game;
use crate::cards::Affinity;
use crate::chain::ChainView;
use crate::core::{EntityId, GameRngState, PlayerId, PlayerMap};
use crate::error::{GameResult, InvariantError};
use crate::events::GameEvent;
use crate::interaction::InteractionState;
use crate::phases::{GameOutcome, PhaseController};
use crate::state::{CardInstance, PlayerBoard, Unit};

/// A card zone as one player sees it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoneView {
    Visible(Vec<EntityId>),
    Hidden { count: usize },
}

impl ZoneView {
    /// Number of cards in the zone.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            ZoneView::Visible(cards) => cards.len(),
            ZoneView::Hidden { count } => *count,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn hide(&mut self) {
        *self = ZoneView::Hidden { count: self.len() };
    }
}

/// One player's board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub health: i64,
    pub mana: u32,
    pub max_mana: u32,
    pub affinities: Vec<Affinity>,
    pub fatigue: i64,
    pub hand: ZoneView,
    pub deck: ZoneView,
    pub destiny: ZoneView,
    pub resources: Vec<EntityId>,
    pub discard: Vec<EntityId>,
    pub slots: Vec<Option<EntityId>>,
}

impl From<&PlayerBoard> for PlayerView {
    fn from(board: &PlayerBoard) -> Self {
        Self {
            health: board.health,
            mana: board.mana,
            max_mana: board.max_mana,
            affinities: board.affinities.iter().copied().collect(),
            fatigue: board.fatigue,
            hand: ZoneView::Visible(board.hand.iter().copied().collect()),
            deck: ZoneView::Visible(board.deck.iter().copied().collect()),
            destiny: ZoneView::Visible(board.destiny.iter().copied().collect()),
            resources: board.resources.iter().copied().collect(),
            discard: board.discard.iter().copied().collect(),
            slots: board.slots.iter().copied().collect(),
        }
    }
}

/// Serializable view of the whole game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateView {
    pub turn: u32,
    /// Live phase controller, including its per-phase context.
    pub phase: PhaseController,
    pub current_player: PlayerId,
    pub first_player: PlayerId,
    pub interaction: InteractionState,
    /// Player who must answer the pending decision.
    pub decision_owner: Option<PlayerId>,
    pub chain: Option<ChainView>,
    pub outcome: Option<GameOutcome>,
    pub players: PlayerMap<PlayerView>,
    pub cards: OrdMap<EntityId, CardInstance>,
    pub units: OrdMap<EntityId, Unit>,
    /// Stripped from redacted views.
    pub rng: Option<GameRngState>,
}

impl StateView {
    /// Copy of this view with everything `viewer` may not see removed.
    #[must_use]
    pub fn redacted_for(&self, viewer: PlayerId) -> StateView {
        let mut view = self.clone();
        for (player, board) in view.players.iter_mut() {
            board.deck.hide();
            if player != viewer {
                board.hand.hide();
                board.destiny.hide();
            }
        }
        view.cards = self
            .cards
            .iter()
            .filter(|(_, card)| card.location.visibility().visible_to(card.owner, viewer))
            .map(|(id, card)| (*id, card.clone()))
            .collect();
        view.rng = None;
        view
    }
}

/// Snapshot published after a flush.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Monotonic. Resync events name the sequence to reload.
    pub sequence: u64,
    /// Length of the command log when the snapshot was taken.
    pub command_count: usize,
    pub state: StateView,
    /// Events published since the previous snapshot.
    pub events: Vec<GameEvent>,
}

impl Snapshot {
    /// Copy of this snapshot fit to send to `viewer`.
    #[must_use]
    pub fn redacted_for(&self, viewer: PlayerId) -> Snapshot {
        Snapshot {
            sequence: self.sequence,
            command_count: self.command_count,
            state: self.state.redacted_for(viewer),
            events: self.events.clone(),
        }
    }
}

impl Game {
    /// Unredacted view of the current state.
    #[must_use]
    pub fn view(&self) -> StateView {
        StateView {
            turn: self.phases.turn(),
            phase: self.phases.controller().clone(),
            current_player: self.phases.current_player(),
            first_player: self.phases.first_player(),
            interaction: self.interaction.state(),
            decision_owner: self.scheduler.pending().map(|(_, owner)| owner),
            chain: self.chain_view(),
            outcome: self.outcome.clone(),
            players: self.state.players.map(|_, board| PlayerView::from(board)),
            cards: self.state.cards().clone(),
            units: self.state.units().clone(),
            rng: Some(self.rng.position()),
        }
    }

    /// Bincode encoding of the full view. Two games in the same state
    /// produce identical bytes.
    pub fn state_digest(&self) -> GameResult<Vec<u8>> {
        bincode::serialize(&self.view())
            .map_err(|e| InvariantError::Corrupted(format!("state digest failed: {e}")).into())
    }

    pub(crate) fn next_snapshot_sequence(&self) -> u64 {
        self.snapshot_sequence + 1
    }

    /// Capture a snapshot, consuming the buffered events.
    pub(crate) fn take_snapshot(&mut self) -> u64 {
        self.snapshot_sequence += 1;
        self.snapshot = Some(Snapshot {
            sequence: self.snapshot_sequence,
            command_count: self.log.len(),
            state: self.view(),
            events: self.events.drain(),
        });
        self.snapshot_sequence
    }
}
