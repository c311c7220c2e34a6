//! Decisions, right to act, and resuming suspended work.

use smallvec::SmallVec;
use tracing::trace;

use super::machine::{InteractionContext, InteractionState};
use crate::cards::Affinity;
use crate::chain::{ChainState, Targets};
use crate::core::{EntityId, PlayerId};
use crate::error::{ChainError, GameError, GameResult, InteractionError, InvariantError, ValidationError};
use crate::events::InteractionEvent;
use crate::game::{Continuation, Game};
use crate::state::SlotRef;

/// The answer handed to a continuation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    /// A play or ability was paid for.
    Confirmed,
    /// Selected board entities or chosen cards.
    Entities(Targets),
    Slots(SmallVec<[SlotRef; 2]>),
    Affinity(Affinity),
    Cancelled,
}

impl Decision {
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Decision::Cancelled)
    }

    /// Chosen entities. Empty for other decisions.
    #[must_use]
    pub fn entities(&self) -> &[EntityId] {
        match self {
            Decision::Entities(entities) => entities,
            _ => &[],
        }
    }

    /// First chosen slot.
    #[must_use]
    pub fn slot(&self) -> Option<SlotRef> {
        match self {
            Decision::Slots(slots) => slots.first().copied(),
            _ => None,
        }
    }
}

/// How a finished interaction ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Finish {
    Committed,
    Cancelled,
}

impl Game {
    /// Player who may act right now.
    ///
    /// With a chain building, the priority holder. With a chain resolving,
    /// the controller of the resolving effect. Otherwise the player whose
    /// turn it is.
    #[must_use]
    pub fn right_to_act(&self) -> PlayerId {
        match &self.chain {
            Some(chain) if chain.state() == ChainState::Building => chain.current_player(),
            Some(chain) => chain
                .resolving_controller()
                .unwrap_or_else(|| self.phases.current_player()),
            None => self.phases.current_player(),
        }
    }

    pub(crate) fn ensure_right_to_act(&self, player: PlayerId) -> GameResult<()> {
        if self.right_to_act() == player {
            return Ok(());
        }
        Err(match &self.chain {
            Some(chain) if chain.state() == ChainState::Building => ChainError::NoPriority { player }.into(),
            Some(_) => InteractionError::NoRightToAct { player }.into(),
            None => ValidationError::NotActivePlayer { player }.into(),
        })
    }

    pub(crate) fn ensure_current_player(&self, player: PlayerId) -> GameResult<()> {
        if self.phases.current_player() != player {
            return Err(ValidationError::NotActivePlayer { player }.into());
        }
        Ok(())
    }

    /// Install a context and announce it.
    pub(crate) fn begin_interaction(&mut self, context: InteractionContext) -> GameResult<()> {
        let state = context.state();
        let owner = context
            .owner()
            .ok_or_else(|| Game::corrupted("interaction context without an owner"))?;
        self.interaction.begin(context)?;
        trace!(target: "tactics::interaction", %state, %owner, "interaction started");
        self.emit(InteractionEvent::Started { state, owner });
        Ok(())
    }

    /// Return to `Idle` and announce how the context ended.
    pub(crate) fn finish_interaction(&mut self, how: Finish) -> GameResult<InteractionContext> {
        let context = self.interaction.finish()?;
        let state = context.state();
        let owner = context
            .owner()
            .ok_or_else(|| Game::corrupted("interaction context without an owner"))?;
        trace!(target: "tactics::interaction", %state, %owner, ?how, "interaction finished");
        self.emit(match how {
            Finish::Committed => InteractionEvent::Committed { state, owner },
            Finish::Cancelled => InteractionEvent::Cancelled { state, owner },
        });
        Ok(context)
    }

    /// Suspend the scheduler until the live interaction is answered.
    pub(crate) fn await_decision(&mut self, then: Continuation) -> GameResult<()> {
        let state = self.interaction.state();
        let owner = self
            .interaction
            .owner()
            .ok_or_else(|| Game::corrupted("suspending without an interaction"))?;
        self.scheduler.suspend(state, owner, then)?;
        Ok(())
    }

    /// Hand a decision to the suspended continuation.
    pub(crate) fn resume(&mut self, decision: Decision) -> GameResult<()> {
        let pause = self.scheduler.take_pause().ok_or(InvariantError::NoPendingPause)?;
        self.continue_with(pause.continuation, decision)
    }

    /// Run a continuation. Its failures are engine faults.
    pub(crate) fn continue_with(&mut self, then: Continuation, decision: Decision) -> GameResult<()> {
        then(self, decision).map_err(GameError::escalate)
    }

    /// Back out of the live interaction.
    pub(crate) fn cancel_interaction(&mut self, player: PlayerId) -> GameResult<()> {
        let context = self.interaction.context();
        if context.state() == InteractionState::Idle {
            return Err(InteractionError::NotCancellable.into());
        }
        if context.owner() != Some(player) {
            return Err(InteractionError::NotOwner { player }.into());
        }
        if !context.cancellable() {
            return Err(InteractionError::NotCancellable.into());
        }

        if let InteractionContext::PlayingCard(playing) = self.finish_interaction(Finish::Cancelled)? {
            self.state.return_to_hand(playing.card, playing.hand_index)?;
        }
        self.resume(Decision::Cancelled)
    }
}
