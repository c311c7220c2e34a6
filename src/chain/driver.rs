//! Driving the effect chain from the game.
//!
//! Resolution runs one effect per scheduled task. A handler that opens an
//! interaction suspends the scheduler; the next resolution step is already
//! queued behind the pause and continues once the decision is answered.

use tracing::trace;

use super::{ChainState, Effect, EffectChain, PassOutcome};
use crate::core::{EntityId, PlayerId};
use crate::error::{ChainError, GameResult, InvariantError};
use crate::events::ChainEvent;
use crate::game::{EffectHandler, Game};
use crate::state::CardLocation;

impl Game {
    /// Add an effect to the chain, opening one with `player` holding
    /// priority if none is open.
    pub fn push_effect(&mut self, player: PlayerId, effect: Effect<EffectHandler>) -> GameResult<()> {
        if !self.content.can_add_effect(&self.state, player) {
            return Err(ChainError::CannotAddEffect { player }.into());
        }
        if self.chain.is_none() {
            self.chain = Some(EffectChain::new(player));
            self.emit(ChainEvent::Opened { priority: player });
        }
        let chain = self.chain.as_mut().ok_or(InvariantError::ChainMissing)?;
        let (source, controller) = (effect.source, effect.controller);
        let depth = chain.add_effect(player, effect)?;
        trace!(target: "tactics::chain", %source, %controller, depth, "effect added");
        self.emit(ChainEvent::EffectAdded {
            source,
            controller,
            depth,
        });
        Ok(())
    }

    /// Pass priority. The second consecutive pass starts resolution.
    pub(crate) fn pass(&mut self, player: PlayerId) -> GameResult<()> {
        let chain = self.chain.as_mut().ok_or(ChainError::NoOngoingChain)?;
        let outcome = chain.pass(player)?;
        let passes = chain.consecutive_passes();
        self.emit(ChainEvent::Passed { player, passes });

        if outcome == PassOutcome::Resolve {
            trace!(target: "tactics::chain", "chain resolving");
            self.emit(ChainEvent::StateChanged(ChainState::Resolving));
            self.schedule(|g| g.resolve_next_effect());
        }
        Ok(())
    }

    /// Resolve the top effect, or finish the chain when the stack is empty.
    pub(crate) fn resolve_next_effect(&mut self) -> GameResult<()> {
        if self.is_over() {
            return Ok(());
        }
        let chain = self.chain.as_mut().ok_or(InvariantError::ChainMissing)?;

        if let Some(effect) = chain.pop_resolving() {
            let remaining = chain.len();
            let Effect {
                source,
                targets,
                handler,
                ..
            } = effect;
            trace!(target: "tactics::chain", %source, ?targets, remaining, "resolving effect");

            handler(self, &targets)?;
            self.discard_if_resolving(source)?;
            self.emit(ChainEvent::EffectResolved { source, remaining });

            if !self.check_lethal()? {
                self.schedule(|g| g.resolve_next_effect());
            }
            return Ok(());
        }

        let completion = chain.finish();
        self.chain = None;
        self.emit(ChainEvent::StateChanged(ChainState::Finished));
        match completion {
            Some(done) => done(self, &[]),
            None => Ok(()),
        }
    }

    /// Move a played card out of the resolving area once it is spent.
    pub(crate) fn discard_if_resolving(&mut self, card: EntityId) -> GameResult<()> {
        let resolving = self
            .state
            .card(card)
            .is_some_and(|c| c.location == CardLocation::Resolving);
        if resolving {
            self.state.move_card(card, CardLocation::Discard)?;
        }
        Ok(())
    }
}
