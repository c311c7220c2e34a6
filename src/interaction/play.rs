//! Playing cards and using abilities.
//!
//! ## Timing
//!
//! - With no chain open: only non-reactive cards, only in the Main phase,
//!   only by the active player.
//! - With a chain building: only reactive cards, only by the priority
//!   holder.
//!
//! Playing a card takes it out of hand into the resolving area and opens a
//! `PlayingCard` context. A zero-cost card commits immediately; otherwise the
//! owner answers with `commitPlayCard` (pays mana) or cancels (the card goes
//! back to its hand position). After commit the content's `CardPlay` is
//! sequenced: minions ask for a slot, spells go onto the chain.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::decision::{Decision, Finish};
use super::machine::{InteractionContext, InteractionState};
use super::selection::SelectionSpec;
use crate::chain::{ChainState, Effect};
use crate::core::{EntityId, PlayerId};
use crate::error::{ChainError, GameResult, InteractionError, ValidationError};
use crate::events::BoardEvent;
use crate::game::{Continuation, Game};
use crate::input::CommandKind;
use crate::phases::{MainPhase, Phase};
use crate::rules::{CardPlay, EffectPlan};
use crate::state::CardLocation;

/// A card on its way out of hand, waiting for payment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayingCard {
    pub owner: PlayerId,
    pub card: EntityId,
    /// Where the card sat in hand, for cancellation.
    pub hand_index: usize,
    pub cost: u32,
}

/// An ability waiting for payment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsingAbility {
    pub owner: PlayerId,
    pub unit: EntityId,
    pub ability: u8,
    pub cost: u32,
}

impl Game {
    pub(crate) fn play_card(&mut self, player: PlayerId, card: EntityId) -> GameResult<()> {
        self.interaction.ensure_idle()?;
        self.ensure_right_to_act(player)?;
        let instance = self
            .state
            .card(card)
            .cloned()
            .ok_or(ValidationError::UnknownEntity(card))?;
        if instance.owner != player {
            return Err(ValidationError::NotOwned { entity: card, player }.into());
        }
        if instance.location != CardLocation::Hand {
            return Err(InteractionError::NotInHand(card).into());
        }

        let content = self.content();
        let cost = content.card_cost(&self.state, &instance);
        let play = content
            .card_play(&self.state, &instance)
            .ok_or(InteractionError::NotPlayable(card))?;

        match &self.chain {
            Some(chain) => {
                if !play.is_reactive() {
                    return Err(InteractionError::NotReactive(card).into());
                }
                if chain.state() != ChainState::Building {
                    return Err(ChainError::NotBuilding.into());
                }
            }
            None => {
                if play.is_reactive() {
                    return Err(InteractionError::ReactiveOnly(card).into());
                }
                let phase = self.phases.phase();
                if phase != Phase::Main {
                    return Err(ValidationError::PhaseNotAllowed {
                        kind: CommandKind::PlayCard,
                        phase,
                    }
                    .into());
                }
            }
        }
        match &play {
            CardPlay::Minion { .. } => {
                if self.state.empty_slots(player).is_empty() {
                    return Err(InteractionError::NoFreeSlot(player).into());
                }
            }
            CardPlay::Spell { .. } => {
                if !content.can_add_effect(&self.state, player) {
                    return Err(ChainError::CannotAddEffect { player }.into());
                }
            }
        }

        let hand_index = self.state.take_from_hand(player, card)?;
        debug!(target: "tactics::interaction", %player, %card, cost, "card played");
        self.emit(BoardEvent::CardPlayed { player, card });
        self.begin_interaction(InteractionContext::PlayingCard(PlayingCard {
            owner: player,
            card,
            hand_index,
            cost,
        }))?;

        let then: Continuation = Box::new(move |g, decision| {
            if decision.is_cancelled() {
                return Ok(());
            }
            if let Ok(main) = g.phases.context_mut::<MainPhase>() {
                main.cards_played += 1;
            }
            g.sequence_card_play(player, card, play)
        });
        if cost == 0 {
            self.finish_interaction(Finish::Committed)?;
            return self.continue_with(then, Decision::Confirmed);
        }
        self.await_decision(then)
    }

    pub(crate) fn commit_play_card(&mut self, player: PlayerId) -> GameResult<()> {
        let playing = match self.interaction.context() {
            InteractionContext::PlayingCard(playing) => playing.clone(),
            other => {
                return Err(InteractionError::WrongInteraction {
                    expected: InteractionState::PlayingCard,
                    actual: other.state(),
                }
                .into())
            }
        };
        if playing.owner != player {
            return Err(InteractionError::NotOwner { player }.into());
        }
        self.pay(player, playing.cost)?;
        self.finish_interaction(Finish::Committed)?;
        self.resume(Decision::Confirmed)
    }

    pub(crate) fn use_ability(&mut self, player: PlayerId, unit: EntityId, ability: u8) -> GameResult<()> {
        self.interaction.ensure_idle()?;
        self.ensure_right_to_act(player)?;
        if self.chain.is_some() {
            return Err(ChainError::AlreadyOpen.into());
        }
        let source = self.state.unit(unit).ok_or(ValidationError::UnknownEntity(unit))?;
        if source.owner != player {
            return Err(ValidationError::NotOwned { entity: unit, player }.into());
        }
        if source.abilities_used.contains(&ability) {
            return Err(InteractionError::AbilityExhausted { unit, ability }.into());
        }
        let content = self.content();
        let usage = content
            .ability(&self.state, source, ability)
            .ok_or(InteractionError::UnknownAbility { unit, ability })?;
        if !content.can_add_effect(&self.state, player) {
            return Err(ChainError::CannotAddEffect { player }.into());
        }

        debug!(target: "tactics::interaction", %player, %unit, ability, cost = usage.cost, "ability used");
        let cost = usage.cost;
        self.begin_interaction(InteractionContext::UsingAbility(UsingAbility {
            owner: player,
            unit,
            ability,
            cost,
        }))?;

        let effect = usage.effect;
        let then: Continuation = Box::new(move |g, decision| {
            if decision.is_cancelled() {
                return Ok(());
            }
            if let Some(unit) = g.state.unit_mut(unit) {
                unit.abilities_used.push(ability);
            }
            g.sequence_effect(player, unit, effect)
        });
        if cost == 0 {
            self.finish_interaction(Finish::Committed)?;
            return self.continue_with(then, Decision::Confirmed);
        }
        self.await_decision(then)
    }

    pub(crate) fn commit_ability(&mut self, player: PlayerId) -> GameResult<()> {
        let using = match self.interaction.context() {
            InteractionContext::UsingAbility(using) => using.clone(),
            other => {
                return Err(InteractionError::WrongInteraction {
                    expected: InteractionState::UsingAbility,
                    actual: other.state(),
                }
                .into())
            }
        };
        if using.owner != player {
            return Err(InteractionError::NotOwner { player }.into());
        }
        self.pay(player, using.cost)?;
        self.finish_interaction(Finish::Committed)?;
        self.resume(Decision::Confirmed)
    }

    fn pay(&mut self, player: PlayerId, cost: u32) -> GameResult<()> {
        self.state.spend_mana(player, cost)?;
        if cost > 0 {
            self.emit(BoardEvent::ManaSpent { player, amount: cost });
        }
        Ok(())
    }

    /// Carry out a committed card play.
    fn sequence_card_play(&mut self, player: PlayerId, card: EntityId, play: CardPlay) -> GameResult<()> {
        match play {
            CardPlay::Minion { attack, health } => {
                self.schedule(move |g| {
                    let spec = SelectionSpec::new(g.state.empty_slots(player))
                        .eligible(|state, _, slot| state.is_slot_empty(*slot))
                        .exactly(1);
                    g.start_selecting_minion_slot(player, spec, move |g, decision| match decision.slot() {
                        Some(slot) => g.summon(card, slot, attack, health),
                        None => g.state.move_card(card, CardLocation::Discard),
                    })
                });
                Ok(())
            }
            CardPlay::Spell { effect, .. } => self.sequence_effect(player, card, effect),
        }
    }

    /// Put an effect on the chain, choosing its targets first if it has any.
    ///
    /// An effect whose targeting is cancelled or impossible fizzles; its
    /// source card, if still resolving, is discarded.
    pub fn sequence_effect(&mut self, player: PlayerId, source: EntityId, plan: EffectPlan) -> GameResult<()> {
        let EffectPlan { targeting, handler } = plan;
        match targeting {
            None => self.push_effect(player, Effect::new(source, player, handler)),
            Some(spec) => self.start_selecting_cards_on_board(player, spec, move |g, decision| match decision {
                Decision::Entities(targets) => g.push_effect(player, Effect::new(source, player, handler).with_targets(targets)),
                _ => {
                    debug!(target: "tactics::interaction", %source, "effect fizzled");
                    g.discard_if_resolving(source)
                }
            }),
        }
    }
}
