//! Choices from an explicit option list: cards and affinities.

use serde::{Deserialize, Serialize};

use super::decision::{Decision, Finish};
use super::machine::{InteractionContext, InteractionState};
use crate::cards::Affinity;
use crate::core::{EntityId, PlayerId};
use crate::error::{GameResult, InteractionError};
use crate::game::Game;

/// Choose between `min` and `max` of the offered cards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardChoice {
    pub owner: PlayerId,
    pub options: Vec<EntityId>,
    pub min: usize,
    pub max: usize,
    pub cancellable: bool,
}

/// Choose one affinity. Mandatory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffinityChoice {
    pub owner: PlayerId,
    pub options: Vec<Affinity>,
}

impl CardChoice {
    fn validate(&self, cards: &[EntityId]) -> Result<(), InteractionError> {
        if cards.len() < self.min || cards.len() > self.max {
            return Err(InteractionError::InvalidChoice(format!(
                "expected {} to {} cards, got {}",
                self.min,
                self.max,
                cards.len()
            )));
        }
        for (i, card) in cards.iter().enumerate() {
            if !self.options.contains(card) {
                return Err(InteractionError::InvalidChoice(format!("{card} was not offered")));
            }
            if cards[..i].contains(card) {
                return Err(InteractionError::InvalidChoice(format!("{card} chosen twice")));
            }
        }
        Ok(())
    }
}

impl Game {
    /// Ask `player` to choose `min..=max` of `options`.
    ///
    /// Cancels by itself when fewer than `min` options exist, and commits an
    /// empty choice by itself when `max` is zero.
    pub fn start_choosing_cards(
        &mut self,
        player: PlayerId,
        options: Vec<EntityId>,
        min: usize,
        max: usize,
        then: impl FnOnce(&mut Game, Decision) -> GameResult<()> + 'static,
    ) -> GameResult<()> {
        self.interaction.ensure_idle()?;
        self.ensure_right_to_act(player)?;

        let impossible = options.len() < min;
        let trivial = max == 0;
        self.begin_interaction(InteractionContext::ChoosingCards(CardChoice {
            owner: player,
            options,
            min,
            max: max.max(min),
            cancellable: true,
        }))?;

        if impossible {
            self.finish_interaction(Finish::Cancelled)?;
            return self.continue_with(Box::new(then), Decision::Cancelled);
        }
        if trivial {
            self.finish_interaction(Finish::Committed)?;
            return self.continue_with(Box::new(then), Decision::Entities(Default::default()));
        }
        self.await_decision(Box::new(then))
    }

    pub(crate) fn choose_cards(&mut self, player: PlayerId, cards: &[EntityId]) -> GameResult<()> {
        let choice = match self.interaction.context() {
            InteractionContext::ChoosingCards(choice) => choice,
            other => {
                return Err(InteractionError::WrongInteraction {
                    expected: InteractionState::ChoosingCards,
                    actual: other.state(),
                }
                .into())
            }
        };
        if choice.owner != player {
            return Err(InteractionError::NotOwner { player }.into());
        }
        choice.validate(cards)?;

        self.finish_interaction(Finish::Committed)?;
        self.resume(Decision::Entities(cards.iter().copied().collect()))
    }

    /// Ask `player` to choose one of `options`.
    ///
    /// No options cancels by itself; a single option is chosen by itself.
    pub fn start_choosing_affinity(
        &mut self,
        player: PlayerId,
        options: Vec<Affinity>,
        then: impl FnOnce(&mut Game, Decision) -> GameResult<()> + 'static,
    ) -> GameResult<()> {
        self.interaction.ensure_idle()?;
        self.ensure_right_to_act(player)?;

        let only = match options.as_slice() {
            [only] => Some(*only),
            _ => None,
        };
        let impossible = options.is_empty();
        self.begin_interaction(InteractionContext::ChoosingAffinity(AffinityChoice {
            owner: player,
            options,
        }))?;

        if impossible {
            self.finish_interaction(Finish::Cancelled)?;
            return self.continue_with(Box::new(then), Decision::Cancelled);
        }
        if let Some(affinity) = only {
            self.finish_interaction(Finish::Committed)?;
            return self.continue_with(Box::new(then), Decision::Affinity(affinity));
        }
        self.await_decision(Box::new(then))
    }

    pub(crate) fn choose_affinity(&mut self, player: PlayerId, affinity: Affinity) -> GameResult<()> {
        let choice = match self.interaction.context() {
            InteractionContext::ChoosingAffinity(choice) => choice,
            other => {
                return Err(InteractionError::WrongInteraction {
                    expected: InteractionState::ChoosingAffinity,
                    actual: other.state(),
                }
                .into())
            }
        };
        if choice.owner != player {
            return Err(InteractionError::NotOwner { player }.into());
        }
        if !choice.options.contains(&affinity) {
            return Err(InteractionError::InvalidChoice(format!("{affinity} was not offered")).into());
        }

        self.finish_interaction(Finish::Committed)?;
        self.resume(Decision::Affinity(affinity))
    }
}
