//! Interaction states and the machine that owns the live context.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::choice::{AffinityChoice, CardChoice};
use super::play::{PlayingCard, UsingAbility};
use super::selection::Selection;
use crate::core::{EntityId, PlayerId};
use crate::error::{InteractionError, InvariantError};
use crate::input::CommandKind;
use crate::state::SlotRef;

/// Interaction state tag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum InteractionState {
    #[default]
    Idle,
    SelectingCardsOnBoard,
    SelectingMinionSlot,
    ChoosingCards,
    ChoosingAffinity,
    PlayingCard,
    UsingAbility,
}

impl InteractionState {
    #[must_use]
    pub fn is_idle(self) -> bool {
        self == InteractionState::Idle
    }

    /// Check if a command kind answers a decision in this state.
    ///
    /// `surrender` is accepted everywhere and is not listed here.
    #[must_use]
    pub fn accepts(self, kind: CommandKind) -> bool {
        use CommandKind as K;
        match self {
            InteractionState::Idle => false,
            InteractionState::SelectingCardsOnBoard => {
                matches!(kind, K::SelectCardOnBoard | K::CommitSelection | K::CancelInteraction)
            }
            InteractionState::SelectingMinionSlot => {
                matches!(kind, K::SelectMinionSlot | K::CommitSelection | K::CancelInteraction)
            }
            InteractionState::ChoosingCards => matches!(kind, K::ChooseCards | K::CancelInteraction),
            InteractionState::ChoosingAffinity => matches!(kind, K::ChooseAffinity | K::CancelInteraction),
            InteractionState::PlayingCard => matches!(kind, K::CommitPlayCard | K::CancelInteraction),
            InteractionState::UsingAbility => matches!(kind, K::CommitAbility | K::CancelInteraction),
        }
    }
}

/// The live interaction and its data.
#[derive(Debug, Default)]
pub enum InteractionContext {
    #[default]
    Idle,
    SelectingCardsOnBoard(Selection<EntityId>),
    SelectingMinionSlot(Selection<SlotRef>),
    ChoosingCards(CardChoice),
    ChoosingAffinity(AffinityChoice),
    PlayingCard(PlayingCard),
    UsingAbility(UsingAbility),
}

impl InteractionContext {
    /// The state tag.
    #[must_use]
    pub fn state(&self) -> InteractionState {
        match self {
            InteractionContext::Idle => InteractionState::Idle,
            InteractionContext::SelectingCardsOnBoard(_) => InteractionState::SelectingCardsOnBoard,
            InteractionContext::SelectingMinionSlot(_) => InteractionState::SelectingMinionSlot,
            InteractionContext::ChoosingCards(_) => InteractionState::ChoosingCards,
            InteractionContext::ChoosingAffinity(_) => InteractionState::ChoosingAffinity,
            InteractionContext::PlayingCard(_) => InteractionState::PlayingCard,
            InteractionContext::UsingAbility(_) => InteractionState::UsingAbility,
        }
    }

    /// Player who must answer.
    #[must_use]
    pub fn owner(&self) -> Option<PlayerId> {
        match self {
            InteractionContext::Idle => None,
            InteractionContext::SelectingCardsOnBoard(s) => Some(s.owner()),
            InteractionContext::SelectingMinionSlot(s) => Some(s.owner()),
            InteractionContext::ChoosingCards(c) => Some(c.owner),
            InteractionContext::ChoosingAffinity(c) => Some(c.owner),
            InteractionContext::PlayingCard(p) => Some(p.owner),
            InteractionContext::UsingAbility(u) => Some(u.owner),
        }
    }

    /// Check if the owner may back out.
    #[must_use]
    pub fn cancellable(&self) -> bool {
        match self {
            InteractionContext::Idle => false,
            InteractionContext::SelectingCardsOnBoard(s) => s.cancellable(),
            InteractionContext::SelectingMinionSlot(s) => s.cancellable(),
            InteractionContext::ChoosingCards(c) => c.cancellable,
            InteractionContext::ChoosingAffinity(_) => false,
            InteractionContext::PlayingCard(_) | InteractionContext::UsingAbility(_) => true,
        }
    }
}

/// Owner of the live interaction context.
#[derive(Debug, Default)]
pub struct InteractionMachine {
    context: InteractionContext,
}

impl InteractionMachine {
    /// Create an idle machine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> InteractionState {
        self.context.state()
    }

    #[must_use]
    pub fn context(&self) -> &InteractionContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut InteractionContext {
        &mut self.context
    }

    #[must_use]
    pub fn owner(&self) -> Option<PlayerId> {
        self.context.owner()
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.state().is_idle()
    }

    /// Fail unless idle.
    pub fn ensure_idle(&self) -> Result<(), InteractionError> {
        if self.is_idle() {
            Ok(())
        } else {
            Err(InteractionError::NotIdle { current: self.state() })
        }
    }

    /// `Idle -> context`.
    pub fn begin(&mut self, context: InteractionContext) -> Result<(), InvariantError> {
        if !self.is_idle() || context.state().is_idle() {
            return Err(InvariantError::IllegalInteractionTransition {
                from: self.state(),
                to: context.state(),
            });
        }
        self.context = context;
        Ok(())
    }

    /// `context -> Idle`. Returns the finished context.
    pub fn finish(&mut self) -> Result<InteractionContext, InvariantError> {
        if self.is_idle() {
            return Err(InvariantError::IllegalInteractionTransition {
                from: InteractionState::Idle,
                to: InteractionState::Idle,
            });
        }
        Ok(std::mem::take(&mut self.context))
    }

    /// Drop the live context without resuming anything.
    pub fn abandon(&mut self) {
        self.context = InteractionContext::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn playing(owner: u8) -> InteractionContext {
        InteractionContext::PlayingCard(PlayingCard {
            owner: PlayerId::new(owner),
            card: EntityId(5),
            hand_index: 0,
            cost: 1,
        })
    }

    #[test]
    fn test_begin_and_finish() {
        let mut machine = InteractionMachine::new();
        assert!(machine.ensure_idle().is_ok());

        machine.begin(playing(0)).unwrap();
        assert_eq!(machine.state(), InteractionState::PlayingCard);
        assert_eq!(machine.owner(), Some(PlayerId::new(0)));
        assert_eq!(
            machine.ensure_idle(),
            Err(InteractionError::NotIdle {
                current: InteractionState::PlayingCard
            })
        );

        let finished = machine.finish().unwrap();
        assert_eq!(finished.state(), InteractionState::PlayingCard);
        assert!(machine.is_idle());
    }

    #[test]
    fn test_non_idle_to_non_idle_rejected() {
        let mut machine = InteractionMachine::new();
        machine.begin(playing(0)).unwrap();
        assert_eq!(
            machine.begin(playing(1)),
            Err(InvariantError::IllegalInteractionTransition {
                from: InteractionState::PlayingCard,
                to: InteractionState::PlayingCard,
            })
        );
        assert_eq!(machine.owner(), Some(PlayerId::new(0)));
    }

    #[test]
    fn test_finish_while_idle_rejected() {
        let mut machine = InteractionMachine::new();
        assert!(machine.finish().is_err());
    }

    #[test]
    fn test_accepts() {
        assert!(InteractionState::PlayingCard.accepts(CommandKind::CommitPlayCard));
        assert!(!InteractionState::PlayingCard.accepts(CommandKind::CommitAbility));
        assert!(InteractionState::SelectingMinionSlot.accepts(CommandKind::CommitSelection));
        assert!(!InteractionState::SelectingMinionSlot.accepts(CommandKind::SelectCardOnBoard));

        for state in InteractionState::iter() {
            assert!(!state.accepts(CommandKind::Pass), "{state} accepts pass");
            assert!(!state.accepts(CommandKind::Surrender));
        }
    }
}
