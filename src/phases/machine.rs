//! Phase state machine.
//!
//! ## Phases
//!
//! ```text
//! Draw -> Destiny -> Main <-> Attack
//!                     |
//!                     v
//!                    End -> Draw (next player)
//!
//! any phase except GameEnd -> GameEnd
//! ```
//!
//! The live phase is a `PhaseController`, a tagged union with one variant
//! per phase. Entering a phase always builds a fresh controller; nothing
//! carries over from the previous visit. Callers that need phase-specific
//! data narrow the controller with `context::<T>()`, which fails with
//! `PhaseError::WrongPhase` instead of panicking.
//!
//! This type only tracks state. Hooks, events and scheduling live on the
//! game facade (`Game::send_transition`).

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::combat::CombatPhase;
use super::destiny::DestinyPhase;
use super::draw::DrawPhase;
use super::end::EndPhase;
use super::game_end::GameEndPhase;
use super::main_phase::MainPhase;
use crate::core::PlayerId;
use crate::error::PhaseError;

/// Phase tag.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter,
)]
pub enum Phase {
    Draw,
    Destiny,
    Main,
    Attack,
    End,
    GameEnd,
}

impl Phase {
    /// Check if `self -> to` is an edge of the machine.
    #[must_use]
    pub fn can_transition_to(self, to: Phase) -> bool {
        use Phase::*;
        matches!(
            (self, to),
            (Draw, Destiny) | (Destiny, Main) | (Main, Attack) | (Attack, Main) | (Main, End) | (End, Draw)
        ) || (self != GameEnd && to == GameEnd)
    }
}

/// The live phase and its data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseController {
    Draw(DrawPhase),
    Destiny(DestinyPhase),
    Main(MainPhase),
    Attack(CombatPhase),
    End(EndPhase),
    GameEnd(GameEndPhase),
}

impl PhaseController {
    /// Fresh controller for a phase.
    #[must_use]
    pub fn fresh(phase: Phase) -> Self {
        match phase {
            Phase::Draw => PhaseController::Draw(DrawPhase::default()),
            Phase::Destiny => PhaseController::Destiny(DestinyPhase::default()),
            Phase::Main => PhaseController::Main(MainPhase::default()),
            Phase::Attack => PhaseController::Attack(CombatPhase::default()),
            Phase::End => PhaseController::End(EndPhase::default()),
            Phase::GameEnd => PhaseController::GameEnd(GameEndPhase::default()),
        }
    }

    /// The phase tag.
    #[must_use]
    pub fn phase(&self) -> Phase {
        match self {
            PhaseController::Draw(_) => Phase::Draw,
            PhaseController::Destiny(_) => Phase::Destiny,
            PhaseController::Main(_) => Phase::Main,
            PhaseController::Attack(_) => Phase::Attack,
            PhaseController::End(_) => Phase::End,
            PhaseController::GameEnd(_) => Phase::GameEnd,
        }
    }
}

/// Concrete controller type that `PhaseMachine::context` can narrow to.
pub trait PhaseContext: Sized {
    /// Phase this controller belongs to.
    const PHASE: Phase;

    fn narrow(controller: &PhaseController) -> Option<&Self>;

    fn narrow_mut(controller: &mut PhaseController) -> Option<&mut Self>;
}

macro_rules! phase_context {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl PhaseContext for $ty {
                const PHASE: Phase = Phase::$variant;

                fn narrow(controller: &PhaseController) -> Option<&Self> {
                    match controller {
                        PhaseController::$variant(c) => Some(c),
                        _ => None,
                    }
                }

                fn narrow_mut(controller: &mut PhaseController) -> Option<&mut Self> {
                    match controller {
                        PhaseController::$variant(c) => Some(c),
                        _ => None,
                    }
                }
            }
        )*
    };
}

phase_context!(
    DrawPhase => Draw,
    DestinyPhase => Destiny,
    MainPhase => Main,
    CombatPhase => Attack,
    EndPhase => End,
    GameEndPhase => GameEnd,
);

/// Phase machine state: live controller, turn counter and seating.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseMachine {
    controller: PhaseController,
    turn: u32,
    current_player: PlayerId,
    first_player: PlayerId,
}

impl PhaseMachine {
    /// Machine at turn 1, in a fresh Draw phase for `first_player`.
    #[must_use]
    pub fn new(first_player: PlayerId) -> Self {
        Self {
            controller: PhaseController::fresh(Phase::Draw),
            turn: 1,
            current_player: first_player,
            first_player,
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.controller.phase()
    }

    #[must_use]
    pub fn controller(&self) -> &PhaseController {
        &self.controller
    }

    /// Elapsed turns, starting at 1. Ticks when control returns to the first
    /// player.
    #[must_use]
    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// Player whose turn it is.
    #[must_use]
    pub fn current_player(&self) -> PlayerId {
        self.current_player
    }

    #[must_use]
    pub fn first_player(&self) -> PlayerId {
        self.first_player
    }

    /// Check an edge without taking it.
    pub fn check_transition(&self, to: Phase) -> Result<(), PhaseError> {
        let from = self.phase();
        if from.can_transition_to(to) {
            Ok(())
        } else {
            Err(PhaseError::IllegalTransition { from, to })
        }
    }

    /// Replace the live controller with a fresh one for `to`.
    ///
    /// Returns the outgoing controller.
    pub fn transition(&mut self, to: Phase) -> Result<PhaseController, PhaseError> {
        self.check_transition(to)?;
        Ok(std::mem::replace(&mut self.controller, PhaseController::fresh(to)))
    }

    /// Narrow the live controller.
    pub fn context<T: PhaseContext>(&self) -> Result<&T, PhaseError> {
        let actual = self.phase();
        T::narrow(&self.controller).ok_or(PhaseError::WrongPhase {
            expected: T::PHASE,
            actual,
        })
    }

    /// Narrow the live controller mutably.
    pub fn context_mut<T: PhaseContext>(&mut self) -> Result<&mut T, PhaseError> {
        let actual = self.phase();
        T::narrow_mut(&mut self.controller).ok_or(PhaseError::WrongPhase {
            expected: T::PHASE,
            actual,
        })
    }

    /// Hand the turn to the other player.
    ///
    /// Returns `true` if the elapsed-turn counter ticked.
    pub fn pass_turn(&mut self) -> bool {
        self.current_player = self.current_player.opponent();
        if self.current_player == self.first_player {
            self.turn += 1;
            true
        } else {
            false
        }
    }
}
