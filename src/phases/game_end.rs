//! Terminal phase.

use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::debug;

use super::Phase;
use crate::core::PlayerId;
use crate::error::GameResult;
use crate::events::PhaseEvent;
use crate::game::Game;

/// Why the game ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum EndReason {
    /// A hero reached zero health.
    Lethal,
    Surrender,
}

/// Final result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOutcome {
    /// `None` when both heroes fell together.
    pub winner: Option<PlayerId>,
    pub reason: EndReason,
}

impl GameOutcome {
    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        self.winner == Some(player)
    }

    #[must_use]
    pub fn is_draw(&self) -> bool {
        self.winner.is_none()
    }
}

/// GameEnd controller.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEndPhase {
    pub outcome: Option<GameOutcome>,
}

impl Game {
    pub(crate) fn surrender(&mut self, player: PlayerId) -> GameResult<()> {
        self.end_game(Some(player.opponent()), EndReason::Surrender)
    }

    /// Record the outcome and move to GameEnd.
    pub(crate) fn end_game(&mut self, winner: Option<PlayerId>, reason: EndReason) -> GameResult<()> {
        debug!(target: "tactics::phase", ?winner, %reason, "game over");
        self.outcome = Some(GameOutcome { winner, reason });
        self.send_transition(Phase::GameEnd)
    }

    pub(crate) fn enter_game_end(&mut self) -> GameResult<()> {
        self.interaction.abandon();
        self.scheduler.clear();
        self.chain = None;

        let outcome = self
            .outcome
            .clone()
            .ok_or_else(|| Game::corrupted("entered GameEnd without an outcome"))?;
        self.phases.context_mut::<GameEndPhase>()?.outcome = Some(outcome.clone());
        self.emit(PhaseEvent::GameEnded(outcome));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome() {
        let win = GameOutcome {
            winner: Some(PlayerId::new(1)),
            reason: EndReason::Lethal,
        };
        assert!(win.is_winner(PlayerId::new(1)));
        assert!(!win.is_winner(PlayerId::new(0)));
        assert!(!win.is_draw());

        let draw = GameOutcome {
            winner: None,
            reason: EndReason::Lethal,
        };
        assert!(draw.is_draw());
    }
}
