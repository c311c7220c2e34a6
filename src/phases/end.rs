//! End phase: turn-end hook, then hand the turn over.

use serde::{Deserialize, Serialize};

use super::Phase;
use crate::core::PlayerId;
use crate::error::GameResult;
use crate::events::PhaseEvent;
use crate::game::Game;

/// End phase controller.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndPhase {
    /// Player whose turn is ending.
    pub player: Option<PlayerId>,
}

impl Game {
    pub(crate) fn enter_end(&mut self) -> GameResult<()> {
        let player = self.phases.current_player();
        self.phases.context_mut::<EndPhase>()?.player = Some(player);

        let content = self.content();
        content.on_turn_end(self, player)?;
        if self.check_lethal()? {
            return Ok(());
        }
        self.end_turn();
        Ok(())
    }

    /// Pass the turn to the opponent and schedule their Draw phase.
    pub fn end_turn(&mut self) {
        let player = self.phases.current_player();
        let turn = self.phases.turn();
        self.phases.pass_turn();
        self.emit(PhaseEvent::TurnEnded { player, turn });
        self.schedule_transition(Phase::Draw);
    }
}
