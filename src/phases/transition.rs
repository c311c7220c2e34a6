//! Phase transitions with hooks and events.

use tracing::debug;

use super::Phase;
use crate::error::{GameResult, InvariantError};
use crate::events::PhaseEvent;
use crate::game::Game;

impl Game {
    /// Move to `to` now.
    ///
    /// Emits `BeforeChange`, runs the outgoing exit hook, installs a fresh
    /// controller, emits `AfterChange` with the serialized controller, then
    /// runs the enter hook.
    pub fn send_transition(&mut self, to: Phase) -> GameResult<()> {
        self.phases.check_transition(to)?;
        let from = self.phases.phase();
        debug!(
            target: "tactics::phase",
            %from,
            %to,
            turn = self.phases.turn(),
            player = %self.phases.current_player(),
            "phase transition"
        );

        self.emit(PhaseEvent::BeforeChange { from, to });
        self.exit_phase(from)?;
        self.phases.transition(to)?;

        let context = serde_json::to_value(self.phases.controller())
            .map_err(|e| InvariantError::Corrupted(format!("phase context not serializable: {e}")))?;
        self.emit(PhaseEvent::AfterChange { from, to, context });

        self.enter_phase(to)
    }

    /// Queue a transition. Skipped if the game ends first.
    pub fn schedule_transition(&mut self, to: Phase) {
        self.schedule(move |g| {
            if g.is_over() {
                return Ok(());
            }
            g.send_transition(to)
        });
    }

    pub(crate) fn enter_phase(&mut self, phase: Phase) -> GameResult<()> {
        match phase {
            Phase::Draw => self.enter_draw(),
            Phase::Destiny => self.enter_destiny(),
            Phase::Main | Phase::Attack => Ok(()),
            Phase::End => self.enter_end(),
            Phase::GameEnd => self.enter_game_end(),
        }
    }

    fn exit_phase(&mut self, phase: Phase) -> GameResult<()> {
        match phase {
            Phase::Attack => self.exit_attack(),
            _ => Ok(()),
        }
    }
}
