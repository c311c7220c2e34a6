//! Draw phase: ready the active player's units and draw a card.

use serde::{Deserialize, Serialize};

use super::Phase;
use crate::core::EntityId;
use crate::error::GameResult;
use crate::game::Game;

/// Draw phase controller.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawPhase {
    /// Card drawn this phase. `None` when the deck was empty.
    pub drawn: Option<EntityId>,

    /// Fatigue damage taken instead of drawing.
    pub fatigue: i64,
}

impl Game {
    pub(crate) fn enter_draw(&mut self) -> GameResult<()> {
        let player = self.phases.current_player();
        let content = self.content();
        content.on_turn_start(self, player)?;
        self.state.ready_units(player);

        let health = self.state.player(player).health;
        let drawn = self.draw_card(player)?;
        let fatigue = health - self.state.player(player).health;

        if self.check_lethal()? {
            return Ok(());
        }
        let context = self.phases.context_mut::<DrawPhase>()?;
        context.drawn = drawn;
        context.fatigue = fatigue;

        self.schedule_transition(Phase::Destiny);
        Ok(())
    }
}
