//! Main phase: cards, abilities, attacks, and ending the turn.
//!
//! Playing cards and using abilities live in `interaction::play`; declaring
//! an attacker lives in `combat`.

use serde::{Deserialize, Serialize};

use super::Phase;
use crate::core::PlayerId;
use crate::error::{ChainError, GameResult};
use crate::game::Game;

/// Main phase controller.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainPhase {
    /// Cards committed since this Main phase was entered.
    pub cards_played: u32,
}

impl Game {
    pub(crate) fn request_end_turn(&mut self, player: PlayerId) -> GameResult<()> {
        self.ensure_current_player(player)?;
        if self.chain.is_some() {
            return Err(ChainError::AlreadyOpen.into());
        }
        self.interaction.ensure_idle()?;
        self.send_transition(Phase::End)
    }
}
