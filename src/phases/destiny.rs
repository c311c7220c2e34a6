//! Destiny phase: refill mana, then play at most one destiny card.
//!
//! A destiny card moves to the resources zone and grants +1 maximum and +1
//! current mana (capped by the config). Its affinities come from content:
//! none grants nothing, one is granted directly, several open a
//! `ChoosingAffinity` decision.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Phase;
use crate::core::{EntityId, PlayerId};
use crate::error::{GameResult, PhaseError};
use crate::events::BoardEvent;
use crate::game::Game;
use crate::interaction::Decision;
use crate::state::CardLocation;

/// Destiny phase controller.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinyPhase {
    pub played: Option<EntityId>,
    pub skipped: bool,
}

impl DestinyPhase {
    /// Check if the destiny step is over for this turn.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.played.is_some() || self.skipped
    }
}

impl Game {
    pub(crate) fn enter_destiny(&mut self) -> GameResult<()> {
        let player = self.phases.current_player();
        self.state.refill_mana(player);
        let mana = self.state.player(player).mana;
        self.emit(BoardEvent::ManaRefilled { player, mana });
        Ok(())
    }

    fn ensure_destiny_open(&self, player: PlayerId) -> GameResult<()> {
        self.ensure_current_player(player)?;
        self.interaction.ensure_idle()?;
        if self.phases.context::<DestinyPhase>()?.is_done() {
            return Err(PhaseError::DestinyDone.into());
        }
        Ok(())
    }

    pub(crate) fn play_destiny_card(&mut self, player: PlayerId, card: EntityId) -> GameResult<()> {
        self.ensure_destiny_open(player)?;
        let instance = self
            .state
            .card(card)
            .filter(|c| c.owner == player && c.location == CardLocation::Destiny)
            .cloned()
            .ok_or(PhaseError::NotInDestiny(card))?;
        let affinities = self.content().destiny_affinities(&self.state, &instance);
        debug!(target: "tactics::phase", %player, %card, ?affinities, "destiny card played");

        self.state.move_card(card, CardLocation::Resources)?;
        let cap = self.config.mana_cap;
        let board = self.state.player_mut(player);
        board.max_mana = (board.max_mana + 1).min(cap);
        board.mana = (board.mana + 1).min(board.max_mana);
        self.phases.context_mut::<DestinyPhase>()?.played = Some(card);

        if affinities.is_empty() {
            self.schedule_transition(Phase::Main);
            return Ok(());
        }
        self.start_choosing_affinity(player, affinities, move |g, decision| {
            if let Decision::Affinity(affinity) = decision {
                g.gain_affinity(player, affinity);
            }
            g.schedule_transition(Phase::Main);
            Ok(())
        })
    }

    pub(crate) fn skip_destiny(&mut self, player: PlayerId) -> GameResult<()> {
        self.ensure_destiny_open(player)?;
        self.phases.context_mut::<DestinyPhase>()?.skipped = true;
        self.schedule_transition(Phase::Main);
        Ok(())
    }
}
