//! Replaying a command log.

use std::rc::Rc;

use tracing::debug;

use super::Game;
use crate::core::GameConfig;
use crate::error::GameResult;
use crate::input::LoggedCommand;
use crate::rules::ContentRules;

impl Game {
    /// Build a fresh game from `config` and re-run `commands` in order.
    ///
    /// Every command in a log executed once already, so any rejection here
    /// means the replay diverged and is returned as an error.
    pub fn replay(config: GameConfig, content: Rc<dyn ContentRules>, commands: &[LoggedCommand]) -> GameResult<Game> {
        let mut game = Game::new(config, content)?;
        for entry in commands {
            debug!(target: "tactics::replay", id = %entry.id, issuer = %entry.issuer, kind = %entry.command.kind(), "replaying");
            game.submit(entry.issuer, entry.command.clone())?;
        }
        Ok(game)
    }
}
