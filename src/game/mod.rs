//! Game facade: the aggregate root.
//!
//! A `Game` owns the board, the RNG, the phase and interaction machines, at
//! most one effect chain, the scheduler, the event bus and the command log.
//! All mutation happens inside scheduler jobs; callers only `dispatch`.
//!
//! ```
//! use std::rc::Rc;
//! use tactics_core::core::PlayerId;
//! use tactics_core::game::{Dispatch, Game};
//! use tactics_core::games::skirmish::{self, Skirmish};
//! use tactics_core::input::RawCommand;
//! use tactics_core::phases::Phase;
//!
//! let mut game = Game::new(skirmish::demo_config(7), Rc::new(Skirmish::new())).unwrap();
//! assert_eq!(game.phase(), Phase::Destiny);
//!
//! let p0 = PlayerId::new(0);
//! let skip = RawCommand::new("skipDestiny", serde_json::json!({}));
//! assert_eq!(game.dispatch(p0, &skip).unwrap(), Dispatch::Completed);
//! assert_eq!(game.phase(), Phase::Main);
//! ```
//!
//! ## Borrowing
//!
//! Handlers, tasks and continuations all receive `&mut Game`. They are
//! stored as boxed closures inside the scheduler or chain and always taken
//! out before they run, so no borrow of the game outlives the call. The
//! content layer is held behind an `Rc` and cloned before hooks that take
//! `&mut Game`.

mod dispatch;
pub mod replay;
pub mod snapshot;

use std::rc::Rc;

use tracing::debug;

use crate::cards::Affinity;
use crate::chain::{ChainState, ChainView, EffectChain};
use crate::core::{EntityId, GameConfig, GameRng, GameRngState, PlayerId};
use crate::error::{GameResult, InvariantError};
use crate::events::{BoardEvent, EventBus, GameEvent};
use crate::input::{CommandLog, Scheduler};
use crate::interaction::{Decision, InteractionMachine, InteractionState};
use crate::phases::{EndReason, GameOutcome, Phase, PhaseMachine};
use crate::rules::ContentRules;
use crate::state::{CardLocation, GameState, SlotRef};

pub use dispatch::Dispatch;
pub use snapshot::{PlayerView, Snapshot, StateView, ZoneView};

/// Internal follow-up work.
pub type Task = Box<dyn FnOnce(&mut Game) -> GameResult<()>>;

/// Resumes a suspended interaction with the player's answer.
pub type Continuation = Box<dyn FnOnce(&mut Game, Decision) -> GameResult<()>>;

/// Body of an effect, run when it resolves. Receives the chosen targets.
pub type EffectHandler = Box<dyn FnOnce(&mut Game, &[EntityId]) -> GameResult<()>>;

/// Board, RNG, phase machine and event buffer as of a command start.
struct Checkpoint {
    state: GameState,
    rng: GameRngState,
    phases: PhaseMachine,
    outcome: Option<GameOutcome>,
    internal_len: usize,
    events_len: usize,
}

/// The game.
pub struct Game {
    pub(crate) config: GameConfig,
    pub(crate) content: Rc<dyn ContentRules>,
    pub(crate) state: GameState,
    pub(crate) rng: GameRng,
    pub(crate) phases: PhaseMachine,
    pub(crate) interaction: InteractionMachine,
    pub(crate) chain: Option<EffectChain<EffectHandler>>,
    pub(crate) scheduler: Scheduler<Task, Continuation>,
    pub(crate) events: EventBus,
    pub(crate) log: CommandLog,
    pub(crate) outcome: Option<GameOutcome>,
    snapshot: Option<Snapshot>,
    snapshot_sequence: u64,
}

impl Game {
    /// Set up a match: deal and shuffle decks, draw opening hands, and run
    /// the first player's Draw phase.
    pub fn new(config: GameConfig, content: Rc<dyn ContentRules>) -> GameResult<Self> {
        config.validate()?;

        let mut state = GameState::new(&config);
        let mut rng = GameRng::new(config.seed);
        for (player, deck) in config.decks.iter() {
            for &blueprint in &deck.main {
                state.create_card(blueprint, player, CardLocation::Deck)?;
            }
            for &blueprint in &deck.destiny {
                state.create_card(blueprint, player, CardLocation::Destiny)?;
            }
            state.shuffle_deck(player, &mut rng);
            for _ in 0..config.starting_hand_size {
                state.draw(player);
            }
        }

        let mut game = Self {
            phases: PhaseMachine::new(config.first_player),
            config,
            content,
            state,
            rng,
            interaction: InteractionMachine::new(),
            chain: None,
            scheduler: Scheduler::new(),
            events: EventBus::new(),
            log: CommandLog::new(),
            outcome: None,
            snapshot: None,
            snapshot_sequence: 0,
        };

        debug!(target: "tactics::game", seed = game.config.seed, "match created");
        game.schedule(|g| g.enter_phase(Phase::Draw));
        game.flush()?;
        Ok(game)
    }

    // === Accessors ===

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Mutable board access for content handlers.
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    /// The content layer.
    #[must_use]
    pub fn content(&self) -> Rc<dyn ContentRules> {
        Rc::clone(&self.content)
    }

    #[must_use]
    pub fn phases(&self) -> &PhaseMachine {
        &self.phases
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phases.phase()
    }

    #[must_use]
    pub fn turn(&self) -> u32 {
        self.phases.turn()
    }

    #[must_use]
    pub fn current_player(&self) -> PlayerId {
        self.phases.current_player()
    }

    #[must_use]
    pub fn interaction(&self) -> &InteractionMachine {
        &self.interaction
    }

    #[must_use]
    pub fn interaction_state(&self) -> InteractionState {
        self.interaction.state()
    }

    /// Outstanding decision: its interaction and the player who must answer.
    #[must_use]
    pub fn pending_decision(&self) -> Option<(InteractionState, PlayerId)> {
        self.scheduler.pending()
    }

    #[must_use]
    pub fn chain_state(&self) -> Option<ChainState> {
        self.chain.as_ref().map(EffectChain::state)
    }

    #[must_use]
    pub fn chain_view(&self) -> Option<ChainView> {
        self.chain.as_ref().map(EffectChain::view)
    }

    #[must_use]
    pub fn log(&self) -> &CommandLog {
        &self.log
    }

    #[must_use]
    pub fn outcome(&self) -> Option<&GameOutcome> {
        self.outcome.as_ref()
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.scheduler.is_halted()
    }

    /// Event channels, for subscribing.
    pub fn events(&mut self) -> &mut EventBus {
        &mut self.events
    }

    /// Snapshot taken at the end of the last flush (or resync).
    #[must_use]
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// Deterministic RNG, for content that needs randomness.
    pub fn rng(&mut self) -> &mut GameRng {
        &mut self.rng
    }

    // === Scheduling and events ===

    /// Queue internal follow-up work. Runs before the next external command.
    pub fn schedule(&mut self, task: impl FnOnce(&mut Game) -> GameResult<()> + 'static) {
        self.scheduler.schedule(Box::new(task));
    }

    pub(crate) fn emit(&mut self, event: impl Into<GameEvent>) {
        self.events.publish(event);
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            state: self.state.clone(),
            rng: self.rng.position(),
            phases: self.phases.clone(),
            outcome: self.outcome.clone(),
            internal_len: self.scheduler.internal_len(),
            events_len: self.events.buffered().len(),
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.state = checkpoint.state;
        self.rng = GameRng::resume(&checkpoint.rng);
        self.phases = checkpoint.phases;
        self.outcome = checkpoint.outcome;
        self.scheduler.truncate_internal(checkpoint.internal_len);
        self.events.rewind(checkpoint.events_len);
    }

    // === Board operations ===

    /// Draw a card for `player`. An empty deck deals fatigue damage instead.
    pub fn draw_card(&mut self, player: PlayerId) -> GameResult<Option<EntityId>> {
        if let Some(card) = self.state.draw(player) {
            self.emit(BoardEvent::CardDrawn { player });
            return Ok(Some(card));
        }
        if self.config.fatigue {
            let board = self.state.player_mut(player);
            let damage = board.fatigue;
            board.fatigue += 1;
            self.state.damage(EntityId::player(player), damage)?;
            self.emit(BoardEvent::Fatigue { player, damage });
        }
        Ok(None)
    }

    /// Deal damage from `source` to a hero or unit.
    ///
    /// Returns the target's remaining health. Lethal is checked by the caller
    /// once the current effect or combat step is done.
    pub fn deal_damage(&mut self, source: EntityId, target: EntityId, amount: i64) -> GameResult<i64> {
        let remaining = self.state.damage(target, amount)?;
        self.emit(BoardEvent::Damaged {
            source,
            target,
            amount,
            remaining,
        });
        Ok(remaining)
    }

    /// Attune a player to an affinity.
    pub fn gain_affinity(&mut self, player: PlayerId, affinity: Affinity) {
        self.state.player_mut(player).affinities.push_back(affinity);
        self.emit(BoardEvent::AffinityGained { player, affinity });
    }

    /// Put a card onto the board.
    pub fn summon(&mut self, card: EntityId, slot: SlotRef, attack: i64, health: i64) -> GameResult<()> {
        self.state.summon(card, slot, attack, health)?;
        self.emit(BoardEvent::Summoned { unit: card, slot });
        Ok(())
    }

    /// Check whether a hero is alive (always) or a unit is still on board.
    #[must_use]
    pub fn is_alive(&self, entity: EntityId) -> bool {
        entity.is_player() || self.state.unit(entity).is_some()
    }

    /// End the game if a hero is at zero health.
    ///
    /// Returns `true` if the game is over.
    pub(crate) fn check_lethal(&mut self) -> GameResult<bool> {
        if self.is_over() {
            return Ok(true);
        }
        let dead: Vec<PlayerId> = PlayerId::all()
            .filter(|&p| self.state.player(p).health <= 0)
            .collect();
        let winner = match dead.as_slice() {
            [] => return Ok(false),
            [loser] => Some(loser.opponent()),
            _ => None,
        };
        self.end_game(winner, EndReason::Lethal)?;
        Ok(true)
    }

    /// Fail with an invariant error if the board no longer lines up.
    pub(crate) fn corrupted(message: impl Into<String>) -> InvariantError {
        InvariantError::Corrupted(message.into())
    }
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("phase", &self.phases.phase())
            .field("turn", &self.phases.turn())
            .field("current_player", &self.phases.current_player())
            .field("interaction", &self.interaction.state())
            .field("chain", &self.chain)
            .field("scheduler", &self.scheduler)
            .field("outcome", &self.outcome)
            .finish()
    }
}
