//! Error taxonomy for the orchestration core.
//!
//! Every failure is one of two classes:
//!
//! - **Validation**: the command was illegal right now (wrong phase, wrong
//!   actor, bad payload, illegal target). The scheduler rolls the board back,
//!   drops the command from the log and emits a resync so clients can recover.
//! - **Fatal**: an internal invariant broke. The scheduler publishes a
//!   reproduction dump and the game refuses to simulate any further.
//!
//! Subsystems have their own enums so the failure reason stays
//! machine-distinguishable; `GameError` aggregates them and carries the
//! classification.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{ConfigError, EntityId, PlayerId};
use crate::input::CommandKind;
use crate::interaction::InteractionState;
use crate::phases::{CombatStep, Phase};
use crate::state::SlotRef;

/// Result alias used throughout the crate.
pub type GameResult<T> = Result<T, GameError>;

/// How the scheduler reacts to an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorSeverity {
    /// Illegal input. Roll back, resync, keep simulating.
    Validation,

    /// Corrupted simulation. Dump and halt.
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable name for this severity.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Fatal => "fatal",
        }
    }
}

/// Command shape and gating errors.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Payload did not match the command's schema.
    #[error("malformed `{kind}` payload: {message}")]
    Schema { kind: CommandKind, message: String },

    /// Command kind is not allowed in the current phase.
    #[error("`{kind}` is not allowed during the {phase} phase")]
    PhaseNotAllowed { kind: CommandKind, phase: Phase },

    /// A decision is pending and this command does not answer it.
    #[error("waiting for a {awaiting} decision, got `{kind}`")]
    AwaitingDecision {
        awaiting: InteractionState,
        kind: CommandKind,
    },

    /// The issuer is not the player whose turn it is.
    #[error("{player} is not the active player")]
    NotActivePlayer { player: PlayerId },

    /// Entity does not exist.
    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),

    /// Entity exists but belongs to the other player.
    #[error("{entity} is not controlled by {player}")]
    NotOwned { entity: EntityId, player: PlayerId },

    /// Not enough mana for a cost.
    #[error("needs {needed} mana, {available} available")]
    InsufficientMana { needed: u32, available: u32 },

    /// The game has ended.
    #[error("the game is over")]
    GameOver,
}

/// Phase machine errors.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PhaseError {
    /// No edge between the two phases.
    #[error("illegal phase transition {from} -> {to}")]
    IllegalTransition { from: Phase, to: Phase },

    /// The live controller is not the one the caller narrowed to.
    #[error("expected the {expected} phase, but {actual} is active")]
    WrongPhase { expected: Phase, actual: Phase },

    /// Destiny was already played or skipped this turn.
    #[error("the destiny step is already done this turn")]
    DestinyDone,

    /// Card is not in the player's destiny zone.
    #[error("{0} is not in the destiny zone")]
    NotInDestiny(EntityId),
}

/// Combat sub-machine errors.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CombatError {
    /// Step performed out of order.
    #[error("combat step {attempted:?} attempted during {current:?}")]
    OutOfOrder {
        current: CombatStep,
        attempted: CombatStep,
    },

    /// The unit may not attack.
    #[error("{0} cannot attack")]
    CannotAttack(EntityId),

    /// The attack target is not legal.
    #[error("{0} cannot be attacked")]
    IllegalTarget(EntityId),

    /// The unit may not block.
    #[error("{0} cannot block")]
    CannotBlock(EntityId),

    /// Only the defending player may declare blockers.
    #[error("{0} is not the defending player")]
    NotDefender(PlayerId),

    /// The attack can no longer be withdrawn.
    #[error("the attack can no longer be cancelled")]
    NotCancellable,
}

/// Interaction machine errors.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InteractionError {
    /// A decision is already pending.
    #[error("another interaction is in progress ({current})")]
    NotIdle { current: InteractionState },

    /// The command answers a different decision (or none is pending).
    #[error("expected a {expected} interaction, found {actual}")]
    WrongInteraction {
        expected: InteractionState,
        actual: InteractionState,
    },

    /// A selection answer arrived while no selection is pending.
    #[error("no selection to commit, found {actual}")]
    NoSelection { actual: InteractionState },

    /// Only the context owner may answer it.
    #[error("{player} does not own this interaction")]
    NotOwner { player: PlayerId },

    /// The actor does not hold the right to act.
    #[error("{player} may not act right now")]
    NoRightToAct { player: PlayerId },

    /// Candidate entity is not eligible.
    #[error("{0} is not a legal choice")]
    IllegalTarget(EntityId),

    /// Candidate slot is not eligible.
    #[error("{0} is not a legal slot")]
    IllegalSlot(SlotRef),

    /// Candidate already in the running selection.
    #[error("{0} is already selected")]
    AlreadySelected(String),

    /// The commit predicate does not hold yet.
    #[error("the selection cannot be committed yet")]
    CannotCommit,

    /// This decision is mandatory.
    #[error("this interaction cannot be cancelled")]
    NotCancellable,

    /// A choice answer outside the offered options.
    #[error("invalid choice: {0}")]
    InvalidChoice(String),

    /// Card is not in the player's hand.
    #[error("{0} is not in hand")]
    NotInHand(EntityId),

    /// Non-reactive cards cannot be played into an open chain.
    #[error("{0} cannot be played while an effect chain is open")]
    NotReactive(EntityId),

    /// Reactive cards need an open chain to respond to.
    #[error("{0} can only be played in response")]
    ReactiveOnly(EntityId),

    /// Unit has no such ability.
    #[error("{unit} has no ability {ability}")]
    UnknownAbility { unit: EntityId, ability: u8 },

    /// Ability already used this turn.
    #[error("{unit} already used ability {ability} this turn")]
    AbilityExhausted { unit: EntityId, ability: u8 },

    /// Every minion slot is occupied.
    #[error("{0} has no free minion slot")]
    NoFreeSlot(PlayerId),

    /// Content has no play for this card.
    #[error("{0} cannot be played")]
    NotPlayable(EntityId),
}

/// Effect chain errors.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ChainError {
    /// Nothing to pass or respond to.
    #[error("no ongoing effect chain")]
    NoOngoingChain,

    /// The chain is resolving or finished.
    #[error("the effect chain is no longer accepting responses")]
    NotBuilding,

    /// The actor does not hold priority.
    #[error("{player} does not hold priority")]
    NoPriority { player: PlayerId },

    /// The derived-stat layer forbids adding effects for this player.
    #[error("{player} cannot add effects right now")]
    CannotAddEffect { player: PlayerId },

    /// A chain is already open.
    #[error("an effect chain is already open")]
    AlreadyOpen,
}

/// Broken invariants. Always fatal.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvariantError {
    /// A second pause was requested while one is outstanding.
    #[error("a pause is already pending ({0})")]
    PauseAlreadyPending(InteractionState),

    /// A commit or cancel tried to resume a pause that does not exist.
    #[error("no pending pause to resume")]
    NoPendingPause,

    /// Non-idle to non-idle interaction transition.
    #[error("illegal interaction transition {from} -> {to}")]
    IllegalInteractionTransition {
        from: InteractionState,
        to: InteractionState,
    },

    /// Resolution was requested without a chain.
    #[error("effect chain vanished during resolution")]
    ChainMissing,

    /// A board invariant did not hold.
    #[error("corrupted state: {0}")]
    Corrupted(String),

    /// The simulation stopped after an earlier fatal error.
    #[error("the game halted after a fatal error")]
    Halted,

    /// Internal follow-up work failed validation after its command
    /// had already been accepted.
    #[error("internal follow-up rejected: {0}")]
    TaskRejected(String),
}

/// Any error the orchestration core can raise.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GameError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Phase(#[from] PhaseError),

    #[error(transparent)]
    Combat(#[from] CombatError),

    #[error(transparent)]
    Interaction(#[from] InteractionError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Invariant(#[from] InvariantError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl GameError {
    /// Classify the error.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            GameError::Validation(_)
            | GameError::Combat(_)
            | GameError::Interaction(_)
            | GameError::Chain(_)
            | GameError::Config(_) => ErrorSeverity::Validation,
            GameError::Phase(PhaseError::DestinyDone | PhaseError::NotInDestiny(_)) => {
                ErrorSeverity::Validation
            }
            // Client commands are phase-gated before they reach the machine,
            // so a bad edge or a stale controller means the core itself is off.
            GameError::Phase(_) => ErrorSeverity::Fatal,
            GameError::Invariant(_) => ErrorSeverity::Fatal,
        }
    }

    /// True if the scheduler can roll back and continue.
    pub fn is_recoverable(&self) -> bool {
        self.severity() == ErrorSeverity::Validation
    }

    /// Promote a recoverable error to fatal.
    ///
    /// Used for failures inside scheduled tasks and continuations: by then the
    /// triggering command was accepted, so the rejection is an engine fault.
    pub fn escalate(self) -> GameError {
        if self.is_recoverable() {
            InvariantError::TaskRejected(self.to_string()).into()
        } else {
            self
        }
    }

    /// Stable identifier for telemetry and client-side handling.
    pub fn code(&self) -> &'static str {
        match self {
            GameError::Validation(e) => match e {
                ValidationError::Schema { .. } => "COMMAND_SCHEMA",
                ValidationError::PhaseNotAllowed { .. } => "WRONG_PHASE",
                ValidationError::AwaitingDecision { .. } => "AWAITING_DECISION",
                ValidationError::NotActivePlayer { .. } => "NOT_ACTIVE_PLAYER",
                ValidationError::UnknownEntity(_) => "UNKNOWN_ENTITY",
                ValidationError::NotOwned { .. } => "NOT_OWNED",
                ValidationError::InsufficientMana { .. } => "INSUFFICIENT_MANA",
                ValidationError::GameOver => "GAME_OVER",
            },
            GameError::Phase(e) => match e {
                PhaseError::IllegalTransition { .. } => "PHASE_ILLEGAL_TRANSITION",
                PhaseError::WrongPhase { .. } => "PHASE_CONTEXT_MISMATCH",
                PhaseError::DestinyDone => "DESTINY_DONE",
                PhaseError::NotInDestiny(_) => "NOT_IN_DESTINY",
            },
            GameError::Combat(e) => match e {
                CombatError::OutOfOrder { .. } => "COMBAT_OUT_OF_ORDER",
                CombatError::CannotAttack(_) => "CANNOT_ATTACK",
                CombatError::IllegalTarget(_) => "ILLEGAL_ATTACK_TARGET",
                CombatError::CannotBlock(_) => "CANNOT_BLOCK",
                CombatError::NotDefender(_) => "NOT_DEFENDER",
                CombatError::NotCancellable => "ATTACK_NOT_CANCELLABLE",
            },
            GameError::Interaction(e) => match e {
                InteractionError::NotIdle { .. } => "INTERACTION_NOT_IDLE",
                InteractionError::WrongInteraction { .. } => "WRONG_INTERACTION",
                InteractionError::NoSelection { .. } => "NO_SELECTION",
                InteractionError::NotOwner { .. } => "NOT_INTERACTION_OWNER",
                InteractionError::NoRightToAct { .. } => "NO_RIGHT_TO_ACT",
                InteractionError::IllegalTarget(_) => "ILLEGAL_TARGET",
                InteractionError::IllegalSlot(_) => "ILLEGAL_SLOT",
                InteractionError::AlreadySelected(_) => "ALREADY_SELECTED",
                InteractionError::CannotCommit => "CANNOT_COMMIT",
                InteractionError::NotCancellable => "NOT_CANCELLABLE",
                InteractionError::InvalidChoice(_) => "INVALID_CHOICE",
                InteractionError::NotInHand(_) => "NOT_IN_HAND",
                InteractionError::NotReactive(_) => "NOT_REACTIVE",
                InteractionError::ReactiveOnly(_) => "REACTIVE_ONLY",
                InteractionError::UnknownAbility { .. } => "UNKNOWN_ABILITY",
                InteractionError::AbilityExhausted { .. } => "ABILITY_EXHAUSTED",
                InteractionError::NoFreeSlot(_) => "NO_FREE_SLOT",
                InteractionError::NotPlayable(_) => "NOT_PLAYABLE",
            },
            GameError::Chain(e) => match e {
                ChainError::NoOngoingChain => "NO_ONGOING_EFFECT_CHAIN",
                ChainError::NotBuilding => "CHAIN_NOT_BUILDING",
                ChainError::NoPriority { .. } => "NO_PRIORITY",
                ChainError::CannotAddEffect { .. } => "CANNOT_ADD_EFFECT",
                ChainError::AlreadyOpen => "CHAIN_ALREADY_OPEN",
            },
            GameError::Invariant(e) => match e {
                InvariantError::PauseAlreadyPending(_) => "PAUSE_ALREADY_PENDING",
                InvariantError::NoPendingPause => "NO_PENDING_PAUSE",
                InvariantError::IllegalInteractionTransition { .. } => {
                    "ILLEGAL_INTERACTION_TRANSITION"
                }
                InvariantError::ChainMissing => "CHAIN_MISSING",
                InvariantError::Corrupted(_) => "CORRUPTED_STATE",
                InvariantError::Halted => "HALTED",
                InvariantError::TaskRejected(_) => "TASK_REJECTED",
            },
            GameError::Config(_) => "INVALID_CONFIG",
        }
    }
}

/// Serializable summary of an error, carried by resync and fatal events.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub code: String,
    pub severity: ErrorSeverity,
    pub message: String,
}

impl From<&GameError> for ErrorReport {
    fn from(error: &GameError) -> Self {
        Self {
            code: error.code().to_string(),
            severity: error.severity(),
            message: error.to_string(),
        }
    }
}
