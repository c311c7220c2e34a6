//! Priority-based effect chain.
//!
//! Effects are pushed onto a stack and resolve in LIFO order. Priority
//! alternates between the two players; adding an effect resets the pass
//! count and hands priority to the other player. Two consecutive passes
//! close the chain and it starts resolving.
//!
//! The chain is a leaf state machine: it never runs handlers itself. The
//! caller pops effects with `pop_resolving` and runs them, then collects the
//! completion handler with `finish`.
//!
//! ```
//! use tactics_core::chain::{Effect, EffectChain, PassOutcome};
//! use tactics_core::core::{EntityId, PlayerId};
//!
//! let p0 = PlayerId::new(0);
//! let p1 = PlayerId::new(1);
//!
//! let mut chain: EffectChain<&str> = EffectChain::new(p0);
//! chain.add_effect(p0, Effect::new(EntityId(10), p0, "bolt")).unwrap();
//! chain.add_effect(p1, Effect::new(EntityId(11), p1, "parry")).unwrap();
//!
//! assert_eq!(chain.pass(p0).unwrap(), PassOutcome::PriorityPassed { to: p1 });
//! assert_eq!(chain.pass(p1).unwrap(), PassOutcome::Resolve);
//!
//! assert_eq!(chain.pop_resolving().unwrap().handler, "parry");
//! assert_eq!(chain.pop_resolving().unwrap().handler, "bolt");
//! ```

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use strum::Display;

use crate::core::{EntityId, PlayerId};
use crate::error::ChainError;

/// Consecutive passes that close the chain. One per player.
pub const PASS_THRESHOLD: u8 = 2;

/// Targets chosen for an effect.
pub type Targets = SmallVec<[EntityId; 2]>;

/// Lifecycle of a chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum ChainState {
    /// Accepting responses.
    Building,
    /// Popping effects. No more responses.
    Resolving,
    /// Stack empty, completion handed out.
    Finished,
}

/// Result of a pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassOutcome {
    /// Priority moved to the other player.
    PriorityPassed { to: PlayerId },
    /// Both players passed; the chain is now resolving.
    Resolve,
}

/// A pending reaction on the chain.
#[derive(Clone, Debug)]
pub struct Effect<H> {
    /// Card or unit that produced the effect.
    pub source: EntityId,

    /// Player who added it. Holds the right to act while it resolves.
    pub controller: PlayerId,

    pub targets: Targets,

    pub handler: H,
}

impl<H> Effect<H> {
    /// Create an effect with no targets.
    pub fn new(source: EntityId, controller: PlayerId, handler: H) -> Self {
        Self {
            source,
            controller,
            targets: Targets::new(),
            handler,
        }
    }

    /// Set targets (builder pattern).
    #[must_use]
    pub fn with_targets(mut self, targets: impl IntoIterator<Item = EntityId>) -> Self {
        self.targets = targets.into_iter().collect();
        self
    }
}

/// Serializable view of a chain for snapshots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainView {
    pub state: ChainState,
    pub current_player: PlayerId,
    pub consecutive_passes: u8,
    /// `(source, controller)`, bottom to top.
    pub effects: Vec<(EntityId, PlayerId)>,
}

/// The effect chain.
///
/// Generic over the handler type so the state machine carries no knowledge
/// of what resolving an effect means.
pub struct EffectChain<H> {
    /// Bottom is index 0.
    stack: Vec<Effect<H>>,
    current_player: PlayerId,
    consecutive_passes: u8,
    state: ChainState,
    completion: Option<H>,
    resolving_controller: Option<PlayerId>,
}

impl<H> EffectChain<H> {
    /// Open an empty chain with `priority` holding priority.
    pub fn new(priority: PlayerId) -> Self {
        Self {
            stack: Vec::new(),
            current_player: priority,
            consecutive_passes: 0,
            state: ChainState::Building,
            completion: None,
            resolving_controller: None,
        }
    }

    /// Set the handler run once the stack is empty (builder pattern).
    #[must_use]
    pub fn with_completion(mut self, completion: H) -> Self {
        self.completion = Some(completion);
        self
    }

    #[must_use]
    pub fn state(&self) -> ChainState {
        self.state
    }

    /// Player holding priority.
    #[must_use]
    pub fn current_player(&self) -> PlayerId {
        self.current_player
    }

    #[must_use]
    pub fn consecutive_passes(&self) -> u8 {
        self.consecutive_passes
    }

    /// Number of unresolved effects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Controller of the effect currently resolving.
    #[must_use]
    pub fn resolving_controller(&self) -> Option<PlayerId> {
        self.resolving_controller
    }

    /// Peek at the top of the stack.
    #[must_use]
    pub fn top(&self) -> Option<&Effect<H>> {
        self.stack.last()
    }

    /// Check if `player` could add an effect right now.
    #[must_use]
    pub fn can_add_effect(&self, player: PlayerId) -> bool {
        self.state == ChainState::Building && self.current_player == player
    }

    fn ensure_priority(&self, player: PlayerId) -> Result<(), ChainError> {
        if self.state != ChainState::Building {
            return Err(ChainError::NotBuilding);
        }
        if self.current_player != player {
            return Err(ChainError::NoPriority { player });
        }
        Ok(())
    }

    /// Push an effect. Resets passes and hands priority to the opponent.
    ///
    /// Returns the new depth of the chain.
    pub fn add_effect(&mut self, player: PlayerId, effect: Effect<H>) -> Result<usize, ChainError> {
        self.ensure_priority(player)?;
        self.stack.push(effect);
        self.consecutive_passes = 0;
        self.current_player = player.opponent();
        Ok(self.stack.len())
    }

    /// Pass priority.
    pub fn pass(&mut self, player: PlayerId) -> Result<PassOutcome, ChainError> {
        self.ensure_priority(player)?;
        self.consecutive_passes += 1;
        if self.consecutive_passes >= PASS_THRESHOLD {
            self.state = ChainState::Resolving;
            Ok(PassOutcome::Resolve)
        } else {
            self.current_player = player.opponent();
            Ok(PassOutcome::PriorityPassed {
                to: self.current_player,
            })
        }
    }

    /// Pop the next effect to resolve (top of stack).
    ///
    /// Returns `None` when the stack is empty or the chain is not resolving.
    pub fn pop_resolving(&mut self) -> Option<Effect<H>> {
        if self.state != ChainState::Resolving {
            return None;
        }
        let effect = self.stack.pop()?;
        self.resolving_controller = Some(effect.controller);
        Some(effect)
    }

    /// Mark the chain finished and hand out its completion handler.
    pub fn finish(&mut self) -> Option<H> {
        self.state = ChainState::Finished;
        self.resolving_controller = None;
        self.completion.take()
    }

    /// Snapshot view.
    #[must_use]
    pub fn view(&self) -> ChainView {
        ChainView {
            state: self.state,
            current_player: self.current_player,
            consecutive_passes: self.consecutive_passes,
            effects: self.stack.iter().map(|e| (e.source, e.controller)).collect(),
        }
    }
}

impl<H> std::fmt::Debug for EffectChain<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectChain")
            .field("depth", &self.stack.len())
            .field("current_player", &self.current_player)
            .field("consecutive_passes", &self.consecutive_passes)
            .field("state", &self.state)
            .finish()
    }
}
