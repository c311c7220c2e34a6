//! Job scheduler with a single-slot pause.
//!
//! ## Queues
//!
//! - **internal**: follow-up work scheduled by the game itself (phase
//!   transitions, chain resolution steps). Always runs before the next
//!   external command.
//! - **external**: player commands in arrival order.
//!
//! ## Pause
//!
//! At most one continuation can be outstanding. While it is, `next_job`
//! yields nothing: both queues are held until the continuation is taken
//! back with `take_pause`. A second `suspend` is an invariant violation.
//!
//! The scheduler is generic over the task and continuation types; it stores
//! them and hands them back, it never runs them.

use std::collections::VecDeque;

use super::command::Command;
use super::log::CommandId;
use crate::core::PlayerId;
use crate::error::InvariantError;
use crate::interaction::InteractionState;

/// An outstanding decision.
pub struct Pause<K> {
    /// Interaction the decision belongs to.
    pub state: InteractionState,
    /// Player who must answer.
    pub owner: PlayerId,
    pub continuation: K,
}

/// A queued external command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueuedCommand {
    pub issuer: PlayerId,
    pub command: Command,
}

/// Next unit of work.
pub enum Job<T> {
    Internal(T),
    External(QueuedCommand),
}

/// The scheduler.
pub struct Scheduler<T, K> {
    internal: VecDeque<T>,
    external: VecDeque<QueuedCommand>,
    pause: Option<Pause<K>>,
    flushing: bool,
    halted: bool,
    next_command_id: u64,
}

impl<T, K> Scheduler<T, K> {
    /// Create an idle scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self {
            internal: VecDeque::new(),
            external: VecDeque::new(),
            pause: None,
            flushing: false,
            halted: false,
            next_command_id: 0,
        }
    }

    // === Queues ===

    /// Enqueue internal follow-up work.
    pub fn schedule(&mut self, task: T) {
        self.internal.push_back(task);
    }

    /// Enqueue an external command.
    pub fn enqueue(&mut self, issuer: PlayerId, command: Command) {
        self.external.push_back(QueuedCommand { issuer, command });
    }

    /// Pop the next job. Internal work first; nothing while paused.
    pub fn next_job(&mut self) -> Option<Job<T>> {
        if self.pause.is_some() {
            return None;
        }
        if let Some(task) = self.internal.pop_front() {
            return Some(Job::Internal(task));
        }
        self.external.pop_front().map(Job::External)
    }

    /// Number of internal tasks waiting.
    #[must_use]
    pub fn internal_len(&self) -> usize {
        self.internal.len()
    }

    /// Number of external commands waiting.
    #[must_use]
    pub fn external_len(&self) -> usize {
        self.external.len()
    }

    /// Drop internal tasks queued after the first `len`.
    pub fn truncate_internal(&mut self, len: usize) {
        self.internal.truncate(len);
    }

    /// Drop every queued external command.
    pub fn clear_external(&mut self) {
        self.external.clear();
    }

    /// Drop all queued work and any pause.
    pub fn clear(&mut self) {
        self.internal.clear();
        self.external.clear();
        self.pause = None;
    }

    // === Pause ===

    /// Suspend until `continuation` is taken back.
    pub fn suspend(&mut self, state: InteractionState, owner: PlayerId, continuation: K) -> Result<(), InvariantError> {
        if let Some(pending) = &self.pause {
            return Err(InvariantError::PauseAlreadyPending(pending.state));
        }
        self.pause = Some(Pause {
            state,
            owner,
            continuation,
        });
        Ok(())
    }

    /// Take the outstanding continuation, releasing the queues.
    pub fn take_pause(&mut self) -> Option<Pause<K>> {
        self.pause.take()
    }

    /// The outstanding decision, if any.
    #[must_use]
    pub fn pending(&self) -> Option<(InteractionState, PlayerId)> {
        self.pause.as_ref().map(|p| (p.state, p.owner))
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.pause.is_some()
    }

    // === Flush bookkeeping ===

    /// Mark a flush as started. Returns `false` if one is already running.
    pub fn begin_flush(&mut self) -> bool {
        if self.flushing {
            return false;
        }
        self.flushing = true;
        true
    }

    pub fn end_flush(&mut self) {
        self.flushing = false;
    }

    #[must_use]
    pub fn is_flushing(&self) -> bool {
        self.flushing
    }

    /// Allocate the next command id.
    pub fn next_command_id(&mut self) -> CommandId {
        let id = CommandId::new(self.next_command_id);
        self.next_command_id += 1;
        id
    }

    /// Stop accepting work for good.
    pub fn halt(&mut self) {
        self.halted = true;
        self.clear();
    }

    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.halted
    }
}

impl<T, K> Default for Scheduler<T, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, K> std::fmt::Debug for Scheduler<T, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("internal", &self.internal.len())
            .field("external", &self.external.len())
            .field("pause", &self.pending())
            .field("flushing", &self.flushing)
            .field("halted", &self.halted)
            .finish()
    }
}
