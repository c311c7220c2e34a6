//! Running selections: cards on the board and minion slots.
//!
//! A selection is built from a `SelectionSpec`: a candidate pool, an
//! eligibility predicate over the running selection, and two rules over the
//! selection as a whole (`done`, which triggers auto-commit, and
//! `can_commit`, which gates commits).
//!
//! ```
//! use tactics_core::core::EntityId;
//! use tactics_core::interaction::SelectionSpec;
//!
//! // Pick up to two of three candidates.
//! let spec = SelectionSpec::new([EntityId(4), EntityId(5), EntityId(6)]).up_to(2);
//! assert_eq!(spec.pool().len(), 3);
//! ```

use smallvec::SmallVec;
use tracing::trace;

use super::decision::{Decision, Finish};
use super::machine::{InteractionContext, InteractionState};
use crate::core::{EntityId, PlayerId};
use crate::error::{GameResult, InteractionError};
use crate::events::InteractionEvent;
use crate::game::{Continuation, Game};
use crate::state::{GameState, SlotRef};

/// Eligibility of one candidate given the running selection.
pub type Eligibility<T> = Box<dyn Fn(&GameState, &[T], &T) -> bool>;

/// A rule over the running selection.
pub type SelectionRule<T> = Box<dyn Fn(&GameState, &[T]) -> bool>;

/// How a selection behaves.
pub struct SelectionSpec<T> {
    pool: Vec<T>,
    eligible: Eligibility<T>,
    done: SelectionRule<T>,
    can_commit: SelectionRule<T>,
    cancellable: bool,
}

impl<T: 'static> SelectionSpec<T> {
    /// Pick exactly one candidate from `pool`.
    pub fn new(pool: impl IntoIterator<Item = T>) -> Self {
        Self {
            pool: pool.into_iter().collect(),
            eligible: Box::new(|_, _, _| true),
            done: Box::new(|_, selected| !selected.is_empty()),
            can_commit: Box::new(|_, selected| selected.len() == 1),
            cancellable: true,
        }
    }

    /// Restrict eligible candidates (builder pattern).
    #[must_use]
    pub fn eligible(mut self, predicate: impl Fn(&GameState, &[T], &T) -> bool + 'static) -> Self {
        self.eligible = Box::new(predicate);
        self
    }

    /// Require exactly `count` picks (builder pattern).
    #[must_use]
    pub fn exactly(self, count: usize) -> Self {
        self.done_when(move |_, selected| selected.len() >= count)
            .commit_when(move |_, selected| selected.len() == count)
    }

    /// Allow one to `count` picks; finishes by itself at `count` (builder pattern).
    #[must_use]
    pub fn up_to(self, count: usize) -> Self {
        self.done_when(move |_, selected| selected.len() >= count)
            .commit_when(move |_, selected| !selected.is_empty() && selected.len() <= count)
    }

    /// Set the auto-commit rule (builder pattern).
    #[must_use]
    pub fn done_when(mut self, rule: impl Fn(&GameState, &[T]) -> bool + 'static) -> Self {
        self.done = Box::new(rule);
        self
    }

    /// Set the commit rule (builder pattern).
    #[must_use]
    pub fn commit_when(mut self, rule: impl Fn(&GameState, &[T]) -> bool + 'static) -> Self {
        self.can_commit = Box::new(rule);
        self
    }

    /// Forbid cancelling (builder pattern).
    #[must_use]
    pub fn mandatory(mut self) -> Self {
        self.cancellable = false;
        self
    }
}

impl<T> SelectionSpec<T> {
    #[must_use]
    pub fn pool(&self) -> &[T] {
        &self.pool
    }
}

/// A selection in progress.
pub struct Selection<T> {
    owner: PlayerId,
    spec: SelectionSpec<T>,
    selected: SmallVec<[T; 4]>,
}

impl<T: Copy + PartialEq> Selection<T> {
    pub fn new(owner: PlayerId, spec: SelectionSpec<T>) -> Self {
        Self {
            owner,
            spec,
            selected: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn owner(&self) -> PlayerId {
        self.owner
    }

    #[must_use]
    pub fn selected(&self) -> &[T] {
        &self.selected
    }

    #[must_use]
    pub fn pool(&self) -> &[T] {
        &self.spec.pool
    }

    #[must_use]
    pub fn cancellable(&self) -> bool {
        self.spec.cancellable
    }

    /// Check if `candidate` may be added now.
    #[must_use]
    pub fn is_eligible(&self, state: &GameState, candidate: &T) -> bool {
        self.spec.pool.contains(candidate)
            && !self.selected.contains(candidate)
            && (self.spec.eligible)(state, &self.selected, candidate)
    }

    #[must_use]
    pub fn has_candidates(&self, state: &GameState) -> bool {
        self.spec.pool.iter().any(|c| self.is_eligible(state, c))
    }

    #[must_use]
    pub fn is_done(&self, state: &GameState) -> bool {
        (self.spec.done)(state, &self.selected)
    }

    #[must_use]
    pub fn can_commit(&self, state: &GameState) -> bool {
        (self.spec.can_commit)(state, &self.selected)
    }

    /// Nothing more can be picked and the current selection cannot be
    /// committed.
    #[must_use]
    pub fn is_impossible(&self, state: &GameState) -> bool {
        !self.has_candidates(state) && !self.can_commit(state)
    }

    fn push(&mut self, candidate: T) {
        self.selected.push(candidate);
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Selection<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selection")
            .field("owner", &self.owner)
            .field("pool", &self.spec.pool)
            .field("selected", &self.selected)
            .field("cancellable", &self.spec.cancellable)
            .finish()
    }
}

/// Something a selection can pick: a board entity or a minion slot.
pub trait Candidate: Copy + PartialEq + std::fmt::Debug + std::fmt::Display + 'static {
    /// Interaction state of a selection over this candidate type.
    const STATE: InteractionState;

    /// Error for an ineligible pick.
    fn illegal(self) -> InteractionError;

    /// Decision handed out on commit.
    fn decision(selected: &[Self]) -> Decision;

    fn wrap(selection: Selection<Self>) -> InteractionContext;

    fn narrow(context: &InteractionContext) -> Option<&Selection<Self>>;

    fn narrow_mut(context: &mut InteractionContext) -> Option<&mut Selection<Self>>;
}

impl Candidate for EntityId {
    const STATE: InteractionState = InteractionState::SelectingCardsOnBoard;

    fn illegal(self) -> InteractionError {
        InteractionError::IllegalTarget(self)
    }

    fn decision(selected: &[Self]) -> Decision {
        Decision::Entities(selected.iter().copied().collect())
    }

    fn wrap(selection: Selection<Self>) -> InteractionContext {
        InteractionContext::SelectingCardsOnBoard(selection)
    }

    fn narrow(context: &InteractionContext) -> Option<&Selection<Self>> {
        match context {
            InteractionContext::SelectingCardsOnBoard(s) => Some(s),
            _ => None,
        }
    }

    fn narrow_mut(context: &mut InteractionContext) -> Option<&mut Selection<Self>> {
        match context {
            InteractionContext::SelectingCardsOnBoard(s) => Some(s),
            _ => None,
        }
    }
}

impl Candidate for SlotRef {
    const STATE: InteractionState = InteractionState::SelectingMinionSlot;

    fn illegal(self) -> InteractionError {
        InteractionError::IllegalSlot(self)
    }

    fn decision(selected: &[Self]) -> Decision {
        Decision::Slots(selected.iter().copied().collect())
    }

    fn wrap(selection: Selection<Self>) -> InteractionContext {
        InteractionContext::SelectingMinionSlot(selection)
    }

    fn narrow(context: &InteractionContext) -> Option<&Selection<Self>> {
        match context {
            InteractionContext::SelectingMinionSlot(s) => Some(s),
            _ => None,
        }
    }

    fn narrow_mut(context: &mut InteractionContext) -> Option<&mut Selection<Self>> {
        match context {
            InteractionContext::SelectingMinionSlot(s) => Some(s),
            _ => None,
        }
    }
}

impl Game {
    /// Ask `player` to pick entities on the board.
    pub fn start_selecting_cards_on_board(
        &mut self,
        player: PlayerId,
        spec: SelectionSpec<EntityId>,
        then: impl FnOnce(&mut Game, Decision) -> GameResult<()> + 'static,
    ) -> GameResult<()> {
        self.start_selection(player, spec, Box::new(then))
    }

    /// Ask `player` to pick minion slots.
    pub fn start_selecting_minion_slot(
        &mut self,
        player: PlayerId,
        spec: SelectionSpec<SlotRef>,
        then: impl FnOnce(&mut Game, Decision) -> GameResult<()> + 'static,
    ) -> GameResult<()> {
        self.start_selection(player, spec, Box::new(then))
    }

    fn start_selection<T: Candidate>(
        &mut self,
        player: PlayerId,
        spec: SelectionSpec<T>,
        then: Continuation,
    ) -> GameResult<()> {
        self.interaction.ensure_idle()?;
        self.ensure_right_to_act(player)?;

        let selection = Selection::new(player, spec);
        let impossible = selection.is_impossible(&self.state);
        let ready = selection.is_done(&self.state) && selection.can_commit(&self.state);
        self.begin_interaction(T::wrap(selection))?;

        if impossible {
            trace!(target: "tactics::interaction", state = %T::STATE, "selection impossible");
            self.finish_interaction(Finish::Cancelled)?;
            return self.continue_with(then, Decision::Cancelled);
        }
        if ready {
            self.finish_interaction(Finish::Committed)?;
            return self.continue_with(then, T::decision(&[]));
        }
        self.await_decision(then)
    }

    pub(crate) fn select_card_on_board(&mut self, player: PlayerId, entity: EntityId) -> GameResult<()> {
        self.select_candidate(player, entity)
    }

    pub(crate) fn select_minion_slot(&mut self, player: PlayerId, slot: SlotRef) -> GameResult<()> {
        self.select_candidate(player, slot)
    }

    fn select_candidate<T: Candidate>(&mut self, player: PlayerId, candidate: T) -> GameResult<()> {
        let actual = self.interaction.state();
        let selection = T::narrow_mut(self.interaction.context_mut()).ok_or(InteractionError::WrongInteraction {
            expected: T::STATE,
            actual,
        })?;
        if selection.owner() != player {
            return Err(InteractionError::NotOwner { player }.into());
        }
        if selection.selected().contains(&candidate) {
            return Err(InteractionError::AlreadySelected(candidate.to_string()).into());
        }
        if !selection.is_eligible(&self.state, &candidate) {
            return Err(candidate.illegal().into());
        }

        selection.push(candidate);
        let count = selection.selected().len();
        let ready = selection.is_done(&self.state) && selection.can_commit(&self.state);
        let stuck = !ready && selection.is_impossible(&self.state);
        self.emit(InteractionEvent::Selected {
            state: T::STATE,
            owner: player,
            count,
        });

        if ready {
            return self.commit_selection(player);
        }
        if stuck {
            trace!(target: "tactics::interaction", state = %T::STATE, count, "selection ran out of candidates");
            self.finish_interaction(Finish::Cancelled)?;
            return self.resume(Decision::Cancelled);
        }
        Ok(())
    }

    pub(crate) fn commit_selection(&mut self, player: PlayerId) -> GameResult<()> {
        let decision = match self.interaction.context() {
            InteractionContext::SelectingCardsOnBoard(s) => Self::selection_decision(s, player, &self.state)?,
            InteractionContext::SelectingMinionSlot(s) => Self::selection_decision(s, player, &self.state)?,
            other => return Err(InteractionError::NoSelection { actual: other.state() }.into()),
        };
        self.finish_interaction(Finish::Committed)?;
        self.resume(decision)
    }

    fn selection_decision<T: Candidate>(
        selection: &Selection<T>,
        player: PlayerId,
        state: &GameState,
    ) -> Result<Decision, InteractionError> {
        if selection.owner() != player {
            return Err(InteractionError::NotOwner { player });
        }
        if !selection.can_commit(state) {
            return Err(InteractionError::CannotCommit);
        }
        Ok(T::decision(selection.selected()))
    }
}
