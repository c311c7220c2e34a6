//! Interaction state machine: who must decide what, right now.
//!
//! ## Lifecycle
//!
//! Every decision follows the same shape:
//!
//! 1. `start_*` checks the machine is idle and the actor holds the right to
//!    act, then installs a context.
//! 2. If no input is needed the context commits (or cancels) on the spot and
//!    the continuation runs immediately. Otherwise the scheduler suspends
//!    with the continuation.
//! 3. A commit or cancel command returns the machine to `Idle` and resumes
//!    the continuation with a `Decision`.
//!
//! The live context is a tagged union whose variant is the state, so the
//! state tag and context can never disagree.

pub mod choice;
pub mod decision;
pub mod machine;
pub mod play;
pub mod selection;

pub use choice::{AffinityChoice, CardChoice};
pub use decision::Decision;
pub use machine::{InteractionContext, InteractionMachine, InteractionState};
pub use play::{PlayingCard, UsingAbility};
pub use selection::{Candidate, Selection, SelectionSpec};
