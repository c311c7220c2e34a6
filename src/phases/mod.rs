//! Turn structure.
//!
//! `machine` holds the phase state machine and the controller union. Each
//! phase module defines its controller (the per-visit data) and the game
//! operations that belong to it: enter hooks, phase commands, and the
//! combat sub-machine.

pub mod combat;
pub mod destiny;
pub mod draw;
pub mod end;
pub mod game_end;
pub mod machine;
pub mod main_phase;
mod transition;

pub use combat::{CombatPhase, CombatStep};
pub use destiny::DestinyPhase;
pub use draw::DrawPhase;
pub use end::EndPhase;
pub use game_end::{EndReason, GameEndPhase, GameOutcome};
pub use machine::{Phase, PhaseContext, PhaseController, PhaseMachine};
pub use main_phase::MainPhase;
