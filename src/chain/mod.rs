//! Effect chain: the priority/response protocol.
//!
//! `effect_chain` is the state machine; `driver` wires it to the game
//! (opening chains, passing, and resolving effects as scheduled tasks).

pub mod driver;
pub mod effect_chain;

pub use effect_chain::{ChainState, ChainView, Effect, EffectChain, PassOutcome, Targets, PASS_THRESHOLD};
