//! Card pools built on the engine.
//!
//! - `skirmish`: a small demo pool exercising every interaction the engine
//!   offers (slot selection, targeting, reactive responses, card choices and
//!   affinity choices).

pub mod skirmish;
