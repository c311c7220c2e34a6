//! Board state: players, card instances, units and zones.
//!
//! ## Key Types
//!
//! - `GameState`: the complete board, cheap to clone
//! - `CardInstance` / `Unit`: a card in a match, and its on-board body
//! - `CardLocation` / `SlotRef`: where a card is
//! - `ZoneVisibility`: who may see cards in a location

pub mod board;
pub mod zone;

pub use board::{CardInstance, GameState, PlayerBoard, Unit};
pub use zone::{CardLocation, SlotRef, ZoneVisibility};
