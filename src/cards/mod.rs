//! Card blueprints and the registry content implementations look them up in.
//!
//! ## Key Types
//!
//! - `CardId`: identifier for a blueprint
//! - `CardDefinition`: static card data (cost, kind, affinities, abilities)
//! - `CardRegistry`: blueprint lookup

pub mod definition;
pub mod registry;

pub use definition::{AbilityDefinition, Affinity, CardDefinition, CardId, CardKind};
pub use registry::CardRegistry;
