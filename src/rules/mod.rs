//! Content seam.
//!
//! Games implement `ContentRules` to define their card pool:
//! - What cards cost and what playing them does
//! - Unit abilities and destiny affinities
//! - Combat legality and damage
//!
//! The orchestration core calls into `ContentRules` but never interprets
//! card text directly.

pub mod content;

pub use content::{AbilityUse, AttackDeclaration, CardPlay, ContentRules, DamageReport, EffectPlan};
