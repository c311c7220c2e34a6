//! Entity identification.
//!
//! Every addressable game object (player hero, card, unit) has an `EntityId`.
//!
//! ## ID Layout
//!
//! - `0..PLAYER_COUNT`: the two players' heroes
//! - `PLAYER_COUNT..`: cards, allocated in deal order
//!
//! A card keeps its id when it is summoned, so a unit on the board and the card
//! it came from share one `EntityId`. Allocation order is part of the
//! deterministic state: replays allocate identical ids.
//!
//! ```
//! use tactics_core::core::{EntityId, PlayerId};
//!
//! let hero = EntityId::player(PlayerId::new(1));
//! assert!(hero.is_player());
//! assert_eq!(hero.as_player(), Some(PlayerId::new(1)));
//!
//! let card = EntityId::first_card();
//! assert!(!card.is_player());
//! ```

use serde::{Deserialize, Serialize};

use super::player::{PlayerId, PLAYER_COUNT};

/// Unique identifier for any game entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Entity id of a player's hero.
    #[must_use]
    pub const fn player(id: PlayerId) -> Self {
        Self(id.0 as u32)
    }

    /// First id handed out to cards.
    #[must_use]
    pub const fn first_card() -> Self {
        Self(PLAYER_COUNT as u32)
    }

    /// Check if this entity is a player's hero.
    #[must_use]
    pub const fn is_player(self) -> bool {
        self.0 < PLAYER_COUNT as u32
    }

    /// Convert to the owning `PlayerId` if this is a hero entity.
    #[must_use]
    pub const fn as_player(self) -> Option<PlayerId> {
        if self.is_player() {
            Some(PlayerId(self.0 as u8))
        } else {
            None
        }
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// The id allocated after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_entities() {
        assert_eq!(EntityId::player(PlayerId::new(0)), EntityId(0));
        assert_eq!(EntityId::player(PlayerId::new(1)), EntityId(1));
        assert!(EntityId(0).is_player());
        assert!(EntityId(1).is_player());
        assert!(!EntityId(2).is_player());
    }

    #[test]
    fn test_as_player() {
        assert_eq!(EntityId(1).as_player(), Some(PlayerId::new(1)));
        assert_eq!(EntityId(7).as_player(), None);
    }

    #[test]
    fn test_first_card_follows_players() {
        assert_eq!(EntityId::first_card(), EntityId(2));
        assert_eq!(EntityId::first_card().next(), EntityId(3));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", EntityId(42)), "Entity(42)");
    }

    #[test]
    fn test_serialization() {
        let id = EntityId(123);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "123");
        let deserialized: EntityId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
