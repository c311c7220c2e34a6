//! Card locations and their visibility.
//!
//! Every card instance is in exactly one `CardLocation`. Locations are fixed
//! for this game (unlike a configurable zone system): deck, hand, destiny,
//! resources, a board slot, the resolving area or the discard pile.

use serde::{Deserialize, Serialize};

use crate::core::PlayerId;

/// Who may see the cards in a zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneVisibility {
    /// All cards visible to all players (board, discard).
    Public,
    /// Cards visible only to the zone owner (hand).
    OwnerOnly,
    /// Cards not visible to anyone (face-down deck).
    Hidden,
}

impl ZoneVisibility {
    /// Check if `viewer` may see a card owned by `owner` in this zone.
    #[must_use]
    pub fn visible_to(self, owner: PlayerId, viewer: PlayerId) -> bool {
        match self {
            ZoneVisibility::Public => true,
            ZoneVisibility::OwnerOnly => owner == viewer,
            ZoneVisibility::Hidden => false,
        }
    }
}

/// A minion slot on one side of the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotRef {
    pub player: PlayerId,
    pub index: usize,
}

impl SlotRef {
    /// Create a slot reference.
    #[must_use]
    pub const fn new(player: PlayerId, index: usize) -> Self {
        Self { player, index }
    }
}

impl std::fmt::Display for SlotRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} slot {}", self.player, self.index)
    }
}

/// Where a card instance currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardLocation {
    Deck,
    Hand,
    /// Face-up destiny zone, playable during the Destiny phase.
    Destiny,
    /// Played destiny cards.
    Resources,
    /// On the board as a unit.
    Board(SlotRef),
    /// Paid for and waiting to resolve (on the effect chain, or mid-play).
    Resolving,
    Discard,
}

impl CardLocation {
    /// Visibility of cards in this location.
    #[must_use]
    pub fn visibility(self) -> ZoneVisibility {
        match self {
            CardLocation::Deck => ZoneVisibility::Hidden,
            CardLocation::Hand | CardLocation::Destiny => ZoneVisibility::OwnerOnly,
            CardLocation::Resources
            | CardLocation::Board(_)
            | CardLocation::Resolving
            | CardLocation::Discard => ZoneVisibility::Public,
        }
    }
}
