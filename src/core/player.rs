//! Seats and per-seat storage.
//!
//! A match always has exactly two seats. Turn order, priority and
//! redaction all flip between a player and their `opponent()`, so both
//! types are fixed-size and never allocate.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Seats at the table.
pub const PLAYER_COUNT: usize = 2;

/// A seat. `PlayerId(0)` takes the first turn unless the config says
/// otherwise.
///
/// Serialized as a bare number. Deserializing anything but `0` or `1` fails,
/// so a command payload cannot name a third seat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Panics on a seat other than 0 or 1. Use `TryFrom` for untrusted input.
    #[must_use]
    pub const fn new(seat: u8) -> Self {
        assert!((seat as usize) < PLAYER_COUNT, "no such seat");
        Self(seat)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[must_use]
    pub const fn opponent(self) -> Self {
        Self(self.0 ^ 1)
    }

    /// Seat 0, then seat 1.
    pub fn all() -> impl Iterator<Item = PlayerId> {
        [PlayerId(0), PlayerId(1)].into_iter()
    }
}

impl TryFrom<u8> for PlayerId {
    type Error = String;

    fn try_from(seat: u8) -> Result<Self, Self::Error> {
        match seat {
            0 | 1 => Ok(Self(seat)),
            _ => Err(format!("seat {seat} does not exist, a match has {PLAYER_COUNT} players")),
        }
    }
}

impl From<PlayerId> for u8 {
    fn from(player: PlayerId) -> Self {
        player.0
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// One value per seat, indexed by `PlayerId`. Serializes as a two-element
/// array.
///
/// ```
/// use tactics_core::core::{PlayerId, PlayerMap};
///
/// let mut mana: PlayerMap<u32> = PlayerMap::with_default();
/// mana[PlayerId::new(1)] += 2;
/// assert_eq!(mana.map(|_, m| m * 10)[PlayerId::new(1)], 20);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerMap<T> {
    seats: [T; PLAYER_COUNT],
}

impl<T> PlayerMap<T> {
    /// Fill each seat from `init`.
    pub fn new(init: impl Fn(PlayerId) -> T) -> Self {
        Self {
            seats: [init(PlayerId(0)), init(PlayerId(1))],
        }
    }

    pub fn with_default() -> Self
    where
        T: Default,
    {
        Self::new(|_| T::default())
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        PlayerId::all().zip(self.seats.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (PlayerId, &mut T)> {
        PlayerId::all().zip(self.seats.iter_mut())
    }

    /// Per-seat transform into a new map.
    pub fn map<U>(&self, f: impl Fn(PlayerId, &T) -> U) -> PlayerMap<U> {
        PlayerMap::new(|p| f(p, &self[p]))
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &T {
        &self.seats[player.index()]
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut T {
        &mut self.seats[player.index()]
    }
}
