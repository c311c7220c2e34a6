//! Seeded randomness for deck shuffles and content rolls.
//!
//! The stream is ChaCha8 so a checkpoint is just the seed plus the word
//! position. Rolling a rejected command back rewinds the stream with it, and
//! a replay of the same log shuffles every deck the same way.
//!
//! ```
//! use tactics_core::core::GameRng;
//!
//! let mut rng = GameRng::new(42);
//! let mark = rng.position();
//! let roll = rng.roll(6);
//!
//! let mut rewound = GameRng::resume(&mark);
//! assert_eq!(rewound.roll(6), roll);
//! ```

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// The match's only source of randomness.
#[derive(Clone, Debug)]
pub struct GameRng {
    stream: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            stream: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform roll in `1..=sides`. Zero sides always rolls zero.
    pub fn roll(&mut self, sides: u32) -> u32 {
        if sides == 0 {
            return 0;
        }
        self.stream.gen_range(1..=sides)
    }

    /// Index of a uniformly picked element, `None` for an empty pool.
    pub fn pick_index(&mut self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.stream.gen_range(0..len))
    }

    pub fn shuffle<T>(&mut self, cards: &mut [T]) {
        cards.shuffle(&mut self.stream);
    }

    /// Where the stream currently is.
    #[must_use]
    pub fn position(&self) -> GameRngState {
        GameRngState {
            seed: self.seed,
            word_pos: self.stream.get_word_pos(),
        }
    }

    /// Rebuild a stream at a recorded position.
    #[must_use]
    pub fn resume(position: &GameRngState) -> Self {
        let mut stream = ChaCha8Rng::seed_from_u64(position.seed);
        stream.set_word_pos(position.word_pos);
        Self {
            stream,
            seed: position.seed,
        }
    }
}

/// Seed and word position. Published in full snapshots, stripped from
/// player views.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRngState {
    pub seed: u64,
    pub word_pos: u128,
}
