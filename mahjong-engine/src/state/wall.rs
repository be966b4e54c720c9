//! The wall: all 136 tiles, shuffled once per game and drawn from the front.
//!
//! Shuffles are reproducible. A room seed plus a hand counter is expanded
//! through `SHA-256(seed_le || hand_index_le)` into a `ChaCha8Rng` seed, and
//! the wall is permuted with a vendored Fisher-Yates so the order does not
//! depend on `rand`'s slice helpers. Rooms without a seed draw one from the
//! thread RNG.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

use crate::errors::{RoomError, RoomResult};
use crate::tile::{tile_counts, Tile, COPIES_PER_TILE, NUM_TILES};

#[derive(Debug, Clone)]
pub struct Wall {
    /// Remaining tiles, stored back to front so drawing is a `pop`.
    tiles: Vec<Tile>,
    /// Hex SHA-256 of the full wall order, fixed at shuffle time.
    pub wall_digest: String,
    pub seed: Option<u64>,
    pub hand_index: u64,
}

impl Wall {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            tiles: Vec::new(),
            wall_digest: String::new(),
            seed,
            hand_index: 0,
        }
    }

    /// Replaces the wall with a freshly shuffled full set.
    pub fn shuffle(&mut self) {
        let base = self.seed.unwrap_or_else(|| rand::rng().random());
        let mut rng = ChaCha8Rng::from_seed(derive_hand_seed(base, self.hand_index));
        self.hand_index = self.hand_index.wrapping_add(1);

        let mut w = full_set();
        fisher_yates_shuffle(&mut w, &mut rng);
        self.install(w);
    }

    /// Loads a fixed order, first element drawn first. Must be exactly the
    /// 136-tile set; the wall is left untouched otherwise.
    pub fn load(&mut self, tiles: Vec<Tile>) -> RoomResult<()> {
        if tiles.len() != NUM_TILES {
            return Err(RoomError::InvalidState {
                message: format!("wall must hold {NUM_TILES} tiles, got {}", tiles.len()),
            });
        }
        let counts = tile_counts(&tiles);
        if let Some(tile) = Tile::all().find(|t| counts[t.index()] as usize != COPIES_PER_TILE) {
            return Err(RoomError::InvalidState {
                message: format!(
                    "wall holds {} copies of {tile}, expected {COPIES_PER_TILE}",
                    counts[tile.index()]
                ),
            });
        }
        self.install(tiles);
        Ok(())
    }

    fn install(&mut self, mut front_first: Vec<Tile>) {
        let mut hasher = Sha256::new();
        for t in &front_first {
            hasher.update([t.id()]);
        }
        self.wall_digest = format!("{:x}", hasher.finalize());

        front_first.reverse();
        self.tiles = front_first;
    }

    /// Takes the next tile from the front.
    pub fn draw(&mut self) -> Option<Tile> {
        self.tiles.pop()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Remaining tiles in draw order.
    pub fn remaining(&self) -> impl Iterator<Item = Tile> + '_ {
        self.tiles.iter().rev().copied()
    }
}

/// Every tile once per copy, in rank order.
pub fn full_set() -> Vec<Tile> {
    Tile::all()
        .flat_map(|t| std::iter::repeat_n(t, COPIES_PER_TILE))
        .collect()
}

/// Vendored Fisher-Yates shuffle, stable across `rand` releases.
pub fn fisher_yates_shuffle<T>(slice: &mut [T], rng: &mut impl Rng) {
    for i in (1..slice.len()).rev() {
        let j = rng.random_range(0..=i);
        slice.swap(i, j);
    }
}

/// `SHA-256(seed_le || hand_index_le)`, the ChaCha8 seed for one shuffle.
pub fn derive_hand_seed(seed: u64, hand_index: u64) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(seed.to_le_bytes());
    hasher.update(hand_index.to_le_bytes());
    hasher.finalize().into()
}
