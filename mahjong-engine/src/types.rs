use serde::{Deserialize, Serialize};

use crate::tile::{Tile, NUM_TILE_TYPES};

/// Seat index 0-3. Seat 0 deals.
pub type Seat = usize;

/// Number of seats at a table.
pub const NUM_SEATS: usize = 4;

/// Concealed tiles a seat holds between turns, before any melds.
pub const HAND_SIZE: usize = 13;

/// A hand representation using a histogram of tile ranks (0-33).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hand {
    pub counts: [u8; NUM_TILE_TYPES],
}

impl Hand {
    pub fn new(tiles: &[Tile]) -> Self {
        let mut h = Hand::default();
        for &t in tiles {
            h.add(t);
        }
        h
    }

    pub fn add(&mut self, t: Tile) {
        self.counts[t.index()] += 1;
    }

    pub fn remove(&mut self, t: Tile) {
        if self.counts[t.index()] > 0 {
            self.counts[t.index()] -= 1;
        }
    }

    pub fn count(&self, t: Tile) -> u8 {
        self.counts[t.index()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|&c| c as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }
}

impl Default for Hand {
    fn default() -> Self {
        Hand {
            counts: [0; NUM_TILE_TYPES],
        }
    }
}

/// Shape of a face-up group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeldKind {
    /// Three equal tiles (pong).
    Triplet,
    /// Four equal tiles (kong).
    Quad,
    /// Three consecutive same-suit tiles (chow).
    Run,
}

/// A formed group. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meld {
    #[serde(rename = "type")]
    pub kind: MeldKind,
    pub tiles: Vec<Tile>,
    /// Seat whose discard completed the meld; `None` for a concealed kong.
    #[serde(rename = "fromSeat")]
    pub from_seat: Option<Seat>,
    /// The tile taken from the discard pond, if any.
    #[serde(rename = "calledTile")]
    pub called_tile: Option<Tile>,
}

impl Meld {
    pub fn triplet(tile: Tile, from_seat: Seat) -> Self {
        Self {
            kind: MeldKind::Triplet,
            tiles: vec![tile; 3],
            from_seat: Some(from_seat),
            called_tile: Some(tile),
        }
    }

    pub fn quad(tile: Tile, from_seat: Option<Seat>) -> Self {
        Self {
            kind: MeldKind::Quad,
            tiles: vec![tile; 4],
            from_seat,
            called_tile: from_seat.map(|_| tile),
        }
    }

    pub fn run(mut tiles: [Tile; 3], called: Tile, from_seat: Seat) -> Self {
        tiles.sort();
        Self {
            kind: MeldKind::Run,
            tiles: tiles.to_vec(),
            from_seat: Some(from_seat),
            called_tile: Some(called),
        }
    }

    pub fn is_run(&self) -> bool {
        self.kind == MeldKind::Run
    }

    /// Open kongs and concealed kongs alike.
    pub fn is_concealed(&self) -> bool {
        self.from_seat.is_none()
    }
}

/// Insert `tile` into a sorted hand, maintaining sort order.
#[inline]
pub(crate) fn sorted_insert(hand: &mut Vec<Tile>, tile: Tile) {
    let pos = hand.partition_point(|&t| t < tile);
    hand.insert(pos, tile);
}

/// Remove one copy of `tile` from `hand`. Returns false when none is held.
#[inline]
pub(crate) fn remove_one(hand: &mut Vec<Tile>, tile: Tile) -> bool {
    match hand.iter().position(|&t| t == tile) {
        Some(idx) => {
            hand.remove(idx);
            true
        }
        None => false,
    }
}
