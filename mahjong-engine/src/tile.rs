//! Tile representation for the 34-rank Malaysian Mahjong set.
//!
//! Provides the `Tile` newtype over rank indices 0-33, suit classification,
//! and the run/neighbour arithmetic the claim predicates and the hand
//! evaluator share.

use std::fmt;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Total number of distinct tile ranks (0-33).
pub const NUM_TILE_TYPES: usize = 34;

/// Number of tiles per numeric suit (1-9).
pub const NUM_SUIT_TILES: usize = 9;

/// Physical copies of every rank.
pub const COPIES_PER_TILE: usize = 4;

/// Total physical tiles in a full set.
pub const NUM_TILES: usize = NUM_TILE_TYPES * COPIES_PER_TILE;

// Suit range starts (rank indices).
pub const WAN_START: u8 = 0;
pub const TONG_START: u8 = 9;
pub const TIAO_START: u8 = 18;
pub const HONOR_START: u8 = 27;

// Named honor ranks.
pub const DONG: u8 = 27;
pub const NAN: u8 = 28;
pub const XI: u8 = 29;
pub const BEI: u8 = 30;
pub const ZHONG: u8 = 31;
pub const FA: u8 = 32;
pub const BAI: u8 = 33;

// ---------------------------------------------------------------------------
// Suit
// ---------------------------------------------------------------------------

/// The four tile categories. Declaration order is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Suit {
    /// Characters, wire suffix `w`.
    Wan = 0,
    /// Dots, wire suffix `b`.
    Tong = 1,
    /// Bamboo, wire suffix `t`.
    Tiao = 2,
    /// Winds and dragons.
    Honor = 3,
}

impl Suit {
    /// Returns the starting rank index for this suit.
    #[inline]
    pub const fn start(self) -> u8 {
        match self {
            Suit::Wan => WAN_START,
            Suit::Tong => TONG_START,
            Suit::Tiao => TIAO_START,
            Suit::Honor => HONOR_START,
        }
    }

    /// Wire suffix of numeric suits; `None` for honors.
    #[inline]
    pub const fn suffix(self) -> Option<char> {
        match self {
            Suit::Wan => Some('w'),
            Suit::Tong => Some('b'),
            Suit::Tiao => Some('t'),
            Suit::Honor => None,
        }
    }

    #[inline]
    pub const fn is_numeric(self) -> bool {
        !matches!(self, Suit::Honor)
    }
}

// ---------------------------------------------------------------------------
// Tile newtype
// ---------------------------------------------------------------------------

/// A tile value. Copies are indistinguishable: two tiles are the same tile
/// when their ranks are equal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tile(u8);

impl Tile {
    /// Creates a `Tile` if `id` is in range 0..34.
    #[inline]
    pub const fn new(id: u8) -> Option<Self> {
        if id < NUM_TILE_TYPES as u8 {
            Some(Tile(id))
        } else {
            None
        }
    }

    /// Numeric tile of `suit` with 1-based `number`. `None` for honors or
    /// numbers outside 1..=9.
    #[inline]
    pub const fn numbered(suit: Suit, number: u8) -> Option<Self> {
        if !suit.is_numeric() || number < 1 || number > 9 {
            return None;
        }
        Some(Tile(suit.start() + number - 1))
    }

    /// Raw rank index (0-33).
    #[inline]
    pub const fn id(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Which suit this tile belongs to.
    #[inline]
    pub const fn suit(self) -> Suit {
        match self.0 {
            0..9 => Suit::Wan,
            9..18 => Suit::Tong,
            18..27 => Suit::Tiao,
            _ => Suit::Honor,
        }
    }

    /// 1-based number within the suit (1-9), or `None` for honor tiles.
    #[inline]
    pub const fn number(self) -> Option<u8> {
        if self.0 < HONOR_START {
            Some((self.0 % NUM_SUIT_TILES as u8) + 1)
        } else {
            None
        }
    }

    /// True for wind or dragon tiles.
    #[inline]
    pub const fn is_honor(self) -> bool {
        self.0 >= HONOR_START
    }

    /// True for wan, tong, or tiao.
    #[inline]
    pub const fn is_numeric(self) -> bool {
        self.0 < HONOR_START
    }

    /// The same-suit tile `delta` steps away, if it exists.
    #[inline]
    pub const fn offset(self, delta: i8) -> Option<Self> {
        let Some(n) = self.number() else {
            return None;
        };
        let target = n as i8 + delta;
        if target < 1 || target > 9 {
            return None;
        }
        Tile::numbered(self.suit(), target as u8)
    }

    /// Every tile in rank order.
    pub fn all() -> impl Iterator<Item = Tile> {
        (0..NUM_TILE_TYPES as u8).map(Tile)
    }

    /// The three runs `[n-2..n]`, `[n-1..n+1]`, `[n..n+2]` that contain this
    /// tile, in that order, skipping those that fall outside 1..=9. Honors
    /// yield nothing.
    pub fn runs_containing(self) -> impl Iterator<Item = [Tile; 3]> {
        [-2i8, -1, 0].into_iter().filter_map(move |low| {
            Some([self.offset(low)?, self.offset(low + 1)?, self.offset(low + 2)?])
        })
    }
}

impl fmt::Debug for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tile({}={})", self.0, tile_name(self.0))
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(tile_name(self.0))
    }
}

// ---------------------------------------------------------------------------
// Names
// ---------------------------------------------------------------------------

/// Wire names for every rank.
pub(crate) const TILE_NAMES: [&str; NUM_TILE_TYPES] = [
    "1w", "2w", "3w", "4w", "5w", "6w", "7w", "8w", "9w", "1b", "2b", "3b", "4b", "5b", "6b", "7b",
    "8b", "9b", "1t", "2t", "3t", "4t", "5t", "6t", "7t", "8t", "9t", "dong", "nan", "xi", "bei",
    "zhong", "fa", "bai",
];

/// Returns the wire name for a rank (0-33). Out-of-range values return "??".
#[inline]
pub fn tile_name(id: u8) -> &'static str {
    TILE_NAMES.get(id as usize).copied().unwrap_or("??")
}

/// Rank histogram of a tile slice.
pub fn tile_counts(tiles: &[Tile]) -> [u8; NUM_TILE_TYPES] {
    let mut counts = [0u8; NUM_TILE_TYPES];
    for t in tiles {
        counts[t.index()] += 1;
    }
    counts
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
