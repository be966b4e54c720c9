//! Winning-hand recognition.
//!
//! A hand wins when its concealed tiles split exactly into triplets and runs
//! plus one pair, and those sets together with the already-formed melds make
//! four sets. Melds count as one set each and are never re-examined.
//!
//! The search peels the lowest remaining rank off a 34-counter histogram,
//! trying it as a triplet, as the start of a run, or as the pair. Pending
//! branches live on an explicit stack of fixed-size frames, so there is no
//! recursion and no per-branch slicing.

use crate::fan::{self, FanResult};
use crate::tile::{Tile, NUM_TILE_TYPES};
use crate::types::{Hand, Meld};

/// Sets in a complete hand, besides the pair.
pub const SETS_PER_HAND: usize = 4;

/// One complete reading of the concealed tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decomposition {
    pub runs: u8,
    pub triplets: u8,
    pub pair: Tile,
}

impl Decomposition {
    pub fn sets(&self) -> usize {
        (self.runs + self.triplets) as usize
    }
}

#[derive(Clone, Copy)]
struct Frame {
    counts: [u8; NUM_TILE_TYPES],
    pair: Option<Tile>,
    runs: u8,
    triplets: u8,
}

/// Enumerates every distinct way `hand` splits into runs, triplets and
/// exactly one pair. Empty when no split exists.
pub fn decompositions(hand: &Hand) -> Vec<Decomposition> {
    let mut found: Vec<Decomposition> = Vec::new();
    if hand.total() % 3 != 2 {
        return found;
    }

    let mut stack = vec![Frame {
        counts: hand.counts,
        pair: None,
        runs: 0,
        triplets: 0,
    }];

    while let Some(frame) = stack.pop() {
        let Some(lowest) = frame.counts.iter().position(|&c| c > 0) else {
            if let Some(pair) = frame.pair {
                let d = Decomposition {
                    runs: frame.runs,
                    triplets: frame.triplets,
                    pair,
                };
                if !found.contains(&d) {
                    found.push(d);
                }
            }
            continue;
        };
        let count = frame.counts[lowest];
        // lowest < 34 by construction of the histogram
        let Some(tile) = Tile::new(lowest as u8) else {
            continue;
        };

        if count >= 3 {
            let mut next = frame;
            next.counts[lowest] -= 3;
            next.triplets += 1;
            stack.push(next);
        }

        if let (Some(second), Some(third)) = (tile.offset(1), tile.offset(2)) {
            if frame.counts[second.index()] > 0 && frame.counts[third.index()] > 0 {
                let mut next = frame;
                next.counts[lowest] -= 1;
                next.counts[second.index()] -= 1;
                next.counts[third.index()] -= 1;
                next.runs += 1;
                stack.push(next);
            }
        }

        if count >= 2 && frame.pair.is_none() {
            let mut next = frame;
            next.counts[lowest] -= 2;
            next.pair = Some(tile);
            stack.push(next);
        }
    }

    found
}

/// Evaluates one seat's concealed tiles against its melds.
#[derive(Debug, Clone)]
pub struct HandEvaluator<'a> {
    concealed: Vec<Tile>,
    melds: &'a [Meld],
}

impl<'a> HandEvaluator<'a> {
    pub fn new(concealed: &[Tile], melds: &'a [Meld]) -> Self {
        Self {
            concealed: concealed.to_vec(),
            melds,
        }
    }

    /// Evaluates the hand as if `tile` (a discard being claimed) were held.
    pub fn with_claimed(concealed: &[Tile], melds: &'a [Meld], tile: Tile) -> Self {
        let mut evaluator = Self::new(concealed, melds);
        evaluator.concealed.push(tile);
        evaluator
    }

    /// Readings that, with the melds, make exactly four sets and a pair.
    pub fn winning_decompositions(&self) -> Vec<Decomposition> {
        if self.melds.len() > SETS_PER_HAND {
            return Vec::new();
        }
        let needed = SETS_PER_HAND - self.melds.len();
        decompositions(&Hand::new(&self.concealed))
            .into_iter()
            .filter(|d| d.sets() == needed)
            .collect()
    }

    pub fn is_win(&self) -> bool {
        !self.winning_decompositions().is_empty()
    }

    /// Scores the hand, or `None` when it does not win.
    pub fn calc(&self, is_self_draw: bool) -> Option<FanResult> {
        let readings = self.winning_decompositions();
        if readings.is_empty() {
            return None;
        }
        Some(fan::calculate_fan(
            &self.concealed,
            self.melds,
            &readings,
            is_self_draw,
        ))
    }
}

/// True when `concealed` plus `melds` form a complete hand.
pub fn is_winning_hand(concealed: &[Tile], melds: &[Meld]) -> bool {
    HandEvaluator::new(concealed, melds).is_win()
}
