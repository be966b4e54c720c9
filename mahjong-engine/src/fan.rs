//! Fan (番) scoring for winning hands.
//!
//! Every win is worth one base fan. Bonuses are evaluated independently over
//! the concealed tiles plus every meld tile:
//!
//! | bonus        | label  | fan |
//! |--------------|--------|-----|
//! | self-draw    | 自摸   | +1  |
//! | all triplets | 碰碰胡 | +2  |
//! | full flush   | 清一色 | +5  |
//! | mixed flush  | 混一色 | +3  |
//!
//! A hand with no bonus is a plain win (平胡). Full flush and mixed flush
//! are mutually exclusive.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::hand_evaluator::Decomposition;
use crate::tile::{Suit, Tile};
use crate::types::Meld;

/// Fan every win starts from.
pub const BASE_FAN: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Fan {
    SelfDraw,
    AllTriplets,
    FullFlush,
    MixedFlush,
    /// No bonus applied.
    PlainWin,
}

impl Fan {
    /// Bonus on top of [`BASE_FAN`].
    pub const fn bonus(self) -> u32 {
        match self {
            Fan::SelfDraw => 1,
            Fan::AllTriplets => 2,
            Fan::FullFlush => 5,
            Fan::MixedFlush => 3,
            Fan::PlainWin => 0,
        }
    }

    /// Label shown to players.
    pub const fn label(self) -> &'static str {
        match self {
            Fan::SelfDraw => "自摸",
            Fan::AllTriplets => "碰碰胡",
            Fan::FullFlush => "清一色",
            Fan::MixedFlush => "混一色",
            Fan::PlainWin => "平胡",
        }
    }

    /// ASCII name for logs.
    pub const fn name(self) -> &'static str {
        match self {
            Fan::SelfDraw => "self-draw",
            Fan::AllTriplets => "all-triplets",
            Fan::FullFlush => "full-flush",
            Fan::MixedFlush => "mixed-flush",
            Fan::PlainWin => "ping-hu",
        }
    }
}

/// Scored breakdown of a winning hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanResult {
    pub fans: Vec<Fan>,
    pub total: u32,
}

impl FanResult {
    pub fn labels(&self) -> Vec<&'static str> {
        self.fans.iter().map(|f| f.label()).collect()
    }

    pub fn contains(&self, fan: Fan) -> bool {
        self.fans.contains(&fan)
    }
}

impl Serialize for FanResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("FanResult", 2)?;
        s.serialize_field("types", &self.labels())?;
        s.serialize_field("count", &self.total)?;
        s.end()
    }
}

/// Scores a hand already known to win. `readings` are its winning
/// decompositions and must not be empty.
pub fn calculate_fan(
    concealed: &[Tile],
    melds: &[Meld],
    readings: &[Decomposition],
    is_self_draw: bool,
) -> FanResult {
    let mut fans = Vec::new();

    if is_self_draw {
        fans.push(Fan::SelfDraw);
    }
    if is_all_triplets(melds, readings) {
        fans.push(Fan::AllTriplets);
    }

    let all_tiles: Vec<Tile> = concealed
        .iter()
        .copied()
        .chain(melds.iter().flat_map(|m| m.tiles.iter().copied()))
        .collect();
    match flush_kind(&all_tiles) {
        Some(FlushKind::Full) => fans.push(Fan::FullFlush),
        Some(FlushKind::Mixed) => fans.push(Fan::MixedFlush),
        None => {}
    }

    if fans.is_empty() {
        fans.push(Fan::PlainWin);
    }
    let total = BASE_FAN + fans.iter().map(|f| f.bonus()).sum::<u32>();
    FanResult { fans, total }
}

/// No run meld, and the concealed tiles only read as triplets plus the
/// pair. A hand that can also be read with runs (111 222 333 as three
/// 123 runs) does not qualify.
fn is_all_triplets(melds: &[Meld], readings: &[Decomposition]) -> bool {
    !readings.is_empty()
        && !melds.iter().any(Meld::is_run)
        && readings.iter().all(|d| d.runs == 0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlushKind {
    Full,
    Mixed,
}

fn flush_kind(tiles: &[Tile]) -> Option<FlushKind> {
    let mut suit: Option<Suit> = None;
    let mut has_honor = false;
    for t in tiles {
        if t.is_honor() {
            has_honor = true;
            continue;
        }
        match suit {
            None => suit = Some(t.suit()),
            Some(s) if s != t.suit() => return None,
            Some(_) => {}
        }
    }
    // all-honor hands are neither
    if suit.is_none() {
        return None;
    }
    Some(if has_honor {
        FlushKind::Mixed
    } else {
        FlushKind::Full
    })
}
